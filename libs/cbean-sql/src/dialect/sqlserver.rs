// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::clause_error::SqlClauseError;

use super::{DatabaseKind, Lock, NullsOrdering, Ordering, Paging, PagingWindow, SqlDialect};

#[derive(Debug, Default)]
pub struct SqlServerDialect;

impl SqlDialect for SqlServerDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::SqlServer
    }

    fn paging(&self, window: &PagingWindow) -> Paging {
        if window.start_index == 0 {
            return Paging {
                select_hint: format!(" top {}", window.size),
                sql_suffix: String::new(),
            };
        }

        // offset/fetch is only valid after an order-by
        let order_by = if window.has_order_by {
            ""
        } else {
            " order by (select null)"
        };
        Paging {
            select_hint: String::new(),
            sql_suffix: format!("{}{}", order_by, super::offset_fetch_suffix(window)),
        }
    }

    fn lock_for_update(&self, _base_alias: &str) -> Result<Lock, SqlClauseError> {
        Ok(Lock {
            from_base_table_hint: " with (updlock)".to_string(),
            sql_suffix: String::new(),
        })
    }

    fn nulls_ordering(&self, column: &str, ordering: Ordering, nulls: NullsOrdering) -> String {
        super::emulated_nulls_ordering(column, ordering, nulls)
    }

    fn bool_literal(&self, value: bool) -> String {
        super::numeric_bool_literal(value)
    }
}

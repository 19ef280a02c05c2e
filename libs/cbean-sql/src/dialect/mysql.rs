// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{DatabaseKind, NullsOrdering, Ordering, Paging, PagingWindow, SqlDialect};

#[derive(Debug, Default)]
pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
    }

    fn paging(&self, window: &PagingWindow) -> Paging {
        Paging {
            select_hint: String::new(),
            sql_suffix: format!(" limit {}, {}", window.start_index, window.size),
        }
    }

    fn nulls_ordering(&self, column: &str, ordering: Ordering, nulls: NullsOrdering) -> String {
        super::emulated_nulls_ordering(column, ordering, nulls)
    }

    // "You can't specify target table for update in FROM clause"
    fn is_update_sub_query_use_local_table_supported(&self) -> bool {
        false
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}

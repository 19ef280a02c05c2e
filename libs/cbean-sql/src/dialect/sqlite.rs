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
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Sqlite
    }

    fn paging(&self, window: &PagingWindow) -> Paging {
        Paging {
            select_hint: String::new(),
            sql_suffix: format!(" limit {}, {}", window.start_index, window.size),
        }
    }

    fn lock_for_update(&self, _base_alias: &str) -> Result<Lock, SqlClauseError> {
        Err(super::unsupported_lock(self.kind()))
    }

    fn nulls_ordering(&self, column: &str, ordering: Ordering, nulls: NullsOrdering) -> String {
        super::emulated_nulls_ordering(column, ordering, nulls)
    }
}

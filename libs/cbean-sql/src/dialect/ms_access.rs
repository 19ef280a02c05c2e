// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::{NaiveDate, NaiveDateTime};

use crate::clause_error::SqlClauseError;

use super::{DatabaseKind, Lock, NullsOrdering, Ordering, Paging, PagingWindow, SqlDialect};

/// MS Access has neither offset nor limit: paging is left to in-memory narrowing by the caller.
#[derive(Debug, Default)]
pub struct MsAccessDialect;

impl SqlDialect for MsAccessDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MsAccess
    }

    fn is_fetch_start_index_supported(&self) -> bool {
        false
    }

    fn is_fetch_size_supported(&self) -> bool {
        false
    }

    fn paging(&self, _window: &PagingWindow) -> Paging {
        Paging::default()
    }

    fn lock_for_update(&self, _base_alias: &str) -> Result<Lock, SqlClauseError> {
        Err(super::unsupported_lock(self.kind()))
    }

    fn nulls_ordering(&self, column: &str, ordering: Ordering, nulls: NullsOrdering) -> String {
        let (not_null_rank, null_rank) = match nulls {
            NullsOrdering::First => (1, 0),
            NullsOrdering::Last => (0, 1),
        };
        format!(
            "iif({column} is not null, {not_null_rank}, {null_rank}) asc, {column} {}",
            ordering.as_sql()
        )
    }

    fn is_join_in_parentheses(&self) -> bool {
        true
    }

    fn date_literal(&self, date: NaiveDate) -> String {
        format!("#{}#", date.format("%Y-%m-%d"))
    }

    fn timestamp_literal(&self, timestamp: NaiveDateTime) -> String {
        format!("#{}#", timestamp.format("%Y-%m-%d %H:%M:%S"))
    }

    fn bool_literal(&self, value: bool) -> String {
        super::numeric_bool_literal(value)
    }
}

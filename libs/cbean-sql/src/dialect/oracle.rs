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

use super::{DatabaseKind, Lock, Paging, PagingWindow, SqlDialect};

#[derive(Debug, Default)]
pub struct OracleDialect;

impl SqlDialect for OracleDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Oracle
    }

    /// Number the rows of the plain statement with `rownum` and filter the window outside
    fn paging(&self, window: &PagingWindow) -> Paging {
        Paging {
            select_hint: " * from (select plain.*, rownum rn from (select".to_string(),
            sql_suffix: format!(
                ") plain) ext where ext.rn > {} and ext.rn <= {}",
                window.start_index,
                window.end_index()
            ),
        }
    }

    fn lock_for_update(&self, base_alias: &str) -> Result<Lock, SqlClauseError> {
        Ok(Lock::suffix(format!(" for update of {base_alias}")))
    }

    fn in_scope_limit(&self) -> Option<usize> {
        Some(1000)
    }

    fn date_literal(&self, date: NaiveDate) -> String {
        format!("date '{}'", date.format("%Y-%m-%d"))
    }

    fn timestamp_literal(&self, timestamp: NaiveDateTime) -> String {
        format!("timestamp '{}'", timestamp.format("%Y-%m-%d %H:%M:%S%.3f"))
    }

    fn bool_literal(&self, value: bool) -> String {
        super::numeric_bool_literal(value)
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::clause_error::SqlClauseError;

use super::{DatabaseKind, Lock, Paging, PagingWindow, SqlDialect};

#[derive(Debug, Default)]
pub struct Db2Dialect;

impl SqlDialect for Db2Dialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Db2
    }

    fn paging(&self, window: &PagingWindow) -> Paging {
        let sql_suffix = if window.start_index == 0 {
            format!(" fetch first {} rows only", window.size)
        } else {
            super::offset_fetch_suffix(window)
        };
        Paging {
            select_hint: String::new(),
            sql_suffix,
        }
    }

    fn lock_for_update(&self, _base_alias: &str) -> Result<Lock, SqlClauseError> {
        Ok(Lock::suffix(" for update with rs"))
    }

    fn requires_union_normal_select_enclosing(&self) -> bool {
        true
    }
}

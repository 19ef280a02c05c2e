// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{DatabaseKind, Paging, PagingWindow, SqlDialect};

#[derive(Debug, Default)]
pub struct H2Dialect;

impl SqlDialect for H2Dialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::H2
    }

    fn paging(&self, window: &PagingWindow) -> Paging {
        Paging {
            select_hint: String::new(),
            sql_suffix: format!(" limit {} offset {}", window.size, window.start_index),
        }
    }
}

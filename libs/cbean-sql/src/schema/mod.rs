// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod meta;
mod registry;

use crate::clause_error::SqlClauseError;

pub use meta::{ColumnMeta, ForeignMeta, TableMeta};
pub use registry::{ForeignSer, SchemaRegistry, SchemaSer, TableSer};

/// Table and relation metadata consumed by the engine. Lookups of unknown names fail with
/// [`SqlClauseError::MetadataNotFound`].
pub trait ColumnMetaProvider: Send + Sync {
    fn table(&self, db_name: &str) -> Result<&TableMeta, SqlClauseError>;

    fn foreign(&self, local_table: &str, property: &str) -> Result<&ForeignMeta, SqlClauseError>;
}

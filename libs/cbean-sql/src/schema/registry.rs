// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::{clause_error::SqlClauseError, config::ConfigError};

use super::{ColumnMeta, ColumnMetaProvider, ForeignMeta, TableMeta};

/// In-memory [`ColumnMetaProvider`]. Relations are resolved into an explicit
/// `(table, property) -> ForeignMeta` map when they are added.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: IndexMap<String, TableMeta>,
    foreigns: IndexMap<(String, String), ForeignMeta>,
}

fn table_key(db_name: &str) -> String {
    db_name.to_uppercase()
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: TableMeta) -> Result<(), SqlClauseError> {
        let key = table_key(&table.db_name);
        if self.tables.contains_key(&key) {
            return Err(SqlClauseError::IllegalArgument(format!(
                "Duplicate table '{}'",
                table.db_name
            )));
        }
        self.tables.insert(key, table);
        Ok(())
    }

    pub fn add_foreign(&mut self, foreign: ForeignMeta) -> Result<(), SqlClauseError> {
        let local = self.table(&foreign.local_table)?;
        let foreign_table = self.table(&foreign.foreign_table)?;

        if foreign.column_pairs.is_empty() {
            return Err(SqlClauseError::IllegalArgument(format!(
                "The relation '{}' of '{}' has no join columns",
                foreign.property, foreign.local_table
            )));
        }
        for (local_column, foreign_column) in &foreign.column_pairs {
            local.require_column(local_column)?;
            foreign_table.require_column(foreign_column)?;
        }

        let key = (table_key(&foreign.local_table), foreign.property.clone());
        if self.foreigns.contains_key(&key) {
            return Err(SqlClauseError::IllegalArgument(format!(
                "Duplicate relation '{}' of '{}'",
                foreign.property, foreign.local_table
            )));
        }
        debug!(
            local = foreign.local_table,
            property = foreign.property,
            foreign = foreign.foreign_table,
            "Registered relation"
        );
        self.foreigns.insert(key, foreign);
        Ok(())
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableMeta> {
        self.tables.values()
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let schema: SchemaSer = toml::from_str(toml_str)?;
        Ok(schema.try_into()?)
    }
}

impl ColumnMetaProvider for SchemaRegistry {
    fn table(&self, db_name: &str) -> Result<&TableMeta, SqlClauseError> {
        self.tables
            .get(&table_key(db_name))
            .ok_or_else(|| SqlClauseError::MetadataNotFound(format!("Table '{db_name}' not found")))
    }

    fn foreign(&self, local_table: &str, property: &str) -> Result<&ForeignMeta, SqlClauseError> {
        self.foreigns
            .get(&(table_key(local_table), property.to_string()))
            .ok_or_else(|| {
                SqlClauseError::MetadataNotFound(format!(
                    "Relation '{property}' not found in table '{local_table}'"
                ))
            })
    }
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SchemaSer {
    #[serde(default)]
    pub table: Vec<TableSer>,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TableSer {
    pub name: String,
    #[serde(rename = "sql-name")]
    pub sql_name: Option<String>,
    #[serde(rename = "primary-key", default)]
    pub primary_key: Vec<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub foreign: Vec<ForeignSer>,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ForeignSer {
    pub property: String,
    pub table: String,
    /// `[local, foreign]` column pairs
    pub columns: Vec<(String, String)>,
    #[serde(rename = "fixed-condition")]
    pub fixed_condition: Option<String>,
}

impl TryFrom<&TableSer> for TableMeta {
    type Error = SqlClauseError;

    fn try_from(table: &TableSer) -> Result<Self, Self::Error> {
        let mut meta = TableMeta::new(&table.name)?;
        if let Some(sql_name) = &table.sql_name {
            meta = meta.with_sql_name(sql_name)?;
        }
        for column in &table.columns {
            let column_meta = if table
                .primary_key
                .iter()
                .any(|pk| pk.eq_ignore_ascii_case(column))
            {
                ColumnMeta::primary(column)?
            } else {
                ColumnMeta::new(column)?
            };
            meta = meta.with_column(column_meta);
        }
        for pk in &table.primary_key {
            meta.require_column(pk)?;
        }
        Ok(meta)
    }
}

impl TryFrom<SchemaSer> for SchemaRegistry {
    type Error = SqlClauseError;

    fn try_from(schema: SchemaSer) -> Result<Self, Self::Error> {
        let mut registry = SchemaRegistry::new();

        // all tables first, relations may point forward
        for table in &schema.table {
            registry.add_table(TableMeta::try_from(table)?)?;
        }

        for table in &schema.table {
            for foreign in &table.foreign {
                let mut meta = ForeignMeta::new(&foreign.property, &table.name, &foreign.table);
                for (local_column, foreign_column) in &foreign.columns {
                    meta = meta.with_column_pair(local_column, foreign_column);
                }
                if let Some(fixed_condition) = &foreign.fixed_condition {
                    meta = meta.with_fixed_condition(fixed_condition);
                }
                registry.add_foreign(meta)?;
            }
        }

        Ok(registry)
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    clause_error::SqlClauseError,
    sql::column_name::{ColumnSqlName, TableSqlName},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub db_name: String,
    pub sql_name: ColumnSqlName,
    pub primary_key: bool,
}

impl ColumnMeta {
    pub fn new(db_name: &str) -> Result<Self, SqlClauseError> {
        Ok(Self {
            db_name: db_name.to_string(),
            sql_name: ColumnSqlName::new(db_name)?,
            primary_key: false,
        })
    }

    pub fn primary(db_name: &str) -> Result<Self, SqlClauseError> {
        Ok(Self {
            primary_key: true,
            ..Self::new(db_name)?
        })
    }

    pub fn with_sql_name(self, sql_name: &str) -> Result<Self, SqlClauseError> {
        Ok(Self {
            sql_name: ColumnSqlName::new(sql_name)?,
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableMeta {
    pub db_name: String,
    pub sql_name: TableSqlName,
    /// In declaration order, which is also the select order
    pub columns: Vec<ColumnMeta>,
}

impl TableMeta {
    pub fn new(db_name: &str) -> Result<Self, SqlClauseError> {
        Ok(Self {
            db_name: db_name.to_string(),
            sql_name: TableSqlName::new(db_name)?,
            columns: vec![],
        })
    }

    pub fn with_sql_name(self, sql_name: &str) -> Result<Self, SqlClauseError> {
        Ok(Self {
            sql_name: TableSqlName::new(sql_name)?,
            ..self
        })
    }

    pub fn with_column(mut self, column: ColumnMeta) -> Self {
        self.columns.push(column);
        self
    }

    pub fn column(&self, db_name: &str) -> Option<&ColumnMeta> {
        self.columns
            .iter()
            .find(|column| column.db_name.eq_ignore_ascii_case(db_name))
    }

    pub fn require_column(&self, db_name: &str) -> Result<&ColumnMeta, SqlClauseError> {
        self.column(db_name).ok_or_else(|| {
            SqlClauseError::MetadataNotFound(format!(
                "Column '{}' not found in table '{}'",
                db_name, self.db_name
            ))
        })
    }

    pub fn primary_keys(&self) -> Vec<&ColumnMeta> {
        self.columns.iter().filter(|column| column.primary_key).collect()
    }

    pub fn has_compound_primary_key(&self) -> bool {
        self.primary_keys().len() > 1
    }
}

/// A relation from a local table to a foreign table, addressed by its property name.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignMeta {
    pub property: String,
    pub local_table: String,
    pub foreign_table: String,
    /// `(local column, foreign column)` DB names
    pub column_pairs: Vec<(String, String)>,
    /// Extra join condition using `$$alias$$`, `$$localAlias$$` and `/*$name*/` variables
    pub fixed_condition: Option<String>,
}

impl ForeignMeta {
    pub fn new(property: &str, local_table: &str, foreign_table: &str) -> Self {
        Self {
            property: property.to_string(),
            local_table: local_table.to_string(),
            foreign_table: foreign_table.to_string(),
            column_pairs: vec![],
            fixed_condition: None,
        }
    }

    pub fn with_column_pair(mut self, local_column: &str, foreign_column: &str) -> Self {
        self.column_pairs
            .push((local_column.to_string(), foreign_column.to_string()));
        self
    }

    pub fn with_fixed_condition(self, fixed_condition: &str) -> Self {
        Self {
            fixed_condition: Some(fixed_condition.to_string()),
            ..self
        }
    }
}

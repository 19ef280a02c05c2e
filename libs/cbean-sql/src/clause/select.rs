// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Display;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    clause_error::{SqlClauseError, WithContext},
    schema::TableMeta,
};

use super::SqlClause;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectClauseType {
    #[default]
    Columns,
    Count,
    Max,
    Min,
    Sum,
    Avg,
}

impl SelectClauseType {
    /// Every type but [`SelectClauseType::Columns`] selects a single aggregated value
    pub fn is_scalar(&self) -> bool {
        !matches!(self, SelectClauseType::Columns)
    }

    pub fn function_name(&self) -> Option<&'static str> {
        match self {
            SelectClauseType::Columns => None,
            SelectClauseType::Count => Some("count"),
            SelectClauseType::Max => Some("max"),
            SelectClauseType::Min => Some("min"),
            SelectClauseType::Sum => Some("sum"),
            SelectClauseType::Avg => Some("avg"),
        }
    }
}

impl Display for SelectClauseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.function_name().unwrap_or("columns"))
    }
}

/// One entry of the select clause.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectedColumn {
    /// `alias.COLUMN`, or the alias name of a deriving sub-query
    pub key: String,
    pub expression: String,
    pub alias: String,
}

impl SqlClause {
    pub fn select_clause_type(&self) -> SelectClauseType {
        self.select_clause_type
    }

    /// Switch the select clause type, remembering the current one for a single rollback.
    pub fn classify_select_clause_type(&mut self, select_clause_type: SelectClauseType) {
        debug!(from = %self.select_clause_type, to = %select_clause_type, "Classified select clause type");
        self.previous_select_clause_type = Some(self.select_clause_type);
        self.select_clause_type = select_clause_type;
    }

    /// Restore the type saved by the last classification. Only one level is remembered.
    pub fn rollback_select_clause_type(&mut self) {
        self.select_clause_type = self.previous_select_clause_type.unwrap_or_default();
    }

    pub fn enable_select_index(&mut self) {
        self.select_index_enabled = true;
    }

    pub fn disable_select_index(&mut self) {
        self.select_index_enabled = false;
    }

    pub fn is_select_index_enabled(&self) -> bool {
        self.select_index_enabled
    }

    /// Select the columns of a joined relation, aliased `<COLUMN><suffix>`.
    pub fn register_selected_relation(
        &mut self,
        foreign_alias: &str,
        relation_no_suffix: &str,
    ) -> Result<(), SqlClauseError> {
        if self.purpose.is_no_setup_select() {
            return Err(self.unsupported_for_purpose("Setup-select"));
        }
        if !self.outer_joins.contains_key(foreign_alias) {
            return Err(SqlClauseError::IllegalState(format!(
                "The alias '{foreign_alias}' is not registered as an outer join"
            )));
        }
        if self.selected_relations.contains_key(foreign_alias) {
            warn!(foreign_alias, "The relation is already selected, ignoring");
            return Ok(());
        }
        debug!(foreign_alias, relation_no_suffix, "Registered selected relation");
        self.selected_relations
            .insert(foreign_alias.to_string(), relation_no_suffix.to_string());
        Ok(())
    }

    /// Restrict the columns selected for `table_alias`. Once a column is specified for an alias,
    /// only the specified columns of that alias are selected.
    pub fn specify_select_column(
        &mut self,
        table_alias: &str,
        column_db_name: &str,
    ) -> Result<(), SqlClauseError> {
        let base_alias = self.base_alias();
        let context = format!("While specifying the select column '{table_alias}.{column_db_name}':");
        let column = if table_alias == base_alias {
            self.table
                .require_column(column_db_name)
                .with_context(context)?
                .db_name
                .clone()
        } else {
            if self.purpose.is_no_specify_relation() {
                return Err(self.unsupported_for_purpose("Specifying a relation column"));
            }
            if !self.selected_relations.contains_key(table_alias) {
                return Err(SqlClauseError::IllegalState(format!(
                    "The relation '{table_alias}' should be selected before specifying its columns"
                )));
            }
            self.alias_table(table_alias)?
                .require_column(column_db_name)
                .with_context(context)?
                .db_name
                .clone()
        };

        let already_specified = self
            .specified_select_columns
            .get(table_alias)
            .is_some_and(|columns| columns.contains(&column));
        if self.purpose.is_no_specify_column_two_or_more()
            && !already_specified
            && self.specified_column_count() > 0
        {
            return Err(self.unsupported_for_purpose("Specifying two or more columns"));
        }

        debug!(table_alias, column, "Specified select column");
        self.specified_select_columns
            .entry(table_alias.to_string())
            .or_default()
            .insert(column);
        Ok(())
    }

    /// Add a `(<sub-query>) as <alias_name>` select column
    pub fn specify_deriving_sub_query(
        &mut self,
        alias_name: &str,
        sub_query: &str,
    ) -> Result<(), SqlClauseError> {
        if self.purpose.is_no_specify_derived_referrer() {
            return Err(self.unsupported_for_purpose("A deriving sub-query"));
        }
        if alias_name.trim().is_empty() || sub_query.trim().is_empty() {
            return Err(SqlClauseError::IllegalArgument(
                "The deriving sub-query and its alias should not be blank".into(),
            ));
        }
        debug!(alias_name, "Specified deriving sub-query");
        self.deriving_sub_queries
            .insert(alias_name.to_string(), sub_query.to_string());
        Ok(())
    }

    /// The select-alias of every selected column, keyed by `alias.COLUMN` (or the deriving alias
    /// name), as the select clause would render it now.
    pub fn select_alias_map(&self) -> Result<IndexMap<String, String>, SqlClauseError> {
        Ok(self
            .select_columns()?
            .into_iter()
            .map(|column| (column.key, column.alias))
            .collect())
    }

    fn specified_column_count(&self) -> usize {
        self.specified_select_columns.values().map(|columns| columns.len()).sum()
    }

    /// Metadata of the table behind an alias (the base alias or a join alias)
    pub(crate) fn alias_table(&self, table_alias: &str) -> Result<&TableMeta, SqlClauseError> {
        if table_alias == self.base_alias() {
            return Ok(&self.table);
        }
        let join = self.outer_joins.get(table_alias).ok_or_else(|| {
            SqlClauseError::IllegalState(format!(
                "The alias '{table_alias}' is not registered as an outer join"
            ))
        })?;
        self.provider.table(&join.foreign_table_db_name)
    }

    fn is_specified_out(&self, table_alias: &str, column_db_name: &str, keep: bool) -> bool {
        match self.specified_select_columns.get(table_alias) {
            Some(columns) => !keep && !columns.contains(column_db_name),
            None => false,
        }
    }

    /// Enumerate the select columns: local columns, then the selected relations, then the
    /// deriving sub-queries.
    pub(crate) fn select_columns(&self) -> Result<Vec<SelectedColumn>, SqlClauseError> {
        let base_alias = self.base_alias();
        // a scalar over a union needs the primary key to keep the branch rows distinct
        let keep_primary_key = self.select_clause_type.is_scalar() && self.has_union_query();

        let mut columns = vec![];
        let mut push = |key: String, expression: String, natural_alias: String| {
            let alias = if self.select_index_enabled {
                format!("c{}", columns.len() + 1)
            } else {
                natural_alias
            };
            columns.push(SelectedColumn {
                key,
                expression,
                alias,
            });
        };

        for column in &self.table.columns {
            if self.is_specified_out(&base_alias, &column.db_name, keep_primary_key && column.primary_key) {
                continue;
            }
            let real_name = format!("{}.{}", base_alias, column.sql_name);
            push(real_name.clone(), real_name, column.db_name.clone());
        }

        for (foreign_alias, suffix) in &self.selected_relations {
            let table = self.alias_table(foreign_alias)?;
            for column in &table.columns {
                if self.is_specified_out(foreign_alias, &column.db_name, false) {
                    continue;
                }
                let real_name = format!("{}.{}", foreign_alias, column.sql_name);
                push(
                    real_name.clone(),
                    real_name,
                    format!("{}{}", column.db_name, suffix),
                );
            }
        }

        for (alias_name, sub_query) in &self.deriving_sub_queries {
            push(alias_name.clone(), format!("({sub_query})"), alias_name.clone());
        }

        Ok(columns)
    }

    /// The only specified column as `(alias, alias.SQL_NAME)`, required by MAX/MIN/SUM/AVG
    pub(crate) fn single_specified_column(&self) -> Result<(String, String), SqlClauseError> {
        let specified = self.specified_column_count();
        if specified != 1 {
            return Err(SqlClauseError::AmbiguousScalarColumn {
                select_type: self.select_clause_type,
                specified,
            });
        }
        let (table_alias, column_db_name) = self
            .specified_select_columns
            .iter()
            .find_map(|(alias, columns)| columns.first().map(|column| (alias, column)))
            .ok_or_else(|| SqlClauseError::IllegalState("No specified column".into()))?;
        let column = self.alias_table(table_alias)?.require_column(column_db_name)?;
        Ok((table_alias.clone(), format!("{}.{}", table_alias, column.sql_name)))
    }

    /// `select <hint> <columns>` or, for a scalar type without union, `select <agg>(...)`
    pub(crate) fn build_select_clause(
        &self,
        columns: &[SelectedColumn],
        select_hint: &str,
    ) -> Result<String, SqlClauseError> {
        if let Some(function_name) = self.select_clause_type.function_name()
            && !self.has_union_query()
        {
            if self.select_clause_type == SelectClauseType::Count {
                return Ok("select count(*)".to_string());
            }
            let (_, real_name) = self.single_specified_column()?;
            return Ok(format!("select {function_name}({real_name})"));
        }

        let bare = self.purpose.is_any_sub_query();
        let rendered: Vec<String> = columns
            .iter()
            .map(|column| {
                if bare {
                    column.expression.clone()
                } else {
                    format!("{} as {}", column.expression, column.alias)
                }
            })
            .collect();

        Ok(format!("select{} {}", select_hint, rendered.join(", ")))
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use tracing::debug;

use crate::{
    clause_error::{SqlClauseError, WithContext},
    sql::{
        ExpressionBuilder, SqlBuilder,
        column_name::ColumnRealName,
        fixed_condition::FixedConditionContext,
        join::{LeftOuterJoinInfo, build_table_reference},
        query_value::QueryValue,
    },
};

use super::SqlClause;

impl SqlClause {
    /// Join the relation `foreign_property` of the table behind `local_alias` and return the
    /// alias of the joined table. Registering the same relation from the same alias again
    /// returns the existing alias.
    pub fn register_outer_join(
        &mut self,
        local_alias: &str,
        foreign_property: &str,
    ) -> Result<String, SqlClauseError> {
        if let Some(existing) = self
            .outer_joins
            .values()
            .find(|join| join.local_alias == local_alias && join.property == foreign_property)
        {
            debug!(alias = existing.foreign_alias, "Reusing registered outer join");
            return Ok(existing.foreign_alias.clone());
        }

        let provider = Arc::clone(&self.provider);
        let local_table = self.alias_table(local_alias)?;
        let context = format!("While joining '{foreign_property}' from '{local_alias}':");
        let foreign = provider
            .foreign(&local_table.db_name, foreign_property)
            .with_context(context.clone())?;
        let foreign_table = provider
            .table(&foreign.foreign_table)
            .with_context(context)?;

        let foreign_alias = self.relation_alias(&foreign_table.db_name, self.outer_joins.len());

        let join_on_pairs = foreign
            .column_pairs
            .iter()
            .map(|(local_column, foreign_column)| {
                Ok((
                    ColumnRealName::new(
                        local_alias,
                        local_table.require_column(local_column)?.sql_name.clone(),
                    ),
                    ColumnRealName::new(
                        &foreign_alias,
                        foreign_table.require_column(foreign_column)?.sql_name.clone(),
                    ),
                ))
            })
            .collect::<Result<Vec<_>, SqlClauseError>>()?;

        let fixed_condition = foreign
            .fixed_condition
            .as_deref()
            .map(|fixed_condition| {
                self.fixed_condition_resolver.resolve(
                    fixed_condition,
                    &FixedConditionContext {
                        local_alias,
                        foreign_alias: &foreign_alias,
                        parameters: &self.fixed_parameters,
                        dialect: self.dialect.as_ref(),
                    },
                )
            })
            .transpose()?;

        debug!(
            local_alias,
            foreign_property,
            foreign_alias,
            "Registered outer join"
        );

        let join = LeftOuterJoinInfo {
            local_alias: local_alias.to_string(),
            foreign_alias: foreign_alias.clone(),
            property: foreign_property.to_string(),
            foreign_table_db_name: foreign_table.db_name.clone(),
            foreign_table: foreign_table.sql_name.clone(),
            join_on_pairs,
            fixed_condition,
            inline_where_list: vec![],
            additional_on_clauses: vec![],
            inner_join: false,
        };
        self.outer_joins.insert(foreign_alias.clone(), join);

        Ok(foreign_alias)
    }

    pub fn change_to_inner_join(&mut self, foreign_alias: &str) -> Result<(), SqlClauseError> {
        let join = self.join_mut(foreign_alias)?;
        join.inner_join = true;
        debug!(foreign_alias, "Changed to inner join");
        Ok(())
    }

    /// A parameter that fixed conditions of joins registered afterwards can refer to as
    /// `/*$name*/`
    pub fn register_outer_join_fixed_parameter(
        &mut self,
        name: &str,
        value: impl Into<QueryValue>,
    ) -> Result<(), SqlClauseError> {
        if name.trim().is_empty() {
            return Err(SqlClauseError::IllegalArgument(
                "The fixed condition parameter name should not be blank".into(),
            ));
        }
        self.fixed_parameters.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn outer_join(&self, foreign_alias: &str) -> Option<&LeftOuterJoinInfo> {
        self.outer_joins.get(foreign_alias)
    }

    pub fn has_outer_join(&self) -> bool {
        !self.outer_joins.is_empty()
    }

    pub(crate) fn join_mut(
        &mut self,
        foreign_alias: &str,
    ) -> Result<&mut LeftOuterJoinInfo, SqlClauseError> {
        self.outer_joins.get_mut(foreign_alias).ok_or_else(|| {
            SqlClauseError::IllegalState(format!(
                "The alias '{foreign_alias}' is not registered as an outer join"
            ))
        })
    }

    /// No dialect places a hint after the joins
    pub fn from_hint(&self) -> String {
        String::new()
    }

    /// ` from <base table> [<joins>]`
    pub(crate) fn build_from_clause(&self, from_base_table_hint: &str) -> String {
        let mut builder = SqlBuilder::new();
        builder.push_str(" from ");

        let in_parentheses = self.dialect.is_join_in_parentheses();
        if in_parentheses {
            for _ in 0..self.outer_joins.len() {
                builder.push('(');
            }
        }

        build_table_reference(
            &mut builder,
            &self.table.sql_name,
            &self.base_alias(),
            &self.base_inline_where_list,
        );
        builder.push_str(from_base_table_hint);

        for join in self.outer_joins.values() {
            builder.push_space();
            join.build(&mut builder);
            if in_parentheses {
                builder.push(')');
            }
        }

        builder.push_str(self.from_hint());
        builder.into_sql()
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::trace;

use crate::{
    clause_error::SqlClauseError,
    config::ClauseConfig,
    dialect::SqlDialect,
    sql::{
        SqlBuilder,
        column_name::ColumnRealName,
        condition_key::{ConditionKey, QueryModeProvider},
        condition_value::ConditionValue,
        join::INLINE_ALIAS,
        like_search::LikeSearchOption,
        query_clause::QueryClause,
    },
};

use super::{
    SqlClause,
    template::{
        UNION_WHERE_CLAUSE_MARK, UNION_WHERE_FIRST_CONDITION_MARK, WHERE_CLAUSE_MARK,
        WHERE_FIRST_CONDITION_MARK,
    },
};

/// The list a clause is registered into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum WhereTarget {
    Where,
    BaseInline,
    JoinInline(String),
    JoinOn(String),
}

/// Which marks the where clause carries when rendered as a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WhereMarks {
    None,
    Where,
    UnionWhere,
}

struct ClauseQueryMode<'a> {
    dialect: &'a dyn SqlDialect,
    config: &'a ClauseConfig,
    target: &'a WhereTarget,
    or_scope: bool,
    and_part: bool,
}

impl QueryModeProvider for ClauseQueryMode<'_> {
    fn is_or_scope_query(&self) -> bool {
        self.or_scope
    }

    fn is_or_scope_query_and_part(&self) -> bool {
        self.and_part
    }

    fn is_inline(&self) -> bool {
        matches!(self.target, WhereTarget::BaseInline | WhereTarget::JoinInline(_))
    }

    fn is_on_clause(&self) -> bool {
        matches!(self.target, WhereTarget::JoinOn(_))
    }

    fn dialect(&self) -> &dyn SqlDialect {
        self.dialect
    }

    fn is_null_or_empty_checked(&self) -> bool {
        self.config.null_or_empty_checked
    }

    fn in_scope_limit(&self) -> Option<usize> {
        self.config.in_scope_limit.or(self.dialect.in_scope_limit())
    }
}

impl SqlClause {
    pub fn register_where_clause(
        &mut self,
        column: &ColumnRealName,
        key: ConditionKey,
        value: &ConditionValue,
        option: Option<&LikeSearchOption>,
    ) -> Result<(), SqlClauseError> {
        self.register_keyed(WhereTarget::Where, column, key, value, option)
    }

    /// Register an opaque clause text on the top-level where list
    pub fn register_where_clause_text(&mut self, clause: &str) -> Result<(), SqlClauseError> {
        if clause.trim().is_empty() {
            return Err(SqlClauseError::IllegalArgument(
                "The where clause text should not be blank".into(),
            ));
        }
        self.check_query_allowed()?;
        self.append_clauses(WhereTarget::Where, vec![QueryClause::String(clause.to_string())])
    }

    /// Filter the base table inside an inline view `(select * from T dfinlineloc where ...)`
    pub fn register_base_table_inline_where_clause(
        &mut self,
        column_db_name: &str,
        key: ConditionKey,
        value: &ConditionValue,
        option: Option<&LikeSearchOption>,
    ) -> Result<(), SqlClauseError> {
        let column = ColumnRealName::new(
            INLINE_ALIAS,
            self.table.require_column(column_db_name)?.sql_name.clone(),
        );
        self.register_keyed(WhereTarget::BaseInline, &column, key, value, option)
    }

    /// Filter a joined table, either inside an inline view or, with `on_clause`, as an extra
    /// `on` predicate of the join.
    pub fn register_outer_join_inline_where_clause(
        &mut self,
        foreign_alias: &str,
        column_db_name: &str,
        key: ConditionKey,
        value: &ConditionValue,
        option: Option<&LikeSearchOption>,
        on_clause: bool,
    ) -> Result<(), SqlClauseError> {
        if !self.outer_joins.contains_key(foreign_alias) {
            return Err(SqlClauseError::IllegalState(format!(
                "The alias '{foreign_alias}' is not registered as an outer join"
            )));
        }
        let sql_name = self
            .alias_table(foreign_alias)?
            .require_column(column_db_name)?
            .sql_name
            .clone();

        let (column, target) = if on_clause {
            (
                ColumnRealName::new(foreign_alias, sql_name),
                WhereTarget::JoinOn(foreign_alias.to_string()),
            )
        } else {
            (
                ColumnRealName::new(INLINE_ALIAS, sql_name),
                WhereTarget::JoinInline(foreign_alias.to_string()),
            )
        };
        self.register_keyed(target, &column, key, value, option)
    }

    /// Move the last top-level where clause to the front
    pub fn exchange_first_where_clause_for_last_one(&mut self) {
        if self.where_list.len() > 1
            && let Some(last) = self.where_list.pop()
        {
            self.where_list.insert(0, last);
        }
    }

    pub fn has_where_clause_on_base_query(&self) -> bool {
        !self.where_list.is_empty() || !self.base_inline_where_list.is_empty()
    }

    /// Clear the top-level and base-table inline where clauses
    pub fn clear_where_clauses(&mut self) {
        self.where_list.clear();
        self.base_inline_where_list.clear();
    }

    pub fn where_clauses(&self) -> &[QueryClause] {
        &self.where_list
    }

    fn check_query_allowed(&self) -> Result<(), SqlClauseError> {
        if self.purpose.is_no_query() {
            Err(self.unsupported_for_purpose("A query condition"))
        } else {
            Ok(())
        }
    }

    fn register_keyed(
        &mut self,
        target: WhereTarget,
        column: &ColumnRealName,
        key: ConditionKey,
        value: &ConditionValue,
        option: Option<&LikeSearchOption>,
    ) -> Result<(), SqlClauseError> {
        self.check_query_allowed()?;

        let mode = ClauseQueryMode {
            dialect: self.dialect.as_ref(),
            config: &self.config,
            target: &target,
            or_scope: self.or_scope.is_effective(),
            and_part: self.or_scope.is_and_part_effective(),
        };
        let mut clauses = vec![];
        key.add_where_clause(&mode, &mut clauses, column, value, option)?;

        self.append_clauses(target, clauses)
    }

    /// Append to the innermost open or-scope, or to the real list when none is open
    pub(crate) fn append_clauses(
        &mut self,
        target: WhereTarget,
        clauses: Vec<QueryClause>,
    ) -> Result<(), SqlClauseError> {
        for clause in clauses {
            trace!(?target, ?clause, or_scope = self.or_scope.is_effective(), "Registered clause");
            if self.or_scope.is_effective() {
                self.or_scope.push(target.clone(), clause)?;
            } else {
                self.real_list_mut(&target)?.push(clause);
            }
        }
        Ok(())
    }

    pub(crate) fn real_list_mut(
        &mut self,
        target: &WhereTarget,
    ) -> Result<&mut Vec<QueryClause>, SqlClauseError> {
        match target {
            WhereTarget::Where => Ok(&mut self.where_list),
            WhereTarget::BaseInline => Ok(&mut self.base_inline_where_list),
            WhereTarget::JoinInline(alias) => Ok(&mut self.join_mut(alias)?.inline_where_list),
            WhereTarget::JoinOn(alias) => Ok(&mut self.join_mut(alias)?.additional_on_clauses),
        }
    }

    /// ` where a and b`, optionally carrying template marks
    pub(crate) fn build_where_clause(&self, marks: WhereMarks) -> String {
        let (clause_mark, first_condition_mark) = match marks {
            WhereMarks::None => ("", ""),
            WhereMarks::Where => (WHERE_CLAUSE_MARK, WHERE_FIRST_CONDITION_MARK),
            WhereMarks::UnionWhere => (UNION_WHERE_CLAUSE_MARK, UNION_WHERE_FIRST_CONDITION_MARK),
        };

        let mut builder = SqlBuilder::new();
        if self.where_list.is_empty() {
            if !clause_mark.is_empty() {
                builder.push_space();
                builder.push_str(clause_mark);
            }
        } else {
            builder.push_str(" where ");
            builder.push_str(first_condition_mark);
            builder.push_elems(&self.where_list, " and ");
        }
        builder.into_sql()
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt::Display, str::FromStr};

use tracing::trace;

use crate::{clause_error::SqlClauseError, dialect::SqlDialect};

use super::{
    SqlBuilder,
    column_name::ColumnRealName,
    condition_value::{BindMode, ConditionValue},
    like_search::LikeSearchOption,
    query_clause::QueryClause,
    query_value::QueryValue,
};

/// What the clause being registered is for. Implemented by the engine so that a key can adapt
/// the clauses it produces.
pub trait QueryModeProvider {
    /// Whether an OR-scope is open (each appended clause becomes an OR term)
    fn is_or_scope_query(&self) -> bool;

    /// Whether an AND-part of the open OR-scope is open (appended clauses are ANDed together)
    fn is_or_scope_query_and_part(&self) -> bool {
        false
    }

    /// Whether the clause goes into an inline view
    fn is_inline(&self) -> bool;

    /// Whether the clause goes into a join's `on` predicate
    fn is_on_clause(&self) -> bool;

    fn dialect(&self) -> &dyn SqlDialect;

    /// Reject null or empty values instead of ignoring the condition
    fn is_null_or_empty_checked(&self) -> bool {
        false
    }

    fn in_scope_limit(&self) -> Option<usize> {
        self.dialect().in_scope_limit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKey {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    InScope,
    NotInScope,
    LikeSearch,
    NotLikeSearch,
    IsNull,
    IsNotNull,
    IsNullOrEmpty,
}

impl ConditionKey {
    pub const ALL: [ConditionKey; 13] = [
        ConditionKey::Equal,
        ConditionKey::NotEqual,
        ConditionKey::GreaterThan,
        ConditionKey::GreaterEqual,
        ConditionKey::LessThan,
        ConditionKey::LessEqual,
        ConditionKey::InScope,
        ConditionKey::NotInScope,
        ConditionKey::LikeSearch,
        ConditionKey::NotLikeSearch,
        ConditionKey::IsNull,
        ConditionKey::IsNotNull,
        ConditionKey::IsNullOrEmpty,
    ];

    /// Name used in bind locations (`/*pmb.<base>.<name>*/`) and query files
    pub fn name(&self) -> &'static str {
        match self {
            ConditionKey::Equal => "equal",
            ConditionKey::NotEqual => "notEqual",
            ConditionKey::GreaterThan => "greaterThan",
            ConditionKey::GreaterEqual => "greaterEqual",
            ConditionKey::LessThan => "lessThan",
            ConditionKey::LessEqual => "lessEqual",
            ConditionKey::InScope => "inScope",
            ConditionKey::NotInScope => "notInScope",
            ConditionKey::LikeSearch => "likeSearch",
            ConditionKey::NotLikeSearch => "notLikeSearch",
            ConditionKey::IsNull => "isNull",
            ConditionKey::IsNotNull => "isNotNull",
            ConditionKey::IsNullOrEmpty => "isNullOrEmpty",
        }
    }

    pub fn operator(&self) -> &'static str {
        match self {
            ConditionKey::Equal => "=",
            ConditionKey::NotEqual => "<>",
            ConditionKey::GreaterThan => ">",
            ConditionKey::GreaterEqual => ">=",
            ConditionKey::LessThan => "<",
            ConditionKey::LessEqual => "<=",
            ConditionKey::InScope => "in",
            ConditionKey::NotInScope => "not in",
            ConditionKey::LikeSearch => "like",
            ConditionKey::NotLikeSearch => "not like",
            ConditionKey::IsNull => "is null",
            ConditionKey::IsNotNull => "is not null",
            ConditionKey::IsNullOrEmpty => "is null or",
        }
    }

    /// The null checking keys take no value
    pub fn needs_value(&self) -> bool {
        !matches!(
            self,
            ConditionKey::IsNull | ConditionKey::IsNotNull | ConditionKey::IsNullOrEmpty
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ConditionKey::InScope | ConditionKey::NotInScope)
    }

    pub fn is_like(&self) -> bool {
        matches!(self, ConditionKey::LikeSearch | ConditionKey::NotLikeSearch)
    }

    /// Append the clauses for this key to `target`. Nothing is appended when the value is
    /// missing, null or empty, unless the provider asks for such values to be rejected.
    pub fn add_where_clause(
        &self,
        mode: &dyn QueryModeProvider,
        target: &mut Vec<QueryClause>,
        column: &ColumnRealName,
        value: &ConditionValue,
        option: Option<&LikeSearchOption>,
    ) -> Result<(), SqlClauseError> {
        if option.is_some() && !self.is_like() {
            return Err(SqlClauseError::IllegalArgument(format!(
                "The like-search option is not available for {self} ({column})"
            )));
        }

        trace!(
            key = self.name(),
            %column,
            inline = mode.is_inline(),
            on_clause = mode.is_on_clause(),
            "Adding where clause"
        );

        if !self.needs_value() {
            target.push(self.bound_clause(column, String::new(), None));
            return Ok(());
        }

        let query_value = match value.value(*self) {
            Some(query_value) if !query_value.is_null_or_empty() => query_value,
            _ => {
                if mode.is_null_or_empty_checked() {
                    return Err(SqlClauseError::IllegalArgument(format!(
                        "The value for {self} of {column} should not be null or empty"
                    )));
                }
                trace!(key = self.name(), %column, "Ignoring the condition of a null or empty value");
                return Ok(());
            }
        };

        if self.is_list() {
            return self.add_in_scope_clauses(mode, target, column, value, query_value);
        }

        let operand = match value.bind_mode() {
            BindMode::Bind { location_base } => {
                let dummy = if self.is_like() { "'dummy'" } else { "null" };
                format!("{}{}", self.bind_comment(location_base), dummy)
            }
            BindMode::Embed => self.embedded_operand(mode.dialect(), column, query_value, option)?,
        };

        target.push(self.bound_clause(column, operand, option));
        Ok(())
    }

    fn add_in_scope_clauses(
        &self,
        mode: &dyn QueryModeProvider,
        target: &mut Vec<QueryClause>,
        column: &ColumnRealName,
        value: &ConditionValue,
        query_value: &QueryValue,
    ) -> Result<(), SqlClauseError> {
        if let BindMode::Bind { location_base } = value.bind_mode() {
            let operand = format!("{}(null)", self.bind_comment(location_base));
            target.push(self.bound_clause(column, operand, None));
            return Ok(());
        }

        let elements: Vec<String> = query_value
            .effective_elements()
            .into_iter()
            .map(|elem| elem.render_literal(mode.dialect()))
            .collect();

        let chunk_size = mode
            .in_scope_limit()
            .filter(|limit| *limit > 0)
            .unwrap_or(elements.len().max(1));

        let chunks: Vec<QueryClause> = elements
            .chunks(chunk_size)
            .map(|chunk| self.bound_clause(column, format!("({})", chunk.join(", ")), None))
            .collect();

        let or_terms = *self == ConditionKey::InScope
            && mode.is_or_scope_query()
            && !mode.is_or_scope_query_and_part();
        if chunks.len() == 1 || or_terms {
            // each chunk is an or-term of the scope itself
            target.extend(chunks);
        } else {
            trace!(key = self.name(), %column, chunks = chunks.len(), "Splitting the in-scope list");
            let connector = if *self == ConditionKey::InScope {
                " or "
            } else {
                " and "
            };
            let mut builder = SqlBuilder::new();
            builder.push('(');
            builder.push_elems(&chunks, connector);
            builder.push(')');
            target.push(QueryClause::String(builder.into_sql()));
        }
        Ok(())
    }

    fn embedded_operand(
        &self,
        dialect: &dyn SqlDialect,
        column: &ColumnRealName,
        query_value: &QueryValue,
        option: Option<&LikeSearchOption>,
    ) -> Result<String, SqlClauseError> {
        if !self.is_like() {
            if let QueryValue::List(_) = query_value {
                return Err(SqlClauseError::IllegalArgument(format!(
                    "A list value is not allowed for {self} of {column}"
                )));
            }
            return Ok(query_value.render_literal(dialect));
        }

        match (query_value, option) {
            (QueryValue::Str(text), Some(option)) => {
                Ok(dialect.string_literal(&option.generate_real_value(text)))
            }
            (QueryValue::Str(text), None) => Ok(dialect.string_literal(text)),
            _ => Err(SqlClauseError::IllegalArgument(format!(
                "The value for {self} of {column} should be a string"
            ))),
        }
    }

    fn bind_comment(&self, location_base: &str) -> String {
        format!("/*pmb.{}.{}*/", location_base, self.name())
    }

    fn bound_clause(
        &self,
        column: &ColumnRealName,
        operand: String,
        option: Option<&LikeSearchOption>,
    ) -> QueryClause {
        QueryClause::Bound {
            column: column.clone(),
            key: *self,
            operand,
            option: option.cloned(),
        }
    }

    /// Render `column <operator> operand` for this key
    pub(crate) fn build_predicate(
        &self,
        builder: &mut SqlBuilder,
        column: &ColumnRealName,
        operand: &str,
        option: Option<&LikeSearchOption>,
    ) {
        match self {
            ConditionKey::IsNull | ConditionKey::IsNotNull => {
                builder.push_str(column.to_string());
                builder.push_space();
                builder.push_str(self.operator());
            }
            ConditionKey::IsNullOrEmpty => {
                builder.push_str(format!("({column} is null or {column} = '')"));
            }
            ConditionKey::LikeSearch | ConditionKey::NotLikeSearch => {
                let ignore_case = option.is_some_and(|option| option.ignore_case);
                if ignore_case {
                    builder.push_str(format!(
                        "lower({column}) {} lower({operand})",
                        self.operator()
                    ));
                } else {
                    builder.push_str(format!("{column} {} {operand}", self.operator()));
                }
                if let Some(option) = option {
                    builder.push_str(option.escape_clause());
                }
            }
            _ => {
                builder.push_str(format!("{column} {} {operand}", self.operator()));
            }
        }
    }
}

impl Display for ConditionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConditionKey {
    type Err = SqlClauseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConditionKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| SqlClauseError::IllegalArgument(format!("Unknown condition key: {s}")))
    }
}

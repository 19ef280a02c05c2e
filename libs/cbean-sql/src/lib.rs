// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Assembly engine for condition-bean style queries.
//!
//! A [SqlClause] is created per base table (and per sub-query or union branch). Callers
//! register select columns, joins, where predicates (optionally grouped into OR-scopes),
//! order-by elements, unions and paging, and then render the whole statement with
//! [SqlClause::get_clause]. Everything dialect-specific (paging syntax, locking, nulls
//! ordering, literals) is delegated to a [SqlDialect] chosen once at construction.
//!
//! The engine does no I/O: table and relation metadata come from a [ColumnMetaProvider]
//! (for example the in-memory [SchemaRegistry]), and every failure is a construction-time
//! [SqlClauseError].
pub mod clause;
pub mod config;
pub mod dialect;
pub mod schema;
pub mod sql;

pub mod clause_error;

#[cfg(test)]
pub(crate) mod test_support;

pub use clause::{
    BuildPurpose, SelectClauseType, SqlClause,
    indent::{SUB_QUERY_BEGIN_MARK_PREFIX, SUB_QUERY_END_MARK_PREFIX, SubQueryIndentProcessor},
    template::{
        UNION_SELECT_CLAUSE_MARK, UNION_WHERE_CLAUSE_MARK, UNION_WHERE_FIRST_CONDITION_MARK,
        WHERE_CLAUSE_MARK, WHERE_FIRST_CONDITION_MARK, fill_where_template,
    },
};
pub use clause_error::{SqlClauseError, WithContext};
pub use config::{
    ClauseConfig, ClauseConfigSer, ConfigError, Environment, MapEnvironment, SystemEnvironment,
};
pub use dialect::{
    DatabaseKind, Lock, NullsOrdering, Paging, PagingWindow, SqlDialect, create_dialect,
};
pub use schema::{
    ColumnMeta, ColumnMetaProvider, ForeignMeta, ForeignSer, SchemaRegistry, SchemaSer, TableMeta,
    TableSer,
};
pub use sql::{
    column_name::{ColumnRealName, ColumnSqlName, TableSqlName},
    condition_key::{ConditionKey, QueryModeProvider},
    condition_value::{BindMode, ConditionValue},
    fixed_condition::{AliasVariableResolver, FixedConditionContext, FixedConditionResolver},
    like_search::{LikeSearchMode, LikeSearchOption},
    order::{OrderByClause, OrderByElement, Ordering},
    query_clause::QueryClause,
    query_value::QueryValue,
};

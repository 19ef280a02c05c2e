// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod assemble;
mod from;
mod or_scope;
mod order_by;
mod paging;
mod purpose;
mod query_update;
mod select;
mod union;
mod where_clause;

pub mod indent;
pub mod template;

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::{
    clause_error::SqlClauseError,
    config::ClauseConfig,
    dialect::{SqlDialect, create_dialect},
    schema::{ColumnMetaProvider, TableMeta},
    sql::{
        fixed_condition::{AliasVariableResolver, FixedConditionResolver},
        join::LeftOuterJoinInfo,
        order::OrderByClause,
        query_clause::QueryClause,
        query_value::QueryValue,
    },
};

use or_scope::OrScopeTracker;
use paging::FetchScope;
use union::UnionQuery;

pub use purpose::BuildPurpose;
pub use select::SelectClauseType;

pub(crate) const BASE_ALIAS: &str = "dflocal";
const RELATION_ALIAS_PREFIX: &str = "dfrelation_";
pub(crate) const MAIN_ALIAS: &str = "dfmain";

/// The clause assembly engine for one base table reference.
///
/// Registrations only accumulate fragments; nothing is rendered until [`SqlClause::get_clause`]
/// (or one of the template/query-update variants) is called, and rendering never mutates the
/// engine.
pub struct SqlClause {
    provider: Arc<dyn ColumnMetaProvider>,
    dialect: Arc<dyn SqlDialect>,
    fixed_condition_resolver: Arc<dyn FixedConditionResolver>,
    config: ClauseConfig,
    table: TableMeta,
    purpose: BuildPurpose,
    sub_query_level: usize,

    select_clause_type: SelectClauseType,
    previous_select_clause_type: Option<SelectClauseType>,
    select_index_enabled: bool,
    /// Table alias -> column DB names
    specified_select_columns: IndexMap<String, IndexSet<String>>,
    /// Foreign alias -> natural alias suffix of its columns
    selected_relations: IndexMap<String, String>,
    /// Alias name -> sub-query text
    deriving_sub_queries: IndexMap<String, String>,

    /// Foreign alias -> join, in registration order
    outer_joins: IndexMap<String, LeftOuterJoinInfo>,
    fixed_parameters: IndexMap<String, QueryValue>,

    where_list: Vec<QueryClause>,
    base_inline_where_list: Vec<QueryClause>,
    or_scope: OrScopeTracker,

    order_by: OrderByClause,
    order_by_effective: bool,

    unions: Vec<UnionQuery>,
    fetch: FetchScope,
    lock_for_update: bool,
}

impl SqlClause {
    pub fn new(
        table_db_name: &str,
        provider: Arc<dyn ColumnMetaProvider>,
        config: &ClauseConfig,
    ) -> Result<Self, SqlClauseError> {
        Self::with_purpose(table_db_name, provider, config, BuildPurpose::NormalUse)
    }

    pub fn with_purpose(
        table_db_name: &str,
        provider: Arc<dyn ColumnMetaProvider>,
        config: &ClauseConfig,
        purpose: BuildPurpose,
    ) -> Result<Self, SqlClauseError> {
        let dialect: Arc<dyn SqlDialect> = Arc::from(create_dialect(config.dialect));
        Self::create(
            table_db_name,
            provider,
            dialect,
            Arc::new(AliasVariableResolver),
            config.clone(),
            purpose,
            0,
        )
    }

    /// An engine for a sub-query embedded into `parent`. It shares the parent's collaborators and
    /// configuration, and its aliases are prefixed with the sub-query level.
    pub fn for_sub_query(
        parent: &SqlClause,
        table_db_name: &str,
        purpose: BuildPurpose,
    ) -> Result<Self, SqlClauseError> {
        if !purpose.is_any_sub_query() {
            return Err(SqlClauseError::IllegalArgument(format!(
                "The purpose '{purpose}' is not a sub-query purpose"
            )));
        }
        Self::create(
            table_db_name,
            Arc::clone(&parent.provider),
            Arc::clone(&parent.dialect),
            Arc::clone(&parent.fixed_condition_resolver),
            parent.config.clone(),
            purpose,
            parent.sub_query_level + 1,
        )
    }

    fn create(
        table_db_name: &str,
        provider: Arc<dyn ColumnMetaProvider>,
        dialect: Arc<dyn SqlDialect>,
        fixed_condition_resolver: Arc<dyn FixedConditionResolver>,
        config: ClauseConfig,
        purpose: BuildPurpose,
        sub_query_level: usize,
    ) -> Result<Self, SqlClauseError> {
        if table_db_name.trim().is_empty() {
            return Err(SqlClauseError::IllegalArgument(
                "The table name should not be blank".into(),
            ));
        }
        let table = provider.table(table_db_name)?.clone();

        debug!(
            table = table.db_name,
            dialect = %dialect.kind(),
            %purpose,
            sub_query_level,
            "Created sql clause"
        );

        Ok(Self {
            provider,
            dialect,
            fixed_condition_resolver,
            select_index_enabled: config.select_index,
            config,
            table,
            purpose,
            sub_query_level,
            select_clause_type: SelectClauseType::Columns,
            previous_select_clause_type: None,
            specified_select_columns: IndexMap::new(),
            selected_relations: IndexMap::new(),
            deriving_sub_queries: IndexMap::new(),
            outer_joins: IndexMap::new(),
            fixed_parameters: IndexMap::new(),
            where_list: vec![],
            base_inline_where_list: vec![],
            or_scope: OrScopeTracker::default(),
            order_by: OrderByClause::new(),
            order_by_effective: true,
            unions: vec![],
            fetch: FetchScope::default(),
            lock_for_update: false,
        })
    }

    /// Replace the resolver of fixed join conditions. Affects joins registered afterwards.
    pub fn with_fixed_condition_resolver(
        self,
        fixed_condition_resolver: Arc<dyn FixedConditionResolver>,
    ) -> Self {
        Self {
            fixed_condition_resolver,
            ..self
        }
    }

    /// `dflocal` for a main query, `sub<N>loc` for a sub-query of level N
    pub fn base_alias(&self) -> String {
        if self.sub_query_level == 0 {
            BASE_ALIAS.to_string()
        } else {
            format!("sub{}loc", self.sub_query_level)
        }
    }

    fn relation_alias(&self, foreign_table_db_name: &str, relation_no: usize) -> String {
        if self.sub_query_level == 0 {
            format!("{RELATION_ALIAS_PREFIX}{foreign_table_db_name}_{relation_no}")
        } else {
            format!(
                "sub{}rel_{}_{}",
                self.sub_query_level, foreign_table_db_name, relation_no
            )
        }
    }

    pub fn table(&self) -> &TableMeta {
        &self.table
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &ClauseConfig {
        &self.config
    }

    pub fn purpose(&self) -> BuildPurpose {
        self.purpose
    }

    pub fn sub_query_level(&self) -> usize {
        self.sub_query_level
    }

    fn unsupported_for_purpose(&self, operation: &str) -> SqlClauseError {
        SqlClauseError::Unsupported(format!(
            "{} is not allowed for the purpose '{}'",
            operation, self.purpose
        ))
    }
}

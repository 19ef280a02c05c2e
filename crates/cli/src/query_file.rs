// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Query files: a TOML description of a schema, a configuration and one condition-bean query,
//! replayed onto a [`SqlClause`].

use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result, anyhow, bail};
use cbean_sql::{
    BuildPurpose, ClauseConfig, ClauseConfigSer, ColumnMetaProvider, ColumnRealName,
    ConditionKey, ConditionValue, LikeSearchMode, LikeSearchOption, QueryValue, SchemaRegistry,
    SchemaSer, SelectClauseType, SqlClause, TableSer,
};
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

const INLINE_BASE: &str = "base";

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct QueryFileSer {
    config: Option<ClauseConfigSer>,
    #[serde(default)]
    table: Vec<TableSer>,
    query: QuerySer,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct QuerySer {
    table: String,
    /// `columns` (the default), `count`, `max`, `min`, `sum` or `avg`
    select: Option<String>,
    /// `[join.]COLUMN` entries restricting the selected columns
    #[serde(default)]
    columns: Vec<String>,
    #[serde(rename = "fixed-parameters", default)]
    fixed_parameters: IndexMap<String, toml::Value>,
    #[serde(default)]
    join: Vec<JoinSer>,
    #[serde(rename = "where", default)]
    where_clauses: Vec<WhereSer>,
    #[serde(rename = "or-scope", default)]
    or_scopes: Vec<OrScopeSer>,
    #[serde(default)]
    union: Vec<UnionSer>,
    #[serde(rename = "order-by", default)]
    order_by: Vec<OrderBySer>,
    fetch: Option<FetchSer>,
    #[serde(default)]
    lock: bool,
    /// Column DB name -> parameter comment, rendering a query update instead of a select
    update: Option<IndexMap<String, String>>,
    #[serde(default)]
    delete: bool,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct JoinSer {
    name: String,
    /// Name of the join this relation hangs off; the base table when absent
    from: Option<String>,
    property: String,
    #[serde(default)]
    inner: bool,
    #[serde(default)]
    select: bool,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct WhereSer {
    column: String,
    key: String,
    value: Option<toml::Value>,
    /// `prefix`, `suffix`, `contain` or `exact`
    like: Option<String>,
    #[serde(rename = "ignore-case", default)]
    ignore_case: bool,
    /// Bind through parameter comments under this location instead of embedding literals
    bind: Option<String>,
    /// `base` or a join name: filter inside an inline view
    inline: Option<String>,
    /// A join name: add the condition to the join's `on` predicate
    on: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct OrScopeSer {
    #[serde(rename = "where", default)]
    where_clauses: Vec<WhereSer>,
    #[serde(rename = "and-part", default)]
    and_parts: Vec<AndPartSer>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct AndPartSer {
    #[serde(rename = "where")]
    where_clauses: Vec<WhereSer>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct UnionSer {
    #[serde(default)]
    all: bool,
    #[serde(rename = "where", default)]
    where_clauses: Vec<WhereSer>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct OrderBySer {
    /// `[join.]COLUMN`, several joined by `/`
    path: String,
    #[serde(default = "default_ascending")]
    ascending: bool,
    /// `first` or `last`
    nulls: Option<String>,
    manual: Option<Vec<toml::Value>>,
}

fn default_ascending() -> bool {
    true
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct FetchSer {
    size: i64,
    #[serde(default)]
    start: i64,
    page: Option<i64>,
}

pub struct QueryFile {
    pub config: ClauseConfig,
    schema: Arc<dyn ColumnMetaProvider>,
    query: QuerySer,
}

impl QueryFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid query file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let ser: QueryFileSer = toml::from_str(text)?;
        let config = match ser.config {
            Some(config) => ClauseConfig::try_from(config)?,
            None => ClauseConfig::default(),
        };
        let registry = SchemaRegistry::try_from(SchemaSer { table: ser.table })?;
        Ok(Self {
            config,
            schema: Arc::new(registry),
            query: ser.query,
        })
    }

    /// Render the query: a select, or a query update/delete when the file asks for one
    pub fn render(&self, config: &ClauseConfig) -> Result<String> {
        let clause = self.build_clause(config)?;
        let sql = if self.query.delete {
            clause.get_clause_query_delete()?
        } else if let Some(columns) = &self.query.update {
            clause.get_clause_query_update(columns)?
        } else {
            clause.get_clause()?
        };
        Ok(sql)
    }

    pub fn build_clause(&self, config: &ClauseConfig) -> Result<SqlClause> {
        let query = &self.query;
        if query.delete && query.update.is_some() {
            bail!("A query cannot be both an update and a delete");
        }

        let mut clause = SqlClause::new(&query.table, Arc::clone(&self.schema), config)?;

        for (name, value) in &query.fixed_parameters {
            clause.register_outer_join_fixed_parameter(name, query_value(value)?)?;
        }

        let mut joins = JoinAliases::default();
        for (index, join) in query.join.iter().enumerate() {
            let local_alias = match &join.from {
                Some(from) => joins.resolve(from)?.to_string(),
                None => clause.base_alias(),
            };
            let alias = clause.register_outer_join(&local_alias, &join.property)?;
            if join.inner {
                clause.change_to_inner_join(&alias)?;
            }
            if join.select {
                clause.register_selected_relation(&alias, &format!("_{index}"))?;
            }
            debug!(name = join.name, alias, "Registered join");
            joins.aliases.insert(join.name.clone(), alias);
        }

        for column in &query.columns {
            let (alias, column) = joins.split_column(&clause, column)?;
            clause.specify_select_column(&alias, column)?;
        }

        for where_ser in &query.where_clauses {
            register_where(&mut clause, &joins, where_ser)?;
        }

        for or_scope in &query.or_scopes {
            clause.make_or_scope_query_effective()?;
            for where_ser in &or_scope.where_clauses {
                register_where(&mut clause, &joins, where_ser)?;
            }
            for and_part in &or_scope.and_parts {
                clause.begin_or_scope_query_and_part()?;
                for where_ser in &and_part.where_clauses {
                    register_where(&mut clause, &joins, where_ser)?;
                }
                clause.end_or_scope_query_and_part()?;
            }
            clause.close_or_scope_query()?;
        }

        for union in &query.union {
            let mut branch = SqlClause::with_purpose(
                &query.table,
                Arc::clone(&self.schema),
                config,
                BuildPurpose::UnionQuery,
            )?;
            let branch_joins = JoinAliases::default();
            for where_ser in &union.where_clauses {
                register_where(&mut branch, &branch_joins, where_ser)?;
            }
            clause.register_union_sub_query(&branch, union.all)?;
        }

        for order_by in &query.order_by {
            let path = order_by
                .path
                .split('/')
                .map(|column| {
                    let (alias, column) = joins.split_column(&clause, column.trim())?;
                    Ok(format!("{alias}.{column}"))
                })
                .collect::<Result<Vec<_>>>()?
                .join("/");
            clause.register_order_by(&path, order_by.ascending)?;

            match order_by.nulls.as_deref() {
                None => {}
                Some("first") => clause.add_nulls_first_to_previous_order_by_element()?,
                Some("last") => clause.add_nulls_last_to_previous_order_by_element()?,
                Some(other) => bail!("Unknown nulls ordering '{other}', expected first or last"),
            }
            if let Some(manual) = &order_by.manual {
                let values = manual.iter().map(query_value).collect::<Result<Vec<_>>>()?;
                clause.add_manual_order_to_previous_order_by_element(values)?;
            }
        }

        if let Some(fetch) = &query.fetch {
            if fetch.start > 0 {
                clause.fetch_scope(fetch.start, fetch.size)?;
            } else {
                clause.fetch_first(fetch.size)?;
            }
            if let Some(page) = fetch.page {
                clause.fetch_page(page)?;
            }
        }

        if query.lock {
            clause.lock_for_update()?;
        }

        if let Some(select) = &query.select {
            clause.classify_select_clause_type(select_clause_type(select)?);
        }

        Ok(clause)
    }
}

/// Join names of a query file mapped to the aliases the engine assigned
#[derive(Default)]
struct JoinAliases {
    aliases: IndexMap<String, String>,
}

impl JoinAliases {
    fn resolve(&self, name: &str) -> Result<&str> {
        self.aliases
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("Unknown join '{name}'"))
    }

    /// `[join.]COLUMN` to the table alias and the column DB name
    fn split_column<'c>(&self, clause: &SqlClause, column: &'c str) -> Result<(String, &'c str)> {
        match column.split_once('.') {
            None => Ok((clause.base_alias(), column)),
            Some((prefix, column)) if prefix == clause.base_alias() => {
                Ok((prefix.to_string(), column))
            }
            Some((prefix, column)) => Ok((self.resolve(prefix)?.to_string(), column)),
        }
    }
}

fn register_where(clause: &mut SqlClause, joins: &JoinAliases, where_ser: &WhereSer) -> Result<()> {
    let key: ConditionKey = where_ser.key.parse()?;
    let mut value = match &where_ser.bind {
        Some(location_base) => ConditionValue::bound(location_base.as_str()),
        None => ConditionValue::new(),
    };
    if let Some(raw) = &where_ser.value {
        value.set(key, query_value(raw)?);
    }
    let option = like_search_option(where_ser)?;

    match (&where_ser.inline, &where_ser.on) {
        (Some(_), Some(_)) => bail!(
            "The condition on '{}' cannot be both inline and on-clause",
            where_ser.column
        ),
        (Some(target), None) if target == INLINE_BASE => clause
            .register_base_table_inline_where_clause(
                &where_ser.column,
                key,
                &value,
                option.as_ref(),
            )?,
        (Some(join), None) => clause.register_outer_join_inline_where_clause(
            joins.resolve(join)?,
            &where_ser.column,
            key,
            &value,
            option.as_ref(),
            false,
        )?,
        (None, Some(join)) => clause.register_outer_join_inline_where_clause(
            joins.resolve(join)?,
            &where_ser.column,
            key,
            &value,
            option.as_ref(),
            true,
        )?,
        (None, None) => {
            let (alias, column) = joins.split_column(clause, &where_ser.column)?;
            let column = ColumnRealName::parse(&format!("{alias}.{column}"))?;
            clause.register_where_clause(&column, key, &value, option.as_ref())?
        }
    }
    Ok(())
}

fn like_search_option(where_ser: &WhereSer) -> Result<Option<LikeSearchOption>> {
    let mode = match where_ser.like.as_deref() {
        None if !where_ser.ignore_case => return Ok(None),
        None | Some("exact") => LikeSearchMode::Exact,
        Some("prefix") => LikeSearchMode::Prefix,
        Some("suffix") => LikeSearchMode::Suffix,
        Some("contain") => LikeSearchMode::Contain,
        Some(other) => bail!("Unknown like search mode '{other}'"),
    };
    let option = LikeSearchOption::new(mode);
    Ok(Some(if where_ser.ignore_case {
        option.with_ignore_case()
    } else {
        option
    }))
}

fn select_clause_type(name: &str) -> Result<SelectClauseType> {
    Ok(match name {
        "columns" => SelectClauseType::Columns,
        "count" => SelectClauseType::Count,
        "max" => SelectClauseType::Max,
        "min" => SelectClauseType::Min,
        "sum" => SelectClauseType::Sum,
        "avg" => SelectClauseType::Avg,
        other => bail!("Unknown select type '{other}'"),
    })
}

fn query_value(value: &toml::Value) -> Result<QueryValue> {
    match value {
        toml::Value::String(s) => Ok(QueryValue::Str(s.clone())),
        toml::Value::Integer(i) => Ok(QueryValue::Int(*i)),
        toml::Value::Float(f) => Ok(QueryValue::decimal(&f.to_string())?),
        toml::Value::Boolean(b) => Ok(QueryValue::Bool(*b)),
        toml::Value::Datetime(datetime) => datetime_value(&datetime.to_string()),
        toml::Value::Array(values) => Ok(QueryValue::List(
            values.iter().map(query_value).collect::<Result<_>>()?,
        )),
        toml::Value::Table(_) => bail!("A table is not a condition value"),
    }
}

fn datetime_value(text: &str) -> Result<QueryValue> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(QueryValue::Date(date));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(QueryValue::Timestamp)
        .with_context(|| format!("Unsupported datetime '{text}', expected a local date or time"))
}

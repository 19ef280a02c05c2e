// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod db2;
mod derby;
mod h2;
mod ms_access;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;

use std::{fmt::Display, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};

use crate::{clause_error::SqlClauseError, config::ConfigError};

pub use crate::sql::order::{NullsOrdering, Ordering};
pub use db2::Db2Dialect;
pub use derby::DerbyDialect;
pub use h2::H2Dialect;
pub use ms_access::MsAccessDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseKind {
    MySql,
    Postgres,
    Oracle,
    SqlServer,
    H2,
    Db2,
    Derby,
    Sqlite,
    MsAccess,
}

impl DatabaseKind {
    pub const ALL: [DatabaseKind; 9] = [
        DatabaseKind::MySql,
        DatabaseKind::Postgres,
        DatabaseKind::Oracle,
        DatabaseKind::SqlServer,
        DatabaseKind::H2,
        DatabaseKind::Db2,
        DatabaseKind::Derby,
        DatabaseKind::Sqlite,
        DatabaseKind::MsAccess,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatabaseKind::MySql => "mysql",
            DatabaseKind::Postgres => "postgresql",
            DatabaseKind::Oracle => "oracle",
            DatabaseKind::SqlServer => "sqlserver",
            DatabaseKind::H2 => "h2",
            DatabaseKind::Db2 => "db2",
            DatabaseKind::Derby => "derby",
            DatabaseKind::Sqlite => "sqlite",
            DatabaseKind::MsAccess => "msaccess",
        }
    }
}

impl Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatabaseKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(DatabaseKind::MySql),
            "postgresql" | "postgres" => Ok(DatabaseKind::Postgres),
            "oracle" => Ok(DatabaseKind::Oracle),
            "sqlserver" | "mssql" => Ok(DatabaseKind::SqlServer),
            "h2" => Ok(DatabaseKind::H2),
            "db2" => Ok(DatabaseKind::Db2),
            "derby" => Ok(DatabaseKind::Derby),
            "sqlite" => Ok(DatabaseKind::Sqlite),
            "msaccess" | "access" => Ok(DatabaseKind::MsAccess),
            _ => Err(ConfigError::UnknownDialect(s.to_string())),
        }
    }
}

/// The rows a paging query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingWindow {
    /// 0-origin index of the first row
    pub start_index: i64,
    pub size: i64,
    /// Whether the statement already carries an order-by
    pub has_order_by: bool,
}

impl PagingWindow {
    pub fn end_index(&self) -> i64 {
        self.start_index + self.size
    }
}

/// Paging text of a dialect: a hint placed right after `select` and a statement suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    pub select_hint: String,
    pub sql_suffix: String,
}

/// Row locking text of a dialect: a hint after the base table reference and/or a statement suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lock {
    pub from_base_table_hint: String,
    pub sql_suffix: String,
}

impl Lock {
    pub fn suffix(sql_suffix: impl Into<String>) -> Self {
        Self {
            from_base_table_hint: String::new(),
            sql_suffix: sql_suffix.into(),
        }
    }
}

/// Everything that differs between databases as far as clause assembly goes. Chosen once per
/// engine through [`create_dialect`].
pub trait SqlDialect: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> DatabaseKind;

    fn is_fetch_start_index_supported(&self) -> bool {
        true
    }

    fn is_fetch_size_supported(&self) -> bool {
        true
    }

    fn paging(&self, window: &PagingWindow) -> Paging;

    fn lock_for_update(&self, _base_alias: &str) -> Result<Lock, SqlClauseError> {
        Ok(Lock::suffix(" for update"))
    }

    /// Render an order-by element with the requested position of nulls
    fn nulls_ordering(&self, column: &str, ordering: Ordering, nulls: NullsOrdering) -> String {
        native_nulls_ordering(column, ordering, nulls)
    }

    /// Whether each join must close a parenthesis opened before the base table
    fn is_join_in_parentheses(&self) -> bool {
        false
    }

    /// Whether a union statement must be wrapped by `select * from (...) dfmain` before
    /// order-by and paging apply
    fn requires_union_normal_select_enclosing(&self) -> bool {
        false
    }

    /// Whether `update T ... where PK in (select ... from T ...)` is accepted
    fn is_update_sub_query_use_local_table_supported(&self) -> bool {
        true
    }

    /// Maximum number of elements in one `in (...)` list
    fn in_scope_limit(&self) -> Option<usize> {
        None
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn date_literal(&self, date: NaiveDate) -> String {
        format!("'{}'", date.format("%Y-%m-%d"))
    }

    fn timestamp_literal(&self, timestamp: NaiveDateTime) -> String {
        format!("'{}'", timestamp.format("%Y-%m-%d %H:%M:%S%.3f"))
    }

    fn bool_literal(&self, value: bool) -> String {
        value.to_string()
    }
}

pub fn create_dialect(kind: DatabaseKind) -> Box<dyn SqlDialect> {
    match kind {
        DatabaseKind::MySql => Box::new(MySqlDialect),
        DatabaseKind::Postgres => Box::new(PostgresDialect),
        DatabaseKind::Oracle => Box::new(OracleDialect),
        DatabaseKind::SqlServer => Box::new(SqlServerDialect),
        DatabaseKind::H2 => Box::new(H2Dialect),
        DatabaseKind::Db2 => Box::new(Db2Dialect),
        DatabaseKind::Derby => Box::new(DerbyDialect),
        DatabaseKind::Sqlite => Box::new(SqliteDialect),
        DatabaseKind::MsAccess => Box::new(MsAccessDialect),
    }
}

fn native_nulls_ordering(column: &str, ordering: Ordering, nulls: NullsOrdering) -> String {
    let nulls = match nulls {
        NullsOrdering::First => "first",
        NullsOrdering::Last => "last",
    };
    format!("{} {} nulls {}", column, ordering.as_sql(), nulls)
}

/// `case when <col> is not null then 1 else 0 end asc, <col> <dir>` for dialects without
/// `nulls first/last`.
fn emulated_nulls_ordering(column: &str, ordering: Ordering, nulls: NullsOrdering) -> String {
    let (not_null_rank, null_rank) = match nulls {
        NullsOrdering::First => (1, 0),
        NullsOrdering::Last => (0, 1),
    };
    format!(
        "case when {column} is not null then {not_null_rank} else {null_rank} end asc, {column} {}",
        ordering.as_sql()
    )
}

/// `offset <start> rows fetch next <size> rows only`
fn offset_fetch_suffix(window: &PagingWindow) -> String {
    format!(
        " offset {} rows fetch next {} rows only",
        window.start_index, window.size
    )
}

fn numeric_bool_literal(value: bool) -> String {
    let literal = if value { "1" } else { "0" };
    literal.to_string()
}

fn unsupported_lock(kind: DatabaseKind) -> SqlClauseError {
    SqlClauseError::Unsupported(format!("Lock for update is not supported by {kind}"))
}

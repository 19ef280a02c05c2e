// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::{clause_error::SqlClauseError, dialect::SqlDialect};

static DECIMAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("Invalid decimal pattern"));

/// A query-time value, embedded into SQL as a literal or referenced through a bind comment.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Textual decimal, validated by [`QueryValue::decimal`]
    Decimal(String),
    Str(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    List(Vec<QueryValue>),
}

impl QueryValue {
    pub fn decimal(text: &str) -> Result<Self, SqlClauseError> {
        if DECIMAL_PATTERN.is_match(text) {
            Ok(QueryValue::Decimal(text.to_string()))
        } else {
            Err(SqlClauseError::IllegalArgument(format!(
                "Not a decimal value: {text}"
            )))
        }
    }

    /// True for null, empty strings and empty lists. A list made only of such values is
    /// considered empty as well.
    pub fn is_null_or_empty(&self) -> bool {
        match self {
            QueryValue::Null => true,
            QueryValue::Str(s) => s.is_empty(),
            QueryValue::List(values) => values.iter().all(|v| v.is_null_or_empty()),
            _ => false,
        }
    }

    /// The elements of a list value without null or empty entries. A scalar is treated as a
    /// one-element list.
    pub fn effective_elements(&self) -> Vec<&QueryValue> {
        match self {
            QueryValue::List(values) => values.iter().filter(|v| !v.is_null_or_empty()).collect(),
            other if other.is_null_or_empty() => vec![],
            other => vec![other],
        }
    }

    pub fn render_literal(&self, dialect: &dyn SqlDialect) -> String {
        match self {
            QueryValue::Null => "null".to_string(),
            QueryValue::Bool(b) => dialect.bool_literal(*b),
            QueryValue::Int(i) => i.to_string(),
            QueryValue::Decimal(d) => d.clone(),
            QueryValue::Str(s) => dialect.string_literal(s),
            QueryValue::Date(d) => dialect.date_literal(*d),
            QueryValue::Timestamp(ts) => dialect.timestamp_literal(*ts),
            QueryValue::List(values) => {
                let elems: Vec<_> = values.iter().map(|v| v.render_literal(dialect)).collect();
                format!("({})", elems.join(", "))
            }
        }
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<NaiveDate> for QueryValue {
    fn from(value: NaiveDate) -> Self {
        QueryValue::Date(value)
    }
}

impl From<NaiveDateTime> for QueryValue {
    fn from(value: NaiveDateTime) -> Self {
        QueryValue::Timestamp(value)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::{DatabaseKind, create_dialect};

    use super::*;

    #[test]
    fn null_or_empty() {
        assert!(QueryValue::Null.is_null_or_empty());
        assert!(QueryValue::from("").is_null_or_empty());
        assert!(QueryValue::from(Vec::<i64>::new()).is_null_or_empty());
        assert!(QueryValue::List(vec![QueryValue::Null]).is_null_or_empty());
        assert!(!QueryValue::from(0).is_null_or_empty());
        assert_eq!(QueryValue::from(None::<i64>), QueryValue::Null);
    }

    #[test]
    fn decimal_validation() {
        assert_eq!(
            QueryValue::decimal("-12.50").unwrap(),
            QueryValue::Decimal("-12.50".into())
        );
        assert!(QueryValue::decimal("1e3").is_err());
        assert!(QueryValue::decimal("1; drop table MEMBER").is_err());
    }

    #[test]
    fn literals_follow_dialect() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mysql = create_dialect(DatabaseKind::MySql);
        let access = create_dialect(DatabaseKind::MsAccess);
        let sqlserver = create_dialect(DatabaseKind::SqlServer);

        assert_eq!(QueryValue::from("O'Hara").render_literal(mysql.as_ref()), "'O''Hara'");
        assert_eq!(QueryValue::from(date).render_literal(mysql.as_ref()), "'2024-02-29'");
        assert_eq!(QueryValue::from(date).render_literal(access.as_ref()), "#2024-02-29#");
        assert_eq!(QueryValue::from(true).render_literal(mysql.as_ref()), "true");
        assert_eq!(QueryValue::from(true).render_literal(sqlserver.as_ref()), "1");
        assert_eq!(
            QueryValue::from(vec![1, 2]).render_literal(mysql.as_ref()),
            "(1, 2)"
        );
    }
}

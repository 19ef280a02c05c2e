// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{self, Display};

use crate::clause_error::SqlClauseError;

fn require_non_blank(kind: &str, name: &str) -> Result<(), SqlClauseError> {
    if name.trim().is_empty() {
        Err(SqlClauseError::IllegalArgument(format!(
            "The {kind} name should not be blank"
        )))
    } else {
        Ok(())
    }
}

/// Table name as it appears in SQL (already escaped for the dialect if needed)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableSqlName(String);

impl TableSqlName {
    pub fn new(name: impl Into<String>) -> Result<Self, SqlClauseError> {
        let name = name.into();
        require_non_blank("table", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TableSqlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Column name as it appears in SQL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSqlName(String);

impl ColumnSqlName {
    pub fn new(name: impl Into<String>) -> Result<Self, SqlClauseError> {
        let name = name.into();
        require_non_blank("column", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ColumnSqlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column qualified by the alias of the table reference it belongs to, e.g. `dflocal.MEMBER_ID`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRealName {
    table_alias: Option<String>,
    column: ColumnSqlName,
}

impl ColumnRealName {
    pub fn new(table_alias: impl Into<String>, column: ColumnSqlName) -> Self {
        Self {
            table_alias: Some(table_alias.into()),
            column,
        }
    }

    pub fn unqualified(column: ColumnSqlName) -> Self {
        Self {
            table_alias: None,
            column,
        }
    }

    /// Parse `alias.COLUMN` (or a bare `COLUMN`)
    pub fn parse(text: &str) -> Result<Self, SqlClauseError> {
        match text.trim().split_once('.') {
            Some((alias, column)) => {
                require_non_blank("table alias", alias)?;
                Ok(Self::new(alias, ColumnSqlName::new(column)?))
            }
            None => Ok(Self::unqualified(ColumnSqlName::new(text.trim())?)),
        }
    }

    pub fn table_alias(&self) -> Option<&str> {
        self.table_alias.as_deref()
    }

    pub fn column(&self) -> &ColumnSqlName {
        &self.column
    }
}

impl Display for ColumnRealName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table_alias {
            Some(alias) => write!(f, "{}.{}", alias, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert!(matches!(
            TableSqlName::new("  "),
            Err(SqlClauseError::IllegalArgument(_))
        ));
        assert!(matches!(
            ColumnSqlName::new(""),
            Err(SqlClauseError::IllegalArgument(_))
        ));
        assert!(ColumnRealName::parse(".MEMBER_ID").is_err());
    }

    #[test]
    fn real_name_parse_and_display() {
        let qualified = ColumnRealName::parse("dflocal.MEMBER_ID").unwrap();
        assert_eq!(qualified.table_alias(), Some("dflocal"));
        assert_eq!(qualified.to_string(), "dflocal.MEMBER_ID");

        let bare = ColumnRealName::parse("MEMBER_ID").unwrap();
        assert_eq!(bare.table_alias(), None);
        assert_eq!(bare.to_string(), "MEMBER_ID");

        assert_eq!(
            qualified,
            ColumnRealName::new("dflocal", ColumnSqlName::new("MEMBER_ID").unwrap())
        );
    }
}

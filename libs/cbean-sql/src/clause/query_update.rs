// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use tracing::instrument;

use crate::clause_error::SqlClauseError;

use super::{SqlClause, indent::SubQueryIndentProcessor, where_clause::WhereMarks};

impl SqlClause {
    /// `update <table> set <column> = <parameter>, ...` over the rows this clause selects.
    /// `column_parameters` maps column DB names to already rendered values or bind comments.
    #[instrument(
        name = "SqlClause::get_clause_query_update",
        skip_all,
        fields(table = %self.table.db_name)
    )]
    pub fn get_clause_query_update(
        &self,
        column_parameters: &IndexMap<String, String>,
    ) -> Result<String, SqlClauseError> {
        if column_parameters.is_empty() {
            return Err(SqlClauseError::IllegalArgument(
                "The query update needs at least one column".into(),
            ));
        }
        let set_clause = column_parameters
            .iter()
            .map(|(column, parameter)| {
                let sql_name = &self.table.require_column(column)?.sql_name;
                Ok(format!("{sql_name} = {parameter}"))
            })
            .collect::<Result<Vec<_>, SqlClauseError>>()?
            .join(", ");

        let sql = format!(
            "update {} set {}{}",
            self.table.sql_name,
            set_clause,
            self.query_update_where_clause()?
        );
        SubQueryIndentProcessor::process(&sql)
    }

    #[instrument(
        name = "SqlClause::get_clause_query_delete",
        skip_all,
        fields(table = %self.table.db_name)
    )]
    pub fn get_clause_query_delete(&self) -> Result<String, SqlClauseError> {
        let sql = format!(
            "delete from {}{}",
            self.table.sql_name,
            self.query_update_where_clause()?
        );
        SubQueryIndentProcessor::process(&sql)
    }

    /// The where clause of an update or a delete. Joins, unions and an inline view of the base
    /// table need `where <PK> in (<sub-query>)`; otherwise the where clause is used directly with
    /// the base alias stripped.
    fn query_update_where_clause(&self) -> Result<String, SqlClauseError> {
        if self.or_scope.is_effective() {
            return Err(SqlClauseError::IllegalState(
                "The or-scope query is still open".into(),
            ));
        }

        let base_alias = self.base_alias();
        let needs_sub_query = self.has_outer_join()
            || self.has_union_query()
            || !self.base_inline_where_list.is_empty();

        if !needs_sub_query {
            return Ok(strip_alias(
                &self.build_where_clause(WhereMarks::None),
                &base_alias,
            ));
        }

        if self.table.has_compound_primary_key() {
            return Err(SqlClauseError::Unsupported(format!(
                "The query update of {} with joins or unions needs a single primary key",
                self.table.db_name
            )));
        }
        if !self.dialect.is_update_sub_query_use_local_table_supported() {
            return Err(SqlClauseError::Unsupported(format!(
                "The {} dialect cannot update through a sub-query on the same table",
                self.dialect.kind()
            )));
        }
        let primary_key = self
            .table
            .primary_keys()
            .into_iter()
            .next()
            .map(|column| &column.sql_name)
            .ok_or_else(|| {
                SqlClauseError::Unsupported(format!(
                    "The query update of {} with joins or unions needs a primary key",
                    self.table.db_name
                ))
            })?;

        let select = format!("select {base_alias}.{primary_key}");
        Ok(format!(
            " where {primary_key} in ({select}{}{}{})",
            self.build_from_clause(""),
            self.build_where_clause(WhereMarks::None),
            self.build_union_clause(Some(&select))
        ))
    }
}

/// Remove `<alias>.` qualifiers from `sql`, leaving string literals and longer identifiers
/// ending with the alias untouched
fn strip_alias(sql: &str, alias: &str) -> String {
    let qualifier = format!("{alias}.");
    let mut stripped = String::with_capacity(sql.len());
    let mut in_literal = false;
    let mut rest = sql;

    while let Some(c) = rest.chars().next() {
        if c == '\'' {
            in_literal = !in_literal;
        } else if !in_literal
            && rest.starts_with(&qualifier)
            && !stripped
                .chars()
                .next_back()
                .is_some_and(|prev| prev.is_alphanumeric() || prev == '_')
        {
            rest = &rest[qualifier.len()..];
            continue;
        }
        stripped.push(c);
        rest = &rest[c.len_utf8()..];
    }
    stripped
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::{
        dialect::DatabaseKind,
        sql::{
            column_name::ColumnRealName, condition_key::ConditionKey,
            condition_value::ConditionValue,
        },
        test_support::{clause_for, member_clause},
    };

    use super::*;

    fn status_equal(clause: &mut SqlClause, alias: &str, value: &str) {
        clause
            .register_where_clause(
                &ColumnRealName::parse(&format!("{alias}.MEMBER_STATUS_CODE")).unwrap(),
                ConditionKey::Equal,
                &ConditionValue::of(ConditionKey::Equal, value),
                None,
            )
            .unwrap();
    }

    fn parameters() -> IndexMap<String, String> {
        IndexMap::from([
            ("MEMBER_NAME".to_string(), "'Stojkovic'".to_string()),
            ("MEMBER_STATUS_CODE".to_string(), "/*pmb.entity.memberStatusCode*/null".to_string()),
        ])
    }

    #[test]
    fn direct_update_and_delete() {
        let mut clause = member_clause(DatabaseKind::MySql);
        status_equal(&mut clause, "dflocal", "PRV");

        assert_eq!(
            clause.get_clause_query_update(&parameters()).unwrap(),
            "update MEMBER set MEMBER_NAME = 'Stojkovic', \
             MEMBER_STATUS_CODE = /*pmb.entity.memberStatusCode*/null where MEMBER_STATUS_CODE = 'PRV'"
        );
        assert_eq!(
            clause.get_clause_query_delete().unwrap(),
            "delete from MEMBER where MEMBER_STATUS_CODE = 'PRV'"
        );
    }

    #[test]
    fn delete_without_condition() {
        let clause = member_clause(DatabaseKind::Postgres);
        assert_eq!(clause.get_clause_query_delete().unwrap(), "delete from MEMBER");
    }

    #[test]
    fn update_through_sub_query_with_join() {
        let mut clause = member_clause(DatabaseKind::Postgres);
        let alias = clause.register_outer_join("dflocal", "memberStatus").unwrap();
        clause
            .register_where_clause(
                &ColumnRealName::parse(&format!("{alias}.DISPLAY_ORDER")).unwrap(),
                ConditionKey::LessThan,
                &ConditionValue::of(ConditionKey::LessThan, 3),
                None,
            )
            .unwrap();

        assert_eq!(
            clause.get_clause_query_delete().unwrap(),
            "delete from MEMBER where MEMBER_ID in (select dflocal.MEMBER_ID from MEMBER dflocal \
             left outer join MEMBER_STATUS dfrelation_MEMBER_STATUS_0 \
             on dflocal.MEMBER_STATUS_CODE = dfrelation_MEMBER_STATUS_0.MEMBER_STATUS_CODE \
             where dfrelation_MEMBER_STATUS_0.DISPLAY_ORDER < 3)"
        );
    }

    #[test]
    fn unsupported_shapes() {
        let mut mysql = member_clause(DatabaseKind::MySql);
        mysql.register_outer_join("dflocal", "memberStatus").unwrap();
        assert!(matches!(
            mysql.get_clause_query_delete(),
            Err(SqlClauseError::Unsupported(_))
        ));

        let mut detail = clause_for("PURCHASE_DETAIL", DatabaseKind::Postgres);
        detail.register_outer_join("dflocal", "purchase").unwrap();
        assert!(matches!(
            detail.get_clause_query_delete(),
            Err(SqlClauseError::Unsupported(_))
        ));

        let clause = member_clause(DatabaseKind::Postgres);
        assert!(matches!(
            clause.get_clause_query_update(&IndexMap::new()),
            Err(SqlClauseError::IllegalArgument(_))
        ));
    }

    #[test]
    fn direct_form_keeps_literals() {
        let mut clause = member_clause(DatabaseKind::Postgres);
        clause
            .register_where_clause(
                &ColumnRealName::parse("dflocal.MEMBER_NAME").unwrap(),
                ConditionKey::Equal,
                &ConditionValue::of(ConditionKey::Equal, "dflocal.x"),
                None,
            )
            .unwrap();

        assert_eq!(
            clause.get_clause_query_delete().unwrap(),
            "delete from MEMBER where MEMBER_NAME = 'dflocal.x'"
        );
    }

    #[test]
    fn strip_alias_respects_identifier_boundaries() {
        assert_eq!(
            strip_alias("dflocal.A = 1 and subdflocal.B = 'it''s dflocal.C'", "dflocal"),
            "A = 1 and subdflocal.B = 'it''s dflocal.C'"
        );
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Template variants of the rendered clause.
//!
//! Embedding collaborators render a clause with marks in place of the where clause (and the
//! union select clause) and fill them in later with [`fill_where_template`]. The mark texts are a
//! stable contract.

use crate::clause_error::SqlClauseError;

use super::{SqlClause, where_clause::WhereMarks};

pub const WHERE_CLAUSE_MARK: &str = "#df:whereClause#";
pub const WHERE_FIRST_CONDITION_MARK: &str = "#df:whereFirstCondition#";
pub const UNION_SELECT_CLAUSE_MARK: &str = "#df:unionSelectClause#";
pub const UNION_WHERE_CLAUSE_MARK: &str = "#df:unionWhereClause#";
pub const UNION_WHERE_FIRST_CONDITION_MARK: &str = "#df:unionWhereFirstCondition#";

impl SqlClause {
    /// From and where clause with union where marks, followed by the unions as templates
    pub fn get_clause_from_where_with_union_template(&self) -> String {
        self.clause_from_where_template(WhereMarks::UnionWhere)
    }

    /// From and where clause with where marks, followed by the unions as templates
    pub fn get_clause_from_where_with_where_union_template(&self) -> String {
        self.clause_from_where_template(WhereMarks::Where)
    }

    fn clause_from_where_template(&self, marks: WhereMarks) -> String {
        let mut sql = self.build_from_clause("");
        sql.push_str(&self.build_where_clause(marks));
        sql.push_str(&self.build_union_clause(None));
        sql
    }

    /// The plain select clause of this engine, as union branches use it
    pub fn get_select_clause(&self) -> Result<String, SqlClauseError> {
        let columns = self.select_columns()?;
        self.build_select_clause(&columns, "")
    }
}

/// Prefix `template` with `select_clause` and resolve every mark. A blank `condition` removes
/// the where marks.
pub fn fill_where_template(template: &str, select_clause: &str, condition: &str) -> String {
    let condition = condition.trim();
    let filled = if condition.is_empty() {
        template
            .replace(&format!(" {WHERE_CLAUSE_MARK}"), "")
            .replace(WHERE_CLAUSE_MARK, "")
            .replace(WHERE_FIRST_CONDITION_MARK, "")
            .replace(&format!(" {UNION_WHERE_CLAUSE_MARK}"), "")
            .replace(UNION_WHERE_CLAUSE_MARK, "")
            .replace(UNION_WHERE_FIRST_CONDITION_MARK, "")
    } else {
        template
            .replace(WHERE_CLAUSE_MARK, &format!("where {condition}"))
            .replace(WHERE_FIRST_CONDITION_MARK, &format!("{condition} and "))
            .replace(UNION_WHERE_CLAUSE_MARK, &format!("where {condition}"))
            .replace(UNION_WHERE_FIRST_CONDITION_MARK, &format!("{condition} and "))
    };
    format!(
        "{}{}",
        select_clause,
        filled.replace(UNION_SELECT_CLAUSE_MARK, select_clause)
    )
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
        test_support::member_clause,
    };

    use super::*;

    fn register_status(clause: &mut SqlClause) {
        clause
            .register_where_clause(
                &ColumnRealName::parse("dflocal.MEMBER_STATUS_CODE").unwrap(),
                ConditionKey::Equal,
                &ConditionValue::of(ConditionKey::Equal, "FML"),
                None,
            )
            .unwrap();
    }

    #[test]
    fn templates_without_where_clause() {
        let clause = member_clause(DatabaseKind::MySql);
        let template = clause.get_clause_from_where_with_where_union_template();
        assert_eq!(template, " from MEMBER dflocal #df:whereClause#");

        assert_eq!(
            fill_where_template(&template, "select dflocal.MEMBER_ID", "dflocal.MEMBER_ID = 3"),
            "select dflocal.MEMBER_ID from MEMBER dflocal where dflocal.MEMBER_ID = 3"
        );
        assert_eq!(
            fill_where_template(&template, "select dflocal.MEMBER_ID", " "),
            "select dflocal.MEMBER_ID from MEMBER dflocal"
        );
    }

    #[test]
    fn templates_with_where_clause() {
        let mut clause = member_clause(DatabaseKind::MySql);
        register_status(&mut clause);

        let template = clause.get_clause_from_where_with_union_template();
        assert_eq!(
            template,
            " from MEMBER dflocal where #df:unionWhereFirstCondition#dflocal.MEMBER_STATUS_CODE = 'FML'"
        );
        assert_eq!(
            fill_where_template(&template, "select count(*)", "dflocal.MEMBER_ID = 3"),
            "select count(*) from MEMBER dflocal where dflocal.MEMBER_ID = 3 and dflocal.MEMBER_STATUS_CODE = 'FML'"
        );
    }

    #[test]
    fn union_select_mark_is_filled() {
        let mut clause = member_clause(DatabaseKind::MySql);
        let mut branch = member_clause(DatabaseKind::MySql);
        register_status(&mut branch);
        clause.register_union_sub_query(&branch, true).unwrap();

        let template = clause.get_clause_from_where_with_where_union_template();
        assert_eq!(
            template,
            " from MEMBER dflocal #df:whereClause# union all #df:unionSelectClause# from MEMBER dflocal \
             where #df:unionWhereFirstCondition#dflocal.MEMBER_STATUS_CODE = 'FML'"
        );
        assert_eq!(
            fill_where_template(&template, "select dflocal.MEMBER_ID", ""),
            "select dflocal.MEMBER_ID from MEMBER dflocal union all select dflocal.MEMBER_ID from MEMBER dflocal \
             where dflocal.MEMBER_STATUS_CODE = 'FML'"
        );
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{
    ExpressionBuilder, SqlBuilder,
    column_name::{ColumnRealName, TableSqlName},
    query_clause::QueryClause,
};

/// Alias of the table inside an inline view `(select * from T dfinlineloc where ...)`
pub const INLINE_ALIAS: &str = "dfinlineloc";

/// One registered relation join.
#[derive(Debug, Clone, PartialEq)]
pub struct LeftOuterJoinInfo {
    /// The local (left) side alias such as `dflocal`
    pub local_alias: String,
    /// The alias of the joined table such as `dfrelation_MEMBER_STATUS_0`
    pub foreign_alias: String,
    /// Relation property on the local table, e.g. `memberStatus`
    pub property: String,
    pub foreign_table_db_name: String,
    pub foreign_table: TableSqlName,
    /// `local.column = foreign.column` pairs in declaration order
    pub join_on_pairs: Vec<(ColumnRealName, ColumnRealName)>,
    /// Fixed condition already resolved for this join
    pub fixed_condition: Option<String>,
    /// Clauses filtering the joined table inside an inline view
    pub inline_where_list: Vec<QueryClause>,
    /// Extra clauses ANDed into the `on` predicate
    pub additional_on_clauses: Vec<QueryClause>,
    pub inner_join: bool,
}

/// Build `(select * from <table> dfinlineloc where ...) <alias>` or `<table> <alias>`.
pub(crate) fn build_table_reference(
    builder: &mut SqlBuilder,
    table: &TableSqlName,
    alias: &str,
    inline_where_list: &[QueryClause],
) {
    if inline_where_list.is_empty() {
        builder.push_str(table.as_str());
    } else {
        builder.push_str("(select * from ");
        builder.push_str(table.as_str());
        builder.push_space();
        builder.push_str(INLINE_ALIAS);
        builder.push_str(" where ");
        builder.push_elems(inline_where_list, " and ");
        builder.push(')');
    }
    builder.push_space();
    builder.push_str(alias);
}

impl ExpressionBuilder for LeftOuterJoinInfo {
    /// Build expression of the form `left outer join <table> <alias> on <pairs> [and <fixed>] [and <on-clauses>]`.
    fn build(&self, builder: &mut SqlBuilder) {
        if self.inner_join {
            builder.push_str("inner join ");
        } else {
            builder.push_str("left outer join ");
        }
        build_table_reference(
            builder,
            &self.foreign_table,
            &self.foreign_alias,
            &self.inline_where_list,
        );
        builder.push_str(" on ");
        builder.push_iter(
            self.join_on_pairs.iter(),
            " and ",
            |builder, (local, foreign)| {
                builder.push_str(format!("{local} = {foreign}"));
            },
        );
        if let Some(fixed_condition) = &self.fixed_condition {
            builder.push_str(" and ");
            builder.push_str(fixed_condition);
        }
        for on_clause in &self.additional_on_clauses {
            builder.push_str(" and ");
            on_clause.build(builder);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::sql::{column_name::ColumnSqlName, condition_key::ConditionKey};

    use super::*;

    fn join() -> LeftOuterJoinInfo {
        let column = |alias: &str, name: &str| {
            ColumnRealName::new(alias, ColumnSqlName::new(name).unwrap())
        };
        LeftOuterJoinInfo {
            local_alias: "dflocal".into(),
            foreign_alias: "dfrelation_MEMBER_STATUS_0".into(),
            property: "memberStatus".into(),
            foreign_table_db_name: "MEMBER_STATUS".into(),
            foreign_table: TableSqlName::new("MEMBER_STATUS").unwrap(),
            join_on_pairs: vec![(
                column("dflocal", "MEMBER_STATUS_CODE"),
                column("dfrelation_MEMBER_STATUS_0", "MEMBER_STATUS_CODE"),
            )],
            fixed_condition: None,
            inline_where_list: vec![],
            additional_on_clauses: vec![],
            inner_join: false,
        }
    }

    #[test]
    fn basic_join() {
        assert_eq!(
            join().to_sql(),
            "left outer join MEMBER_STATUS dfrelation_MEMBER_STATUS_0 on dflocal.MEMBER_STATUS_CODE = dfrelation_MEMBER_STATUS_0.MEMBER_STATUS_CODE"
        );
    }

    #[test]
    fn inner_join_with_fixed_condition_and_inline_view() {
        let mut join = join();
        join.inner_join = true;
        join.fixed_condition = Some("dfrelation_MEMBER_STATUS_0.DISPLAY_ORDER > 0".into());
        join.inline_where_list.push(QueryClause::Bound {
            column: ColumnRealName::new(INLINE_ALIAS, ColumnSqlName::new("STATUS_NAME").unwrap()),
            key: ConditionKey::Equal,
            operand: "'Formal'".into(),
            option: None,
        });
        join.additional_on_clauses
            .push(QueryClause::String("dfrelation_MEMBER_STATUS_0.VISIBLE = 1".into()));

        assert_eq!(
            join.to_sql(),
            "inner join (select * from MEMBER_STATUS dfinlineloc where dfinlineloc.STATUS_NAME = 'Formal') dfrelation_MEMBER_STATUS_0 \
             on dflocal.MEMBER_STATUS_CODE = dfrelation_MEMBER_STATUS_0.MEMBER_STATUS_CODE \
             and dfrelation_MEMBER_STATUS_0.DISPLAY_ORDER > 0 and dfrelation_MEMBER_STATUS_0.VISIBLE = 1"
        );
    }
}

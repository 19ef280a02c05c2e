// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use cbean_sql::{ConditionKey, DatabaseKind, SelectClauseType, SqlClauseError};

mod common;

use common::{MEMBER_COLUMNS, clause, register};

#[test]
fn single_where_clause() {
    let mut member = clause("MEMBER", DatabaseKind::MySql);
    register(&mut member, "dflocal.MEMBER_ID", ConditionKey::Equal, 3);

    assert_eq!(
        member.get_clause().unwrap(),
        format!("select {MEMBER_COLUMNS} from MEMBER dflocal where dflocal.MEMBER_ID = 3")
    );
}

#[test]
fn third_page_suffix() {
    let mut member = clause("MEMBER", DatabaseKind::MySql);
    member.fetch_first(20).unwrap();
    member.fetch_page(3).unwrap();

    assert_eq!(member.page_start_index(), 40);
    assert_eq!(member.page_end_index(), 60);
    assert_eq!(member.sql_suffix().unwrap(), " limit 40, 20");
}

#[test]
fn inner_join_replaces_left_outer_join() {
    let mut member = clause("MEMBER", DatabaseKind::MySql);
    let alias = member.register_outer_join("dflocal", "memberStatus").unwrap();
    member.change_to_inner_join(&alias).unwrap();

    let sql = member.get_clause().unwrap();
    assert!(sql.contains(
        "from MEMBER dflocal inner join MEMBER_STATUS dfrelation_MEMBER_STATUS_0 \
         on dflocal.MEMBER_STATUS_CODE = dfrelation_MEMBER_STATUS_0.MEMBER_STATUS_CODE"
    ));
    assert!(!sql.contains("left outer join"));
}

#[test]
fn select_index_toggling() {
    let mut member = clause("MEMBER", DatabaseKind::MySql);
    let alias = member.register_outer_join("dflocal", "memberStatus").unwrap();
    member.register_selected_relation(&alias, "_0").unwrap();
    member
        .specify_deriving_sub_query(
            "PURCHASE_COUNT",
            "select count(*) from PURCHASE sub1loc where sub1loc.MEMBER_ID = dflocal.MEMBER_ID",
        )
        .unwrap();

    let aliases: Vec<String> = member.select_alias_map().unwrap().into_values().collect();
    assert_eq!(aliases, ["c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8"]);

    member.disable_select_index();
    let aliases: Vec<String> = member.select_alias_map().unwrap().into_values().collect();
    assert_eq!(
        aliases,
        [
            "MEMBER_ID",
            "MEMBER_NAME",
            "MEMBER_STATUS_CODE",
            "BIRTHDATE",
            "MEMBER_STATUS_CODE_0",
            "MEMBER_STATUS_NAME_0",
            "DISPLAY_ORDER_0",
            "PURCHASE_COUNT",
        ]
    );
    assert!(member.get_clause().unwrap().contains(
        "(select count(*) from PURCHASE sub1loc where sub1loc.MEMBER_ID = dflocal.MEMBER_ID) as PURCHASE_COUNT"
    ));

    member.enable_select_index();
    assert_eq!(member.select_alias_map().unwrap()["PURCHASE_COUNT"], "c8");
}

#[test]
fn scalar_select_contracts() {
    for select_type in [
        SelectClauseType::Max,
        SelectClauseType::Min,
        SelectClauseType::Sum,
        SelectClauseType::Avg,
    ] {
        let mut purchase = clause("PURCHASE", DatabaseKind::Postgres);
        purchase.classify_select_clause_type(select_type);
        assert!(matches!(
            purchase.get_clause(),
            Err(SqlClauseError::AmbiguousScalarColumn { specified: 0, .. })
        ));

        purchase.specify_select_column("dflocal", "PURCHASE_PRICE").unwrap();
        assert_eq!(
            purchase.get_clause().unwrap(),
            format!("select {select_type}(dflocal.PURCHASE_PRICE) from PURCHASE dflocal")
        );

        purchase.specify_select_column("dflocal", "MEMBER_ID").unwrap();
        assert!(matches!(
            purchase.get_clause(),
            Err(SqlClauseError::AmbiguousScalarColumn { specified: 2, .. })
        ));
    }

    let mut purchase = clause("PURCHASE", DatabaseKind::Postgres);
    purchase.classify_select_clause_type(SelectClauseType::Count);
    assert_eq!(purchase.get_clause().unwrap(), "select count(*) from PURCHASE dflocal");

    purchase.rollback_select_clause_type();
    assert_eq!(purchase.select_clause_type(), SelectClauseType::Columns);
}

#[test]
fn union_order_by_uses_select_alias() {
    let mut member = clause("MEMBER", DatabaseKind::MySql);
    member.register_order_by("dflocal.MEMBER_NAME", true).unwrap();
    assert!(
        member
            .get_clause()
            .unwrap()
            .ends_with(" order by dflocal.MEMBER_NAME asc")
    );

    let mut branch = clause("MEMBER", DatabaseKind::MySql);
    register(&mut branch, "dflocal.MEMBER_STATUS_CODE", ConditionKey::Equal, "PRV");
    member.register_union_sub_query(&branch, false).unwrap();

    assert_eq!(
        member.get_clause().unwrap(),
        format!(
            "select {MEMBER_COLUMNS} from MEMBER dflocal union select {MEMBER_COLUMNS} \
             from MEMBER dflocal where dflocal.MEMBER_STATUS_CODE = 'PRV' order by c2 asc"
        )
    );
}

#[test]
fn oracle_paging_wraps_the_statement() {
    let mut member = clause("MEMBER", DatabaseKind::Oracle);
    member.specify_select_column("dflocal", "MEMBER_ID").unwrap();
    member.register_order_by("dflocal.MEMBER_ID", true).unwrap();
    member.fetch_first(10).unwrap();
    member.fetch_page(2).unwrap();

    assert_eq!(
        member.get_clause().unwrap(),
        "select * from (select plain.*, rownum rn from (select dflocal.MEMBER_ID as c1 \
         from MEMBER dflocal order by dflocal.MEMBER_ID asc) plain) ext \
         where ext.rn > 10 and ext.rn <= 20"
    );
}

#[test]
fn in_scope_is_split_by_oracle_limit() {
    let mut member = clause("MEMBER", DatabaseKind::Oracle);
    let ids: Vec<i64> = (1..=1001).collect();
    register(&mut member, "dflocal.MEMBER_ID", ConditionKey::InScope, ids);

    let sql = member.get_clause().unwrap();
    assert!(sql.contains("where (dflocal.MEMBER_ID in (1, 2, "));
    assert!(sql.ends_with("999, 1000) or dflocal.MEMBER_ID in (1001))"));
}

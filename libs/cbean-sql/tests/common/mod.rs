// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![allow(dead_code)]

use std::sync::Arc;

use cbean_sql::{
    ClauseConfig, ColumnMetaProvider, ColumnRealName, ConditionKey, ConditionValue, DatabaseKind,
    QueryValue, SchemaRegistry, SqlClause,
};

const SCHEMA: &str = r#"
    [[table]]
    name = "MEMBER"
    primary-key = ["MEMBER_ID"]
    columns = ["MEMBER_ID", "MEMBER_NAME", "MEMBER_STATUS_CODE", "BIRTHDATE"]

    [[table.foreign]]
    property = "memberStatus"
    table = "MEMBER_STATUS"
    columns = [["MEMBER_STATUS_CODE", "MEMBER_STATUS_CODE"]]

    [[table]]
    name = "MEMBER_STATUS"
    primary-key = ["MEMBER_STATUS_CODE"]
    columns = ["MEMBER_STATUS_CODE", "MEMBER_STATUS_NAME", "DISPLAY_ORDER"]

    [[table]]
    name = "PURCHASE"
    primary-key = ["PURCHASE_ID"]
    columns = ["PURCHASE_ID", "MEMBER_ID", "PURCHASE_PRICE"]

    [[table.foreign]]
    property = "member"
    table = "MEMBER"
    columns = [["MEMBER_ID", "MEMBER_ID"]]
"#;

pub const MEMBER_COLUMNS: &str = "dflocal.MEMBER_ID as c1, dflocal.MEMBER_NAME as c2, \
                                  dflocal.MEMBER_STATUS_CODE as c3, dflocal.BIRTHDATE as c4";

pub fn provider() -> Arc<dyn ColumnMetaProvider> {
    Arc::new(SchemaRegistry::from_toml_str(SCHEMA).unwrap())
}

pub fn clause(table: &str, dialect: DatabaseKind) -> SqlClause {
    SqlClause::new(table, provider(), &ClauseConfig::new(dialect)).unwrap()
}

pub fn register(
    clause: &mut SqlClause,
    column: &str,
    key: ConditionKey,
    value: impl Into<QueryValue>,
) {
    clause
        .register_where_clause(
            &ColumnRealName::parse(column).unwrap(),
            key,
            &ConditionValue::of(key, value),
            None,
        )
        .unwrap();
}

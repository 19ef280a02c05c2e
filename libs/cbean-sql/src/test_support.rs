// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use crate::{
    clause::SqlClause,
    config::ClauseConfig,
    dialect::DatabaseKind,
    schema::{ColumnMeta, ColumnMetaProvider, ForeignMeta, SchemaRegistry, TableMeta},
};

/// MEMBER / MEMBER_STATUS / PURCHASE / PURCHASE_DETAIL sample schema
pub(crate) fn sample_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();

    registry
        .add_table(
            TableMeta::new("MEMBER")
                .unwrap()
                .with_column(ColumnMeta::primary("MEMBER_ID").unwrap())
                .with_column(ColumnMeta::new("MEMBER_NAME").unwrap())
                .with_column(ColumnMeta::new("MEMBER_STATUS_CODE").unwrap())
                .with_column(ColumnMeta::new("BIRTHDATE").unwrap()),
        )
        .unwrap();
    registry
        .add_table(
            TableMeta::new("MEMBER_STATUS")
                .unwrap()
                .with_column(ColumnMeta::primary("MEMBER_STATUS_CODE").unwrap())
                .with_column(ColumnMeta::new("MEMBER_STATUS_NAME").unwrap())
                .with_column(ColumnMeta::new("DISPLAY_ORDER").unwrap()),
        )
        .unwrap();
    registry
        .add_table(
            TableMeta::new("PURCHASE")
                .unwrap()
                .with_column(ColumnMeta::primary("PURCHASE_ID").unwrap())
                .with_column(ColumnMeta::new("MEMBER_ID").unwrap())
                .with_column(ColumnMeta::new("PURCHASE_PRICE").unwrap()),
        )
        .unwrap();
    registry
        .add_table(
            TableMeta::new("PURCHASE_DETAIL")
                .unwrap()
                .with_column(ColumnMeta::primary("PURCHASE_ID").unwrap())
                .with_column(ColumnMeta::primary("LINE_NO").unwrap())
                .with_column(ColumnMeta::new("QUANTITY").unwrap()),
        )
        .unwrap();

    registry
        .add_foreign(
            ForeignMeta::new("memberStatus", "MEMBER", "MEMBER_STATUS")
                .with_column_pair("MEMBER_STATUS_CODE", "MEMBER_STATUS_CODE"),
        )
        .unwrap();
    registry
        .add_foreign(
            ForeignMeta::new("visibleStatus", "MEMBER", "MEMBER_STATUS")
                .with_column_pair("MEMBER_STATUS_CODE", "MEMBER_STATUS_CODE")
                .with_fixed_condition("$$alias$$.DISPLAY_ORDER <= /*$maxOrder*/9"),
        )
        .unwrap();
    registry
        .add_foreign(ForeignMeta::new("member", "PURCHASE", "MEMBER").with_column_pair("MEMBER_ID", "MEMBER_ID"))
        .unwrap();
    registry
        .add_foreign(
            ForeignMeta::new("purchase", "PURCHASE_DETAIL", "PURCHASE")
                .with_column_pair("PURCHASE_ID", "PURCHASE_ID"),
        )
        .unwrap();

    registry
}

pub(crate) fn sample_provider() -> Arc<dyn ColumnMetaProvider> {
    Arc::new(sample_registry())
}

pub(crate) fn clause_for(table: &str, kind: DatabaseKind) -> SqlClause {
    SqlClause::new(table, sample_provider(), &ClauseConfig::new(kind)).unwrap()
}

pub(crate) fn member_clause(kind: DatabaseKind) -> SqlClause {
    clause_for("MEMBER", kind)
}

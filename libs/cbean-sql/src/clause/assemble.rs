// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::{debug, instrument};

use crate::{
    clause_error::SqlClauseError,
    dialect::{Lock, Paging},
};

use super::{
    MAIN_ALIAS, SelectClauseType, SqlClause, indent::SubQueryIndentProcessor,
    where_clause::WhereMarks,
};

impl SqlClause {
    /// Render the whole statement: select, from, where, unions, order-by and the dialect suffix
    #[instrument(
        name = "SqlClause::get_clause",
        skip(self),
        fields(table = %self.table.db_name, dialect = %self.dialect.kind())
    )]
    pub fn get_clause(&self) -> Result<String, SqlClauseError> {
        if self.or_scope.is_effective() {
            return Err(SqlClauseError::IllegalState(
                "The or-scope query is still open".into(),
            ));
        }

        let columns = self.select_columns()?;
        let plain_select = self.build_select_clause(&columns, "")?;

        let from_where = format!(
            "{}{}",
            self.build_from_clause(&self.from_base_table_hint()?),
            self.build_where_clause(WhereMarks::None)
        );
        let unions = self.build_union_clause(Some(&plain_select));
        let order_by = self.build_order_by_clause()?;
        let suffix = self.sql_suffix()?;

        let sql = match self.select_clause_type.function_name() {
            Some(function_name) if self.has_union_query() => {
                let statement = format!("{plain_select}{from_where}{unions}");
                if self.select_clause_type == SelectClauseType::Count {
                    format!("select count(*) from ({statement}) {MAIN_ALIAS}")
                } else {
                    let (_, real_name) = self.single_specified_column()?;
                    let alias = self.select_alias_map()?.get(&real_name).cloned().ok_or_else(|| {
                        SqlClauseError::IllegalState(format!(
                            "The column '{real_name}' is not in the select clause"
                        ))
                    })?;
                    format!("select {function_name}({MAIN_ALIAS}.{alias}) from ({statement}) {MAIN_ALIAS}")
                }
            }
            None if self.has_union_query() && self.dialect.requires_union_normal_select_enclosing() => {
                format!(
                    "select{} * from ({plain_select}{from_where}{unions}) {MAIN_ALIAS}{order_by}{suffix}",
                    self.select_hint()
                )
            }
            _ => {
                let select = self.build_select_clause(&columns, &self.select_hint())?;
                format!("{select}{from_where}{unions}{order_by}{suffix}")
            }
        };

        debug!(
            select_type = %self.select_clause_type,
            unions = self.unions.len(),
            joins = self.outer_joins.len(),
            "Rendered clause"
        );
        SubQueryIndentProcessor::process(&sql)
    }

    /// Lock the selected rows. Fails right away on a dialect without row locking.
    pub fn lock_for_update(&mut self) -> Result<(), SqlClauseError> {
        self.dialect.lock_for_update(&self.base_alias())?;
        self.lock_for_update = true;
        debug!("Registered lock for update");
        Ok(())
    }

    pub fn is_lock_for_update(&self) -> bool {
        self.lock_for_update
    }

    /// Text right after `select`, such as a `top` clause
    pub fn select_hint(&self) -> String {
        self.paging().select_hint
    }

    /// Text right after the base table reference, such as a lock hint
    pub fn from_base_table_hint(&self) -> Result<String, SqlClauseError> {
        Ok(self.lock()?.from_base_table_hint)
    }

    /// Paging text followed by lock text
    pub fn sql_suffix(&self) -> Result<String, SqlClauseError> {
        Ok(format!("{}{}", self.paging().sql_suffix, self.lock()?.sql_suffix))
    }

    fn paging(&self) -> Paging {
        if self.select_clause_type.is_scalar() {
            return Paging::default();
        }
        self.paging_window()
            .map(|window| self.dialect.paging(&window))
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<Lock, SqlClauseError> {
        if self.lock_for_update && !self.select_clause_type.is_scalar() {
            self.dialect.lock_for_update(&self.base_alias())
        } else {
            Ok(Lock::default())
        }
    }
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

    const MEMBER_COLUMNS: &str = "dflocal.MEMBER_ID as c1, dflocal.MEMBER_NAME as c2, \
                                  dflocal.MEMBER_STATUS_CODE as c3, dflocal.BIRTHDATE as c4";

    fn equal(clause: &mut SqlClause, column: &str, value: &str) {
        clause
            .register_where_clause(
                &ColumnRealName::parse(column).unwrap(),
                ConditionKey::Equal,
                &ConditionValue::of(ConditionKey::Equal, value),
                None,
            )
            .unwrap();
    }

    #[test]
    fn plain_select_with_join_and_where() {
        let mut clause = member_clause(DatabaseKind::MySql);
        let alias = clause.register_outer_join("dflocal", "memberStatus").unwrap();
        clause.register_selected_relation(&alias, "_0").unwrap();
        equal(&mut clause, "dflocal.MEMBER_STATUS_CODE", "FML");
        clause.register_order_by("dflocal.MEMBER_ID", true).unwrap();

        assert_eq!(
            clause.get_clause().unwrap(),
            format!(
                "select {MEMBER_COLUMNS}, dfrelation_MEMBER_STATUS_0.MEMBER_STATUS_CODE as c5, \
                 dfrelation_MEMBER_STATUS_0.MEMBER_STATUS_NAME as c6, \
                 dfrelation_MEMBER_STATUS_0.DISPLAY_ORDER as c7 \
                 from MEMBER dflocal left outer join MEMBER_STATUS dfrelation_MEMBER_STATUS_0 \
                 on dflocal.MEMBER_STATUS_CODE = dfrelation_MEMBER_STATUS_0.MEMBER_STATUS_CODE \
                 where dflocal.MEMBER_STATUS_CODE = 'FML' order by dflocal.MEMBER_ID asc"
            )
        );
    }

    #[test]
    fn rendering_is_repeatable() {
        let mut clause = member_clause(DatabaseKind::Postgres);
        equal(&mut clause, "dflocal.MEMBER_NAME", "S");
        clause.fetch_first(10).unwrap();
        assert_eq!(clause.get_clause().unwrap(), clause.get_clause().unwrap());
    }

    #[test]
    fn paging_and_lock_suffix() {
        let mut clause = member_clause(DatabaseKind::MySql);
        clause.fetch_first(20).unwrap();
        clause.fetch_page(3).unwrap();
        clause.lock_for_update().unwrap();
        assert_eq!(clause.sql_suffix().unwrap(), " limit 40, 20 for update");
        assert!(clause.get_clause().unwrap().ends_with("from MEMBER dflocal limit 40, 20 for update"));
    }

    #[test]
    fn sql_server_top_and_lock_hint() {
        let mut clause = member_clause(DatabaseKind::SqlServer);
        clause.fetch_first(5).unwrap();
        clause.lock_for_update().unwrap();
        assert_eq!(
            clause.get_clause().unwrap(),
            format!("select top 5 {MEMBER_COLUMNS} from MEMBER dflocal with (updlock)")
        );
    }

    #[test]
    fn lock_fails_on_dialect_without_row_locking() {
        let mut clause = member_clause(DatabaseKind::Sqlite);
        assert!(matches!(clause.lock_for_update(), Err(SqlClauseError::Unsupported(_))));
        assert!(!clause.is_lock_for_update());
    }

    #[test]
    fn count_skips_order_by_and_paging() {
        let mut clause = member_clause(DatabaseKind::MySql);
        clause.register_order_by("dflocal.MEMBER_ID", true).unwrap();
        clause.fetch_first(10).unwrap();
        clause.classify_select_clause_type(SelectClauseType::Count);

        assert_eq!(clause.get_clause().unwrap(), "select count(*) from MEMBER dflocal");
    }

    #[test]
    fn max_needs_exactly_one_specified_column() {
        let mut clause = clause_for("PURCHASE", DatabaseKind::MySql);
        clause.classify_select_clause_type(SelectClauseType::Max);
        assert!(matches!(
            clause.get_clause(),
            Err(SqlClauseError::AmbiguousScalarColumn { specified: 0, .. })
        ));

        clause.specify_select_column("dflocal", "PURCHASE_PRICE").unwrap();
        assert_eq!(
            clause.get_clause().unwrap(),
            "select max(dflocal.PURCHASE_PRICE) from PURCHASE dflocal"
        );
    }

    #[test]
    fn count_over_union_is_enclosed() {
        let mut clause = member_clause(DatabaseKind::MySql);
        clause.specify_select_column("dflocal", "MEMBER_NAME").unwrap();
        let mut branch = member_clause(DatabaseKind::MySql);
        equal(&mut branch, "dflocal.MEMBER_STATUS_CODE", "WDL");
        clause.register_union_sub_query(&branch, false).unwrap();
        clause.classify_select_clause_type(SelectClauseType::Count);

        // the primary key is kept so that union does not merge distinct rows
        assert_eq!(
            clause.get_clause().unwrap(),
            "select count(*) from (select dflocal.MEMBER_ID as c1, dflocal.MEMBER_NAME as c2 from MEMBER dflocal \
             union select dflocal.MEMBER_ID as c1, dflocal.MEMBER_NAME as c2 from MEMBER dflocal \
             where dflocal.MEMBER_STATUS_CODE = 'WDL') dfmain"
        );
    }

    #[test]
    fn max_over_union_uses_select_alias() {
        let mut clause = clause_for("PURCHASE", DatabaseKind::Postgres);
        clause.specify_select_column("dflocal", "PURCHASE_PRICE").unwrap();
        let branch = clause_for("PURCHASE", DatabaseKind::Postgres);
        clause.register_union_sub_query(&branch, true).unwrap();
        clause.classify_select_clause_type(SelectClauseType::Max);

        assert_eq!(
            clause.get_clause().unwrap(),
            "select max(dfmain.c2) from (select dflocal.PURCHASE_ID as c1, dflocal.PURCHASE_PRICE as c2 \
             from PURCHASE dflocal union all select dflocal.PURCHASE_ID as c1, dflocal.PURCHASE_PRICE as c2 \
             from PURCHASE dflocal) dfmain"
        );
    }

    #[test]
    fn union_order_by_on_enclosing_dialect() {
        let mut clause = member_clause(DatabaseKind::Db2);
        clause.specify_select_column("dflocal", "MEMBER_ID").unwrap();
        let branch = member_clause(DatabaseKind::Db2);
        clause.register_union_sub_query(&branch, false).unwrap();
        clause.register_order_by("dflocal.MEMBER_ID", false).unwrap();
        clause.fetch_first(3).unwrap();

        assert_eq!(
            clause.get_clause().unwrap(),
            "select * from (select dflocal.MEMBER_ID as c1 from MEMBER dflocal \
             union select dflocal.MEMBER_ID as c1 from MEMBER dflocal) dfmain \
             order by c1 desc fetch first 3 rows only"
        );
    }

    #[test]
    fn open_or_scope_cannot_render() {
        let mut clause = member_clause(DatabaseKind::MySql);
        clause.make_or_scope_query_effective().unwrap();
        assert!(matches!(clause.get_clause(), Err(SqlClauseError::IllegalState(_))));
    }
}

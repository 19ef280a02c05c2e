// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::debug;

use crate::{
    clause_error::SqlClauseError,
    sql::{
        order::{NullsOrdering, OrderByClause, Ordering},
        query_value::QueryValue,
    },
};

use super::SqlClause;

impl SqlClause {
    /// Register `/`-delimited `[alias.]COLUMN` tokens in one direction
    pub fn register_order_by(
        &mut self,
        property_path: &str,
        ascending: bool,
    ) -> Result<(), SqlClauseError> {
        self.check_order_by_allowed()?;
        self.order_by
            .register(property_path, Ordering::from_ascending(ascending))?;
        debug!(property_path, ascending, "Registered order-by");
        Ok(())
    }

    pub fn reverse_order_by_or_override(
        &mut self,
        property_path: &str,
        ascending: bool,
    ) -> Result<(), SqlClauseError> {
        self.check_order_by_allowed()?;
        self.order_by
            .reverse_or_override(property_path, Ordering::from_ascending(ascending))
    }

    pub fn add_nulls_first_to_previous_order_by_element(&mut self) -> Result<(), SqlClauseError> {
        self.check_order_by_allowed()?;
        self.order_by
            .add_nulls_to_previous_element(NullsOrdering::First)
    }

    pub fn add_nulls_last_to_previous_order_by_element(&mut self) -> Result<(), SqlClauseError> {
        self.check_order_by_allowed()?;
        self.order_by
            .add_nulls_to_previous_element(NullsOrdering::Last)
    }

    /// Order the previous element by the position of its value in `values`
    pub fn add_manual_order_to_previous_order_by_element(
        &mut self,
        values: Vec<QueryValue>,
    ) -> Result<(), SqlClauseError> {
        self.check_order_by_allowed()?;
        if self.has_union_query() {
            return Err(SqlClauseError::Unsupported(
                "The manual order cannot be used with a union query".into(),
            ));
        }
        let literals = values
            .iter()
            .map(|value| value.render_literal(self.dialect.as_ref()))
            .collect();
        self.order_by.add_manual_order_to_previous_element(literals)?;
        debug!(values = values.len(), "Added manual order");
        Ok(())
    }

    /// Order by a deriving sub-query column registered with `specify_deriving_sub_query`
    pub fn register_specified_derived_order_by(
        &mut self,
        alias_name: &str,
        ascending: bool,
    ) -> Result<(), SqlClauseError> {
        self.check_order_by_allowed()?;
        if !self.deriving_sub_queries.contains_key(alias_name) {
            return Err(SqlClauseError::IllegalState(format!(
                "The deriving sub-query '{alias_name}' is not specified"
            )));
        }
        self.order_by
            .register_derived(alias_name, Ordering::from_ascending(ascending));
        debug!(alias_name, ascending, "Registered derived order-by");
        Ok(())
    }

    pub fn make_order_by_effective(&mut self) {
        self.order_by_effective = true;
    }

    /// Keep the registered elements but render no order-by until made effective again
    pub fn ignore_order_by(&mut self) {
        self.order_by_effective = false;
    }

    pub fn clear_order_by(&mut self) {
        self.order_by.clear();
    }

    pub fn order_by_clause(&self) -> &OrderByClause {
        &self.order_by
    }

    pub(crate) fn is_order_by_rendered(&self) -> bool {
        self.order_by_effective
            && !self.order_by.is_empty()
            && !self.select_clause_type.is_scalar()
    }

    /// ` order by ...`, or empty when nothing is to be rendered
    pub(crate) fn build_order_by_clause(&self) -> Result<String, SqlClauseError> {
        if !self.is_order_by_rendered() {
            return Ok(String::new());
        }
        let aliases = self.select_alias_map()?;
        let rendered = self
            .order_by
            .render(self.dialect.as_ref(), &aliases, self.has_union_query())?;
        Ok(format!(" {rendered}"))
    }

    fn check_order_by_allowed(&self) -> Result<(), SqlClauseError> {
        if self.purpose.is_no_order_by() {
            Err(self.unsupported_for_purpose("Order-by"))
        } else {
            Ok(())
        }
    }
}

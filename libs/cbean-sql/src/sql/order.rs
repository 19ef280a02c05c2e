// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;

use crate::{clause_error::SqlClauseError, dialect::SqlDialect};

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum Ordering {
    Asc,
    Desc,
}

impl Ordering {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Ordering::Asc
        } else {
            Ordering::Desc
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Ordering::Asc => Ordering::Desc,
            Ordering::Desc => Ordering::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Ordering::Asc => "asc",
            Ordering::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum NullsOrdering {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByElement {
    alias_name: Option<String>,
    column_name: String,
    ordering: Ordering,
    nulls: Option<NullsOrdering>,
    /// Rendered literals of a manual order, in the requested sequence
    manual_order: Option<Vec<String>>,
    /// Orders by a specify-deriving column, referenced by its select alias
    derived: bool,
}

impl OrderByElement {
    pub fn new(alias_name: Option<String>, column_name: String, ordering: Ordering) -> Self {
        Self {
            alias_name,
            column_name,
            ordering,
            nulls: None,
            manual_order: None,
            derived: false,
        }
    }

    pub fn derived(alias_name: String, ordering: Ordering) -> Self {
        Self {
            derived: true,
            ..Self::new(None, alias_name, ordering)
        }
    }

    /// `alias.COLUMN` (or the bare column / derived alias name)
    pub fn full_name(&self) -> String {
        match &self.alias_name {
            Some(alias) => format!("{}.{}", alias, self.column_name),
            None => self.column_name.clone(),
        }
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias_name.as_deref()
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn ordering(&self) -> Ordering {
        self.ordering
    }

    pub fn nulls(&self) -> Option<NullsOrdering> {
        self.nulls
    }

    pub fn is_derived(&self) -> bool {
        self.derived
    }

    pub fn has_manual_order(&self) -> bool {
        self.manual_order.is_some()
    }

    fn render(&self, dialect: &dyn SqlDialect, column: &str) -> String {
        let expr = match &self.manual_order {
            Some(values) => {
                let mut expr = String::from("case");
                for (index, value) in values.iter().enumerate() {
                    expr.push_str(&format!(" when {column} = {value} then {index}"));
                }
                expr.push_str(&format!(" else {} end", values.len()));
                expr
            }
            None => column.to_string(),
        };

        match self.nulls {
            Some(nulls) => dialect.nulls_ordering(&expr, self.ordering, nulls),
            None => format!("{} {}", expr, self.ordering.as_sql()),
        }
    }
}

/// Ordered list of order-by elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderByClause {
    elements: Vec<OrderByElement>,
}

impl OrderByClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `/`-delimited list of `[alias.]COLUMN` tokens
    pub fn parse(
        property_path: &str,
        ordering: Ordering,
    ) -> Result<Vec<OrderByElement>, SqlClauseError> {
        property_path
            .split('/')
            .map(|token| {
                let token = token.trim();
                let (alias, column) = match token.split_once('.') {
                    Some((alias, column)) => (Some(alias.trim()), column.trim()),
                    None => (None, token),
                };
                if column.is_empty() || alias.is_some_and(str::is_empty) {
                    return Err(SqlClauseError::IllegalArgument(format!(
                        "Invalid order-by property path: '{property_path}'"
                    )));
                }
                Ok(OrderByElement::new(
                    alias.map(str::to_string),
                    column.to_string(),
                    ordering,
                ))
            })
            .collect()
    }

    pub fn register(&mut self, property_path: &str, ordering: Ordering) -> Result<(), SqlClauseError> {
        let elements = Self::parse(property_path, ordering)?;
        self.elements.extend(elements);
        Ok(())
    }

    pub fn register_derived(&mut self, alias_name: &str, ordering: Ordering) {
        self.elements
            .push(OrderByElement::derived(alias_name.to_string(), ordering));
    }

    /// Flip the direction when `property_path` names exactly the current columns, otherwise
    /// replace the whole clause.
    pub fn reverse_or_override(
        &mut self,
        property_path: &str,
        ordering: Ordering,
    ) -> Result<(), SqlClauseError> {
        let elements = Self::parse(property_path, ordering)?;

        let same_columns = elements.len() == self.elements.len()
            && elements
                .iter()
                .zip(self.elements.iter())
                .all(|(new, current)| new.full_name() == current.full_name());

        if same_columns {
            for element in self.elements.iter_mut() {
                element.ordering = element.ordering.reverse();
            }
        } else {
            self.elements = elements;
        }
        Ok(())
    }

    fn last_element(&mut self) -> Result<&mut OrderByElement, SqlClauseError> {
        self.elements.last_mut().ok_or_else(|| {
            SqlClauseError::IllegalState("No order-by element has been registered".into())
        })
    }

    pub fn add_nulls_to_previous_element(
        &mut self,
        nulls: NullsOrdering,
    ) -> Result<(), SqlClauseError> {
        self.last_element()?.nulls = Some(nulls);
        Ok(())
    }

    pub fn add_manual_order_to_previous_element(
        &mut self,
        values: Vec<String>,
    ) -> Result<(), SqlClauseError> {
        if values.is_empty() {
            return Err(SqlClauseError::IllegalArgument(
                "The manual order needs at least one value".into(),
            ));
        }
        self.last_element()?.manual_order = Some(values);
        Ok(())
    }

    pub fn elements(&self) -> &[OrderByElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn has_manual_order(&self) -> bool {
        self.elements.iter().any(OrderByElement::has_manual_order)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Render `order by ...` (empty when there is no element).
    ///
    /// `select_aliases` maps `alias.COLUMN` (and derived alias names) to the alias used in the
    /// select clause. With a union every element goes through it, since the branches do not
    /// share the base alias. Without a union only derived elements do.
    pub fn render(
        &self,
        dialect: &dyn SqlDialect,
        select_aliases: &IndexMap<String, String>,
        union: bool,
    ) -> Result<String, SqlClauseError> {
        if self.elements.is_empty() {
            return Ok(String::new());
        }
        if union && select_aliases.is_empty() {
            return Err(SqlClauseError::IllegalState(
                "The select alias map is empty while a union query exists".into(),
            ));
        }
        if union && self.has_manual_order() {
            return Err(SqlClauseError::Unsupported(
                "The manual order cannot be used with a union query".into(),
            ));
        }

        let rendered = self
            .elements
            .iter()
            .map(|element| {
                let full_name = element.full_name();
                let column = if union || element.derived {
                    select_aliases.get(&full_name).cloned().ok_or_else(|| {
                        SqlClauseError::IllegalState(format!(
                            "The order-by column '{full_name}' is not in the select clause"
                        ))
                    })?
                } else {
                    full_name
                };
                Ok(element.render(dialect, &column))
            })
            .collect::<Result<Vec<_>, SqlClauseError>>()?;

        Ok(format!("order by {}", rendered.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::{DatabaseKind, create_dialect};

    use super::*;

    fn render(clause: &OrderByClause, kind: DatabaseKind) -> String {
        clause
            .render(create_dialect(kind).as_ref(), &IndexMap::new(), false)
            .unwrap()
    }

    #[test]
    fn parse_path() {
        let elements = OrderByClause::parse("dflocal.MEMBER_NAME/ BIRTHDATE", Ordering::Desc).unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].full_name(), "dflocal.MEMBER_NAME");
        assert_eq!(elements[1].alias_name(), None);
        assert_eq!(elements[1].column_name(), "BIRTHDATE");
        assert!(OrderByClause::parse("dflocal.MEMBER_NAME//", Ordering::Asc).is_err());
        assert!(OrderByClause::parse(".X", Ordering::Asc).is_err());
    }

    #[test]
    fn reverse_same_columns_or_override() {
        let mut clause = OrderByClause::new();
        clause.register("dflocal.MEMBER_ID", Ordering::Asc).unwrap();

        clause.reverse_or_override("dflocal.MEMBER_ID", Ordering::Asc).unwrap();
        assert_eq!(render(&clause, DatabaseKind::MySql), "order by dflocal.MEMBER_ID desc");

        clause.reverse_or_override("dflocal.MEMBER_NAME", Ordering::Asc).unwrap();
        assert_eq!(render(&clause, DatabaseKind::MySql), "order by dflocal.MEMBER_NAME asc");
    }

    #[test]
    fn nulls_native_and_emulated() {
        let mut clause = OrderByClause::new();
        clause.register("dflocal.BIRTHDATE", Ordering::Desc).unwrap();
        clause.add_nulls_to_previous_element(NullsOrdering::First).unwrap();

        assert_eq!(
            render(&clause, DatabaseKind::Postgres),
            "order by dflocal.BIRTHDATE desc nulls first"
        );
        assert_eq!(
            render(&clause, DatabaseKind::MySql),
            "order by case when dflocal.BIRTHDATE is not null then 1 else 0 end asc, dflocal.BIRTHDATE desc"
        );
    }

    #[test]
    fn manual_order_case() {
        let mut clause = OrderByClause::new();
        clause.register("dflocal.MEMBER_STATUS_CODE", Ordering::Asc).unwrap();
        clause
            .add_manual_order_to_previous_element(vec!["'FML'".into(), "'PRV'".into()])
            .unwrap();

        assert_eq!(
            render(&clause, DatabaseKind::MySql),
            "order by case when dflocal.MEMBER_STATUS_CODE = 'FML' then 0 when dflocal.MEMBER_STATUS_CODE = 'PRV' then 1 else 2 end asc"
        );
    }

    #[test]
    fn previous_element_required() {
        let mut clause = OrderByClause::new();
        assert!(matches!(
            clause.add_nulls_to_previous_element(NullsOrdering::Last),
            Err(SqlClauseError::IllegalState(_))
        ));
        assert!(matches!(
            clause.add_manual_order_to_previous_element(vec!["1".into()]),
            Err(SqlClauseError::IllegalState(_))
        ));
    }

    #[test]
    fn union_translates_through_aliases() {
        let dialect = create_dialect(DatabaseKind::MySql);
        let mut clause = OrderByClause::new();
        clause.register("dflocal.MEMBER_NAME", Ordering::Asc).unwrap();

        let aliases = IndexMap::from([("dflocal.MEMBER_NAME".to_string(), "c2".to_string())]);
        assert_eq!(
            clause.render(dialect.as_ref(), &aliases, true).unwrap(),
            "order by c2 asc"
        );
        assert!(matches!(
            clause.render(dialect.as_ref(), &IndexMap::new(), true),
            Err(SqlClauseError::IllegalState(_))
        ));

        let other = IndexMap::from([("dflocal.MEMBER_ID".to_string(), "c1".to_string())]);
        assert!(matches!(
            clause.render(dialect.as_ref(), &other, true),
            Err(SqlClauseError::IllegalState(_))
        ));
    }
}

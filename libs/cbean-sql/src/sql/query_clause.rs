// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{
    ExpressionBuilder, SqlBuilder, column_name::ColumnRealName, condition_key::ConditionKey,
    like_search::LikeSearchOption,
};

/// A renderable where/on-clause fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    /// Opaque text, e.g. a flattened or-scope or a caller-supplied clause
    String(String),
    /// A condition of a key against a column; `operand` is the already rendered literal or bind
    /// comment
    Bound {
        column: ColumnRealName,
        key: ConditionKey,
        operand: String,
        option: Option<LikeSearchOption>,
    },
    /// A clause registered while an and-part of an or-scope was open. Clauses sharing the
    /// identity are grouped with `and` when the scope is flattened.
    OrScopeAndPart {
        inner: Box<QueryClause>,
        identity: usize,
    },
}

impl QueryClause {
    pub fn and_part_identity(&self) -> Option<usize> {
        match self {
            QueryClause::OrScopeAndPart { identity, .. } => Some(*identity),
            _ => None,
        }
    }
}

impl ExpressionBuilder for QueryClause {
    fn build(&self, builder: &mut SqlBuilder) {
        match self {
            QueryClause::String(text) => builder.push_str(text),
            QueryClause::Bound {
                column,
                key,
                operand,
                option,
            } => key.build_predicate(builder, column, operand, option.as_ref()),
            QueryClause::OrScopeAndPart { inner, .. } => inner.build(builder),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::sql::column_name::ColumnSqlName;

    use super::*;

    #[test]
    fn and_part_renders_inner_clause() {
        let bound = QueryClause::Bound {
            column: ColumnRealName::new("dflocal", ColumnSqlName::new("MEMBER_ID").unwrap()),
            key: ConditionKey::Equal,
            operand: "3".into(),
            option: None,
        };
        let and_part = QueryClause::OrScopeAndPart {
            inner: Box::new(bound.clone()),
            identity: 1,
        };

        assert_eq!(bound.to_sql(), "dflocal.MEMBER_ID = 3");
        assert_eq!(and_part.to_sql(), "dflocal.MEMBER_ID = 3");
        assert_eq!(and_part.and_part_identity(), Some(1));
        assert_eq!(bound.and_part_identity(), None);
    }
}

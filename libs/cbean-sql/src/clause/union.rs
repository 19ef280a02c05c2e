// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::debug;

use crate::clause_error::SqlClauseError;

use super::{
    SqlClause,
    template::{UNION_SELECT_CLAUSE_MARK, UNION_WHERE_CLAUSE_MARK, UNION_WHERE_FIRST_CONDITION_MARK},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnionQuery {
    /// Select-and-body text, usually starting with the union select mark
    clause: String,
    all: bool,
}

impl SqlClause {
    /// Register a union branch as text. `#df:unionSelectClause#` in the text stands for the
    /// select clause of this engine.
    pub fn register_union_query(&mut self, clause: &str, all: bool) -> Result<(), SqlClauseError> {
        if self.purpose.is_no_union() {
            return Err(self.unsupported_for_purpose("A union query"));
        }
        if clause.trim().is_empty() {
            return Err(SqlClauseError::IllegalArgument(
                "The union query clause should not be blank".into(),
            ));
        }
        if self.order_by.has_manual_order() {
            return Err(SqlClauseError::Unsupported(
                "A union query cannot be used with the manual order".into(),
            ));
        }
        debug!(all, "Registered union query");
        self.unions.push(UnionQuery {
            clause: clause.to_string(),
            all,
        });
        Ok(())
    }

    /// Register the from/where part of another engine (usually built with
    /// [`BuildPurpose::UnionQuery`](super::BuildPurpose::UnionQuery)) as a union branch
    pub fn register_union_sub_query(
        &mut self,
        branch: &SqlClause,
        all: bool,
    ) -> Result<(), SqlClauseError> {
        let clause = format!(
            "{}{}",
            UNION_SELECT_CLAUSE_MARK,
            branch.get_clause_from_where_with_union_template()
        );
        self.register_union_query(&clause, all)
    }

    pub fn has_union_query(&self) -> bool {
        !self.unions.is_empty()
    }

    /// ` union [all] <branch> ...`. With a select clause the union marks are resolved for a
    /// final render, otherwise they are kept for a template.
    pub(crate) fn build_union_clause(&self, select_clause: Option<&str>) -> String {
        let mut sql = String::new();
        for union in &self.unions {
            sql.push_str(if union.all { " union all " } else { " union " });
            match select_clause {
                Some(select_clause) => sql.push_str(
                    &union
                        .clause
                        .replace(UNION_SELECT_CLAUSE_MARK, select_clause)
                        .replace(&format!(" {UNION_WHERE_CLAUSE_MARK}"), "")
                        .replace(UNION_WHERE_CLAUSE_MARK, "")
                        .replace(UNION_WHERE_FIRST_CONDITION_MARK, ""),
                ),
                None => sql.push_str(&union.clause),
            }
        }
        sql
    }
}

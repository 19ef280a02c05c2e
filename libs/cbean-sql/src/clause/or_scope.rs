// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    clause_error::SqlClauseError,
    sql::{SqlBuilder, query_clause::QueryClause},
};

use super::{SqlClause, where_clause::WhereTarget};

#[derive(Debug, Default)]
struct OrScopeFrame {
    lists: IndexMap<WhereTarget, Vec<QueryClause>>,
}

/// Open or-scopes as a stack; the last frame is the innermost scope.
#[derive(Debug, Default)]
pub(crate) struct OrScopeTracker {
    frames: Vec<OrScopeFrame>,
    and_part: Option<usize>,
    and_part_sequence: usize,
}

impl OrScopeTracker {
    pub(crate) fn is_effective(&self) -> bool {
        !self.frames.is_empty()
    }

    pub(crate) fn is_and_part_effective(&self) -> bool {
        self.and_part.is_some()
    }

    fn open(&mut self) -> Result<(), SqlClauseError> {
        if self.and_part.is_some() {
            return Err(SqlClauseError::Unsupported(
                "An or-scope query cannot be opened inside an and-part".into(),
            ));
        }
        self.frames.push(OrScopeFrame::default());
        Ok(())
    }

    fn begin_and_part(&mut self) -> Result<(), SqlClauseError> {
        if self.frames.is_empty() {
            return Err(SqlClauseError::IllegalState(
                "The and-part requires an open or-scope query".into(),
            ));
        }
        if self.and_part.is_some() {
            return Err(SqlClauseError::IllegalState(
                "The and-part of the or-scope query is already open".into(),
            ));
        }
        self.and_part_sequence += 1;
        self.and_part = Some(self.and_part_sequence);
        Ok(())
    }

    fn end_and_part(&mut self) -> Result<(), SqlClauseError> {
        match self.and_part.take() {
            Some(_) => Ok(()),
            None => Err(SqlClauseError::IllegalState(
                "No and-part of the or-scope query is open".into(),
            )),
        }
    }

    /// Record a clause in the innermost scope, tagged with the open and-part if any
    pub(crate) fn push(
        &mut self,
        target: WhereTarget,
        clause: QueryClause,
    ) -> Result<(), SqlClauseError> {
        let frame = self.frames.last_mut().ok_or_else(|| {
            SqlClauseError::IllegalState("No or-scope query is open".into())
        })?;
        let clause = match self.and_part {
            Some(identity) => QueryClause::OrScopeAndPart {
                inner: Box::new(clause),
                identity,
            },
            None => clause,
        };
        frame.lists.entry(target).or_default().push(clause);
        Ok(())
    }

    /// Close the innermost scope. A nested scope folds into its parent and yields nothing; the
    /// outermost scope yields one flattened clause per target list to reflect into the real lists.
    fn close(&mut self) -> Result<Option<Vec<(WhereTarget, QueryClause)>>, SqlClauseError> {
        if self.and_part.is_some() {
            return Err(SqlClauseError::IllegalState(
                "The and-part of the or-scope query is still open".into(),
            ));
        }
        let frame = self.frames.pop().ok_or_else(|| {
            SqlClauseError::IllegalState("No or-scope query is open".into())
        })?;

        let flattened = frame
            .lists
            .into_iter()
            .filter(|(_, clauses)| !clauses.is_empty())
            .map(|(target, clauses)| (target, QueryClause::String(flatten_or_terms(&clauses))));

        match self.frames.last_mut() {
            Some(parent) => {
                for (target, clause) in flattened {
                    parent.lists.entry(target).or_default().push(clause);
                }
                Ok(None)
            }
            None => Ok(Some(flattened.collect())),
        }
    }
}

/// `(t1 or t2 ...)` where consecutive clauses of the same and-part form one `(a and b)` term.
/// A single term and a single-clause and-part render without parentheses.
fn flatten_or_terms(clauses: &[QueryClause]) -> String {
    let terms = clauses.chunk_by(|left, right| {
        left.and_part_identity().is_some() && left.and_part_identity() == right.and_part_identity()
    });

    let rendered: Vec<String> = terms
        .map(|term| {
            let mut builder = SqlBuilder::new();
            if term.len() == 1 {
                builder.push_elems(term, " and ");
            } else {
                builder.push('(');
                builder.push_elems(term, " and ");
                builder.push(')');
            }
            builder.into_sql()
        })
        .collect();

    if rendered.len() == 1 {
        rendered.into_iter().collect()
    } else {
        format!("({})", rendered.join(" or "))
    }
}

impl SqlClause {
    pub fn make_or_scope_query_effective(&mut self) -> Result<(), SqlClauseError> {
        self.or_scope.open()?;
        debug!("Opened or-scope query");
        Ok(())
    }

    pub fn close_or_scope_query(&mut self) -> Result<(), SqlClauseError> {
        let reflected = self.or_scope.close()?;
        debug!(terminal = reflected.is_some(), "Closed or-scope query");
        for (target, clause) in reflected.into_iter().flatten() {
            self.append_clauses(target, vec![clause])?;
        }
        Ok(())
    }

    pub fn begin_or_scope_query_and_part(&mut self) -> Result<(), SqlClauseError> {
        self.or_scope.begin_and_part()
    }

    pub fn end_or_scope_query_and_part(&mut self) -> Result<(), SqlClauseError> {
        self.or_scope.end_and_part()
    }

    pub fn is_or_scope_query_effective(&self) -> bool {
        self.or_scope.is_effective()
    }

    pub fn is_or_scope_query_and_part_effective(&self) -> bool {
        self.or_scope.is_and_part_effective()
    }
}

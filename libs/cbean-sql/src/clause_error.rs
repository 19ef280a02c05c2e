// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

use crate::clause::SelectClauseType;

#[derive(Error, Debug)]
pub enum SqlClauseError {
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error(
        "The specified column for {select_type} select should be only one, but found {specified}"
    )]
    AmbiguousScalarColumn {
        select_type: SelectClauseType,
        specified: usize,
    },

    #[error("Metadata not found: {0}")]
    MetadataNotFound(String),

    #[error("{0} {1}")]
    WithContext(String, #[source] Box<SqlClauseError>),
}

impl SqlClauseError {
    pub fn with_context(self, context: String) -> SqlClauseError {
        SqlClauseError::WithContext(context, Box::new(self))
    }

    /// The innermost error, skipping any context wrappers
    pub fn root_cause(&self) -> &SqlClauseError {
        match self {
            SqlClauseError::WithContext(_, inner) => inner.root_cause(),
            _ => self,
        }
    }
}

pub trait WithContext {
    fn with_context(self, context: String) -> Self;
}

impl<T> WithContext for Result<T, SqlClauseError> {
    fn with_context(self, context: String) -> Result<T, SqlClauseError> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_prepended() {
        let result: Result<(), SqlClauseError> =
            Err(SqlClauseError::IllegalState("no or-scope is open".into()));
        let err = result
            .with_context("While closing the or-scope:".into())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "While closing the or-scope: Illegal state: no or-scope is open"
        );
        assert!(matches!(err.root_cause(), SqlClauseError::IllegalState(_)));
    }

    #[test]
    fn ambiguous_scalar_message() {
        let err = SqlClauseError::AmbiguousScalarColumn {
            select_type: SelectClauseType::Max,
            specified: 2,
        };
        assert_eq!(
            err.to_string(),
            "The specified column for max select should be only one, but found 2"
        );
    }
}

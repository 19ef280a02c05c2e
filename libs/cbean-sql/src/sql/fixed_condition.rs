// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::{clause_error::SqlClauseError, dialect::SqlDialect};

use super::query_value::QueryValue;

pub const FOREIGN_ALIAS_MARK: &str = "$$alias$$";
pub const FOREIGN_ALIAS_LONG_MARK: &str = "$$foreignAlias$$";
pub const LOCAL_ALIAS_MARK: &str = "$$localAlias$$";

// `/*$name*/` optionally followed by a dummy literal, which is replaced as well
static PARAMETER_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\*\$(\w+)\*/(?:'(?:[^']|'')*'|[\w.+-]+)?")
        .expect("Invalid fixed condition parameter pattern")
});

/// What a fixed condition of a join can refer to.
pub struct FixedConditionContext<'a> {
    pub local_alias: &'a str,
    pub foreign_alias: &'a str,
    pub parameters: &'a IndexMap<String, QueryValue>,
    pub dialect: &'a dyn SqlDialect,
}

/// Turns the fixed condition text of a relation into SQL for one join.
pub trait FixedConditionResolver: Send + Sync {
    fn resolve(
        &self,
        fixed_condition: &str,
        context: &FixedConditionContext<'_>,
    ) -> Result<String, SqlClauseError>;
}

/// Replaces the alias variables and the `/*$name*/` parameter comments.
#[derive(Debug, Default)]
pub struct AliasVariableResolver;

impl FixedConditionResolver for AliasVariableResolver {
    fn resolve(
        &self,
        fixed_condition: &str,
        context: &FixedConditionContext<'_>,
    ) -> Result<String, SqlClauseError> {
        let replaced = fixed_condition
            .replace(FOREIGN_ALIAS_LONG_MARK, context.foreign_alias)
            .replace(FOREIGN_ALIAS_MARK, context.foreign_alias)
            .replace(LOCAL_ALIAS_MARK, context.local_alias);

        let mut resolved = String::with_capacity(replaced.len());
        let mut last_end = 0;
        for captures in PARAMETER_COMMENT.captures_iter(&replaced) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let value = context.parameters.get(name.as_str()).ok_or_else(|| {
                SqlClauseError::IllegalArgument(format!(
                    "The fixed condition parameter '{}' is not registered: {}",
                    name.as_str(),
                    fixed_condition
                ))
            })?;
            resolved.push_str(&replaced[last_end..whole.start()]);
            resolved.push_str(&value.render_literal(context.dialect));
            last_end = whole.end();
        }
        resolved.push_str(&replaced[last_end..]);

        Ok(resolved)
    }
}

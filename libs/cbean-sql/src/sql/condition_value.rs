// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;

use super::{condition_key::ConditionKey, query_value::QueryValue};

/// How the operand of a bound clause reaches the SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BindMode {
    /// Render the value as a literal
    #[default]
    Embed,
    /// Render a bind comment `/*pmb.<location_base>.<keyName>*/` followed by a dummy value
    Bind { location_base: String },
}

/// Query-time values registered for one column. Compound conditions (from/to style pairs)
/// register several keys on the same holder; the key registered last is the "latest" one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionValue {
    values: IndexMap<ConditionKey, QueryValue>,
    latest: Option<ConditionKey>,
    bind_mode: BindMode,
}

impl ConditionValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A holder with a single value registered for `key`
    pub fn of(key: ConditionKey, value: impl Into<QueryValue>) -> Self {
        let mut holder = Self::new();
        holder.set(key, value);
        holder
    }

    pub fn bound(location_base: impl Into<String>) -> Self {
        Self {
            bind_mode: BindMode::Bind {
                location_base: location_base.into(),
            },
            ..Self::default()
        }
    }

    /// Register (or overwrite) the value for `key`, which becomes the latest key.
    pub fn set(&mut self, key: ConditionKey, value: impl Into<QueryValue>) -> &mut Self {
        self.values.insert(key, value.into());
        self.latest = Some(key);
        self
    }

    pub fn value(&self, key: ConditionKey) -> Option<&QueryValue> {
        self.values.get(&key)
    }

    pub fn latest(&self) -> Option<ConditionKey> {
        self.latest
    }

    pub fn latest_value(&self) -> Option<&QueryValue> {
        self.latest.and_then(|key| self.values.get(&key))
    }

    pub fn keys(&self) -> impl Iterator<Item = ConditionKey> + '_ {
        self.values.keys().copied()
    }

    pub fn bind_mode(&self) -> &BindMode {
        &self.bind_mode
    }
}

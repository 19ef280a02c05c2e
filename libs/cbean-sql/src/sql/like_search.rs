// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub const DEFAULT_LIKE_ESCAPE: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikeSearchMode {
    /// `value%`
    Prefix,
    /// `%value`
    Suffix,
    /// `%value%`
    Contain,
    #[default]
    Exact,
}

/// Option of the `likeSearch` / `notLikeSearch` keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeSearchOption {
    pub mode: LikeSearchMode,
    pub escape: char,
    pub ignore_case: bool,
}

impl Default for LikeSearchOption {
    fn default() -> Self {
        Self {
            mode: LikeSearchMode::default(),
            escape: DEFAULT_LIKE_ESCAPE,
            ignore_case: false,
        }
    }
}

impl LikeSearchOption {
    pub fn new(mode: LikeSearchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn prefix() -> Self {
        Self::new(LikeSearchMode::Prefix)
    }

    pub fn suffix() -> Self {
        Self::new(LikeSearchMode::Suffix)
    }

    pub fn contain() -> Self {
        Self::new(LikeSearchMode::Contain)
    }

    pub fn with_escape(self, escape: char) -> Self {
        Self { escape, ..self }
    }

    pub fn with_ignore_case(self) -> Self {
        Self {
            ignore_case: true,
            ..self
        }
    }

    /// Escape the wildcards (and the escape character itself) in `value` and wrap it with
    /// wildcards according to the mode.
    pub fn generate_real_value(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 2);
        for c in value.chars() {
            if c == self.escape || c == '%' || c == '_' {
                escaped.push(self.escape);
            }
            escaped.push(c);
        }

        match self.mode {
            LikeSearchMode::Prefix => format!("{escaped}%"),
            LikeSearchMode::Suffix => format!("%{escaped}"),
            LikeSearchMode::Contain => format!("%{escaped}%"),
            LikeSearchMode::Exact => escaped,
        }
    }

    /// The ` escape '<c>'` clause closing the predicate
    pub fn escape_clause(&self) -> String {
        if self.escape == '\'' {
            " escape ''''".to_string()
        } else {
            format!(" escape '{}'", self.escape)
        }
    }
}

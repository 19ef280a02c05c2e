// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Display;

/// What an engine instance is built for, fixed at construction. Each predicate tells which
/// registrations the purpose rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildPurpose {
    #[default]
    NormalUse,
    UnionQuery,
    ExistsReferrer,
    InReferrer,
    DerivedReferrer,
    ScalarSelect,
    ScalarCondition,
    ColumnQuery,
    VaryingUpdate,
}

impl BuildPurpose {
    pub fn is_no_setup_select(&self) -> bool {
        !matches!(self, BuildPurpose::NormalUse)
    }

    pub fn is_no_specify_column_two_or_more(&self) -> bool {
        !matches!(self, BuildPurpose::NormalUse | BuildPurpose::UnionQuery)
    }

    pub fn is_no_specify_relation(&self) -> bool {
        !matches!(self, BuildPurpose::NormalUse)
    }

    pub fn is_no_specify_derived_referrer(&self) -> bool {
        !matches!(self, BuildPurpose::NormalUse)
    }

    /// The column-only purposes carry no condition of their own
    pub fn is_no_query(&self) -> bool {
        matches!(self, BuildPurpose::ColumnQuery | BuildPurpose::VaryingUpdate)
    }

    pub fn is_no_order_by(&self) -> bool {
        !matches!(self, BuildPurpose::NormalUse | BuildPurpose::ColumnQuery)
    }

    pub fn is_no_union(&self) -> bool {
        !matches!(self, BuildPurpose::NormalUse)
    }

    pub fn is_no_paging(&self) -> bool {
        !matches!(self, BuildPurpose::NormalUse)
    }

    /// Whether the engine renders a sub-query embedded into another statement
    pub fn is_any_sub_query(&self) -> bool {
        matches!(
            self,
            BuildPurpose::ExistsReferrer
                | BuildPurpose::InReferrer
                | BuildPurpose::DerivedReferrer
                | BuildPurpose::ScalarCondition
        )
    }
}

impl Display for BuildPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BuildPurpose::NormalUse => "normal use",
            BuildPurpose::UnionQuery => "union query",
            BuildPurpose::ExistsReferrer => "exists referrer",
            BuildPurpose::InReferrer => "in referrer",
            BuildPurpose::DerivedReferrer => "derived referrer",
            BuildPurpose::ScalarSelect => "scalar select",
            BuildPurpose::ScalarCondition => "scalar condition",
            BuildPurpose::ColumnQuery => "column query",
            BuildPurpose::VaryingUpdate => "varying update",
        };
        f.write_str(name)
    }
}

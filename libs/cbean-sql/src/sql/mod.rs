// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod expression_builder;
mod sql_builder;

pub mod column_name;
pub mod condition_key;
pub mod condition_value;
pub mod fixed_condition;
pub mod join;
pub mod like_search;
pub mod order;
pub mod query_clause;
pub mod query_value;

pub use expression_builder::ExpressionBuilder;
pub use sql_builder::SqlBuilder;

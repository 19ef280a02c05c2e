// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::SqlBuilder;

/// A trait for types that can build themselves into an SQL fragment.
///
/// Each constituent of a clause (a bound predicate, a join, an order-by element, etc.) implements
/// this trait, so that the engine can hierarchically build the final SQL string.
pub trait ExpressionBuilder {
    /// Build the SQL fragment into the given SQL builder
    fn build(&self, builder: &mut SqlBuilder);

    /// Build the SQL fragment into a string and return it. This is useful for testing/debugging,
    /// where we want to assert on the generated SQL without going through the whole process of
    /// creating an SqlBuilder, then building into it, and finally extracting the SQL string.
    fn to_sql(&self) -> String
    where
        Self: Sized,
    {
        let mut builder = SqlBuilder::new();
        self.build(&mut builder);
        builder.into_sql()
    }
}

impl<T> ExpressionBuilder for Box<T>
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SqlBuilder) {
        self.as_ref().build(builder)
    }
}

impl<T> ExpressionBuilder for &T
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SqlBuilder) {
        (**self).build(builder)
    }
}

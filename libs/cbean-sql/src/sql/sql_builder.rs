// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::ExpressionBuilder;

/// String accumulator that the clause fragments render themselves into.
#[derive(Debug, Default)]
pub struct SqlBuilder {
    sql: String,
}

impl SqlBuilder {
    pub fn new() -> Self {
        Self { sql: String::new() }
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(s.as_ref());
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Push a space. This is a common operation, so it is provided as a separate method.
    pub fn push_space(&mut self) {
        self.sql.push(' ');
    }

    /// Push elements of an iterator, separated by `sep`. The `push_elem` function provides
    /// the flexibility to map the elements (compared to [`SqlBuilder::push_elems`], which assumes that
    /// the elements implement [`ExpressionBuilder`] and [`build`](ExpressionBuilder::build) is all you need to call).
    pub fn push_iter<T>(
        &mut self,
        iter: impl ExactSizeIterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T),
    ) {
        let len = iter.len();
        for (i, item) in iter.enumerate() {
            push_elem(self, item);

            if i < len - 1 {
                self.sql.push_str(sep);
            }
        }
    }

    /// Push elements of a slice, separated by `sep`. The elements must themselves implement
    /// `ExpressionBuilder`.
    pub fn push_elems<T: ExpressionBuilder>(&mut self, elems: &[T], sep: &str) {
        self.push_iter(elems.iter(), sep, |builder, elem| {
            elem.build(builder);
        });
    }

    /// Get the SQL string. Calling this method should be the final step in building an SQL
    /// expression, and thus this builder consumes the `self`.
    pub fn into_sql(self) -> String {
        self.sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Literal(&'static str);

    impl ExpressionBuilder for Literal {
        fn build(&self, builder: &mut SqlBuilder) {
            builder.push_str(self.0);
        }
    }

    #[test]
    fn push_elems_separates() {
        let mut builder = SqlBuilder::new();
        builder.push_str("where");
        builder.push_space();
        builder.push_elems(&[Literal("a = 1"), Literal("b = 2")], " and ");

        assert_eq!(builder.into_sql(), "where a = 1 and b = 2");
    }

    #[test]
    fn push_iter_single_element_has_no_separator() {
        let mut builder = SqlBuilder::new();
        builder.push_iter(["c1"].into_iter(), ", ", |builder, elem| {
            builder.push_str(elem)
        });

        assert_eq!(builder.into_sql(), "c1");
    }
}

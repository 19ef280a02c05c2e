// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Sub-query indentation.
//!
//! A sub-query spliced into an outer clause is enclosed in a begin/end mark pair carrying a
//! caller-chosen identity. [`SubQueryIndentProcessor::process`] removes the marks and indents
//! every following line of the enclosed text to the column where its begin mark stood. Pairs
//! nest to any depth and are matched by identity, nearest enclosing first.

use crate::clause_error::SqlClauseError;

pub const SUB_QUERY_BEGIN_MARK_PREFIX: &str = "--#df:sqbegin#";
pub const SUB_QUERY_END_MARK_PREFIX: &str = "--#df:sqend#";
const IDENTITY_TERMINAL: &str = "#df:idterm#";

pub struct SubQueryIndentProcessor;

impl SubQueryIndentProcessor {
    pub fn resolve_begin_mark(identity: &str) -> String {
        format!("{SUB_QUERY_BEGIN_MARK_PREFIX}{identity}{IDENTITY_TERMINAL}")
    }

    pub fn resolve_end_mark(identity: &str) -> String {
        format!("{SUB_QUERY_END_MARK_PREFIX}{identity}{IDENTITY_TERMINAL}")
    }

    /// Enclose `sub_query` in the mark pair of `identity`
    pub fn enclose(identity: &str, sub_query: &str) -> String {
        format!(
            "{}\n{}{}",
            Self::resolve_begin_mark(identity),
            sub_query,
            Self::resolve_end_mark(identity)
        )
    }

    pub fn process(sql: &str) -> Result<String, SqlClauseError> {
        let mut processed = String::with_capacity(sql.len());
        let mut rest = sql;

        while let Some(begin) = rest.find(SUB_QUERY_BEGIN_MARK_PREFIX) {
            let (before, marked) = rest.split_at(begin);
            check_no_dangling_end(before)?;
            processed.push_str(before);

            let marked = &marked[SUB_QUERY_BEGIN_MARK_PREFIX.len()..];
            let terminal = marked.find(IDENTITY_TERMINAL).ok_or_else(|| {
                SqlClauseError::IllegalState(format!(
                    "The sub-query begin mark has no identity terminal: {marked}"
                ))
            })?;
            let identity = &marked[..terminal];
            let body_and_rest = &marked[terminal + IDENTITY_TERMINAL.len()..];

            let end_mark = Self::resolve_end_mark(identity);
            let end = matching_end(body_and_rest, &Self::resolve_begin_mark(identity), &end_mark)
                .ok_or_else(|| {
                    SqlClauseError::IllegalState(format!(
                        "The sub-query end mark for '{identity}' was not found"
                    ))
                })?;

            let body = &body_and_rest[..end];
            let body = body.strip_prefix('\n').unwrap_or(body);
            let body = Self::process(body)?;

            let indent = " ".repeat(current_column(&processed));
            processed.push_str(&body.replace('\n', &format!("\n{indent}")));

            rest = &body_and_rest[end + end_mark.len()..];
        }

        check_no_dangling_end(rest)?;
        processed.push_str(rest);
        Ok(processed)
    }
}

/// Offset of the end mark closing the already opened pair, counting nested pairs of the same
/// identity
fn matching_end(text: &str, begin_mark: &str, end_mark: &str) -> Option<usize> {
    let mut depth = 1;
    let mut position = 0;
    loop {
        let next_end = position + text[position..].find(end_mark)?;
        match text[position..].find(begin_mark).map(|found| position + found) {
            Some(next_begin) if next_begin < next_end => {
                depth += 1;
                position = next_begin + begin_mark.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(next_end);
                }
                position = next_end + end_mark.len();
            }
        }
    }
}

fn current_column(text: &str) -> usize {
    let line_start = text.rfind('\n').map(|index| index + 1).unwrap_or(0);
    text[line_start..].chars().count()
}

fn check_no_dangling_end(text: &str) -> Result<(), SqlClauseError> {
    if text.contains(SUB_QUERY_END_MARK_PREFIX) {
        Err(SqlClauseError::IllegalState(
            "A sub-query end mark has no begin mark".into(),
        ))
    } else {
        Ok(())
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::debug;

use crate::{clause_error::SqlClauseError, dialect::PagingWindow};

use super::SqlClause;

/// Fetch state. The page number is 1-origin and the size is positive whenever the scope is
/// effective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchScope {
    start_index: i64,
    size: i64,
    page_number: i64,
    effective: bool,
    suppressed: bool,
}

impl Default for FetchScope {
    fn default() -> Self {
        Self {
            start_index: 0,
            size: 0,
            page_number: 1,
            effective: false,
            suppressed: false,
        }
    }
}

impl FetchScope {
    /// Registrations keep the end index of the current page within `i64`, so the start index
    /// cannot overflow either
    fn page_start_index(&self) -> i64 {
        self.start_index + self.size * (self.page_number - 1)
    }

    fn check_range(start_index: i64, size: i64, page_number: i64) -> Result<(), SqlClauseError> {
        let end_index = size
            .checked_mul(page_number)
            .and_then(|rows| rows.checked_add(start_index));
        match end_index {
            Some(_) => Ok(()),
            None => Err(SqlClauseError::IllegalArgument(format!(
                "The page {page_number} of size {size} from {start_index} is out of range"
            ))),
        }
    }
}

impl SqlClause {
    pub fn fetch_first(&mut self, size: i64) -> Result<(), SqlClauseError> {
        self.check_paging_allowed()?;
        if size <= 0 {
            return Err(SqlClauseError::IllegalArgument(format!(
                "The fetch size should be positive: {size}"
            )));
        }
        self.fetch.start_index = 0;
        self.fetch.size = size;
        self.fetch.page_number = 1;
        self.fetch.effective = true;
        debug!(size, "Fetch first");
        Ok(())
    }

    pub fn fetch_scope(&mut self, start_index: i64, size: i64) -> Result<(), SqlClauseError> {
        self.check_paging_allowed()?;
        if start_index < 0 {
            return Err(SqlClauseError::IllegalArgument(format!(
                "The fetch start index should not be negative: {start_index}"
            )));
        }
        if size <= 0 {
            return Err(SqlClauseError::IllegalArgument(format!(
                "The fetch size should be positive: {size}"
            )));
        }
        FetchScope::check_range(start_index, size, 1)?;
        self.fetch.start_index = start_index;
        self.fetch.size = size;
        self.fetch_page(1)
    }

    /// Move to the page `page_number` of the current size. Non-positive numbers mean the first
    /// page.
    pub fn fetch_page(&mut self, page_number: i64) -> Result<(), SqlClauseError> {
        self.check_paging_allowed()?;
        if self.fetch.size <= 0 {
            return Err(SqlClauseError::IllegalState(
                "The fetch size should be set before the page number".into(),
            ));
        }
        let page_number = page_number.max(1);
        FetchScope::check_range(self.fetch.start_index, self.fetch.size, page_number)?;
        if page_number == 1 && self.fetch.start_index == 0 {
            return self.fetch_first(self.fetch.size);
        }
        self.fetch.page_number = page_number;
        self.fetch.effective = true;
        debug!(
            start_index = self.fetch.start_index,
            size = self.fetch.size,
            page_number,
            "Fetch page"
        );
        Ok(())
    }

    pub fn fetch_size(&self) -> i64 {
        self.fetch.size
    }

    pub fn fetch_page_number(&self) -> i64 {
        self.fetch.page_number
    }

    pub fn page_start_index(&self) -> i64 {
        self.fetch.page_start_index()
    }

    pub fn page_end_index(&self) -> i64 {
        self.fetch.page_start_index() + self.fetch.size
    }

    pub fn is_fetch_scope_effective(&self) -> bool {
        self.fetch.effective && !self.fetch.suppressed
    }

    /// Keep the fetch state but render no paging until revived
    pub fn suppress_fetch_scope(&mut self) {
        self.fetch.suppressed = true;
    }

    pub fn revive_fetch_scope(&mut self) {
        self.fetch.suppressed = false;
    }

    /// Rows to skip in memory when the dialect cannot skip them itself
    pub fn fetch_narrowing_skip_start_index(&self) -> i64 {
        if !self.is_fetch_scope_effective() || self.dialect.is_fetch_start_index_supported() {
            0
        } else {
            self.page_start_index()
        }
    }

    /// Rows to read in memory when the dialect cannot limit them itself. `None` reads all.
    pub fn fetch_narrowing_loop_count(&self) -> Option<i64> {
        if !self.is_fetch_scope_effective() || self.dialect.is_fetch_size_supported() {
            None
        } else {
            Some(self.fetch.size)
        }
    }

    /// The window handed to the dialect, if paging is to be rendered
    pub(crate) fn paging_window(&self) -> Option<PagingWindow> {
        self.is_fetch_scope_effective().then(|| PagingWindow {
            start_index: self.page_start_index(),
            size: self.fetch.size,
            has_order_by: self.is_order_by_rendered(),
        })
    }

    fn check_paging_allowed(&self) -> Result<(), SqlClauseError> {
        if self.purpose.is_no_paging() {
            Err(self.unsupported_for_purpose("Paging"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::{
        clause::BuildPurpose,
        config::ClauseConfig,
        dialect::DatabaseKind,
        test_support::{member_clause, sample_provider},
    };

    use super::*;

    #[test]
    fn page_arithmetic() {
        let mut clause = member_clause(DatabaseKind::MySql);
        for (start, size, page) in [(0, 20, 1), (0, 20, 3), (5, 10, 2), (7, 3, 4)] {
            clause.fetch_scope(start, size).unwrap();
            clause.fetch_page(page).unwrap();
            assert_eq!(clause.page_start_index(), start + size * (page - 1));
            assert_eq!(clause.page_end_index(), clause.page_start_index() + size);
            assert!(clause.is_fetch_scope_effective());
        }
    }

    #[test]
    fn first_page_of_zero_start_is_fetch_first() {
        let mut paged = member_clause(DatabaseKind::MySql);
        paged.fetch_scope(0, 15).unwrap();
        paged.fetch_page(3).unwrap();
        paged.fetch_page(1).unwrap();

        let mut first = member_clause(DatabaseKind::MySql);
        first.fetch_first(15).unwrap();

        assert_eq!(paged.fetch, first.fetch);
    }

    #[test]
    fn non_positive_page_is_first_page() {
        let mut clause = member_clause(DatabaseKind::MySql);
        clause.fetch_first(10).unwrap();
        clause.fetch_page(-2).unwrap();
        assert_eq!(clause.fetch_page_number(), 1);
        assert_eq!(clause.page_start_index(), 0);
    }

    #[test]
    fn invalid_fetch_arguments() {
        let mut clause = member_clause(DatabaseKind::MySql);
        assert!(matches!(clause.fetch_first(0), Err(SqlClauseError::IllegalArgument(_))));
        assert!(matches!(clause.fetch_scope(-1, 10), Err(SqlClauseError::IllegalArgument(_))));
        assert!(matches!(clause.fetch_scope(0, -1), Err(SqlClauseError::IllegalArgument(_))));
        assert!(matches!(clause.fetch_page(2), Err(SqlClauseError::IllegalState(_))));
        assert!(!clause.is_fetch_scope_effective());
    }

    #[test]
    fn out_of_range_page_is_rejected() {
        let mut clause = member_clause(DatabaseKind::MySql);
        clause.fetch_first(i64::MAX / 2).unwrap();
        assert!(matches!(clause.fetch_page(4), Err(SqlClauseError::IllegalArgument(_))));
        clause.fetch_page(2).unwrap();
        assert_eq!(clause.page_end_index(), (i64::MAX / 2) * 2);

        assert!(matches!(
            clause.fetch_scope(i64::MAX - 5, 10),
            Err(SqlClauseError::IllegalArgument(_))
        ));
        assert_eq!(clause.fetch_size(), i64::MAX / 2);
        assert_eq!(clause.fetch_page_number(), 2);
        assert!(clause.get_clause().is_ok());
    }

    #[test]
    fn suppress_and_revive() {
        let mut clause = member_clause(DatabaseKind::MySql);
        clause.fetch_first(10).unwrap();
        clause.suppress_fetch_scope();
        assert!(!clause.is_fetch_scope_effective());
        assert_eq!(clause.paging_window(), None);
        clause.revive_fetch_scope();
        assert!(clause.is_fetch_scope_effective());
    }

    #[test]
    fn narrowing_without_native_paging() {
        let mut access = member_clause(DatabaseKind::MsAccess);
        assert_eq!(access.fetch_narrowing_skip_start_index(), 0);
        assert_eq!(access.fetch_narrowing_loop_count(), None);

        access.fetch_first(10).unwrap();
        access.fetch_page(3).unwrap();
        assert_eq!(access.fetch_narrowing_skip_start_index(), 20);
        assert_eq!(access.fetch_narrowing_loop_count(), Some(10));

        let mut mysql = member_clause(DatabaseKind::MySql);
        mysql.fetch_first(10).unwrap();
        mysql.fetch_page(3).unwrap();
        assert_eq!(mysql.fetch_narrowing_skip_start_index(), 0);
        assert_eq!(mysql.fetch_narrowing_loop_count(), None);
    }

    #[test]
    fn sub_query_rejects_paging() {
        let mut clause = SqlClause::with_purpose(
            "MEMBER",
            sample_provider(),
            &ClauseConfig::default(),
            BuildPurpose::ScalarSelect,
        )
        .unwrap();
        assert!(matches!(clause.fetch_first(10), Err(SqlClauseError::Unsupported(_))));
    }
}

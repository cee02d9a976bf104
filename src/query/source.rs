//! Where a loan table gets its rows from
//!
//! A view is backed by exactly one strategy: either the server paginates,
//! filters and sorts, or a fixed in-memory collection is processed locally.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{LoanBackend, LoanListQuery};
use crate::error::ClientResult;
use crate::models::{LoanApplication, Pagination};

use super::filter::FilterCriteria;
use super::page::{paginate, PageSpec};
use super::sort::SortSpec;

pub const EMPTY_MESSAGE: &str = "No loan applications found";

/// Which strategy produced a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    ServerPaginated,
    ClientSide,
}

/// Rows to render plus paging state
#[derive(Debug, Clone, PartialEq)]
pub struct LoanView {
    pub rows: Vec<LoanApplication>,
    pub page_info: Pagination,
    /// Server's hint that the caller may use super-admin affordances
    pub is_super_admin: bool,
    pub mode: QueryMode,
}

impl LoanView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Explicit "no records" state instead of an empty table
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_MESSAGE)
    }

    /// Replace a cached row after its loan changed
    pub fn replace_row(&mut self, loan: &LoanApplication) -> bool {
        match self.rows.iter_mut().find(|row| row.id == loan.id) {
            Some(row) => {
                *row = loan.clone();
                true
            }
            None => false,
        }
    }
}

/// Filter, sort and paginate a fixed collection locally
pub fn apply(
    loans: &[LoanApplication],
    criteria: &FilterCriteria,
    sort: &SortSpec,
    page: PageSpec,
) -> (Vec<LoanApplication>, Pagination) {
    let mut visible: Vec<LoanApplication> = loans
        .iter()
        .filter(|loan| criteria.matches(loan))
        .cloned()
        .collect();
    sort.sort(&mut visible);
    paginate(&visible, page)
}

/// Strategy interface shared by both modes
#[async_trait]
pub trait LoanQuerySource: Send + Sync {
    fn mode(&self) -> QueryMode;

    async fn fetch(
        &self,
        criteria: &FilterCriteria,
        sort: &SortSpec,
        page: PageSpec,
    ) -> ClientResult<LoanView>;
}

/// Client-side strategy over an injected collection
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    loans: Vec<LoanApplication>,
}

impl InMemorySource {
    pub fn new(loans: Vec<LoanApplication>) -> Self {
        Self { loans }
    }

    pub fn loans(&self) -> &[LoanApplication] {
        &self.loans
    }

    /// Keep the injected copy in step with a loan that changed elsewhere
    pub fn upsert(&mut self, loan: LoanApplication) {
        match self.loans.iter_mut().find(|l| l.id == loan.id) {
            Some(existing) => *existing = loan,
            None => self.loans.push(loan),
        }
    }

    pub fn view(&self, criteria: &FilterCriteria, sort: &SortSpec, page: PageSpec) -> LoanView {
        let (rows, page_info) = apply(&self.loans, criteria, sort, page);
        LoanView {
            rows,
            page_info,
            is_super_admin: false,
            mode: QueryMode::ClientSide,
        }
    }
}

#[async_trait]
impl LoanQuerySource for InMemorySource {
    fn mode(&self) -> QueryMode {
        QueryMode::ClientSide
    }

    async fn fetch(
        &self,
        criteria: &FilterCriteria,
        sort: &SortSpec,
        page: PageSpec,
    ) -> ClientResult<LoanView> {
        Ok(self.view(criteria, sort, page))
    }
}

/// Server-paginated strategy; rows are rendered exactly as returned.
///
/// The admin list endpoint only filters by status and search, so date and
/// numeric ranges in the criteria are not applied in this mode.
pub struct ServerSource<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: LoanBackend + ?Sized> ServerSource<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn query_for(criteria: &FilterCriteria, sort: &SortSpec, page: PageSpec) -> LoanListQuery {
        LoanListQuery {
            page: page.page,
            limit: page.limit,
            status: criteria.status.status(),
            search: criteria.effective_search(),
            sort: Some((
                sort.field.as_param().to_string(),
                sort.direction.as_param().to_string(),
            )),
        }
    }
}

#[async_trait]
impl<B: LoanBackend + ?Sized> LoanQuerySource for ServerSource<B> {
    fn mode(&self) -> QueryMode {
        QueryMode::ServerPaginated
    }

    async fn fetch(
        &self,
        criteria: &FilterCriteria,
        sort: &SortSpec,
        page: PageSpec,
    ) -> ClientResult<LoanView> {
        if criteria.has_ranges() {
            tracing::debug!("Range filters are not supported by the server list, ignoring them");
        }
        let query = Self::query_for(criteria, sort, page);
        let result = self.backend.list_loans(&query).await?;

        tracing::debug!(
            page = result.pagination.current_page,
            total = result.pagination.total_loans,
            rows = result.loans.len(),
            "Fetched loan page"
        );

        Ok(LoanView {
            rows: result.loans,
            page_info: result.pagination,
            is_super_admin: result.is_super_admin,
            mode: QueryMode::ServerPaginated,
        })
    }
}

//! View state shared by the loan controllers
//!
//! One `LoanDesk` backs a console session: the current table page with the
//! inputs that produced it, the loan open in the detail pane, its history and
//! any status change being drafted. Controllers refresh it after a write.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::LoanBackend;
use crate::error::ClientResult;
use crate::models::{LoanApplication, LoanStatus, StatusHistoryEntry};
use crate::query::{FilterCriteria, LoanQuerySource, LoanView, PageSpec, ServerSource, SortSpec};

use super::draft::StatusChangeDraft;

pub type SharedDesk = Arc<RwLock<LoanDesk>>;

#[derive(Debug, Clone, Default)]
pub struct LoanDesk {
    /// Table filters; pages come from `ServerSource`, so only status and
    /// search reach the backend
    pub criteria: FilterCriteria,
    pub sort: SortSpec,
    pub page: PageSpec,
    pub view: Option<LoanView>,
    pub detail: Option<LoanApplication>,
    pub history: Vec<StatusHistoryEntry>,
    pub draft: Option<StatusChangeDraft>,
}

impl LoanDesk {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: PageSpec::new(1, page_size),
            ..Self::default()
        }
    }

    pub fn shared(self) -> SharedDesk {
        Arc::new(RwLock::new(self))
    }

    /// Whether the detail pane shows `loan_id`
    pub fn is_open(&self, loan_id: &str) -> bool {
        self.detail.as_ref().map_or(false, |l| l.id == loan_id)
    }

    /// Reflect a persisted status change in every cached copy of the loan
    pub fn apply_status(&mut self, loan_id: &str, status: LoanStatus) {
        if let Some(detail) = self.detail.as_mut().filter(|l| l.id == loan_id) {
            detail.status = status;
        }
        if let Some(view) = self.view.as_mut() {
            for row in view.rows.iter_mut().filter(|r| r.id == loan_id) {
                row.status = status;
            }
        }
    }

    /// Drop the open draft (if any) together with its reason text
    pub fn close_draft(&mut self) -> Option<StatusChangeDraft> {
        self.draft.take()
    }

    /// Close the draft only when it belongs to `loan_id`
    pub fn close_draft_for(&mut self, loan_id: &str) {
        if self.draft.as_ref().map_or(false, |d| d.loan_id == loan_id) {
            self.draft = None;
        }
    }
}

/// Re-fetch the table page using the desk's current inputs
pub(crate) async fn refresh_page<B: LoanBackend + ?Sized>(
    desk: &RwLock<LoanDesk>,
    backend: &Arc<B>,
) -> ClientResult<LoanView> {
    let (criteria, sort, page) = {
        let desk = desk.read().await;
        (desk.criteria.clone(), desk.sort, desk.page)
    };

    let view = ServerSource::new(backend.clone())
        .fetch(&criteria, &sort, page)
        .await?;
    desk.write().await.view = Some(view.clone());
    Ok(view)
}

/// Re-fetch one loan into the detail pane and patch its table row
pub(crate) async fn refresh_detail<B: LoanBackend + ?Sized>(
    desk: &RwLock<LoanDesk>,
    backend: &Arc<B>,
    loan_id: &str,
) -> ClientResult<LoanApplication> {
    let loan = backend.get_loan(loan_id).await?;
    let mut desk = desk.write().await;
    if let Some(view) = desk.view.as_mut() {
        view.replace_row(&loan);
    }
    if !desk.is_open(loan_id) {
        desk.history.clear();
    }
    desk.detail = Some(loan.clone());
    Ok(loan)
}

/// Re-fetch the history of an open loan, newest entry first
pub(crate) async fn refresh_history<B: LoanBackend + ?Sized>(
    desk: &RwLock<LoanDesk>,
    backend: &Arc<B>,
    loan_id: &str,
) -> ClientResult<Vec<StatusHistoryEntry>> {
    let mut history = backend.status_history(loan_id).await?;
    // The server log is append-only and its order is not guaranteed
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let mut desk = desk.write().await;
    if desk.is_open(loan_id) {
        desk.history = history.clone();
    }
    Ok(history)
}

//! Loan status workflow
//!
//! Every status change needs a non-blank reason, checked before any request is
//! made. After the backend accepts a change, the cached loan is patched and the
//! detail, history and table page are re-fetched in that order. A failed change
//! leaves the desk untouched so the admin can retry from the same draft.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::api::{status_update, LoanBackend};
use crate::auth::Session;
use crate::error::{ClientError, ClientResult};
use crate::models::{LoanApplication, LoanStatus, Reevaluation};
use crate::query::LoanView;

use super::desk::{refresh_detail, refresh_history, refresh_page, SharedDesk};
use super::draft::StatusChangeDraft;

pub const REASON_REQUIRED: &str = "reason required";
pub const UPDATE_IN_PROGRESS: &str = "status update already in progress";

/// Status workflow controller
pub struct StatusWorkflow<B: LoanBackend + ?Sized> {
    session: Arc<Session>,
    backend: Arc<B>,
    desk: SharedDesk,
    updating: Mutex<HashSet<String>>,
}

/// Marks a loan as having a status update in flight until dropped
struct UpdateGuard<'a> {
    updating: &'a Mutex<HashSet<String>>,
    loan_id: String,
}

impl<'a> UpdateGuard<'a> {
    fn acquire(updating: &'a Mutex<HashSet<String>>, loan_id: &str) -> ClientResult<Self> {
        let mut set = updating.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(loan_id.to_string()) {
            return Err(ClientError::Validation(UPDATE_IN_PROGRESS.to_string()));
        }
        Ok(Self {
            updating,
            loan_id: loan_id.to_string(),
        })
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        let mut set = self.updating.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.loan_id);
    }
}

impl<B: LoanBackend + ?Sized> StatusWorkflow<B> {
    pub fn new(session: Arc<Session>, backend: Arc<B>, desk: SharedDesk) -> Self {
        Self {
            session,
            backend,
            desk,
            updating: Mutex::new(HashSet::new()),
        }
    }

    pub fn desk(&self) -> &SharedDesk {
        &self.desk
    }

    /// Whether a status change for `loan_id` is in flight
    pub fn is_updating(&self, loan_id: &str) -> bool {
        self.updating
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(loan_id)
    }

    /// Load the table page for the desk's current criteria
    pub async fn load_page(&self) -> ClientResult<LoanView> {
        self.session.bearer()?;
        refresh_page(&self.desk, &self.backend).await
    }

    /// Open a loan in the detail pane together with its history
    pub async fn open_loan(&self, loan_id: &str) -> ClientResult<LoanApplication> {
        self.session.bearer()?;
        let loan = refresh_detail(&self.desk, &self.backend, loan_id).await?;
        refresh_history(&self.desk, &self.backend, loan_id).await?;
        Ok(loan)
    }

    // ========================================================================
    // Draft handling
    // ========================================================================

    /// Start a status change for the open loan
    pub async fn open_draft(&self, target: LoanStatus) -> ClientResult<()> {
        let mut desk = self.desk.write().await;
        let draft = desk
            .detail
            .as_ref()
            .map(|loan| StatusChangeDraft::open(loan, target))
            .ok_or_else(|| ClientError::NotLoaded("Loan detail".to_string()))?;
        desk.draft = Some(draft);
        Ok(())
    }

    pub async fn set_reason(&self, reason: &str) -> ClientResult<()> {
        let mut desk = self.desk.write().await;
        let draft = desk
            .draft
            .as_mut()
            .ok_or_else(|| ClientError::NotLoaded("Status change".to_string()))?;
        draft.set_reason(reason);
        Ok(())
    }

    pub async fn cancel_draft(&self) {
        self.desk.write().await.close_draft();
    }

    /// Submit the open draft
    pub async fn confirm(&self) -> ClientResult<()> {
        let draft = self
            .desk
            .read()
            .await
            .draft
            .clone()
            .ok_or_else(|| ClientError::NotLoaded("Status change".to_string()))?;
        self.transition(&draft.loan_id, draft.target, &draft.reason)
            .await
    }

    async fn mark_submitting(&self, loan_id: &str, submitting: bool) {
        let mut desk = self.desk.write().await;
        if let Some(draft) = desk.draft.as_mut().filter(|d| d.loan_id == loan_id) {
            draft.submitting = submitting;
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Persist a status change and refresh every view of the loan.
    ///
    /// Any status may move to any other, the current one included; the backend
    /// still records a history entry for a same-status change.
    pub async fn transition(
        &self,
        loan_id: &str,
        target: LoanStatus,
        reason: &str,
    ) -> ClientResult<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ClientError::Validation(REASON_REQUIRED.to_string()));
        }
        self.session.bearer()?;

        let _guard = UpdateGuard::acquire(&self.updating, loan_id)?;
        self.mark_submitting(loan_id, true).await;

        tracing::info!(
            loan_id = %loan_id,
            status = %target,
            admin = self.session.email().unwrap_or("unknown"),
            "Submitting loan status change"
        );

        let request = status_update(target, reason);
        if let Err(e) = self.backend.update_status(loan_id, &request).await {
            tracing::warn!(
                loan_id = %loan_id,
                status = %target,
                error = %e,
                "Loan status change rejected"
            );
            self.mark_submitting(loan_id, false).await;
            return Err(e);
        }

        self.desk.write().await.apply_status(loan_id, target);

        // The change is persisted; a failed re-fetch only leaves a stale pane.
        // Another loan open in the detail pane stays where it is.
        if self.desk.read().await.is_open(loan_id) {
            if let Err(e) = refresh_detail(&self.desk, &self.backend, loan_id).await {
                tracing::warn!(loan_id = %loan_id, error = %e, "Failed to refresh loan detail");
            }
            if let Err(e) = refresh_history(&self.desk, &self.backend, loan_id).await {
                tracing::warn!(loan_id = %loan_id, error = %e, "Failed to refresh status history");
            }
        }
        if let Err(e) = refresh_page(&self.desk, &self.backend).await {
            tracing::warn!(error = %e, "Failed to refresh loan list");
        }

        self.desk.write().await.close_draft_for(loan_id);

        tracing::info!(loan_id = %loan_id, status = %target, "Loan status updated");
        Ok(())
    }

    /// Ask the backend to re-run the eligibility model, then refresh the detail
    /// when that loan is open. No history entry is written.
    pub async fn reevaluate(&self, loan_id: &str) -> ClientResult<Reevaluation> {
        self.session.bearer()?;

        let outcome = self.backend.reevaluate(loan_id).await?;
        tracing::info!(
            loan_id = %loan_id,
            prediction = %outcome.ml_prediction.eligibility_status,
            confidence = ?outcome.ml_prediction.confidence,
            "Loan re-evaluated"
        );

        if self.desk.read().await.is_open(loan_id) {
            if let Err(e) = refresh_detail(&self.desk, &self.backend, loan_id).await {
                tracing::warn!(loan_id = %loan_id, error = %e, "Failed to refresh loan detail");
            }
        }
        Ok(outcome)
    }
}

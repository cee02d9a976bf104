//! Loan-to-admin assignment (super-admin only)

use std::sync::Arc;

use crate::api::LoanBackend;
use crate::auth::Session;
use crate::error::ClientResult;
use crate::models::{Admin, LoanApplication};
use crate::workflow::{refresh_detail, refresh_page, SharedDesk};

/// Label shown for a loan with no assignee
pub const UNASSIGNED: &str = "Unassigned";

pub struct AssignmentController<B: LoanBackend + ?Sized> {
    session: Arc<Session>,
    backend: Arc<B>,
    desk: SharedDesk,
}

impl<B: LoanBackend + ?Sized> AssignmentController<B> {
    pub fn new(session: Arc<Session>, backend: Arc<B>, desk: SharedDesk) -> Self {
        Self {
            session,
            backend,
            desk,
        }
    }

    /// Whether the assignment column is offered at all
    pub fn is_available(&self) -> bool {
        self.session.is_super_admin()
    }

    /// Admins that loans can be assigned to.
    ///
    /// `None` means the column should be left out: either the session is not
    /// the super admin or the roster could not be fetched.
    pub async fn load_roster(&self) -> Option<Vec<Admin>> {
        if !self.is_available() {
            return None;
        }

        match self.backend.assignment_admins().await {
            Ok(admins) => Some(admins),
            Err(e) => {
                tracing::warn!(error = %e, "Admin roster unavailable, hiding assignment column");
                None
            }
        }
    }

    /// Assign a loan to an admin, or clear the assignment with `None`
    pub async fn assign(&self, loan_id: &str, admin_id: Option<&str>) -> ClientResult<()> {
        self.session.require_super_admin("assign loans")?;
        let admin_id = admin_id.map(str::trim).filter(|id| !id.is_empty());

        if let Err(e) = self.backend.assign(loan_id, admin_id).await {
            tracing::warn!(loan_id = %loan_id, admin_id = ?admin_id, error = %e, "Loan assignment failed");
            return Err(e);
        }
        tracing::info!(loan_id = %loan_id, admin_id = ?admin_id, "Loan assignment updated");

        if let Err(e) = refresh_page(&self.desk, &self.backend).await {
            tracing::warn!(error = %e, "Failed to refresh loan list");
        }
        let detail_open = self.desk.read().await.is_open(loan_id);
        if detail_open {
            if let Err(e) = refresh_detail(&self.desk, &self.backend, loan_id).await {
                tracing::warn!(loan_id = %loan_id, error = %e, "Failed to refresh loan detail");
            }
        }
        Ok(())
    }
}

/// Assignee name for a table cell, resolved against the roster when possible
pub fn assignee_label(loan: &LoanApplication, roster: &[Admin]) -> String {
    let Some(assigned) = loan.assigned_admin.as_ref() else {
        return UNASSIGNED.to_string();
    };
    roster
        .iter()
        .find(|a| a.id == assigned.id)
        .map(|a| a.display_name().to_string())
        .or_else(|| assigned.name.clone())
        .unwrap_or_else(|| assigned.id.clone())
}

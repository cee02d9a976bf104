//! Confirmation state of a pending status change

use crate::models::{LoanApplication, LoanStatus};

/// Target status plus the reason being typed for one loan
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChangeDraft {
    pub loan_id: String,
    pub current: LoanStatus,
    pub target: LoanStatus,
    pub reason: String,
    /// Set while the change is being persisted
    pub submitting: bool,
}

impl StatusChangeDraft {
    pub fn open(loan: &LoanApplication, target: LoanStatus) -> Self {
        Self {
            loan_id: loan.id.clone(),
            current: loan.status,
            target,
            reason: String::new(),
            submitting: false,
        }
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    /// Confirm stays disabled while the reason is blank or a submit is running
    pub fn can_confirm(&self) -> bool {
        !self.submitting && !self.reason.trim().is_empty()
    }

    /// Quick-action buttons for the current status are shown disabled
    pub fn is_same_status(&self) -> bool {
        self.current == self.target
    }
}

//! In-memory `LoanBackend` used by controller unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{ClientError, ClientResult};
use crate::models::{
    Admin, AdminStatus, AssignedAdmin, EligibilityDetails, LoanAnalytics, LoanApplication, LoanPage,
    LoanStatistics, LoanStatus, MlPrediction, Reevaluation, StatusHistoryEntry,
    StatusUpdateRequest,
};
use crate::query::{paginate, PageSpec};

use super::backend::{LoanBackend, LoanListQuery};

#[derive(Default)]
struct MockState {
    loans: Vec<LoanApplication>,
    history: HashMap<String, Vec<StatusHistoryEntry>>,
    admins: Vec<Admin>,
    calls: Vec<String>,
    failures: HashMap<&'static str, ClientError>,
    gates: HashMap<&'static str, Arc<Notify>>,
}

/// Behaves like the real server: status updates append history, lists paginate
#[derive(Default)]
pub(crate) struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub(crate) fn new(loans: Vec<LoanApplication>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().loans = loans;
        backend
    }

    pub(crate) fn with_admins(self, admins: Vec<Admin>) -> Self {
        self.state.lock().unwrap().admins = admins;
        self
    }

    /// Seed the stored history of `loan_id` in the given order
    pub(crate) fn with_history(self, loan_id: &str, entries: Vec<StatusHistoryEntry>) -> Self {
        self.state
            .lock()
            .unwrap()
            .history
            .insert(loan_id.to_string(), entries);
        self
    }

    /// Make the next call to `op` fail with `error`
    pub(crate) fn fail_next(&self, op: &'static str, error: ClientError) {
        self.state.lock().unwrap().failures.insert(op, error);
    }

    /// Block calls to `op` until the returned handle is notified
    pub(crate) fn gate(&self, op: &'static str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state.lock().unwrap().gates.insert(op, notify.clone());
        notify
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn count(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == op)
            .count()
    }

    pub(crate) fn loan(&self, id: &str) -> Option<LoanApplication> {
        self.state.lock().unwrap().loans.iter().find(|l| l.id == id).cloned()
    }

    pub(crate) fn history(&self, id: &str) -> Vec<StatusHistoryEntry> {
        self.state
            .lock()
            .unwrap()
            .history
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn admins(&self) -> Vec<Admin> {
        self.state.lock().unwrap().admins.clone()
    }

    async fn enter(&self, op: &'static str) -> ClientResult<()> {
        let (failure, gate) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(op.to_string());
            (state.failures.remove(op), state.gates.get(op).cloned())
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found() -> ClientError {
        ClientError::Remote {
            status: 404,
            message: "Loan application not found".to_string(),
        }
    }
}

#[async_trait]
impl LoanBackend for MockBackend {
    async fn list_loans(&self, query: &LoanListQuery) -> ClientResult<LoanPage> {
        self.enter("list_loans").await?;
        let state = self.state.lock().unwrap();
        let visible: Vec<LoanApplication> = state
            .loans
            .iter()
            .filter(|l| query.status.map_or(true, |s| l.status == s))
            .filter(|l| {
                query.search.as_deref().map_or(true, |s| {
                    l.applicant_name().to_lowercase().contains(&s.to_lowercase())
                })
            })
            .cloned()
            .collect();
        let (loans, pagination) = paginate(&visible, PageSpec::new(query.page, query.limit));
        Ok(LoanPage {
            loans,
            pagination,
            is_super_admin: false,
        })
    }

    async fn get_loan(&self, loan_id: &str) -> ClientResult<LoanApplication> {
        self.enter("get_loan").await?;
        self.loan(loan_id).ok_or_else(Self::not_found)
    }

    async fn update_status(&self, loan_id: &str, request: &StatusUpdateRequest) -> ClientResult<()> {
        self.enter("update_status").await?;
        let mut state = self.state.lock().unwrap();
        let loan = state
            .loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or_else(Self::not_found)?;
        loan.status = request.status;
        state.history.entry(loan_id.to_string()).or_default().insert(
            0,
            StatusHistoryEntry {
                status: request.status,
                reason: request.reason.clone(),
                updated_by: Some("Test Admin".to_string()),
                timestamp: request.timestamp,
            },
        );
        Ok(())
    }

    async fn status_history(&self, loan_id: &str) -> ClientResult<Vec<StatusHistoryEntry>> {
        self.enter("status_history").await?;
        Ok(self.history(loan_id))
    }

    async fn assign(&self, loan_id: &str, admin_id: Option<&str>) -> ClientResult<()> {
        self.enter("assign").await?;
        let mut state = self.state.lock().unwrap();
        let assigned = admin_id.map(|id| AssignedAdmin {
            id: id.to_string(),
            name: state
                .admins
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.name.clone()),
        });
        let loan = state
            .loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or_else(Self::not_found)?;
        loan.assigned_admin = assigned;
        Ok(())
    }

    async fn reevaluate(&self, loan_id: &str) -> ClientResult<Reevaluation> {
        self.enter("reevaluate").await?;
        let mut state = self.state.lock().unwrap();
        let loan = state
            .loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or_else(Self::not_found)?;
        loan.eligibility_details = Some(EligibilityDetails {
            ml_prediction: Some("Eligible".to_string()),
            confidence_score: Some(0.87),
            ..EligibilityDetails::default()
        });
        Ok(Reevaluation {
            ml_prediction: MlPrediction {
                eligibility_status: "Eligible".to_string(),
                confidence: Some(0.87),
            },
        })
    }

    async fn assignment_admins(&self) -> ClientResult<Vec<Admin>> {
        self.enter("assignment_admins").await?;
        Ok(self.admins())
    }

    async fn statistics(&self) -> ClientResult<LoanStatistics> {
        self.enter("statistics").await?;
        let state = self.state.lock().unwrap();
        let count = |s: LoanStatus| state.loans.iter().filter(|l| l.status == s).count() as u64;
        Ok(LoanStatistics {
            total_loans: state.loans.len() as u64,
            pending: count(LoanStatus::Pending),
            approved: count(LoanStatus::Approved),
            rejected: count(LoanStatus::Rejected),
            not_eligible: count(LoanStatus::NotEligible),
            under_review: count(LoanStatus::UnderReview),
            total_amount: Some(state.loans.iter().map(|l| l.loan_amount()).sum()),
        })
    }

    async fn analytics(&self) -> ClientResult<LoanAnalytics> {
        self.enter("analytics").await?;
        let state = self.state.lock().unwrap();
        let mut analytics = LoanAnalytics::default();
        analytics
            .metrics
            .insert("totalLoans".to_string(), state.loans.len() as f64);
        Ok(analytics)
    }

    async fn list_admins(&self) -> ClientResult<Vec<Admin>> {
        self.enter("list_admins").await?;
        Ok(self.admins())
    }

    async fn update_admin_status(&self, admin_id: &str, status: AdminStatus) -> ClientResult<()> {
        self.enter("update_admin_status").await?;
        let mut state = self.state.lock().unwrap();
        if let Some(admin) = state.admins.iter_mut().find(|a| a.id == admin_id) {
            admin.status = status;
        }
        Ok(())
    }

    async fn delete_admin(&self, admin_id: &str) -> ClientResult<()> {
        self.enter("delete_admin").await?;
        self.state.lock().unwrap().admins.retain(|a| a.id != admin_id);
        Ok(())
    }
}

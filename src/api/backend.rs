//! The admin-side backend contract consumed by the controllers

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;

use crate::error::ClientResult;
use crate::models::{
    Admin, AdminStatus, AdminStatusUpdate, AssignRequest, LoanAnalytics, LoanApplication, LoanPage,
    LoanStatistics, LoanStatus, Reevaluation, StatusHistoryEntry, StatusUpdateRequest,
};

use super::client::{to_body, ApiClient};
use super::endpoints;

/// Query parameters of `GET /api/loans/admin/all`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanListQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<LoanStatus>,
    pub search: Option<String>,
    /// Server-side sort key and order (`asc` / `desc`)
    pub sort: Option<(String, String)>,
}

impl Default for LoanListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            status: None,
            search: None,
            sort: None,
        }
    }
}

impl LoanListQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.max(1).to_string()),
        ];
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        if let Some((field, order)) = &self.sort {
            params.push(("sortBy", field.clone()));
            params.push(("sortOrder", order.clone()));
        }
        params
    }
}

/// Backend operations used by the workflow, assignment, roster and dashboard layers
#[async_trait]
pub trait LoanBackend: Send + Sync {
    async fn list_loans(&self, query: &LoanListQuery) -> ClientResult<LoanPage>;

    async fn get_loan(&self, loan_id: &str) -> ClientResult<LoanApplication>;

    async fn update_status(&self, loan_id: &str, request: &StatusUpdateRequest) -> ClientResult<()>;

    async fn status_history(&self, loan_id: &str) -> ClientResult<Vec<StatusHistoryEntry>>;

    async fn assign(&self, loan_id: &str, admin_id: Option<&str>) -> ClientResult<()>;

    async fn reevaluate(&self, loan_id: &str) -> ClientResult<Reevaluation>;

    async fn assignment_admins(&self) -> ClientResult<Vec<Admin>>;

    async fn statistics(&self) -> ClientResult<LoanStatistics>;

    async fn analytics(&self) -> ClientResult<LoanAnalytics>;

    async fn list_admins(&self) -> ClientResult<Vec<Admin>>;

    async fn update_admin_status(&self, admin_id: &str, status: AdminStatus) -> ClientResult<()>;

    async fn delete_admin(&self, admin_id: &str) -> ClientResult<()>;
}

#[async_trait]
impl LoanBackend for ApiClient {
    async fn list_loans(&self, query: &LoanListQuery) -> ClientResult<LoanPage> {
        self.call(Method::GET, endpoints::ADMIN_LOANS, &query.to_params(), None)
            .await
    }

    async fn get_loan(&self, loan_id: &str) -> ClientResult<LoanApplication> {
        self.call(Method::GET, &endpoints::admin_loan(loan_id), &[], None)
            .await
    }

    async fn update_status(&self, loan_id: &str, request: &StatusUpdateRequest) -> ClientResult<()> {
        self.call_raw(
            Method::PUT,
            &endpoints::loan_status(loan_id),
            &[],
            Some(to_body(request)?),
        )
        .await?;
        Ok(())
    }

    async fn status_history(&self, loan_id: &str) -> ClientResult<Vec<StatusHistoryEntry>> {
        self.call(Method::GET, &endpoints::status_history(loan_id), &[], None)
            .await
    }

    async fn assign(&self, loan_id: &str, admin_id: Option<&str>) -> ClientResult<()> {
        let body = AssignRequest {
            admin_id: admin_id.map(str::to_string),
        };
        self.call_raw(Method::PUT, &endpoints::assign(loan_id), &[], Some(to_body(&body)?))
            .await?;
        Ok(())
    }

    async fn reevaluate(&self, loan_id: &str) -> ClientResult<Reevaluation> {
        self.call(Method::PUT, &endpoints::reevaluate(loan_id), &[], None)
            .await
    }

    async fn assignment_admins(&self) -> ClientResult<Vec<Admin>> {
        self.call(Method::GET, endpoints::ASSIGNMENT_ADMINS, &[], None)
            .await
    }

    async fn statistics(&self) -> ClientResult<LoanStatistics> {
        self.call(Method::GET, endpoints::STATISTICS, &[], None).await
    }

    async fn analytics(&self) -> ClientResult<LoanAnalytics> {
        self.call(Method::GET, endpoints::ANALYTICS, &[], None).await
    }

    async fn list_admins(&self) -> ClientResult<Vec<Admin>> {
        self.call(Method::GET, endpoints::ADMIN_ROSTER, &[], None).await
    }

    async fn update_admin_status(&self, admin_id: &str, status: AdminStatus) -> ClientResult<()> {
        let body = AdminStatusUpdate { status };
        self.call_raw(
            Method::PUT,
            &endpoints::admin_update_status(admin_id),
            &[],
            Some(to_body(&body)?),
        )
        .await?;
        Ok(())
    }

    async fn delete_admin(&self, admin_id: &str) -> ClientResult<()> {
        self.call_raw(Method::DELETE, &endpoints::admin_delete(admin_id), &[], None)
            .await?;
        Ok(())
    }
}

/// Status update body stamped with the current time
pub fn status_update(status: LoanStatus, reason: &str) -> StatusUpdateRequest {
    StatusUpdateRequest {
        status,
        reason: reason.to_string(),
        timestamp: Utc::now(),
    }
}

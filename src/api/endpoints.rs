//! Backend REST paths. These are a compatibility surface and must not drift.

pub const ADMIN_LOANS: &str = "/api/loans/admin/all";
pub const ASSIGNMENT_ADMINS: &str = "/api/loans/admin/assignment/admins";
pub const STATISTICS: &str = "/api/loans/admin/statistics";
pub const ANALYTICS: &str = "/api/loans/admin/analytics";
pub const PROFILE: &str = "/api/auth/profile";
pub const APPLY: &str = "/api/loans/apply";
pub const LOGIN: &str = "/api/users/login";
pub const REGISTER: &str = "/api/users/register";
pub const UPLOAD: &str = "/api/upload";
pub const ADMIN_ROSTER: &str = "/admin/all";

pub fn admin_loan(id: &str) -> String {
    format!("/api/loans/admin/{}", id)
}

pub fn loan_status(id: &str) -> String {
    format!("/api/loans/admin/{}/status", id)
}

pub fn status_history(id: &str) -> String {
    format!("/api/loans/admin/{}/status-history", id)
}

pub fn assign(id: &str) -> String {
    format!("/api/loans/admin/{}/assign", id)
}

pub fn reevaluate(id: &str) -> String {
    format!("/api/loans/admin/{}/reevaluate", id)
}

pub fn user_loan(id: &str) -> String {
    format!("/api/loans/user/{}", id)
}

pub fn admin_update_status(id: &str) -> String {
    format!("/admin/update-status/{}", id)
}

pub fn admin_delete(id: &str) -> String {
    format!("/admin/delete/{}", id)
}

//! Admin roster models

use serde::{Deserialize, Serialize};

/// Approval state of an admin account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdminStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatus::Pending => "pending",
            AdminStatus::Approved => "approved",
            AdminStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for AdminStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(AdminStatus::Pending),
            "approved" => Ok(AdminStatus::Approved),
            "rejected" => Ok(AdminStatus::Rejected),
            _ => Err(format!(
                "Invalid admin status '{}'. Expected: pending, approved, or rejected",
                s
            )),
        }
    }
}

/// Admin roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    #[default]
    Admin,
    #[serde(alias = "superadmin", alias = "superAdmin")]
    SuperAdmin,
    #[serde(other)]
    Other,
}

/// Roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default = "default_admin_status")]
    pub status: AdminStatus,
    #[serde(default, alias = "isActive")]
    pub is_active: bool,
    #[serde(default)]
    pub role: AdminRole,
}

fn default_admin_status() -> AdminStatus {
    AdminStatus::Pending
}

impl Admin {
    /// Whether this account is the reserved super-admin identity
    pub fn is_reserved(&self, super_admin_email: &str) -> bool {
        emails_match(&self.email, super_admin_email)
    }

    /// Label used in assignment pickers
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Body of `PUT /admin/update-status/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct AdminStatusUpdate {
    pub status: AdminStatus,
}

/// Case-insensitive, whitespace-tolerant email comparison
pub fn emails_match(a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_parses_mongo_shape() {
        let admin: Admin = serde_json::from_str(
            r#"{"_id": "a1", "name": "Kiran", "email": "kiran@loanapp.com", "status": "approved", "isActive": true, "role": "admin"}"#,
        )
        .unwrap();
        assert_eq!(admin.id, "a1");
        assert_eq!(admin.status, AdminStatus::Approved);
        assert!(admin.is_active);
        assert_eq!(admin.role, AdminRole::Admin);
    }

    #[test]
    fn test_unknown_role_is_tolerated() {
        let admin: Admin = serde_json::from_str(
            r#"{"id": "a2", "email": "x@y.z", "role": "auditor"}"#,
        )
        .unwrap();
        assert_eq!(admin.role, AdminRole::Other);
        assert_eq!(admin.status, AdminStatus::Pending);
        assert_eq!(admin.display_name(), "x@y.z");
    }

    #[test]
    fn test_reserved_identity() {
        let admin: Admin =
            serde_json::from_str(r#"{"id": "root", "email": " Admin@LoanApp.com "}"#).unwrap();
        assert!(admin.is_reserved("admin@loanapp.com"));
        assert!(!emails_match("", ""));
    }
}

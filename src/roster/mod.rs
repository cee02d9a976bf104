//! Admin roster management (super-admin only)
//!
//! The reserved super-admin account is never listed and can never be the
//! target of an approval change or a deletion.

use std::sync::Arc;

use crate::api::LoanBackend;
use crate::auth::Session;
use crate::error::{ClientError, ClientResult};
use crate::models::{Admin, AdminStatus};

pub struct RosterService<B: LoanBackend + ?Sized> {
    session: Arc<Session>,
    backend: Arc<B>,
    super_admin_email: String,
}

impl<B: LoanBackend + ?Sized> RosterService<B> {
    pub fn new(session: Arc<Session>, backend: Arc<B>, super_admin_email: impl Into<String>) -> Self {
        Self {
            session,
            backend,
            super_admin_email: super_admin_email.into(),
        }
    }

    /// All admins except the reserved account
    pub async fn list(&self) -> ClientResult<Vec<Admin>> {
        self.session.require_super_admin("manage admins")?;

        let admins: Vec<Admin> = self
            .backend
            .list_admins()
            .await?
            .into_iter()
            .filter(|a| !a.is_reserved(&self.super_admin_email))
            .collect();

        tracing::debug!(count = admins.len(), "Loaded admin roster");
        Ok(admins)
    }

    pub async fn set_status(&self, admin: &Admin, status: AdminStatus) -> ClientResult<()> {
        self.guard_target(admin, "change the status of")?;

        self.backend.update_admin_status(&admin.id, status).await?;
        tracing::info!(admin_id = %admin.id, status = status.as_str(), "Admin status updated");
        Ok(())
    }

    pub async fn delete(&self, admin: &Admin) -> ClientResult<()> {
        self.guard_target(admin, "delete")?;

        self.backend.delete_admin(&admin.id).await?;
        tracing::info!(admin_id = %admin.id, "Admin deleted");
        Ok(())
    }

    /// Look an admin up by id or email in the filtered roster
    pub async fn find(&self, key: &str) -> ClientResult<Admin> {
        let key = key.trim();
        self.list()
            .await?
            .into_iter()
            .find(|a| a.id == key || a.email.eq_ignore_ascii_case(key))
            .ok_or_else(|| ClientError::Validation(format!("No admin matches '{}'", key)))
    }

    fn guard_target(&self, admin: &Admin, action: &str) -> ClientResult<()> {
        self.session.require_super_admin("manage admins")?;
        if admin.is_reserved(&self.super_admin_email) {
            return Err(ClientError::Forbidden(format!(
                "Cannot {} the super admin account",
                action
            )));
        }
        Ok(())
    }
}

//! Session context shared by every controller
//!
//! Built once when the console starts and passed explicitly (`Arc<Session>`)
//! to anything that needs the token or the super-admin flag.

use crate::error::{ClientError, ClientResult};
use crate::models::emails_match;

use super::jwt::email_from_token;

/// Authenticated session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    token: Option<String>,
    email: Option<String>,
    is_super_admin: bool,
}

impl Session {
    /// Establish a session from a stored token and an optional stored profile email.
    ///
    /// The stored email wins; otherwise the token payload is decoded. The
    /// super-admin flag is derived here and never recomputed.
    pub fn establish(
        token: Option<String>,
        stored_email: Option<String>,
        super_admin_email: &str,
    ) -> Self {
        let token = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());

        let email = stored_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .or_else(|| {
                token
                    .as_deref()
                    .and_then(|t| match email_from_token(t) {
                        Ok(email) => Some(email),
                        Err(e) => {
                            tracing::debug!(error = %e, "Could not read email from session token");
                            None
                        }
                    })
            });

        let is_super_admin = token.is_some()
            && email
                .as_deref()
                .map(|e| emails_match(e, super_admin_email))
                .unwrap_or(false);

        Self {
            token,
            email,
            is_super_admin,
        }
    }

    /// A session with no credentials
    pub fn anonymous() -> Self {
        Self {
            token: None,
            email: None,
            is_super_admin: false,
        }
    }

    /// Bearer token, or `Unauthenticated` when absent
    pub fn bearer(&self) -> ClientResult<&str> {
        self.token.as_deref().ok_or(ClientError::Unauthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }

    /// Guard for super-admin-only affordances
    pub fn require_super_admin(&self, action: &str) -> ClientResult<()> {
        self.bearer()?;
        if self.is_super_admin {
            Ok(())
        } else {
            Err(ClientError::Forbidden(format!(
                "Only the super admin can {}",
                action
            )))
        }
    }
}

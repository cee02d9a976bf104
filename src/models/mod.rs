//! Data models for the loan console
//!
//! Wire shapes of the loan backend, normalised at the boundary: `id`/`_id`
//! both land in one identifier field, numeric strings become numbers and
//! response envelopes are unwrapped before the rest of the crate sees them.

use serde::{Deserialize, Deserializer, Serialize};

pub mod admin;
pub mod auth;
pub mod loan;

pub use admin::*;
pub use auth::*;
pub use loan::*;

/// Response envelopes used by the backend around the actual payload
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Data { data: T },
    Loan { loan: T },
    History { history: T },
    StatusHistory {
        #[serde(rename = "statusHistory")]
        status_history: T,
    },
    Admins { admins: T },
    User { user: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Data { data } => data,
            Envelope::Loan { loan } => loan,
            Envelope::History { history } => history,
            Envelope::StatusHistory { status_history } => status_history,
            Envelope::Admins { admins } => admins,
            Envelope::User { user } => user,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// Pagination block returned alongside server-paginated loan lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_loans: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Accepts a number, a numeric string, or null
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) if n.is_finite() => Some(n),
        Some(Raw::Text(s)) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite()),
        _ => None,
    })
}

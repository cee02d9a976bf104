//! Remote data client for the loan backend

mod backend;
mod client;
pub mod endpoints;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::{status_update, LoanBackend, LoanListQuery};
pub use client::ApiClient;

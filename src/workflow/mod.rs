//! Loan desk state and the status workflow

mod controller;
mod desk;
mod draft;

pub use controller::{StatusWorkflow, REASON_REQUIRED, UPDATE_IN_PROGRESS};
pub use desk::{LoanDesk, SharedDesk};
pub use draft::StatusChangeDraft;

pub(crate) use desk::{refresh_detail, refresh_page};

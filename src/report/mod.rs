//! Printable loan report
//!
//! Produces a paged plain-text document: fixed sections, `N/A` for anything
//! missing and a footer with generation metadata on every page.

mod builder;
mod document;

pub use builder::{explain_prediction, ReportBuilder};
pub use document::{ReportDocument, PAGE_LINES, PAGE_WIDTH};

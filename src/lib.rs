//! Loan Console Library
//!
//! Admin-side client for the loan application backend: the loan table engine,
//! the status workflow, assignment and roster management, dashboard
//! aggregates and printable reports.

pub mod api;
pub mod assignment;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod models;
pub mod query;
pub mod report;
pub mod roster;
pub mod workflow;

//! Dashboard aggregates and their periodic refresh

mod analytics;
mod poller;
mod risk;

pub use analytics::{
    monthly_summary, performance_score, rate, risk_buckets, status_distribution, top_performers,
    DashboardSummary, MonthlySummary, Performer, RiskBuckets, StatusShare, TOP_PERFORMERS,
};
pub use poller::{fetch_all_loans, DashboardPoller, DashboardSnapshot, RefreshOutcome};
pub use risk::{derive_risk_level, risk_level_for, risk_points, RiskLevel};

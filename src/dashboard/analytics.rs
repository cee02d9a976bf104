//! Pure aggregations over an already fetched loan collection.
//!
//! Missing numbers count as 0 and every rate guards its denominator, so an
//! empty collection yields zeros rather than NaN.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::models::{LoanApplication, LoanStatus};

use super::risk::{derive_risk_level, RiskLevel};

/// Weights of the composite performance score
const PERF_CREDIT_WEIGHT: f64 = 40.0;
const PERF_AMOUNT_WEIGHT: f64 = 30.0;
const PERF_ASSET_WEIGHT: f64 = 30.0;
const PERF_CREDIT_SCALE: f64 = 850.0;
const PERF_AMOUNT_SCALE: f64 = 5_000_000.0;
const PERF_ASSET_SCALE: f64 = 10_000_000.0;

/// Number of rows in the top performers panel
pub const TOP_PERFORMERS: usize = 5;

/// `count / total`, 0 when total is 0
pub fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: LoanStatus,
    pub count: usize,
    /// 0..1 of all loans
    pub share: f64,
}

/// Count and share per status, in `LoanStatus::ALL` order
pub fn status_distribution(loans: &[LoanApplication]) -> Vec<StatusShare> {
    let total = loans.len();
    LoanStatus::ALL
        .iter()
        .map(|status| {
            let count = loans.iter().filter(|l| l.status == *status).count();
            StatusShare {
                status: *status,
                count,
                share: rate(count, total),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskBuckets {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskBuckets {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }

    pub fn share(&self, level: RiskLevel) -> f64 {
        let count = match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        };
        rate(count, self.total())
    }
}

pub fn risk_buckets(loans: &[LoanApplication]) -> RiskBuckets {
    loans
        .iter()
        .fold(RiskBuckets::default(), |mut buckets, loan| {
            match derive_risk_level(loan) {
                RiskLevel::Low => buckets.low += 1,
                RiskLevel::Medium => buckets.medium += 1,
                RiskLevel::High => buckets.high += 1,
            }
            buckets
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub applications: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    /// Sum of approved loan amounts
    pub disbursed: f64,
    pub approval_rate: f64,
    pub rejection_rate: f64,
}

/// Per-month totals, oldest month first. Undated loans are left out.
pub fn monthly_summary(loans: &[LoanApplication]) -> Vec<MonthlySummary> {
    #[derive(Default)]
    struct Acc {
        applications: usize,
        approved: usize,
        rejected: usize,
        pending: usize,
        disbursed: f64,
    }

    let mut months: BTreeMap<(i32, u32), Acc> = BTreeMap::new();
    for loan in loans {
        let Some(date) = loan.application_date else {
            continue;
        };
        let acc = months.entry((date.year(), date.month())).or_default();
        acc.applications += 1;
        match loan.status {
            LoanStatus::Approved => {
                acc.approved += 1;
                acc.disbursed += loan.loan_amount();
            }
            LoanStatus::Rejected => acc.rejected += 1,
            LoanStatus::Pending => acc.pending += 1,
            LoanStatus::NotEligible | LoanStatus::UnderReview => {}
        }
    }

    months
        .into_iter()
        .map(|((year, month), acc)| MonthlySummary {
            month: format!("{:04}-{:02}", year, month),
            applications: acc.applications,
            approved: acc.approved,
            rejected: acc.rejected,
            pending: acc.pending,
            disbursed: acc.disbursed,
            approval_rate: rate(acc.approved, acc.applications),
            rejection_rate: rate(acc.rejected, acc.applications),
        })
        .collect()
}

/// Ranking-only composite; never used for eligibility
pub fn performance_score(loan: &LoanApplication) -> f64 {
    (loan.credit_score() / PERF_CREDIT_SCALE) * PERF_CREDIT_WEIGHT
        + (loan.loan_amount() / PERF_AMOUNT_SCALE) * PERF_AMOUNT_WEIGHT
        + (loan.asset_details.total() / PERF_ASSET_SCALE) * PERF_ASSET_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performer {
    pub loan_id: String,
    pub applicant: String,
    pub status: LoanStatus,
    pub score: f64,
}

/// Highest composite scores first; ties keep collection order
pub fn top_performers(loans: &[LoanApplication], n: usize) -> Vec<Performer> {
    let mut ranked: Vec<Performer> = loans
        .iter()
        .map(|loan| Performer {
            loan_id: loan.id.clone(),
            applicant: loan.applicant_name().to_string(),
            status: loan.status,
            score: performance_score(loan),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(n);
    ranked
}

/// Everything the dashboard panels render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_loans: usize,
    pub status_distribution: Vec<StatusShare>,
    pub approval_rate: f64,
    pub rejection_rate: f64,
    pub total_requested: f64,
    pub average_credit_score: f64,
    pub risk: RiskBuckets,
    pub monthly: Vec<MonthlySummary>,
    pub top_performers: Vec<Performer>,
}

impl DashboardSummary {
    pub fn from_loans(loans: &[LoanApplication]) -> Self {
        let total = loans.len();
        let count = |status: LoanStatus| loans.iter().filter(|l| l.status == status).count();
        let credit_sum: f64 = loans.iter().map(|l| l.credit_score()).sum();

        Self {
            total_loans: total,
            status_distribution: status_distribution(loans),
            approval_rate: rate(count(LoanStatus::Approved), total),
            rejection_rate: rate(count(LoanStatus::Rejected), total),
            total_requested: loans.iter().map(|l| l.loan_amount()).sum(),
            average_credit_score: if total == 0 {
                0.0
            } else {
                credit_sum / total as f64
            },
            risk: risk_buckets(loans),
            monthly: monthly_summary(loans),
            top_performers: top_performers(loans, TOP_PERFORMERS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_loans == 0
    }
}

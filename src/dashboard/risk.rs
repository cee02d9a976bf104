//! Display-side risk bucketing
//!
//! These cut-offs are a dashboard heuristic kept for parity with the web
//! dashboard. Underwriting decisions are made by the backend.

use serde::Serialize;

use crate::models::LoanApplication;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Credit score cut-offs, checked in order, with the points each adds
const CREDIT_SCORE_BANDS: [(f64, u32); 3] = [(600.0, 3), (700.0, 2), (750.0, 1)];

/// Loan-to-income cut-offs (strictly greater than), checked in order
const LOAN_TO_INCOME_BANDS: [(f64, u32); 3] = [(8.0, 3), (6.0, 2), (4.0, 1)];

/// Minimum points for a High bucket
const HIGH_RISK_POINTS: u32 = 4;

/// Minimum points for a Medium bucket
const MEDIUM_RISK_POINTS: u32 = 2;

/// Risk bucket shown on dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_points(points: u32) -> Self {
        if points >= HIGH_RISK_POINTS {
            RiskLevel::High
        } else if points >= MEDIUM_RISK_POINTS {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Parse a server-supplied level; unknown labels are ignored
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" | "moderate" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// Points for a credit score and loan-to-income ratio
pub fn risk_points(credit_score: f64, loan_to_income: f64) -> u32 {
    let credit_points = CREDIT_SCORE_BANDS
        .iter()
        .find(|(cutoff, _)| credit_score < *cutoff)
        .map(|(_, points)| *points)
        .unwrap_or(0);

    let ratio_points = LOAN_TO_INCOME_BANDS
        .iter()
        .find(|(cutoff, _)| loan_to_income > *cutoff)
        .map(|(_, points)| *points)
        .unwrap_or(0);

    credit_points + ratio_points
}

pub fn risk_level_for(credit_score: f64, loan_to_income: f64) -> RiskLevel {
    RiskLevel::from_points(risk_points(credit_score, loan_to_income))
}

/// Server-supplied level when present, otherwise the local rule
pub fn derive_risk_level(loan: &LoanApplication) -> RiskLevel {
    loan.eligibility_details
        .as_ref()
        .and_then(|e| e.risk_level.as_deref())
        .and_then(RiskLevel::parse)
        .unwrap_or_else(|| risk_level_for(loan.credit_score(), loan.loan_to_income_ratio()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EligibilityDetails, LoanStatus};
    use crate::query::test_support::loan;

    #[test]
    fn test_reference_cases() {
        assert_eq!(risk_points(580.0, 9.0), 6);
        assert_eq!(risk_level_for(580.0, 9.0), RiskLevel::High);

        assert_eq!(risk_points(720.0, 5.0), 2);
        assert_eq!(risk_level_for(720.0, 5.0), RiskLevel::Medium);

        assert_eq!(risk_points(800.0, 2.0), 0);
        assert_eq!(risk_level_for(800.0, 2.0), RiskLevel::Low);
    }

    #[test]
    fn test_band_edges() {
        // Boundaries are exclusive: 600 is not < 600, 8 is not > 8
        assert_eq!(risk_points(600.0, 8.0), 2 + 2);
        assert_eq!(risk_points(750.0, 4.0), 0);
        assert_eq!(risk_points(749.0, 4.01), 2);
        assert_eq!(risk_level_for(699.0, 0.0), RiskLevel::Medium);
        assert_eq!(risk_level_for(749.0, 0.0), RiskLevel::Low);
    }

    #[test]
    fn test_server_level_wins() {
        let mut l = loan("1", "A", LoanStatus::Pending);
        l.financial_details.cibil_score = Some(820.0);
        assert_eq!(derive_risk_level(&l), RiskLevel::Low);

        l.eligibility_details = Some(EligibilityDetails {
            risk_level: Some("HIGH".to_string()),
            ..EligibilityDetails::default()
        });
        assert_eq!(derive_risk_level(&l), RiskLevel::High);
    }

    #[test]
    fn test_missing_inputs_count_as_zero() {
        // No credit score => 0 < 600 => 3 points, no income => ratio 0
        let l = loan("1", "A", LoanStatus::Pending);
        assert_eq!(derive_risk_level(&l), RiskLevel::Medium);
    }
}

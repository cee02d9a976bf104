//! Loan application models

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{lenient_f64, Pagination};

/// Loan application status, mirrored from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
    NotEligible,
    UnderReview,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 5] = [
        LoanStatus::Pending,
        LoanStatus::Approved,
        LoanStatus::Rejected,
        LoanStatus::NotEligible,
        LoanStatus::UnderReview,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "Pending",
            LoanStatus::Approved => "Approved",
            LoanStatus::Rejected => "Rejected",
            LoanStatus::NotEligible => "Not Eligible",
            LoanStatus::UnderReview => "Under Review",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "pending" => Ok(LoanStatus::Pending),
            "approved" => Ok(LoanStatus::Approved),
            "rejected" => Ok(LoanStatus::Rejected),
            "noteligible" => Ok(LoanStatus::NotEligible),
            "underreview" => Ok(LoanStatus::UnderReview),
            _ => Err(format!(
                "Invalid status '{}'. Expected one of: Pending, Approved, Rejected, Not Eligible, Under Review",
                s
            )),
        }
    }
}

impl Serialize for LoanStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LoanStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Applicant personal information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    #[serde(default, alias = "fullName", alias = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "phoneNumber", alias = "phone_number")]
    pub phone: Option<String>,
    #[serde(default, alias = "dateOfBirth", alias = "dob")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "maritalStatus")]
    pub marital_status: Option<String>,
    #[serde(default, alias = "panNumber")]
    pub pan_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "pinCode")]
    pub pincode: Option<String>,
}

/// Applicant family information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyDetails {
    #[serde(default, alias = "fatherName")]
    pub father_name: Option<String>,
    #[serde(default, alias = "motherName")]
    pub mother_name: Option<String>,
    #[serde(default, alias = "spouseName")]
    pub spouse_name: Option<String>,
    #[serde(default, alias = "noOfDependents", alias = "no_of_dependents", deserialize_with = "lenient_f64")]
    pub dependents: Option<f64>,
    #[serde(default, alias = "familyIncome", deserialize_with = "lenient_f64")]
    pub family_income: Option<f64>,
}

/// Applicant financial information and the loan request itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialDetails {
    #[serde(default, alias = "employmentType", alias = "self_employed")]
    pub employment_type: Option<String>,
    #[serde(default, alias = "employerName")]
    pub employer_name: Option<String>,
    #[serde(default, alias = "annualIncome", alias = "income_annum", deserialize_with = "lenient_f64")]
    pub annual_income: Option<f64>,
    #[serde(default, alias = "loanAmount", deserialize_with = "lenient_f64")]
    pub loan_amount: Option<f64>,
    #[serde(default, alias = "loanTerm", deserialize_with = "lenient_f64")]
    pub loan_term: Option<f64>,
    #[serde(default, alias = "loanPurpose")]
    pub loan_purpose: Option<String>,
    #[serde(default, alias = "cibilScore", alias = "credit_score", alias = "creditScore", deserialize_with = "lenient_f64")]
    pub cibil_score: Option<f64>,
    #[serde(default, alias = "existingEmis", deserialize_with = "lenient_f64")]
    pub existing_emis: Option<f64>,
    #[serde(default, alias = "bankName")]
    pub bank_name: Option<String>,
}

/// The four asset categories captured on the application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetDetails {
    #[serde(default, alias = "residentialAssetsValue", deserialize_with = "lenient_f64")]
    pub residential_assets_value: Option<f64>,
    #[serde(default, alias = "commercialAssetsValue", deserialize_with = "lenient_f64")]
    pub commercial_assets_value: Option<f64>,
    #[serde(default, alias = "luxuryAssetsValue", deserialize_with = "lenient_f64")]
    pub luxury_assets_value: Option<f64>,
    #[serde(default, alias = "bankAssetValue", alias = "bank_assets_value", deserialize_with = "lenient_f64")]
    pub bank_asset_value: Option<f64>,
}

impl AssetDetails {
    /// Sum of the four categories, missing values counted as 0
    pub fn total(&self) -> f64 {
        [
            self.residential_assets_value,
            self.commercial_assets_value,
            self.luxury_assets_value,
            self.bank_asset_value,
        ]
        .iter()
        .map(|v| v.unwrap_or(0.0))
        .sum()
    }
}

/// Backend ML prediction bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EligibilityDetails {
    #[serde(default, alias = "mlPrediction")]
    pub ml_prediction: Option<String>,
    /// 0..1
    #[serde(default, alias = "confidenceScore", deserialize_with = "lenient_f64")]
    pub confidence_score: Option<f64>,
    #[serde(default, alias = "predictionTimestamp")]
    pub prediction_timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "modelVersion")]
    pub model_version: Option<String>,
    #[serde(default, alias = "riskLevel")]
    pub risk_level: Option<String>,
    #[serde(default, alias = "manualOverride")]
    pub manual_override: bool,
    #[serde(default, alias = "adminNotes")]
    pub admin_notes: Option<String>,
}

/// Admin a loan is assigned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedAdmin {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Loan application record (server-owned, cached client-side)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    #[serde(alias = "_id")]
    pub id: String,
    pub status: LoanStatus,
    #[serde(default, alias = "personalDetails")]
    pub personal_details: PersonalDetails,
    #[serde(default, alias = "familyDetails")]
    pub family_details: FamilyDetails,
    #[serde(default, alias = "financialDetails")]
    pub financial_details: FinancialDetails,
    #[serde(default, alias = "assetDetails")]
    pub asset_details: AssetDetails,
    #[serde(default, alias = "eligibilityDetails")]
    pub eligibility_details: Option<EligibilityDetails>,
    #[serde(default, alias = "assignedAdmin", alias = "assigned_to")]
    pub assigned_admin: Option<AssignedAdmin>,
    #[serde(default, alias = "applicationDate")]
    pub application_date: Option<DateTime<Utc>>,
}

impl LoanApplication {
    /// Applicant display name; empty when unknown
    pub fn applicant_name(&self) -> &str {
        self.personal_details.full_name.as_deref().unwrap_or("")
    }

    pub fn loan_amount(&self) -> f64 {
        self.financial_details.loan_amount.unwrap_or(0.0)
    }

    pub fn credit_score(&self) -> f64 {
        self.financial_details.cibil_score.unwrap_or(0.0)
    }

    pub fn annual_income(&self) -> f64 {
        self.financial_details.annual_income.unwrap_or(0.0)
    }

    /// Loan amount divided by annual income, 0 when income is unknown
    pub fn loan_to_income_ratio(&self) -> f64 {
        let income = self.annual_income();
        if income > 0.0 {
            self.loan_amount() / income
        } else {
            0.0
        }
    }
}

/// One status change on a loan; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: LoanStatus,
    pub reason: String,
    #[serde(
        default,
        alias = "adminName",
        alias = "admin_name",
        alias = "updatedBy",
        alias = "changedBy"
    )]
    pub updated_by: Option<String>,
    #[serde(alias = "changedAt", alias = "changed_at")]
    pub timestamp: DateTime<Utc>,
}

/// Body of `PUT /api/loans/admin/{id}/status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateRequest {
    pub status: LoanStatus,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of `PUT /api/loans/admin/{id}/assign`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub admin_id: Option<String>,
}

/// One server page of loans
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPage {
    #[serde(default)]
    pub loans: Vec<LoanApplication>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default, alias = "is_super_admin")]
    pub is_super_admin: bool,
}

/// ML outcome of a re-evaluation request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reevaluation {
    pub ml_prediction: MlPrediction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MlPrediction {
    pub eligibility_status: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
}

/// Body of `POST /api/loans/apply`
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoanApplicationRequest {
    pub personal_details: PersonalDetails,
    pub family_details: FamilyDetails,
    pub financial_details: FinancialDetails,
    pub asset_details: AssetDetails,
}

/// Server-computed headline numbers for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanStatistics {
    #[serde(default, alias = "total_loans", alias = "total")]
    pub total_loans: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub approved: u64,
    #[serde(default)]
    pub rejected: u64,
    #[serde(default, alias = "not_eligible")]
    pub not_eligible: u64,
    #[serde(default, alias = "under_review")]
    pub under_review: u64,
    #[serde(default, alias = "total_amount", deserialize_with = "lenient_f64")]
    pub total_amount: Option<f64>,
}

/// Server-computed analytics for the admin dashboard.
///
/// The payload shape varies between backend versions, so only the flat
/// numeric metrics (numbers or numeric strings) are kept, keyed as sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanAnalytics {
    pub metrics: BTreeMap<String, f64>,
}

impl LoanAnalytics {
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl<'de> Deserialize<'de> for LoanAnalytics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let metrics = raw
            .into_iter()
            .filter_map(|(key, value)| {
                let number = match &value {
                    serde_json::Value::Number(n) => n.as_f64(),
                    serde_json::Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                };
                number.map(|n| (key, n))
            })
            .collect();
        Ok(Self { metrics })
    }
}

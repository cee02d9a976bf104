//! Single-key sorting with the dashboard's direction toggle

use std::cmp::Ordering;

use crate::models::LoanApplication;

/// Sortable loan columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    ApplicantName,
    ApplicationDate,
    LoanAmount,
    CreditScore,
    AnnualIncome,
    Status,
}

impl SortField {
    /// Name sent to the backend as `sortBy`
    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::ApplicantName => "name",
            SortField::ApplicationDate => "applicationDate",
            SortField::LoanAmount => "loanAmount",
            SortField::CreditScore => "cibilScore",
            SortField::AnnualIncome => "annualIncome",
            SortField::Status => "status",
        }
    }

    fn compare(&self, a: &LoanApplication, b: &LoanApplication) -> Ordering {
        match self {
            SortField::ApplicantName => a
                .applicant_name()
                .to_lowercase()
                .cmp(&b.applicant_name().to_lowercase()),
            SortField::ApplicationDate => a.application_date.cmp(&b.application_date),
            SortField::LoanAmount => a.loan_amount().total_cmp(&b.loan_amount()),
            SortField::CreditScore => a.credit_score().total_cmp(&b.credit_score()),
            SortField::AnnualIncome => a.annual_income().total_cmp(&b.annual_income()),
            SortField::Status => a
                .status
                .as_str()
                .to_lowercase()
                .cmp(&b.status.as_str().to_lowercase()),
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "name" | "applicantname" => Ok(SortField::ApplicantName),
            "date" | "applicationdate" => Ok(SortField::ApplicationDate),
            "amount" | "loanamount" => Ok(SortField::LoanAmount),
            "score" | "creditscore" | "cibilscore" => Ok(SortField::CreditScore),
            "income" | "annualincome" => Ok(SortField::AnnualIncome),
            "status" => Ok(SortField::Status),
            _ => Err(format!("Unknown sort field '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Exactly one active sort key and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::ApplicationDate,
            direction: SortDirection::Descending,
        }
    }
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Column header click: same key flips, a new key starts descending
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Descending;
        }
    }

    /// Stable sort in place
    pub fn sort(&self, loans: &mut [LoanApplication]) {
        loans.sort_by(|a, b| {
            let ord = self.field.compare(a, b);
            match self.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }
}

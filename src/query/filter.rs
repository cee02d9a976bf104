//! Filter predicates for loan tables

use chrono::{DateTime, Utc};

use crate::models::{LoanApplication, LoanStatus};

/// Shortest search text that actually filters
pub const MIN_SEARCH_CHARS: usize = 2;

/// Status dropdown value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(LoanStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: LoanStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }

    pub fn status(&self) -> Option<LoanStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") || s.trim().is_empty() {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// Inclusive bounds; an absent side is open
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Default for Range<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// All filter inputs of a loan table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub status: StatusFilter,
    pub search: String,
    pub application_date: Range<DateTime<Utc>>,
    pub loan_amount: Range<f64>,
    pub credit_score: Range<f64>,
    pub annual_income: Range<f64>,
}

impl FilterCriteria {
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Whether any date or numeric range is set
    pub fn has_ranges(&self) -> bool {
        self.application_date.is_active()
            || self.loan_amount.is_active()
            || self.credit_score.is_active()
            || self.annual_income.is_active()
    }

    /// Lower-cased search text, or None when it is too short to filter
    pub fn effective_search(&self) -> Option<String> {
        let trimmed = self.search.trim();
        if trimmed.chars().count() >= MIN_SEARCH_CHARS {
            Some(trimmed.to_lowercase())
        } else {
            None
        }
    }

    /// A row is visible iff every active predicate holds
    pub fn matches(&self, loan: &LoanApplication) -> bool {
        if !self.status.matches(loan.status) {
            return false;
        }

        if let Some(needle) = self.effective_search() {
            if !loan.applicant_name().to_lowercase().contains(&needle) {
                return false;
            }
        }

        if self.application_date.is_active() {
            match loan.application_date {
                Some(date) if self.application_date.contains(date) => {}
                _ => return false,
            }
        }

        self.loan_amount.contains(loan.loan_amount())
            && self.credit_score.contains(loan.credit_score())
            && self.annual_income.contains(loan.annual_income())
    }
}

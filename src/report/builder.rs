//! Section layout of the loan report

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::assignment::UNASSIGNED;
use crate::error::{ClientError, ClientResult};
use crate::format::{self, NA};
use crate::models::{EligibilityDetails, LoanApplication, StatusHistoryEntry};

use super::document::{ReportDocument, PAGE_WIDTH};

/// Label column width for `label : value` rows
const LABEL_WIDTH: usize = 22;

pub struct ReportBuilder {
    history_limit: usize,
    generated_at: Option<DateTime<Utc>>,
    report_id: Option<Uuid>,
}

impl ReportBuilder {
    pub fn new(history_limit: usize) -> Self {
        Self {
            history_limit,
            generated_at: None,
            report_id: None,
        }
    }

    /// Pin the generation time instead of using the clock
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn report_id(mut self, id: Uuid) -> Self {
        self.report_id = Some(id);
        self
    }

    pub fn build(&self, loan: &LoanApplication, history: &[StatusHistoryEntry]) -> ReportDocument {
        let generated_at = self.generated_at.unwrap_or_else(Utc::now);
        let report_id = self.report_id.unwrap_or_else(Uuid::new_v4);

        let mut sections = vec![
            header(loan),
            status_banner(loan),
            personal_section(loan),
            family_section(loan),
            financial_section(loan),
            asset_section(loan),
        ];
        if let Some(eligibility) = loan.eligibility_details.as_ref() {
            sections.push(ml_section(eligibility));
        }
        sections.push(history_section(history, self.history_limit));

        ReportDocument::paginate(report_id, &loan.id, generated_at, sections)
    }

    /// Build and write the report for a loaded loan
    pub fn export(
        &self,
        loan: Option<&LoanApplication>,
        history: &[StatusHistoryEntry],
        dir: &Path,
    ) -> ClientResult<PathBuf> {
        let loan = loan.ok_or_else(|| ClientError::NotLoaded("Loan detail".to_string()))?;
        self.build(loan, history).write_to(dir)
    }
}

// ============================================================================
// Sections
// ============================================================================

fn rule(c: char) -> String {
    c.to_string().repeat(PAGE_WIDTH)
}

fn centered(text: &str) -> String {
    format!("{:^width$}", text, width = PAGE_WIDTH).trim_end().to_string()
}

fn row(label: &str, value: impl AsRef<str>) -> String {
    format!("{:<width$}: {}", label, value.as_ref(), width = LABEL_WIDTH)
}

fn heading(title: &str) -> Vec<String> {
    vec![String::new(), title.to_uppercase(), rule('-')]
}

/// Greedy word wrap
fn wrap(text: &str, width: usize, indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::from(indent);
    for word in text.split_whitespace() {
        if current.len() > indent.len() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::replace(&mut current, String::from(indent)));
        }
        if current.len() > indent.len() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if current.len() > indent.len() {
        lines.push(current);
    }
    lines
}

fn header(loan: &LoanApplication) -> Vec<String> {
    vec![
        rule('='),
        centered("LOAN APPLICATION REPORT"),
        centered("Loan Management System | Admin Console"),
        rule('='),
        row("Application ID", &loan.id),
        row("Applicant", format::or_na(loan.personal_details.full_name.as_deref())),
        row("Application Date", format::date(loan.application_date)),
    ]
}

fn status_banner(loan: &LoanApplication) -> Vec<String> {
    let assignee = loan
        .assigned_admin
        .as_ref()
        .map(|a| a.name.clone().unwrap_or_else(|| a.id.clone()))
        .unwrap_or_else(|| UNASSIGNED.to_string());

    vec![
        String::new(),
        rule('*'),
        centered(&format!("CURRENT STATUS: {}", format::status_badge(loan.status))),
        rule('*'),
        row("Assigned To", assignee),
    ]
}

fn personal_section(loan: &LoanApplication) -> Vec<String> {
    let p = &loan.personal_details;
    let mut lines = heading("Personal Information");
    lines.extend([
        row("Full Name", format::or_na(p.full_name.as_deref())),
        row("Email", format::or_na(p.email.as_deref())),
        row("Phone", format::or_na(p.phone.as_deref())),
        row("Date of Birth", format::or_na(p.date_of_birth.as_deref())),
        row("Gender", format::or_na(p.gender.as_deref())),
        row("Marital Status", format::or_na(p.marital_status.as_deref())),
        row("PAN Number", format::or_na(p.pan_number.as_deref())),
        row("Address", format::or_na(p.address.as_deref())),
        row("City", format::or_na(p.city.as_deref())),
        row("State", format::or_na(p.state.as_deref())),
        row("Pincode", format::or_na(p.pincode.as_deref())),
    ]);
    lines
}

fn family_section(loan: &LoanApplication) -> Vec<String> {
    let f = &loan.family_details;
    let mut lines = heading("Family Information");
    lines.extend([
        row("Father's Name", format::or_na(f.father_name.as_deref())),
        row("Mother's Name", format::or_na(f.mother_name.as_deref())),
        row("Spouse Name", format::or_na(f.spouse_name.as_deref())),
        row("Dependents", format::number(f.dependents)),
        row("Family Income", format::money(f.family_income)),
    ]);
    lines
}

fn financial_section(loan: &LoanApplication) -> Vec<String> {
    let f = &loan.financial_details;
    let ratio = f
        .annual_income
        .filter(|income| *income > 0.0)
        .map(|_| format!("{:.2}x", loan.loan_to_income_ratio()))
        .unwrap_or_else(|| NA.to_string());
    let term = f
        .loan_term
        .map(|t| format!("{} months", format::number(Some(t))))
        .unwrap_or_else(|| NA.to_string());

    let mut lines = heading("Financial Information");
    lines.extend([
        row("Employment Type", format::or_na(f.employment_type.as_deref())),
        row("Employer", format::or_na(f.employer_name.as_deref())),
        row("Annual Income", format::money(f.annual_income)),
        row("Loan Amount", format::money(f.loan_amount)),
        row("Loan Term", term),
        row("Loan Purpose", format::or_na(f.loan_purpose.as_deref())),
        row("CIBIL Score", format::number(f.cibil_score)),
        row("Existing EMIs", format::money(f.existing_emis)),
        row("Bank Name", format::or_na(f.bank_name.as_deref())),
        row("Loan to Income", ratio),
    ]);
    lines
}

fn asset_section(loan: &LoanApplication) -> Vec<String> {
    let a = &loan.asset_details;
    let mut lines = heading("Asset Information");
    lines.extend([
        row("Residential Assets", format::money(a.residential_assets_value)),
        row("Commercial Assets", format::money(a.commercial_assets_value)),
        row("Luxury Assets", format::money(a.luxury_assets_value)),
        row("Bank Assets", format::money(a.bank_asset_value)),
        row("Total Assets", format::money(Some(a.total()))),
    ]);
    lines
}

/// Plain-language reading of the model output
pub fn explain_prediction(eligibility: &EligibilityDetails) -> String {
    let Some(prediction) = eligibility
        .ml_prediction
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    else {
        return "No model prediction is available for this application.".to_string();
    };

    let mut text = match eligibility.confidence_score {
        Some(confidence) => {
            let qualifier = if confidence >= 0.8 {
                "This is a high-confidence prediction."
            } else if confidence >= 0.6 {
                "This is a moderate-confidence prediction; supporting documents should be reviewed."
            } else {
                "Confidence is low; a manual review is recommended before deciding."
            };
            format!(
                "The eligibility model classified this application as '{}' with {} confidence. {}",
                prediction,
                format::percent(confidence),
                qualifier
            )
        }
        None => format!(
            "The eligibility model classified this application as '{}'. No confidence score was reported.",
            prediction
        ),
    };

    if eligibility.manual_override {
        text.push_str(" The prediction has been manually overridden by an administrator.");
    }
    text
}

fn ml_section(eligibility: &EligibilityDetails) -> Vec<String> {
    let confidence = eligibility
        .confidence_score
        .map(format::percent)
        .unwrap_or_else(|| NA.to_string());

    let mut lines = heading("ML Prediction Analysis");
    lines.extend([
        row("Prediction", format::or_na(eligibility.ml_prediction.as_deref())),
        row("Confidence", confidence),
        row("Risk Level", format::or_na(eligibility.risk_level.as_deref())),
        row("Model Version", format::or_na(eligibility.model_version.as_deref())),
        row("Predicted On", format::datetime(eligibility.prediction_timestamp)),
        row("Manual Override", format::yes_no(eligibility.manual_override)),
        row("Admin Notes", format::or_na(eligibility.admin_notes.as_deref())),
        String::new(),
        "Explanation:".to_string(),
    ]);
    lines.extend(wrap(&explain_prediction(eligibility), PAGE_WIDTH, "  "));
    lines
}

fn history_section(history: &[StatusHistoryEntry], limit: usize) -> Vec<String> {
    let mut lines = heading("Status History");
    if history.is_empty() {
        lines.push("No status changes recorded.".to_string());
        return lines;
    }

    let mut entries: Vec<&StatusHistoryEntry> = history.iter().collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    for entry in entries.iter().take(limit) {
        lines.push(format!(
            "{} | {} | by {}",
            format::datetime(Some(entry.timestamp)),
            format::status_badge(entry.status),
            format::or_na(entry.updated_by.as_deref())
        ));
        lines.extend(wrap(&format!("Reason: {}", entry.reason), PAGE_WIDTH, "  "));
    }
    if entries.len() > limit {
        lines.push(format!("(showing {} of {} entries)", limit, entries.len()));
    }
    lines
}

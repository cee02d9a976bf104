//! Display defaults shared by the report and the terminal views.
//!
//! Anything missing renders as `N/A` so table columns and report sections keep
//! their layout.

use chrono::{DateTime, Utc};

use crate::models::LoanStatus;

pub const NA: &str = "N/A";

/// Text value or `N/A` when absent or blank
pub fn or_na(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NA.to_string(),
    }
}

/// Plain number without trailing zeros, or `N/A`
pub fn number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if v.fract() == 0.0 {
                format!("{}", v as i64)
            } else {
                format!("{:.2}", v)
            }
        }
        _ => NA.to_string(),
    }
}

/// Rupee amount with Indian digit grouping, e.g. `Rs. 12,34,567`
pub fn money(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("Rs. {}", group_indian(v.round() as i64)),
        _ => NA.to_string(),
    }
}

fn group_indian(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let sign = if n < 0 { "-" } else { "" };
    if digits.len() <= 3 {
        return format!("{}{}", sign, digits);
    }

    let (head, last3) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();

    format!("{}{},{}", sign, groups.join(","), last3)
}

/// Ratio (0..1) as a percentage with one decimal
pub fn percent(ratio: f64) -> String {
    if ratio.is_finite() {
        format!("{:.1}%", ratio * 100.0)
    } else {
        "0.0%".to_string()
    }
}

pub fn date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| NA.to_string())
}

pub fn datetime(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%d %b %Y %H:%M UTC").to_string())
        .unwrap_or_else(|| NA.to_string())
}

/// Bracketed badge used in tables, e.g. `[APPROVED]`
pub fn status_badge(status: LoanStatus) -> String {
    format!("[{}]", status.as_str().to_uppercase())
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

//! Dashboard refresh and report export against the fake backend

mod common;

use std::sync::Arc;
use std::time::Duration;

use loan_console::api::LoanBackend;
use loan_console::dashboard::{derive_risk_level, DashboardPoller, RefreshOutcome, RiskLevel};
use loan_console::models::LoanStatus;
use loan_console::report::ReportBuilder;
use loan_console::workflow::{LoanDesk, StatusWorkflow};

use common::{admin_session, client, loan_json, spawn, FakeState};

#[tokio::test]
async fn test_dashboard_refresh_combines_all_sources() {
    let state = FakeState::with_loans(vec![
        loan_json("L1", "Sanjana", "Approved"),
        loan_json("L2", "Kumar", "Rejected"),
        loan_json("L3", "Sanath", "Pending"),
        loan_json("L4", "Deepa", "Approved"),
    ]);
    let base = spawn(state).await;
    let poller = DashboardPoller::new(
        Arc::new(client(&base, admin_session("kiran@loanapp.com"))),
        Duration::from_secs(300),
    );

    assert_eq!(poller.refresh().await.unwrap(), RefreshOutcome::Refreshed);

    let snapshot = poller.latest().unwrap();
    assert_eq!(snapshot.statistics.as_ref().unwrap().total_loans, 4);
    assert_eq!(snapshot.analytics.as_ref().unwrap().metric("approvalRate"), Some(50.0));
    assert_eq!(snapshot.summary.total_loans, 4);
    assert!((snapshot.summary.approval_rate - 0.5).abs() < 1e-9);
    assert!((snapshot.summary.rejection_rate - 0.25).abs() < 1e-9);
    assert_eq!(snapshot.summary.monthly.len(), 1);
    assert_eq!(snapshot.summary.monthly[0].month, "2024-03");
}

#[tokio::test]
async fn test_fetched_loan_risk_is_derived() {
    let mut risky = loan_json("L1", "Sanjana", "Pending");
    risky["financial_details"]["cibil_score"] = 580.into();
    risky["financial_details"]["annual_income"] = 100_000.into();
    risky["financial_details"]["loan_amount"] = 900_000.into();

    let state = FakeState::with_loans(vec![risky]);
    let base = spawn(state).await;
    let loan = client(&base, admin_session("kiran@loanapp.com"))
        .get_loan("L1")
        .await
        .unwrap();

    assert_eq!(derive_risk_level(&loan), RiskLevel::High);
}

#[tokio::test]
async fn test_report_after_status_change() {
    let state = FakeState::with_loans(vec![loan_json("L1", "Sanjana Rao", "Pending")]);
    let base = spawn(state).await;
    let workflow = StatusWorkflow::new(
        admin_session("kiran@loanapp.com"),
        Arc::new(client(&base, admin_session("kiran@loanapp.com"))),
        LoanDesk::new(10).shared(),
    );

    workflow.open_loan("L1").await.unwrap();
    workflow
        .transition("L1", LoanStatus::Approved, "income verified")
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let desk = workflow.desk().read().await;
    let path = ReportBuilder::new(10)
        .export(desk.detail.as_ref(), &desk.history, dir.path())
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(path.ends_with("loan-report-L1.txt"));
    assert!(text.contains("Sanjana Rao"));
    assert!(text.contains("income verified"));
    assert!(text.contains("Page 1 of"));
    assert!(!text.contains("Explanation:"));
}

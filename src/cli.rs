//! Command line definition and dispatch.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;

use loan_console::api::{ApiClient, LoanBackend};
use loan_console::assignment::{assignee_label, AssignmentController};
use loan_console::auth::{Session, SessionStore};
use loan_console::config::Config;
use loan_console::dashboard::{DashboardPoller, DashboardSnapshot, RiskLevel};
use loan_console::error::ClientError;
use loan_console::format;
use loan_console::models::{Admin, AdminStatus, LoanApplication, LoanStatus, StatusHistoryEntry};
use loan_console::query::{
    FilterCriteria, LoanView, PageSpec, SortDirection, SortField, SortSpec, StatusFilter,
};
use loan_console::report::ReportBuilder;
use loan_console::roster::RosterService;
use loan_console::workflow::{LoanDesk, StatusWorkflow};

/// Loan Console: admin tooling for the loan application backend.
#[derive(Debug, Parser)]
#[command(name = "loan-console", author, version, about, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Log in and remember the session token.
    Login(LoginArgs),
    /// Forget the session token.
    Logout,
    /// Show the logged-in profile.
    Profile,
    /// List loan applications.
    Loans(LoansArgs),
    /// Show one loan with its status history.
    Show(LoanRef),
    /// Change a loan's status.
    SetStatus(SetStatusArgs),
    /// Assign a loan to an admin, or clear the assignment.
    Assign(AssignArgs),
    /// Re-run the eligibility model for a loan.
    Reevaluate(LoanRef),
    /// Dashboard aggregates.
    Dashboard(DashboardArgs),
    /// Admin roster management.
    Admins(AdminsArgs),
    /// Export a printable loan report.
    Export(LoanRef),
}

#[derive(Debug, Clone, Args)]
struct LoginArgs {
    /// Account email; defaults to the last remembered username.
    #[arg(long)]
    email: Option<String>,
    /// Password; read from stdin when omitted.
    #[arg(long)]
    password: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct LoansArgs {
    /// Status filter ("all", "Pending", "Under Review", ...).
    #[arg(long, default_value = "all")]
    status: StatusFilter,
    /// Applicant name search (at least 2 characters).
    #[arg(long, default_value = "")]
    search: String,
    /// Sort column: name, date, amount, score, income, status.
    #[arg(long)]
    sort: Option<SortField>,
    /// Sort descending.
    #[arg(long)]
    desc: bool,
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Rows per page; defaults to PAGE_SIZE.
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Debug, Clone, Args)]
struct LoanRef {
    /// Loan id; defaults to the most recently opened loan.
    id: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct SetStatusArgs {
    id: String,
    /// Target status.
    status: LoanStatus,
    /// Reason recorded in the status history.
    #[arg(long, default_value = "")]
    reason: String,
}

#[derive(Debug, Clone, Args)]
struct AssignArgs {
    id: String,
    /// Admin id; omit to unassign.
    #[arg(long)]
    admin: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct DashboardArgs {
    /// Keep refreshing until interrupted.
    #[arg(long)]
    watch: bool,
}

#[derive(Debug, Clone, Args)]
struct AdminsArgs {
    #[command(subcommand)]
    action: Option<AdminAction>,
}

#[derive(Debug, Clone, Subcommand)]
enum AdminAction {
    /// List admins (default).
    List,
    /// Approve an admin by id or email.
    Approve { admin: String },
    /// Reject an admin by id or email.
    Reject { admin: String },
    /// Delete an admin by id or email.
    Delete { admin: String },
}

/// Everything a command needs, built once per invocation
struct Console {
    config: Config,
    store: SessionStore,
    session: Arc<Session>,
    client: Arc<ApiClient>,
}

impl Console {
    fn new(config: Config) -> Self {
        let store = SessionStore::new(&config.session_file);
        let session = Arc::new(store.session(&config.super_admin_email));
        let client = Arc::new(ApiClient::new(&config, session.clone()));
        Self {
            config,
            store,
            session,
            client,
        }
    }

    fn desk(&self) -> LoanDesk {
        LoanDesk::new(self.config.page_size)
    }

    fn workflow(&self, desk: LoanDesk) -> StatusWorkflow<ApiClient> {
        StatusWorkflow::new(self.session.clone(), self.client.clone(), desk.shared())
    }

    fn loan_id(&self, loan: &LoanRef) -> Result<String, ClientError> {
        loan.id
            .clone()
            .or_else(|| self.store.load().last_loan_id)
            .ok_or_else(|| ClientError::NotLoaded("Loan".to_string()))
    }
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let console = Console::new(config);

    match cli.command {
        Command::Login(args) => login(&console, args).await,
        Command::Logout => {
            console.store.clear()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Profile => {
            let profile = console.client.profile().await?;
            println!("{}", format::or_na(profile.name.as_deref()));
            println!("{}", format::or_na(profile.email.as_deref()));
            if console.session.is_super_admin() {
                println!("Super admin");
            }
            Ok(())
        }
        Command::Loans(args) => loans(&console, args).await,
        Command::Show(loan) => show(&console, &console.loan_id(&loan)?).await,
        Command::SetStatus(args) => set_status(&console, args).await,
        Command::Assign(args) => {
            let controller = AssignmentController::new(
                console.session.clone(),
                console.client.clone(),
                console.desk().shared(),
            );
            controller.assign(&args.id, args.admin.as_deref()).await?;
            match args.admin {
                Some(admin) => println!("Loan {} assigned to {}.", args.id, admin),
                None => println!("Loan {} unassigned.", args.id),
            }
            Ok(())
        }
        Command::Reevaluate(loan) => {
            let id = console.loan_id(&loan)?;
            let outcome = console.workflow(console.desk()).reevaluate(&id).await?;
            let confidence = outcome
                .ml_prediction
                .confidence
                .map(format::percent)
                .unwrap_or_else(|| format::NA.to_string());
            println!(
                "Model prediction: {} (confidence {})",
                outcome.ml_prediction.eligibility_status, confidence
            );
            Ok(())
        }
        Command::Dashboard(args) => dashboard(&console, args).await,
        Command::Admins(args) => admins(&console, args.action.unwrap_or(AdminAction::List)).await,
        Command::Export(loan) => export(&console, &console.loan_id(&loan)?).await,
    }
}

async fn login(console: &Console, args: LoginArgs) -> anyhow::Result<()> {
    let email = match args.email.or_else(|| console.store.load().remembered_username) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };

    let anonymous = console.client.with_session(Arc::new(Session::anonymous()));
    let response = anonymous.login(&email, &password).await?;
    let profile_email = response
        .user
        .as_ref()
        .and_then(|u| u.email.clone())
        .unwrap_or(email);
    console.store.store_login(&response.token, Some(&profile_email))?;

    let session = Session::establish(
        Some(response.token),
        Some(profile_email.clone()),
        &console.config.super_admin_email,
    );
    tracing::info!(email = %profile_email, super_admin = session.is_super_admin(), "Logged in");
    println!("Logged in as {}.", profile_email);
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

async fn loans(console: &Console, args: LoansArgs) -> anyhow::Result<()> {
    let mut desk = console.desk();
    desk.criteria = FilterCriteria::default()
        .with_status(args.status)
        .with_search(args.search);
    if let Some(field) = args.sort {
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        desk.sort = SortSpec::new(field, direction);
    }
    desk.page = PageSpec::new(args.page, args.limit.unwrap_or(console.config.page_size));

    let view = console.workflow(desk).load_page().await?;

    let roster = AssignmentController::new(
        console.session.clone(),
        console.client.clone(),
        console.desk().shared(),
    )
    .load_roster()
    .await;

    print_view(&view, roster.as_deref());
    Ok(())
}

fn print_view(view: &LoanView, roster: Option<&[Admin]>) {
    if let Some(message) = view.empty_message() {
        println!("{}", message);
        return;
    }

    for loan in &view.rows {
        let mut line = format!(
            "{:<26} {:<24} {:>16} {:>6}  {:<16} {}",
            loan.id,
            format::or_na(Some(loan.applicant_name())),
            format::money(loan.financial_details.loan_amount),
            format::number(loan.financial_details.cibil_score),
            format::status_badge(loan.status),
            format::date(loan.application_date),
        );
        if let Some(roster) = roster {
            line.push_str(&format!("  {}", assignee_label(loan, roster)));
        }
        println!("{}", line);
    }

    let info = view.page_info;
    println!(
        "Page {} of {} ({} loans){}{}",
        info.current_page,
        info.total_pages,
        info.total_loans,
        if info.has_prev { "  [prev]" } else { "" },
        if info.has_next { "  [next]" } else { "" },
    );
}

async fn show(console: &Console, id: &str) -> anyhow::Result<()> {
    let workflow = console.workflow(console.desk());
    let loan = workflow.open_loan(id).await?;
    console.store.remember_loan(&loan.id)?;

    let history = workflow.desk().read().await.history.clone();
    print_loan(&loan, &history);
    Ok(())
}

fn print_loan(loan: &LoanApplication, history: &[StatusHistoryEntry]) {
    println!("{}  {}", loan.id, format::status_badge(loan.status));
    println!("Applicant      : {}", format::or_na(Some(loan.applicant_name())));
    println!("Applied        : {}", format::date(loan.application_date));
    println!("Loan amount    : {}", format::money(loan.financial_details.loan_amount));
    println!("Annual income  : {}", format::money(loan.financial_details.annual_income));
    println!("CIBIL score    : {}", format::number(loan.financial_details.cibil_score));
    println!("Total assets   : {}", format::money(Some(loan.asset_details.total())));
    if let Some(eligibility) = loan.eligibility_details.as_ref() {
        println!(
            "ML prediction  : {} ({})",
            format::or_na(eligibility.ml_prediction.as_deref()),
            eligibility
                .confidence_score
                .map(format::percent)
                .unwrap_or_else(|| format::NA.to_string())
        );
    }

    println!();
    if history.is_empty() {
        println!("No status changes recorded.");
    }
    for entry in history {
        println!(
            "{}  {:<16} {}  {}",
            format::datetime(Some(entry.timestamp)),
            format::status_badge(entry.status),
            format::or_na(entry.updated_by.as_deref()),
            entry.reason
        );
    }
}

async fn set_status(console: &Console, args: SetStatusArgs) -> anyhow::Result<()> {
    let workflow = console.workflow(console.desk());
    workflow.open_loan(&args.id).await?;
    workflow.open_draft(args.status).await?;
    workflow.set_reason(&args.reason).await?;
    workflow.confirm().await?;

    let desk = workflow.desk().read().await;
    if let Some(loan) = desk.detail.as_ref() {
        print_loan(loan, &desk.history);
    }
    Ok(())
}

async fn dashboard(console: &Console, args: DashboardArgs) -> anyhow::Result<()> {
    console.session.bearer()?;
    let poller = Arc::new(DashboardPoller::new(
        console.client.clone(),
        console.config.dashboard_refresh,
    ));

    if !args.watch {
        poller.refresh().await?;
        if let Some(snapshot) = poller.latest() {
            print_dashboard(&snapshot);
        }
        return Ok(());
    }

    let mut updates = poller.subscribe();
    let (stop, shutdown) = watch::channel(false);
    let task = {
        let poller = poller.clone();
        tokio::spawn(async move { poller.run(shutdown).await })
    };

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    print_dashboard(&snapshot);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, stopping dashboard");
                break;
            }
        }
    }

    stop.send_replace(true);
    task.await?;
    Ok(())
}

fn print_dashboard(snapshot: &DashboardSnapshot) {
    let summary = &snapshot.summary;
    println!("Dashboard @ {}", format::datetime(Some(snapshot.fetched_at)));
    if summary.is_empty() {
        println!("No loan applications found");
        return;
    }

    println!(
        "Loans: {}  Requested: {}  Approval: {}  Rejection: {}  Avg CIBIL: {:.0}",
        summary.total_loans,
        format::money(Some(summary.total_requested)),
        format::percent(summary.approval_rate),
        format::percent(summary.rejection_rate),
        summary.average_credit_score,
    );
    if let Some(stats) = snapshot.statistics.as_ref() {
        println!(
            "Server totals: {} loans, {} pending, {} approved, {} rejected",
            stats.total_loans, stats.pending, stats.approved, stats.rejected
        );
    }
    if let Some(analytics) = snapshot.analytics.as_ref().filter(|a| !a.is_empty()) {
        println!("\nServer analytics");
        for (name, value) in &analytics.metrics {
            println!("  {:<24} {:>14.2}", name, value);
        }
    }

    println!("\nStatus distribution");
    for share in &summary.status_distribution {
        println!("  {:<14} {:>5}  {:>6}", share.status, share.count, format::percent(share.share));
    }

    println!("\nRisk");
    for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
        println!("  {:<14} {:>6}", level.as_str(), format::percent(summary.risk.share(level)));
    }

    println!("\nMonthly");
    for month in &summary.monthly {
        println!(
            "  {}  apps {:>4}  approved {:>4}  rejected {:>4}  pending {:>4}  disbursed {:>16}  approval {:>6}",
            month.month,
            month.applications,
            month.approved,
            month.rejected,
            month.pending,
            format::money(Some(month.disbursed)),
            format::percent(month.approval_rate),
        );
    }

    println!("\nTop performers");
    for performer in &summary.top_performers {
        println!(
            "  {:<26} {:<24} {:>6.1}  {}",
            performer.loan_id,
            format::or_na(Some(performer.applicant.as_str())),
            performer.score,
            format::status_badge(performer.status),
        );
    }
}

async fn admins(console: &Console, action: AdminAction) -> anyhow::Result<()> {
    let roster = RosterService::new(
        console.session.clone(),
        console.client.clone(),
        console.config.super_admin_email.clone(),
    );

    let (key, status) = match action {
        AdminAction::List => {
            for admin in roster.list().await? {
                println!(
                    "{:<26} {:<24} {:<32} {:<9} {}",
                    admin.id,
                    admin.display_name(),
                    admin.email,
                    admin.status.as_str(),
                    if admin.is_active { "active" } else { "inactive" },
                );
            }
            return Ok(());
        }
        AdminAction::Delete { admin } => {
            let admin = roster.find(&admin).await?;
            roster.delete(&admin).await?;
            println!("Deleted {}.", admin.email);
            return Ok(());
        }
        AdminAction::Approve { admin } => (admin, AdminStatus::Approved),
        AdminAction::Reject { admin } => (admin, AdminStatus::Rejected),
    };

    let admin = roster.find(&key).await?;
    roster.set_status(&admin, status).await?;
    println!("{} is now {}.", admin.email, status.as_str());
    Ok(())
}

async fn export(console: &Console, id: &str) -> anyhow::Result<()> {
    console.session.bearer()?;
    let loan = console.client.get_loan(id).await?;
    let history = console.client.status_history(id).await?;

    let path = ReportBuilder::new(console.config.report_history_limit).export(
        Some(&loan),
        &history,
        &console.config.report_dir,
    )?;
    console.store.remember_loan(&loan.id)?;
    println!("Report written to {}", path.display());
    Ok(())
}

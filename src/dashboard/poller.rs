//! Periodic dashboard refresh
//!
//! Re-fetches the loan collection (plus the server statistics and analytics,
//! each optional) on a fixed interval and publishes a fresh
//! `DashboardSnapshot` through a `watch` channel. A tick that lands while a
//! refresh is still running is skipped; there is no backoff or jitter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::api::{LoanBackend, LoanListQuery};
use crate::error::ClientResult;
use crate::models::{LoanAnalytics, LoanApplication, LoanStatistics};

use super::analytics::DashboardSummary;

/// Page size used when walking the full loan collection
const FETCH_PAGE_SIZE: u32 = 100;

/// Upper bound on pages walked in one refresh
const MAX_PAGES: u32 = 1_000;

#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub summary: DashboardSummary,
    /// Server-side headline numbers; `None` when that endpoint failed
    pub statistics: Option<LoanStatistics>,
    /// Server analytics metrics; `None` when that endpoint failed
    pub analytics: Option<LoanAnalytics>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    /// Another refresh was already running
    Skipped,
}

/// Clears the running flag when a refresh ends, however it ends
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct DashboardPoller<B: LoanBackend + ?Sized> {
    backend: Arc<B>,
    interval: Duration,
    refreshing: AtomicBool,
    latest: watch::Sender<Option<Arc<DashboardSnapshot>>>,
}

impl<B: LoanBackend + ?Sized> DashboardPoller<B> {
    pub fn new(backend: Arc<B>, interval: Duration) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            backend,
            interval: interval.max(Duration::from_secs(1)),
            refreshing: AtomicBool::new(false),
            latest,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<DashboardSnapshot>>> {
        self.latest.subscribe()
    }

    pub fn latest(&self) -> Option<Arc<DashboardSnapshot>> {
        self.latest.borrow().clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    /// Fetch and aggregate once, unless a refresh is already running
    pub async fn refresh(&self) -> ClientResult<RefreshOutcome> {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            tracing::debug!("Dashboard refresh already running, skipping");
            return Ok(RefreshOutcome::Skipped);
        }
        let _running = RunningGuard(&self.refreshing);

        let loans = fetch_all_loans(self.backend.as_ref()).await?;
        let statistics = match self.backend.statistics().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!(error = %e, "Loan statistics unavailable");
                None
            }
        };

        let analytics = match self.backend.analytics().await {
            Ok(analytics) => Some(analytics),
            Err(e) => {
                tracing::warn!(error = %e, "Loan analytics unavailable");
                None
            }
        };

        let snapshot = DashboardSnapshot {
            summary: DashboardSummary::from_loans(&loans),
            statistics,
            analytics,
            fetched_at: Utc::now(),
        };
        tracing::info!(
            loans = snapshot.summary.total_loans,
            approval_rate = snapshot.summary.approval_rate,
            "Dashboard refreshed"
        );
        self.latest.send_replace(Some(Arc::new(snapshot)));

        Ok(RefreshOutcome::Refreshed)
    }

    /// Poll until `shutdown` turns true or its sender goes away
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval_secs = self.interval.as_secs(), "Dashboard poller started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        tracing::error!(error = %e, "Dashboard refresh failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Dashboard poller stopped");
    }
}

/// Walk every server page of loans
pub async fn fetch_all_loans<B: LoanBackend + ?Sized>(
    backend: &B,
) -> ClientResult<Vec<LoanApplication>> {
    let mut loans = Vec::new();
    let mut query = LoanListQuery {
        limit: FETCH_PAGE_SIZE,
        ..LoanListQuery::default()
    };

    while query.page <= MAX_PAGES {
        let page = backend.list_loans(&query).await?;
        let done = !page.pagination.has_next || page.loans.is_empty();
        loans.extend(page.loans);
        if done {
            break;
        }
        query.page += 1;
    }

    Ok(loans)
}

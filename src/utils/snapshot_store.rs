use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use chrono::{Days, Local, Utc};
use futures::lock::{Mutex, MutexGuard};
use sqlx::MySqlPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::attendance::AttendanceRules;
use crate::attendance::summary::{SnapshotInputs, build_snapshot};
use crate::config::Config;
use crate::db;
use crate::model::dashboard_snapshot::DashboardSnapshot;
use crate::model::org_unit::Scope;
use crate::utils::db_utils::ScanFilter;
use crate::utils::report_cache::ReportCache;

/// Holds the latest dashboard snapshot.
///
/// Readers clone an `Arc` and never wait on a rebuild. Writers go through
/// [`SnapshotStore::try_writer`], which admits a single refresh at a time.
#[derive(Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<DashboardSnapshot>>>,
    writer: Mutex<()>,
}

/// Exclusive right to publish the next snapshot.
pub struct SnapshotWriter<'a> {
    store: &'a SnapshotStore,
    _guard: MutexGuard<'a, ()>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<DashboardSnapshot>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// `None` while another refresh holds the writer.
    pub fn try_writer(&self) -> Option<SnapshotWriter<'_>> {
        self.writer.try_lock().map(|guard| SnapshotWriter {
            store: self,
            _guard: guard,
        })
    }
}

impl SnapshotWriter<'_> {
    /// Swaps in `snapshot` as a whole and releases the writer.
    pub fn publish(self, snapshot: DashboardSnapshot) -> Arc<DashboardSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut slot = match self.store.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(snapshot.clone());
        snapshot
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { revision: String },
    AlreadyRunning,
}

/// Rebuilds the dashboard snapshot from MySQL, persists it and publishes it.
#[instrument(name = "dashboard_refresh", skip_all)]
pub async fn refresh_snapshot(
    pool: &MySqlPool,
    store: &SnapshotStore,
    cache: &ReportCache,
    rules: &AttendanceRules,
    config: &Config,
) -> Result<RefreshOutcome> {
    let Some(writer) = store.try_writer() else {
        warn!("Dashboard refresh skipped: another refresh is running");
        return Ok(RefreshOutcome::AlreadyRunning);
    };

    let today = Local::now().date_naive();
    let from = today
        .checked_sub_days(Days::new(u64::from(config.trend_window_days - 1)))
        .unwrap_or(today);

    let totals = db::fetch_org_totals(pool)
        .await
        .context("failed to count organization units")?;
    let roster = db::fetch_roster(pool, &config.dashboard_scope)
        .await
        .context("failed to load dashboard roster")?;
    let events = db::fetch_scan_events(
        pool,
        &ScanFilter {
            from,
            to: today,
            scope: Scope::default(),
            employee_id: None,
        },
    )
    .await
    .context("failed to load scans for dashboard")?;

    let aggregates = rules.aggregate(&events);
    let snapshot = build_snapshot(
        SnapshotInputs {
            totals,
            scope: config.dashboard_scope.clone(),
            roster: &roster,
            aggregates: &aggregates,
        },
        today,
        config.trend_window_days,
        Uuid::new_v4().to_string(),
        Utc::now(),
    );

    db::save_snapshot(pool, &snapshot).await?;

    let published = writer.publish(snapshot);
    cache.invalidate_all();

    info!(
        revision = %published.revision,
        scans = events.len(),
        present = published.presence.present.len(),
        absent = published.presence.absent.len(),
        "Dashboard snapshot refreshed"
    );

    Ok(RefreshOutcome::Refreshed {
        revision: published.revision.clone(),
    })
}

/// Loads the last persisted snapshot so the dashboard is served right after
/// a restart, before the first scheduled refresh.
pub async fn warmup_snapshot(pool: &MySqlPool, store: &SnapshotStore) -> Result<()> {
    let Some(snapshot) = db::load_snapshot(pool).await? else {
        log::info!("Dashboard warmup: no persisted snapshot yet");
        return Ok(());
    };

    match store.try_writer() {
        // a refresh may have published while the row was being read
        Some(_) if store.current().is_some() => {
            log::info!("Dashboard warmup skipped: a fresher snapshot is already live");
        }
        Some(writer) => {
            let snapshot = writer.publish(snapshot);
            log::info!(
                "Dashboard warmup complete: revision {} as of {}",
                snapshot.revision,
                snapshot.as_of
            );
        }
        None => log::info!("Dashboard warmup skipped: refresh in progress"),
    }

    Ok(())
}

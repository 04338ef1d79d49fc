//! Periodic materialization across clubs.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rally_core::config::Settings;
use rally_db::store::{EventStore, InvitationStore};
use rally_service::sync::{InvitationSync, SyncSummary};
use tracing_futures::Instrument;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Totals for one sweep over every configured club.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub clubs: usize,
    /// Clubs whose events could not be listed.
    pub failed_clubs: usize,
    pub totals: SyncSummary,
}

impl SweepReport {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed_clubs == 0 && self.totals.is_clean()
    }

    fn record(&mut self, summary: &SyncSummary) {
        self.totals.events += summary.events;
        self.totals.created += summary.created;
        self.totals.already_present += summary.already_present;
        self.totals.failed_inserts += summary.failed_inserts;
        self.totals.failed_events += summary.failed_events;
        self.totals.failed_users += summary.failed_users;
    }
}

pub struct Sweeper<S: ?Sized> {
    sync: InvitationSync<S>,
    club_ids: Vec<Uuid>,
}

impl<S> Sweeper<S>
where
    S: InvitationStore + EventStore + ?Sized,
{
    #[must_use]
    pub const fn new(sync: InvitationSync<S>, club_ids: Vec<Uuid>) -> Self {
        Self { sync, club_ids }
    }

    /// ## Summary
    /// Builds a sweeper for the clubs and lookahead in `settings`.
    ///
    /// ## Errors
    /// Returns `AppError::InvalidConfiguration` if no club is configured.
    pub fn from_settings(store: Arc<S>, settings: &Settings) -> AppResult<Self> {
        if settings.sync.club_ids.is_empty() {
            return Err(AppError::InvalidConfiguration(
                "sync.club_ids must list at least one club".to_owned(),
            ));
        }
        Ok(Self::new(
            InvitationSync::new(store, settings.schedule.lookahead_weeks),
            settings.sync.club_ids.clone(),
        ))
    }

    /// ## Summary
    /// Reloads one club.
    ///
    /// ## Errors
    /// Returns an error if the club's events cannot be listed.
    pub async fn sweep_club(&self, club_id: Uuid, today: NaiveDate) -> AppResult<SyncSummary> {
        Ok(self
            .sync
            .reload(club_id, today)
            .instrument(tracing::info_span!("club_sweep", %club_id))
            .await?)
    }

    /// ## Summary
    /// Reloads every configured club once. A failing club is logged and
    /// counted; the others still run.
    pub async fn sweep_once(&self, today: NaiveDate) -> SweepReport {
        let mut report = SweepReport {
            clubs: self.club_ids.len(),
            ..SweepReport::default()
        };

        for &club_id in &self.club_ids {
            match self.sweep_club(club_id, today).await {
                Ok(summary) => report.record(&summary),
                Err(err) => {
                    tracing::warn!(%club_id, error = %err, "Club sweep failed");
                    report.failed_clubs += 1;
                }
            }
        }

        tracing::info!(
            clubs = report.clubs,
            failed_clubs = report.failed_clubs,
            created = report.totals.created,
            "Sweep finished"
        );
        report
    }

    /// Sweeps every `interval` forever, reading the date from `today` each time.
    pub async fn run<F>(&self, interval: Duration, today: F)
    where
        F: Fn() -> NaiveDate + Send + Sync,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.sweep_once(today()).await;
        }
    }
}

/// Today's date in the server's local time zone.
#[must_use]
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

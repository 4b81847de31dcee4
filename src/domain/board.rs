// src/domain/board.rs

use crate::domain::market::MarketResolver;
use crate::domain::site::{SiteRecord, Stage};
use crate::errors::ServerError;
use chrono::{DateTime, Duration, Utc};

/// How long a record stays visible in Soak or Cancelled before
/// `expire_stale` removes it.
pub const RETENTION_HOURS: i64 = 24;

/// What a stage transition asks the mailer to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    SoakStarted,
    SiteCancelled,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::SoakStarted => "SOAK_STARTED",
            NoticeKind::SiteCancelled => "SITE_CANCELLED",
        }
    }
}

/// A notification request raised by a stage transition. The transition
/// itself is already complete by the time this exists; delivery outcome
/// never rolls it back.
#[derive(Debug, Clone)]
pub struct NoticeRequest {
    pub kind: NoticeKind,
    pub record: SiteRecord,
}

/// The whiteboard: three append-ordered record sequences, one per stage.
///
/// All mutation goes through the methods here, which keep the core
/// invariant: a record lives in exactly one sequence at a time.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SiteBoard {
    pub ongoing: Vec<SiteRecord>,
    pub soak: Vec<SiteRecord>,
    pub cancelled: Vec<SiteRecord>,
}

impl SiteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self, stage: Stage) -> &[SiteRecord] {
        match stage {
            Stage::Ongoing => &self.ongoing,
            Stage::Soak => &self.soak,
            Stage::Cancelled => &self.cancelled,
        }
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut Vec<SiteRecord> {
        match stage {
            Stage::Ongoing => &mut self.ongoing,
            Stage::Soak => &mut self.soak,
            Stage::Cancelled => &mut self.cancelled,
        }
    }

    /// Appends a fresh empty record to the Ongoing sequence.
    pub fn add_record(&mut self) -> &SiteRecord {
        self.ongoing.push(SiteRecord::new());
        self.ongoing.last().unwrap()
    }

    /// Sets one field of an Ongoing record.
    ///
    /// Editing `site_id` re-runs the market resolver: on a match the
    /// derived triple is overwritten, on a miss it keeps its last known
    /// good value. The miss behavior is a confirmed product decision —
    /// stale derived fields are never cleared.
    pub fn update_field(
        &mut self,
        stage: Stage,
        index: usize,
        field: &str,
        value: &str,
        resolver: &MarketResolver,
    ) -> Result<(), ServerError> {
        if stage != Stage::Ongoing {
            return Err(ServerError::InvalidStage(stage));
        }
        let record = self
            .ongoing
            .get_mut(index)
            .ok_or(ServerError::OutOfRange { stage, index })?;

        record.set_field(field, value)?;

        if field == "site_id" {
            if let Some(hit) = resolver.resolve(value) {
                record.market = hit.market.clone();
                record.rsm = hit.rsm.clone();
                record.rsm_email = hit.rsm_email.clone();
            }
        }
        Ok(())
    }

    /// Moves an Ongoing record into Soak, stamping the transition time.
    pub fn move_to_soak(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<NoticeRequest, ServerError> {
        self.transition(index, Stage::Soak, NoticeKind::SoakStarted, now)
    }

    /// Moves an Ongoing record into Cancelled, stamping the transition time.
    pub fn cancel_record(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<NoticeRequest, ServerError> {
        self.transition(index, Stage::Cancelled, NoticeKind::SiteCancelled, now)
    }

    fn transition(
        &mut self,
        index: usize,
        target: Stage,
        kind: NoticeKind,
        now: DateTime<Utc>,
    ) -> Result<NoticeRequest, ServerError> {
        if index >= self.ongoing.len() {
            return Err(ServerError::OutOfRange {
                stage: Stage::Ongoing,
                index,
            });
        }
        // Remove-then-append so the record is never in two sequences.
        let mut record = self.ongoing.remove(index);
        record.stage = target;
        record.stage_entered_at = Some(now);
        let notice = NoticeRequest {
            kind,
            record: record.clone(),
        };
        self.stage_mut(target).push(record);
        Ok(notice)
    }

    /// Unconditionally removes a record from the named stage. No notice.
    pub fn delete_record(&mut self, stage: Stage, index: usize) -> Result<SiteRecord, ServerError> {
        let seq = self.stage_mut(stage);
        if index >= seq.len() {
            return Err(ServerError::OutOfRange { stage, index });
        }
        Ok(seq.remove(index))
    }

    /// Drops every Soak/Cancelled record whose stage entry is older than
    /// the retention window. Ongoing records never expire. Returns how
    /// many records were removed, so callers know whether to persist.
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::hours(RETENTION_HOURS);
        let mut removed = 0;
        for seq in [&mut self.soak, &mut self.cancelled] {
            let before = seq.len();
            seq.retain(|r| match r.stage_entered_at {
                Some(entered) => entered >= cutoff,
                None => true,
            });
            removed += before - seq.len();
        }
        removed
    }
}

//! End-of-game reporting
//!
//! When a player reaches the ending screen the session hands a [`Report`] to
//! a [`ReportSink`]. Delivery is fire-and-forget: a failing sink is logged
//! and never blocks the transition.

use crate::data::{Id, User};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final result of one playthrough
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub session: Id,
    pub user: User,
    pub score: u32,
    pub max_score: u32,
    pub finished_at: DateTime<Utc>,
}

/// Receiver for finished playthroughs
pub trait ReportSink: Send + Sync {
    fn notify(&self, report: &Report) -> Result<()>;
}

/// Emits each report as a structured log event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn notify(&self, report: &Report) -> Result<()> {
        tracing::info!(
            session = %report.session,
            user = %report.user.name,
            department = %report.user.department,
            score = report.score,
            max_score = report.max_score,
            finished_at = %report.finished_at.to_rfc3339(),
            "adventure finished"
        );
        Ok(())
    }
}

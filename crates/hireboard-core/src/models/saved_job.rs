use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::id::RecordId;

/// A job bookmarked by a candidate. At most one per (job, candidate) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedJob {
    pub id: RecordId,
    pub job: RecordId,
    pub candidate: RecordId,
    pub saved_at: Option<DateTime<Utc>>,
}

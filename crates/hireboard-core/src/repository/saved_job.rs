use chrono::Utc;
use serde::Deserialize;

use crate::error::AppError;
use crate::fields::{format_timestamp, parse_timestamp};
use crate::id::RecordId;
use crate::models::SavedJob;
use crate::query::{Condition, Query, SortDirection};
use crate::traits::RecordClient;

use super::{RecordBuilder, create_row, delete_rows, fetch_rows, lenient};

pub const COLLECTION: &str = "saved_job_c";

const FIELDS: &[&str] = &["Id", "Name", "job_id_c", "candidate_id_c", "saved_at_c"];

/// Repository for a candidate's bookmarked jobs.
///
/// The backend has no uniqueness constraint, so `save` checks for an
/// existing bookmark first. Two concurrent saves of the same pair can
/// still both succeed; readers tolerate the duplicate.
#[derive(Debug, Clone)]
pub struct SavedJobRepository<C> {
    client: C,
}

impl<C: RecordClient> SavedJobRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Bookmarks of a candidate, most recently saved first.
    pub async fn get_by_candidate_id(
        &self,
        candidate: RecordId,
    ) -> Result<Vec<SavedJob>, AppError> {
        let query = Query::select(FIELDS)
            .filter(Condition::eq("candidate_id_c", candidate))
            .order_by("saved_at_c", SortDirection::Desc);
        self.fetch(&query).await
    }

    /// The bookmark for `(job, candidate)`, if any.
    pub async fn find(
        &self,
        job: RecordId,
        candidate: RecordId,
    ) -> Result<Option<SavedJob>, AppError> {
        let query = Query::select(FIELDS)
            .filter(Condition::eq("job_id_c", job))
            .filter(Condition::eq("candidate_id_c", candidate));
        Ok(self.fetch(&query).await?.into_iter().next())
    }

    /// Whether the candidate has bookmarked the job. Lookup failures read
    /// as "not saved".
    pub async fn is_saved(&self, job: RecordId, candidate: RecordId) -> bool {
        match self.find(job, candidate).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::warn!(
                    %job, %candidate, error = %e,
                    "Saved-state lookup failed, assuming not saved"
                );
                false
            }
        }
    }

    /// Bookmark a job. Saving an already-saved job is a [`AppError::DuplicateError`].
    pub async fn save(&self, job: RecordId, candidate: RecordId) -> Result<SavedJob, AppError> {
        if self.find(job, candidate).await?.is_some() {
            return Err(AppError::DuplicateError(format!(
                "job {job} is already saved by user {candidate}"
            )));
        }

        let record = RecordBuilder::new()
            .set("Name", format!("Saved Job {job}"))
            .set("job_id_c", job)
            .set("candidate_id_c", candidate)
            .set("saved_at_c", format_timestamp(&Utc::now()))
            .into_value();

        let row: SavedJobRow = create_row(&self.client, COLLECTION, "saved job", record).await?;
        row.try_into()
    }

    /// Remove a bookmark. Removing one that does not exist is
    /// [`AppError::NotFound`].
    pub async fn unsave(&self, job: RecordId, candidate: RecordId) -> Result<(), AppError> {
        let saved = self
            .find(job, candidate)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("saved job {job} for user {candidate}")))?;
        self.delete(saved.id).await
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), AppError> {
        delete_rows(&self.client, COLLECTION, &[id]).await
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<SavedJob>, AppError> {
        let rows: Vec<SavedJobRow> = fetch_rows(&self.client, COLLECTION, query).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| SavedJob::try_from(row).ok())
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct SavedJobRow {
    #[serde(rename = "Id")]
    id: RecordId,
    #[serde(rename = "job_id_c", default, deserialize_with = "lenient::opt_ref")]
    job: Option<RecordId>,
    #[serde(rename = "candidate_id_c", default, deserialize_with = "lenient::opt_ref")]
    candidate: Option<RecordId>,
    #[serde(rename = "saved_at_c", default, deserialize_with = "lenient::opt_text")]
    saved_at: Option<String>,
}

impl TryFrom<SavedJobRow> for SavedJob {
    type Error = AppError;

    fn try_from(row: SavedJobRow) -> Result<Self, Self::Error> {
        let (Some(job), Some(candidate)) = (row.job, row.candidate) else {
            tracing::warn!(id = %row.id, "Saved job is missing its job or candidate reference");
            return Err(AppError::validation(format!(
                "saved job {} is missing its job or candidate reference",
                row.id
            )));
        };
        Ok(SavedJob {
            id: row.id,
            job,
            candidate,
            saved_at: parse_timestamp("saved_at_c", row.saved_at.as_deref()),
        })
    }
}

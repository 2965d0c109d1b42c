use chrono::Utc;
use serde::Deserialize;

use crate::error::AppError;
use crate::fields::{format_timestamp, parse_timestamp, require_text};
use crate::id::RecordId;
use crate::models::{Application, ApplicationPatch, ApplicationStatus, NewApplication};
use crate::query::{Condition, Query};
use crate::traits::RecordClient;

use super::{
    RecordBuilder, create_row, delete_rows, fetch_rows, field_list, get_row, lenient, parse_enum,
    update_row,
};

pub const COLLECTION: &str = "application_c";

const FIELDS: &[&str] = &[
    "Id",
    "Name",
    "job_id_c",
    "candidate_id_c",
    "cover_letter_c",
    "resume_url_c",
    "status_c",
    "applied_at_c",
    "updated_at_c",
];

/// Repository for job applications.
#[derive(Debug, Clone)]
pub struct ApplicationRepository<C> {
    client: C,
}

impl<C: RecordClient> ApplicationRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Vec<Application>, AppError> {
        self.fetch(Query::select(FIELDS)).await
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<Application, AppError> {
        let row: ApplicationRow =
            get_row(&self.client, COLLECTION, "application", id, &field_list(FIELDS)).await?;
        row.try_into()
    }

    /// Applications submitted by a candidate user.
    pub async fn get_by_candidate_id(
        &self,
        candidate: RecordId,
    ) -> Result<Vec<Application>, AppError> {
        self.fetch(Query::select(FIELDS).filter(Condition::eq("candidate_id_c", candidate)))
            .await
    }

    pub async fn get_by_job_id(&self, job: RecordId) -> Result<Vec<Application>, AppError> {
        self.fetch(Query::select(FIELDS).filter(Condition::eq("job_id_c", job)))
            .await
    }

    /// Submit an application. The cover letter must be non-blank; the
    /// record is stamped with the current time on both timestamps.
    pub async fn create(&self, application: NewApplication) -> Result<Application, AppError> {
        require_text("cover letter", &application.cover_letter)?;

        let now = format_timestamp(&Utc::now());
        let record = RecordBuilder::new()
            .set("Name", format!("Application for Job {}", application.job))
            .set("job_id_c", application.job)
            .set("candidate_id_c", application.candidate)
            .set("cover_letter_c", application.cover_letter)
            .set_opt("resume_url_c", application.resume_url)
            .set("status_c", application.status.unwrap_or_default().as_str())
            .set("applied_at_c", now.clone())
            .set("updated_at_c", now)
            .into_value();

        let row: ApplicationRow =
            create_row(&self.client, COLLECTION, "application", record).await?;
        row.try_into()
    }

    /// Sparse update. Any change refreshes `updated_at`.
    pub async fn update(
        &self,
        id: RecordId,
        patch: ApplicationPatch,
    ) -> Result<Application, AppError> {
        if let Some(letter) = &patch.cover_letter {
            require_text("cover letter", letter)?;
        }

        let fields = RecordBuilder::new()
            .set_opt("cover_letter_c", patch.cover_letter)
            .set_opt("resume_url_c", patch.resume_url)
            .set_opt("status_c", patch.status.map(|s| s.as_str()))
            .set("updated_at_c", format_timestamp(&Utc::now()))
            .into_map();

        let row: ApplicationRow =
            update_row(&self.client, COLLECTION, "application", id, fields).await?;
        row.try_into()
    }

    pub async fn update_status(
        &self,
        id: RecordId,
        status: ApplicationStatus,
    ) -> Result<Application, AppError> {
        let application = self
            .update(
                id,
                ApplicationPatch {
                    status: Some(status),
                    ..ApplicationPatch::default()
                },
            )
            .await?;
        tracing::info!(%id, %status, "Application status changed");
        Ok(application)
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), AppError> {
        delete_rows(&self.client, COLLECTION, &[id]).await
    }

    async fn fetch(&self, query: Query) -> Result<Vec<Application>, AppError> {
        let rows: Vec<ApplicationRow> = fetch_rows(&self.client, COLLECTION, &query).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                Application::try_from(row)
                    .inspect_err(|e| {
                        tracing::warn!(%id, error = %e, "Skipping application without references");
                    })
                    .ok()
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    #[serde(rename = "Id")]
    id: RecordId,
    #[serde(rename = "job_id_c", default, deserialize_with = "lenient::opt_ref")]
    job: Option<RecordId>,
    #[serde(rename = "candidate_id_c", default, deserialize_with = "lenient::opt_ref")]
    candidate: Option<RecordId>,
    #[serde(rename = "cover_letter_c", default, deserialize_with = "lenient::opt_text")]
    cover_letter: Option<String>,
    #[serde(rename = "resume_url_c", default, deserialize_with = "lenient::opt_text")]
    resume_url: Option<String>,
    #[serde(rename = "status_c", default, deserialize_with = "lenient::opt_text")]
    status: Option<String>,
    #[serde(rename = "applied_at_c", default, deserialize_with = "lenient::opt_text")]
    applied_at: Option<String>,
    #[serde(rename = "updated_at_c", default, deserialize_with = "lenient::opt_text")]
    updated_at: Option<String>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = AppError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let (Some(job), Some(candidate)) = (row.job, row.candidate) else {
            return Err(AppError::validation(format!(
                "application {} is missing its job or candidate reference",
                row.id
            )));
        };

        Ok(Application {
            id: row.id,
            job,
            candidate,
            cover_letter: row.cover_letter,
            resume_url: row.resume_url,
            status: parse_enum("status_c", row.status.as_deref(), ApplicationStatus::Applied),
            applied_at: parse_timestamp("applied_at_c", row.applied_at.as_deref()),
            updated_at: parse_timestamp("updated_at_c", row.updated_at.as_deref()),
        })
    }
}

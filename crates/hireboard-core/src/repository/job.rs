use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::fields::{format_timestamp, join_list, parse_timestamp, require_text, split_list};
use crate::id::RecordId;
use crate::models::{Job, JobFilters, JobPatch, JobStatus, NewJob};
use crate::query::{Condition, Query};
use crate::traits::RecordClient;

use super::{
    RecordBuilder, create_row, delete_rows, fetch_rows, field_list, get_row, lenient, parse_enum,
    update_row,
};

pub const COLLECTION: &str = "job_listing_c";

const FIELDS: &[&str] = &[
    "Id",
    "Name",
    "title_c",
    "description_c",
    "category_c",
    "location_c",
    "employment_type_c",
    "experience_level_c",
    "salary_min_c",
    "salary_max_c",
    "requirements_c",
    "benefits_c",
    "status_c",
    "posted_at_c",
    "expires_at_c",
    "employer_id_c",
];

/// Repository for job listings.
#[derive(Debug, Clone)]
pub struct JobRepository<C> {
    client: C,
}

impl<C: RecordClient> JobRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Vec<Job>, AppError> {
        let rows: Vec<JobRow> = fetch_rows(&self.client, COLLECTION, &select()).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<Job, AppError> {
        let row: JobRow = get_row(&self.client, COLLECTION, "job", id, &field_list(FIELDS)).await?;
        Ok(row.into())
    }

    /// Jobs owned by an employer user, in any status.
    pub async fn get_by_employer_id(&self, employer: RecordId) -> Result<Vec<Job>, AppError> {
        let query = select().filter(Condition::eq("employer_id_c", employer));
        let rows: Vec<JobRow> = fetch_rows(&self.client, COLLECTION, &query).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Batch lookup by id set. Output order is unspecified; unknown ids are
    /// simply absent.
    pub async fn get_by_ids(&self, ids: &[RecordId]) -> Result<Vec<Job>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = select().filter(Condition::one_of("Id", ids.iter().copied()));
        let rows: Vec<JobRow> = fetch_rows(&self.client, COLLECTION, &query).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Search active listings. Only filters that are present and non-blank
    /// contribute a condition.
    pub async fn search(&self, filters: &JobFilters) -> Result<Vec<Job>, AppError> {
        let rows: Vec<JobRow> = fetch_rows(&self.client, COLLECTION, &search_query(filters)).await?;
        Ok(rows
            .into_iter()
            .map(Job::from)
            .filter(|job| job.status.is_listed())
            .collect())
    }

    /// Post a job. Fails validation before any call to the backend.
    pub async fn create(&self, job: NewJob) -> Result<Job, AppError> {
        let record = create_record(job)?;
        let row: JobRow = create_row(&self.client, COLLECTION, "job", record).await?;
        Ok(row.into())
    }

    /// Sparse update. A patch that moves only one end of the salary range is
    /// checked against the stored other end first.
    pub async fn update(&self, id: RecordId, patch: JobPatch) -> Result<Job, AppError> {
        let (min, max) = (patch.salary_min, patch.salary_max);
        let fields = patch_record(patch)?;
        if min.is_some() != max.is_some() {
            let current = self.get_by_id(id).await?;
            check_salary(min.or(current.salary_min), max.or(current.salary_max))?;
        }
        let row: JobRow = update_row(&self.client, COLLECTION, "job", id, fields).await?;
        Ok(row.into())
    }

    pub async fn update_status(&self, id: RecordId, status: JobStatus) -> Result<Job, AppError> {
        self.update(
            id,
            JobPatch {
                status: Some(status),
                ..JobPatch::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), AppError> {
        delete_rows(&self.client, COLLECTION, &[id]).await
    }
}

fn select() -> Query {
    Query::select(FIELDS)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn search_query(filters: &JobFilters) -> Query {
    let mut query = select().filter(Condition::eq("status_c", JobStatus::Active.as_str()));

    if let Some(keyword) = non_blank(&filters.keyword) {
        query = query.filter(Condition::contains("title_c", keyword));
    }
    if let Some(location) = non_blank(&filters.location) {
        query = query.filter(Condition::contains("location_c", location));
    }
    if let Some(category) = non_blank(&filters.category) {
        query = query.filter(Condition::eq("category_c", category));
    }
    if let Some(level) = non_blank(&filters.experience_level) {
        query = query.filter(Condition::eq("experience_level_c", level));
    }
    if let Some(kind) = non_blank(&filters.employment_type) {
        query = query.filter(Condition::eq("employment_type_c", kind));
    }
    query
}

fn check_salary(min: Option<i64>, max: Option<i64>) -> Result<(), AppError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(AppError::validation(format!(
                "salary_min ({min}) must not exceed salary_max ({max})"
            )));
        }
    }
    if min.is_some_and(|v| v < 0) || max.is_some_and(|v| v < 0) {
        return Err(AppError::validation("salary must not be negative"));
    }
    Ok(())
}

fn create_record(job: NewJob) -> Result<Value, AppError> {
    require_text("title", &job.title)?;
    require_text("description", &job.description)?;
    require_text("category", &job.category)?;
    require_text("location", &job.location)?;
    require_text("employment type", &job.employment_type)?;
    require_text("experience level", &job.experience_level)?;
    check_salary(job.salary_min, job.salary_max)?;

    let requirements = if job.requirements.is_empty() {
        None
    } else {
        Some(join_list("requirements", &job.requirements)?)
    };
    let benefits = if job.benefits.is_empty() {
        None
    } else {
        Some(join_list("benefits", &job.benefits)?)
    };
    let posted_at = job.posted_at.unwrap_or_else(Utc::now);

    Ok(RecordBuilder::new()
        .set("Name", job.title.trim())
        .set("title_c", job.title.trim())
        .set("description_c", job.description)
        .set("category_c", job.category)
        .set("location_c", job.location)
        .set("employment_type_c", job.employment_type)
        .set("experience_level_c", job.experience_level)
        .set_opt("salary_min_c", job.salary_min)
        .set_opt("salary_max_c", job.salary_max)
        .set_opt("requirements_c", requirements)
        .set_opt("benefits_c", benefits)
        .set("status_c", job.status.unwrap_or_default().as_str())
        .set("posted_at_c", format_timestamp(&posted_at))
        .set_opt("expires_at_c", job.expires_at.as_ref().map(format_timestamp))
        .set_opt("employer_id_c", job.employer)
        .into_value())
}

fn patch_record(patch: JobPatch) -> Result<serde_json::Map<String, Value>, AppError> {
    if let Some(title) = &patch.title {
        require_text("title", title)?;
    }
    check_salary(patch.salary_min, patch.salary_max)?;

    let requirements = patch
        .requirements
        .map(|items| join_list("requirements", &items))
        .transpose()?;
    let benefits = patch
        .benefits
        .map(|items| join_list("benefits", &items))
        .transpose()?;

    Ok(RecordBuilder::new()
        .set_opt("Name", patch.title.clone())
        .set_opt("title_c", patch.title)
        .set_opt("description_c", patch.description)
        .set_opt("category_c", patch.category)
        .set_opt("location_c", patch.location)
        .set_opt("employment_type_c", patch.employment_type)
        .set_opt("experience_level_c", patch.experience_level)
        .set_opt("salary_min_c", patch.salary_min)
        .set_opt("salary_max_c", patch.salary_max)
        .set_opt("requirements_c", requirements)
        .set_opt("benefits_c", benefits)
        .set_opt("status_c", patch.status.map(|s| s.as_str()))
        .set_opt("posted_at_c", patch.posted_at.as_ref().map(format_timestamp))
        .set_opt("expires_at_c", patch.expires_at.as_ref().map(format_timestamp))
        .set_opt("employer_id_c", patch.employer)
        .into_map())
}

// -- Internal row type mirroring the job_listing_c schema --

#[derive(Debug, Deserialize)]
struct JobRow {
    #[serde(rename = "Id")]
    id: RecordId,
    #[serde(rename = "Name", default, deserialize_with = "lenient::opt_text")]
    name: Option<String>,
    #[serde(rename = "title_c", default, deserialize_with = "lenient::opt_text")]
    title: Option<String>,
    #[serde(rename = "description_c", default, deserialize_with = "lenient::opt_text")]
    description: Option<String>,
    #[serde(rename = "category_c", default, deserialize_with = "lenient::opt_text")]
    category: Option<String>,
    #[serde(rename = "location_c", default, deserialize_with = "lenient::opt_text")]
    location: Option<String>,
    #[serde(rename = "employment_type_c", default, deserialize_with = "lenient::opt_text")]
    employment_type: Option<String>,
    #[serde(rename = "experience_level_c", default, deserialize_with = "lenient::opt_text")]
    experience_level: Option<String>,
    #[serde(rename = "salary_min_c", default, deserialize_with = "lenient::opt_i64")]
    salary_min: Option<i64>,
    #[serde(rename = "salary_max_c", default, deserialize_with = "lenient::opt_i64")]
    salary_max: Option<i64>,
    #[serde(rename = "requirements_c", default, deserialize_with = "lenient::opt_text")]
    requirements: Option<String>,
    #[serde(rename = "benefits_c", default, deserialize_with = "lenient::opt_text")]
    benefits: Option<String>,
    #[serde(rename = "status_c", default, deserialize_with = "lenient::opt_text")]
    status: Option<String>,
    #[serde(rename = "posted_at_c", default, deserialize_with = "lenient::opt_text")]
    posted_at: Option<String>,
    #[serde(rename = "expires_at_c", default, deserialize_with = "lenient::opt_text")]
    expires_at: Option<String>,
    #[serde(rename = "employer_id_c", default, deserialize_with = "lenient::opt_ref")]
    employer: Option<RecordId>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            title: row.title.or(row.name).unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
            employment_type: row.employment_type.unwrap_or_default(),
            experience_level: row.experience_level.unwrap_or_default(),
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            requirements: row.requirements.as_deref().map(split_list).unwrap_or_default(),
            benefits: row.benefits.as_deref().map(split_list).unwrap_or_default(),
            // Unset means active; an unrecognised value is never listed.
            status: match row.status.as_deref().map(str::trim) {
                None | Some("") => JobStatus::Active,
                raw => parse_enum("status_c", raw, JobStatus::Draft),
            },
            posted_at: parse_timestamp("posted_at_c", row.posted_at.as_deref()),
            expires_at: parse_timestamp("expires_at_c", row.expires_at.as_deref()),
            employer: row.employer,
        }
    }
}

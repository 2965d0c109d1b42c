use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::id::RecordId;

/// Publication status of a job listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Draft,
    Closed,
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Draft => "draft",
            JobStatus::Closed => "closed",
            JobStatus::Archived => "archived",
        }
    }

    /// Only active listings show up in search.
    pub fn is_listed(&self) -> bool {
        matches!(self, JobStatus::Active)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(JobStatus::Active),
            "draft" => Ok(JobStatus::Draft),
            "closed" => Ok(JobStatus::Closed),
            "archived" => Ok(JobStatus::Archived),
            _ => Err(AppError::ValidationError(format!("Unknown job status: {s}"))),
        }
    }
}

/// A job listing posted by an employer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub employment_type: String,
    pub experience_level: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub status: JobStatus,
    pub posted_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    /// User id of the owning employer.
    pub employer: Option<RecordId>,
}

/// Input for posting a job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub employment_type: String,
    pub experience_level: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    /// Defaults to [`JobStatus::Active`].
    pub status: Option<JobStatus>,
    /// Defaults to now.
    pub posted_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub employer: Option<RecordId>,
}

impl NewJob {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
        employment_type: impl Into<String>,
        experience_level: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
            location: location.into(),
            employment_type: employment_type.into(),
            experience_level: experience_level.into(),
            ..Self::default()
        }
    }

    pub fn with_salary(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.salary_min = min;
        self.salary_max = max;
        self
    }

    pub fn with_requirements<S: Into<String>>(
        mut self,
        items: impl IntoIterator<Item = S>,
    ) -> Self {
        self.requirements = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_benefits<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.benefits = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_employer(mut self, employer: RecordId) -> Self {
        self.employer = Some(employer);
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Sparse update of a job. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub requirements: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub status: Option<JobStatus>,
    pub posted_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub employer: Option<RecordId>,
}

/// Search filters. Blank or absent filters add no condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilters {
    /// Substring of the title.
    pub keyword: Option<String>,
    /// Substring of the location.
    pub location: Option<String>,
    pub category: Option<String>,
    pub experience_level: Option<String>,
    pub employment_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_roundtrip() {
        for status in [
            JobStatus::Active,
            JobStatus::Draft,
            JobStatus::Closed,
            JobStatus::Archived,
        ] {
            let parsed: JobStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("published".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_only_active_jobs_are_listed() {
        assert!(JobStatus::Active.is_listed());
        assert!(!JobStatus::Draft.is_listed());
        assert!(!JobStatus::Closed.is_listed());
        assert!(!JobStatus::Archived.is_listed());
    }

    #[test]
    fn test_new_job_builder() {
        let job = NewJob::new("Engineer", "Build", "Engineering", "Remote", "full-time", "senior")
            .with_salary(Some(90_000), Some(120_000))
            .with_requirements(["Rust", "SQL"]);

        assert_eq!(job.title, "Engineer");
        assert_eq!(job.salary_max, Some(120_000));
        assert_eq!(job.requirements, vec!["Rust", "SQL"]);
        assert!(job.status.is_none());
    }
}

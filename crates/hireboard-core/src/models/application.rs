use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::id::RecordId;

/// Hiring pipeline stage of an application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Reviewing,
    Shortlisted,
    Interviewing,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::Accepted)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(ApplicationStatus::Applied),
            "reviewing" => Ok(ApplicationStatus::Reviewing),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "interviewing" => Ok(ApplicationStatus::Interviewing),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "accepted" => Ok(ApplicationStatus::Accepted),
            _ => Err(AppError::ValidationError(format!(
                "Unknown application status: {s}"
            ))),
        }
    }
}

/// A candidate's application to a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: RecordId,
    pub job: RecordId,
    /// User id of the applying candidate.
    pub candidate: RecordId,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub job: RecordId,
    pub candidate: RecordId,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    /// Defaults to [`ApplicationStatus::Applied`].
    pub status: Option<ApplicationStatus>,
}

impl NewApplication {
    pub fn new(job: RecordId, candidate: RecordId, cover_letter: impl Into<String>) -> Self {
        Self {
            job,
            candidate,
            cover_letter: cover_letter.into(),
            resume_url: None,
            status: None,
        }
    }

    pub fn with_resume_url(mut self, url: impl Into<String>) -> Self {
        self.resume_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationPatch {
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: Option<ApplicationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_status_roundtrip() {
        for status in [
            ApplicationStatus::Applied,
            ApplicationStatus::Reviewing,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Interviewing,
            ApplicationStatus::Rejected,
            ApplicationStatus::Accepted,
        ] {
            let parsed: ApplicationStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("hired".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_final_states() {
        assert!(!ApplicationStatus::Applied.is_final());
        assert!(!ApplicationStatus::Interviewing.is_final());
        assert!(ApplicationStatus::Rejected.is_final());
        assert!(ApplicationStatus::Accepted.is_final());
    }
}

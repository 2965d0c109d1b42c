use serde::{Deserialize, Serialize};

use crate::id::RecordId;

/// Candidate profile owned by a job-seeker user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSeeker {
    pub id: RecordId,
    pub full_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub resume_url: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
    pub user: Option<RecordId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewJobSeeker {
    pub full_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub resume_url: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
    pub user: Option<RecordId>,
}

impl NewJobSeeker {
    pub fn new(full_name: impl Into<String>, user: RecordId) -> Self {
        Self {
            full_name: full_name.into(),
            user: Some(user),
            ..Self::default()
        }
    }

    pub fn with_skills<S: Into<String>>(mut self, skills: impl IntoIterator<Item = S>) -> Self {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSeekerPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub resume_url: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience_years: Option<f64>,
    pub user: Option<RecordId>,
}

/// Candidate search. Every listed skill must be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerFilters {
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub min_experience: Option<f64>,
}

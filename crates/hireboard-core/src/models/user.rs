use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::id::RecordId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    JobSeeker,
    Employer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::JobSeeker => "jobseeker",
            UserRole::Employer => "employer",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jobseeker" | "job-seeker" | "candidate" => Ok(UserRole::JobSeeker),
            "employer" => Ok(UserRole::Employer),
            "admin" => Ok(UserRole::Admin),
            _ => Err(AppError::ValidationError(format!("Unknown user role: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub role: UserRole,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    pub email: String,
    /// Defaults to [`UserRole::JobSeeker`].
    pub role: Option<UserRole>,
    /// Defaults to `"active"`.
    pub status: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<String>,
}

use serde::Serialize;

use crate::id::RecordId;

/// Company profile owned by an employer user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employer {
    pub id: RecordId,
    pub company_name: String,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub verified: bool,
    pub user: Option<RecordId>,
}

/// Input for creating an employer profile. New profiles are never verified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEmployer {
    pub company_name: String,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub user: Option<RecordId>,
}

impl NewEmployer {
    pub fn new(company_name: impl Into<String>, user: RecordId) -> Self {
        Self {
            company_name: company_name.into(),
            user: Some(user),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployerPatch {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub verified: Option<bool>,
    pub user: Option<RecordId>,
}

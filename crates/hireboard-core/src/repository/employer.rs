use serde::Deserialize;

use crate::error::AppError;
use crate::fields::require_text;
use crate::id::RecordId;
use crate::models::{Employer, EmployerPatch, NewEmployer};
use crate::query::{Condition, Query};
use crate::traits::RecordClient;

use super::{
    RecordBuilder, create_row, delete_rows, fetch_rows, field_list, get_row, lenient, update_row,
};

pub const COLLECTION: &str = "employer_profile_c";

const FIELDS: &[&str] = &[
    "Id",
    "Name",
    "company_name_c",
    "industry_c",
    "company_size_c",
    "website_c",
    "description_c",
    "location_c",
    "verified_c",
    "user_id_c",
];

/// Repository for employer (company) profiles.
#[derive(Debug, Clone)]
pub struct EmployerRepository<C> {
    client: C,
}

impl<C: RecordClient> EmployerRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Vec<Employer>, AppError> {
        let rows: Vec<EmployerRow> =
            fetch_rows(&self.client, COLLECTION, &Query::select(FIELDS)).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<Employer, AppError> {
        let row: EmployerRow =
            get_row(&self.client, COLLECTION, "employer", id, &field_list(FIELDS)).await?;
        Ok(row.into())
    }

    /// Profile owned by the given employer user. When several profiles
    /// reference the same user, the first returned by the backend wins.
    pub async fn get_by_user_id(&self, user: RecordId) -> Result<Employer, AppError> {
        let query = Query::select(FIELDS).filter(Condition::eq("user_id_c", user));
        let rows: Vec<EmployerRow> = fetch_rows(&self.client, COLLECTION, &query).await?;
        rows.into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("employer profile for user {user}")))
    }

    pub async fn create(&self, employer: NewEmployer) -> Result<Employer, AppError> {
        require_text("company name", &employer.company_name)?;

        let record = RecordBuilder::new()
            .set("Name", employer.company_name.trim())
            .set("company_name_c", employer.company_name.trim())
            .set_opt("industry_c", employer.industry)
            .set_opt("company_size_c", employer.company_size)
            .set_opt("website_c", employer.website)
            .set_opt("description_c", employer.description)
            .set_opt("location_c", employer.location)
            .set("verified_c", false)
            .set_opt("user_id_c", employer.user)
            .into_value();

        let row: EmployerRow = create_row(&self.client, COLLECTION, "employer", record).await?;
        Ok(row.into())
    }

    pub async fn update(&self, id: RecordId, patch: EmployerPatch) -> Result<Employer, AppError> {
        if let Some(name) = &patch.company_name {
            require_text("company name", name)?;
        }

        let fields = RecordBuilder::new()
            .set_opt("Name", patch.company_name.clone())
            .set_opt("company_name_c", patch.company_name)
            .set_opt("industry_c", patch.industry)
            .set_opt("company_size_c", patch.company_size)
            .set_opt("website_c", patch.website)
            .set_opt("description_c", patch.description)
            .set_opt("location_c", patch.location)
            .set_opt("verified_c", patch.verified)
            .set_opt("user_id_c", patch.user)
            .into_map();

        let row: EmployerRow = update_row(&self.client, COLLECTION, "employer", id, fields).await?;
        Ok(row.into())
    }

    /// Mark a profile as verified.
    pub async fn verify(&self, id: RecordId) -> Result<Employer, AppError> {
        self.update(
            id,
            EmployerPatch {
                verified: Some(true),
                ..EmployerPatch::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), AppError> {
        delete_rows(&self.client, COLLECTION, &[id]).await
    }
}

#[derive(Debug, Deserialize)]
struct EmployerRow {
    #[serde(rename = "Id")]
    id: RecordId,
    #[serde(rename = "Name", default, deserialize_with = "lenient::opt_text")]
    name: Option<String>,
    #[serde(rename = "company_name_c", default, deserialize_with = "lenient::opt_text")]
    company_name: Option<String>,
    #[serde(rename = "industry_c", default, deserialize_with = "lenient::opt_text")]
    industry: Option<String>,
    #[serde(rename = "company_size_c", default, deserialize_with = "lenient::opt_text")]
    company_size: Option<String>,
    #[serde(rename = "website_c", default, deserialize_with = "lenient::opt_text")]
    website: Option<String>,
    #[serde(rename = "description_c", default, deserialize_with = "lenient::opt_text")]
    description: Option<String>,
    #[serde(rename = "location_c", default, deserialize_with = "lenient::opt_text")]
    location: Option<String>,
    #[serde(rename = "verified_c", default, deserialize_with = "lenient::bool")]
    verified: bool,
    #[serde(rename = "user_id_c", default, deserialize_with = "lenient::opt_ref")]
    user: Option<RecordId>,
}

impl From<EmployerRow> for Employer {
    fn from(row: EmployerRow) -> Self {
        Employer {
            id: row.id,
            company_name: row.company_name.or(row.name).unwrap_or_default(),
            industry: row.industry,
            company_size: row.company_size,
            website: row.website,
            description: row.description,
            location: row.location,
            verified: row.verified,
            user: row.user,
        }
    }
}

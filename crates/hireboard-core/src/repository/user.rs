use serde::Deserialize;

use crate::error::AppError;
use crate::fields::require_text;
use crate::id::RecordId;
use crate::models::{NewUser, User, UserPatch, UserRole};
use crate::query::Query;
use crate::traits::RecordClient;

use super::{
    RecordBuilder, create_row, delete_rows, fetch_rows, field_list, get_row, lenient, parse_enum,
    update_row,
};

pub const COLLECTION: &str = "user_c";

const FIELDS: &[&str] = &["Id", "Name", "email_c", "role_c", "status_c"];

const DEFAULT_STATUS: &str = "active";

#[derive(Debug, Clone)]
pub struct UserRepository<C> {
    client: C,
}

impl<C: RecordClient> UserRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Result<Vec<User>, AppError> {
        let rows: Vec<UserRow> =
            fetch_rows(&self.client, COLLECTION, &Query::select(FIELDS)).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<User, AppError> {
        let row: UserRow =
            get_row(&self.client, COLLECTION, "user", id, &field_list(FIELDS)).await?;
        Ok(row.into())
    }

    pub async fn create(&self, user: NewUser) -> Result<User, AppError> {
        require_text("email", &user.email)?;
        let status = user.status.unwrap_or_else(|| DEFAULT_STATUS.to_string());

        let record = RecordBuilder::new()
            .set("Name", user.email.trim())
            .set("email_c", user.email.trim())
            .set("role_c", user.role.unwrap_or_default().as_str())
            .set("status_c", status)
            .into_value();

        let row: UserRow = create_row(&self.client, COLLECTION, "user", record).await?;
        Ok(row.into())
    }

    pub async fn update(&self, id: RecordId, patch: UserPatch) -> Result<User, AppError> {
        if let Some(email) = &patch.email {
            require_text("email", email)?;
        }

        let fields = RecordBuilder::new()
            .set_opt("Name", patch.email.clone())
            .set_opt("email_c", patch.email)
            .set_opt("role_c", patch.role.map(|r| r.as_str()))
            .set_opt("status_c", patch.status)
            .into_map();

        let row: UserRow = update_row(&self.client, COLLECTION, "user", id, fields).await?;
        Ok(row.into())
    }

    pub async fn update_status(&self, id: RecordId, status: &str) -> Result<User, AppError> {
        require_text("status", status)?;
        self.update(
            id,
            UserPatch {
                status: Some(status.trim().to_string()),
                ..UserPatch::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), AppError> {
        delete_rows(&self.client, COLLECTION, &[id]).await
    }
}

#[derive(Debug, Deserialize)]
struct UserRow {
    #[serde(rename = "Id")]
    id: RecordId,
    #[serde(rename = "Name", default, deserialize_with = "lenient::opt_text")]
    name: Option<String>,
    #[serde(rename = "email_c", default, deserialize_with = "lenient::opt_text")]
    email: Option<String>,
    #[serde(rename = "role_c", default, deserialize_with = "lenient::opt_text")]
    role: Option<String>,
    #[serde(rename = "status_c", default, deserialize_with = "lenient::opt_text")]
    status: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email.or(row.name).unwrap_or_default(),
            role: parse_enum("role_c", row.role.as_deref(), UserRole::JobSeeker),
            status: row.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        }
    }
}

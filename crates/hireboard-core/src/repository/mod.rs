//! Entity repositories over a [`RecordClient`].
//!
//! Each repository owns one record collection: it maps domain fields to the
//! collection's `_c` fields, coerces identifiers, (de)serializes list and
//! timestamp fields, and turns backend envelopes into [`AppError`]s.

pub mod application;
pub mod employer;
pub mod job;
pub mod job_seeker;
pub mod saved_job;
pub mod user;

pub use application::ApplicationRepository;
pub use employer::EmployerRepository;
pub use job::JobRepository;
pub use job_seeker::JobSeekerRepository;
pub use saved_job::SavedJobRepository;
pub use user::UserRepository;

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::id::RecordId;
use crate::query::Query;
use crate::traits::RecordClient;

/// Fetch every record matching `query` and decode it into `T`.
///
/// A record that cannot be decoded is skipped with a warning so one bad row
/// does not hide the rest of the list.
pub(crate) async fn fetch_rows<C, T>(
    client: &C,
    collection: &str,
    query: &Query,
) -> Result<Vec<T>, AppError>
where
    C: RecordClient,
    T: DeserializeOwned,
{
    tracing::debug!(%collection, conditions = query.conditions.len(), "Fetching records");

    let records = client
        .fetch_records(collection, query)
        .await
        .and_then(|envelope| envelope.into_data())
        .inspect_err(|e| tracing::error!(%collection, error = %e, "Fetch failed"))?;

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let id = record.get("Id").cloned();
        match serde_json::from_value::<T>(record) {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::warn!(%collection, id = ?id, error = %e, "Skipping malformed record");
            }
        }
    }
    Ok(rows)
}

/// Fetch one record by id. A missing record is [`AppError::NotFound`].
pub(crate) async fn get_row<C, T>(
    client: &C,
    collection: &str,
    entity: &str,
    id: RecordId,
    fields: &[String],
) -> Result<T, AppError>
where
    C: RecordClient,
    T: DeserializeOwned,
{
    tracing::debug!(%collection, %id, "Fetching record");

    let record = client
        .get_record_by_id(collection, id, fields)
        .await
        .and_then(|envelope| envelope.into_data())
        .inspect_err(|e| tracing::error!(%collection, %id, error = %e, "Lookup failed"))?
        .filter(|record| !record.is_null())
        .ok_or_else(|| AppError::NotFound(format!("{entity} {id}")))?;

    Ok(serde_json::from_value(record)?)
}

/// Create one record and decode the stored result.
pub(crate) async fn create_row<C, T>(
    client: &C,
    collection: &str,
    entity: &str,
    record: Value,
) -> Result<T, AppError>
where
    C: RecordClient,
    T: DeserializeOwned,
{
    let created = client
        .create_records(collection, vec![record])
        .await
        .and_then(|envelope| envelope.into_results())
        .inspect_err(|e| tracing::error!(%collection, error = %e, "Create failed"))?
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| AppError::RemoteFailure(format!("Create {entity} returned no record")))?;

    tracing::info!(%collection, id = ?created.get("Id"), "Created {entity}");
    Ok(serde_json::from_value(created)?)
}

/// Apply a sparse update to one record and decode the stored result.
///
/// A backend that acknowledges the update without returning the record is
/// reported as [`AppError::NotFound`].
pub(crate) async fn update_row<C, T>(
    client: &C,
    collection: &str,
    entity: &str,
    id: RecordId,
    fields: Map<String, Value>,
) -> Result<T, AppError>
where
    C: RecordClient,
    T: DeserializeOwned,
{
    let mut record = fields;
    record.insert("Id".into(), id.into());

    let outcome = client
        .update_records(collection, vec![Value::Object(record)])
        .await
        .and_then(|envelope| envelope.into_results());

    let results = match outcome {
        Ok(results) => results,
        Err(e) => {
            // Backends refuse updates to unknown ids with a per-record failure.
            if matches!(e, AppError::RemoteFailure(_))
                && !record_exists(client, collection, id).await
            {
                return Err(AppError::NotFound(format!("{entity} {id}")));
            }
            tracing::error!(%collection, %id, error = %e, "Update failed");
            return Err(e);
        }
    };

    let updated = results
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| AppError::NotFound(format!("{entity} {id}")))?;

    Ok(serde_json::from_value(updated)?)
}

/// False only when the backend positively answers that `id` is absent.
async fn record_exists<C: RecordClient>(client: &C, collection: &str, id: RecordId) -> bool {
    match client
        .get_record_by_id(collection, id, &[])
        .await
        .and_then(|envelope| envelope.into_data())
    {
        Ok(record) => record.is_some_and(|r| !r.is_null()),
        Err(_) => true,
    }
}

pub(crate) async fn delete_rows<C: RecordClient>(
    client: &C,
    collection: &str,
    ids: &[RecordId],
) -> Result<(), AppError> {
    client
        .delete_records(collection, ids)
        .await
        .and_then(|envelope| envelope.into_results())
        .inspect_err(|e| tracing::error!(%collection, ?ids, error = %e, "Delete failed"))?;

    tracing::info!(%collection, ?ids, "Deleted records");
    Ok(())
}

pub(crate) fn field_list(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

/// Builds the JSON body of a create or sparse update. `None` values are
/// omitted rather than sent as null.
#[derive(Debug, Default)]
pub(crate) struct RecordBuilder(Map<String, Value>);

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn set_opt<V: Into<Value>>(self, field: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(field, v),
            None => self,
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Parse a stored enum value, falling back when absent or unknown.
pub(crate) fn parse_enum<T: FromStr + Copy>(field: &str, raw: Option<&str>, fallback: T) -> T {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => fallback,
        Some(s) => s.parse().unwrap_or_else(|_| {
            tracing::warn!(%field, value = %s, "Unknown enum value, using fallback");
            fallback
        }),
    }
}

/// Deserializers tolerant of the loosely-typed values the backend stores.
pub(crate) mod lenient {
    use super::*;

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        })
    }

    /// Optional reference: null, empty string, or an unresolvable value
    /// become `None`.
    pub fn opt_ref<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RecordId>, D::Error> {
        let raw = Option::<Value>::deserialize(d)?;
        Ok(match raw {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(value) => match serde_json::from_value::<RecordId>(value.clone()) {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(%value, error = %e, "Ignoring unresolvable reference");
                    None
                }
            },
        })
    }

    /// Text field that may be stored as a string, number, or null.
    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }
}

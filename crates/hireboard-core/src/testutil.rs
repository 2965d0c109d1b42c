//! Test utilities: a failure-injecting record client and fixture builders.
//!
//! Handwritten fakes for dependency injection in unit and integration tests.
//! State lives behind `Arc<Mutex<_>>` so clones share it, allowing test
//! assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use crate::error::AppError;
use crate::id::RecordId;
use crate::memory::MemoryRecordClient;
use crate::models::NewJob;
use crate::query::Query;
use crate::traits::{Envelope, MutationEnvelope, RecordClient};

// ---------------------------------------------------------------------------
// FlakyRecordClient
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct FlakyState {
    /// Collection -> failure message for every call on it.
    failing_collections: HashMap<String, String>,
    /// (collection, record id) -> failure message for any call touching it.
    failing_records: HashMap<(String, i64), String>,
    /// (collection, record id) -> latency added to any call touching it.
    delays: HashMap<(String, i64), Duration>,
    calls: usize,
    updates: Vec<Value>,
}

/// In-memory record client with injectable failures and latency.
///
/// A call "touches" a record when it fetches it by id or when the record is
/// part of a query's result set. Failures are reported the way a reachable
/// backend reports them: `Ok` with `success = false`.
#[derive(Debug, Clone, Default)]
pub struct FlakyRecordClient {
    inner: MemoryRecordClient,
    state: Arc<Mutex<FlakyState>>,
}

impl FlakyRecordClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, collection: &str, records: Vec<Value>) {
        self.inner.seed(collection, records);
    }

    /// The wrapped store, for asserting on persisted records.
    pub fn inner(&self) -> &MemoryRecordClient {
        &self.inner
    }

    /// Every call on `collection` reports failure with `message`.
    pub fn fail_collection(&self, collection: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_collections
            .insert(collection.to_string(), message.to_string());
    }

    /// Any call touching record `id` of `collection` reports failure.
    pub fn fail_record(&self, collection: &str, id: i64, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_records
            .insert((collection.to_string(), id), message.to_string());
    }

    /// Any call touching record `id` of `collection` completes after `delay`.
    pub fn delay_record(&self, collection: &str, id: i64, delay: Duration) {
        self.state
            .lock()
            .unwrap()
            .delays
            .insert((collection.to_string(), id), delay);
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing_collections.clear();
        state.failing_records.clear();
    }

    /// Number of calls made through the [`RecordClient`] interface.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    /// First record of the most recent update call.
    pub fn last_update(&self) -> Option<Value> {
        self.state.lock().unwrap().updates.last().cloned()
    }

    /// Count the call and return the collection-wide failure, if any.
    fn begin(&self, collection: &str) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.failing_collections.get(collection).cloned()
    }

    /// Failure and latency for a call touching `ids`.
    fn effects(&self, collection: &str, ids: &[i64]) -> (Option<String>, Duration) {
        let state = self.state.lock().unwrap();
        let key = |id: &i64| (collection.to_string(), *id);
        let failure = ids
            .iter()
            .find_map(|id| state.failing_records.get(&key(id)).cloned());
        let delay = ids
            .iter()
            .filter_map(|id| state.delays.get(&key(id)).copied())
            .max()
            .unwrap_or_default();
        (failure, delay)
    }

    async fn touch(&self, collection: &str, ids: &[i64]) -> Option<String> {
        let (failure, delay) = self.effects(collection, ids);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        failure
    }
}

fn ids_of(records: &[Value]) -> Vec<i64> {
    records
        .iter()
        .filter_map(|r| r.get("Id").and_then(Value::as_i64))
        .collect()
}

fn mutation_failure(message: String) -> MutationEnvelope {
    MutationEnvelope {
        success: false,
        results: Vec::new(),
        message: Some(message),
    }
}

impl RecordClient for FlakyRecordClient {
    async fn fetch_records(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Envelope<Vec<Value>>, AppError> {
        if let Some(message) = self.begin(collection) {
            return Ok(Envelope::failure(message));
        }
        let envelope = self.inner.fetch_records(collection, query).await?;
        if let Some(message) = self.touch(collection, &ids_of(&envelope.data)).await {
            return Ok(Envelope::failure(message));
        }
        Ok(envelope)
    }

    async fn get_record_by_id(
        &self,
        collection: &str,
        id: RecordId,
        fields: &[String],
    ) -> Result<Envelope<Option<Value>>, AppError> {
        if let Some(message) = self.begin(collection) {
            return Ok(Envelope::failure(message));
        }
        if let Some(message) = self.touch(collection, &[id.get()]).await {
            return Ok(Envelope::failure(message));
        }
        self.inner.get_record_by_id(collection, id, fields).await
    }

    async fn create_records(
        &self,
        collection: &str,
        records: Vec<Value>,
    ) -> Result<MutationEnvelope, AppError> {
        if let Some(message) = self.begin(collection) {
            return Ok(mutation_failure(message));
        }
        self.inner.create_records(collection, records).await
    }

    async fn update_records(
        &self,
        collection: &str,
        records: Vec<Value>,
    ) -> Result<MutationEnvelope, AppError> {
        if let Some(message) = self.begin(collection) {
            return Ok(mutation_failure(message));
        }
        if let Some(first) = records.first() {
            self.state.lock().unwrap().updates.push(first.clone());
        }
        if let Some(message) = self.touch(collection, &ids_of(&records)).await {
            return Ok(mutation_failure(message));
        }
        self.inner.update_records(collection, records).await
    }

    async fn delete_records(
        &self,
        collection: &str,
        ids: &[RecordId],
    ) -> Result<MutationEnvelope, AppError> {
        if let Some(message) = self.begin(collection) {
            return Ok(mutation_failure(message));
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        if let Some(message) = self.touch(collection, &raw).await {
            return Ok(mutation_failure(message));
        }
        self.inner.delete_records(collection, ids).await
    }
}

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

pub fn rid(raw: i64) -> RecordId {
    RecordId::new(raw).unwrap()
}

/// A complete `job_listing_c` record owned by employer user `employer`.
pub fn make_job_record(id: i64, title: &str, status: &str, employer: i64) -> Value {
    json!({
        "Id": id,
        "Name": title,
        "title_c": title,
        "description_c": format!("{title} wanted"),
        "category_c": "Engineering",
        "location_c": "Berlin, Germany",
        "employment_type_c": "full-time",
        "experience_level_c": "senior",
        "salary_min_c": 80000,
        "salary_max_c": 110000,
        "requirements_c": "Rust, PostgreSQL",
        "benefits_c": "Remote, Equity",
        "status_c": status,
        "posted_at_c": "2024-01-15T10:00:00Z",
        "employer_id_c": employer
    })
}

pub fn make_employer_record(id: i64, company: &str, user: i64) -> Value {
    json!({
        "Id": id,
        "Name": company,
        "company_name_c": company,
        "industry_c": "Software",
        "company_size_c": "11-50",
        "website_c": format!("https://{}.test", company.to_lowercase()),
        "location_c": "Berlin",
        "verified_c": false,
        "user_id_c": user
    })
}

pub fn make_job_seeker_record(id: i64, full_name: &str, user: i64) -> Value {
    json!({
        "Id": id,
        "Name": full_name,
        "full_name_c": full_name,
        "location_c": "Remote",
        "skills_c": "Rust, Go",
        "total_experience_years_c": 5,
        "user_id_c": user
    })
}

pub fn make_user_record(id: i64, email: &str, role: &str) -> Value {
    json!({
        "Id": id,
        "Name": email,
        "email_c": email,
        "role_c": role,
        "status_c": "active"
    })
}

pub fn make_application_record(id: i64, job: i64, candidate: i64, applied_at: &str) -> Value {
    json!({
        "Id": id,
        "Name": format!("Application for Job {job}"),
        "job_id_c": job,
        "candidate_id_c": candidate,
        "cover_letter_c": "I would be a great fit.",
        "status_c": "applied",
        "applied_at_c": applied_at,
        "updated_at_c": applied_at
    })
}

pub fn make_saved_job_record(id: i64, job: i64, candidate: i64, saved_at: &str) -> Value {
    json!({
        "Id": id,
        "Name": format!("Saved Job {job}"),
        "job_id_c": job,
        "candidate_id_c": candidate,
        "saved_at_c": saved_at
    })
}

/// A `NewJob` with every required field populated.
pub fn make_new_job() -> NewJob {
    NewJob::new(
        "Platform Engineer",
        "Own the deployment pipeline.",
        "Engineering",
        "Remote",
        "full-time",
        "mid",
    )
}

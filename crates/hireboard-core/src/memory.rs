//! In-process record backend.
//!
//! Implements the full [`RecordClient`] contract over `Vec<Value>` collections
//! so repositories and aggregations run without a network. Backs the CLI
//! fixture mode and the test suite.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use crate::error::AppError;
use crate::id::RecordId;
use crate::query::{Query, SortDirection};
use crate::traits::{Envelope, MutationEnvelope, MutationResult, RecordClient};

type Collections = BTreeMap<String, Vec<Value>>;

#[derive(Debug, Clone, Default)]
pub struct MemoryRecordClient {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryRecordClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a JSON document shaped `{ "<collection>": [records...] }`.
    pub fn from_json(document: Value) -> Result<Self, AppError> {
        let Value::Object(map) = document else {
            return Err(AppError::ValidationError(
                "fixture must be a JSON object keyed by collection name".into(),
            ));
        };

        let mut collections = Collections::new();
        for (name, records) in map {
            let Value::Array(records) = records else {
                return Err(AppError::ValidationError(format!(
                    "fixture collection '{name}' must be an array"
                )));
            };
            collections.insert(name, records);
        }

        Ok(Self {
            collections: Arc::new(Mutex::new(collections)),
        })
    }

    /// Load a fixture file (see [`from_json`](Self::from_json)).
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read fixture {}: {e}", path.display()))
        })?;
        Self::from_json(serde_json::from_str(&raw)?)
    }

    /// Insert raw records as-is, bypassing id assignment.
    pub fn seed(&self, collection: &str, records: Vec<Value>) {
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .extend(records);
    }

    /// Snapshot of a collection's stored records.
    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.lock().get(collection).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn record_id(record: &Value) -> Option<i64> {
    record.get("Id").and_then(Value::as_i64)
}

fn project(record: &Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return record.clone();
    }
    let Value::Object(map) = record else {
        return record.clone();
    };
    let projected: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| key.as_str() == "Id" || fields.iter().any(|f| f == *key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(projected)
}

fn sort_key(record: &Value, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => format!("{:020.6}", n.as_f64().unwrap_or_default()),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

impl RecordClient for MemoryRecordClient {
    async fn fetch_records(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Envelope<Vec<Value>>, AppError> {
        let collections = self.lock();
        let mut rows: Vec<Value> = collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| query.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for order in query.order_by.iter().rev() {
            rows.sort_by(|a, b| {
                let ordering = sort_key(a, &order.field).cmp(&sort_key(b, &order.field));
                match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        Ok(Envelope::ok(
            rows.iter().map(|r| project(r, &query.fields)).collect(),
        ))
    }

    async fn get_record_by_id(
        &self,
        collection: &str,
        id: RecordId,
        fields: &[String],
    ) -> Result<Envelope<Option<Value>>, AppError> {
        let collections = self.lock();
        let found = collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| record_id(r) == Some(id.get())))
            .map(|r| project(r, fields));
        Ok(Envelope::ok(found))
    }

    async fn create_records(
        &self,
        collection: &str,
        records: Vec<Value>,
    ) -> Result<MutationEnvelope, AppError> {
        let mut collections = self.lock();
        let stored = collections.entry(collection.to_string()).or_default();
        let mut next_id = stored.iter().filter_map(record_id).max().unwrap_or(0) + 1;

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let Value::Object(mut map) = record else {
                results.push(MutationResult {
                    success: false,
                    data: None,
                    message: Some("record must be a JSON object".into()),
                });
                continue;
            };
            map.insert("Id".into(), Value::from(next_id));
            next_id += 1;
            let record = Value::Object(map);
            stored.push(record.clone());
            results.push(MutationResult {
                success: true,
                data: Some(record),
                message: None,
            });
        }

        Ok(MutationEnvelope {
            success: true,
            results,
            message: None,
        })
    }

    async fn update_records(
        &self,
        collection: &str,
        records: Vec<Value>,
    ) -> Result<MutationEnvelope, AppError> {
        let mut collections = self.lock();
        let stored = collections.entry(collection.to_string()).or_default();

        let results = records
            .into_iter()
            .map(|patch| {
                let Some(id) = record_id(&patch) else {
                    return MutationResult {
                        success: false,
                        data: None,
                        message: Some("update requires an integer Id".into()),
                    };
                };
                let Some(Value::Object(target)) =
                    stored.iter_mut().find(|r| record_id(r) == Some(id))
                else {
                    return MutationResult {
                        success: false,
                        data: None,
                        message: Some(format!("Record {id} does not exist")),
                    };
                };
                if let Value::Object(fields) = patch {
                    for (key, value) in fields {
                        target.insert(key, value);
                    }
                }
                MutationResult {
                    success: true,
                    data: Some(Value::Object(target.clone())),
                    message: None,
                }
            })
            .collect();

        Ok(MutationEnvelope {
            success: true,
            results,
            message: None,
        })
    }

    async fn delete_records(
        &self,
        collection: &str,
        ids: &[RecordId],
    ) -> Result<MutationEnvelope, AppError> {
        let mut collections = self.lock();
        let stored = collections.entry(collection.to_string()).or_default();

        let results = ids
            .iter()
            .map(|id| {
                let before = stored.len();
                stored.retain(|r| record_id(r) != Some(id.get()));
                if stored.len() < before {
                    MutationResult {
                        success: true,
                        data: None,
                        message: None,
                    }
                } else {
                    MutationResult {
                        success: false,
                        data: None,
                        message: Some(format!("Record {id} does not exist")),
                    }
                }
            })
            .collect();

        Ok(MutationEnvelope {
            success: true,
            results,
            message: None,
        })
    }
}

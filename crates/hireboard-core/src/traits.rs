use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::id::RecordId;
use crate::query::Query;

/// Response envelope returned by every read on the record backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Unwrap the payload, turning `success = false` into [`AppError::RemoteFailure`].
    pub fn into_data(self) -> Result<T, AppError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(AppError::RemoteFailure(
                self.message
                    .unwrap_or_else(|| "record client reported failure".to_string()),
            ))
        }
    }
}

impl<T: Default> Envelope<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: T::default(),
            message: Some(message.into()),
        }
    }
}

/// Per-record outcome of a create/update/delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response envelope for mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationEnvelope {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<MutationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MutationEnvelope {
    /// Collect the per-record payloads. Fails on an envelope-level failure or
    /// on the first failed record.
    pub fn into_results(self) -> Result<Vec<Option<Value>>, AppError> {
        if !self.success {
            return Err(AppError::RemoteFailure(
                self.message
                    .unwrap_or_else(|| "record client reported failure".to_string()),
            ));
        }
        if let Some(failed) = self.results.iter().find(|r| !r.success) {
            return Err(AppError::RemoteFailure(
                failed
                    .message
                    .clone()
                    .unwrap_or_else(|| "record operation failed".to_string()),
            ));
        }
        Ok(self.results.into_iter().map(|r| r.data).collect())
    }
}

/// Generic CRUD over named record collections on the backend-as-a-service.
///
/// `Err` is a transport failure. A reachable backend that refuses the request
/// answers `Ok` with `success = false`; repositories turn that into
/// [`AppError::RemoteFailure`].
pub trait RecordClient: Send + Sync + Clone {
    fn fetch_records(
        &self,
        collection: &str,
        query: &Query,
    ) -> impl Future<Output = Result<Envelope<Vec<Value>>, AppError>> + Send;

    fn get_record_by_id(
        &self,
        collection: &str,
        id: RecordId,
        fields: &[String],
    ) -> impl Future<Output = Result<Envelope<Option<Value>>, AppError>> + Send;

    fn create_records(
        &self,
        collection: &str,
        records: Vec<Value>,
    ) -> impl Future<Output = Result<MutationEnvelope, AppError>> + Send;

    /// Sparse update: each record carries `Id` plus only the fields to change.
    fn update_records(
        &self,
        collection: &str,
        records: Vec<Value>,
    ) -> impl Future<Output = Result<MutationEnvelope, AppError>> + Send;

    fn delete_records(
        &self,
        collection: &str,
        ids: &[RecordId],
    ) -> impl Future<Output = Result<MutationEnvelope, AppError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_failure_becomes_remote_failure() {
        let env: Envelope<Vec<Value>> =
            serde_json::from_value(json!({"success": false, "message": "bad token"})).unwrap();
        let err = env.into_data().unwrap_err();
        assert!(matches!(err, AppError::RemoteFailure(ref m) if m == "bad token"));
    }

    #[test]
    fn test_envelope_missing_data_defaults() {
        let env: Envelope<Vec<Value>> = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(env.into_data().unwrap().is_empty());

        let env: Envelope<Option<Value>> =
            serde_json::from_value(json!({"success": true, "data": null})).unwrap();
        assert!(env.into_data().unwrap().is_none());
    }

    #[test]
    fn test_mutation_first_failed_result_wins() {
        let env: MutationEnvelope = serde_json::from_value(json!({
            "success": true,
            "results": [
                {"success": true, "data": {"Id": 1}},
                {"success": false, "message": "title_c is required"},
                {"success": false, "message": "second failure"}
            ]
        }))
        .unwrap();
        let err = env.into_results().unwrap_err();
        assert!(matches!(err, AppError::RemoteFailure(ref m) if m == "title_c is required"));
    }

    #[test]
    fn test_mutation_success_yields_payloads() {
        let env: MutationEnvelope = serde_json::from_value(json!({
            "success": true,
            "results": [{"success": true, "data": {"Id": 4}}]
        }))
        .unwrap();
        let results = env.into_results().unwrap();
        assert_eq!(results, vec![Some(json!({"Id": 4}))]);
    }
}

use std::fmt;

use hireboard_core::error::AppError;
use hireboard_core::id::RecordId;
use hireboard_core::query::Query;
use hireboard_core::traits::{Envelope, MutationEnvelope, RecordClient};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::RecordClientConfig;

/// Record client speaking JSON over HTTP to the hosted backend.
///
/// Each collection lives under `{base}/collections/{name}`: queries are
/// `POST .../query`, single reads `GET .../records/{id}`, and mutations
/// `POST`/`PATCH`/`DELETE .../records`.
#[derive(Clone)]
pub struct HttpRecordClient {
    client: Client,
    base_url: Url,
    project_id: String,
    public_key: String,
    timeout_secs: u64,
}

impl HttpRecordClient {
    pub fn new(config: &RecordClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("hireboard/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            project_id: config.project_id.clone(),
            public_key: config.public_key.clone(),
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// `{base}/collections/{collection}/{segments...}` with each segment
    /// percent-encoded.
    fn url(&self, collection: &str, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::ConfigError(format!("Base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push("collections")
            .push(collection)
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Project-Id", &self.project_id)
            .header("Authorization", format!("Bearer {}", self.public_key))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, AppError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            tracing::error!(
                status = status_code,
                %what,
                %message,
                "Record backend rejected request"
            );
            return Err(AppError::HttpError(format!("HTTP {status_code}: {message}")));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse {what} response: {e}")))
    }
}

impl fmt::Debug for HttpRecordClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRecordClient")
            .field("base_url", &self.base_url.as_str())
            .field("project_id", &self.project_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

// ---- Wire types ----

#[derive(Serialize)]
struct RecordsBody {
    records: Vec<Value>,
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    #[serde(rename = "RecordIds")]
    record_ids: &'a [RecordId],
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl RecordClient for HttpRecordClient {
    async fn fetch_records(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Envelope<Vec<Value>>, AppError> {
        let url = self.url(collection, &["query"])?;
        tracing::debug!(%collection, conditions = query.conditions.len(), "POST query");
        self.send(self.client.post(url).json(query), "query").await
    }

    async fn get_record_by_id(
        &self,
        collection: &str,
        id: RecordId,
        fields: &[String],
    ) -> Result<Envelope<Option<Value>>, AppError> {
        let id = id.to_string();
        let mut url = self.url(collection, &["records", &id])?;
        if !fields.is_empty() {
            url.query_pairs_mut().append_pair("fields", &fields.join(","));
        }
        self.send(self.client.get(url), "get").await
    }

    async fn create_records(
        &self,
        collection: &str,
        records: Vec<Value>,
    ) -> Result<MutationEnvelope, AppError> {
        let url = self.url(collection, &["records"])?;
        self.send(self.client.post(url).json(&RecordsBody { records }), "create")
            .await
    }

    async fn update_records(
        &self,
        collection: &str,
        records: Vec<Value>,
    ) -> Result<MutationEnvelope, AppError> {
        let url = self.url(collection, &["records"])?;
        self.send(self.client.patch(url).json(&RecordsBody { records }), "update")
            .await
    }

    async fn delete_records(
        &self,
        collection: &str,
        ids: &[RecordId],
    ) -> Result<MutationEnvelope, AppError> {
        let url = self.url(collection, &["records"])?;
        self.send(
            self.client.delete(url).json(&DeleteBody { record_ids: ids }),
            "delete",
        )
        .await
    }
}

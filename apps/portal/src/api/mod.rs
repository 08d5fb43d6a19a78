//! Resilient resource client.
//!
//! ARCHITECTURAL RULE: no other module talks to the backend directly. Every
//! HTTP interaction goes through `ApiClient`, which owns the candidate
//! fallback walk and response-shape normalization, so route quirks never leak
//! into the rest of the crate.

pub mod routes;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::ClientError;
use crate::models::document::{Document, DocumentPatch, FileUpload, NewProject};
use crate::models::jobs::{JobMatchRequest, JobMatchResponse};

use routes::RouteTable;
use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Payload, Transport};

/// What happens when every candidate for a quiet operation (list, update,
/// delete) has failed. Create, profile generation, job matching and chat
/// always surface their failures regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Swallow the exhaustion: lists come back empty, update/delete report
    /// "not applied" without an error. Matches the shipped UI behavior.
    #[default]
    Silent,
    /// Turn exhaustion into an error for every operation.
    Surface,
}

/// Client for a backend whose exact routes and response shapes are not fully
/// pinned down: each operation walks an ordered candidate list and stops at
/// the first success, and list bodies are normalized to one canonical shape.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    routes: RouteTable,
    failure_mode: FailureMode,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_transport(
            Arc::new(HttpTransport::new(Duration::from_secs(
                config.request_timeout_secs,
            ))),
            RouteTable::new(config.api_base.clone()),
            config.failure_mode,
        )
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        routes: RouteTable,
        failure_mode: FailureMode,
    ) -> Self {
        Self {
            transport,
            routes,
            failure_mode,
        }
    }

    /// Lists documents, optionally narrowed to one `doc_type`.
    ///
    /// The type filter is re-applied client-side because some deployments
    /// ignore the query parameter; comparison is case-insensitive and
    /// trimmed, and server order is preserved.
    pub async fn list_documents(&self, doc_type: Option<&str>) -> Result<Vec<Document>, ClientError> {
        let candidates = self.routes.list_documents(doc_type);
        self.list_filtered("list documents", candidates, doc_type)
            .await
    }

    pub async fn list_projects(&self) -> Result<Vec<Document>, ClientError> {
        self.list_filtered("list projects", self.routes.list_projects(), Some("PROJECT"))
            .await
    }

    /// Uploads a file-backed document. Validation (extension, size) happens
    /// before any network attempt; encoding is multipart.
    pub async fn create_document(&self, upload: FileUpload) -> Result<Document, ClientError> {
        upload.validate()?;
        let payload = upload.into_payload();
        let response = self
            .probe("create document", Method::Post, &self.routes.create(), payload)
            .await?;
        Ok(serde_json::from_value(response.body)?)
    }

    /// Creates a link-only PROJECT entry. `title` and `external_url` are
    /// required; encoding is JSON.
    pub async fn create_project(&self, project: &NewProject) -> Result<Document, ClientError> {
        project.validate()?;
        let payload = Payload::Json(project.to_body());
        let response = self
            .probe("create project", Method::Post, &self.routes.create(), payload)
            .await?;
        Ok(serde_json::from_value(response.body)?)
    }

    /// Applies a partial edit. Returns `true` when some candidate accepted
    /// it, `false` when every candidate failed under `FailureMode::Silent` —
    /// the caller must then discard the edit.
    pub async fn update_document(
        &self,
        id: i64,
        patch: &DocumentPatch,
    ) -> Result<bool, ClientError> {
        let payload = Payload::Json(serde_json::to_value(patch)?);
        match self
            .probe("update document", Method::Patch, &self.routes.update(id), payload)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if self.failure_mode == FailureMode::Silent => {
                warn!(id, error = %e, "update not applied");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes by id. Same success/silence contract as `update_document`.
    pub async fn delete_document(&self, id: i64) -> Result<bool, ClientError> {
        match self
            .probe(
                "delete document",
                Method::Delete,
                &self.routes.delete(id),
                Payload::Empty,
            )
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if self.failure_mode == FailureMode::Silent => {
                warn!(id, error = %e, "delete not applied");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// POST `/profile/generate/`. Returns the raw response object, expected
    /// to contain a `profile` member (plus an `html` rendering this client
    /// ignores).
    pub async fn generate_profile(&self) -> Result<Value, ClientError> {
        self.call_single(
            "generate profile",
            Method::Post,
            self.routes.generate_profile(),
            Payload::Empty,
        )
        .await
    }

    pub async fn match_jobs(
        &self,
        request: &JobMatchRequest,
    ) -> Result<JobMatchResponse, ClientError> {
        let body = self
            .call_single(
                "match jobs",
                Method::Post,
                self.routes.match_jobs(),
                Payload::Json(serde_json::to_value(request)?),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// POST `/agent/chat/` with `{message}`. Returns the reply text when the
    /// backend supplied one.
    pub async fn chat(&self, message: &str) -> Result<Option<String>, ClientError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ClientError::Validation("message is required".into()));
        }
        let body = self
            .call_single(
                "chat",
                Method::Post,
                self.routes.chat(),
                Payload::Json(json!({ "message": message })),
            )
            .await?;
        Ok(body
            .get("reply")
            .and_then(Value::as_str)
            .map(str::to_owned))
    }

    async fn list_filtered(
        &self,
        operation: &'static str,
        candidates: Vec<String>,
        doc_type: Option<&str>,
    ) -> Result<Vec<Document>, ClientError> {
        match self.fetch_sequence(operation, &candidates).await {
            Ok(items) => {
                let docs = items.into_iter().filter_map(|item| {
                    match serde_json::from_value::<Document>(item) {
                        Ok(doc) => Some(doc),
                        Err(e) => {
                            warn!(operation, error = %e, "skipping undecodable item");
                            None
                        }
                    }
                });
                Ok(match doc_type {
                    Some(t) => docs.filter(|d| d.matches_type(t)).collect(),
                    None => docs.collect(),
                })
            }
            Err(e) if self.failure_mode == FailureMode::Silent => {
                warn!(operation, error = %e, "all candidates failed; returning empty list");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Walks the candidates until one returns a 2xx body that is either a
    /// bare array or a `results`-wrapped array. A 2xx with any other shape
    /// counts as a non-match and the walk continues.
    async fn fetch_sequence(
        &self,
        operation: &'static str,
        candidates: &[String],
    ) -> Result<Vec<Value>, ClientError> {
        let mut last = String::from("no candidates configured");
        for url in candidates {
            let request = ApiRequest {
                method: Method::Get,
                url: url.clone(),
                payload: Payload::Empty,
            };
            match self.transport.execute(&request).await {
                Ok(response) if response.is_success() => match decode_sequence(&response.body) {
                    Some(items) => {
                        debug!(operation, %url, count = items.len(), "candidate accepted");
                        return Ok(items);
                    }
                    None => {
                        warn!(operation, %url, "candidate returned an unrecognized shape");
                        last = format!("{url} returned an unrecognized shape");
                    }
                },
                Ok(response) => {
                    warn!(operation, %url, status = response.status, "candidate rejected");
                    last = format!("{url} returned HTTP {}", response.status);
                }
                Err(e) => {
                    warn!(operation, %url, error = %e, "candidate unreachable");
                    last = format!("{url}: {e}");
                }
            }
        }
        Err(ClientError::Exhausted {
            operation,
            attempts: candidates.len(),
            last,
        })
    }

    /// Shared candidate walk for write operations: first 2xx wins and the
    /// remaining candidates are never attempted. No per-candidate retries.
    async fn probe(
        &self,
        operation: &'static str,
        method: Method,
        candidates: &[String],
        payload: Payload,
    ) -> Result<ApiResponse, ClientError> {
        let mut last = String::from("no candidates configured");
        for url in candidates {
            let request = ApiRequest {
                method,
                url: url.clone(),
                payload: payload.clone(),
            };
            match self.transport.execute(&request).await {
                Ok(response) if response.is_success() => {
                    debug!(operation, %url, status = response.status, "candidate accepted");
                    return Ok(response);
                }
                Ok(response) => {
                    warn!(operation, %url, status = response.status, "candidate rejected");
                    last = response.error_message();
                }
                Err(e) => {
                    warn!(operation, %url, error = %e, "candidate unreachable");
                    last = format!("{url}: {e}");
                }
            }
        }
        Err(ClientError::Exhausted {
            operation,
            attempts: candidates.len(),
            last,
        })
    }

    /// Fixed-route operations have no fallback; failures always surface,
    /// carrying the server's `detail` message when one is present.
    async fn call_single(
        &self,
        operation: &'static str,
        method: Method,
        url: String,
        payload: Payload,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest {
            method,
            url,
            payload,
        };
        let response = self
            .transport
            .execute(&request)
            .await
            .map_err(|e| ClientError::Transport(format!("{operation}: {e}")))?;
        if !response.is_success() {
            return Err(ClientError::Api {
                status: response.status,
                message: response.error_message(),
            });
        }
        Ok(response.body)
    }
}

/// The two list shapes the backend is known to produce.
fn decode_sequence(body: &Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items.clone()),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => Some(items.clone()),
            _ => None,
        },
        _ => None,
    }
}

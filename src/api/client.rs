use crate::api::models::{
    AckEnvelope, BatchRequest, ListEnvelope, Queue, QueuePage, RecordStatus, StatusUpdateRequest,
};
use crate::config::Config;
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Errors from API calls. `ServerRejected` covers both non-2xx responses and
/// `{success: false}` bodies; in either case the caller keeps its selection
/// so the operation can be retried.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not reach the server at {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// Displays as the bare server message so it can be shown to the
    /// operator verbatim; endpoint and status are logged where the error
    /// is constructed.
    #[error("{message}")]
    ServerRejected { message: String },
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API token contains characters that cannot be sent in a header")]
    InvalidToken,
}

/// Blocking client for the registration API. Cheap to clone via `Arc`; the
/// request timeout from the config bounds every call.
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network {
                endpoint: "client_init".to_string(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one page of a queue.
    pub fn list(&self, queue: Queue, page: u32, page_size: u32) -> Result<QueuePage, ApiError> {
        let endpoint = queue.list_path();
        let mut query: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        if let Some(status) = queue.status_filter() {
            query.push(("status", status.to_string()));
        }

        tracing::debug!(endpoint, page, "fetching queue page");
        let response = self
            .http
            .get(format!("{}{}", self.base_url, endpoint))
            .query(&query)
            .send()
            .map_err(|e| ApiError::Network {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        let envelope: ListEnvelope = Self::decode(endpoint, response)?;
        if !envelope.success {
            tracing::warn!(endpoint, "list endpoint reported failure");
            return Err(ApiError::ServerRejected {
                message: envelope
                    .error
                    .unwrap_or_else(|| "list request failed".to_string()),
            });
        }

        Ok(QueuePage {
            rows: envelope.data,
            meta: envelope.meta.unwrap_or_default(),
            summary: envelope.summary,
        })
    }

    /// Apply a batch action to `ids` in one request. Returns the number of
    /// records the action covered; the contract is all-or-nothing, the
    /// server does not report per-id results.
    pub fn batch(&self, endpoint: &str, ids: &[u64]) -> Result<usize, ApiError> {
        tracing::info!(endpoint, count = ids.len(), "sending batch request");
        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .json(&BatchRequest { ids: ids.to_vec() })
            .send()
            .map_err(|e| ApiError::Network {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        Self::check_ack(endpoint, response, "batch action failed")?;
        Ok(ids.len())
    }

    /// Update a single membership application's review status.
    pub fn update_status(
        &self,
        id: u64,
        status: RecordStatus,
        notes: Option<String>,
    ) -> Result<(), ApiError> {
        let endpoint = format!("/api/membership-applications/{id}/status");
        tracing::info!(id, ?status, "updating application status");
        let response = self
            .http
            .patch(format!("{}{}", self.base_url, endpoint))
            .json(&StatusUpdateRequest {
                status,
                organization_id: None,
                notes,
            })
            .send()
            .map_err(|e| ApiError::Network {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        Self::check_ack(&endpoint, response, "status update failed")
    }

    /// Delete a single beneficiary record.
    pub fn delete_beneficiary(&self, id: u64) -> Result<(), ApiError> {
        let endpoint = format!("/api/beneficiaries/{id}");
        tracing::info!(id, "deleting beneficiary");
        let response = self
            .http
            .delete(format!("{}{}", self.base_url, endpoint))
            .send()
            .map_err(|e| ApiError::Network {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        Self::check_ack(&endpoint, response, "delete failed")
    }

    fn check_ack(endpoint: &str, response: Response, fallback: &str) -> Result<(), ApiError> {
        let ack: AckEnvelope = Self::decode(endpoint, response)?;
        if !ack.success {
            tracing::warn!(endpoint, "mutation endpoint reported failure");
            return Err(ApiError::ServerRejected {
                message: ack.error.unwrap_or_else(|| fallback.to_string()),
            });
        }
        Ok(())
    }

    fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "request rejected");
            // Prefer the server's own error message when the body carries one.
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<AckEnvelope>(&body)
                .ok()
                .and_then(|ack| ack.error)
                .unwrap_or_else(|| format!("server returned {status}"));
            return Err(ApiError::ServerRejected { message });
        }

        response.json().map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

/// HTTP client for the detail-library backend.
///
/// Every call is wrapped so that transport failures, non-2xx responses and
/// undecodable bodies all come back as a classified [`ApiError`]. The one
/// exception is autocomplete, which is best-effort and degrades to an empty
/// suggestion list instead of failing.
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ErrorKind};
use crate::model::{
    AutocompleteResponse, Detail, SecureIdentity, ServiceInfo, SuggestionContext,
    SuggestionResult,
};

/// Backend operations consumed by the interaction controllers.
#[async_trait]
pub trait DetailApi: Send + Sync {
    /// `GET /details`
    async fn list_details(&self) -> Result<Vec<Detail>, ApiError>;

    /// `GET /details/search?q=`
    async fn search_details(&self, query: &str) -> Result<Vec<Detail>, ApiError>;

    /// `GET /details/autocomplete?q=`. Never fails; any error yields an empty list.
    async fn autocomplete(&self, query: &str) -> Vec<String>;

    /// `POST /suggest-detail-rag`
    async fn suggest_detail(
        &self,
        context: &SuggestionContext,
    ) -> Result<SuggestionResult, ApiError>;

    /// `GET /secure/details` with `X-User-Role` / `X-User-Email` headers.
    async fn fetch_secure_details(
        &self,
        identity: &SecureIdentity,
    ) -> Result<Vec<Detail>, ApiError>;

    /// `POST /generate-embeddings`. The response shape is up to the backend.
    async fn generate_embeddings(&self) -> Result<serde_json::Value, ApiError>;

    /// `GET /`
    async fn service_info(&self) -> Result<ServiceInfo, ApiError>;
}

#[derive(Clone)]
pub struct HttpDetailApi {
    config: ApiConfig,
    http: reqwest::Client,
}

impl HttpDetailApi {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("detail-library/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ApiError::new(ErrorKind::Unknown, 0, format!("failed to build http client: {e}"))
            })?;
        Ok(Self { config, http })
    }

    /// Send the request and return the decoded JSON body of a 2xx response.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let (status, body) = self.fetch_body(request).await?;
        serde_json::from_slice(&body).map_err(|e| {
            ApiError::decode(status.as_u16(), format!("invalid response JSON: {e}"))
        })
    }

    async fn fetch_body(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::network(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(to_api_error(resp, self.config.max_error_body_bytes).await);
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("failed to read response body: {e}")))?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl DetailApi for HttpDetailApi {
    async fn list_details(&self) -> Result<Vec<Detail>, ApiError> {
        let url = self.config.url("/details");
        self.fetch_json(self.http.get(&url)).await
    }

    async fn search_details(&self, query: &str) -> Result<Vec<Detail>, ApiError> {
        let url = self.config.url("/details/search");
        debug!(query, "searching details");
        self.fetch_json(self.http.get(&url).query(&[("q", query)]))
            .await
    }

    async fn autocomplete(&self, query: &str) -> Vec<String> {
        let url = self.config.url("/details/autocomplete");
        match self
            .fetch_json::<AutocompleteResponse>(self.http.get(&url).query(&[("q", query)]))
            .await
        {
            Ok(resp) => resp.suggestions,
            Err(e) => {
                warn!(
                    query,
                    kind = %e.kind,
                    status = e.status,
                    error = %e,
                    "autocomplete failed, returning no suggestions"
                );
                Vec::new()
            }
        }
    }

    async fn suggest_detail(
        &self,
        context: &SuggestionContext,
    ) -> Result<SuggestionResult, ApiError> {
        let url = self.config.url("/suggest-detail-rag");
        let (status, body) = self.fetch_body(self.http.post(&url).json(context)).await?;
        let value: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            ApiError::decode(status.as_u16(), format!("invalid response JSON: {e}"))
        })?;
        SuggestionResult::from_value(value)
            .map_err(|e| ApiError::decode(status.as_u16(), e.to_string()))
    }

    async fn fetch_secure_details(
        &self,
        identity: &SecureIdentity,
    ) -> Result<Vec<Detail>, ApiError> {
        let url = self.config.url("/secure/details");
        self.fetch_json(
            self.http
                .get(&url)
                .header("X-User-Role", &identity.role)
                .header("X-User-Email", &identity.email),
        )
        .await
    }

    async fn generate_embeddings(&self) -> Result<serde_json::Value, ApiError> {
        let url = self.config.url("/generate-embeddings");
        let (status, body) = self.fetch_body(self.http.post(&url)).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| {
            ApiError::decode(status.as_u16(), format!("invalid response JSON: {e}"))
        })
    }

    async fn service_info(&self) -> Result<ServiceInfo, ApiError> {
        let url = self.config.url("/");
        self.fetch_json(self.http.get(&url)).await
    }
}

/// Build a classified error from a non-2xx response.
///
/// FastAPI reports failures as `{"detail": "..."}` or, for validation errors,
/// `{"detail": [{"msg": "..."}, ...]}`; either form becomes the message.
async fn to_api_error(resp: reqwest::Response, max_error_body_bytes: usize) -> ApiError {
    let status = resp.status();
    let body = read_limited_text(resp, max_error_body_bytes).await;
    let message = error_detail(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body
        }
    });
    ApiError::from_status(status.as_u16(), message)
}

fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(b) => String::from_utf8_lossy(truncate_utf8(&b, max_bytes)).into_owned(),
        Err(e) => {
            warn!(error = %e, "failed to read error body");
            String::new()
        }
    }
}

/// Cut `bytes` to at most `max_bytes`, backing off so a multi-byte UTF-8
/// sequence is never split.
fn truncate_utf8(bytes: &[u8], max_bytes: usize) -> &[u8] {
    if bytes.len() <= max_bytes {
        return bytes;
    }
    let mut end = max_bytes;
    // Continuation bytes are 0b10xxxxxx.
    while end > 0 && (bytes[end] & 0xC0) == 0x80 {
        end -= 1;
    }
    &bytes[..end]
}

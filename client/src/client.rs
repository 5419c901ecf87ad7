//! Request execution: URL building, auth headers, retry with backoff.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use modaics_common::ApiSettings;

use crate::auth::{TokenError, TokenProvider};
use crate::cache::ImageCache;
use crate::error::{ApiError, ApiResult};
use crate::multipart::MultipartForm;
use crate::transport::{HttpMethod, HttpResponse, HttpTransport, RequestAttempt, ReqwestTransport};

/// Encoded request payload.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Bytes),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> ApiResult<Self> {
        serde_json::to_vec(value)
            .map(|v| Self::Json(Bytes::from(v)))
            .map_err(|e| ApiError::EncodingError(e.to_string()))
    }

    fn encode(&self) -> (Bytes, Option<String>) {
        match self {
            Self::Empty => (Bytes::new(), None),
            Self::Json(bytes) => (bytes.clone(), Some("application/json".to_string())),
            Self::Multipart(form) => (form.encode(), Some(form.content_type())),
        }
    }
}

/// Where a call is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Relative path under `{base_url}/api/{version}/`
    Versioned(String),
    /// Fully-qualified URL (CDN images); sent without the prefix
    Absolute(String),
}

impl Endpoint {
    fn path(&self) -> &str {
        match self {
            Self::Versioned(path) | Self::Absolute(path) => path,
        }
    }
}

/// How one HTTP status is handled by the retry loop.
enum Outcome {
    Success(Bytes),
    Unauthorized,
    /// Retried only when [`ApiError::is_retryable`] says so.
    Failed(ApiError),
}

/// Authenticated client for the Modaics API.
///
/// Cheap to share behind an `Arc`; it holds no per-call state.
pub struct ApiClient {
    settings: ApiSettings,
    transport: Arc<dyn HttpTransport>,
    tokens: Option<Arc<dyn TokenProvider>>,
    images: ImageCache,
}

impl ApiClient {
    /// Client backed by `reqwest`, configured from `settings`.
    pub fn new(settings: ApiSettings) -> ApiResult<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(settings.timeout_secs), &settings.user_agent)?;
        Ok(Self::with_transport(settings, Arc::new(transport)))
    }

    pub fn with_transport(settings: ApiSettings, transport: Arc<dyn HttpTransport>) -> Self {
        let images = ImageCache::new(settings.image_cache_capacity);
        info!(
            "API client targeting {} (api {}, {} attempts)",
            settings.base_url, settings.api_version, settings.retry_count
        );
        Self {
            settings,
            transport,
            tokens: None,
            images,
        }
    }

    pub fn with_token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    pub fn image_cache(&self) -> &ImageCache {
        &self.images
    }

    /// Build the absolute URL for an endpoint.
    ///
    /// Versioned paths become `{base_url}/api/{api_version}/{path}`.
    pub fn resolve_url(&self, endpoint: &Endpoint) -> ApiResult<String> {
        let raw = match endpoint {
            Endpoint::Versioned(path) => format!(
                "{}/api/{}/{}",
                self.settings.base_url.trim_end_matches('/'),
                self.settings.api_version.trim_matches('/'),
                path.trim_start_matches('/')
            ),
            Endpoint::Absolute(url) => url.clone(),
        };

        let url = reqwest::Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url.to_string()),
            other => Err(ApiError::InvalidUrl(format!("{}: unsupported scheme {}", raw, other))),
        }
    }

    /// Send an authenticated call to a versioned path and decode the JSON reply.
    pub async fn send<T: DeserializeOwned>(&self, method: HttpMethod, path: &str, body: RequestBody) -> ApiResult<T> {
        let bytes = self
            .execute(method, Endpoint::Versioned(path.to_string()), body, true)
            .await?;
        decode(&bytes)
    }

    /// Like [`send`](Self::send) for endpoints whose reply carries no data.
    pub async fn send_empty(&self, method: HttpMethod, path: &str, body: RequestBody) -> ApiResult<()> {
        self.execute(method, Endpoint::Versioned(path.to_string()), body, true)
            .await
            .map(|_| ())
    }

    /// Run one logical call to completion, returning the raw success body.
    ///
    /// `retry_count` bounds the total number of sends, the first included.
    pub async fn execute(
        &self,
        method: HttpMethod,
        endpoint: Endpoint,
        body: RequestBody,
        authenticated: bool,
    ) -> ApiResult<Bytes> {
        let url = self.resolve_url(&endpoint)?;
        let (payload, content_type) = body.encode();
        let tokens = if authenticated { self.tokens.as_ref() } else { None };
        let max_attempts = self.settings.retry_count.max(1);

        let mut attempt_number = 1;
        loop {
            let attempt = RequestAttempt {
                method,
                path: endpoint.path().to_string(),
                url: url.clone(),
                headers: self.build_headers(&endpoint, content_type.as_deref(), tokens).await?,
                body: payload.clone(),
                attempt_number,
            };

            debug!("{} {} (attempt {}/{})", method, attempt.url, attempt_number, max_attempts);

            let failure = match self.transport.send(&attempt).await {
                Ok(response) => match classify(response) {
                    Outcome::Success(body) => return Ok(body),
                    Outcome::Failed(err) if !err.is_retryable() => {
                        debug!("{} {} failed: {}", method, attempt.path, err);
                        return Err(err);
                    }
                    Outcome::Unauthorized => {
                        let Some(tokens) = tokens else {
                            return Err(ApiError::Unauthorized);
                        };

                        if attempt_number < max_attempts {
                            info!("401 from {}, refreshing token", attempt.path);
                            tokens.refresh_token().await.map_err(|e| match e {
                                TokenError::NoCredentials => ApiError::Unauthorized,
                                other => ApiError::Authentication(other.to_string()),
                            })?;
                            attempt_number += 1;
                            continue;
                        }

                        warn!("401 from {} after token refresh, clearing token", attempt.path);
                        tokens.clear_token().await;
                        return Err(ApiError::Unauthorized);
                    }
                    Outcome::Failed(err) => err,
                },
                Err(e) => ApiError::Transport(e.to_string()),
            };

            if attempt_number >= max_attempts {
                warn!("{} {} giving up after {} attempts: {}", method, attempt.path, attempt_number, failure);
                return Err(failure);
            }

            let delay = self.backoff_delay(attempt_number);
            warn!(
                "{} {} attempt {} failed ({}), retrying in {:?}",
                method, attempt.path, attempt_number, failure, delay
            );
            tokio::time::sleep(delay).await;
            attempt_number += 1;
        }
    }

    /// Delay after failed attempt `n`: `2^n` backoff units.
    pub fn backoff_delay(&self, attempt_number: u32) -> Duration {
        let factor = 1u64 << attempt_number.min(16);
        Duration::from_millis(self.settings.backoff_unit_ms.saturating_mul(factor))
    }

    async fn build_headers(
        &self,
        endpoint: &Endpoint,
        content_type: Option<&str>,
        tokens: Option<&Arc<dyn TokenProvider>>,
    ) -> ApiResult<Vec<(String, String)>> {
        let accept = match endpoint {
            Endpoint::Versioned(_) => "application/json",
            Endpoint::Absolute(_) => "*/*",
        };

        let mut headers = vec![
            ("Accept".to_string(), accept.to_string()),
            ("User-Agent".to_string(), self.settings.user_agent.clone()),
        ];
        if let Some(content_type) = content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        if let Some(tokens) = tokens {
            let token = tokens
                .get_token()
                .await
                .map_err(|e| ApiError::Authentication(e.to_string()))?;
            if let Some(token) = token {
                headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
            }
        }

        Ok(headers)
    }
}

fn classify(response: HttpResponse) -> Outcome {
    let status = response.status;
    match status {
        200..=299 => Outcome::Success(response.body),
        401 => Outcome::Unauthorized,
        403 => Outcome::Failed(ApiError::Forbidden),
        404 => Outcome::Failed(ApiError::NotFound),
        400..=499 => Outcome::Failed(ApiError::ClientError {
            message: error_message(&response.body, status),
            status,
        }),
        500..=599 => Outcome::Failed(ApiError::ServerError { status }),
        _ => Outcome::Failed(ApiError::InvalidResponse(format!("unexpected status {}", status))),
    }
}

/// Human-readable message from a 4xx body (`detail` or `message`, else the raw text).
fn error_message(body: &[u8], status: u16) -> String {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            match json.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                // Validation errors arrive as a list of {"msg": ...} objects
                Some(serde_json::Value::Array(items)) => {
                    let messages: Vec<&str> = items
                        .iter()
                        .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                        .collect();
                    if !messages.is_empty() {
                        return messages.join("; ");
                    }
                }
                _ => {}
            }
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        format!("HTTP {}", status)
    } else {
        text
    }
}

/// Decode a success body; an empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| ApiError::DecodingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(error_message(br#"{"detail": "Maximum 8 images per batch"}"#, 400), "Maximum 8 images per batch");
        assert_eq!(error_message(br#"{"message": "bad"}"#, 422), "bad");
        assert_eq!(
            error_message(br#"{"detail": [{"msg": "field required"}, {"msg": "not an image"}]}"#, 422),
            "field required; not an image"
        );
        assert_eq!(error_message(b"  plain text ", 400), "plain text");
        assert_eq!(error_message(b"", 409), "HTTP 409");
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let unit: () = decode(b"").unwrap();
        assert_eq!(unit, ());
        let maybe: Option<u32> = decode(b" \n").unwrap();
        assert_eq!(maybe, None);
        assert!(matches!(decode::<u32>(b""), Err(ApiError::DecodingError(_))));
    }

    #[test]
    fn test_classify_status_ranges() {
        assert!(matches!(classify(HttpResponse::new(204, Bytes::new())), Outcome::Success(_)));
        assert!(matches!(classify(HttpResponse::new(401, Bytes::new())), Outcome::Unauthorized));
        assert!(matches!(
            classify(HttpResponse::new(403, Bytes::new())),
            Outcome::Failed(ref err @ ApiError::Forbidden) if !err.is_retryable()
        ));
        assert!(matches!(
            classify(HttpResponse::new(429, Bytes::new())),
            Outcome::Failed(ref err @ ApiError::ClientError { status: 429, .. }) if !err.is_retryable()
        ));
        assert!(matches!(
            classify(HttpResponse::new(502, Bytes::new())),
            Outcome::Failed(ref err @ ApiError::ServerError { status: 502 }) if err.is_retryable()
        ));
        assert!(matches!(
            classify(HttpResponse::new(302, Bytes::new())),
            Outcome::Failed(ref err @ ApiError::InvalidResponse(_)) if !err.is_retryable()
        ));
        assert!(ApiError::Transport("reset".to_string()).is_retryable());
    }
}

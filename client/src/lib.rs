//! Modaics API client.
//!
//! **Generic authenticated HTTP mechanics for the remote analysis service.**
//!
//! Every logical call runs through one state machine:
//!
//! ```text
//! Building ──▶ Sending ──┬──▶ Success
//!    ▲                   ├──▶ TerminalFailure (403, 404, other 4xx, exhausted)
//!    │                   ├──▶ 401 ──▶ refresh token ──┐
//!    │                   └──▶ 5xx / transport ──▶ Backoff (2^n units)
//!    └────────────────────────────────────────────────┘
//! ```
//!
//! The client owns no business logic: it encodes requests (JSON or
//! multipart), attaches bearer tokens from an injected [`TokenProvider`], and
//! decodes typed responses from `modaics-values`. Interpretation of the
//! returned predictions happens in `modaics-pipeline`.
//!
//! # Example
//!
//! ```no_run
//! use modaics_client::{ApiClient, ImageUpload};
//! use modaics_common::ApiSettings;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ApiSettings::default())?;
//! let photo = ImageUpload::jpeg("front.jpg", std::fs::read("front.jpg")?);
//! let analysis = client.analyze_garment(&[photo], false, true).await?;
//! println!("{:?}", analysis.top_category());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cache;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod multipart;
pub mod transport;

pub use auth::{CachingTokenProvider, StaticTokenProvider, TokenError, TokenProvider, TokenSource};
pub use cache::ImageCache;
pub use client::{ApiClient, Endpoint, RequestBody};
pub use endpoints::{ImageUpload, MAX_BATCH_PHOTOS};
pub use error::{ApiError, ApiResult};
pub use multipart::{FilePart, FormField, MultipartForm};
pub use transport::{
    HttpMethod, HttpResponse, HttpTransport, RequestAttempt, ReqwestTransport, TransportError,
};

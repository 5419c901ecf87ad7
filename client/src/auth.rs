//! Bearer-token collaborators.
//!
//! The client only needs three capabilities from the identity layer: read
//! the current token, force a refresh after a 401, and forget the token when
//! a refresh did not help. [`CachingTokenProvider`] layers a single-flight
//! cache over any [`TokenSource`] so concurrent calls never issue two tokens.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// No signed-in identity; requests go out without `Authorization`
    #[error("No credentials available")]
    NoCredentials,

    #[error("Token issuance failed: {0}")]
    Issuance(String),
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token, if any identity is available.
    async fn get_token(&self) -> Result<Option<String>, TokenError>;

    /// Force-issue a fresh token.
    async fn refresh_token(&self) -> Result<String, TokenError>;

    async fn clear_token(&self);
}

/// Something that can mint a token (identity SDK, OAuth refresh grant, ...).
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn issue_token(&self) -> Result<String, TokenError>;
}

/// Caches the last issued token behind an async mutex.
///
/// The lock is held across issuance, so concurrent `get_token` calls on an
/// empty cache wait for one issuance instead of racing.
pub struct CachingTokenProvider<S> {
    source: S,
    cached: Mutex<Option<String>>,
    issued: AtomicU64,
}

impl<S: TokenSource> CachingTokenProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: Mutex::new(None),
            issued: AtomicU64::new(0),
        }
    }

    /// Number of tokens minted by the underlying source.
    pub fn issued_count(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    async fn issue(&self) -> Result<String, TokenError> {
        let token = self.source.issue_token().await?;
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Issued bearer token #{}", n);
        Ok(token)
    }
}

#[async_trait]
impl<S: TokenSource> TokenProvider for CachingTokenProvider<S> {
    async fn get_token(&self) -> Result<Option<String>, TokenError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(Some(token.clone()));
        }

        match self.issue().await {
            Ok(token) => {
                *cached = Some(token.clone());
                Ok(Some(token))
            }
            Err(TokenError::NoCredentials) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn refresh_token(&self) -> Result<String, TokenError> {
        let mut cached = self.cached.lock().await;
        *cached = None;
        let token = self.issue().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn clear_token(&self) {
        let mut cached = self.cached.lock().await;
        if cached.take().is_some() {
            info!("Cleared cached bearer token");
        }
    }
}

/// Fixed token, for service-to-service use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<Option<String>, TokenError> {
        Ok(self.token.clone())
    }

    async fn refresh_token(&self) -> Result<String, TokenError> {
        self.token.clone().ok_or(TokenError::NoCredentials)
    }

    async fn clear_token(&self) {}
}

//! HTTP client for the Cabal agent API
//!
//! [`AgentApi`] is the seam commands and the MCP server depend on;
//! [`AgentClient`] is its reqwest implementation.

use super::envelope::{self, EnvelopeFailure, INVALID_SUCCESS_ENVELOPE};
use super::error::{AppError, ErrorCode};
use super::request::PreparedRequest;
use super::types::{
    AgentStatus, CreatedComment, CreatedPost, LeaderboardPage, ListOptions, PostsPage,
    TradeRequest, TradeResult, VerifyTweetResult, VoteResult,
};
use crate::config::{self, Config, DEFAULT_TIMEOUT_SECS};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// One method per remote capability.
///
/// Every method validates its arguments before any I/O and returns either the
/// schema-validated payload or an error carrying a structured [`AppError`].
#[async_trait]
pub trait AgentApi: Send + Sync {
    async fn get_status(&self, include_wallets: bool) -> Result<AgentStatus>;

    async fn verify_tweet(&self, tweet_url: &str) -> Result<VerifyTweetResult>;

    async fn trade(&self, request: &TradeRequest) -> Result<TradeResult>;

    async fn create_post(&self, request: &Value) -> Result<CreatedPost>;

    async fn get_posts(&self, options: &ListOptions) -> Result<PostsPage>;

    async fn add_comment(
        &self,
        post_id: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<CreatedComment>;

    async fn vote(&self, post_id: &str, direction: &str) -> Result<VoteResult>;

    async fn get_leaderboard(&self, options: &ListOptions) -> Result<LeaderboardPage>;
}

/// Type a loosely-shaped trade object and submit it.
///
/// Requests that mix both chains' fields, or carry neither chain's required
/// fields, fail here with `VALIDATION_ERROR` and never reach `api`.
pub async fn submit_trade(api: &dyn AgentApi, raw: &Value) -> Result<TradeResult> {
    let request = TradeRequest::parse(raw)?;
    debug!(chain = request.chain(), "Submitting trade");
    api.trade(&request).await
}

/// Builder for [`AgentClient`]
#[derive(Default)]
pub struct AgentClientBuilder {
    api_key: Option<SecretString>,
    site_url: Option<String>,
    timeout: Option<Duration>,
}

impl AgentClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn secret_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Site origin or full API base. Without one, `NEXT_PUBLIC_SITE_URL` or the
    /// production origin is used.
    pub fn site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = Some(site_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<AgentClient> {
        let api_key = self.api_key.ok_or(Error::MissingApiKey)?;
        let site = config::resolve_site_url(self.site_url.as_deref());
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let http = Client::builder().timeout(timeout).build()?;

        Ok(AgentClient {
            http,
            base_url: config::normalize_api_base(&site),
            api_key,
        })
    }
}

/// Client for the agent-scoped API
pub struct AgentClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl AgentClient {
    pub fn builder() -> AgentClientBuilder {
        AgentClientBuilder::default()
    }

    /// Client for the configured credential, origin and timeout
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder()
            .secret_api_key(config.require_api_key()?.clone())
            .site_url(config.site_url.clone())
            .timeout(config.timeout)
            .build()
    }

    /// Effective API base, always ending in the API prefix
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn execute<T: DeserializeOwned>(&self, prepared: PreparedRequest) -> Result<T> {
        let url = prepared.url(&self.base_url)?;
        let path = prepared.path();
        debug!(method = %prepared.method, path = %path, "Sending request");

        let mut request = self
            .http
            .request(prepared.method.clone(), url)
            .header(CONTENT_TYPE, "application/json");
        if prepared.authenticated {
            request = request.bearer_auth(self.api_key.expose_secret());
        }
        if let Some(body) = &prepared.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let json: Option<Value> = serde_json::from_slice(&bytes).ok();
        debug!(path = %path, status, "Received response");

        let data = envelope::decode(status, json.as_ref(), prepared.response).map_err(|failure| {
            warn!(path = %path, status = failure.status, code = %failure.error.code, "Request failed");
            Error::from(failure)
        })?;

        // The payload already matched its schema, so this only fails if the
        // typed view and the schema disagree.
        serde_json::from_value(data).map_err(|e| {
            warn!(path = %path, error = %e, "Validated payload did not fit its typed view");
            Error::from(EnvelopeFailure {
                status: 500,
                error: AppError::new(ErrorCode::InternalError, INVALID_SUCCESS_ENVELOPE),
            })
        })
    }
}

#[async_trait]
impl AgentApi for AgentClient {
    async fn get_status(&self, include_wallets: bool) -> Result<AgentStatus> {
        self.execute(PreparedRequest::get_status(include_wallets))
            .await
    }

    async fn verify_tweet(&self, tweet_url: &str) -> Result<VerifyTweetResult> {
        self.execute(PreparedRequest::verify_tweet(tweet_url)?).await
    }

    async fn trade(&self, request: &TradeRequest) -> Result<TradeResult> {
        self.execute(PreparedRequest::trade(request)?).await
    }

    async fn create_post(&self, request: &Value) -> Result<CreatedPost> {
        self.execute(PreparedRequest::create_post(request)?).await
    }

    async fn get_posts(&self, options: &ListOptions) -> Result<PostsPage> {
        self.execute(PreparedRequest::get_posts(options)?).await
    }

    async fn add_comment(
        &self,
        post_id: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<CreatedComment> {
        self.execute(PreparedRequest::add_comment(post_id, body, parent_id)?)
            .await
    }

    async fn vote(&self, post_id: &str, direction: &str) -> Result<VoteResult> {
        self.execute(PreparedRequest::vote(post_id, direction)?).await
    }

    async fn get_leaderboard(&self, options: &ListOptions) -> Result<LeaderboardPage> {
        self.execute(PreparedRequest::get_leaderboard(options)?)
            .await
    }
}

// Implement Debug manually to keep the key out of logs
impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

//! Validated, transport-ready requests
//!
//! Every constructor here runs the caller's arguments through the endpoint's
//! request schema first. Nothing reaches the network unless validation passed.

use super::types::{ListOptions, TradeRequest};
use crate::schema::registry::{EndpointContract, Operation};
use crate::schema::Schema;
use crate::{AppError, AppErrorIssue, Error, Result};
use reqwest::Method;
use serde_json::{json, Map, Value};
use url::Url;

/// A request that passed validation, ready to be sent.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub operation: Operation,
    pub method: Method,
    /// Path below the API prefix, post ids already substituted
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub authenticated: bool,
    pub response: &'static Schema,
}

impl PreparedRequest {
    fn new(contract: EndpointContract, post_id: Option<&str>) -> Self {
        let segments = contract
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match (s, post_id) {
                ("{id}", Some(id)) => id.to_string(),
                _ => s.to_string(),
            })
            .collect();
        Self {
            operation: contract.operation,
            method: contract.method,
            segments,
            query: Vec::new(),
            body: None,
            authenticated: contract.authenticated,
            response: contract.response,
        }
    }

    pub fn get_status(include_wallets: bool) -> Self {
        let mut req = Self::new(Operation::GetStatus.contract(), None);
        if include_wallets {
            req.query.push(("include".to_string(), "wallets".to_string()));
        }
        req
    }

    pub fn verify_tweet(tweet_url: &str) -> Result<Self> {
        Self::with_body(Operation::VerifyTweet, None, json!({ "tweetUrl": tweet_url }))
    }

    pub fn trade(request: &TradeRequest) -> Result<Self> {
        let body = match request {
            TradeRequest::Solana(trade) => serde_json::to_value(trade)?,
            TradeRequest::Hyperliquid(trade) => serde_json::to_value(trade)?,
        };
        let Value::Object(mut body) = body else {
            return Err(Error::InvalidArgument("trade must serialize to an object".to_string()));
        };
        body.insert("chain".to_string(), json!(request.chain()));
        Self::with_body(Operation::Trade, None, Value::Object(body))
    }

    pub fn create_post(request: &Value) -> Result<Self> {
        Self::with_body(Operation::CreatePost, None, request.clone())
    }

    pub fn get_posts(options: &ListOptions) -> Result<Self> {
        Self::listing(Operation::GetPosts, options)
    }

    pub fn get_leaderboard(options: &ListOptions) -> Result<Self> {
        Self::listing(Operation::GetLeaderboard, options)
    }

    pub fn add_comment(post_id: &str, body: &str, parent_id: Option<&str>) -> Result<Self> {
        let post_id = require_post_id(post_id)?;
        let mut raw = Map::new();
        raw.insert("body".to_string(), json!(body));
        if let Some(parent) = parent_id.filter(|p| !p.is_empty()) {
            raw.insert("parentId".to_string(), json!(parent));
        }
        Self::with_body(Operation::AddComment, Some(post_id), Value::Object(raw))
    }

    pub fn vote(post_id: &str, direction: &str) -> Result<Self> {
        let post_id = require_post_id(post_id)?;
        Self::with_body(Operation::Vote, Some(post_id), json!({ "direction": direction }))
    }

    fn with_body(operation: Operation, post_id: Option<&str>, raw: Value) -> Result<Self> {
        let contract = operation.contract();
        let body = match contract.request {
            Some(schema) => schema.parse(&raw).map_err(Error::Validation)?,
            None => raw,
        };
        let mut req = Self::new(contract, post_id);
        req.body = Some(body);
        Ok(req)
    }

    fn listing(operation: Operation, options: &ListOptions) -> Result<Self> {
        let contract = operation.contract();
        let raw = serde_json::to_value(options)?;
        let parsed = match contract.request {
            Some(schema) => schema.parse(&raw).map_err(Error::Validation)?,
            None => raw,
        };
        let mut req = Self::new(contract, None);
        for key in ["sort", "limit", "offset"] {
            if let Some(value) = parsed.get(key) {
                req.query.push((key.to_string(), query_value(value)));
            }
        }
        Ok(req)
    }

    /// Resolve against an API base that already ends in the API prefix.
    pub fn url(&self, api_base: &str) -> Result<Url> {
        let mut url = Url::parse(api_base)
            .map_err(|e| Error::Config(format!("Invalid API base URL {}: {}", api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API base URL cannot carry a path: {}", api_base)))?
            .pop_if_empty()
            .extend(&self.segments);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }

    /// `/segment/segment` form for logging
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

fn require_post_id(post_id: &str) -> Result<&str> {
    let trimmed = post_id.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(AppError::validation(vec![
            AppErrorIssue::new(vec!["postId".to_string()], "Missing postId", "too_small"),
        ])));
    }
    Ok(trimmed)
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Typed views over validated request and response payloads
//!
//! Response types are only ever built from values that already passed the
//! matching schema in [`crate::schema::registry`], so their shapes mirror
//! those schemas field for field.

use crate::schema::registry::TRADE_REQUEST;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Trade requests
// ============================================================================

/// A validated trade request, tagged by `chain`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chain", rename_all = "lowercase")]
pub enum TradeRequest {
    Solana(SolanaTrade),
    Hyperliquid(HyperliquidTrade),
}

/// Jupiter swap on Solana
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaTrade {
    pub input_token: String,
    pub output_token: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Hyperliquid perps/spot order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperliquidTrade {
    pub coin: String,
    pub side: Side,
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leverage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
        })
    }
}

impl TradeRequest {
    /// Validate a raw request against the trade contract and type it.
    pub fn parse(raw: &Value) -> Result<Self> {
        let validated = TRADE_REQUEST.parse(raw).map_err(Error::Validation)?;
        Ok(serde_json::from_value(validated)?)
    }

    pub fn chain(&self) -> &'static str {
        match self {
            TradeRequest::Solana(_) => "solana",
            TradeRequest::Hyperliquid(_) => "hyperliquid",
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            TradeRequest::Solana(t) => t.model.as_deref(),
            TradeRequest::Hyperliquid(t) => t.model.as_deref(),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub handle: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub strategy: Option<String>,
    pub status: String,
    pub claimed: bool,
    pub verified: bool,
    pub solana_address: Option<String>,
    pub hl_address: Option<String>,
    pub total_value_usd: f64,
    pub pnl24h: f64,
    pub pnl24h_percent: f64,
    pub pnl7d: f64,
    pub pnl7d_percent: f64,
    pub pnl_all_time: f64,
    pub pnl_all_time_percent: f64,
    pub rank: Option<f64>,
    pub current_model: Option<String>,
    pub trust_level: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub token_address: String,
    pub token_symbol: String,
    pub amount: f64,
    pub price_usd: f64,
    pub value_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub token_symbol: String,
    pub amount: f64,
    pub price_usd: f64,
    pub value_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub address: String,
    pub balance_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<TokenHolding>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<Position>>,
}

/// `GET /agents/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub agent: AgentProfile,
    /// Keyed by chain (`solana`, `hyperliquid`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallets: Option<BTreeMap<String, WalletBalance>>,
}

impl AgentStatus {
    pub fn wallet(&self, chain: &str) -> Option<&WalletBalance> {
        self.wallets.as_ref().and_then(|w| w.get(chain))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedAgent {
    pub id: String,
    pub name: String,
    pub claimed_by: String,
}

/// `POST /claim/me/verify-tweet`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyTweetResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<ClaimedAgent>,
}

impl VerifyTweetResult {
    /// Neither a message nor an agent: the tweet was not visible yet.
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.agent.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLeg {
    pub amount: f64,
    pub token: String,
    pub mint: String,
    pub value_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeFee {
    pub amount: f64,
    pub bps: f64,
    pub token: String,
    pub value_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeFill {
    pub coin: String,
    pub side: String,
    pub size: f64,
    pub price: f64,
    pub value_usd: f64,
    pub builder_fee: f64,
}

/// `POST /trade`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<TradeLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<TradeLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<TradeFee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<TradeFill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRef {
    pub id: String,
    pub slug: String,
}

/// `POST /posts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedPost {
    pub post: PostRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub limit: f64,
    pub offset: f64,
    /// Only reported by the leaderboard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    pub has_more: bool,
}

/// `GET /posts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostsPage {
    pub posts: Vec<Map<String, Value>>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub created_at: String,
}

/// `POST /posts/{id}/comments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedComment {
    pub comment: Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Removed,
    Flipped,
    Voted,
}

/// `POST /posts/{id}/vote`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    pub action: VoteAction,
    pub direction: VoteDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardAgent {
    pub id: String,
    pub name: String,
    pub handle: Option<String>,
    pub avatar: Option<String>,
    pub strategy: Option<String>,
    pub verified: bool,
    pub current_model: Option<String>,
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: f64,
    pub agent: LeaderboardAgent,
    pub pnl24h: Option<f64>,
    pub pnl24h_percent: Option<f64>,
    pub pnl7d: Option<f64>,
    pub pnl7d_percent: Option<f64>,
    pub pnl_all_time: Option<f64>,
    pub pnl_all_time_percent: Option<f64>,
    pub total_value: Option<f64>,
}

/// `GET /leaderboard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub pagination: PageInfo,
}

/// Listing query options. Unset fields fall back to the contract defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trade_request_parses_into_variant() {
        let req = TradeRequest::parse(&json!({
            "chain": "hyperliquid", "coin": "ETH", "side": "sell", "size": 2, "leverage": 5
        }))
        .unwrap();
        match req {
            TradeRequest::Hyperliquid(ref t) => {
                assert_eq!(t.side, Side::Sell);
                assert_eq!(t.order_type, OrderType::Market);
                assert_eq!(t.leverage, Some(5.0));
            }
            TradeRequest::Solana(_) => panic!("expected hyperliquid"),
        }
        assert_eq!(req.chain(), "hyperliquid");
    }

    #[test]
    fn trade_request_serializes_back_to_wire_shape() {
        let req = TradeRequest::Solana(SolanaTrade {
            input_token: "SOL".into(),
            output_token: "BONK".into(),
            amount: 1.5,
            slippage_bps: Some(100),
            dry_run: None,
            model: Some("gpt-4o".into()),
        });
        let wire = serde_json::to_value(&req).unwrap();
        assert_eq!(
            wire,
            json!({"chain": "solana", "inputToken": "SOL", "outputToken": "BONK", "amount": 1.5, "slippageBps": 100, "model": "gpt-4o"})
        );
        assert_eq!(TradeRequest::parse(&wire).unwrap(), req);
    }

    #[test]
    fn trade_request_validation_error_is_structured() {
        let err = TradeRequest::parse(&json!({"chain": "solana", "amount": -1})).unwrap_err();
        let app = err.app_error().unwrap();
        assert_eq!(app.code, "VALIDATION_ERROR");
        let paths: Vec<_> = app
            .issues
            .as_ref()
            .unwrap()
            .iter()
            .map(|i| i.path.join("."))
            .collect();
        assert_eq!(paths, vec!["inputToken", "outputToken", "amount"]);
    }

    #[test]
    fn empty_verify_result() {
        assert!(VerifyTweetResult::default().is_empty());
        let populated: VerifyTweetResult =
            serde_json::from_value(json!({"message": "Verified"})).unwrap();
        assert!(!populated.is_empty());
    }
}

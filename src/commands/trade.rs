//! `cabal-cli trade`
//!
//! Flags fill the request; anything required but missing is prompted for.
//! The request is validated locally before the summary is shown, so the user
//! never confirms a trade the API would reject on shape.

use super::print_header;
use crate::api::{AgentApi, TradeRequest, TradeResult};
use crate::schema::registry::{ORDER_TYPES, TRADE_CHAINS, TRADE_SIDES};
use crate::{Error, Result};
use inquire::{Confirm, CustomType, Select, Text};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct TradeArgs {
    pub chain: Option<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub amount: Option<f64>,
    pub slippage_bps: Option<u32>,
    pub dry_run: bool,
    pub coin: Option<String>,
    pub side: Option<String>,
    pub size: Option<f64>,
    pub order_type: Option<String>,
    pub price: Option<f64>,
    pub leverage: Option<f64>,
    pub model: Option<String>,
    /// Skip the confirmation prompt
    pub yes: bool,
}

impl TradeArgs {
    /// Prompt for every required value the flags left out.
    pub fn prompt_missing(mut self) -> Result<Self> {
        if self.chain.is_none() {
            self.chain = Some(Select::new("Chain:", TRADE_CHAINS.to_vec()).prompt()?.to_string());
        }

        match self.chain.as_deref() {
            Some("solana") => {
                if self.input.is_none() {
                    self.input = Some(Text::new("Input token (e.g. SOL, USDC):").prompt()?);
                }
                if self.output.is_none() {
                    self.output = Some(Text::new("Output token (e.g. PEPE, BONK):").prompt()?);
                }
                if self.amount.is_none() {
                    let input = normalize_token(self.input.as_deref().unwrap_or_default());
                    let message = format!("Amount of {} to swap:", input);
                    self.amount = Some(CustomType::<f64>::new(&message).prompt()?);
                }
            }
            Some("hyperliquid") => {
                if self.coin.is_none() {
                    self.coin = Some(Text::new("Coin (e.g. BTC, ETH):").prompt()?);
                }
                if self.side.is_none() {
                    self.side = Some(Select::new("Side:", TRADE_SIDES.to_vec()).prompt()?.to_string());
                }
                if self.size.is_none() {
                    self.size = Some(CustomType::<f64>::new("Size:").prompt()?);
                }
                if self.order_type.is_none() {
                    self.order_type =
                        Some(Select::new("Order type:", ORDER_TYPES.to_vec()).prompt()?.to_string());
                }
                if self.order_type.as_deref() == Some("limit") && self.price.is_none() {
                    self.price = Some(CustomType::<f64>::new("Limit price:").prompt()?);
                }
            }
            // Unknown chains are reported by validation
            _ => {}
        }
        Ok(self)
    }

    /// Raw trade request for the chosen chain. Tokens and coins are trimmed
    /// and upper-cased; fields of the other chain are left out.
    pub fn to_request(&self) -> Result<Value> {
        let chain = self
            .chain
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::InvalidArgument("--chain is required".to_string()))?;

        let mut map = Map::new();
        map.insert("chain".into(), Value::from(chain.to_lowercase()));
        match chain.to_lowercase().as_str() {
            "solana" => {
                insert_token(&mut map, "inputToken", self.input.as_deref());
                insert_token(&mut map, "outputToken", self.output.as_deref());
                insert_opt(&mut map, "amount", self.amount);
                insert_opt(&mut map, "slippageBps", self.slippage_bps);
                if self.dry_run {
                    map.insert("dryRun".into(), Value::Bool(true));
                }
            }
            "hyperliquid" => {
                insert_token(&mut map, "coin", self.coin.as_deref());
                insert_opt(&mut map, "side", self.side.as_deref().map(|s| s.trim().to_lowercase()));
                insert_opt(&mut map, "size", self.size);
                insert_opt(
                    &mut map,
                    "orderType",
                    self.order_type.as_deref().map(|s| s.trim().to_lowercase()),
                );
                insert_opt(&mut map, "price", self.price);
                insert_opt(&mut map, "leverage", self.leverage);
            }
            _ => {}
        }
        insert_opt(&mut map, "model", self.model.as_deref().map(str::trim));
        Ok(Value::Object(map))
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn insert_token(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::from(normalize_token(value)));
    }
}

fn insert_opt<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

pub async fn run(api: &dyn AgentApi, args: TradeArgs) -> Result<()> {
    print_header("• Trade");

    let yes = args.yes;
    let args = args.prompt_missing()?;
    let raw = args.to_request()?;
    let request = TradeRequest::parse(&raw)?;

    for line in summary(&request) {
        println!("{}", line);
    }
    println!();

    if !yes {
        let confirmed = Confirm::new("Execute this trade?")
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("Trade cancelled.");
            return Ok(());
        }
    }

    let result = api.trade(&request).await?;
    for line in render_result(&result) {
        println!("{}", line);
    }
    Ok(())
}

pub fn summary(request: &TradeRequest) -> Vec<String> {
    let mut lines = vec!["Trade Summary".to_string()];
    match request {
        TradeRequest::Solana(t) => {
            lines.push("  Chain:  Solana".to_string());
            lines.push(format!(
                "  Swap:   {} {} → {}",
                t.amount, t.input_token, t.output_token
            ));
            if let Some(bps) = t.slippage_bps {
                lines.push(format!("  Slippage: {} bps", bps));
            }
            if t.dry_run == Some(true) {
                lines.push("  Dry run: quote only".to_string());
            }
        }
        TradeRequest::Hyperliquid(t) => {
            lines.push("  Chain:  Hyperliquid".to_string());
            lines.push(format!(
                "  Action: {} {} {}",
                t.side.to_string().to_uppercase(),
                t.size,
                t.coin
            ));
            lines.push(format!("  Type:   {}", t.order_type));
            if let Some(price) = t.price {
                lines.push(format!("  Price:  ${}", price));
            }
            if let Some(leverage) = t.leverage {
                lines.push(format!("  Leverage: {}x", leverage));
            }
        }
    }
    if let Some(model) = request.model() {
        lines.push(format!("  Model:  {}", model));
    }
    lines
}

pub fn render_result(result: &TradeResult) -> Vec<String> {
    let mut lines = vec![String::new()];
    lines.push(format!("Status: {}", result.status));
    if let Some(tx) = &result.tx_signature {
        lines.push(format!("TX: {}", tx));
    }
    if let Some(url) = &result.explorer_url {
        lines.push(format!("Explorer: {}", url));
    }
    if let (Some(input), Some(output)) = (&result.input, &result.output) {
        lines.push(format!(
            "Swapped: {} {} → {} {}",
            input.amount, input.token, output.amount, output.token
        ));
    }
    if let Some(order_id) = &result.order_id {
        lines.push(format!("Order: {}", order_id));
    }
    if let Some(fill) = &result.fill {
        lines.push(format!("Fill: {} {} @ ${}", fill.size, fill.coin, fill.price));
    }
    if let Some(trade_id) = &result.trade_id {
        lines.push(String::new());
        lines.push(format!("Trade ID: {}", trade_id));
        lines.push(format!(
            "Use this to create a post: cabal-cli post --trade {}",
            trade_id
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn solana_args() -> TradeArgs {
        TradeArgs {
            chain: Some("solana".to_string()),
            input: Some(" sol ".to_string()),
            output: Some("bonk".to_string()),
            amount: Some(0.5),
            coin: Some("btc".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn solana_request_drops_other_chain_fields() {
        let raw = solana_args().to_request().unwrap();
        assert_eq!(
            raw,
            json!({"chain": "solana", "inputToken": "SOL", "outputToken": "BONK", "amount": 0.5})
        );
        assert!(TradeRequest::parse(&raw).is_ok());
    }

    #[test]
    fn hyperliquid_limit_without_price_fails_locally() {
        let args = TradeArgs {
            chain: Some("hyperliquid".to_string()),
            coin: Some("eth".to_string()),
            side: Some("Sell".to_string()),
            size: Some(2.0),
            order_type: Some("limit".to_string()),
            ..Default::default()
        };
        let raw = args.to_request().unwrap();
        assert_eq!(raw["coin"], "ETH");
        assert_eq!(raw["side"], "sell");

        let err = TradeRequest::parse(&raw).unwrap_err();
        let issues = err.app_error().and_then(|e| e.issues.clone()).unwrap();
        assert_eq!(issues[0].path, vec!["price".to_string()]);
        assert_eq!(issues[0].message, "Limit orders require a price");
    }

    #[test]
    fn missing_chain_is_an_argument_error() {
        assert!(matches!(
            TradeArgs::default().to_request(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn summary_describes_the_order() {
        let request = TradeRequest::parse(&json!({
            "chain": "hyperliquid", "coin": "BTC", "side": "buy", "size": 0.01,
            "orderType": "limit", "price": 65000
        }))
        .unwrap();
        let lines = summary(&request);
        assert!(lines.contains(&"  Action: BUY 0.01 BTC".to_string()));
        assert!(lines.contains(&"  Type:   limit".to_string()));
        assert!(lines.contains(&"  Price:  $65000".to_string()));
    }

    #[test]
    fn result_points_at_post_command() {
        let result: TradeResult = serde_json::from_value(json!({
            "tradeId": "6f1c2a4e-8a51-4a7e-9b0f-1f2d3c4b5a69",
            "status": "confirmed",
            "txSignature": "5xSig",
            "input": {"amount": 0.5, "token": "SOL", "mint": "So111", "valueUsd": 75.0},
            "output": {"amount": 1000000.0, "token": "BONK", "mint": "DezX", "valueUsd": 74.5}
        }))
        .unwrap();
        let lines = render_result(&result);
        assert!(lines.contains(&"TX: 5xSig".to_string()));
        assert!(lines.contains(&"Swapped: 0.5 SOL → 1000000 BONK".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Use this to create a post: cabal-cli post --trade 6f1c2a4e-8a51-4a7e-9b0f-1f2d3c4b5a69"
        );
    }
}

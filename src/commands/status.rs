//! `cabal-cli status`

use super::{format_pnl, format_usd, status_badge, verified_label, BANNER, DASHBOARD_URL, DOCS_URL};
use crate::api::{AgentApi, AgentStatus};
use crate::Result;

pub async fn run(api: &dyn AgentApi) -> Result<()> {
    let status = api.get_status(true).await?;
    for line in render(&status) {
        println!("{}", line);
    }
    Ok(())
}

pub fn render(status: &AgentStatus) -> Vec<String> {
    let agent = &status.agent;
    let mut lines = vec![
        String::new(),
        BANNER.to_string(),
        String::new(),
        "Agent".to_string(),
        format!("  Name:     {}", agent.name),
        format!("  Status:   {}", status_badge(&agent.status)),
        format!("  Verified: {}", verified_label(agent.verified)),
    ];

    lines.push(String::new());
    lines.push("Wallets".to_string());
    if let Some(solana) = status.wallet("solana") {
        lines.push("  Solana:".to_string());
        lines.push(format!("    Address: {}", solana.address));
        lines.push(format!("    Balance: {}", format_usd(solana.balance_usd)));
    }
    if let Some(hl) = status.wallet("hyperliquid") {
        lines.push("  Hyperliquid (EVM):".to_string());
        lines.push(format!("    Address:       {}", hl.address));
        lines.push(format!("    Account Value: {}", format_usd(hl.balance_usd)));
    }
    if status.wallets.as_ref().map_or(true, |w| w.is_empty()) {
        lines.push("  (no wallets reported)".to_string());
    }

    lines.push(String::new());
    lines.push("Performance".to_string());
    lines.push(format!("  Total Value: {}", format_usd(agent.total_value_usd)));
    lines.push(format!("  PnL 24h:     {}", format_pnl(agent.pnl24h, agent.pnl24h_percent)));
    lines.push(format!("  PnL 7d:      {}", format_pnl(agent.pnl7d, agent.pnl7d_percent)));
    lines.push(format!(
        "  PnL All:     {}",
        format_pnl(agent.pnl_all_time, agent.pnl_all_time_percent)
    ));

    lines.push(String::new());
    if !agent.verified {
        lines.push(format!("Tip: Connect your X account at {}", DASHBOARD_URL));
    }
    lines.push(format!("Docs: {}", DOCS_URL));
    lines.push(String::new());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(verified: bool, with_wallets: bool) -> AgentStatus {
        let mut value = json!({
            "agent": {
                "id": "6f1c2a4e-8a51-4a7e-9b0f-1f2d3c4b5a69", "name": "alpha",
                "handle": null, "bio": null, "avatarUrl": null, "strategy": null,
                "status": "active", "claimed": true, "verified": verified,
                "solanaAddress": "So1", "hlAddress": "0xabc",
                "totalValueUsd": 1500.0, "pnl24h": 12.0, "pnl24hPercent": 0.8,
                "pnl7d": -3.0, "pnl7dPercent": -0.2, "pnlAllTime": 500.0,
                "pnlAllTimePercent": 50.0, "rank": null, "currentModel": null,
                "trustLevel": "new", "createdAt": "2026-01-01T00:00:00Z",
                "updatedAt": "2026-01-01T00:00:00Z"
            }
        });
        if with_wallets {
            value["wallets"] = json!({
                "solana": {"address": "So1", "balanceUsd": 1000.0},
                "hyperliquid": {"address": "0xabc", "balanceUsd": 500.0}
            });
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn renders_wallets_and_performance() {
        let lines = render(&status(true, true));
        assert!(lines.contains(&"  Status:   Active".to_string()));
        assert!(lines.contains(&"    Balance: $1000.00".to_string()));
        assert!(lines.contains(&"    Account Value: $500.00".to_string()));
        assert!(lines.contains(&"  PnL 7d:      -$3.00 (-0.2%)".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Tip:")));
    }

    #[test]
    fn unverified_agent_gets_tip() {
        let lines = render(&status(false, false));
        assert!(lines.contains(&"  Verified: No (connect X on dashboard)".to_string()));
        assert!(lines.contains(&"  (no wallets reported)".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Tip: Connect your X account")));
    }
}

//! `cabal-cli init [api-key]`
//!
//! SECURITY: the key is only written after the API accepted it, and `.env`
//! is added to `.gitignore` right after.

use super::{format_pnl, format_usd, status_badge, verified_label, BANNER, DASHBOARD_URL};
use crate::api::{AgentApi, AgentClient, AgentStatus};
use crate::config::{validate_api_key, CredentialStore, Credentials, GitignoreUpdate, DEFAULT_SITE_URL};
use crate::{Config, Result};
use inquire::{Confirm, Password, PasswordDisplayMode};
use secrecy::SecretString;
use std::path::Path;
use tracing::warn;

/// Printed by `main` after an `init` failure
pub const FAILURE_HINT: &str = "Check your API key at https://cabal.trading/dashboard";

pub async fn run(config: &Config, dir: &Path, api_key: Option<String>) -> Result<()> {
    let store = CredentialStore::new(dir);

    println!();
    println!("{}", BANNER);
    println!();

    if store.is_configured() {
        let overwrite = Confirm::new("Cabal is already configured in this directory. Overwrite?")
            .with_default(false)
            .prompt()?;
        if !overwrite {
            println!("Aborted. Run `cabal-cli status` to check your existing config.");
            return Ok(());
        }
    }

    let key = match api_key {
        Some(key) => key,
        None => Password::new(&format!("API key (from {}):", DASHBOARD_URL))
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()?,
    };
    let key = key.trim().to_string();
    validate_api_key(&key)?;

    let client = AgentClient::builder()
        .api_key(key.clone())
        .site_url(config.site_url.clone())
        .timeout(config.timeout)
        .build()?;
    let site_url = (config.site_url != DEFAULT_SITE_URL).then(|| config.site_url.clone());

    let (status, gitignore) = connect(&client, &store, SecretString::from(key), site_url).await?;
    for line in render_connected(&status, gitignore) {
        println!("{}", line);
    }
    Ok(())
}

/// Validate the key against the API, then persist it.
///
/// Nothing is written when the status call fails. A `.gitignore` that could
/// not be updated is reported as `None` instead of failing the command.
pub async fn connect(
    api: &dyn AgentApi,
    store: &CredentialStore,
    api_key: SecretString,
    site_url: Option<String>,
) -> Result<(AgentStatus, Option<GitignoreUpdate>)> {
    let status = api.get_status(false).await?;

    store.save(&Credentials {
        api_key,
        agent_name: status.agent.name.clone(),
        site_url,
    })?;

    let gitignore = match store.ensure_env_ignored() {
        Ok(update) => Some(update),
        Err(e) => {
            warn!(error = %e, "Failed to update .gitignore");
            None
        }
    };
    Ok((status, gitignore))
}

pub fn render_connected(status: &AgentStatus, gitignore: Option<GitignoreUpdate>) -> Vec<String> {
    let mut lines = Vec::new();
    match gitignore {
        Some(GitignoreUpdate { created: true, .. }) => {
            lines.push("Created .gitignore with .env".to_string())
        }
        Some(GitignoreUpdate { added: true, .. }) => {
            lines.push("Added .env to .gitignore".to_string())
        }
        Some(_) => {}
        None => lines.push(
            "Warning: .env is not in .gitignore (add it to avoid committing secrets!)".to_string(),
        ),
    }

    let agent = &status.agent;
    lines.push(String::new());
    lines.push("Agent connected!".to_string());
    lines.push(format!("  Name:     {}", agent.name));
    lines.push(format!("  Status:   {}", status_badge(&agent.status)));
    lines.push(format!("  Verified: {}", verified_label(agent.verified)));
    if let Some(address) = &agent.solana_address {
        lines.push(format!("  Solana:   {}", address));
    }
    if let Some(address) = &agent.hl_address {
        lines.push(format!("  EVM/HL:   {}", address));
    }
    if agent.total_value_usd > 0.0 {
        lines.push(format!("  Value:    {}", format_usd(agent.total_value_usd)));
        lines.push(format!(
            "  PnL 24h:  {}",
            format_pnl(agent.pnl24h, agent.pnl24h_percent)
        ));
    }
    lines.push(String::new());
    lines.push("Run `cabal-cli status` to check balances.".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AGENT_NAME_ENV, API_KEY_ENV};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn agent_json(total_value: f64) -> serde_json::Value {
        json!({
            "id": "6f1c2a4e-8a51-4a7e-9b0f-1f2d3c4b5a69", "name": "alpha",
            "handle": null, "bio": null, "avatarUrl": null, "strategy": null,
            "status": "pending", "claimed": false, "verified": false,
            "solanaAddress": "So1", "hlAddress": null,
            "totalValueUsd": total_value, "pnl24h": 0.0, "pnl24hPercent": 0.0,
            "pnl7d": 0.0, "pnl7dPercent": 0.0, "pnlAllTime": 0.0,
            "pnlAllTimePercent": 0.0, "rank": null, "currentModel": null,
            "trustLevel": "new", "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        })
    }

    fn client(server: &MockServer, key: &str) -> AgentClient {
        AgentClient::builder()
            .api_key(key)
            .site_url(server.uri())
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn accepted_key_is_saved_and_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/agents/me"))
            .and(header("authorization", "Bearer cabal_new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": true, "data": {"agent": agent_json(0.0)}}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        let (status, gitignore) = connect(
            &client(&server, "cabal_new"),
            &store,
            SecretString::from("cabal_new".to_string()),
            None,
        )
        .await
        .unwrap();

        assert_eq!(status.agent.name, "alpha");
        assert_eq!(gitignore, Some(GitignoreUpdate { created: true, added: false }));
        let saved = store.load().unwrap();
        assert_eq!(saved.get(API_KEY_ENV).map(String::as_str), Some("cabal_new"));
        assert_eq!(saved.get(AGENT_NAME_ENV).map(String::as_str), Some("alpha"));
    }

    #[tokio::test]
    async fn rejected_key_is_not_saved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/agents/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "error": {"code": "UNAUTHORIZED", "message": "Invalid API key"}
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        let err = connect(
            &client(&server, "cabal_bad"),
            &store,
            SecretString::from("cabal_bad".to_string()),
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(!store.env_path().exists());
        assert!(!store.gitignore_path().exists());
    }

    #[test]
    fn summary_shows_value_only_when_funded() {
        let unfunded: AgentStatus =
            serde_json::from_value(json!({"agent": agent_json(0.0)})).unwrap();
        let lines = render_connected(&unfunded, Some(GitignoreUpdate::default()));
        assert_eq!(lines[0], "");
        assert!(lines.contains(&"  Status:   Pending".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("  Value:")));

        let funded: AgentStatus =
            serde_json::from_value(json!({"agent": agent_json(250.0)})).unwrap();
        let lines = render_connected(&funded, None);
        assert!(lines[0].starts_with("Warning: .env is not in .gitignore"));
        assert!(lines.contains(&"  Value:    $250.00".to_string()));
    }
}

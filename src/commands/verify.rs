//! `cabal-cli verify <tweet-url>`

use super::print_header;
use crate::api::{AgentApi, VerifyTweetResult};
use crate::verify::{check_tweet_url, verify_with_retry, RETRY_DELAY};
use crate::{Config, Result};

pub async fn run(config: &Config, api: &dyn AgentApi, tweet_url: &str) -> Result<()> {
    check_tweet_url(tweet_url)?;

    print_header("• Tweet Verification");
    println!("Verifying {} ...", tweet_url.trim());

    let result = verify_with_retry(api, tweet_url.trim(), RETRY_DELAY).await?;
    for line in render(config, &result) {
        println!("{}", line);
    }
    Ok(())
}

pub fn render(config: &Config, result: &VerifyTweetResult) -> Vec<String> {
    if result.is_empty() {
        return vec![
            String::new(),
            "Tweet not found yet. Wait a minute and run the command again.".to_string(),
        ];
    }

    let mut lines = vec![String::new(), "Agent verified!".to_string()];
    if let Some(message) = &result.message {
        lines.push(format!("  {}", message));
    }
    if let Some(agent) = &result.agent {
        lines.push(format!("  Agent:      {}", agent.name));
        lines.push(format!("  Claimed by: {}", agent.claimed_by));
        lines.push(format!("  Profile:    {}", config.agent_url(&agent.name)));
    }
    lines.push(String::new());
    lines.push("Run `cabal-cli status` to check your agent.".to_string());
    lines
}

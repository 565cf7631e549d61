//! Tweet-based claim verification
//!
//! The CLI checks the URL locally, then calls the API. X can take a few
//! seconds to make a fresh tweet visible, so an empty first answer gets
//! exactly one retry after [`RETRY_DELAY`].

use crate::api::{AgentApi, VerifyTweetResult};
use crate::{Error, Result};
use std::time::Duration;
use tracing::info;
use url::Url;

pub const RETRY_DELAY: Duration = Duration::from_secs(15);

const TWEET_HOSTS: &[&str] = &["x.com", "twitter.com"];

/// Check that `raw` is an `x.com`/`twitter.com` status URL.
pub fn check_tweet_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|_| Error::InvalidArgument("Invalid URL format".to_string()))?;

    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("mobile.").unwrap_or(host);
    if !TWEET_HOSTS.contains(&host) {
        return Err(Error::InvalidArgument(
            "URL must be from x.com or twitter.com".to_string(),
        ));
    }

    if !is_status_path(url.path()) {
        return Err(Error::InvalidArgument(
            "Invalid tweet URL format. Expected: https://x.com/<handle>/status/<id>".to_string(),
        ));
    }
    Ok(url)
}

/// `/<handle>/status/<digits>`, anything may follow the id
fn is_status_path(path: &str) -> bool {
    let mut parts = path.trim_start_matches('/').splitn(3, '/');
    let handle = parts.next().unwrap_or_default();
    let status = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();
    let id_len = rest.chars().take_while(char::is_ascii_digit).count();
    path.starts_with('/') && !handle.is_empty() && status == "status" && id_len > 0
}

/// Verify with a single fixed-delay retry when the first answer is empty.
///
/// Errors are never retried. The second answer is returned as is, even when
/// it is still empty.
pub async fn verify_with_retry(
    api: &dyn AgentApi,
    tweet_url: &str,
    delay: Duration,
) -> Result<VerifyTweetResult> {
    let first = api.verify_tweet(tweet_url).await?;
    if !first.is_empty() {
        return Ok(first);
    }

    info!(attempt = 1, delay_secs = delay.as_secs(), "Tweet not visible yet, retrying");
    tokio::time::sleep(delay).await;
    api.verify_tweet(tweet_url).await
}

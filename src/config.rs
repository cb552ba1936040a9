use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::feed::rules::NotificationRules;
use crate::feed::store::DEFAULT_PURGE_DELAY;
use crate::token::identifier::NameAffixes;
use crate::token::ticker::TickerMode;

/// Default base for the HTTP shim that fronts the third-party services.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";

/// Central configuration loaded from environment variables.
///
/// Secrets (feed token, wallet keys) come from env vars only. The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    /// WebSocket URL of the feed relay
    pub feed_url: String,
    /// Bearer token sent once after connecting to the feed
    pub feed_token: Option<String>,
    pub deploy_api_url: String,
    pub wallet_api_url: String,
    pub balance_api_url: String,
    pub tweet_api_url: String,
    /// Prepended/appended to every derived token name
    pub name_affixes: NameAffixes,
    /// Ticker mode used when the command line doesn't pick one
    pub ticker_mode: TickerMode,
    /// JSON file mapping handles to highlight colors
    pub highlight_rules_path: Option<PathBuf>,
    pub default_highlight_color: Option<String>,
    /// Grace delay before a deactivated account's posts are purged
    pub purge_delay: Duration,
    pub deploy_platform: String,
    /// Initial buy, in SOL
    pub deploy_amount: f64,
    /// Composite wallet keys, from DEPLOY_WALLETS (comma-separated)
    pub deploy_wallets: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the feed URL and token, which are
    /// only checked by commands that connect to the feed.
    pub fn load() -> Result<Self> {
        let ticker_mode = match env::var("TICKER_MODE") {
            Ok(mode) => mode
                .parse()
                .context("TICKER_MODE is not a valid ticker mode")?,
            Err(_) => TickerMode::default(),
        };

        let purge_delay = match env::var("PURGE_DELAY_MS") {
            Ok(ms) => Duration::from_millis(
                ms.trim()
                    .parse()
                    .with_context(|| format!("PURGE_DELAY_MS must be milliseconds, got {ms:?}"))?,
            ),
            Err(_) => DEFAULT_PURGE_DELAY,
        };

        let deploy_amount = match env::var("DEPLOY_AMOUNT") {
            Ok(amount) => amount
                .trim()
                .parse()
                .with_context(|| format!("DEPLOY_AMOUNT must be a number, got {amount:?}"))?,
            Err(_) => 0.0,
        };

        Ok(Self {
            feed_url: env::var("FEED_URL").unwrap_or_default(),
            feed_token: non_empty_var("FEED_TOKEN"),
            deploy_api_url: api_url("DEPLOY_API_URL", "deploy"),
            wallet_api_url: api_url("WALLET_API_URL", "wallet/import"),
            balance_api_url: api_url("BALANCE_API_URL", "balance"),
            tweet_api_url: api_url("TWEET_API_URL", "tweet"),
            name_affixes: NameAffixes::new(
                &env::var("TOKEN_NAME_PREFIX").unwrap_or_default(),
                &env::var("TOKEN_NAME_SUFFIX").unwrap_or_default(),
            ),
            ticker_mode,
            highlight_rules_path: non_empty_var("HIGHLIGHT_RULES_PATH").map(PathBuf::from),
            default_highlight_color: non_empty_var("DEFAULT_HIGHLIGHT_COLOR"),
            purge_delay,
            deploy_platform: env::var("DEPLOY_PLATFORM").unwrap_or_else(|_| "pump".to_string()),
            deploy_amount,
            deploy_wallets: parse_wallets(&env::var("DEPLOY_WALLETS").unwrap_or_default()),
        })
    }

    /// Check that the feed relay is configured.
    pub fn require_feed(&self) -> Result<()> {
        if self.feed_url.is_empty() {
            anyhow::bail!(
                "FEED_URL not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        if self.feed_token.is_none() {
            anyhow::bail!(
                "FEED_TOKEN not set. The feed relay requires a bearer token.\n\
                 Add it to your .env file."
            );
        }
        Ok(())
    }

    /// Check that at least one wallet is available for deploys.
    pub fn require_wallets(&self) -> Result<()> {
        if self.deploy_wallets.is_empty() {
            anyhow::bail!(
                "DEPLOY_WALLETS not set. Import a key with `launchdeck import-wallet`\n\
                 and add the printed composite key to DEPLOY_WALLETS in your .env file."
            );
        }
        Ok(())
    }

    /// Highlight rules from HIGHLIGHT_RULES_PATH, or only the default color.
    pub fn notification_rules(&self) -> Result<NotificationRules> {
        match &self.highlight_rules_path {
            Some(path) => NotificationRules::load(path, self.default_highlight_color.clone()),
            None => Ok(NotificationRules::new(
                Default::default(),
                self.default_highlight_color.clone(),
            )),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn api_url(key: &str, path: &str) -> String {
    non_empty_var(key).unwrap_or_else(|| format!("{DEFAULT_API_BASE}/{path}"))
}

/// Split a comma-separated wallet list, dropping blanks.
pub fn parse_wallets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wallets() {
        assert_eq!(parse_wallets("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_wallets("").is_empty());
        assert!(parse_wallets(" , ").is_empty());
    }
}

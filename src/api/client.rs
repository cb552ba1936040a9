// Collaborator API client — wallet import, balance and tweet lookup.
//
// Thin reqwest wrapper around the HTTP shim that fronts the third-party
// services. Each endpoint is a plain JSON request/response; the shapes are
// below. Tweet lookups go through the same normalizer as the live feed.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::feed::model::Post;
use crate::feed::normalize::normalize_post;
use crate::feed::rules::NotificationRules;

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// HTTP client for the wallet, balance and tweet-lookup endpoints.
pub struct ApiClient {
    client: Client,
    wallet_url: String,
    balance_url: String,
    tweet_url: String,
}

impl ApiClient {
    pub fn new(wallet_url: &str, balance_url: &str, tweet_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("launchdeck/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            wallet_url: wallet_url.trim_end_matches('/').to_string(),
            balance_url: balance_url.trim_end_matches('/').to_string(),
            tweet_url: tweet_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.wallet_api_url, &config.balance_api_url, &config.tweet_api_url)
    }

    /// Exchange a raw private key for the opaque composite key the deploy
    /// service expects in `wallets`.
    pub async fn import_wallet(&self, private_key: &str) -> Result<String> {
        let private_key = private_key.trim();
        if private_key.is_empty() {
            anyhow::bail!("Private key is empty");
        }

        let response = self
            .client
            .post(&self.wallet_url)
            .json(&ImportWalletRequest { private_key })
            .send()
            .await
            .context("Failed to reach the wallet import service")?;

        let resp: ImportWalletResponse = read_json(response, "wallet import").await?;
        Ok(resp.key)
    }

    /// Balance of a public key, in lamports.
    pub async fn balance(&self, public_key: &str) -> Result<u64> {
        let response = self
            .client
            .get(&self.balance_url)
            .query(&[("publicKey", public_key)])
            .send()
            .await
            .context("Failed to reach the balance service")?;

        let resp: BalanceResponse = read_json(response, "balance lookup").await?;
        debug!(public_key = public_key, lamports = resp.balance, "Fetched balance");
        Ok(resp.balance)
    }

    /// Fetch one post by status id and normalize it.
    pub async fn lookup_tweet(&self, status_id: &str, rules: &NotificationRules) -> Result<Post> {
        let url = format!("{}/{}", self.tweet_url, status_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to look up status {status_id}"))?;

        let payload: Value = read_json(response, "tweet lookup").await?;
        Ok(normalize_post(unwrap_lookup(&payload), rules))
    }
}

/// Lookup responses are either the post itself or `{"tweet": ...}` /
/// `{"data": ...}` around it.
pub fn unwrap_lookup(payload: &Value) -> &Value {
    ["tweet", "data"]
        .iter()
        .find_map(|key| payload.get(key).filter(|v| v.is_object()))
        .unwrap_or(payload)
}

/// Format lamports as SOL with up to 9 decimals, trailing zeros trimmed.
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return format!("{whole} SOL");
    }
    let frac = format!("{frac:09}");
    format!("{whole}.{} SOL", frac.trim_end_matches('0'))
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        anyhow::bail!("{what} returned {status}: {message}");
    }

    response
        .json::<T>()
        .await
        .with_context(|| format!("Failed to parse {what} response"))
}

// -- Request/response shapes --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportWalletRequest<'a> {
    private_key: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ImportWalletResponse {
    #[serde(alias = "compositeKey")]
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct BalanceResponse {
    #[serde(alias = "lamports")]
    pub balance: u64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

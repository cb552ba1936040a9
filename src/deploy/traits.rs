// Deployer trait — the seam between token metadata and the launch service.
//
// The HTTP implementation lives in http.rs. Keeping the trait separate lets
// the CLI and tests run against anything that can create a token.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::token::identifier::TokenIdentifier;

/// One deploy request, sent exactly once per user action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeployRequest {
    pub platform: String,
    pub name: String,
    pub symbol: String,
    /// Image URL for the token.
    pub image: String,
    /// Initial buy amount, in SOL.
    pub amount: f64,
    /// Composite wallet keys from the wallet-import service.
    pub wallets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

impl DeployRequest {
    pub fn new(
        platform: &str,
        identifier: TokenIdentifier,
        image: &str,
        amount: f64,
        wallets: Vec<String>,
    ) -> Self {
        Self {
            platform: platform.to_string(),
            name: identifier.name,
            symbol: identifier.symbol,
            image: image.to_string(),
            amount,
            wallets,
            website: None,
            twitter: None,
        }
    }

    /// Check the request before it goes out. The service would reject these
    /// anyway, but with a less useful message.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("could not generate token name");
        }
        if self.symbol.is_empty() {
            anyhow::bail!("Token symbol is empty");
        }
        if self.wallets.is_empty() {
            anyhow::bail!(
                "No wallets configured. Set DEPLOY_WALLETS or run `launchdeck import-wallet` first."
            );
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            anyhow::bail!("Deploy amount must be a non-negative number, got {}", self.amount);
        }
        Ok(())
    }
}

/// A successful deploy: the mint address and the transaction signatures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeployResult {
    pub mint: String,
    #[serde(default)]
    pub signatures: Vec<String>,
}

/// Anything that can create a token. No retries: a deploy either returns a
/// mint or fails with the service's message.
#[async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(&self, request: &DeployRequest) -> Result<DeployResult>;
}

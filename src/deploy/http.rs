// HTTP deployer — posts deploy requests to the launch service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use super::traits::{DeployRequest, DeployResult, Deployer};

/// Deploy service client.
pub struct HttpDeployer {
    client: Client,
    url: String,
}

impl HttpDeployer {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("launchdeck/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Deployer for HttpDeployer {
    async fn deploy(&self, request: &DeployRequest) -> Result<DeployResult> {
        request.validate()?;

        debug!(
            platform = %request.platform,
            symbol = %request.symbol,
            wallets = request.wallets.len(),
            "Sending deploy request"
        );

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .context("Failed to reach the deploy service")?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let result = interpret_deploy_response(status, &body)?;

        info!(mint = %result.mint, signatures = result.signatures.len(), "Token deployed");
        Ok(result)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeployResponse {
    Success(DeployResult),
    Failure { error: String },
}

/// Turn the service's reply into a result. Failure messages are passed
/// through verbatim so the user sees exactly what the service said.
pub fn interpret_deploy_response(status: StatusCode, body: &str) -> Result<DeployResult> {
    match serde_json::from_str::<DeployResponse>(body) {
        Ok(DeployResponse::Success(result)) if status.is_success() => Ok(result),
        Ok(DeployResponse::Failure { error }) => anyhow::bail!("{error}"),
        _ if status.is_success() => {
            anyhow::bail!("Deploy service returned an unexpected response: {body}")
        }
        _ => {
            let body = body.trim();
            if body.is_empty() {
                anyhow::bail!("Deploy service returned {status}");
            }
            anyhow::bail!("{body}")
        }
    }
}

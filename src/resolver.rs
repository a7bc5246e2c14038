use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::ApiConfig;
use crate::download::VideoAsset;
use crate::error::{LoomError, Result};
use crate::share::ShareLink;

/// Turns a share link into a directly fetchable media location.
#[async_trait]
pub trait VideoResolver: Send + Sync {
    async fn resolve(&self, link: &ShareLink) -> Result<VideoAsset>;
}

#[derive(Debug, Deserialize)]
struct TranscodedUrlResponse {
    #[serde(default)]
    url: Option<String>,
}

/// Resolver backed by Loom's transcoded-url endpoint.
#[derive(Debug, Clone)]
pub struct LoomResolver {
    client: Client,
    base_url: String,
}

impl LoomResolver {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(api.request_timeout())
            .user_agent(api.user_agent.as_str())
            .build()
            .map_err(|e| LoomError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, id: &str) -> String {
        format!(
            "{}/api/campaigns/sessions/{}/transcoded-url",
            self.base_url, id
        )
    }
}

#[async_trait]
impl VideoResolver for LoomResolver {
    async fn resolve(&self, link: &ShareLink) -> Result<VideoAsset> {
        let endpoint = self.endpoint(&link.id);
        debug!("POST {}", endpoint);

        let response = self.client.post(&endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoomError::ResolutionFailed {
                id: link.id.clone(),
                reason: format!("HTTP {}", status),
            });
        }

        let body: TranscodedUrlResponse =
            response
                .json()
                .await
                .map_err(|e| LoomError::ResolutionFailed {
                    id: link.id.clone(),
                    reason: format!("unexpected response: {}", e),
                })?;

        match body.url {
            Some(url) if !url.trim().is_empty() => Ok(VideoAsset::new(url)),
            _ => Err(LoomError::ResolutionFailed {
                id: link.id.clone(),
                reason: "response did not contain a media URL".to_string(),
            }),
        }
    }
}

//! Client for the relational metadata service.
//!
//! Three endpoints matter to the engine: the community/channel graph, the
//! per-channel provisioning sync, and the whole-account resync used by the
//! self-heal path. The trait exists so tests run against an in-memory fake;
//! production wires up [`HttpMetadataClient`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{ChannelRecord, ChannelRef, Community};

/// One element of the `GET /communities-with-channels` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityWithChannels {
    pub community: Community,
    pub channels: Vec<ChannelRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncChannelResponse {
    #[serde(default)]
    messaging_channel_ref: Option<ChannelRef>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata service transport failure: {message}")]
    Transport { message: String },
    #[error("metadata service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// `GET /communities-with-channels`, the full graph for the session's
    /// account.
    async fn communities_with_channels(&self)
        -> Result<Vec<CommunityWithChannels>, MetadataError>;

    /// `POST /channels/{id}/sync`. Asks the metadata service to provision the
    /// channel in the messaging service; returns the linkage if it now has
    /// one. `Ok(None)` means provisioning did not produce a ref yet.
    async fn sync_channel(&self, channel_id: &str) -> Result<Option<ChannelRef>, MetadataError>;

    /// `POST /account/resync-channels`, the fire-and-forget repair trigger
    /// behind the self-heal path.
    async fn resync_account(&self) -> Result<(), MetadataError>;
}

/// Metadata service client over HTTP.
pub struct HttpMetadataClient {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl HttpMetadataClient {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            client: reqwest::Client::new(),
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, MetadataError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(MetadataError::Rejected { status, message })
    }

    fn transport(err: reqwest::Error) -> MetadataError {
        MetadataError::Transport {
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl MetadataApi for HttpMetadataClient {
    async fn communities_with_channels(
        &self,
    ) -> Result<Vec<CommunityWithChannels>, MetadataError> {
        let url = format!("{}/communities-with-channels", self.base_url);
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(Self::transport)?;
        let response = Self::check(response).await?;
        response
            .json::<Vec<CommunityWithChannels>>()
            .await
            .map_err(Self::transport)
    }

    async fn sync_channel(&self, channel_id: &str) -> Result<Option<ChannelRef>, MetadataError> {
        let url = format!("{}/channels/{}/sync", self.base_url, channel_id);
        let response = self
            .authorized(self.client.post(&url))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(Self::transport)?;
        let response = Self::check(response).await?;
        let parsed: SyncChannelResponse = response.json().await.map_err(Self::transport)?;
        Ok(parsed.messaging_channel_ref)
    }

    async fn resync_account(&self) -> Result<(), MetadataError> {
        let url = format!("{}/account/resync-channels", self.base_url);
        let response = self
            .authorized(self.client.post(&url))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::check(response).await?;
        Ok(())
    }
}

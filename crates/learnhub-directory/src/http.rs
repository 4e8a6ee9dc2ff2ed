//! HTTP client for the authentication service

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{DirectoryError, UserDirectory, UserRecord};

/// Directory that resolves users with `GET {base_url}/users/{id}`
#[derive(Clone)]
pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserDirectory {
    /// Create a client whose every request is bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, DirectoryError> {
        let url = format!("{}/users/{}", self.base_url, id);
        debug!("Fetching user {} from {}", id, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Authentication service request failed: {}", e);
            DirectoryError::Unavailable(e.to_string())
        })?;

        match response.status() {
            StatusCode::OK => response
                .json::<UserRecord>()
                .await
                .map(Some)
                .map_err(|e| DirectoryError::Decode(e.to_string())),
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(DirectoryError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

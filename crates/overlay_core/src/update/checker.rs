//! GitHub "latest release" lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::version::{is_newer, normalize};
use crate::config::UpdateSettings;

/// Why an update check could not complete. Never fatal.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Release server answered HTTP {0}")]
    Status(u16),

    #[error("Release has no version tag")]
    MissingTag,

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// The part of the release descriptor we read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub html_url: String,
}

/// A newer release than the running one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub current_version: String,
    /// Without the tag's `v` prefix.
    pub latest_version: String,
    pub release_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    Available(VersionInfo),
    UpToDate,
}

/// `<api_base>/repos/<repository>/releases/latest`
pub fn latest_release_url(api_base: &str, repository: &str) -> String {
    format!(
        "{}/repos/{}/releases/latest",
        api_base.trim_end_matches('/'),
        repository.trim_matches('/')
    )
}

/// Compare a fetched release against the running version.
pub fn evaluate(current: &str, release: &Release) -> Result<UpdateStatus, CheckError> {
    let latest = normalize(&release.tag_name);
    if latest.is_empty() {
        return Err(CheckError::MissingTag);
    }

    if is_newer(latest, current) {
        Ok(UpdateStatus::Available(VersionInfo {
            current_version: normalize(current).to_string(),
            latest_version: latest.to_string(),
            release_url: release.html_url.clone(),
        }))
    } else {
        Ok(UpdateStatus::UpToDate)
    }
}

/// Performs a single, non-retrying release lookup.
#[derive(Debug, Clone)]
pub struct UpdateChecker {
    client: reqwest::Client,
    url: String,
}

impl UpdateChecker {
    pub fn new(settings: &UpdateSettings) -> Result<Self, CheckError> {
        let client = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| CheckError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: latest_release_url(&settings.api_base, &settings.repository),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the latest release and compare it with `current_version`.
    pub async fn check(&self, current_version: &str) -> Result<UpdateStatus, CheckError> {
        tracing::debug!("Checking for updates at {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CheckError::Status(response.status().as_u16()));
        }

        let release: Release = response.json().await?;
        let status = evaluate(current_version, &release)?;

        match &status {
            UpdateStatus::Available(info) => {
                tracing::info!("Update available: {}", info.latest_version)
            }
            UpdateStatus::UpToDate => tracing::info!("Application is up to date"),
        }
        Ok(status)
    }
}

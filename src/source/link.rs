//! CSV-export links: marker pre-flight check, then a bounded blocking fetch.

use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::config::SourceConfig;
use crate::error::ReadError;

/// A link that was not fetched because it does not look like a CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkWarning {
    pub url: String,
    pub message: String,
}

/// Returns a warning when `url` lacks the export marker. No network access.
pub(crate) fn check_link(url: &str, marker: &str) -> Option<LinkWarning> {
    if url.contains(marker) {
        return None;
    }
    Some(LinkWarning {
        url: url.to_string(),
        message: format!("Make sure the link ends with `{}`", marker),
    })
}

pub(crate) struct LinkFetcher {
    client: reqwest::blocking::Client,
}

impl LinkFetcher {
    pub(crate) fn new(config: &SourceConfig) -> Result<Self, ReadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ReadError::io("http client", e))?;
        Ok(Self { client })
    }

    /// GET the link body. Non-success statuses are failures carrying status and body.
    pub(crate) fn fetch(&self, url: &str) -> Result<Vec<u8>, ReadError> {
        let res = self
            .client
            .get(url)
            .send()
            .map_err(|e| ReadError::io(url, e))?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().unwrap_or_default();
            return Err(ReadError::io(url, format!("{} {}", status, text.trim())));
        }
        let body = res.bytes().map_err(|e| ReadError::io(url, e))?;
        info!(url = %url, bytes = body.len(), "link fetched");
        Ok(body.to_vec())
    }
}

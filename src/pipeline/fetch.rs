//! Fetcher: download the raw bytes behind a URL.
//!
//! The response `Content-Type` is logged but never trusted. Format detection
//! happens downstream by sniffing the bytes (PDF signature, UTF-8 decode,
//! HTML parse), because origins frequently send a wrong or missing type.

use crate::config::SummaryConfig;
use crate::error::ExtractionFailure;
use crate::pipeline::input::is_url;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP GET with a deadline, a browser-like user agent and redirect following.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout_secs: u64,
    max_bytes: u64,
}

impl Fetcher {
    /// Build a fetcher from the download settings in `config`.
    pub fn new(config: &SummaryConfig) -> Result<Self, ExtractionFailure> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ExtractionFailure::DownloadError {
                url: String::new(),
                detail: format!("HTTP client could not be built: {e}"),
            })?;

        Ok(Self {
            client,
            timeout_secs: config.download_timeout_secs,
            max_bytes: config.max_download_bytes,
        })
    }

    /// Download `url` and return the body bytes.
    ///
    /// Non-2xx statuses, timeouts, network faults and oversized bodies all
    /// map to [`ExtractionFailure::DownloadError`].
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExtractionFailure> {
        let download_error = |detail: String| ExtractionFailure::DownloadError {
            url: url.to_string(),
            detail,
        };

        if !is_url(url) {
            return Err(download_error(
                "not an HTTP/HTTPS URL".to_string(),
            ));
        }

        info!("Downloading document from: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                download_error(format!("timed out after {}s", self.timeout_secs))
            } else {
                download_error(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("HTTP {status}")));
        }

        debug!(
            "Status {}, content-type {:?}",
            status,
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
        );

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(download_error(format!(
                    "response of {len} bytes exceeds the {} byte limit",
                    self.max_bytes
                )));
            }
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                download_error(format!("timed out after {}s", self.timeout_secs))
            } else {
                download_error(e.to_string())
            }
        })?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(download_error(format!(
                "response of {} bytes exceeds the {} byte limit",
                bytes.len(),
                self.max_bytes
            )));
        }

        info!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

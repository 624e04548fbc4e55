//! Print service client
//!
//! Talks to the local HTTP print service that drives the receipt printer.
//! Every call is a single attempt; there is no retry.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::PrinterConfig;
use crate::error::{Error, Result};

/// Body of `POST /print/text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintTextRequest {
    pub font_size: u32,

    /// Only sent when set; the print service treats absence as `false`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub chat_mode: bool,

    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_amount: Option<u32>,
}

impl PrintTextRequest {
    pub fn new(text: impl Into<String>, font_size: u32) -> Self {
        Self {
            font_size,
            chat_mode: false,
            text: text.into(),
            font_name: None,
            energy: None,
            feed_amount: None,
        }
    }

    pub fn chat_mode(mut self, chat_mode: bool) -> Self {
        self.chat_mode = chat_mode;
        self
    }

    /// Copy the pass-through print options from configuration
    pub fn with_printer_options(mut self, config: &PrinterConfig) -> Self {
        self.font_name = config.font_name.clone();
        self.energy = config.energy;
        self.feed_amount = config.feed_amount;
        self
    }
}

/// Response of `GET /status`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrintServiceStatus {
    pub queue_size: u64,
    pub status: String,
}

/// HTTP client for the print service
#[derive(Clone)]
pub struct PrintClient {
    client: Client,
    base_url: String,
}

impl PrintClient {
    /// Create a client for the given base URL
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `[printer]` section
    pub fn from_config(config: &PrinterConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout_secs.map(Duration::from_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a text job
    pub async fn print_text(&self, request: &PrintTextRequest) -> Result<()> {
        let url = format!("{}/print/text", self.base_url);

        debug!("Sending print job to {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let response = Self::check_status(response, "Print text").await?;

        let body = response.text().await.unwrap_or_default();
        debug!("Print service accepted job: {}", body);
        Ok(())
    }

    /// Query the print queue
    pub async fn status(&self) -> Result<PrintServiceStatus> {
        let url = format!("{}/status", self.base_url);

        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response, "Status").await?;

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Drop every pending job
    pub async fn clear_queue(&self) -> Result<()> {
        let url = format!("{}/queue/clear", self.base_url);

        let response = self.client.post(&url).send().await?;
        Self::check_status(response, "Clear queue").await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("{} failed: {} - {}", what, status, body);
        Err(Error::PrintService {
            status: status.as_u16(),
            body,
        })
    }
}

//! Blocking fetch of a Prometheus `/metrics` endpoint.
//!
//! Retries, authentication and scheduling are left to the caller; a fetch is
//! one GET whose body is handed to the parser unchanged.

use std::time::Duration;

use log::{debug, warn};
use reqwest::{blocking::Client, header::ACCEPT, StatusCode};
use serde::Deserialize;

use crate::{parse_bytes, Error, Metric, MetricsExposition};

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "snake_case")]
/// Configuration for scraping a single endpoint
pub struct ClientConfig {
    /// URL to scrape
    #[serde(default = "default_url")]
    pub url: String,
    /// Request timeout. Leave unset to wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Overrides the `User-Agent` header
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_url() -> String {
    String::from("http://localhost:8080/metrics")
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: default_url(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrometheusClient {
    url: String,
    client: Client,
}

impl PrometheusClient {
    pub fn new(config: ClientConfig) -> Result<PrometheusClient, Error> {
        let user_agent = config.user_agent.unwrap_or_else(|| {
            format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        });

        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(PrometheusClient {
            url: config.url,
            client: builder.build()?,
        })
    }

    pub fn from_url(url: &str) -> Result<PrometheusClient, Error> {
        Self::new(ClientConfig {
            url: url.to_owned(),
            ..Default::default()
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches and parses the endpoint. Any status other than 200 is an
    /// [`Error::UnexpectedStatusCode`] and the body is never read. The body is
    /// parsed as received; invalid UTF-8 is an [`Error::Utf8`].
    pub fn get_metrics(&self) -> Result<Vec<Metric>, Error> {
        debug!("fetching metrics from {}", self.url);

        let response = self.client.get(&self.url).header(ACCEPT, TEXT_FORMAT).send()?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("{} responded with {}", self.url, status);
            return Err(Error::UnexpectedStatusCode(status.as_u16()));
        }

        let body = response.bytes()?;
        parse_bytes(&body)
    }

    /// Like [`PrometheusClient::get_metrics`], with histograms and summaries upgraded
    pub fn get_exposition(&self) -> Result<MetricsExposition, Error> {
        let metrics = self.get_metrics()?;

        Ok(MetricsExposition::from_metrics(metrics)?)
    }
}

//! URL and file sources

use crate::error::{Error, Result};
use crate::types::JsonValue;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Options for fetching input data
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    /// Headers sent with URL requests
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Request timeout
    #[serde(skip, default = "default_timeout")]
    pub timeout: Duration,
    /// User agent string
    #[serde(skip, default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("json2dart/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            headers: HashMap::new(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    /// Read the config from a resolved `fromOption` object
    pub fn from_value(value: JsonValue) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::config(format!("fromOption: {e}")))
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetched input
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    /// URL or the path the data was actually read from
    pub from: String,
    /// Parsed JSON
    pub data: JsonValue,
}

/// Whether `source` is fetched over HTTP rather than read from disk
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads JSON from URLs and files
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    base_dir: Option<PathBuf>,
}

impl Fetcher {
    /// Create a fetcher
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            config,
            base_dir: None,
        })
    }

    /// Resolve relative file sources against `dir` instead of the process
    /// working directory
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Fetch `source`; relative paths not found from the working directory
    /// are retried under `fallback_dir`
    pub async fn fetch(&self, source: &str, fallback_dir: &Path) -> Result<Fetched> {
        if is_url(source) {
            let url = Url::parse(source)?;
            let data = self.get(url).await?;
            return Ok(Fetched {
                from: source.to_string(),
                data,
            });
        }

        let path = PathBuf::from(source);
        let first = match &self.base_dir {
            Some(base) => base.join(&path),
            None => path.clone(),
        };
        match read_json(&first).await {
            Err(e) if e.is_not_found() && path.is_relative() => {
                let fallback = fallback_dir.join(&path);
                debug!(path = %fallback.display(), "retrying input under output directory");
                let data = read_json(&fallback).await?;
                Ok(Fetched {
                    from: fallback.display().to_string(),
                    data,
                })
            }
            Err(e) => Err(e),
            Ok(data) => Ok(Fetched {
                from: first.display().to_string(),
                data,
            }),
        }
    }

    async fn get(&self, url: Url) -> Result<JsonValue> {
        let mut request = self.client.get(url.clone());
        for (key, value) in &self.config.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "fetched input");

        if status != StatusCode::OK {
            return Err(Error::http_status(status.as_u16(), body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

async fn read_json(path: &Path) -> Result<JsonValue> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    Ok(serde_json::from_str(&text)?)
}

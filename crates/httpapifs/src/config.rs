use crate::transport::TransportConfig;
use anyhow::Context;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpApiFsConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Listing key sent for the root directory
    pub root: String,
    /// 0 disables the request timeout
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Drop the parent listing after `makedir` and uploads
    pub invalidate_after_create: bool,
}

impl Default for HttpApiFsConfig {
    fn default() -> Self {
        Self {
            url: String::from("http://localhost:8080/"),
            username: None,
            password: None,
            root: String::from("/"),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            invalidate_after_create: true,
        }
    }
}

impl HttpApiFsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Loads a TOML or JSON file, chosen by extension, and validates it.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let config: HttpApiFsConfig = match ext.as_str() {
            "toml" => toml::from_str(&contents)?,
            "json" => serde_json::from_str(&contents)?,
            _ => anyhow::bail!("Unsupported config file extension: {}", ext),
        };
        config.validate()?;
        Ok(config)
    }

    /// The endpoint must be an http(s) URL and the root marker non-empty.
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.url).with_context(|| format!("invalid url '{}'", self.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("url '{}' must use http or https", self.url);
        }
        if self.root.trim().is_empty() {
            anyhow::bail!("root marker must not be empty");
        }
        Ok(())
    }

    pub fn transport(&self) -> TransportConfig {
        let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));
        TransportConfig {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: secs(self.timeout_secs),
            connect_timeout: secs(self.connect_timeout_secs),
        }
    }
}

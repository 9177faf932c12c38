use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Locations of the pre-trained artifacts loaded at startup.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub vectorizer_path: PathBuf,
    pub classifier_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests never touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a valid port: {raw:?}"))?,
            None => 5000,
        };
        let model = ModelConfig {
            vectorizer_path: lookup("VECTORIZER_PATH")
                .unwrap_or_else(|| "model/vectorizer.json".into())
                .into(),
            classifier_path: lookup("CLASSIFIER_PATH")
                .unwrap_or_else(|| "model/classifier.json".into())
                .into(),
        };
        Ok(Self { host, port, model })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

//! Environment-driven configuration
//!
//! Values come from the process environment (after `dotenvy` has loaded an
//! optional `.env`). Lookups go through [`Env`] so tests can feed a map instead
//! of mutating global state.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use tracing::info;

/// Source of configuration values
pub struct Env {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl Env {
    /// Read from the process environment
    pub fn process() -> Self {
        Self {
            lookup: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Read from a fixed set of values
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self {
            lookup: Box::new(move |name| values.get(name).cloned()),
        }
    }

    /// Raw value; blank values count as unset
    pub fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    pub fn string(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| {
            info!("{} not set, using default: {}", name, default);
            default.to_string()
        })
    }

    /// Parse a value, falling back to `default` when unset
    pub fn parse<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|err| anyhow!("invalid value '{}' for {}: {}", raw, name, err)),
            None => Ok(default),
        }
    }
}

/// Where entities are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Memory,
    S3,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "s3" => Ok(Self::S3),
            other => Err(format!("expected 'memory' or 's3', got '{}'", other)),
        }
    }
}

/// How identifier sequences survive restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceMode {
    /// Rebuild in-process counters from the highest stored id at startup
    #[default]
    Rescan,
    /// Keep counters in the store itself
    Durable,
}

impl FromStr for SequenceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rescan" => Ok(Self::Rescan),
            "durable" => Ok(Self::Durable),
            other => Err(format!("expected 'rescan' or 'durable', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` alone, so tracing can be installed before the rest of
    /// the configuration is read
    pub fn from_env(env: &Env) -> Result<Self> {
        env.parse("LOG_FORMAT", Self::default())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{}'", other)),
        }
    }
}

/// Settings common to both services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedConfig {
    pub storage: StorageBackend,
    pub bucket: String,
    pub id_sequence: SequenceMode,
}

impl SharedConfig {
    pub fn from_env(env: &Env) -> Result<Self> {
        let config = Self {
            storage: env.parse("STORAGE_BACKEND", StorageBackend::default())?,
            bucket: env.string("WASTEWISE_BUCKET", "wastewise"),
            id_sequence: env.parse("ID_SEQUENCE", SequenceMode::default())?,
        };

        if config.id_sequence == SequenceMode::Durable && config.storage == StorageBackend::Memory {
            return Err(anyhow!(
                "ID_SEQUENCE=durable requires STORAGE_BACKEND=s3"
            ));
        }
        Ok(config)
    }
}

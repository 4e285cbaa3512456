//! Service configuration loaded from the environment.

use crate::ai::gemini::client::DEFAULT_BASE_URL;
use crate::media;
use crate::{Error, Result};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SUPPORTED_IMAGE_TYPES: &str = "image/jpeg,image/png,image/webp";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_vision_model: String,
    pub gemini_base_url: String,
    pub max_attempts: usize,
    pub timeout: Duration,
    pub max_image_size_mb: usize,
    pub supported_image_types: Vec<String>,
    pub rate_limit_per_minute: u32,
    pub bind_address: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let max_attempts: usize = parse_or(&lookup, "MAX_ATTEMPTS", 3)?;
        if max_attempts == 0 {
            return Err(Error::Config("MAX_ATTEMPTS must be at least 1".to_string()));
        }

        let max_image_size_mb: usize = parse_or(&lookup, "MAX_IMAGE_SIZE_MB", 5)?;
        if media::checked_max_bytes(max_image_size_mb).is_none() {
            return Err(Error::Config(format!(
                "MAX_IMAGE_SIZE_MB is too large: {}",
                max_image_size_mb
            )));
        }

        Ok(Self {
            gemini_api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-pro".to_string()),
            gemini_vision_model: lookup("GEMINI_VISION_MODEL")
                .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_attempts,
            timeout: Duration::from_secs(parse_or(&lookup, "TIMEOUT_SECONDS", 30)?),
            max_image_size_mb,
            supported_image_types: lookup("SUPPORTED_IMAGE_TYPES")
                .unwrap_or_else(|| DEFAULT_SUPPORTED_IMAGE_TYPES.to_string())
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            rate_limit_per_minute: parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", 60)?,
            bind_address: parse_or(&lookup, "BIND_ADDRESS", SocketAddr::from(([0, 0, 0, 0], 8000)))?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", key, raw))),
        None => Ok(default),
    }
}

//! Provider settings resolution for tohong-ai
//!
//! API key priority: ENV → TOML. Base URL and model may be overridden by
//! environment variables; everything else comes from the TOML file or its
//! defaults.

use std::time::Duration;
use tohong_common::config::TomlConfig;
use tohong_common::{Error, Result};
use tracing::{info, warn};

pub const API_KEY_ENV_VAR: &str = "TOHONG_PROVIDER_API_KEY";
pub const BASE_URL_ENV_VAR: &str = "TOHONG_PROVIDER_BASE_URL";
pub const MODEL_ENV_VAR: &str = "TOHONG_PROVIDER_MODEL";

/// Fully resolved provider connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
    pub temperature: f32,
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the provider API key from environment then TOML
pub fn resolve_provider_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV_VAR)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .provider
        .api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("Provider API key found in both environment and TOML. Using environment (highest priority).");
    }

    if let Some(key) = env_key {
        info!("Provider API key loaded from environment variable");
        return Ok(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("Provider API key loaded from TOML config");
        return Ok(key.trim().to_string());
    }

    Err(Error::Config(format!(
        "Provider API key not configured. Please configure using one of:\n\
         1. Environment: {API_KEY_ENV_VAR}=your-key-here\n\
         2. TOML config: [provider] api_key = \"your-key\""
    )))
}

/// Resolve all provider settings
pub fn resolve_provider_settings(toml_config: &TomlConfig) -> Result<ProviderSettings> {
    let api_key = resolve_provider_api_key(toml_config)?;

    let base_url = std::env::var(BASE_URL_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| toml_config.provider.base_url.clone());
    let model = std::env::var(MODEL_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| toml_config.provider.model.clone());

    if toml_config.provider.timeout_secs == 0 {
        return Err(Error::Config("provider.timeout_secs must be greater than 0".to_string()));
    }

    Ok(ProviderSettings {
        base_url: base_url.trim().trim_end_matches('/').to_string(),
        model: model.trim().to_string(),
        api_key,
        timeout: Duration::from_secs(toml_config.provider.timeout_secs),
        temperature: toml_config.provider.temperature,
    })
}

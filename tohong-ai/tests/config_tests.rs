//! Unit tests for provider settings resolution
//!
//! Tests the API key priority (ENV → TOML), validation, the base URL /
//! model environment overrides and settings read from a real file.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Every test touching TOHONG_PROVIDER_* is marked with #[serial].

use serial_test::serial;
use std::time::Duration;
use tohong_ai::config::{
    is_valid_key, resolve_provider_api_key, resolve_provider_settings, API_KEY_ENV_VAR,
    BASE_URL_ENV_VAR, MODEL_ENV_VAR,
};
use tempfile::TempDir;
use tohong_common::config::{load_config, ProviderConfig, TomlConfig};
use tohong_common::Error;

fn clear_env() {
    std::env::remove_var(API_KEY_ENV_VAR);
    std::env::remove_var(BASE_URL_ENV_VAR);
    std::env::remove_var(MODEL_ENV_VAR);
}

fn toml_with_key(key: Option<&str>) -> TomlConfig {
    TomlConfig {
        provider: ProviderConfig {
            api_key: key.map(str::to_string),
            ..ProviderConfig::default()
        },
        ..TomlConfig::default()
    }
}

// ============================================================================
// API key resolution
// ============================================================================

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    std::env::set_var(API_KEY_ENV_VAR, "env-key");

    let result = resolve_provider_api_key(&toml_with_key(Some("toml-key"))).unwrap();
    assert_eq!(result, "env-key");

    clear_env();
}

#[test]
#[serial]
fn test_toml_fallback_when_env_missing() {
    clear_env();

    let result = resolve_provider_api_key(&toml_with_key(Some("  toml-key "))).unwrap();
    assert_eq!(result, "toml-key");
}

#[test]
#[serial]
fn test_blank_env_key_is_ignored() {
    clear_env();
    std::env::set_var(API_KEY_ENV_VAR, "   ");

    let result = resolve_provider_api_key(&toml_with_key(Some("toml-key"))).unwrap();
    assert_eq!(result, "toml-key");

    clear_env();
}

#[test]
#[serial]
fn test_missing_key_is_config_error() {
    clear_env();

    let err = resolve_provider_api_key(&toml_with_key(None)).unwrap_err();
    match err {
        Error::Config(message) => assert!(message.contains(API_KEY_ENV_VAR)),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_key_validation() {
    assert!(is_valid_key("sk-abc"));
    assert!(!is_valid_key(""));
    assert!(!is_valid_key(" \t"));
}

// ============================================================================
// Full settings
// ============================================================================

#[test]
#[serial]
fn test_settings_from_toml() {
    clear_env();
    let mut config = toml_with_key(Some("toml-key"));
    config.provider.base_url = "http://localhost:11434/v1/".to_string();
    config.provider.timeout_secs = 15;

    let settings = resolve_provider_settings(&config).unwrap();

    assert_eq!(settings.base_url, "http://localhost:11434/v1");
    assert_eq!(settings.model, ProviderConfig::default().model);
    assert_eq!(settings.timeout, Duration::from_secs(15));
}

#[test]
#[serial]
fn test_env_overrides_base_url_and_model() {
    clear_env();
    std::env::set_var(BASE_URL_ENV_VAR, "https://llm.example.vn/v1");
    std::env::set_var(MODEL_ENV_VAR, "vietnamese-7b");

    let settings = resolve_provider_settings(&toml_with_key(Some("toml-key"))).unwrap();

    assert_eq!(settings.base_url, "https://llm.example.vn/v1");
    assert_eq!(settings.model, "vietnamese-7b");

    clear_env();
}

#[test]
#[serial]
fn test_zero_timeout_rejected() {
    clear_env();
    let mut config = toml_with_key(Some("toml-key"));
    config.provider.timeout_secs = 0;

    assert!(matches!(resolve_provider_settings(&config), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_settings_from_config_file() {
    // Given: a provider section written to disk
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tohong.toml");
    std::fs::write(
        &path,
        "[provider]\nbase_url = \"http://127.0.0.1:8000/v1/\"\nmodel = \"vistral-7b\"\napi_key = \"file-key\"\ntimeout_secs = 20\n",
    )
    .unwrap();

    // When
    let config = load_config(Some(&path)).unwrap();
    let settings = resolve_provider_settings(&config).unwrap();

    // Then
    assert_eq!(settings.base_url, "http://127.0.0.1:8000/v1");
    assert_eq!(settings.model, "vistral-7b");
    assert_eq!(settings.api_key, "file-key");
    assert_eq!(settings.timeout, Duration::from_secs(20));
}

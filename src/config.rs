//! Environment-derived service configuration.
//!
//! Every knob has a default so the server starts in a dev environment with
//! no env vars set; hosted deployments override via the platform's secret
//! store. Numeric values that fail to parse fall back to the default rather
//! than aborting startup.

use std::env;

/// Application-level constants
pub const APP_NAME: &str = "pichealth-api";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default per-key request budget per 60-second window.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 10;

/// Default bucket for scan image uploads.
pub const DEFAULT_STORAGE_BUCKET: &str = "health-scan";

/// Runtime configuration, loaded once at startup and shared via `ApiContext`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Comma-separated API key allow-list (`PICHEALTH_API_KEYS`).
    pub api_keys: String,
    /// Comma-separated origin allow-list (`ALLOWED_ORIGINS`). Supports `*`
    /// and `*.domain` entries.
    pub allowed_origins: String,
    /// Requests allowed per key per minute (`RATE_LIMIT_PER_MINUTE`).
    pub rate_limit_per_minute: u32,
    /// Base URL of the OpenAI-compatible model gateway (`MODEL_GATEWAY_URL`).
    pub model_gateway_url: String,
    /// Bearer key for the model gateway (`MODEL_GATEWAY_KEY`).
    pub model_gateway_key: String,
    /// Model id used for image OCR requests (`OCR_MODEL`).
    pub ocr_model: String,
    /// Model id used for advice/summary generation (`ADVICE_MODEL`).
    pub advice_model: String,
    /// Object-store gateway endpoint (`STORAGE_ENDPOINT`).
    pub storage_endpoint: String,
    /// Object-store bearer token (`STORAGE_TOKEN`).
    pub storage_token: String,
    /// Object-store bucket (`STORAGE_BUCKET`).
    pub storage_bucket: String,
    /// PostgREST base URL for scan/summary logging (`LOGSTORE_URL`).
    pub logstore_url: String,
    /// PostgREST service key (`LOGSTORE_KEY`).
    pub logstore_key: String,
    /// Socket address the server binds to (`BIND_ADDR`).
    pub bind_addr: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            api_keys: var_or("PICHEALTH_API_KEYS", ""),
            allowed_origins: var_or("ALLOWED_ORIGINS", ""),
            rate_limit_per_minute: parse_or(
                "RATE_LIMIT_PER_MINUTE",
                DEFAULT_RATE_LIMIT_PER_MINUTE,
            ),
            model_gateway_url: var_or("MODEL_GATEWAY_URL", "https://ai-gateway.vercel.sh"),
            model_gateway_key: var_or("MODEL_GATEWAY_KEY", ""),
            ocr_model: var_or("OCR_MODEL", "openai/gpt-5"),
            advice_model: var_or("ADVICE_MODEL", "google/gemini-3-flash"),
            storage_endpoint: var_or("STORAGE_ENDPOINT", ""),
            storage_token: var_or("STORAGE_TOKEN", ""),
            storage_bucket: var_or("STORAGE_BUCKET", DEFAULT_STORAGE_BUCKET),
            logstore_url: var_or("LOGSTORE_URL", ""),
            logstore_key: var_or("LOGSTORE_KEY", ""),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:8080"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_keys: String::new(),
            allowed_origins: String::new(),
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            model_gateway_url: "https://ai-gateway.vercel.sh".into(),
            model_gateway_key: String::new(),
            ocr_model: "openai/gpt-5".into(),
            advice_model: "google/gemini-3-flash".into(),
            storage_endpoint: String::new(),
            storage_token: String::new(),
            storage_bucket: DEFAULT_STORAGE_BUCKET.into(),
            logstore_url: String::new(),
            logstore_key: String::new(),
            bind_addr: "0.0.0.0:8080".into(),
        }
    }
}

/// Default log filter when `PICHEALTH_LOG` / `RUST_LOG` are unset.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", APP_NAME.replace('-', "_"))
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

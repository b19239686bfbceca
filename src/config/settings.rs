//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Connection settings for the generateContent endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,
    /// API key appended as the `key` query parameter.  `None` disables
    /// authentication (useful against local proxies and test servers).
    pub api_key: Option<String>,
    /// Model identifier for text generation (e.g. `"gemini-2.0-flash"`).
    pub text_model: String,
    /// Model identifier for speech synthesis.  Must be TTS-capable.
    pub tts_model: String,
    /// Maximum seconds to wait for a single HTTP attempt before timing out.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: None,
            text_model: "gemini-2.0-flash".into(),
            tts_model: "gemini-2.5-flash-preview-tts".into(),
            timeout_secs: 60,
        }
    }
}

impl ApiConfig {
    /// The `key` query parameter value, or the empty string when unset.
    pub fn key(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// RetryConfig
// ---------------------------------------------------------------------------

/// Retry budget and backoff shape for the resilient HTTP caller.
///
/// The delay before retry `n` (0-based) is
/// `2^n * base_delay_ms + uniform(0, max_jitter_ms)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base delay in milliseconds, doubled on every retry.
    pub base_delay_ms: u64,
    /// Upper bound (exclusive) of the uniform random jitter added to every
    /// delay.  `0` disables jitter, making delays fully deterministic.
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 1_000,
            max_jitter_ms: 1_000,
        }
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

/// Settings for the sign-in bootstrap that tags the session with an identity.
///
/// The identity is display-only; no data is ever read back under it, so every
/// failure path degrades to a locally generated id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether to attempt remote sign-in at all.  When `false` a local id is
    /// generated immediately.
    pub enabled: bool,
    /// Base URL of the identity-toolkit style auth service.
    pub base_url: String,
    /// Pre-issued custom token.  `None` signs in anonymously.
    pub custom_token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://identitytoolkit.googleapis.com/v1".into(),
            custom_token: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use encounter_forge::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// generateContent endpoint settings.
    pub api: ApiConfig,
    /// Retry/backoff settings for every outbound call.
    pub retry: RetryConfig,
    /// Sign-in bootstrap settings.
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

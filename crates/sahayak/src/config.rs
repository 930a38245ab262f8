//! Application configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `sahayak.toml`, then `SAHAYAK_*` environment variables.
//!
//! ```toml
//! model = "gemini-2.0-flash"
//! temperature = 0.7
//! max_output_tokens = 4096
//! rate_limit_tier = "paid"
//!
//! [rate_limit]
//! requests_per_minute = 60
//! max_concurrent = 4
//! ```

use derive_getters::Getters;
use sahayak_error::{ConfigError, SahayakResult, TransportError, TransportErrorKind};
use sahayak_flow::{FlowRunner, GenerationSettings};
use sahayak_interface::GenerativeDriver;
use sahayak_models::{
    API_KEY_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient, RateLimitedDriver, RetryingDriver,
};
use sahayak_rate_limit::{RateLimitConfig, RateLimitTier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// File name searched for in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "sahayak.toml";

/// Prefix of environment overrides, e.g. `SAHAYAK_MODEL`.
pub const ENV_PREFIX: &str = "SAHAYAK";

/// Boxed driver stack built from configuration.
pub type SahayakDriver = Box<dyn GenerativeDriver>;

/// Runtime settings for the library and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct SahayakConfig {
    /// Gemini model name
    model: String,
    /// API root, overridable for proxies and tests
    base_url: String,
    /// Environment variable holding the API key; unset searches the defaults
    api_key_env: Option<String>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Output token cap per call
    max_output_tokens: Option<u32>,
    /// Request timeout
    timeout_secs: u64,
    /// Quota preset
    rate_limit_tier: RateLimitTier,
    /// Explicit quotas, replacing the preset
    rate_limit: Option<RateLimitConfig>,
    /// Retry transient transport failures
    retry: bool,
    /// Retry cap; unset uses the per-error default
    max_retries: Option<usize>,
}

impl Default for SahayakConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: None,
            temperature: None,
            max_output_tokens: None,
            timeout_secs: 120,
            rate_limit_tier: RateLimitTier::default(),
            rate_limit: None,
            retry: true,
            max_retries: None,
        }
    }
}

impl SahayakConfig {
    /// Loads from the first `sahayak.toml` found and the process environment.
    ///
    /// Looks in the working directory, then in `<config dir>/sahayak/`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unreadable files or invalid values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::discover().as_deref())
    }

    /// Loads from an explicit file (if any) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unreadable files or invalid values.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(path, None)
    }

    /// Loads from a file and an explicit set of variables instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unreadable files or invalid values.
    #[instrument(skip(env), fields(path = ?path))]
    pub fn from_sources(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Adding configuration file");
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        let loaded: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::new(format!("Failed to load configuration: {}", e)))?;
        loaded.validate()?;

        info!(model = %loaded.model, tier = %loaded.rate_limit_tier, "Configuration loaded");
        Ok(loaded)
    }

    /// First existing configuration file in the search path.
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        let user = dirs::config_dir().map(|dir| dir.join("sahayak").join(CONFIG_FILE_NAME));
        std::iter::once(local)
            .chain(user)
            .find(|candidate| candidate.is_file())
    }

    /// Rejects values no driver could work with.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::new("model must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::new("timeout_secs must be positive"));
        }
        if let Some(t) = self.temperature.filter(|t| !(0.0..=2.0).contains(t)) {
            return Err(ConfigError::new(format!(
                "temperature {} is outside [0, 2]",
                t
            )));
        }
        self.rate_limits()
            .validate()
            .map_err(|e| ConfigError::new(e.kind().to_string()))
    }

    /// Effective quotas: explicit `[rate_limit]` values or the tier preset.
    pub fn rate_limits(&self) -> RateLimitConfig {
        self.rate_limit
            .unwrap_or_else(|| self.rate_limit_tier.config())
    }

    /// Sampling settings for flow calls.
    pub fn generation_settings(&self) -> GenerationSettings {
        let mut builder = GenerationSettings::builder();
        builder.model(self.model.clone());
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        if let Some(max) = self.max_output_tokens {
            builder.max_output_tokens(max);
        }
        builder.build().unwrap_or_default()
    }

    /// Reads the API key from the configured or default variables.
    ///
    /// # Errors
    ///
    /// Returns [`TransportErrorKind::MissingApiKey`] when no variable is set.
    pub fn api_key(&self) -> Result<String, TransportError> {
        let candidates: Vec<&str> = match &self.api_key_env {
            Some(var) => vec![var.as_str()],
            None => API_KEY_VARS.to_vec(),
        };
        candidates
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                TransportError::new(TransportErrorKind::MissingApiKey(candidates.join(" or ")))
            })
    }

    /// Gemini client configured with model, endpoint and timeout.
    ///
    /// # Errors
    ///
    /// Fails when the API key is missing or the HTTP client cannot be built.
    pub fn gemini_client(&self) -> Result<GeminiClient, TransportError> {
        Ok(
            GeminiClient::with_timeout(self.api_key()?, Duration::from_secs(self.timeout_secs))?
                .with_model(self.model.clone())
                .with_base_url(self.base_url.clone()),
        )
    }

    /// Wraps `driver` in rate limiting and, if enabled, retries.
    ///
    /// Retries sit outside the limiter so every attempt waits for quota.
    pub fn wrap_driver<D>(&self, driver: D) -> SahayakDriver
    where
        D: GenerativeDriver + 'static,
    {
        let limited = RateLimitedDriver::new(driver, &self.rate_limits());
        if !self.retry {
            return Box::new(limited);
        }
        let retrying = match self.max_retries {
            Some(max) => RetryingDriver::new(limited).with_max_retries(max),
            None => RetryingDriver::new(limited),
        };
        Box::new(retrying)
    }

    /// Full Gemini driver stack.
    ///
    /// # Errors
    ///
    /// Fails when the Gemini client cannot be created.
    pub fn driver(&self) -> SahayakResult<SahayakDriver> {
        Ok(self.wrap_driver(self.gemini_client()?))
    }

    /// Flow runner over [`Self::driver`].
    ///
    /// # Errors
    ///
    /// Fails when the Gemini client cannot be created.
    pub fn runner(&self) -> SahayakResult<FlowRunner<SahayakDriver>> {
        Ok(FlowRunner::with_settings(
            self.driver()?,
            self.generation_settings(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_apply_without_sources() {
        let config = SahayakConfig::from_sources(None, env(&[])).unwrap();
        assert_eq!(config, SahayakConfig::default());
        assert_eq!(config.rate_limits(), RateLimitTier::Free.config());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = SahayakConfig::from_sources(
            None,
            env(&[
                ("SAHAYAK_MODEL", "gemini-2.5-pro"),
                ("SAHAYAK_RETRY", "false"),
                ("SAHAYAK_RATE_LIMIT_TIER", "paid"),
            ]),
        )
        .unwrap();

        assert_eq!(config.model(), "gemini-2.5-pro");
        assert!(!config.retry());
        assert_eq!(*config.rate_limit_tier(), RateLimitTier::Paid);
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = SahayakConfig::from_sources(None, env(&[("SAHAYAK_MODEL", " ")])).unwrap_err();
        assert!(err.message.contains("model"));
    }

    #[test]
    fn generation_settings_carry_model_and_sampling() {
        let config = SahayakConfig {
            temperature: Some(0.3),
            max_output_tokens: Some(512),
            ..SahayakConfig::default()
        };
        let settings = config.generation_settings();
        assert_eq!(settings.model().as_deref(), Some(DEFAULT_MODEL));
        assert_eq!(*settings.temperature(), Some(0.3));
        assert_eq!(*settings.max_output_tokens(), Some(512));
    }
}

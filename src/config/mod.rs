//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `QUILL_*` environment
//! variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::time::Duration;

use crate::cache::{CacheConfig, EvictionStrategy};
use crate::dispatch::DispatcherConfig;
use crate::provider::ProviderDescriptor;

/// Core configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `QUILL_*` overrides on top of defaults.
/// The provider list is ordered; priorities inside it decide the fallback
/// chain.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Shared settings for the named cache instances.
    pub cache: CacheConfig,

    /// Dispatcher limits and pacing.
    pub dispatcher: DispatcherConfig,

    /// Providers to register at startup.
    pub providers: Vec<ProviderDescriptor>,
}

impl Config {
    const ENV_CACHE_MAX_SIZE: &'static str = "QUILL_CACHE_MAX_SIZE";
    const ENV_CACHE_TTL_MS: &'static str = "QUILL_CACHE_TTL_MS";
    const ENV_CACHE_STRATEGY: &'static str = "QUILL_CACHE_STRATEGY";
    const ENV_MAX_BATCH_SIZE: &'static str = "QUILL_MAX_BATCH_SIZE";
    const ENV_MAX_CONCURRENCY: &'static str = "QUILL_MAX_CONCURRENCY";
    const ENV_INTER_BATCH_DELAY_MS: &'static str = "QUILL_INTER_BATCH_DELAY_MS";
    const ENV_PROVIDER_TIMEOUT_MS: &'static str = "QUILL_PROVIDER_TIMEOUT_MS";
    const ENV_PROBE_TIMEOUT_MS: &'static str = "QUILL_PROBE_TIMEOUT_MS";
    const ENV_PRIMARY_PROVIDER: &'static str = "QUILL_PRIMARY_PROVIDER";
    const ENV_PROVIDERS: &'static str = "QUILL_PROVIDERS";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut cache = defaults.cache;
        if let Some(max_size) = Self::parse_usize(Self::ENV_CACHE_MAX_SIZE)? {
            cache.max_size = max_size;
        }
        if let Some(ttl_ms) = Self::parse_u64(Self::ENV_CACHE_TTL_MS)? {
            // zero disables default expiry
            cache.default_ttl = (ttl_ms > 0).then(|| Duration::from_millis(ttl_ms));
        }
        if let Some(raw) = Self::read(Self::ENV_CACHE_STRATEGY) {
            cache.strategy = EvictionStrategy::parse(&raw)
                .ok_or(ConfigError::UnknownStrategy { value: raw })?;
        }

        let mut dispatcher = defaults.dispatcher;
        if let Some(max_batch_size) = Self::parse_usize(Self::ENV_MAX_BATCH_SIZE)? {
            dispatcher.max_batch_size = max_batch_size;
        }
        if let Some(max_concurrency) = Self::parse_usize(Self::ENV_MAX_CONCURRENCY)? {
            dispatcher.max_concurrency = max_concurrency;
        }
        if let Some(delay_ms) = Self::parse_u64(Self::ENV_INTER_BATCH_DELAY_MS)? {
            dispatcher.inter_batch_delay = Duration::from_millis(delay_ms);
        }
        if let Some(timeout_ms) = Self::parse_u64(Self::ENV_PROVIDER_TIMEOUT_MS)? {
            dispatcher.provider_timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(probe_ms) = Self::parse_u64(Self::ENV_PROBE_TIMEOUT_MS)? {
            dispatcher.probe_timeout = Duration::from_millis(probe_ms);
        }
        dispatcher.primary_provider = Self::read(Self::ENV_PRIMARY_PROVIDER);

        let providers = match Self::read(Self::ENV_PROVIDERS) {
            Some(raw) => Self::parse_providers(&raw)?,
            None => defaults.providers,
        };

        Ok(Self {
            cache,
            dispatcher,
            providers,
        })
    }

    /// Checks basic invariants without touching the environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_size == 0 {
            return Err(ConfigError::LimitTooSmall {
                name: "cache.max_size",
            });
        }
        if self.dispatcher.max_batch_size == 0 {
            return Err(ConfigError::LimitTooSmall {
                name: "dispatcher.max_batch_size",
            });
        }
        if self.dispatcher.max_concurrency == 0 {
            return Err(ConfigError::LimitTooSmall {
                name: "dispatcher.max_concurrency",
            });
        }
        Ok(())
    }

    /// Parses the `QUILL_PROVIDERS` list format.
    ///
    /// Comma-separated entries of `id:priority` with optional trailing
    /// flags `on`/`off` (enabled) and `fallback`/`nofallback`, e.g.
    /// `openai:0,claude:1:off,local:2:on:nofallback`.
    pub fn parse_providers(raw: &str) -> Result<Vec<ProviderDescriptor>, ConfigError> {
        let mut providers: Vec<ProviderDescriptor> = Vec::new();

        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.split(':').map(str::trim);

            let id = parts.next().filter(|id| !id.is_empty()).ok_or_else(|| {
                ConfigError::InvalidProviderSpec {
                    value: entry.to_string(),
                    reason: "missing provider id".to_string(),
                }
            })?;

            let priority: i32 = parts
                .next()
                .ok_or_else(|| ConfigError::InvalidProviderSpec {
                    value: entry.to_string(),
                    reason: "missing priority".to_string(),
                })?
                .parse()
                .map_err(|_| ConfigError::InvalidProviderSpec {
                    value: entry.to_string(),
                    reason: "priority is not an integer".to_string(),
                })?;

            if providers.iter().any(|p| p.id == id) {
                return Err(ConfigError::InvalidProviderSpec {
                    value: entry.to_string(),
                    reason: format!("duplicate provider id '{id}'"),
                });
            }

            let mut descriptor = ProviderDescriptor::new(id, priority);
            for flag in parts {
                match flag {
                    "on" => descriptor.enabled = true,
                    "off" => descriptor.enabled = false,
                    "fallback" => descriptor.fallback_enabled = true,
                    "nofallback" => descriptor.fallback_enabled = false,
                    unknown => {
                        return Err(ConfigError::InvalidProviderSpec {
                            value: entry.to_string(),
                            reason: format!("unknown flag '{unknown}'"),
                        });
                    }
                }
            }

            providers.push(descriptor);
        }

        Ok(providers)
    }

    fn read(var: &'static str) -> Option<String> {
        env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_usize(var: &'static str) -> Result<Option<usize>, ConfigError> {
        match Self::read(var) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidInteger { var, value }),
            None => Ok(None),
        }
    }

    fn parse_u64(var: &'static str) -> Result<Option<u64>, ConfigError> {
        match Self::read(var) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidInteger { var, value }),
            None => Ok(None),
        }
    }
}

//! Protocol configuration.

use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::params::generator::{MIN_BITS, SECURE_BITS};
use crate::params::GroupKind;
use crate::primitives::primality::VALIDATION_ROUNDS;
use crate::verifier::NonceGuard;
use crate::{Error, Result};

/// Configuration file used when `ZK13_CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config/zk13.toml";

/// Prefix of environment variables read by [`ProtocolConfig::from_env`].
pub const ENV_PREFIX: &str = "ZK13_";

/// Protocol configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Bit length of the modulus `p`. Values below 2048 are for tests only.
    pub bits: u64,
    /// Construction used to derive `q` together with `p`.
    pub group: GroupKind,
    /// Bit length of `q` for Schnorr groups (derived from `bits` when unset).
    pub subgroup_bits: Option<u64>,
    /// Maximum parameter generation attempts before giving up.
    pub max_generation_attempts: u32,
    /// Random-base Miller-Rabin rounds run on top of Baillie-PSW during prime
    /// search and validation.
    pub primality_rounds: u32,
    /// Replay guard configuration.
    pub replay: ReplaySettings,
}

/// Replay guard settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Maximum number of consumed nonces held at once.
    pub capacity: usize,
    /// Seconds a consumed nonce is remembered. `None` keeps nonces for the
    /// lifetime of the guard.
    pub ttl_secs: Option<u64>,
}

impl ReplaySettings {
    /// Returns the retention window, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }

    /// Creates a replay guard from these settings.
    pub fn build_guard(&self) -> NonceGuard {
        NonceGuard::new(self.capacity, self.ttl())
    }
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            capacity: 100_000,
            ttl_secs: None,
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            bits: SECURE_BITS,
            group: GroupKind::Schnorr,
            subgroup_bits: None,
            max_generation_attempts: crate::params::generator::DEFAULT_MAX_ATTEMPTS,
            primality_rounds: VALIDATION_ROUNDS,
            replay: ReplaySettings::default(),
        }
    }
}

impl ProtocolConfig {
    /// Loads configuration from `.env` file, TOML file, and environment variables.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables with `ZK13_` prefix, nested keys separated by `__`
    ///    (e.g., `ZK13_REPLAY__CAPACITY=5000`)
    /// 2. TOML configuration file (if exists)
    /// 3. `.env` file (if exists)
    /// 4. Built-in defaults
    ///
    /// The TOML file path can be set via `ZK13_CONFIG_PATH`. If not set, defaults
    /// to `./config/zk13.toml`. A missing file is silently skipped. The repository
    /// only ships `config/zk13.example.toml`, so the default path keeps the
    /// built-in 2048-bit modulus unless an operator adds a file.
    ///
    /// # Environment Variable Examples
    /// ```bash
    /// ZK13_BITS=3072
    /// ZK13_GROUP=safe_prime
    /// ZK13_MAX_GENERATION_ATTEMPTS=4
    /// ZK13_REPLAY__TTL_SECS=600
    /// ```
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configuration is malformed or invalid.
    pub fn from_env() -> Result<Self> {
        // Attempt to load .env file (silently ignore if it doesn't exist)
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("ZK13_CONFIG_PATH")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Self::load(&config_path)
    }

    /// Loads configuration from the TOML file at `config_path` and `ZK13_*`
    /// environment variables, then validates it.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configuration is malformed or invalid.
    pub fn load(config_path: &str) -> Result<Self> {
        let config: Self = Self::figment(config_path)
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the layered provider stack for a given TOML path.
    pub fn figment(config_path: &str) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config_path"]).split("__"))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.bits < MIN_BITS {
            return Err(Error::Config(format!(
                "bits must be at least {MIN_BITS}, got {}",
                self.bits
            )));
        }

        if let Some(subgroup_bits) = self.subgroup_bits {
            if subgroup_bits < 2 || subgroup_bits >= self.bits {
                return Err(Error::Config(format!(
                    "subgroup_bits ({subgroup_bits}) must be smaller than bits ({})",
                    self.bits
                )));
            }
        }

        if self.max_generation_attempts == 0 {
            return Err(Error::Config(
                "max_generation_attempts cannot be zero".to_string(),
            ));
        }

        if self.primality_rounds < VALIDATION_ROUNDS {
            return Err(Error::Config(format!(
                "primality_rounds must be at least {VALIDATION_ROUNDS}"
            )));
        }

        if self.replay.capacity == 0 {
            return Err(Error::Config("replay capacity cannot be zero".to_string()));
        }

        if self.replay.ttl_secs == Some(0) {
            return Err(Error::Config("replay ttl_secs cannot be zero".to_string()));
        }

        Ok(())
    }
}

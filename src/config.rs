//! Runtime configuration for the font cache.
//!
//! Values come from defaults, then `FONT_CACHE_*` environment variables, then
//! CLI flags applied by the binary. Strictness of duplicate-write handling is an
//! explicit value; it defaults from the runtime mode when not set.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::download::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS};
use crate::download::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "font-cache";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("invalid value for `{key}`: {value:?} (expected {expected})")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for `{key}`: {value}. Expected range: {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Runtime mode of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    Test,
    Development,
    #[default]
    Production,
}

impl RuntimeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    #[must_use]
    pub fn is_test(self) -> bool {
        self == Self::Test
    }
}

impl FromStr for RuntimeMode {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidValue {
                key: "FONT_CACHE_ENV",
                value: raw.to_string(),
                expected: "test, development or production",
            }),
        }
    }
}

/// Font cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory downloaded font files are written to.
    pub cache_dir: PathBuf,
    pub mode: RuntimeMode,
    /// Explicit duplicate-write strictness; `None` follows `mode`.
    pub strict: Option<bool>,
    /// Download attempts per file, including the first.
    pub max_attempts: u32,
    /// Maximum simultaneous downloads per fetch.
    pub concurrency: usize,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            mode: RuntimeMode::default(),
            strict: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            concurrency: DEFAULT_CONCURRENCY,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

impl CacheConfig {
    /// Config for tests: strict duplicate writes, given cache directory.
    #[must_use]
    pub fn for_tests(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            mode: RuntimeMode::Test,
            ..Self::default()
        }
    }

    /// Whether duplicate cache writes are fatal.
    #[must_use]
    pub fn strict_mode(&self) -> bool {
        self.strict.unwrap_or(self.mode.is_test())
    }

    /// Loads configuration from `FONT_CACHE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(dir) = get("FONT_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(mode) = get("FONT_CACHE_ENV") {
            config.mode = mode.parse()?;
        }
        if let Some(strict) = get("FONT_CACHE_STRICT") {
            config.strict = Some(parse_bool("FONT_CACHE_STRICT", &strict)?);
        }
        if let Some(attempts) = get("FONT_CACHE_MAX_ATTEMPTS") {
            config.max_attempts =
                u32::try_from(parse_u64("FONT_CACHE_MAX_ATTEMPTS", &attempts)?)
                    .unwrap_or(u32::MAX);
        }
        if let Some(concurrency) = get("FONT_CACHE_CONCURRENCY") {
            config.concurrency = usize::try_from(parse_u64("FONT_CACHE_CONCURRENCY", &concurrency)?)
                .unwrap_or(usize::MAX);
        }
        if let Some(secs) = get("FONT_CACHE_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs = parse_u64("FONT_CACHE_CONNECT_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = get("FONT_CACHE_READ_TIMEOUT_SECS") {
            config.read_timeout_secs = parse_u64("FONT_CACHE_READ_TIMEOUT_SECS", &secs)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates numeric settings against supported ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("max_attempts", u64::from(self.max_attempts), 1, 10)?;
        check_range(
            "concurrency",
            u64::try_from(self.concurrency).unwrap_or(u64::MAX),
            1,
            100,
        )?;
        check_range("connect_timeout_secs", self.connect_timeout_secs, 1, 3600)?;
        check_range("read_timeout_secs", self.read_timeout_secs, 1, 3600)?;
        Ok(())
    }
}

fn check_range(key: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value,
            min,
            max,
        })
    }
}

fn parse_u64(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        expected: "an unsigned integer",
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            expected: "true or false",
        }),
    }
}

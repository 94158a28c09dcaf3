//! Configuration for disposal orchestrators.
//!
//! Defaults can be overridden in code with the builder methods or from the
//! environment with [`DisposalConfig::from_env`].

use std::env;
use std::time::Duration;

use crate::error::{DisposalError, DisposalResult};

/// Timeout applied to disposables added without one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Timeout applied to guards taken without one.
pub const DEFAULT_GUARD_TIMEOUT: Duration = Duration::from_millis(5000);

const ENV_DEFAULT_TIMEOUT: &str = "DISPOSAL_DEFAULT_TIMEOUT_MS";
const ENV_GUARD_TIMEOUT: &str = "DISPOSAL_GUARD_TIMEOUT_MS";
const ENV_ALLOW_UNNAMED: &str = "DISPOSAL_ALLOW_UNNAMED";

/// Settings shared by [`Disposables`](crate::Disposables) and
/// [`SafeDisposable`](crate::SafeDisposable).
///
/// # Examples
///
/// ```
/// use disposal_groups::{DisposalConfig, Disposables};
/// use std::time::Duration;
///
/// let config = DisposalConfig::default()
///     .with_default_timeout(Duration::from_millis(250))
///     .allow_unnamed_disposables(false);
///
/// let disposables = Disposables::with_config(config);
/// assert_eq!(disposables.config().default_timeout, Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisposalConfig {
    /// Timeout for disposables added without one
    #[cfg_attr(feature = "serde", serde(rename = "default_timeout_ms", with = "millis"))]
    pub default_timeout: Duration,
    /// Timeout for guards taken without one
    #[cfg_attr(feature = "serde", serde(rename = "guard_timeout_ms", with = "millis"))]
    pub guard_timeout: Duration,
    /// Whether `add` accepts disposables without a name
    pub allow_unnamed_disposables: bool,
}

impl Default for DisposalConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            guard_timeout: DEFAULT_GUARD_TIMEOUT,
            allow_unnamed_disposables: true,
        }
    }
}

impl DisposalConfig {
    /// Reads overrides from `DISPOSAL_DEFAULT_TIMEOUT_MS`, `DISPOSAL_GUARD_TIMEOUT_MS`
    /// and `DISPOSAL_ALLOW_UNNAMED`; unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DisposalError::InvalidConfig`] when a variable is set but cannot be parsed.
    pub fn from_env() -> DisposalResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> DisposalResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_DEFAULT_TIMEOUT) {
            config.default_timeout = parse_millis(ENV_DEFAULT_TIMEOUT, &value)?;
        }
        if let Some(value) = lookup(ENV_GUARD_TIMEOUT) {
            config.guard_timeout = parse_millis(ENV_GUARD_TIMEOUT, &value)?;
        }
        if let Some(value) = lookup(ENV_ALLOW_UNNAMED) {
            config.allow_unnamed_disposables = parse_bool(ENV_ALLOW_UNNAMED, &value)?;
        }
        Ok(config)
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_guard_timeout(mut self, timeout: Duration) -> Self {
        self.guard_timeout = timeout;
        self
    }

    pub fn allow_unnamed_disposables(mut self, allow: bool) -> Self {
        self.allow_unnamed_disposables = allow;
        self
    }
}

fn parse_millis(key: &'static str, value: &str) -> DisposalResult<Duration> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(DisposalError::InvalidConfig {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_bool(key: &'static str, value: &str) -> DisposalResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DisposalError::InvalidConfig {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

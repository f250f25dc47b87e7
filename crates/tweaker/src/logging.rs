//! Global `tracing` subscriber setup.
//!
//! Library crates of the workspace only emit events. Applications that do not bring
//! their own subscriber can install one with [`init`].

use serde::Deserialize;
use std::borrow::Cow;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use tracing::level_filters::LevelFilter;

/// Errors that can occur during subscriber initialisation.
#[tweaker_derive::tweaker_error]
pub enum LoggingError {
    /// A global subscriber is already installed in this process.
    #[error("Tracing subscriber error{}: {source}", format_context(.context))]
    Subscriber { source: tracing_subscriber::util::TryInitError, context: Option<Cow<'static, str>> },

    #[error("Invalid logging configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Subscriber settings, usually the `logging` section of a
/// [`TweakerConfig`](crate::config::TweakerConfig).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level, such as `info` or `trace`.
    pub level: String,
    /// Extra directives, e.g. `tweaker_scanner=trace,tweaker_core=debug`.
    /// `RUST_LOG` applies when unset.
    pub filter: Option<String>,
    pub json: bool,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, json: false, ansi: true }
    }
}

impl LoggingConfig {
    #[must_use]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level.to_string();
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    fn level_filter(&self) -> Result<LevelFilter, LoggingError> {
        self.level.parse().map_err(|err| LoggingError::InvalidConfiguration {
            message: format!("Invalid level '{}': {err}", self.level).into(),
            context: None,
        })
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        let builder = EnvFilter::builder().with_default_directive(self.level_filter()?.into());
        self.filter.as_ref().map_or_else(
            || Ok(builder.from_env_lossy()),
            |filter| {
                builder.parse(filter).map_err(|e| LoggingError::InvalidConfiguration {
                    message: format!("Invalid env filter '{filter}': {e}").into(),
                    context: None,
                })
            },
        )
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
/// [`LoggingError::InvalidConfiguration`] for a bad level or filter,
/// [`LoggingError::Subscriber`] when a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_filter = config.env_filter()?;
    let fmt = layer().with_ansi(config.ansi && !config.json);
    let output = if config.json { fmt.json().boxed() } else { fmt.compact().boxed() };

    tracing_subscriber::registry().with(env_filter).with(output).try_init()?;
    tracing::debug!(level = %config.level, json = config.json, "Logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = LoggingConfig::default().level(LevelFilter::DEBUG).filter("tweaker_core=trace").json(true);
        assert!(config.level.eq_ignore_ascii_case("debug"));
        assert_eq!(config.filter.as_deref(), Some("tweaker_core=trace"));
        assert!(config.json);
    }

    #[test]
    fn test_invalid_level_and_filter() {
        let bad_level = LoggingConfig { level: "loud".to_owned(), ..LoggingConfig::default() };
        assert_eq!(init(&bad_level).unwrap_err().kind(), "invalid_configuration");

        let bad_filter = LoggingConfig::default().filter("tweaker=loudest");
        assert_eq!(bad_filter.env_filter().unwrap_err().kind(), "invalid_configuration");
    }
}

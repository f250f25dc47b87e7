use crate::context::TweakerOptions;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;
use tweaker_scanner::{BindingFilter, ScanError, ScanOptions, Scope};

/// Errors raised while loading or applying configuration.
#[tweaker_derive::tweaker_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// A scan filter pattern from the configuration does not compile.
    #[error("Invalid scan configuration{}: {source}", format_context(.context))]
    Scan { source: ScanError, context: Option<Cow<'static, str>> },
}

/// Top-level settings of a [`Tweaker`](crate::Tweaker).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TweakerConfig {
    /// Attach the invokable manager to the scanner.
    pub scan_invokables: bool,
    /// Attach the tweakable manager to the scanner.
    pub scan_tweakables: bool,
    pub scan: ScanConfig,
    pub logging: LoggingConfig,
}

impl Default for TweakerConfig {
    fn default() -> Self {
        Self { scan_invokables: true, scan_tweakables: true, scan: ScanConfig::default(), logging: LoggingConfig::default() }
    }
}

/// Scan filters as plain data. Patterns are regular expressions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub module: Option<String>,
    pub type_name: Option<String>,
    pub member: Option<String>,
    pub scope: Scope,
    pub binding: BindingFilter,
    pub isolate_failures: bool,
}

impl TweakerConfig {
    #[must_use]
    pub fn options(&self) -> TweakerOptions {
        let mut options = TweakerOptions::empty();
        options.set(TweakerOptions::SCAN_FOR_INVOKABLES, self.scan_invokables);
        options.set(TweakerOptions::SCAN_FOR_TWEAKABLES, self.scan_tweakables);
        options
    }

    /// Compiles the `scan` section.
    pub fn scan_options(&self) -> Result<ScanOptions, ConfigError> {
        let scan = &self.scan;
        let mut options = ScanOptions::new()
            .with_scope(scan.scope)
            .with_binding(scan.binding)
            .isolate_failures(scan.isolate_failures);
        if let Some(pattern) = &scan.module {
            options = options.with_module_pattern(pattern).context("scan.module")?;
        }
        if let Some(pattern) = &scan.type_name {
            options = options.with_type_pattern(pattern).context("scan.type_name")?;
        }
        if let Some(pattern) = &scan.member {
            options = options.with_member_pattern(pattern).context("scan.member")?;
        }
        Ok(options)
    }
}

/// Loads a configuration file overlaid with `TWEAKER__`-prefixed environment variables.
///
/// Without a `path` the file `tweaker` (any supported extension) in the working
/// directory is read. Nested keys use double underscores, so
/// `TWEAKER__SCAN__MEMBER=^on_` sets `scan.member`.
///
/// # Example
/// ```rust
/// use tweaker::config::{TweakerConfig, load_config};
///
/// let cfg: TweakerConfig = load_config(Some("config/tweaker")).unwrap_or_default();
/// assert!(cfg.scan_invokables);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, Environment::with_prefix("TWEAKER").separator("__"))
}

pub(crate) fn load_layered<T>(path: Option<impl AsRef<Path>>, environment: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("tweaker"), |p| p.as_ref().to_path_buf());
    info!("Loading config from {}", effective_path.display());

    let config = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(environment)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

//! `njast.toml` loading and process-wide logging setup.
//!
//! ```toml
//! [parse]
//! strict = false
//! level = 7
//!
//! [resolver]
//! extra_source_roots = ["gen/java"]
//! cache = true
//!
//! [logging]
//! level = "njast.resolve=debug"
//! json = false
//! file = "/tmp/njast.log"
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use njast_syntax::{JavaLevel, ParseOptions};
use parking_lot::ReentrantMutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod diagnostics;
mod logging;

pub use diagnostics::{ConfigDiagnostics, ConfigValidationError, ConfigWarning};
pub use logging::init_tracing;

pub const NJAST_CONFIG_ENV_VAR: &str = "NJAST_CONFIG";

/// File names looked for in each directory, in order.
const CONFIG_FILE_NAMES: [&str; 2] = ["njast.toml", ".njast.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NjastConfig {
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Stop at the first syntax error.
    #[serde(default = "ParseConfig::default_strict")]
    pub strict: bool,
    /// JDK major version; 6 or 7.
    #[serde(default = "ParseConfig::default_level")]
    pub level: u16,
}

impl ParseConfig {
    fn default_strict() -> bool {
        true
    }

    fn default_level() -> u16 {
        JavaLevel::default().major
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            strict: Self::default_strict(),
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Source roots searched after `src`, `src/main/java` and
    /// `src/debug/java`, relative to the project root.
    #[serde(default)]
    pub extra_source_roots: Vec<PathBuf>,
    /// Share one resolver between files of the same project.
    #[serde(default = "ResolverConfig::default_cache")]
    pub cache: bool,
}

impl ResolverConfig {
    fn default_cache() -> bool {
        true
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            extra_source_roots: Vec::new(),
            cache: Self::default_cache(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A level (`debug`) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// Append logs to this file as well as stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_owned()
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            "off" => "off".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        })
    }

    /// The configured filter with any `RUST_LOG` directives appended.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl NjastConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path_with_diagnostics(path)?.0)
    }

    /// Loads a config file, reporting unknown keys and invalid values.
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str_with_diagnostics(&text)
    }

    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) = diagnostics::from_toml_str::<NjastConfig>(text)?;
        let diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..config.validate()
        };
        Ok((config, diagnostics))
    }

    #[must_use]
    pub fn validate(&self) -> ConfigDiagnostics {
        let mut out = ConfigDiagnostics::default();

        if ![JavaLevel::JDK6.major, JavaLevel::JDK7.major].contains(&self.parse.level) {
            out.errors.push(ConfigValidationError::UnsupportedLevel {
                level: self.parse.level,
            });
        }

        for (idx, root) in self.resolver.extra_source_roots.iter().enumerate() {
            if root.is_absolute() {
                out.warnings.push(ConfigWarning::ExtraSourceRootAbsolute {
                    toml_path: format!("resolver.extra_source_roots[{idx}]"),
                });
            }
        }

        let normalized = LoggingConfig::normalize_level_directives(&self.logging.level);
        if tracing_subscriber::EnvFilter::try_new(normalized).is_err() {
            out.warnings.push(ConfigWarning::LoggingLevelInvalid {
                value: self.logging.level.clone(),
            });
        }
        out
    }

    /// Options for parsing a whole file under this config.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strict: self.parse.strict,
            ..ParseOptions::default()
        }
        .with_level(JavaLevel::new(self.parse.level))
    }

    pub fn level(&self) -> JavaLevel {
        JavaLevel::new(self.parse.level)
    }
}

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Runs `f` holding the lock config discovery takes around
/// [`NJAST_CONFIG_ENV_VAR`]. Tests that set the variable go through here.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Finds the config file for work started in `start`.
///
/// Search order:
/// 1) `NJAST_CONFIG` (absolute or relative to `start`)
/// 2) `njast.toml`, then `.njast.toml`, in `start` and each of its ancestors
pub fn discover_config_path(start: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(NJAST_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            start.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .map(|path| path.canonicalize().unwrap_or(path))
    })
}

/// Loads the config that applies to `start`, or the defaults if there is
/// none.
pub fn load_for_dir(
    start: &Path,
) -> Result<(NjastConfig, Option<PathBuf>, ConfigDiagnostics), ConfigError> {
    let Some(path) = discover_config_path(start) else {
        return Ok((NjastConfig::default(), None, ConfigDiagnostics::default()));
    };
    let (config, diagnostics) = NjastConfig::load_from_path_with_diagnostics(&path)?;
    Ok((config, Some(path), diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn level_directives_are_normalized() {
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives(""), "warn");
        assert_eq!(
            LoggingConfig::normalize_level_directives("njast.parse=trace"),
            "njast.parse=trace"
        );
    }

    #[test]
    fn defaults_parse_strictly_at_jdk7() {
        let options = NjastConfig::default().parse_options();
        assert!(options.strict);
        assert_eq!(options.level, JavaLevel::JDK7);
        assert!(!options.partial);
    }

    #[test]
    fn unsupported_level_is_an_error() {
        let (config, diagnostics) =
            NjastConfig::load_from_str_with_diagnostics("[parse]\nlevel = 8\n").unwrap();
        assert_eq!(config.parse.level, 8);
        assert_eq!(
            diagnostics.errors,
            vec![ConfigValidationError::UnsupportedLevel { level: 8 }]
        );
        assert!(!diagnostics.is_ok());
    }

    #[test]
    fn validate_reports_warnings_without_failing() {
        let mut config = NjastConfig::default();
        config.resolver.extra_source_roots = vec![PathBuf::from("gen"), PathBuf::from("/abs")];
        config.logging.level = "njast=notalevel".to_owned();

        let diagnostics = config.validate();
        assert!(diagnostics.is_ok());
        assert!(diagnostics.unknown_keys.is_empty());
        assert_eq!(
            diagnostics.warnings,
            vec![
                ConfigWarning::ExtraSourceRootAbsolute {
                    toml_path: "resolver.extra_source_roots[1]".to_owned()
                },
                ConfigWarning::LoggingLevelInvalid {
                    value: "njast=notalevel".to_owned()
                },
            ]
        );
    }
}

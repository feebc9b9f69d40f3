//! Configuration for the permission engine and its command-line tool.
//!
//! Configuration is read from a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax. Every section is
//! optional; an empty file yields the defaults.
//!
//! # Example
//!
//! ```toml
//! [access.bypass]
//! super_admin_roles = ["super_admin"]
//! owner_roles = ["owner", "${EXTRA_OWNER_ROLE}"]
//!
//! [access.audit]
//! log_allowed = true
//!
//! [limits.fallback]
//! products = 100
//!
//! [observability.logging]
//! level = "info"
//! format = "json"
//! ```

mod access;
mod limits;
mod observability;

use std::{path::Path, sync::LazyLock};

pub use access::*;
pub use limits::*;
pub use observability::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RolegateConfig {
    /// Access decision configuration (bypass roles, audit, rule validation).
    #[serde(default)]
    pub access: AccessConfig,

    /// Caller-side data access fallbacks.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Observability configuration (logging).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl RolegateConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing variables cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: RolegateConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.access.validate()?;
        self.limits.validate()?;
        Ok(())
    }

    /// Generate the JSON schema as a pretty-printed JSON string.
    #[cfg(feature = "json-schema")]
    pub fn json_schema_string() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(RolegateConfig))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

static ENV_VAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env var regex"));

/// Expand `${VAR_NAME}` references outside of `#` comments.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut lines = Vec::new();

    for line in input.split('\n') {
        let (code, comment) = match line.find('#') {
            Some(pos) => line.split_at(pos),
            None => (line, ""),
        };

        let mut expanded = String::with_capacity(line.len());
        let mut last_end = 0;
        for caps in ENV_VAR_REGEX.captures_iter(code) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = std::env::var(name.as_str())
                .map_err(|_| ConfigError::EnvVarNotFound(name.as_str().to_string()))?;
            expanded.push_str(&code[last_end..whole.start()]);
            expanded.push_str(&value);
            last_end = whole.end();
        }
        expanded.push_str(&code[last_end..]);
        expanded.push_str(comment);
        lines.push(expanded);
    }

    Ok(lines.join("\n"))
}

//! Deployment environment selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Deployment environment, selects `{environment}.toml`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// Environment variable consulted when no explicit environment is given
    pub const ENV_VAR: &'static str = "KVGATE_APP_ENV";

    /// Pick the environment: explicit choice first, then `KVGATE_APP_ENV`,
    /// then `Development`.
    ///
    /// An unparsable `KVGATE_APP_ENV` falls back to the default.
    pub fn resolve(explicit: Option<Environment>) -> Self {
        explicit.unwrap_or_else(Self::from_env)
    }

    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Name of the environment-specific configuration file
    pub fn config_file_name(&self) -> String {
        format!("{}.toml", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::EnvVarError(format!(
                "Invalid environment '{}'. Valid values are: development, test, staging, production",
                s
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        let cases = [
            ("development", Environment::Development),
            ("dev", Environment::Development),
            ("test", Environment::Test),
            ("stage", Environment::Staging),
            ("PROD", Environment::Production),
            (" production ", Environment::Production),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<Environment>().unwrap(), expected, "{}", input);
        }
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            "qa".parse::<Environment>(),
            Err(ConfigError::EnvVarError(_))
        ));
    }

    #[test]
    fn test_explicit_environment_wins() {
        assert_eq!(
            Environment::resolve(Some(Environment::Staging)),
            Environment::Staging
        );
    }

    #[test]
    fn test_config_file_name() {
        assert_eq!(Environment::Production.config_file_name(), "production.toml");
        assert_eq!(Environment::default().to_string(), "development");
    }
}

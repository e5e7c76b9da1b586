use std::{
    io::IsTerminal,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        database::{DEFAULT_DATABASE_URL, MAINNET_DATABASE_URL, TESTNET_DATABASE_URL},
        near::{DEVELOPMENT_CONTRACT_NAME, MAINNET_CONTRACT_NAME, TESTNET_CONTRACT_NAME},
        search::{DEFAULT_RESULT_LIMIT, DEFAULT_SEARCH_DEPTH_IN_BLOCKS},
    },
    error::{Error, Result},
};

/// Deployment environment the backend runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Self::Development),
            "testnet" => Ok(Self::Testnet),
            "mainnet" => Ok(Self::Mainnet),
            other => Err(Error::Config(format!("unknown environment: {other}"))),
        }
    }
}

/// Output format of the logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON when stdout is not a terminal, text otherwise
    #[default]
    Auto,
    Json,
    Text,
}

impl LogFormat {
    /// Replace [`LogFormat::Auto`] with the concrete format to use
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto if std::io::stdout().is_terminal() => Self::Text,
            Self::Auto => Self::Json,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: Environment,
    #[serde(default)]
    pub log_format: LogFormat,
    pub near: NearConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearConfig {
    /// Account receiving the payments we look up
    pub contract_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// PEM bundle of the CAs trusted for the database TLS certificate
    #[serde(default)]
    pub tls_ca_file: Option<PathBuf>,
    /// Accept any database certificate. Development only.
    #[serde(default)]
    pub tls_insecure: bool,
    #[cfg(feature = "mocks")]
    #[serde(default)]
    pub mock_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub max_search_depth_in_blocks: i64,
    pub limit_lines_of_result: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_search_depth_in_blocks: DEFAULT_SEARCH_DEPTH_IN_BLOCKS,
            limit_lines_of_result: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

impl Config {
    /// Defaults for the given environment, most likely overridden by a config file
    pub fn for_environment(environment: Environment) -> Self {
        let (contract_name, database_url) = match environment {
            Environment::Development => (DEVELOPMENT_CONTRACT_NAME, DEFAULT_DATABASE_URL),
            Environment::Testnet => (TESTNET_CONTRACT_NAME, TESTNET_DATABASE_URL),
            Environment::Mainnet => (MAINNET_CONTRACT_NAME, MAINNET_DATABASE_URL),
        };

        Self {
            environment,
            log_format: LogFormat::default(),
            near: NearConfig {
                contract_name: contract_name.to_string(),
            },
            database: DatabaseConfig {
                url: database_url.to_string(),
                tls_ca_file: None,
                tls_insecure: false,
                #[cfg(feature = "mocks")]
                mock_mode: false,
            },
            search: SearchConfig::default(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.near.contract_name.is_empty() {
            return Err(Error::Config("near.contract_name must not be empty".into()));
        }
        if self.database.url.is_empty() {
            return Err(Error::Config("database.url must not be empty".into()));
        }
        if self.search.max_search_depth_in_blocks <= 0 {
            return Err(Error::Config(
                "search.max_search_depth_in_blocks must be positive".into(),
            ));
        }
        if self.search.limit_lines_of_result <= 0 {
            return Err(Error::Config(
                "search.limit_lines_of_result must be positive".into(),
            ));
        }

        Ok(())
    }
}

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid concurrency_cap: {0}. Must be between 1 and 64")]
    InvalidConcurrencyCap(usize),

    #[error("Invalid retry_budget: {0}. Cannot be 0")]
    InvalidRetryBudget(u32),

    #[error("Invalid no_progress_threshold: {0}. Cannot be 0")]
    InvalidNoProgressThreshold(u32),

    #[error("Runner program cannot be empty")]
    EmptyRunnerProgram,

    #[error("Worker program cannot be empty")]
    EmptyWorkerProgram,

    #[error("Session path cannot be empty")]
    EmptySessionPath,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .mender/config.yaml (project config)
    /// 3. .mender/local.yaml (project local overrides, optional)
    /// 4. Environment variables (MENDER_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.mender/) so each
    /// repository under repair keeps its own runner, worker, and session.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            // 1. Start with programmatic defaults
            .merge(Serialized::defaults(Config::default()))
            // 2. Merge project config
            .merge(Yaml::file(".mender/config.yaml"))
            // 3. Merge project local overrides (optional)
            .merge(Yaml::file(".mender/local.yaml"))
            // 4. Merge environment variables (highest priority)
            .merge(Env::prefixed("MENDER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.concurrency_cap == 0 || config.concurrency_cap > 64 {
            return Err(ConfigError::InvalidConcurrencyCap(config.concurrency_cap));
        }

        if config.retry_budget == 0 {
            return Err(ConfigError::InvalidRetryBudget(config.retry_budget));
        }

        if config.no_progress_threshold == 0 {
            return Err(ConfigError::InvalidNoProgressThreshold(
                config.no_progress_threshold,
            ));
        }

        if config.runner.program.is_empty() {
            return Err(ConfigError::EmptyRunnerProgram);
        }

        if config.worker.program.is_empty() {
            return Err(ConfigError::EmptyWorkerProgram);
        }

        if config.session_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptySessionPath);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let config = Config {
            concurrency_cap: 0,
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidConcurrencyCap(0))
        ));
    }

    #[test]
    fn zero_retry_budget_rejected() {
        let config = Config {
            retry_budget: 0,
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRetryBudget(0))
        ));
    }

    #[test]
    fn empty_worker_program_rejected() {
        let config = Config {
            worker: crate::domain::models::WorkerConfig {
                program: String::new(),
                args: vec![],
            },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyWorkerProgram)
        ));
    }

    #[test]
    fn bad_log_level_rejected() {
        let config = Config {
            logging: crate::domain::models::LoggingConfig {
                level: "verbose".to_string(),
                format: "pretty".to_string(),
            },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn load_from_file_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "concurrency_cap: 2\nrunner:\n  program: pytest\n  args: [\"-q\"]"
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.concurrency_cap, 2);
        assert_eq!(config.runner.program, "pytest");
        assert_eq!(config.runner.args, vec!["-q"]);
        // Defaults survive for unspecified fields
        assert_eq!(config.retry_budget, 5);
    }

    #[test]
    fn invalid_file_config_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retry_budget: 0").unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for Mender
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Maximum number of parallel pool workers (1-64)
    #[serde(default = "default_concurrency_cap")]
    pub concurrency_cap: usize,

    /// Maximum number of repair attempts before stopping
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,

    /// Consecutive no-progress attempts tolerated before stopping
    #[serde(default = "default_no_progress_threshold")]
    pub no_progress_threshold: u32,

    /// Path of the persisted session record
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,

    /// Test runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Repair worker configuration
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Debug trace side-channel configuration
    #[serde(default)]
    pub trace: TraceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_concurrency_cap() -> usize {
    4
}

const fn default_retry_budget() -> u32 {
    5
}

const fn default_no_progress_threshold() -> u32 {
    1
}

fn default_session_path() -> PathBuf {
    PathBuf::from(".mender/session.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency_cap: default_concurrency_cap(),
            retry_budget: default_retry_budget(),
            no_progress_threshold: default_no_progress_threshold(),
            session_path: default_session_path(),
            runner: RunnerConfig::default(),
            worker: WorkerConfig::default(),
            trace: TraceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Test runner collaborator configuration.
///
/// The runner is invoked as a blocking external command and must leave a
/// structured JSON report at `report_path` after each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerConfig {
    /// Program to execute (e.g. `cargo`, `npm`, `pytest`)
    #[serde(default = "default_runner_program")]
    pub program: String,

    /// Arguments to pass to the program
    #[serde(default = "default_runner_args")]
    pub args: Vec<String>,

    /// Path where the runner writes its structured report
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

fn default_runner_program() -> String {
    "cargo".to_string()
}

fn default_runner_args() -> Vec<String> {
    vec!["test".to_string()]
}

fn default_report_path() -> PathBuf {
    PathBuf::from(".mender/report.json")
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: default_runner_program(),
            args: default_runner_args(),
            report_path: default_report_path(),
        }
    }
}

/// Repair worker collaborator configuration.
///
/// One process is spawned per dispatched group; the work assignment is
/// written to its stdin as JSON and the fix report is read from stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkerConfig {
    /// Program to execute for each repair
    #[serde(default = "default_worker_program")]
    pub program: String,

    /// Arguments to pass to the program
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_worker_program() -> String {
    "mender-worker".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: default_worker_program(),
            args: vec![],
        }
    }
}

/// Debug trace side-channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TraceConfig {
    /// Whether to record worker inputs and outputs
    #[serde(default)]
    pub enabled: bool,

    /// Append-only JSONL trace location
    #[serde(default = "default_trace_path")]
    pub path: PathBuf,
}

fn default_trace_path() -> PathBuf {
    PathBuf::from(".mender/trace.jsonl")
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_trace_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

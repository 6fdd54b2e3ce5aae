//! Session: the durable record of orchestration progress.
//!
//! A session is created on the first run, loaded and reconciled on resume,
//! marked completed when the suite passes, and marked stopped otherwise. The
//! orchestrator is the session's only writer; attempts are append-only. On
//! load the record is checked against its invariants (contiguous 1-based
//! attempt numbers, each attempt chaining from its predecessor's verified
//! set); a violation refuses resume instead of trusting corrupt state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attempt::Attempt;

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Orchestration is in progress (or was interrupted mid-run).
    Active,
    /// Terminal: the suite passed.
    Completed,
    /// Terminal: stopped before the suite passed.
    Stopped,
}

/// Whether the orchestrator pauses for directives between attempts.
///
/// Mode only gates whether the machine suspends at attempt boundaries. It
/// never changes classification, dispatch fan-out, or worker isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Suspend after each continuing attempt and wait for a directive.
    Interactive,
    /// Re-enter the next attempt immediately.
    Unattended,
}

/// Directive issued while the machine is suspended in interactive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// Run the next attempt.
    Continue,
    /// Switch to unattended and run the next attempt.
    SwitchToUnattended,
    /// Stop now; takes effect at this suspension boundary only.
    Stop,
}

/// Why a session stopped short of a passing suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured retry budget was exhausted.
    RetryLimit,
    /// Consecutive attempts made no measurable progress.
    NoProgress,
    /// A user-issued stop directive.
    UserStop,
}

impl StopReason {
    /// Human-readable reason for the final report.
    pub fn describe(self) -> &'static str {
        match self {
            Self::RetryLimit => "retry budget exhausted",
            Self::NoProgress => "no measurable progress",
            Self::UserStop => "stopped by user",
        }
    }
}

/// Outcome of the progress evaluation after one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Loop back for another attempt.
    Continue,
    /// The suite passes.
    Done,
    /// Terminal stop with a reason.
    Stopped(StopReason),
}

/// Durable, process-wide orchestration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,

    /// Lifecycle status.
    pub status: SessionStatus,

    /// Interactive or unattended.
    pub mode: RunMode,

    /// Maximum parallel pool workers.
    pub concurrency_cap: usize,

    /// Maximum number of attempts before stopping.
    pub retry_budget: u32,

    /// Consecutive no-progress attempts tolerated before stopping.
    pub no_progress_threshold: u32,

    /// Current count of consecutive no-progress attempts.
    pub no_progress_count: u32,

    /// Append-only attempt history.
    pub attempts: Vec<Attempt>,

    /// Why the session stopped, when status is `Stopped`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last persisted-write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh active session.
    pub fn new(
        mode: RunMode,
        concurrency_cap: usize,
        retry_budget: u32,
        no_progress_threshold: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: SessionStatus::Active,
            mode,
            concurrency_cap,
            retry_budget,
            no_progress_threshold,
            no_progress_count: 0,
            attempts: Vec::new(),
            stop_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of completed attempts.
    pub fn completed_attempts(&self) -> u32 {
        self.attempts.iter().filter(|a| a.is_complete()).count() as u32
    }

    /// The next attempt number (contiguous, 1-based).
    pub fn next_attempt_number(&self) -> u32 {
        self.completed_attempts() + 1
    }

    /// Append a completed attempt.
    pub fn append_attempt(&mut self, attempt: Attempt) {
        self.attempts.push(attempt);
        self.updated_at = Utc::now();
    }

    /// Mark the session completed (suite passes).
    pub fn mark_completed(&mut self) {
        self.status = SessionStatus::Completed;
        self.stop_reason = None;
        self.updated_at = Utc::now();
    }

    /// Mark the session stopped with a reason.
    pub fn mark_stopped(&mut self, reason: StopReason) {
        self.status = SessionStatus::Stopped;
        self.stop_reason = Some(reason);
        self.updated_at = Utc::now();
    }

    /// Switch run mode (interactive `switch-to-unattended` directive).
    pub fn switch_mode(&mut self, mode: RunMode) {
        self.mode = mode;
        self.updated_at = Utc::now();
    }

    /// True while the session can take further attempts.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Check the persisted-state invariants.
    ///
    /// Completed attempt numbers must be contiguous starting at 1, and each
    /// completed attempt's starting set must equal its predecessor's verified
    /// set. Returns a description of the first violation, if any.
    pub fn check_invariants(&self) -> Result<(), String> {
        let completed: Vec<&Attempt> =
            self.attempts.iter().filter(|a| a.is_complete()).collect();

        for (index, attempt) in completed.iter().enumerate() {
            let expected = index as u32 + 1;
            if attempt.number != expected {
                return Err(format!(
                    "attempt numbers not contiguous: expected {expected}, found {}",
                    attempt.number
                ));
            }
        }

        for pair in completed.windows(2) {
            if !pair[1].before.set_eq(&pair[0].after) {
                return Err(format!(
                    "attempt {} does not start from attempt {}'s verified set",
                    pair[1].number, pair[0].number
                ));
            }
        }

        // An incomplete attempt is a crash artifact and may only trail the
        // completed history; anything else is corruption.
        let trailing_incomplete = self
            .attempts
            .iter()
            .rev()
            .take_while(|a| !a.is_complete())
            .count();
        if self.attempts.iter().filter(|a| !a.is_complete()).count() > trailing_incomplete {
            return Err("incomplete attempt recorded before completed attempts".to_string());
        }

        Ok(())
    }

    /// Reconcile persisted state for resume.
    ///
    /// Discards any in-progress attempt (only completed attempts count
    /// toward history and the retry counter), resets the status to active,
    /// and returns the number of records dropped. The caller must still
    /// re-derive the failing set from a fresh discovery.
    pub fn reconcile_for_resume(&mut self) -> usize {
        let before = self.attempts.len();
        self.attempts.retain(Attempt::is_complete);
        self.status = SessionStatus::Active;
        self.stop_reason = None;
        self.updated_at = Utc::now();
        before - self.attempts.len()
    }
}

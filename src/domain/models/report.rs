//! Final run report.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::{Session, SessionStatus, StopReason};

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum RunOutcome {
    /// The suite passes.
    Done,
    /// Stopped before the suite passed.
    Stopped(StopReason),
}

/// User-visible summary of a finished (or stopped) run.
///
/// Always produced at termination: attempts used, ids fixed over the whole
/// run, ids still failing, and the stop reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    /// Session the run belonged to.
    pub session_id: Uuid,

    /// Completed attempts used.
    pub attempts_used: u32,

    /// Ids that were failing at some point and no longer fail.
    pub fixed: Vec<String>,

    /// Ids still failing at termination.
    pub still_failing: Vec<String>,

    /// Terminal outcome.
    pub outcome: RunOutcome,
}

impl FinalReport {
    /// Derive the report from a terminal session.
    ///
    /// "Fixed" is cumulative: every id observed failing in any attempt that
    /// is absent from the last verified set.
    pub fn from_session(session: &Session) -> Self {
        let still_failing: Vec<String> = session
            .attempts
            .last()
            .map(|a| a.after.ids().iter().map(ToString::to_string).collect())
            .unwrap_or_default();

        let mut fixed: Vec<String> = Vec::new();
        for attempt in &session.attempts {
            for outcome in attempt.before.iter() {
                if !still_failing.contains(&outcome.id) && !fixed.contains(&outcome.id) {
                    fixed.push(outcome.id.clone());
                }
            }
        }

        let outcome = match (session.status, session.stop_reason) {
            (SessionStatus::Completed, _) => RunOutcome::Done,
            (_, Some(reason)) => RunOutcome::Stopped(reason),
            // A session without attempts that found nothing failing.
            _ => RunOutcome::Done,
        };

        Self {
            session_id: session.id,
            attempts_used: session.completed_attempts(),
            fixed,
            still_failing,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::attempt::Attempt;
    use crate::domain::models::outcome::{Diagnostic, FailingSet, TestOutcome};
    use crate::domain::models::plan::DispatchPlan;
    use crate::domain::models::session::RunMode;

    fn failing(ids: &[&str]) -> FailingSet {
        FailingSet::from_failures(
            ids.iter()
                .map(|id| {
                    TestOutcome::fail(
                        *id,
                        Diagnostic {
                            message: "failed".to_string(),
                            ..Diagnostic::default()
                        },
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn report_from_completed_session() {
        let mut session = Session::new(RunMode::Unattended, 4, 5, 1);
        session.append_attempt(
            Attempt::begin(1, failing(&["a", "b"]), DispatchPlan::new(vec![], 4))
                .complete(vec![], failing(&["b"])),
        );
        session.append_attempt(
            Attempt::begin(2, failing(&["b"]), DispatchPlan::new(vec![], 4))
                .complete(vec![], failing(&[])),
        );
        session.mark_completed();

        let report = FinalReport::from_session(&session);
        assert_eq!(report.attempts_used, 2);
        assert_eq!(report.fixed, vec!["a", "b"]);
        assert!(report.still_failing.is_empty());
        assert_eq!(report.outcome, RunOutcome::Done);
    }

    #[test]
    fn report_from_stopped_session_lists_survivors() {
        let mut session = Session::new(RunMode::Unattended, 4, 1, 1);
        session.append_attempt(
            Attempt::begin(1, failing(&["a", "b"]), DispatchPlan::new(vec![], 4))
                .complete(vec![], failing(&["b"])),
        );
        session.mark_stopped(StopReason::RetryLimit);

        let report = FinalReport::from_session(&session);
        assert_eq!(report.fixed, vec!["a"]);
        assert_eq!(report.still_failing, vec!["b"]);
        assert_eq!(report.outcome, RunOutcome::Stopped(StopReason::RetryLimit));
    }
}

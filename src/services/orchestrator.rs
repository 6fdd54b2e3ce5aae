//! Orchestrator: the attempt-loop state machine.
//!
//! Drives the cycle `INIT -> DISCOVER -> CLASSIFY -> DISPATCH -> VERIFY ->
//! DECIDE -> {loop | DONE | STOPPED}`, with a resume entry path that never
//! trusts a persisted failing set: resume reconciles completed history and
//! re-derives the failing set from a fresh discovery.
//!
//! The session is owned exclusively by the orchestrator. After each
//! completed attempt (verification and decision done), the attempt is
//! appended and the session persisted before the next transition; that save
//! is the durability boundary for resume.
//!
//! Mode gates a single thing: whether the machine suspends at the attempt
//! boundary to wait for a directive. It never changes classification,
//! dispatch fan-out, or worker isolation. A user stop takes effect only at
//! this suspension boundary; no mid-attempt worker is aborted.

use std::sync::Arc;

use tracing::info;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{
    Attempt, Decision, Directive, DispatchPlan, FinalReport, RunMode, Session, StopReason,
};
use crate::domain::ports::{DirectiveSource, SessionStore, TestRunner, WorkerRuntime};
use crate::services::classifier::FailureClassifier;
use crate::services::dispatcher::Dispatcher;
use crate::services::evaluator::ProgressEvaluator;
use crate::services::result_store::ResultStore;

/// Settings used to seed a fresh session.
///
/// A resumed session keeps the settings it was created with; these apply
/// only when a new session is cut.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Maximum parallel pool workers.
    pub concurrency_cap: usize,
    /// Maximum attempts before stopping.
    pub retry_budget: u32,
    /// Consecutive no-progress attempts tolerated before stopping.
    pub no_progress_threshold: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency_cap: 4,
            retry_budget: 5,
            no_progress_threshold: 1,
        }
    }
}

/// The test-repair orchestrator.
///
/// Generic over its ports following the codebase pattern: the runner and
/// worker collaborators, the session store, and the interactive directive
/// source are all injected.
pub struct Orchestrator<R, W, S, D>
where
    R: TestRunner,
    W: WorkerRuntime + 'static,
    S: SessionStore,
    D: DirectiveSource,
{
    result_store: ResultStore<R>,
    classifier: FailureClassifier,
    dispatcher: Dispatcher<W>,
    session_store: Arc<S>,
    directives: Arc<D>,
    config: OrchestratorConfig,
}

impl<R, W, S, D> Orchestrator<R, W, S, D>
where
    R: TestRunner,
    W: WorkerRuntime + 'static,
    S: SessionStore,
    D: DirectiveSource,
{
    /// Create an orchestrator from its collaborators.
    pub fn new(
        result_store: ResultStore<R>,
        dispatcher: Dispatcher<W>,
        session_store: Arc<S>,
        directives: Arc<D>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            result_store,
            classifier: FailureClassifier::new(),
            dispatcher,
            session_store,
            directives,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Start a fresh session and run to a terminal state.
    ///
    /// Refuses if a session already exists; the caller decides whether to
    /// resume it or reset first.
    pub async fn start(&self, mode: RunMode) -> OrchestratorResult<FinalReport> {
        if self.session_store.exists().await? {
            return Err(OrchestratorError::SessionExists);
        }

        let session = Session::new(
            mode,
            self.config.concurrency_cap,
            self.config.retry_budget,
            self.config.no_progress_threshold,
        );
        info!(session_id = %session.id, ?mode, "starting fresh session");
        self.session_store.save(&session).await?;

        self.run_loop(session).await
    }

    /// Resume a persisted session and run to a terminal state.
    ///
    /// Reconciliation discards any in-progress attempt; only completed
    /// attempts count toward history and the retry counter. The failing set
    /// is re-derived by a fresh discovery, never read from the record.
    pub async fn resume(&self) -> OrchestratorResult<FinalReport> {
        let mut session = self.session_store.load().await?;
        let dropped = session.reconcile_for_resume();
        info!(
            session_id = %session.id,
            completed = session.completed_attempts(),
            dropped_incomplete = dropped,
            "resuming session"
        );
        self.session_store.save(&session).await?;

        self.run_loop(session).await
    }

    /// Dry run: discover and classify, returning the dispatch plan without
    /// dispatching and without mutating the session.
    pub async fn plan(&self) -> OrchestratorResult<DispatchPlan> {
        // Use persisted history for prior-attempt context when present.
        let (history, cap) = if self.session_store.exists().await? {
            let mut session = self.session_store.load().await?;
            session.reconcile_for_resume();
            (session.attempts, session.concurrency_cap)
        } else {
            (Vec::new(), self.config.concurrency_cap)
        };

        let (failing, _) = self.result_store.discover().await?;
        let groups = self.classifier.classify(&failing, &history);
        Ok(DispatchPlan::new(groups, cap))
    }

    // -----------------------------------------------------------------------
    // The attempt loop
    // -----------------------------------------------------------------------

    /// Run the machine from DISCOVER to a terminal state.
    async fn run_loop(&self, mut session: Session) -> OrchestratorResult<FinalReport> {
        let evaluator =
            ProgressEvaluator::new(session.retry_budget, session.no_progress_threshold);

        // DISCOVER
        let (mut failing, _) = self.result_store.discover().await?;
        if failing.is_empty() {
            info!(session_id = %session.id, "suite already passing");
            session.mark_completed();
            self.session_store.save(&session).await?;
            return Ok(FinalReport::from_session(&session));
        }

        loop {
            let number = session.next_attempt_number();
            info!(
                session_id = %session.id,
                attempt = number,
                failing = failing.len(),
                "beginning attempt"
            );

            // CLASSIFY
            let groups = self.classifier.classify(&failing, &session.attempts);
            let plan = DispatchPlan::new(groups, session.concurrency_cap);
            let attempt = Attempt::begin(number, failing.clone(), plan.clone());

            // DISPATCH -- blocks until the whole plan has resolved.
            let results = self.dispatcher.dispatch(number, &plan).await;

            // VERIFY -- never runs on partial results.
            let (post, _) = self.result_store.discover().await?;

            // DECIDE
            let (decision, counter) =
                evaluator.evaluate(&failing, &post, number, session.no_progress_count);

            let attempt = attempt.complete(results, post.clone());
            info!(
                attempt = attempt.number,
                fixed = attempt.fixed.len(),
                broken = attempt.broken.len(),
                unchanged = attempt.unchanged.len(),
                "attempt complete"
            );
            session.append_attempt(attempt);
            session.no_progress_count = counter;

            match decision {
                Decision::Done => session.mark_completed(),
                Decision::Stopped(reason) => session.mark_stopped(reason),
                Decision::Continue => {}
            }

            // Durability boundary: the completed attempt and decision are
            // persisted before any further transition.
            self.session_store.save(&session).await?;

            if decision != Decision::Continue {
                break;
            }

            // Interactive suspension point. The only place a user stop can
            // take effect: cooperative cancellation at attempt granularity.
            if session.mode == RunMode::Interactive {
                match self.directives.next_directive(number, post.len()).await? {
                    Directive::Continue => {}
                    Directive::SwitchToUnattended => {
                        info!("switching to unattended mode");
                        session.switch_mode(RunMode::Unattended);
                        self.session_store.save(&session).await?;
                    }
                    Directive::Stop => {
                        info!("stop directive received");
                        session.mark_stopped(StopReason::UserStop);
                        self.session_store.save(&session).await?;
                        break;
                    }
                }
            }

            failing = post;
        }

        Ok(FinalReport::from_session(&session))
    }
}

//! Dispatcher: execute a dispatch plan against the worker runtime.
//!
//! Independent groups run concurrently under a semaphore-bounded pool with
//! FIFO admission; coupled groups run strictly after all pool work has
//! completed, one at a time, in plan order. Every invocation gets a fresh
//! worker with a fresh context bundle; context never crosses group
//! boundaries.
//!
//! The dispatcher records what was attempted and absorbs individual worker
//! failures; it never evaluates correctness. Verification is a separate
//! orchestrator phase that only runs after the full plan has resolved.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::domain::models::{
    DispatchPlan, FailureGroup, GroupOutcome, GroupResult, WorkAssignment,
};
use crate::domain::ports::{TraceEntry, TraceSink, WorkerRuntime};

/// Executes dispatch plans with bounded parallelism.
pub struct Dispatcher<W: WorkerRuntime> {
    worker: Arc<W>,
    trace: Option<Arc<dyn TraceSink>>,
}

impl<W: WorkerRuntime + 'static> Dispatcher<W> {
    /// Create a dispatcher over a worker runtime.
    pub fn new(worker: Arc<W>) -> Self {
        Self {
            worker,
            trace: None,
        }
    }

    /// Attach the optional trace side-channel.
    pub fn with_trace(mut self, trace: Arc<dyn TraceSink>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Execute the full plan and return per-group results in plan order
    /// (pool groups first, then lane groups).
    ///
    /// Returns only when every dispatched worker has resolved; the caller
    /// never verifies partial results.
    pub async fn dispatch(&self, attempt: u32, plan: &DispatchPlan) -> Vec<GroupResult> {
        info!(
            attempt,
            pool = plan.pool.len(),
            lane = plan.lane.len(),
            cap = plan.concurrency_cap,
            "dispatching repair plan"
        );

        let mut results = self.dispatch_pool(attempt, plan).await;

        // Coupled lane: strictly sequential, strictly after the pool.
        for group in &plan.lane {
            results.push(self.repair_group(attempt, group.clone()).await);
        }

        results
    }

    /// Run the independent groups under the bounded pool.
    ///
    /// Results come back in plan order regardless of completion order.
    async fn dispatch_pool(&self, attempt: u32, plan: &DispatchPlan) -> Vec<GroupResult> {
        let semaphore = Arc::new(Semaphore::new(plan.concurrency_cap.max(1)));
        let mut handles = Vec::with_capacity(plan.pool.len());

        for group in plan.pool.iter().cloned() {
            let semaphore = semaphore.clone();
            let worker = self.worker.clone();
            let trace = self.trace.clone();

            handles.push(tokio::spawn(async move {
                // Acquire inside the task: submission is FIFO, admission is
                // capped. The semaphore is never closed.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("dispatch semaphore closed");
                repair_one(worker, trace, attempt, group).await
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(result) => result,
                Err(join_err) => {
                    warn!(error = %join_err, "pool worker task aborted");
                    GroupResult {
                        test_ids: vec![],
                        kind: crate::domain::models::GroupKind::Independent,
                        outcome: GroupOutcome::Failed {
                            reason: format!("worker task aborted: {join_err}"),
                        },
                    }
                }
            })
            .collect()
    }

    /// Run one coupled group on the sequential lane.
    async fn repair_group(&self, attempt: u32, group: FailureGroup) -> GroupResult {
        repair_one(self.worker.clone(), self.trace.clone(), attempt, group).await
    }
}

/// Invoke one fresh worker on one group and fold the outcome into a record.
async fn repair_one<W: WorkerRuntime>(
    worker: Arc<W>,
    trace: Option<Arc<dyn TraceSink>>,
    attempt: u32,
    group: FailureGroup,
) -> GroupResult {
    let test_ids: Vec<String> = group.test_ids().iter().map(ToString::to_string).collect();
    let kind = group.kind;
    let assignment = WorkAssignment { attempt, group };

    let outcome = match worker.repair(assignment.clone()).await {
        Ok(report) => {
            info!(
                tests = ?test_ids,
                changed = report.changed,
                confidence = report.confidence,
                blocked = report.blocked.is_some(),
                "worker returned fix report"
            );
            GroupOutcome::Report(report)
        }
        Err(err) => {
            // A single worker's failure is recorded, not propagated; the
            // unit stays failing and is reclassified next attempt.
            warn!(tests = ?test_ids, error = %err, "worker failed");
            GroupOutcome::Failed {
                reason: err.to_string(),
            }
        }
    };

    record_trace(trace, attempt, &test_ids, &assignment, &outcome).await;

    GroupResult {
        test_ids,
        kind,
        outcome,
    }
}

/// Append the invocation to the trace side-channel, if enabled.
///
/// A broken trace must never fail a repair attempt.
async fn record_trace(
    trace: Option<Arc<dyn TraceSink>>,
    attempt: u32,
    test_ids: &[String],
    assignment: &WorkAssignment,
    outcome: &GroupOutcome,
) {
    let Some(sink) = trace else { return };

    let entry = TraceEntry {
        timestamp: Utc::now(),
        attempt,
        test_ids: test_ids.to_vec(),
        input: serde_json::to_value(assignment).unwrap_or_default(),
        output: serde_json::to_value(outcome).unwrap_or_default(),
    };

    if let Err(err) = sink.record(entry).await {
        warn!(error = %err, "failed to write worker trace");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::domain::errors::{OrchestratorError, OrchestratorResult};
    use crate::domain::models::outcome::Diagnostic;
    use crate::domain::models::{FailureUnit, FixReport, GroupKind};

    fn unit(id: &str) -> FailureUnit {
        FailureUnit {
            test_id: id.to_string(),
            diagnostic: Diagnostic::default(),
            prior_attempts: vec![],
        }
    }

    /// Worker that records invocation order and peak concurrency.
    struct ProbeWorker {
        order: Mutex<Vec<String>>,
        running: AtomicUsize,
        peak: AtomicUsize,
        fail_ids: Vec<String>,
    }

    impl ProbeWorker {
        fn new(fail_ids: &[&str]) -> Self {
            Self {
                order: Mutex::new(vec![]),
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                fail_ids: fail_ids.iter().map(ToString::to_string).collect(),
            }
        }
    }

    #[async_trait]
    impl WorkerRuntime for ProbeWorker {
        async fn repair(&self, assignment: WorkAssignment) -> OrchestratorResult<FixReport> {
            let key = assignment.group.test_ids().join("+");
            self.order.lock().unwrap().push(key.clone());

            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);

            if assignment
                .group
                .test_ids()
                .iter()
                .any(|id| self.fail_ids.iter().any(|f| f == id))
            {
                return Err(OrchestratorError::WorkerFailed {
                    unit: key,
                    reason: "no usable change".to_string(),
                });
            }

            Ok(FixReport {
                changed: true,
                confidence: 0.9,
                blocked: None,
                summary: format!("repaired {key}"),
            })
        }
    }

    fn plan(independent: &[&str], coupled: &[&[&str]], cap: usize) -> DispatchPlan {
        let mut groups: Vec<FailureGroup> = coupled
            .iter()
            .map(|ids| FailureGroup::coupled(ids.iter().map(|id| unit(id)).collect(), vec![]))
            .collect();
        groups.extend(independent.iter().map(|id| FailureGroup::independent(unit(id))));
        DispatchPlan::new(groups, cap)
    }

    #[tokio::test]
    async fn pool_respects_concurrency_cap() {
        let worker = Arc::new(ProbeWorker::new(&[]));
        let dispatcher = Dispatcher::new(worker.clone());

        let plan = plan(&["a", "b", "c", "d", "e", "f"], &[], 2);
        let results = dispatcher.dispatch(1, &plan).await;

        assert_eq!(results.len(), 6);
        assert!(worker.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn coupled_lane_runs_after_pool_and_in_order() {
        let worker = Arc::new(ProbeWorker::new(&[]));
        let dispatcher = Dispatcher::new(worker.clone());

        let plan = plan(&["i1", "i2"], &[&["c1", "c2"], &["c3"]], 4);
        let results = dispatcher.dispatch(1, &plan).await;

        // Results come back pool-first in plan order.
        assert_eq!(results[0].test_ids, vec!["i1"]);
        assert_eq!(results[1].test_ids, vec!["i2"]);
        assert_eq!(results[2].test_ids, vec!["c1", "c2"]);
        assert_eq!(results[3].test_ids, vec!["c3"]);
        assert_eq!(results[2].kind, GroupKind::Coupled);

        // Invocation order: every coupled group starts after all pool work.
        let order = worker.order.lock().unwrap().clone();
        let first_coupled = order.iter().position(|k| k.starts_with("c1")).unwrap();
        assert!(order[..first_coupled].iter().all(|k| k.starts_with('i')));
        // And the lane itself keeps plan order.
        let c3 = order.iter().position(|k| k == "c3").unwrap();
        assert!(first_coupled < c3);
    }

    #[tokio::test]
    async fn worker_failure_is_absorbed() {
        let worker = Arc::new(ProbeWorker::new(&["bad"]));
        let dispatcher = Dispatcher::new(worker);

        let plan = plan(&["good", "bad"], &[], 4);
        let results = dispatcher.dispatch(1, &plan).await;

        assert!(results[0].changed());
        assert!(matches!(results[1].outcome, GroupOutcome::Failed { .. }));
        assert!(results[1].summary().contains("no usable change"));
    }

    #[tokio::test]
    async fn empty_plan_dispatches_nothing() {
        let worker = Arc::new(ProbeWorker::new(&[]));
        let dispatcher = Dispatcher::new(worker.clone());

        let results = dispatcher.dispatch(1, &plan(&[], &[], 4)).await;
        assert!(results.is_empty());
        assert!(worker.order.lock().unwrap().is_empty());
    }
}

//! Result store: discovery of the current failing set.
//!
//! Invokes the external test runner through its port and parses the
//! structured report it leaves behind into typed outcomes. Stateless; it is
//! called once per orchestrator phase (initial discovery and post-dispatch
//! verification).
//!
//! A missing or malformed report is `ReportUnavailable`: it means the
//! external runner did not execute properly, not that tests failed, so it
//! is surfaced rather than retried.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{Diagnostic, ErrorSignature, FailingSet, TestOutcome, TestStatus};
use crate::domain::ports::TestRunner;

// ---------------------------------------------------------------------------
// Report schema
// ---------------------------------------------------------------------------

/// Wire schema of the runner's report file.
#[derive(Debug, Deserialize)]
struct RawReport {
    tests: Vec<RawTest>,
}

#[derive(Debug, Deserialize)]
struct RawTest {
    id: String,
    status: TestStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    signature: Option<ErrorSignature>,
    #[serde(default)]
    fixtures: Vec<String>,
    #[serde(default)]
    feature_area: Option<String>,
}

impl RawTest {
    fn into_outcome(self) -> TestOutcome {
        let diagnostic = if self.status == TestStatus::Fail {
            Some(Diagnostic {
                message: self.message.unwrap_or_default(),
                location: self.location,
                signature: self.signature,
                fixtures: self.fixtures,
                feature_area: self.feature_area,
            })
        } else {
            None
        };
        TestOutcome {
            id: self.id,
            status: self.status,
            diagnostic,
        }
    }
}

// ---------------------------------------------------------------------------
// ResultStore
// ---------------------------------------------------------------------------

/// Discovers the failing set by running the suite and parsing its report.
pub struct ResultStore<R: TestRunner> {
    runner: Arc<R>,
}

impl<R: TestRunner> ResultStore<R> {
    /// Create a result store over a test runner.
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    /// Run the suite and return the failing set plus the full outcome list.
    ///
    /// Blocks until the external run completes.
    pub async fn discover(&self) -> OrchestratorResult<(FailingSet, Vec<TestOutcome>)> {
        let raw = self.runner.run().await?;
        let outcomes = Self::parse_report(&raw)?;
        let failing = FailingSet::from_outcomes(&outcomes);

        debug!(
            total = outcomes.len(),
            failing = failing.len(),
            "suite discovery complete"
        );

        Ok((failing, outcomes))
    }

    /// Parse raw report text into outcomes.
    ///
    /// Malformed input is `ReportUnavailable`, carrying the parse error.
    fn parse_report(raw: &str) -> OrchestratorResult<Vec<TestOutcome>> {
        if raw.trim().is_empty() {
            return Err(OrchestratorError::report_unavailable("report is empty"));
        }

        let report: RawReport = serde_json::from_str(raw).map_err(|e| {
            OrchestratorError::report_unavailable(format!("report is malformed: {e}"))
        })?;

        Ok(report.tests.into_iter().map(RawTest::into_outcome).collect())
    }
}

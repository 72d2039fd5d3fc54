//! Runs checks in isolation and collects their outcomes.
//!
//! # Design
//! A check is a plain function over a `Context`. The context is the only way a
//! check reaches the network, and it consults the fixture before every call,
//! so an uninitialized fixture fails each check fast instead of falling back
//! to defaults. Each check runs under `catch_unwind`; a panic or an error in
//! one never stops the others.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::client::{TodoClient, UsersClient};
use crate::config::{Config, Fixture};
use crate::error::{ApiError, FailureKind};
use crate::http::{HttpRequest, HttpResponse};
use crate::report::{CaseOutcome, Outcome, Report};
use crate::transport::Transport;

/// Which service a check talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    TodoService,
    Users,
}

/// A named check.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub target: Target,
    pub run: fn(&Context<'_>) -> Result<(), ApiError>,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish()
    }
}

/// What a running check sees: the fixture and a transport.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    fixture: &'a Fixture,
    transport: &'a dyn Transport,
}

impl<'a> Context<'a> {
    pub fn new(fixture: &'a Fixture, transport: &'a dyn Transport) -> Self {
        Self { fixture, transport }
    }

    pub fn config(&self) -> Result<&'a Config, ApiError> {
        self.fixture.config()
    }

    pub fn todos(&self) -> Result<TodoClient, ApiError> {
        Ok(TodoClient::new(self.config()?))
    }

    pub fn users(&self) -> Result<UsersClient, ApiError> {
        Ok(UsersClient::new(self.config()?))
    }

    /// Execute `request`, failing fast if the fixture is not initialized.
    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.config()?;
        self.transport.execute(&request)
    }
}

/// Runs a list of checks against one fixture and transport.
pub struct Suite<'a> {
    context: Context<'a>,
}

impl<'a> Suite<'a> {
    pub fn new(fixture: &'a Fixture, transport: &'a dyn Transport) -> Self {
        Self {
            context: Context::new(fixture, transport),
        }
    }

    pub fn run(&self, scenarios: &[Scenario]) -> Report {
        let mut report = Report::new();
        let span = info_span!("suite", run_id = %report.run_id);
        let _guard = span.enter();
        for scenario in scenarios {
            report.cases.push(self.run_one(scenario));
        }
        info!(
            passed = report.passed(),
            failed = report.failed(),
            "suite finished"
        );
        report
    }

    pub fn run_one(&self, scenario: &Scenario) -> CaseOutcome {
        let started = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| (scenario.run)(&self.context)));
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(Ok(())) => {
                info!(check = scenario.name, ?elapsed, "passed");
                Outcome::Passed
            }
            Ok(Err(err)) => {
                warn!(check = scenario.name, kind = %err.kind(), error = %err, "failed");
                Outcome::Failed {
                    kind: err.kind(),
                    detail: err.to_string(),
                }
            }
            Err(payload) => {
                let detail = panic_message(payload.as_ref());
                warn!(check = scenario.name, %detail, "panicked");
                Outcome::Failed {
                    kind: FailureKind::Panic,
                    detail,
                }
            }
        };

        CaseOutcome {
            name: scenario.name,
            elapsed,
            outcome,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "check panicked".to_string()
}

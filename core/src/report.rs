//! Per-run pass/fail report.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use crate::error::FailureKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed { kind: FailureKind, detail: String },
}

#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub name: &'static str,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Outcomes of one suite run, in execution order.
#[derive(Debug, Clone)]
pub struct Report {
    pub run_id: Uuid,
    pub cases: Vec<CaseOutcome>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            cases: Vec::new(),
        }
    }

    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.cases.iter().filter(|c| !c.passed())
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {}", self.run_id)?;
        for case in &self.cases {
            let ms = case.elapsed.as_millis();
            match &case.outcome {
                Outcome::Passed => writeln!(f, "PASS  {:<36} {ms:>6} ms", case.name)?,
                Outcome::Failed { kind, detail } => {
                    writeln!(f, "FAIL  {:<36} {ms:>6} ms", case.name)?;
                    writeln!(f, "      {kind}: {detail}")?;
                }
            }
        }
        write!(
            f,
            "{} passed, {} failed, {} total",
            self.passed(),
            self.failed(),
            self.cases.len()
        )
    }
}

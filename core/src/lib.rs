//! Black-box HTTP checks for a todo REST service and a public user directory.
//!
//! # Overview
//! A `Fixture` holds the connection settings, set once per run. Checks in
//! `scenarios` build requests with `TodoClient` / `UsersClient`, send them
//! through a `Transport`, and assert on status and decoded fields. `Suite`
//! runs them in isolation and produces a `Report`.
//!
//! # Design
//! - Clients are stateless: `build_*` produces a request, `parse_*` consumes
//!   a response, and the I/O in between is a `Transport`.
//! - Checks return `Result<(), ApiError>`; the error kind tells an assertion
//!   mismatch apart from a decode failure, a transport failure, or a missing
//!   configuration.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod expect;
pub mod http;
pub mod report;
pub mod scenarios;
pub mod suite;
pub mod transport;
pub mod types;

pub use client::{TodoClient, UsersClient};
pub use config::{Config, Fixture};
pub use error::{ApiError, FailureKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use report::{CaseOutcome, Outcome, Report};
pub use suite::{Context, Scenario, Suite, Target};
pub use transport::{Transport, UreqTransport};
pub use types::{Address, NewTodo, Todo, User};

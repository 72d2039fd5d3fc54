//! Error types for the todo check harness.
//!
//! # Design
//! Every way a check can fail is an `ApiError` variant. `NotFound` keeps its
//! own variant because callers often tell "the record does not exist" apart
//! from "the server returned some other unexpected status." The report groups
//! variants by `FailureKind` so a value mismatch never reads like a decode
//! failure or a dead network.

use thiserror::Error;

/// Errors returned by the client, the transport, and the checks.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A check ran before the fixture was given its configuration.
    #[error("configuration not initialized")]
    NotInitialized,

    #[error("configuration already initialized")]
    AlreadyInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request never produced a response (refused, timed out, DNS).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server returned 404 where a success status was expected.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than the expected one.
    #[error("expected HTTP {expected}, got HTTP {status}: {body}")]
    HttpError {
        expected: u16,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A decoded value differs from the expected literal.
    #[error("`{field}`: expected {expected}, actual {actual}")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },
}

/// Coarse failure category used by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Assertion,
    Transport,
    Decode,
    Configuration,
    Panic,
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::NotInitialized | ApiError::AlreadyInitialized | ApiError::InvalidConfig(_) => {
                FailureKind::Configuration
            }
            ApiError::Transport(_) => FailureKind::Transport,
            ApiError::DeserializationError(_) | ApiError::SerializationError(_) => FailureKind::Decode,
            ApiError::NotFound | ApiError::HttpError { .. } | ApiError::Mismatch { .. } => {
                FailureKind::Assertion
            }
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::Assertion => "assertion",
            FailureKind::Transport => "transport",
            FailureKind::Decode => "decode",
            FailureKind::Configuration => "configuration",
            FailureKind::Panic => "panic",
        };
        f.write_str(label)
    }
}

//! Error types for the audit engines.
//!
//! Failure to resolve an axis role is never an error here: every
//! consumer reports it as a skipped check instead. Errors are reserved
//! for invalid options, explicit names that do not exist, and external
//! verifier failures when fallback is disabled.

use thiserror::Error;

/// Result type alias using AuditError.
pub type AuditResult<T> = Result<T, AuditError>;

/// Errors raised by the audit engines.
#[derive(Debug, Error)]
pub enum AuditError {
    /// An option value was rejected before any check executed.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The external verifier could not run and fallback was disabled.
    #[error("external verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// The external verifier ran but reported an internal failure, and
    /// fallback was disabled.
    #[error("external verifier failed: {0}")]
    VerifierFailed(String),

    /// An explicitly named data variable does not exist.
    #[error("data variable not found: {0}")]
    VariableNotFound(String),
}

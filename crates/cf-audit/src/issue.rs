//! Issue records produced by the compliance engines.

use serde::{Deserialize, Serialize};

/// Subject name used for dataset-level issues.
pub const GLOBAL_SUBJECT: &str = "global";

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Which rule set produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueOrigin {
    /// The built-in heuristic rule engine.
    Heuristic,
    /// The external convention verifier.
    External,
    /// Convention-specific extra rules (cf casing, ferret fill values).
    Convention,
}

/// A single immutable finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable machine-readable identifier, e.g. `coord_not_monotonic`.
    pub code: String,
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    pub origin: IssueOrigin,
    /// Variable/coordinate name, or `"global"`.
    pub subject: String,
}

impl Issue {
    pub fn new(
        code: &str,
        severity: Severity,
        origin: IssueOrigin,
        subject: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message: message.into(),
            origin,
            subject: subject.to_string(),
        }
    }
}

/// Outcome of one coverage subcheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Ran and found nothing suspicious.
    Pass,
    /// Ran and found the pattern it looks for.
    Flagged,
    /// Could not run; the report carries the reason.
    Skipped,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "pass"),
            CheckStatus::Flagged => write!(f, "flagged"),
            CheckStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Counts by severity over an ordered issue sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueCounts {
    /// Tally an ordered issue slice.
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.infos += 1,
            }
        }
        counts
    }

    /// Total findings at any severity.
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }
}

//! CF metadata auditing for in-memory labeled datasets.
//!
//! Checks gridded datasets against a practical subset of the CF
//! conventions, repairs metadata non-destructively, and detects two
//! grid-coverage artifacts common in regridded ocean products. The
//! dataset model lives in `cf-common`; everything here takes
//! `&Dataset` and never mutates the caller's data.
//!
//! Entry point is [`Checker`]:
//!
//! ```
//! use cf_audit::{Checker, CheckOptions, CoverageOptions};
//! use cf_audit::testdata;
//!
//! let ds = testdata::compliant_dataset();
//! let checker = Checker::new(&ds);
//! let combined = checker
//!     .check_all(&CheckOptions::default(), &CoverageOptions::default())
//!     .unwrap();
//! assert_eq!(combined.checks_run, 3);
//! ```

pub mod axis;
pub mod checker;
pub mod compliance;
pub mod error;
pub mod fixer;
pub mod heuristic;
pub mod issue;
pub mod ocean;
pub mod options;
pub mod report;
mod runs;
pub mod testdata;
pub mod timecover;
mod timeutil;
pub mod vocab;

pub use axis::{infer_axes, AxisOverrides, AxisRole, AxisRoleMap};
pub use checker::Checker;
pub use compliance::{
    CfVerifier, ComplianceReport, EngineExecuted, VerifierError, VerifierPayload,
};
pub use error::{AuditError, AuditResult};
pub use fixer::{make_compliant, make_compliant_with};
pub use issue::{CheckStatus, Issue, IssueCounts, IssueOrigin, Severity};
pub use ocean::{OceanCoverageReport, VariableOceanReport};
pub use options::{CheckOptions, ConventionSet, CoverageOptions, Domain, EngineChoice, CF_VERSION};
pub use report::{CombinedReport, OverallStatus};
pub use timecover::{TimeCoverageReport, VariableTimeReport};

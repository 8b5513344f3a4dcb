//! Compliance orchestration.
//!
//! Selects between the external convention verifier and the built-in
//! heuristic engine, merges convention-specific extra rules, and
//! assembles the [`ComplianceReport`]. The verifier is injected as a
//! trait object; nothing here shells out or touches the filesystem.

use std::collections::BTreeMap;

use cf_common::{AttrMap, Dataset};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::axis::{infer_axes, AxisRoleMap};
use crate::error::{AuditError, AuditResult};
use crate::heuristic;
use crate::issue::{Issue, IssueCounts, IssueOrigin};
use crate::options::{CheckOptions, EngineChoice, CF_VERSION};

/// Failure reported by an external verifier run.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct VerifierError(pub String);

/// An external CF convention verifier.
///
/// One synchronous call per check; the orchestrator never retries. A
/// failure either degrades to the heuristic engine or propagates,
/// depending on the engine policy.
pub trait CfVerifier {
    /// Verifier name used in logs and error messages.
    fn name(&self) -> &str;

    /// Verify the metadata shadow and return findings.
    fn verify(&self, payload: &VerifierPayload) -> Result<Vec<Issue>, VerifierError>;
}

/// Metadata-only shadow of a variable, as handed to the verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableShadow {
    pub dims: Vec<String>,
    pub is_coordinate: bool,
    pub attrs: AttrMap,
}

/// Metadata-only shadow of a dataset.
///
/// Dimension lengths are clamped to at most 1 and cell values are not
/// carried, so the payload stays small no matter how large the data
/// is. It is serialized for transport only, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierPayload {
    pub cf_version: String,
    pub dims: BTreeMap<String, usize>,
    pub variables: BTreeMap<String, VariableShadow>,
    pub attrs: AttrMap,
}

impl VerifierPayload {
    /// Build the shadow from a dataset.
    pub fn from_dataset(ds: &Dataset, cf_version: &str) -> Self {
        let dims = ds
            .dims()
            .map(|(name, size)| (name.to_string(), size.min(1)))
            .collect();
        let mut variables = BTreeMap::new();
        for (name, coord) in ds.coords() {
            variables.insert(
                name.to_string(),
                VariableShadow {
                    dims: coord.dims.clone(),
                    is_coordinate: true,
                    attrs: coord.attrs.clone(),
                },
            );
        }
        for (name, var) in ds.data_vars() {
            variables.insert(
                name.to_string(),
                VariableShadow {
                    dims: var.dims.clone(),
                    is_coordinate: false,
                    attrs: var.attrs.clone(),
                },
            );
        }
        Self {
            cf_version: cf_version.to_string(),
            dims,
            variables,
            attrs: ds.attrs().clone(),
        }
    }

    /// JSON form of the shadow.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Which engine actually produced the CF issue list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineExecuted {
    External,
    Heuristic,
}

/// Result of one compliance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub cf_version: String,
    /// Executed CF engine; `None` when the CF convention was not
    /// selected and only convention extras ran.
    pub engine: Option<EngineExecuted>,
    pub conventions_checked: Vec<String>,
    pub axes: AxisRoleMap,
    pub issues: Vec<Issue>,
    pub counts: IssueCounts,
    /// Diagnostic recorded when the external verifier failed but the
    /// heuristic fallback produced the report anyway.
    pub checker_error: Option<String>,
}

impl ComplianceReport {
    /// Whether the check passed: no error-severity issues and no
    /// recorded verifier failure.
    pub fn ok(&self) -> bool {
        self.counts.errors == 0 && self.checker_error.is_none()
    }
}

/// Run the compliance check against a dataset.
pub fn run_compliance(
    ds: &Dataset,
    options: &CheckOptions,
    verifier: Option<&dyn CfVerifier>,
) -> AuditResult<ComplianceReport> {
    let axes = infer_axes(ds, &options.axes);
    let mut issues = Vec::new();
    let mut engine = None;
    let mut checker_error = None;

    if options.conventions.cf {
        match options.engine {
            EngineChoice::Heuristic => {
                debug!("running built-in heuristic engine");
                issues.extend(heuristic::run_core_rules(ds, &axes, options.domain, CF_VERSION));
                engine = Some(EngineExecuted::Heuristic);
            }
            EngineChoice::External | EngineChoice::Auto => {
                let outcome = match verifier {
                    Some(verifier) => {
                        debug!(verifier = verifier.name(), "running external verifier");
                        let payload = VerifierPayload::from_dataset(ds, CF_VERSION);
                        verifier
                            .verify(&payload)
                            .map_err(|err| format!("{} failed: {}", verifier.name(), err))
                    }
                    None => Err("no external verifier configured".to_string()),
                };
                match outcome {
                    Ok(mut external) => {
                        for issue in &mut external {
                            issue.origin = IssueOrigin::External;
                        }
                        issues.extend(external);
                        engine = Some(EngineExecuted::External);
                    }
                    Err(reason) => {
                        let forced = options.engine == EngineChoice::External;
                        if forced || !options.fallback_enabled() {
                            return Err(match verifier {
                                Some(_) => AuditError::VerifierFailed(reason),
                                None => AuditError::VerifierUnavailable(reason),
                            });
                        }
                        warn!(%reason, "external verifier unavailable, falling back to heuristics");
                        checker_error = Some(reason);
                        issues.extend(heuristic::run_core_rules(
                            ds,
                            &axes,
                            options.domain,
                            CF_VERSION,
                        ));
                        engine = Some(EngineExecuted::Heuristic);
                    }
                }
            }
        }
    } else {
        debug!("cf convention not selected, skipping CF engine");
    }

    issues.extend(heuristic::run_convention_rules(ds, &options.conventions));

    let counts = IssueCounts::from_issues(&issues);
    Ok(ComplianceReport {
        cf_version: CF_VERSION.to_string(),
        engine,
        conventions_checked: options
            .conventions
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        axes,
        issues,
        counts,
        checker_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use crate::options::ConventionSet;
    use crate::testdata;

    /// Mock verifier with a scripted outcome.
    struct ScriptedVerifier {
        outcome: Result<Vec<Issue>, VerifierError>,
    }

    impl CfVerifier for ScriptedVerifier {
        fn name(&self) -> &str {
            "scripted"
        }

        fn verify(&self, _payload: &VerifierPayload) -> Result<Vec<Issue>, VerifierError> {
            self.outcome.clone()
        }
    }

    fn external_issue() -> Issue {
        Issue::new(
            "external_finding",
            Severity::Warning,
            IssueOrigin::Heuristic, // orchestrator must rewrite this
            "sst",
            "finding from the verifier",
        )
    }

    #[test]
    fn test_external_issues_tagged_with_origin() {
        let ds = testdata::compliant_dataset();
        let verifier = ScriptedVerifier {
            outcome: Ok(vec![external_issue()]),
        };
        let report =
            run_compliance(&ds, &CheckOptions::default(), Some(&verifier)).unwrap();
        assert_eq!(report.engine, Some(EngineExecuted::External));
        assert!(report.checker_error.is_none());
        let ext = report
            .issues
            .iter()
            .find(|i| i.code == "external_finding")
            .expect("external issue present");
        assert_eq!(ext.origin, IssueOrigin::External);
    }

    #[test]
    fn test_auto_falls_back_when_verifier_fails() {
        let ds = testdata::compliant_dataset();
        let verifier = ScriptedVerifier {
            outcome: Err(VerifierError("checker binary exploded".to_string())),
        };
        let report =
            run_compliance(&ds, &CheckOptions::default(), Some(&verifier)).unwrap();
        assert_eq!(report.engine, Some(EngineExecuted::Heuristic));
        let error = report.checker_error.expect("checker_error recorded");
        assert!(error.contains("scripted"));
    }

    #[test]
    fn test_auto_falls_back_when_verifier_missing() {
        let ds = testdata::compliant_dataset();
        let report = run_compliance(&ds, &CheckOptions::default(), None).unwrap();
        assert_eq!(report.engine, Some(EngineExecuted::Heuristic));
        assert!(report.checker_error.is_some());
    }

    #[test]
    fn test_forced_external_failure_is_hard_error() {
        let ds = testdata::compliant_dataset();
        let options = CheckOptions {
            engine: EngineChoice::External,
            ..Default::default()
        };
        let result = run_compliance(&ds, &options, None);
        assert!(matches!(result, Err(AuditError::VerifierUnavailable(_))));

        let verifier = ScriptedVerifier {
            outcome: Err(VerifierError("boom".to_string())),
        };
        let result = run_compliance(&ds, &options, Some(&verifier));
        assert!(matches!(result, Err(AuditError::VerifierFailed(_))));
    }

    #[test]
    fn test_fallback_disabled_propagates() {
        let ds = testdata::compliant_dataset();
        let options = CheckOptions {
            fallback_to_heuristic: Some(false),
            ..Default::default()
        };
        assert!(run_compliance(&ds, &options, None).is_err());
    }

    #[test]
    fn test_ferret_only_skips_cf_engine() {
        let ds = testdata::compliant_dataset();
        let options = CheckOptions {
            conventions: ConventionSet {
                cf: false,
                ferret: true,
            },
            ..Default::default()
        };
        let report = run_compliance(&ds, &options, None).unwrap();
        assert_eq!(report.engine, None);
        assert!(report.checker_error.is_none());
        assert_eq!(report.conventions_checked, vec!["ferret"]);
    }

    #[test]
    fn test_payload_clamps_dimension_sizes() {
        let ds = testdata::compliant_dataset();
        let payload = VerifierPayload::from_dataset(&ds, CF_VERSION);
        for (_, size) in &payload.dims {
            assert!(*size <= 1);
        }
        assert!(payload.variables.values().any(|v| v.is_coordinate));
        assert!(payload.to_json().unwrap().contains("cf_version"));
    }
}

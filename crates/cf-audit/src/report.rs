//! Report aggregation.
//!
//! Rolls any subset of check reports into one combined verdict. The
//! policy is fail > warn > pass: one failing sub-report fails the
//! whole run, and skips/warnings are surfaced without failing it.

use serde::{Deserialize, Serialize};

use crate::compliance::ComplianceReport;
use crate::issue::CheckStatus;
use crate::ocean::OceanCoverageReport;
use crate::timecover::TimeCoverageReport;

/// Combined verdict over a whole check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallStatus::Pass => write!(f, "pass"),
            OverallStatus::Warn => write!(f, "warn"),
            OverallStatus::Fail => write!(f, "fail"),
        }
    }
}

/// Everything one check run produced, plus the rolled-up verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedReport {
    pub compliance: Option<ComplianceReport>,
    pub ocean: Option<OceanCoverageReport>,
    pub time: Option<TimeCoverageReport>,
    pub checks_run: usize,
    /// Names of sub-reports that failed.
    pub failing_checks: Vec<String>,
    /// Names of sub-reports that only warned or were skipped.
    pub warnings_or_skips: Vec<String>,
    pub overall_status: OverallStatus,
    pub overall_ok: bool,
}

enum Verdict {
    Pass,
    Warn,
    Fail,
}

fn compliance_verdict(report: &ComplianceReport) -> Verdict {
    if report.counts.errors > 0 || report.checker_error.is_some() {
        Verdict::Fail
    } else if report.counts.warnings > 0 || report.counts.infos > 0 {
        Verdict::Warn
    } else {
        Verdict::Pass
    }
}

fn coverage_verdict(statuses: impl Iterator<Item = CheckStatus>) -> Verdict {
    let mut any_skipped = false;
    for status in statuses {
        match status {
            CheckStatus::Flagged => return Verdict::Fail,
            CheckStatus::Skipped => any_skipped = true,
            CheckStatus::Pass => {}
        }
    }
    if any_skipped {
        Verdict::Warn
    } else {
        Verdict::Pass
    }
}

impl CombinedReport {
    /// Aggregate whichever sub-reports were produced.
    pub fn summarize(
        compliance: Option<ComplianceReport>,
        ocean: Option<OceanCoverageReport>,
        time: Option<TimeCoverageReport>,
    ) -> Self {
        let mut checks_run = 0;
        let mut failing_checks = Vec::new();
        let mut warnings_or_skips = Vec::new();

        let mut record = |name: &str, verdict: Verdict| match verdict {
            Verdict::Fail => failing_checks.push(name.to_string()),
            Verdict::Warn => warnings_or_skips.push(name.to_string()),
            Verdict::Pass => {}
        };

        if let Some(report) = &compliance {
            checks_run += 1;
            record("compliance", compliance_verdict(report));
        }
        if let Some(report) = &ocean {
            checks_run += 1;
            record("ocean_coverage", coverage_verdict(report.statuses()));
        }
        if let Some(report) = &time {
            checks_run += 1;
            record(
                "time_coverage",
                coverage_verdict(report.variables.values().map(|v| v.status)),
            );
        }

        let overall_status = if !failing_checks.is_empty() {
            OverallStatus::Fail
        } else if !warnings_or_skips.is_empty() {
            OverallStatus::Warn
        } else {
            OverallStatus::Pass
        };

        Self {
            compliance,
            ocean,
            time,
            checks_run,
            failing_checks,
            warnings_or_skips,
            overall_status,
            overall_ok: overall_status != OverallStatus::Fail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CheckOptions, CoverageOptions};
    use crate::testdata;
    use crate::{compliance, ocean, timecover};

    fn heuristic_options() -> CheckOptions {
        CheckOptions {
            engine: crate::options::EngineChoice::Heuristic,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_run_passes() {
        let combined = CombinedReport::summarize(None, None, None);
        assert_eq!(combined.checks_run, 0);
        assert_eq!(combined.overall_status, OverallStatus::Pass);
        assert!(combined.overall_ok);
    }

    #[test]
    fn test_failure_dominates() {
        let ds = testdata::global_ocean_dataset_with_edge_band(3);
        let oc = ocean::run_ocean(&ds, &CoverageOptions::default()).unwrap();
        let tc = timecover::run_time(&ds, &CoverageOptions::default()).unwrap();
        let combined = CombinedReport::summarize(None, Some(oc), Some(tc));
        assert_eq!(combined.checks_run, 2);
        assert_eq!(combined.failing_checks, vec!["ocean_coverage"]);
        assert_eq!(combined.overall_status, OverallStatus::Fail);
        assert!(!combined.overall_ok);
    }

    #[test]
    fn test_warn_when_only_skips() {
        let ds = testdata::time_series_dataset(&[]);
        let options = CoverageOptions {
            check_edge_of_map: false,
            check_land_ocean_offset: false,
            ..Default::default()
        };
        let oc = ocean::run_ocean(&ds, &options).unwrap();
        let combined = CombinedReport::summarize(None, Some(oc), None);
        assert_eq!(combined.overall_status, OverallStatus::Warn);
        assert!(combined.overall_ok);
        assert_eq!(combined.warnings_or_skips, vec!["ocean_coverage"]);
    }

    #[test]
    fn test_compliance_errors_fail() {
        let ds = testdata::messy_dataset();
        let report = compliance::run_compliance(&ds, &heuristic_options(), None).unwrap();
        assert!(report.counts.errors > 0);
        let combined = CombinedReport::summarize(Some(report), None, None);
        assert_eq!(combined.overall_status, OverallStatus::Fail);
    }

    #[test]
    fn test_combined_report_serializes() {
        let ds = testdata::compliant_dataset();
        let report = compliance::run_compliance(&ds, &heuristic_options(), None).unwrap();
        let combined = CombinedReport::summarize(Some(report), None, None);
        let json = serde_json::to_string(&combined).unwrap();
        assert!(json.contains("overall_status"));
    }
}

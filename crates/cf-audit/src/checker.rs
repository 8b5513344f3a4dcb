//! The checking facade.
//!
//! A [`Checker`] borrows a dataset and exposes the individual checks
//! plus a combined run. Construction is explicit per dataset; there is
//! no process-wide registration.

use cf_common::Dataset;

use crate::compliance::{self, CfVerifier, ComplianceReport};
use crate::error::AuditResult;
use crate::fixer;
use crate::ocean::{self, OceanCoverageReport};
use crate::options::{CheckOptions, CoverageOptions};
use crate::report::CombinedReport;
use crate::timecover::{self, TimeCoverageReport};

/// Checking facade over one dataset.
pub struct Checker<'a> {
    ds: &'a Dataset,
    verifier: Option<&'a dyn CfVerifier>,
}

impl<'a> Checker<'a> {
    /// Wrap a dataset for checking.
    pub fn new(ds: &'a Dataset) -> Self {
        Self { ds, verifier: None }
    }

    /// Inject an external convention verifier.
    pub fn with_verifier(mut self, verifier: &'a dyn CfVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Run the compliance check.
    pub fn compliance(&self, options: &CheckOptions) -> AuditResult<ComplianceReport> {
        compliance::run_compliance(self.ds, options, self.verifier)
    }

    /// Return a metadata-repaired copy of the dataset.
    pub fn make_compliant(&self) -> Dataset {
        fixer::make_compliant(self.ds)
    }

    /// Run the ocean-coverage checks.
    pub fn ocean_cover(&self, options: &CoverageOptions) -> AuditResult<OceanCoverageReport> {
        ocean::run_ocean(self.ds, options)
    }

    /// Run the time-coverage check.
    pub fn time_cover(&self, options: &CoverageOptions) -> AuditResult<TimeCoverageReport> {
        timecover::run_time(self.ds, options)
    }

    /// Run every check and aggregate the results.
    pub fn check_all(
        &self,
        check: &CheckOptions,
        coverage: &CoverageOptions,
    ) -> AuditResult<CombinedReport> {
        let compliance = self.compliance(check)?;
        let ocean = self.ocean_cover(coverage)?;
        let time = self.time_cover(coverage)?;
        Ok(CombinedReport::summarize(
            Some(compliance),
            Some(ocean),
            Some(time),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::EngineChoice;
    use crate::testdata;

    #[test]
    fn test_check_all_runs_everything() {
        let ds = testdata::global_ocean_dataset();
        let options = CheckOptions {
            engine: EngineChoice::Heuristic,
            ..Default::default()
        };
        let combined = Checker::new(&ds)
            .check_all(&options, &CoverageOptions::default())
            .unwrap();
        assert_eq!(combined.checks_run, 3);
        assert!(combined.compliance.is_some());
        assert!(combined.ocean.is_some());
        assert!(combined.time.is_some());
    }

    #[test]
    fn test_make_compliant_leaves_input_alone() {
        let ds = testdata::messy_dataset();
        let before = ds.clone();
        let fixed = Checker::new(&ds).make_compliant();
        assert_eq!(ds, before);
        assert_ne!(fixed, ds);
    }
}

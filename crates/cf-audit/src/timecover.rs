//! Time-coverage checks.
//!
//! Finds time indices where a variable carries no data at all (every
//! non-time cell missing) and groups them into inclusive ranges. A
//! run of fully-missing slices usually means a gap in the upstream
//! record rather than real geophysics.

use std::collections::BTreeMap;

use cf_common::Dataset;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::{infer_axes, AxisRoleMap};
use crate::error::{AuditError, AuditResult};
use crate::issue::CheckStatus;
use crate::options::CoverageOptions;
use crate::runs::contiguous_runs;
use crate::timeutil;

/// One inclusive range of fully-missing time indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_index: usize,
    pub end_index: usize,
    /// Coordinate values at the bounds (the index itself when the
    /// time role resolved to a bare dimension).
    pub start_value: f64,
    pub end_value: f64,
    /// Decoded timestamps when the units allow, numeric text otherwise.
    pub start_label: String,
    pub end_label: String,
}

/// Time-coverage findings for one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTimeReport {
    pub status: CheckStatus,
    pub reason: Option<String>,
    pub time_name: Option<String>,
    pub missing_ranges: Vec<TimeRange>,
    pub ok: bool,
}

impl VariableTimeReport {
    fn skipped(reason: &str) -> Self {
        Self {
            status: CheckStatus::Skipped,
            reason: Some(reason.to_string()),
            time_name: None,
            missing_ranges: Vec::new(),
            ok: true,
        }
    }
}

/// Time-coverage findings across all checked variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeCoverageReport {
    pub variables: BTreeMap<String, VariableTimeReport>,
    pub ok: bool,
}

/// Run the time-coverage check.
pub fn run_time(ds: &Dataset, options: &CoverageOptions) -> AuditResult<TimeCoverageReport> {
    let axes = infer_axes(ds, &options.axes);
    let targets = select_targets(ds, options)?;
    let mut variables = BTreeMap::new();
    for name in targets {
        debug!(variable = name, "time coverage check");
        variables.insert(name.to_string(), check_variable(ds, name, &axes));
    }
    let ok = variables.values().all(|v| v.ok);
    Ok(TimeCoverageReport { variables, ok })
}

fn select_targets<'a>(ds: &'a Dataset, options: &CoverageOptions) -> AuditResult<Vec<&'a str>> {
    if let Some(wanted) = &options.var_name {
        let name = ds
            .data_vars()
            .map(|(name, _)| name)
            .find(|name| *name == wanted.as_str())
            .ok_or_else(|| AuditError::VariableNotFound(wanted.clone()))?;
        return Ok(vec![name]);
    }
    Ok(ds.data_vars().map(|(name, _)| name).collect())
}

fn check_variable(ds: &Dataset, name: &str, axes: &AxisRoleMap) -> VariableTimeReport {
    let var = match ds.data_var(name) {
        Some(var) => var,
        None => return VariableTimeReport::skipped("no-time-dimension"),
    };
    let time_name = match axes.time.as_deref() {
        Some(time_name) => time_name,
        None => return VariableTimeReport::skipped("no-time-dimension"),
    };
    let time_dim = match ds.coord(time_name) {
        Some(coord) => coord.dims[0].as_str(),
        None => time_name,
    };
    let time_pos = match var.dim_index(time_dim) {
        Some(pos) => pos,
        None => return VariableTimeReport::skipped("no-time-dimension"),
    };
    let time_size = var.shape[time_pos];
    if time_size == 0 || var.is_empty() {
        return VariableTimeReport::skipped("empty-variable");
    }

    let after: usize = var.shape[time_pos + 1..].iter().product();
    let cells_per_index = var.len() / time_size;
    let mut missing = vec![0usize; time_size];
    for (flat, &value) in var.values.iter().enumerate() {
        if var.is_missing_value(value) {
            missing[(flat / after) % time_size] += 1;
        }
    }
    let fully_missing: Vec<usize> = (0..time_size)
        .filter(|&i| missing[i] == cells_per_index)
        .collect();

    let time_coord = ds.coord(time_name);
    let units = time_coord.and_then(|c| c.attr_str("units"));
    let value_at = |index: usize| -> f64 {
        time_coord
            .and_then(|c| c.values.get(index).copied())
            .unwrap_or(index as f64)
    };
    let missing_ranges: Vec<TimeRange> = contiguous_runs(&fully_missing)
        .into_iter()
        .map(|(start, end)| {
            let start_value = value_at(start);
            let end_value = value_at(end);
            TimeRange {
                start_index: start,
                end_index: end,
                start_value,
                end_value,
                start_label: timeutil::time_label(units, start_value),
                end_label: timeutil::time_label(units, end_value),
            }
        })
        .collect();

    let status = if missing_ranges.is_empty() {
        CheckStatus::Pass
    } else {
        CheckStatus::Flagged
    };
    VariableTimeReport {
        status,
        reason: None,
        time_name: Some(time_name.to_string()),
        missing_ranges,
        ok: status != CheckStatus::Flagged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    #[test]
    fn test_full_coverage_passes() {
        let ds = testdata::time_series_dataset(&[]);
        let report = run_time(&ds, &CoverageOptions::default()).unwrap();
        assert!(report.ok);
        let v = &report.variables["sst"];
        assert_eq!(v.status, CheckStatus::Pass);
        assert!(v.missing_ranges.is_empty());
    }

    #[test]
    fn test_missing_slices_grouped_into_range() {
        let ds = testdata::time_series_dataset(&[3, 4, 5]);
        let report = run_time(&ds, &CoverageOptions::default()).unwrap();
        let v = &report.variables["sst"];
        assert_eq!(v.status, CheckStatus::Flagged);
        assert_eq!(v.missing_ranges.len(), 1);
        let range = &v.missing_ranges[0];
        assert_eq!((range.start_index, range.end_index), (3, 5));
        assert!(!report.ok);
    }

    #[test]
    fn test_split_gaps_give_separate_ranges() {
        let ds = testdata::time_series_dataset(&[1, 4, 5]);
        let report = run_time(&ds, &CoverageOptions::default()).unwrap();
        let v = &report.variables["sst"];
        assert_eq!(v.missing_ranges.len(), 2);
        assert_eq!(
            (v.missing_ranges[0].start_index, v.missing_ranges[0].end_index),
            (1, 1)
        );
        assert_eq!(
            (v.missing_ranges[1].start_index, v.missing_ranges[1].end_index),
            (4, 5)
        );
    }

    #[test]
    fn test_partially_missing_slice_is_covered() {
        // A slice with any defined cell does not count as missing.
        let ds = testdata::time_series_dataset_partial(2);
        let report = run_time(&ds, &CoverageOptions::default()).unwrap();
        assert_eq!(report.variables["sst"].status, CheckStatus::Pass);
    }

    #[test]
    fn test_range_labels_decode_time_units() {
        let ds = testdata::time_series_dataset(&[0]);
        let report = run_time(&ds, &CoverageOptions::default()).unwrap();
        let range = &report.variables["sst"].missing_ranges[0];
        assert!(range.start_label.contains('T'), "got {}", range.start_label);
    }

    #[test]
    fn test_no_time_dimension_skips() {
        let ds = Dataset::new()
            .with_dim("x", 2)
            .with_var("v", testdata::var_over(&["x"], vec![1.0, 2.0]))
            .unwrap();
        let report = run_time(&ds, &CoverageOptions::default()).unwrap();
        let v = &report.variables["v"];
        assert_eq!(v.status, CheckStatus::Skipped);
        assert_eq!(v.reason.as_deref(), Some("no-time-dimension"));
        assert!(report.ok);
    }

    #[test]
    fn test_missing_variable_is_hard_error() {
        let ds = testdata::time_series_dataset(&[]);
        let options = CoverageOptions {
            var_name: Some("absent".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            run_time(&ds, &options),
            Err(AuditError::VariableNotFound(_))
        ));
    }
}

//! Ocean grid-coverage checks.
//!
//! Two detectors for gridded ocean fields where a missing cell means
//! land (or no data):
//!
//! - `edge_of_map`: longitude bands that are missing across
//!   essentially all latitude/time cells. Bands touching the first or
//!   last longitude index are the classic seam artifact of a regridded
//!   global product; interior bands are more suspicious.
//! - `land_ocean_offset`: samples the grid at well-known land and
//!   ocean reference points. When a majority disagree with the
//!   expected surface class, the whole grid is likely shifted by half
//!   a cell or wrapped with the wrong longitude convention.
//!
//! Both detectors only read the dataset; findings land in the report.

use std::collections::BTreeMap;

use cf_common::{Dataset, Variable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::{infer_axes, AxisRoleMap};
use crate::error::{AuditError, AuditResult};
use crate::issue::CheckStatus;
use crate::options::CoverageOptions;
use crate::runs::contiguous_runs;

/// Fraction of cells along a longitude band that must be missing for
/// the band to count as persistently missing. Just under 1.0 so a
/// handful of stray defined cells cannot hide a seam.
pub const EDGE_MISSING_FRACTION: f64 = 0.99;

/// Longitude span (degrees) below which the reference-point check is
/// skipped as a regional grid.
const GLOBAL_LON_SPAN: f64 = 300.0;
/// Latitude span (degrees) below which the reference-point check is
/// skipped.
const GLOBAL_LAT_SPAN: f64 = 120.0;

/// Expected surface class at a reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceClass {
    Land,
    Ocean,
}

struct ReferencePoint {
    name: &'static str,
    lat: f64,
    /// Longitude in the -180..180 convention.
    lon: f64,
    class: SurfaceClass,
}

/// Well-known points far from any coastline, so a small grid offset
/// cannot flip their surface class.
const REFERENCE_POINTS: &[ReferencePoint] = &[
    ReferencePoint { name: "sahara", lat: 23.0, lon: 13.0, class: SurfaceClass::Land },
    ReferencePoint { name: "australia_interior", lat: -25.0, lon: 134.0, class: SurfaceClass::Land },
    ReferencePoint { name: "mongolia", lat: 47.0, lon: 103.0, class: SurfaceClass::Land },
    ReferencePoint { name: "greenland_interior", lat: 72.0, lon: -40.0, class: SurfaceClass::Land },
    ReferencePoint { name: "south_america_interior", lat: -15.0, lon: -60.0, class: SurfaceClass::Land },
    ReferencePoint { name: "equatorial_pacific", lat: 0.0, lon: -140.0, class: SurfaceClass::Ocean },
    ReferencePoint { name: "north_atlantic", lat: 30.0, lon: -40.0, class: SurfaceClass::Ocean },
    ReferencePoint { name: "indian_ocean", lat: -30.0, lon: 80.0, class: SurfaceClass::Ocean },
    ReferencePoint { name: "south_pacific", lat: -45.0, lon: -150.0, class: SurfaceClass::Ocean },
    ReferencePoint { name: "west_pacific", lat: 10.0, lon: 160.0, class: SurfaceClass::Ocean },
];

/// Longitude labeling convention of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LonConvention {
    /// -180..180
    Signed,
    /// 0..360
    Positive,
}

/// Whether a persistently-missing longitude band touches the map edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandKind {
    Edge,
    Interior,
}

/// One persistently-missing longitude band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LonBand {
    pub kind: BandKind,
    pub start_index: usize,
    pub end_index: usize,
    /// Longitude values at the band bounds, when a longitude
    /// coordinate exists.
    pub start_lon: Option<f64>,
    pub end_lon: Option<f64>,
}

/// Result of the edge-of-map detector for one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeOfMapResult {
    pub status: CheckStatus,
    pub reason: Option<String>,
    pub bands: Vec<LonBand>,
}

impl EdgeOfMapResult {
    fn skipped(reason: &str) -> Self {
        Self {
            status: CheckStatus::Skipped,
            reason: Some(reason.to_string()),
            bands: Vec::new(),
        }
    }
}

/// One reference point whose observed class disagrees with the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMismatch {
    pub name: String,
    pub expected: SurfaceClass,
    pub observed: SurfaceClass,
    pub requested_lat: f64,
    pub requested_lon: f64,
    pub actual_lat: f64,
    pub actual_lon: f64,
}

/// Result of the land/ocean offset detector for one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandOceanResult {
    pub status: CheckStatus,
    pub reason: Option<String>,
    pub evaluated: usize,
    pub mismatches: Vec<ReferenceMismatch>,
}

impl LandOceanResult {
    fn skipped(reason: &str) -> Self {
        Self {
            status: CheckStatus::Skipped,
            reason: Some(reason.to_string()),
            evaluated: 0,
            mismatches: Vec::new(),
        }
    }
}

/// Resolved grid geometry for one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSummary {
    pub lat_name: String,
    pub lon_name: String,
    pub time_name: Option<String>,
    pub lon_convention: LonConvention,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

/// Coverage findings for one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableOceanReport {
    pub grid: Option<GridSummary>,
    pub edge_of_map: EdgeOfMapResult,
    pub land_ocean_offset: LandOceanResult,
    pub ok: bool,
}

/// Coverage findings across all checked variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OceanCoverageReport {
    pub variables: BTreeMap<String, VariableOceanReport>,
    pub ok: bool,
}

impl OceanCoverageReport {
    /// Iterate subcheck statuses across all variables in name order.
    pub fn statuses(&self) -> impl Iterator<Item = CheckStatus> + '_ {
        self.variables
            .values()
            .flat_map(|v| [v.edge_of_map.status, v.land_ocean_offset.status])
    }
}

/// The dimension a resolved role spans: the coordinate's dimension, or
/// the name itself when the role resolved to a bare dimension.
fn role_dim<'a>(ds: &'a Dataset, name: &'a str) -> &'a str {
    match ds.coord(name) {
        Some(coord) => coord.dims[0].as_str(),
        None => name,
    }
}

fn select_targets<'a>(
    ds: &'a Dataset,
    options: &CoverageOptions,
    axes: &AxisRoleMap,
) -> AuditResult<Vec<&'a str>> {
    if let Some(wanted) = &options.var_name {
        let name = ds
            .data_vars()
            .map(|(name, _)| name)
            .find(|name| *name == wanted.as_str())
            .ok_or_else(|| AuditError::VariableNotFound(wanted.clone()))?;
        return Ok(vec![name]);
    }
    match (axes.lat.as_deref(), axes.lon.as_deref()) {
        (Some(lat), Some(lon)) => {
            let lat_dim = role_dim(ds, lat).to_string();
            let lon_dim = role_dim(ds, lon).to_string();
            Ok(ds
                .data_vars()
                .filter(|(_, var)| {
                    var.dim_index(&lat_dim).is_some() && var.dim_index(&lon_dim).is_some()
                })
                .map(|(name, _)| name)
                .collect())
        }
        // Nothing resolved; every variable gets an explicit skip entry.
        _ => Ok(ds.data_vars().map(|(name, _)| name).collect()),
    }
}

/// Run the ocean-coverage checks.
pub fn run_ocean(ds: &Dataset, options: &CoverageOptions) -> AuditResult<OceanCoverageReport> {
    let axes = infer_axes(ds, &options.axes);
    let targets = select_targets(ds, options, &axes)?;
    let mut variables = BTreeMap::new();
    for name in targets {
        debug!(variable = name, "ocean coverage check");
        let report = check_variable(ds, name, &axes, options);
        variables.insert(name.to_string(), report);
    }
    let ok = variables.values().all(|v| v.ok);
    Ok(OceanCoverageReport { variables, ok })
}

fn check_variable(
    ds: &Dataset,
    name: &str,
    axes: &AxisRoleMap,
    options: &CoverageOptions,
) -> VariableOceanReport {
    let var = match ds.data_var(name) {
        Some(var) => var,
        None => {
            // select_targets only yields existing variables.
            return VariableOceanReport {
                grid: None,
                edge_of_map: EdgeOfMapResult::skipped("no-matching-coordinate"),
                land_ocean_offset: LandOceanResult::skipped("no-matching-coordinate"),
                ok: true,
            };
        }
    };

    let (lat_name, lon_name) = match (axes.lat.as_deref(), axes.lon.as_deref()) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return VariableOceanReport {
                grid: None,
                edge_of_map: EdgeOfMapResult::skipped("no-matching-coordinate"),
                land_ocean_offset: LandOceanResult::skipped("no-matching-coordinate"),
                ok: true,
            }
        }
    };

    let lat_dim = role_dim(ds, lat_name);
    let lon_dim = role_dim(ds, lon_name);
    if var.dim_index(lat_dim).is_none() || var.dim_index(lon_dim).is_none() {
        return VariableOceanReport {
            grid: None,
            edge_of_map: EdgeOfMapResult::skipped("no-matching-coordinate"),
            land_ocean_offset: LandOceanResult::skipped("no-matching-coordinate"),
            ok: true,
        };
    }

    let grid = grid_summary(ds, axes, lat_name, lon_name);

    let edge_of_map = if options.check_edge_of_map {
        edge_check(ds, var, lon_name, lon_dim)
    } else {
        EdgeOfMapResult::skipped("disabled")
    };

    let land_ocean_offset = if options.check_land_ocean_offset {
        offset_check(ds, var, axes, lat_name, lon_name, grid.as_ref())
    } else {
        LandOceanResult::skipped("disabled")
    };

    let ok = edge_of_map.status != CheckStatus::Flagged
        && land_ocean_offset.status != CheckStatus::Flagged;
    VariableOceanReport {
        grid,
        edge_of_map,
        land_ocean_offset,
        ok,
    }
}

fn finite_min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut bounds: Option<(f64, f64)> = None;
    for &value in values {
        if !value.is_finite() {
            continue;
        }
        bounds = Some(match bounds {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }
    bounds
}

fn grid_summary(
    ds: &Dataset,
    axes: &AxisRoleMap,
    lat_name: &str,
    lon_name: &str,
) -> Option<GridSummary> {
    let lat = ds.coord(lat_name)?;
    let lon = ds.coord(lon_name)?;
    let (lat_min, lat_max) = finite_min_max(&lat.values)?;
    let (lon_min, lon_max) = finite_min_max(&lon.values)?;
    let lon_convention = if lon.values.iter().any(|&v| v > 180.0) {
        LonConvention::Positive
    } else {
        LonConvention::Signed
    };
    Some(GridSummary {
        lat_name: lat_name.to_string(),
        lon_name: lon_name.to_string(),
        time_name: axes.time.clone(),
        lon_convention,
        lat_min,
        lat_max,
        lon_min,
        lon_max,
    })
}

/// Missing-cell fraction per longitude index, then run-length grouping
/// of the persistently-missing indices.
fn edge_check(ds: &Dataset, var: &Variable, lon_name: &str, lon_dim: &str) -> EdgeOfMapResult {
    let lon_pos = match var.dim_index(lon_dim) {
        Some(pos) => pos,
        None => return EdgeOfMapResult::skipped("no-matching-coordinate"),
    };
    let lon_size = var.shape[lon_pos];
    if lon_size == 0 || var.is_empty() {
        return EdgeOfMapResult::skipped("empty-variable");
    }

    let after: usize = var.shape[lon_pos + 1..].iter().product();
    let cells_per_band = var.len() / lon_size;
    let mut missing = vec![0usize; lon_size];
    for (flat, &value) in var.values.iter().enumerate() {
        if var.is_missing_value(value) {
            missing[(flat / after) % lon_size] += 1;
        }
    }

    let persistent: Vec<usize> = (0..lon_size)
        .filter(|&i| missing[i] as f64 / cells_per_band as f64 >= EDGE_MISSING_FRACTION)
        .collect();
    let lon_coord = ds.coord(lon_name);
    let bands: Vec<LonBand> = contiguous_runs(&persistent)
        .into_iter()
        .map(|(start, end)| LonBand {
            kind: if start == 0 || end == lon_size - 1 {
                BandKind::Edge
            } else {
                BandKind::Interior
            },
            start_index: start,
            end_index: end,
            start_lon: lon_coord.and_then(|c| c.values.get(start).copied()),
            end_lon: lon_coord.and_then(|c| c.values.get(end).copied()),
        })
        .collect();

    EdgeOfMapResult {
        status: if bands.is_empty() {
            CheckStatus::Pass
        } else {
            CheckStatus::Flagged
        },
        reason: None,
        bands,
    }
}

fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        let distance = (value - target).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

/// Sample the variable at well-known reference points and compare the
/// observed surface class against the table.
fn offset_check(
    ds: &Dataset,
    var: &Variable,
    axes: &AxisRoleMap,
    lat_name: &str,
    lon_name: &str,
    grid: Option<&GridSummary>,
) -> LandOceanResult {
    let grid = match grid {
        Some(grid) => grid,
        None => return LandOceanResult::skipped("no-matching-coordinate"),
    };
    if grid.lon_max - grid.lon_min < GLOBAL_LON_SPAN
        || grid.lat_max - grid.lat_min < GLOBAL_LAT_SPAN
    {
        return LandOceanResult::skipped("non-global-grid");
    }
    let lat_coord = match ds.coord(lat_name) {
        Some(coord) => coord,
        None => return LandOceanResult::skipped("no-matching-coordinate"),
    };
    let lon_coord = match ds.coord(lon_name) {
        Some(coord) => coord,
        None => return LandOceanResult::skipped("no-matching-coordinate"),
    };
    let lat_pos = match var.dim_index(lat_coord.dims[0].as_str()) {
        Some(pos) => pos,
        None => return LandOceanResult::skipped("no-matching-coordinate"),
    };
    let lon_pos = match var.dim_index(lon_coord.dims[0].as_str()) {
        Some(pos) => pos,
        None => return LandOceanResult::skipped("no-matching-coordinate"),
    };
    let time_dim = axes.time.as_deref().map(|name| role_dim(ds, name).to_string());

    let mut evaluated = 0usize;
    let mut mismatches = Vec::new();
    for point in REFERENCE_POINTS {
        // Express the requested longitude in the grid's convention.
        let requested_lon = match grid.lon_convention {
            LonConvention::Positive if point.lon < 0.0 => point.lon + 360.0,
            _ => point.lon,
        };
        let lat_idx = match nearest_index(&lat_coord.values, point.lat) {
            Some(idx) => idx,
            None => continue,
        };
        let lon_idx = match nearest_index(&lon_coord.values, requested_lon) {
            Some(idx) => idx,
            None => continue,
        };

        // Last time index, index 0 along any other extra dimension.
        let mut index = vec![0usize; var.dims.len()];
        index[lat_pos] = lat_idx;
        index[lon_pos] = lon_idx;
        if let Some(time_dim) = &time_dim {
            if let Some(time_pos) = var.dim_index(time_dim) {
                index[time_pos] = var.shape[time_pos].saturating_sub(1);
            }
        }
        let value = match var.value_at(&index) {
            Some(value) => value,
            None => continue,
        };
        evaluated += 1;
        let observed = if var.is_missing_value(value) {
            SurfaceClass::Land
        } else {
            SurfaceClass::Ocean
        };
        if observed != point.class {
            mismatches.push(ReferenceMismatch {
                name: point.name.to_string(),
                expected: point.class,
                observed,
                requested_lat: point.lat,
                requested_lon,
                actual_lat: lat_coord.values[lat_idx],
                actual_lon: lon_coord.values[lon_idx],
            });
        }
    }

    if evaluated == 0 {
        return LandOceanResult::skipped("no-matching-coordinate");
    }
    // Scattered coastal disagreements stay a pass; a majority means
    // the whole grid is offset or mis-wrapped.
    let status = if mismatches.len() * 2 > evaluated {
        CheckStatus::Flagged
    } else {
        CheckStatus::Pass
    };
    LandOceanResult {
        status,
        reason: None,
        evaluated,
        mismatches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    #[test]
    fn test_clean_global_grid_passes() {
        let ds = testdata::global_ocean_dataset();
        let report = run_ocean(&ds, &CoverageOptions::default()).unwrap();
        assert!(report.ok);
        let sst = &report.variables["sst"];
        assert_eq!(sst.edge_of_map.status, CheckStatus::Pass);
        assert_eq!(sst.land_ocean_offset.status, CheckStatus::Pass);
        let grid = sst.grid.as_ref().unwrap();
        assert_eq!(grid.lon_convention, LonConvention::Positive);
    }

    #[test]
    fn test_edge_band_flagged_as_edge() {
        let ds = testdata::global_ocean_dataset_with_edge_band(3);
        let report = run_ocean(&ds, &CoverageOptions::default()).unwrap();
        let sst = &report.variables["sst"];
        assert_eq!(sst.edge_of_map.status, CheckStatus::Flagged);
        assert_eq!(sst.edge_of_map.bands.len(), 1);
        let band = &sst.edge_of_map.bands[0];
        assert_eq!(band.kind, BandKind::Edge);
        assert_eq!((band.start_index, band.end_index), (0, 2));
        assert!(!sst.ok);
    }

    #[test]
    fn test_interior_band_flagged_as_interior() {
        let ds = testdata::global_ocean_dataset_with_interior_band(10, 12);
        let report = run_ocean(&ds, &CoverageOptions::default()).unwrap();
        let sst = &report.variables["sst"];
        assert_eq!(sst.edge_of_map.status, CheckStatus::Flagged);
        let band = &sst.edge_of_map.bands[0];
        assert_eq!(band.kind, BandKind::Interior);
        assert_eq!((band.start_index, band.end_index), (10, 12));
    }

    #[test]
    fn test_offset_grid_flagged() {
        // Inverted mask: defined over land points, missing over ocean.
        let ds = testdata::inverted_ocean_dataset();
        let report = run_ocean(&ds, &CoverageOptions::default()).unwrap();
        let sst = &report.variables["sst"];
        assert_eq!(sst.land_ocean_offset.status, CheckStatus::Flagged);
        assert!(sst.land_ocean_offset.mismatches.len() * 2 > sst.land_ocean_offset.evaluated);
        assert!(!report.ok);
    }

    #[test]
    fn test_regional_grid_skips_offset_check() {
        let ds = testdata::regional_ocean_dataset();
        let report = run_ocean(&ds, &CoverageOptions::default()).unwrap();
        let sst = &report.variables["sst"];
        assert_eq!(sst.land_ocean_offset.status, CheckStatus::Skipped);
        assert_eq!(sst.land_ocean_offset.reason.as_deref(), Some("non-global-grid"));
        assert!(report.ok);
    }

    #[test]
    fn test_missing_variable_is_hard_error() {
        let ds = testdata::global_ocean_dataset();
        let options = CoverageOptions {
            var_name: Some("absent".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            run_ocean(&ds, &options),
            Err(AuditError::VariableNotFound(_))
        ));
    }

    #[test]
    fn test_unresolved_axes_skip_with_reason() {
        let ds = Dataset::new()
            .with_dim("a", 2)
            .with_var("v", testdata::var_over(&["a"], vec![1.0, 2.0]))
            .unwrap();
        let report = run_ocean(&ds, &CoverageOptions::default()).unwrap();
        let v = &report.variables["v"];
        assert_eq!(v.edge_of_map.status, CheckStatus::Skipped);
        assert_eq!(v.edge_of_map.reason.as_deref(), Some("no-matching-coordinate"));
        assert!(report.ok);
    }

    #[test]
    fn test_disabled_subchecks_skip() {
        let ds = testdata::global_ocean_dataset();
        let options = CoverageOptions {
            check_edge_of_map: false,
            check_land_ocean_offset: false,
            ..Default::default()
        };
        let report = run_ocean(&ds, &options).unwrap();
        let sst = &report.variables["sst"];
        assert_eq!(sst.edge_of_map.reason.as_deref(), Some("disabled"));
        assert_eq!(sst.land_ocean_offset.reason.as_deref(), Some("disabled"));
    }
}

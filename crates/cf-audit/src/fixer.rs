//! Non-destructive metadata repair.
//!
//! Clones the dataset, patches metadata on the private copy, and
//! returns it; the caller's dataset is never touched. Every step only
//! fills gaps or normalizes spelling, existing non-empty values are
//! kept, so running the fixer on its own output changes nothing.

use cf_common::{AttrMap, Dataset, Variable};
use tracing::debug;

use crate::axis::{expected_coord_attrs, infer_axes, AxisOverrides, AxisRole};
use crate::heuristic::{CF_ATTR_CASE_KEYS, GLOBAL_ATTR_KEYS};
use crate::options::CF_VERSION;
use crate::timeutil;

/// Repair a dataset's metadata with default axis inference.
pub fn make_compliant(ds: &Dataset) -> Dataset {
    make_compliant_with(ds, &AxisOverrides::default())
}

/// Repair a dataset's metadata, honoring axis-name overrides.
pub fn make_compliant_with(ds: &Dataset, overrides: &AxisOverrides) -> Dataset {
    let mut out = ds.clone();

    // Casing first so attribute lookups below see canonical keys.
    normalize_attr_case(out.attrs_mut(), GLOBAL_ATTR_KEYS);
    let coord_names: Vec<String> = out.coords().map(|(name, _)| name.to_string()).collect();
    for name in &coord_names {
        if let Some(coord) = out.coord_mut(name) {
            normalize_attr_case(&mut coord.attrs, CF_ATTR_CASE_KEYS);
        }
    }
    let var_names: Vec<String> = out.data_vars().map(|(name, _)| name.to_string()).collect();
    for name in &var_names {
        if let Some(var) = out.data_var_mut(name) {
            normalize_attr_case(&mut var.attrs, CF_ATTR_CASE_KEYS);
        }
    }

    out.attrs_mut()
        .insert("Conventions".to_string(), CF_VERSION.into());

    let axes = infer_axes(&out, overrides);
    let resolved: Vec<(AxisRole, String)> = axes
        .resolved()
        .map(|(role, name)| (role, name.to_string()))
        .collect();

    for (role, name) in &resolved {
        // A role resolved to a bare dimension gets an index-valued
        // coordinate so the attribute repair below has a target.
        if out.coord(name).is_none() {
            let size = match out.dim_size(name) {
                Some(size) => size,
                None => continue,
            };
            debug!(coord = name.as_str(), "creating index coordinate");
            let values: Vec<f64> = (0..size).map(|i| i as f64).collect();
            let coord = Variable::new(vec![name.clone()], vec![size], values);
            if out.insert_coord(name, coord).is_err() {
                continue;
            }
        }
        if let Some(coord) = out.coord_mut(name) {
            for &(key, expected) in expected_coord_attrs(*role) {
                if attr_is_blank(&coord.attrs, key) {
                    coord.attrs.insert(key.to_string(), expected.into());
                }
            }
        }
    }

    apply_extents(&mut out, &resolved);

    // Coordinates must not declare missing values.
    let coord_names: Vec<String> = out.coords().map(|(name, _)| name.to_string()).collect();
    for name in &coord_names {
        if let Some(coord) = out.coord_mut(name) {
            coord.attrs.remove("_FillValue");
        }
    }

    out
}

/// Missing, or a string that is empty after trimming.
fn attr_is_blank(attrs: &AttrMap, key: &str) -> bool {
    match attrs.get(key) {
        None => true,
        Some(value) => value.as_str().map_or(false, |s| s.trim().is_empty()),
    }
}

/// Rename odd-case spellings of known keys to their canonical form.
/// A key is only renamed when the canonical spelling is absent.
fn normalize_attr_case(attrs: &mut AttrMap, expected_keys: &[&str]) {
    for &expected in expected_keys {
        if attrs.contains_key(expected) {
            continue;
        }
        let found = attrs
            .keys()
            .find(|key| key.as_str() != expected && key.eq_ignore_ascii_case(expected))
            .cloned();
        if let Some(key) = found {
            if let Some(value) = attrs.remove(&key) {
                attrs.insert(expected.to_string(), value);
            }
        }
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

/// Write ACDD-style extent attributes for each resolved role. A role
/// whose coordinate yields no finite values contributes nothing.
fn apply_extents(out: &mut Dataset, resolved: &[(AxisRole, String)]) {
    for (role, name) in resolved {
        match role {
            AxisRole::Lat => {
                let extent = out.coord(name).and_then(|c| finite_min_max(&c.values));
                if let Some((min, max)) = extent {
                    out.attrs_mut()
                        .insert("geospatial_lat_min".to_string(), min.into());
                    out.attrs_mut()
                        .insert("geospatial_lat_max".to_string(), max.into());
                }
            }
            AxisRole::Lon => {
                let extent = out.coord(name).and_then(|c| finite_min_max(&c.values));
                if let Some((min, max)) = extent {
                    out.attrs_mut()
                        .insert("geospatial_lon_min".to_string(), min.into());
                    out.attrs_mut()
                        .insert("geospatial_lon_max".to_string(), max.into());
                }
            }
            AxisRole::Time => {
                let labels = out.coord(name).and_then(|coord| {
                    let units = coord.attr_str("units").map(str::to_string);
                    finite_min_max(&coord.values).map(|(min, max)| {
                        (
                            timeutil::time_label(units.as_deref(), min),
                            timeutil::time_label(units.as_deref(), max),
                        )
                    })
                });
                if let Some((start, end)) = labels {
                    out.attrs_mut()
                        .insert("time_coverage_start".to_string(), start.into());
                    out.attrs_mut()
                        .insert("time_coverage_end".to_string(), end.into());
                }
            }
        }
    }
}

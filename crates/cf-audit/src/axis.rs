//! Axis-role inference.
//!
//! Infers which coordinate (or bare dimension) plays the time,
//! latitude, and longitude role. Resolution is a prioritized rule
//! list evaluated in fixed order, independently per role:
//!
//! 1. explicit override name, used verbatim when it exists;
//! 2. an `axis` or `standard_name` attribute declaring the role;
//! 3. units recognized as belonging to the role's unit family;
//! 4. a bare-name alias from a role-specific priority list.
//!
//! An unresolved role is not an error; consumers report it as a
//! skipped check. Inference is a pure function of the dataset and the
//! overrides.

use cf_common::{Dataset, Variable};
use serde::{Deserialize, Serialize};

/// The semantic function a coordinate serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisRole {
    Time,
    Lat,
    Lon,
}

impl AxisRole {
    /// All roles, in the fixed evaluation order.
    pub const ALL: [AxisRole; 3] = [AxisRole::Time, AxisRole::Lat, AxisRole::Lon];
}

impl std::fmt::Display for AxisRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisRole::Time => write!(f, "time"),
            AxisRole::Lat => write!(f, "latitude"),
            AxisRole::Lon => write!(f, "longitude"),
        }
    }
}

/// Explicit coordinate-name overrides supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisOverrides {
    pub time_name: Option<String>,
    pub lat_name: Option<String>,
    pub lon_name: Option<String>,
}

impl AxisOverrides {
    fn for_role(&self, role: AxisRole) -> Option<&str> {
        match role {
            AxisRole::Time => self.time_name.as_deref(),
            AxisRole::Lat => self.lat_name.as_deref(),
            AxisRole::Lon => self.lon_name.as_deref(),
        }
    }
}

/// Resolved role-to-name mapping; a role absent here is unresolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisRoleMap {
    pub time: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl AxisRoleMap {
    /// Resolved name for a role, if any.
    pub fn get(&self, role: AxisRole) -> Option<&str> {
        match role {
            AxisRole::Time => self.time.as_deref(),
            AxisRole::Lat => self.lat.as_deref(),
            AxisRole::Lon => self.lon.as_deref(),
        }
    }

    fn set(&mut self, role: AxisRole, name: String) {
        match role {
            AxisRole::Time => self.time = Some(name),
            AxisRole::Lat => self.lat = Some(name),
            AxisRole::Lon => self.lon = Some(name),
        }
    }

    /// Iterate resolved (role, name) pairs in fixed role order.
    pub fn resolved(&self) -> impl Iterator<Item = (AxisRole, &str)> {
        AxisRole::ALL
            .iter()
            .filter_map(move |&role| self.get(role).map(|name| (role, name)))
    }
}

/// One row of the data-driven resolution table.
struct RoleSpec {
    role: AxisRole,
    /// CF axis code (`T`/`Y`/`X`).
    axis_code: &'static str,
    /// Canonical `standard_name` vocabulary term.
    standard_name: &'static str,
    /// Bare-name aliases in priority order (lowercase).
    aliases: &'static [&'static str],
    /// Unit-family membership test.
    unit_family: fn(&str) -> bool,
}

const ROLE_SPECS: [RoleSpec; 3] = [
    RoleSpec {
        role: AxisRole::Time,
        axis_code: "T",
        standard_name: "time",
        aliases: &["time", "t"],
        unit_family: is_time_units,
    },
    RoleSpec {
        role: AxisRole::Lat,
        axis_code: "Y",
        standard_name: "latitude",
        aliases: &["lat", "latitude", "y"],
        unit_family: is_lat_units,
    },
    RoleSpec {
        role: AxisRole::Lon,
        axis_code: "X",
        standard_name: "longitude",
        aliases: &["lon", "longitude", "x"],
        unit_family: is_lon_units,
    },
];

/// Canonical coordinate attributes for a role, applied by the fixer
/// and expected by the heuristic rules.
pub fn expected_coord_attrs(role: AxisRole) -> &'static [(&'static str, &'static str)] {
    match role {
        AxisRole::Lat => &[
            ("standard_name", "latitude"),
            ("long_name", "latitude"),
            ("units", "degrees_north"),
            ("axis", "Y"),
        ],
        AxisRole::Lon => &[
            ("standard_name", "longitude"),
            ("long_name", "longitude"),
            ("units", "degrees_east"),
            ("axis", "X"),
        ],
        AxisRole::Time => &[("standard_name", "time"), ("axis", "T")],
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Whether a units string belongs to the latitude unit family.
pub fn is_lat_units(units: &str) -> bool {
    matches!(
        normalize(units).as_str(),
        "degrees_north" | "degree_north" | "degrees_n" | "degree_n" | "degreesn" | "degreen"
    )
}

/// Whether a units string belongs to the longitude unit family.
pub fn is_lon_units(units: &str) -> bool {
    matches!(
        normalize(units).as_str(),
        "degrees_east" | "degree_east" | "degrees_e" | "degree_e" | "degreese" | "degreee"
    )
}

/// Whether a units string looks like a CF calendar-time unit,
/// i.e. `"<unit> since <epoch>"`.
pub fn is_time_units(units: &str) -> bool {
    let mut tokens = units.split_whitespace();
    let unit = match tokens.next() {
        Some(token) => normalize(token),
        None => return false,
    };
    let known_unit = matches!(
        unit.as_str(),
        "second" | "seconds" | "minute" | "minutes" | "hour" | "hours" | "day" | "days"
            | "month" | "months" | "year" | "years"
    );
    if !known_unit {
        return false;
    }
    match tokens.next() {
        Some(since) if since.eq_ignore_ascii_case("since") => {}
        _ => return false,
    }
    tokens.next().is_some()
}

fn coord_declares_role(coord: &Variable, spec: &RoleSpec) -> bool {
    if let Some(axis) = coord.attr_str("axis") {
        if axis.trim().eq_ignore_ascii_case(spec.axis_code) {
            return true;
        }
    }
    if let Some(standard_name) = coord.attr_str("standard_name") {
        if normalize(standard_name) == spec.standard_name {
            return true;
        }
    }
    false
}

fn resolve_role(ds: &Dataset, spec: &RoleSpec, override_name: Option<&str>) -> Option<String> {
    // 1. Explicit override, verbatim, no semantic validation.
    if let Some(name) = override_name {
        if ds.coord(name).is_some() || ds.has_dim(name) {
            return Some(name.to_string());
        }
    }

    // 2. Attribute declaration (axis code or standard_name).
    for (name, coord) in ds.coords() {
        if coord_declares_role(coord, spec) {
            return Some(name.to_string());
        }
    }

    // 3. Unit family.
    for (name, coord) in ds.coords() {
        if let Some(units) = coord.attr_str("units") {
            if (spec.unit_family)(units) {
                return Some(name.to_string());
            }
        }
    }

    // 4. Bare-name aliases, first alias in priority order that exists.
    for alias in spec.aliases {
        for (name, _) in ds.coords() {
            if normalize(name) == *alias {
                return Some(name.to_string());
            }
        }
        for (name, _) in ds.dims() {
            if normalize(name) == *alias {
                return Some(name.to_string());
            }
        }
    }

    None
}

/// Infer the axis-role map for a dataset.
pub fn infer_axes(ds: &Dataset, overrides: &AxisOverrides) -> AxisRoleMap {
    let mut map = AxisRoleMap::default();
    for spec in &ROLE_SPECS {
        if let Some(name) = resolve_role(ds, spec, overrides.for_role(spec.role)) {
            map.set(spec.role, name);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_common::Variable;

    fn coord(dim: &str, values: Vec<f64>) -> Variable {
        let n = values.len();
        Variable::new(vec![dim.to_string()], vec![n], values)
    }

    #[test]
    fn test_time_units_pattern() {
        assert!(is_time_units("days since 1970-01-01"));
        assert!(is_time_units("Hours since 2000-01-01 00:00:00"));
        assert!(!is_time_units("days"));
        assert!(!is_time_units("fortnights since 1970-01-01"));
        assert!(!is_time_units("days since"));
    }

    #[test]
    fn test_alias_resolution_priority() {
        // "x" is a lon alias, but "lon" outranks it.
        let ds = Dataset::new()
            .with_dim("x", 4)
            .with_dim("lon", 4)
            .with_coord("x", coord("x", vec![0.0, 1.0, 2.0, 3.0]))
            .unwrap()
            .with_coord("lon", coord("lon", vec![0.0, 1.0, 2.0, 3.0]))
            .unwrap();
        let map = infer_axes(&ds, &AxisOverrides::default());
        assert_eq!(map.lon.as_deref(), Some("lon"));
    }

    #[test]
    fn test_attribute_beats_alias() {
        // A coordinate declaring standard_name=latitude wins over one
        // merely named "lat".
        let ds = Dataset::new()
            .with_dim("lat", 2)
            .with_dim("ylike", 2)
            .with_coord("lat", coord("lat", vec![0.0, 1.0]))
            .unwrap()
            .with_coord(
                "ylike",
                coord("ylike", vec![0.0, 1.0]).with_attr("standard_name", "latitude"),
            )
            .unwrap();
        let map = infer_axes(&ds, &AxisOverrides::default());
        assert_eq!(map.lat.as_deref(), Some("ylike"));
    }

    #[test]
    fn test_units_family_resolution() {
        let ds = Dataset::new()
            .with_dim("col", 3)
            .with_coord(
                "col",
                coord("col", vec![0.0, 120.0, 240.0]).with_attr("units", "degrees_east"),
            )
            .unwrap();
        let map = infer_axes(&ds, &AxisOverrides::default());
        assert_eq!(map.lon.as_deref(), Some("col"));
        assert_eq!(map.lat, None);
        assert_eq!(map.time, None);
    }

    #[test]
    fn test_override_used_verbatim() {
        let ds = Dataset::new().with_dim("stride", 5);
        let overrides = AxisOverrides {
            lon_name: Some("stride".to_string()),
            ..Default::default()
        };
        let map = infer_axes(&ds, &overrides);
        assert_eq!(map.lon.as_deref(), Some("stride"));

        // An override naming nothing in the dataset falls through to
        // the remaining rules rather than resolving.
        let overrides = AxisOverrides {
            lon_name: Some("absent".to_string()),
            ..Default::default()
        };
        let map = infer_axes(&ds, &overrides);
        assert_eq!(map.lon, None);
    }

    #[test]
    fn test_bare_dimension_resolves() {
        // A "time" dimension with no coordinate still resolves; the
        // consumers decide what a coordinate-less role means.
        let ds = Dataset::new().with_dim("time", 7);
        let map = infer_axes(&ds, &AxisOverrides::default());
        assert_eq!(map.time.as_deref(), Some("time"));
    }

    #[test]
    fn test_determinism() {
        let ds = Dataset::new()
            .with_dim("lat", 2)
            .with_dim("lon", 2)
            .with_dim("time", 2)
            .with_coord("lat", coord("lat", vec![-10.0, 10.0]))
            .unwrap()
            .with_coord("lon", coord("lon", vec![0.0, 90.0]))
            .unwrap();
        let first = infer_axes(&ds, &AxisOverrides::default());
        for _ in 0..10 {
            assert_eq!(infer_axes(&ds, &AxisOverrides::default()), first);
        }
    }
}

//! Built-in standard-name vocabulary and suggestion scoring.
//!
//! A compact subset of the CF standard-name table with canonical
//! units, used to phrase suggestions for variables that lack a
//! `standard_name`. A domain hint biases scoring toward that domain's
//! vocabulary subset; it changes message content only, never severity
//! or pass/fail outcome.

use std::collections::BTreeSet;

use crate::options::Domain;

/// One vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardNameEntry {
    pub name: &'static str,
    pub canonical_units: &'static str,
}

/// Vocabulary subset carried in-tree. Suggestions only; the heuristic
/// engine is a fallback, not a replacement for the full table.
pub const STANDARD_NAMES: &[StandardNameEntry] = &[
    StandardNameEntry { name: "air_pressure", canonical_units: "Pa" },
    StandardNameEntry { name: "air_pressure_at_mean_sea_level", canonical_units: "Pa" },
    StandardNameEntry { name: "air_temperature", canonical_units: "K" },
    StandardNameEntry { name: "atmosphere_cloud_area_fraction", canonical_units: "1" },
    StandardNameEntry { name: "eastward_wind", canonical_units: "m s-1" },
    StandardNameEntry { name: "geopotential_height", canonical_units: "m" },
    StandardNameEntry { name: "land_ice_thickness", canonical_units: "m" },
    StandardNameEntry { name: "latitude", canonical_units: "degrees_north" },
    StandardNameEntry { name: "longitude", canonical_units: "degrees_east" },
    StandardNameEntry { name: "mass_concentration_of_chlorophyll_a_in_sea_water", canonical_units: "kg m-3" },
    StandardNameEntry { name: "mole_concentration_of_dissolved_molecular_oxygen_in_sea_water", canonical_units: "mol m-3" },
    StandardNameEntry { name: "mole_concentration_of_nitrate_in_sea_water", canonical_units: "mol m-3" },
    StandardNameEntry { name: "northward_wind", canonical_units: "m s-1" },
    StandardNameEntry { name: "precipitation_flux", canonical_units: "kg m-2 s-1" },
    StandardNameEntry { name: "relative_humidity", canonical_units: "1" },
    StandardNameEntry { name: "sea_floor_depth_below_sea_surface", canonical_units: "m" },
    StandardNameEntry { name: "sea_ice_area_fraction", canonical_units: "1" },
    StandardNameEntry { name: "sea_ice_thickness", canonical_units: "m" },
    StandardNameEntry { name: "sea_surface_height_above_geoid", canonical_units: "m" },
    StandardNameEntry { name: "sea_surface_salinity", canonical_units: "1e-3" },
    StandardNameEntry { name: "sea_surface_temperature", canonical_units: "K" },
    StandardNameEntry { name: "sea_water_ph_reported_on_total_scale", canonical_units: "1" },
    StandardNameEntry { name: "sea_water_potential_temperature", canonical_units: "K" },
    StandardNameEntry { name: "sea_water_practical_salinity", canonical_units: "1" },
    StandardNameEntry { name: "sea_water_salinity", canonical_units: "1e-3" },
    StandardNameEntry { name: "sea_water_temperature", canonical_units: "K" },
    StandardNameEntry { name: "snow_depth", canonical_units: "m" },
    StandardNameEntry { name: "soil_moisture_content", canonical_units: "kg m-2" },
    StandardNameEntry { name: "soil_temperature", canonical_units: "K" },
    StandardNameEntry { name: "surface_air_pressure", canonical_units: "Pa" },
    StandardNameEntry { name: "surface_downwelling_shortwave_flux_in_air", canonical_units: "W m-2" },
    StandardNameEntry { name: "surface_snow_thickness", canonical_units: "m" },
    StandardNameEntry { name: "surface_temperature", canonical_units: "K" },
    StandardNameEntry { name: "time", canonical_units: "s" },
    StandardNameEntry { name: "vegetation_area_fraction", canonical_units: "1" },
    StandardNameEntry { name: "wind_speed", canonical_units: "m s-1" },
];

// Token synonyms expanded during matching so e.g. "temp" finds
// "temperature" entries and "ocean" finds "sea" entries.
const SYNONYMS: &[(&str, &str)] = &[
    ("ocean", "sea"),
    ("sea", "ocean"),
    ("temp", "temperature"),
];

fn domain_keywords(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Ocean => &["sea", "ocean", "salinity", "marine", "water"],
        Domain::Atmosphere => &["air", "atmosphere", "aerosol", "cloud", "wind"],
        Domain::Land => &["soil", "land", "terrestrial", "vegetation", "canopy"],
        Domain::Cryosphere => &["ice", "snow", "glacier"],
        Domain::Biogeochemistry => &["ph", "alkalinity", "nitrate", "oxygen", "chlorophyll"],
    }
}

fn tokenize(text: &str) -> BTreeSet<String> {
    let mut tokens: BTreeSet<String> = BTreeSet::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            tokens.insert(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.insert(current);
    }
    let expanded: Vec<String> = tokens
        .iter()
        .filter_map(|token| {
            SYNONYMS
                .iter()
                .find(|(from, _)| from == token)
                .map(|(_, to)| to.to_string())
        })
        .collect();
    tokens.extend(expanded);
    tokens
}

const SCORE_CUTOFF: f64 = 0.4;
const TOP_N: usize = 3;

/// Best-matching standard-name candidates for a variable, ordered by
/// score (ties broken by name for deterministic output).
pub fn best_candidates(
    var_name: &str,
    long_name: Option<&str>,
    domain: Option<Domain>,
) -> Vec<&'static StandardNameEntry> {
    let mut query = tokenize(var_name);
    if let Some(long_name) = long_name {
        query.extend(tokenize(long_name));
    }
    if query.is_empty() {
        return Vec::new();
    }
    let domain_tokens: Vec<&str> = domain.map(domain_keywords).unwrap_or(&[]).to_vec();

    let mut scored: Vec<(f64, &'static StandardNameEntry)> = Vec::new();
    for entry in STANDARD_NAMES {
        let cand_tokens = tokenize(entry.name);
        if cand_tokens.is_empty() {
            continue;
        }
        let overlap = query.intersection(&cand_tokens).count();
        if overlap == 0 {
            continue;
        }
        let mut score = overlap as f64 / cand_tokens.len() as f64;
        if var_name.contains(entry.name) {
            score += 0.2;
        }
        if domain_tokens
            .iter()
            .any(|keyword| cand_tokens.contains(*keyword))
        {
            score += 0.3;
        }
        if score >= SCORE_CUTOFF {
            scored.push((score, entry));
        }
    }

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.name.cmp(b.1.name))
    });
    scored.into_iter().take(TOP_N).map(|(_, e)| e).collect()
}

/// Look up an entry by exact standard name.
pub fn lookup(name: &str) -> Option<&'static StandardNameEntry> {
    STANDARD_NAMES.iter().find(|entry| entry.name == name)
}

/// Whether a units string is an acceptable spelling of the expected
/// canonical units.
pub fn units_compatible(actual: &str, expected: &str) -> bool {
    let a = actual.trim().to_ascii_lowercase();
    let e = expected.trim().to_ascii_lowercase();
    if a == e {
        return true;
    }
    let spellings: &[(&str, &[&str])] = &[
        ("k", &["kelvin"]),
        ("kelvin", &["k"]),
        ("degrees_celsius", &["celsius", "degc", "degree_celsius"]),
        ("celsius", &["degrees_celsius", "degc", "degree_celsius"]),
        ("1", &["1.0", "dimensionless"]),
    ];
    spellings
        .iter()
        .any(|(key, alts)| (*key == e && alts.contains(&a.as_str())) || (*key == a && alts.contains(&e.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_expands_synonyms() {
        let tokens = tokenize("ocean_temp");
        assert!(tokens.contains("ocean"));
        assert!(tokens.contains("sea"));
        assert!(tokens.contains("temperature"));
    }

    #[test]
    fn test_sst_suggestion() {
        let candidates = best_candidates("sea_surface_temperature_field", None, None);
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].name, "sea_surface_temperature");
    }

    #[test]
    fn test_domain_bias_pulls_domain_names() {
        // Ocean domain pulls sea-water names ahead of air names.
        let ocean = best_candidates("temperature", None, Some(Domain::Ocean));
        assert!(ocean.iter().any(|entry| entry.name.starts_with("sea_")));
    }

    #[test]
    fn test_units_compatible_spellings() {
        assert!(units_compatible("K", "K"));
        assert!(units_compatible("kelvin", "K"));
        assert!(units_compatible("degC", "degrees_celsius"));
        assert!(!units_compatible("m", "K"));
    }

    #[test]
    fn test_deterministic_ordering() {
        let first = best_candidates("soil_temperature", None, Some(Domain::Land));
        for _ in 0..5 {
            assert_eq!(
                best_candidates("soil_temperature", None, Some(Domain::Land)),
                first
            );
        }
    }
}

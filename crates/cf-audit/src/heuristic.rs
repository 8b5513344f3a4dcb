//! Built-in heuristic compliance rules.
//!
//! Used when the external verifier is unavailable or unselected. Rule
//! families run in a fixed order (global, per-coordinate, per-variable,
//! suggestions) and iterate names in map order, so two runs over the
//! same inputs produce identical issue sequences.

use cf_common::{AttrMap, Dataset, Variable};

use crate::axis::{expected_coord_attrs, is_time_units, AxisRole, AxisRoleMap};
use crate::issue::{Issue, IssueOrigin, Severity, GLOBAL_SUBJECT};
use crate::options::{ConventionSet, Domain};
use crate::vocab;

/// Variable attribute keys whose casing CF fixes.
pub const CF_ATTR_CASE_KEYS: &[&str] = &[
    "units",
    "standard_name",
    "long_name",
    "axis",
    "calendar",
    "coordinates",
    "bounds",
    "grid_mapping",
    "cell_methods",
    "cell_measures",
    "positive",
];

/// Dataset-level attribute keys with a conventional casing.
pub const GLOBAL_ATTR_KEYS: &[&str] = &[
    "Conventions",
    "title",
    "history",
    "institution",
    "source",
    "references",
    "comment",
];

/// Run the core heuristic rule families. Conventions extras live in
/// [`run_convention_rules`] so they also apply when the external
/// verifier produced the main issue list.
pub fn run_core_rules(
    ds: &Dataset,
    axes: &AxisRoleMap,
    domain: Option<Domain>,
    cf_version: &str,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    global_rules(ds, cf_version, &mut issues);
    coordinate_rules(ds, axes, &mut issues);
    variable_rules(ds, &mut issues);
    reference_rules(ds, &mut issues);
    suggestion_rules(ds, domain, &mut issues);
    issues
}

/// Run the convention-specific extra rule families.
pub fn run_convention_rules(ds: &Dataset, conventions: &ConventionSet) -> Vec<Issue> {
    let mut issues = Vec::new();
    if conventions.cf {
        attr_case_rules(ds, &mut issues);
    }
    if conventions.ferret {
        ferret_rules(ds, &mut issues);
    }
    issues
}

fn global_rules(ds: &Dataset, cf_version: &str, issues: &mut Vec<Issue>) {
    match ds.attr_str("Conventions") {
        None => issues.push(Issue::new(
            "conventions_missing",
            Severity::Warning,
            IssueOrigin::Heuristic,
            GLOBAL_SUBJECT,
            format!("Global attribute 'Conventions' is missing; expected to include '{}'.", cf_version),
        )),
        Some(value) => {
            let has_token = value
                .split(',')
                .map(str::trim)
                .any(|token| token == cf_version);
            if !has_token {
                issues.push(Issue::new(
                    "conventions_mismatch",
                    Severity::Warning,
                    IssueOrigin::Heuristic,
                    GLOBAL_SUBJECT,
                    format!(
                        "Global attribute 'Conventions' is '{}' but does not include '{}'.",
                        value, cf_version
                    ),
                ));
            }
        }
    }

    for (actual, expected) in case_mismatches(ds.attrs(), GLOBAL_ATTR_KEYS) {
        issues.push(Issue::new(
            "global_attr_case",
            Severity::Warning,
            IssueOrigin::Heuristic,
            GLOBAL_SUBJECT,
            format!(
                "Global attribute '{}' should be spelled '{}'.",
                actual, expected
            ),
        ));
    }
}

fn coordinate_rules(ds: &Dataset, axes: &AxisRoleMap, issues: &mut Vec<Issue>) {
    for (role, name) in axes.resolved() {
        let coord = match ds.coord(name) {
            Some(coord) => coord,
            None => {
                // The role resolved to a bare dimension.
                issues.push(Issue::new(
                    "missing_dimension_coordinate",
                    Severity::Error,
                    IssueOrigin::Heuristic,
                    name,
                    format!("Dimension '{}' has no coordinate variable.", name),
                ));
                continue;
            }
        };

        for &(key, expected) in expected_coord_attrs(role) {
            let current = coord.attr_str(key);
            if current != Some(expected) {
                let current_text = current
                    .map(|v| format!("'{}'", v))
                    .unwrap_or_else(|| "missing".to_string());
                issues.push(Issue::new(
                    &format!("coord_attr:{}", key),
                    Severity::Warning,
                    IssueOrigin::Heuristic,
                    name,
                    format!(
                        "Coordinate '{}' is inferred as {} and expects {}='{}', but found {}.",
                        name, role, key, expected, current_text
                    ),
                ));
            }
        }

        if role == AxisRole::Time {
            match coord.attr_str("units") {
                None => issues.push(Issue::new(
                    "coord_attr:units",
                    Severity::Error,
                    IssueOrigin::Heuristic,
                    name,
                    format!(
                        "Time coordinate '{}' is missing units metadata (e.g. 'days since 1970-01-01').",
                        name
                    ),
                )),
                Some(units) if !is_time_units(units) => issues.push(Issue::new(
                    "coord_attr:units_format",
                    Severity::Warning,
                    IssueOrigin::Heuristic,
                    name,
                    format!(
                        "Time coordinate '{}' units '{}' are not in '<unit> since <epoch>' form.",
                        name, units
                    ),
                )),
                Some(_) => {}
            }
        }

        value_rules(name, coord, role, issues);
    }
}

/// Checks on the coordinate values themselves.
fn value_rules(name: &str, coord: &Variable, role: AxisRole, issues: &mut Vec<Issue>) {
    let finite: Vec<f64> = coord
        .values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if finite.len() < 2 {
        return;
    }

    let mut sorted = finite.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let has_duplicates = sorted.windows(2).any(|pair| pair[0] == pair[1]);
    if has_duplicates {
        issues.push(Issue::new(
            "coord_not_unique",
            Severity::Warning,
            IssueOrigin::Heuristic,
            name,
            format!("Coordinate '{}' contains duplicate values.", name),
        ));
    }

    let increasing = finite.windows(2).all(|pair| pair[1] > pair[0]);
    let decreasing = finite.windows(2).all(|pair| pair[1] < pair[0]);
    if !increasing && !decreasing {
        // Downstream range logic assumes monotonic coordinates.
        issues.push(Issue::new(
            "coord_not_monotonic",
            Severity::Error,
            IssueOrigin::Heuristic,
            name,
            format!(
                "Coordinate '{}' is not strictly increasing or decreasing.",
                name
            ),
        ));
    }

    let out_of_range = match role {
        AxisRole::Lat => finite.iter().filter(|&&v| !(-90.0..=90.0).contains(&v)).count(),
        AxisRole::Lon => finite
            .iter()
            .filter(|&&v| !(-180.0..=360.0).contains(&v))
            .count(),
        AxisRole::Time => 0,
    };
    if out_of_range > 0 {
        let bounds = match role {
            AxisRole::Lat => "[-90, 90]",
            _ => "[-180, 360]",
        };
        issues.push(Issue::new(
            "coord_values_out_of_range",
            Severity::Error,
            IssueOrigin::Heuristic,
            name,
            format!(
                "Coordinate '{}' has {} {} value(s) outside {}.",
                name, out_of_range, role, bounds
            ),
        ));
    }
}

fn is_valid_cf_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn variable_rules(ds: &Dataset, issues: &mut Vec<Issue>) {
    for (name, var) in ds.data_vars() {
        if !is_valid_cf_name(name) {
            issues.push(Issue::new(
                "invalid_variable_name",
                Severity::Error,
                IssueOrigin::Heuristic,
                name,
                format!(
                    "Variable '{}' is not CF-name compliant (letter, then letters/digits/underscore).",
                    name
                ),
            ));
        }

        let units = var.attr_str("units");
        let standard_name = var.attr_str("standard_name");
        if units.is_none() {
            issues.push(Issue::new(
                "missing_units_attr",
                Severity::Warning,
                IssueOrigin::Heuristic,
                name,
                format!(
                    "Variable '{}' is missing 'units' (use '1' for dimensionless quantities).",
                    name
                ),
            ));
        }
        if standard_name.is_none() && var.attr_str("long_name").is_none() {
            issues.push(Issue::new(
                "missing_standard_or_long_name",
                Severity::Warning,
                IssueOrigin::Heuristic,
                name,
                format!(
                    "Variable '{}' is missing both 'standard_name' and 'long_name'.",
                    name
                ),
            ));
        }
        if let Some(standard_name) = standard_name {
            if units.is_none() {
                issues.push(Issue::new(
                    "missing_units_for_standard_name",
                    Severity::Error,
                    IssueOrigin::Heuristic,
                    name,
                    format!(
                        "Variable '{}' has standard_name='{}' but no units.",
                        name, standard_name
                    ),
                ));
            }
        }
    }
}

/// Parse a whitespace-separated variable reference list.
fn whitespace_references(value: &str) -> Vec<&str> {
    value.split_whitespace().collect()
}

/// Parse `cell_measures` syntax: one or more `<measure>: <var>` pairs.
/// Returns the referenced variable names, or an error description.
fn cell_measure_references(value: &str) -> Result<Vec<&str>, &'static str> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err("expected one or more '<measure>: <var>' pairs");
    }
    let mut references = Vec::new();
    let mut idx = 0;
    while idx + 1 < tokens.len() {
        if !tokens[idx].ends_with(':') {
            return Err("expected '<measure>: <var>' pairs");
        }
        if tokens[idx + 1].ends_with(':') {
            return Err("missing variable name after measure");
        }
        references.push(tokens[idx + 1]);
        idx += 2;
    }
    if idx != tokens.len() {
        return Err("trailing token without a variable name");
    }
    Ok(references)
}

fn reference_rules_for(
    ds: &Dataset,
    subject: &str,
    attrs: &AttrMap,
    issues: &mut Vec<Issue>,
) {
    const WHITESPACE_ATTRS: &[&str] = &[
        "coordinates",
        "bounds",
        "grid_mapping",
        "ancillary_variables",
    ];
    for &attr_name in WHITESPACE_ATTRS {
        let value = match attrs.get(attr_name) {
            Some(value) => value,
            None => continue,
        };
        let text = match value.as_str() {
            Some(text) => text,
            None => {
                issues.push(Issue::new(
                    &format!("invalid_reference_attr:{}", attr_name),
                    Severity::Warning,
                    IssueOrigin::Heuristic,
                    subject,
                    format!(
                        "'{}' attribute on '{}' should be a string of variable names.",
                        attr_name, subject
                    ),
                ));
                continue;
            }
        };
        report_missing_references(ds, subject, attr_name, &whitespace_references(text), issues);
    }

    if let Some(value) = attrs.get("cell_measures") {
        match value.as_str().map(cell_measure_references) {
            Some(Ok(references)) => {
                report_missing_references(ds, subject, "cell_measures", &references, issues)
            }
            Some(Err(reason)) => issues.push(Issue::new(
                "invalid_reference_attr:cell_measures",
                Severity::Warning,
                IssueOrigin::Heuristic,
                subject,
                format!("'cell_measures' on '{}' has invalid syntax: {}.", subject, reason),
            )),
            None => issues.push(Issue::new(
                "invalid_reference_attr:cell_measures",
                Severity::Warning,
                IssueOrigin::Heuristic,
                subject,
                format!("'cell_measures' on '{}' should be a string.", subject),
            )),
        }
    }
}

fn report_missing_references(
    ds: &Dataset,
    subject: &str,
    attr_name: &str,
    references: &[&str],
    issues: &mut Vec<Issue>,
) {
    let mut missing: Vec<&str> = references
        .iter()
        .copied()
        .filter(|name| !ds.has_variable(name))
        .collect();
    missing.sort_unstable();
    missing.dedup();
    if !missing.is_empty() {
        issues.push(Issue::new(
            &format!("missing_referenced_variable:{}", attr_name),
            Severity::Error,
            IssueOrigin::Heuristic,
            subject,
            format!(
                "'{}' on '{}' references missing variables: {}.",
                attr_name,
                subject,
                missing.join(", ")
            ),
        ));
    }
}

fn reference_rules(ds: &Dataset, issues: &mut Vec<Issue>) {
    for (name, var) in ds.data_vars() {
        reference_rules_for(ds, name, &var.attrs, issues);
    }
    for (name, coord) in ds.coords() {
        reference_rules_for(ds, name, &coord.attrs, issues);
    }
}

/// Standard-name suggestions, info severity only: message content must
/// never change pass/fail outcome.
fn suggestion_rules(ds: &Dataset, domain: Option<Domain>, issues: &mut Vec<Issue>) {
    for (name, var) in ds.data_vars() {
        let standard_name = var.attr_str("standard_name");
        let units = var.attr_str("units");

        match standard_name {
            None => {
                let candidates = vocab::best_candidates(name, var.attr_str("long_name"), domain);
                if candidates.is_empty() {
                    continue;
                }
                let names: Vec<&str> = candidates.iter().map(|entry| entry.name).collect();
                issues.push(Issue::new(
                    "standard_name_suggestion",
                    Severity::Info,
                    IssueOrigin::Heuristic,
                    name,
                    format!(
                        "Variable '{}' could use standard_name '{}' (candidates: {}).",
                        name,
                        names[0],
                        names.join(", ")
                    ),
                ));
            }
            Some(standard_name) => match vocab::lookup(standard_name) {
                None => issues.push(Issue::new(
                    "unknown_standard_name",
                    Severity::Info,
                    IssueOrigin::Heuristic,
                    name,
                    format!(
                        "standard_name '{}' on '{}' is not in the built-in vocabulary subset.",
                        standard_name, name
                    ),
                )),
                Some(entry) => {
                    if let Some(units) = units {
                        if !entry.canonical_units.is_empty()
                            && !vocab::units_compatible(units, entry.canonical_units)
                        {
                            issues.push(Issue::new(
                                "units_check",
                                Severity::Info,
                                IssueOrigin::Heuristic,
                                name,
                                format!(
                                    "Variable '{}' has units '{}' but standard_name '{}' implies '{}'.",
                                    name, units, entry.name, entry.canonical_units
                                ),
                            ));
                        }
                    }
                }
            },
        }
    }
}

/// Key names that case-insensitively match a known key but differ in case.
fn case_mismatches<'a>(attrs: &'a AttrMap, expected_keys: &[&'a str]) -> Vec<(&'a str, &'a str)> {
    let mut mismatches = Vec::new();
    for &expected in expected_keys {
        if attrs.contains_key(expected) {
            continue;
        }
        for key in attrs.keys() {
            if key != expected && key.eq_ignore_ascii_case(expected) {
                mismatches.push((key.as_str(), expected));
            }
        }
    }
    mismatches
}

fn attr_case_rules(ds: &Dataset, issues: &mut Vec<Issue>) {
    for (name, coord) in ds.coords() {
        for (actual, expected) in case_mismatches(&coord.attrs, CF_ATTR_CASE_KEYS) {
            issues.push(Issue::new(
                "attr_case_mismatch",
                Severity::Warning,
                IssueOrigin::Convention,
                name,
                format!(
                    "Coordinate '{}' uses attribute '{}' but CF expects '{}'.",
                    name, actual, expected
                ),
            ));
        }
    }
    for (name, var) in ds.data_vars() {
        for (actual, expected) in case_mismatches(&var.attrs, CF_ATTR_CASE_KEYS) {
            issues.push(Issue::new(
                "attr_case_mismatch",
                Severity::Warning,
                IssueOrigin::Convention,
                name,
                format!(
                    "Variable '{}' uses attribute '{}' but CF expects '{}'.",
                    name, actual, expected
                ),
            ));
        }
    }
}

/// Ferret refuses coordinates that declare a missing-value marker.
fn ferret_rules(ds: &Dataset, issues: &mut Vec<Issue>) {
    for (name, coord) in ds.coords() {
        if let Some(fill) = coord.attr("_FillValue") {
            issues.push(Issue::new(
                "coord_fill_value_forbidden",
                Severity::Error,
                IssueOrigin::Convention,
                name,
                format!(
                    "Coordinate '{}' declares _FillValue ({}); coordinates must not declare missing values.",
                    name,
                    fill.display_text()
                ),
            ));
        }
    }
}

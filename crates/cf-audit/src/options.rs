//! Option surfaces for the checking entry points.
//!
//! Option strings are validated up front; an unknown convention,
//! engine, or domain name is rejected with `AuditError::InvalidOption`
//! before any check executes.

use serde::{Deserialize, Serialize};

use crate::axis::AxisOverrides;
use crate::error::{AuditError, AuditResult};

/// Default CF version string written/expected by the engines.
pub const CF_VERSION: &str = "CF-1.12";

/// Which convention rule families run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionSet {
    pub cf: bool,
    pub ferret: bool,
}

impl Default for ConventionSet {
    fn default() -> Self {
        // Both rule families run unless the caller narrows the set.
        Self {
            cf: true,
            ferret: true,
        }
    }
}

impl ConventionSet {
    /// Parse a comma-separated selector such as `"cf"` or `"cf,ferret"`.
    pub fn parse(selector: &str) -> AuditResult<Self> {
        let mut set = Self {
            cf: false,
            ferret: false,
        };
        for part in selector.split(',') {
            let name = part.trim().to_ascii_lowercase();
            if name.is_empty() {
                continue;
            }
            match name.as_str() {
                "cf" => set.cf = true,
                "ferret" => set.ferret = true,
                other => {
                    return Err(AuditError::InvalidOption(format!(
                        "unsupported convention '{}'; supported: cf, ferret",
                        other
                    )))
                }
            }
        }
        if !set.cf && !set.ferret {
            return Err(AuditError::InvalidOption(
                "at least one convention must be selected".to_string(),
            ));
        }
        Ok(set)
    }

    /// Names of the selected conventions, in fixed order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.cf {
            names.push("cf");
        }
        if self.ferret {
            names.push("ferret");
        }
        names
    }
}

/// External verifier selection policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineChoice {
    /// Try the external verifier, fall back to the heuristic engine
    /// when it cannot run.
    #[default]
    Auto,
    /// Force the built-in heuristic engine.
    Heuristic,
    /// Force the external verifier; its failure surfaces as an error.
    External,
}

impl EngineChoice {
    /// Parse from the option string (`auto`/`heuristic`/`cfchecker`).
    pub fn parse(name: &str) -> AuditResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "heuristic" => Ok(Self::Heuristic),
            "cfchecker" | "external" => Ok(Self::External),
            other => Err(AuditError::InvalidOption(format!(
                "unsupported engine '{}'; supported: auto, heuristic, cfchecker",
                other
            ))),
        }
    }
}

/// Vocabulary bias for standard-name suggestions.
///
/// Affects suggestion message content only, never severity or
/// pass/fail outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Ocean,
    Atmosphere,
    Land,
    Cryosphere,
    Biogeochemistry,
}

impl Domain {
    pub fn parse(name: &str) -> AuditResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ocean" => Ok(Self::Ocean),
            "atmosphere" => Ok(Self::Atmosphere),
            "land" => Ok(Self::Land),
            "cryosphere" => Ok(Self::Cryosphere),
            "biogeochemistry" => Ok(Self::Biogeochemistry),
            other => Err(AuditError::InvalidOption(format!(
                "unsupported domain '{}'",
                other
            ))),
        }
    }
}

/// Options for the compliance check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckOptions {
    pub conventions: ConventionSet,
    pub engine: EngineChoice,
    /// Whether external-verifier failure degrades to the heuristic
    /// engine instead of propagating.
    pub fallback_to_heuristic: Option<bool>,
    pub domain: Option<Domain>,
    pub axes: AxisOverrides,
}

impl CheckOptions {
    pub fn fallback_enabled(&self) -> bool {
        self.fallback_to_heuristic.unwrap_or(true)
    }
}

/// Options for the ocean/time coverage checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageOptions {
    /// Restrict checks to one variable; all eligible variables when unset.
    pub var_name: Option<String>,
    pub axes: AxisOverrides,
    pub check_edge_of_map: bool,
    pub check_land_ocean_offset: bool,
}

impl Default for CoverageOptions {
    fn default() -> Self {
        Self {
            var_name: None,
            axes: AxisOverrides::default(),
            check_edge_of_map: true,
            check_land_ocean_offset: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_set_parse() {
        let both = ConventionSet::parse("cf,ferret").unwrap();
        assert!(both.cf && both.ferret);
        let cf = ConventionSet::parse(" CF ").unwrap();
        assert!(cf.cf && !cf.ferret);
        assert!(ConventionSet::parse("cf,netcdf4").is_err());
        assert!(ConventionSet::parse("").is_err());
        assert!(ConventionSet::parse(",,").is_err());
    }

    #[test]
    fn test_engine_choice_parse() {
        assert_eq!(EngineChoice::parse("auto").unwrap(), EngineChoice::Auto);
        assert_eq!(
            EngineChoice::parse("cfchecker").unwrap(),
            EngineChoice::External
        );
        assert!(EngineChoice::parse("magic").is_err());
    }

    #[test]
    fn test_domain_parse() {
        assert_eq!(Domain::parse("Ocean").unwrap(), Domain::Ocean);
        assert!(Domain::parse("space").is_err());
    }
}

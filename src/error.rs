//! Errors raised by the scenario engine.
//!
//! Most code in the crate returns [`anyhow::Result`]; these variants exist so that callers (and
//! tests) can tell the fatal engine conditions apart with `downcast_ref`.
use std::error::Error;
use std::fmt;

/// A fatal condition detected by the scenario engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A TIER level outside the range supported by the requested table
    InvalidTierLevel(u32),
    /// A country's region has no entry in a reference table
    UnresolvedRegionLookup {
        /// The table which was searched
        table: &'static str,
        /// The region which could not be found
        region: String,
        /// The country whose region it is
        country: String,
    },
    /// The shifts computed for a country do not sum to zero
    MassConservationViolation {
        /// The country the shifts were computed for
        country: String,
        /// Sum of the three shifts
        residual: f64,
    },
    /// A scenario needs the BaU results, but they have not been computed yet
    MissingScenarioDependency {
        /// The scenario which was requested
        scenario: String,
        /// The country missing from the baseline (if the baseline exists at all)
        country: Option<String>,
    },
    /// An unrecognised scenario identifier
    UnknownScenarioKind(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidTierLevel(level) => write!(f, "Invalid TIER level: {level}"),
            Self::UnresolvedRegionLookup {
                table,
                region,
                country,
            } => write!(
                f,
                "Region {region} (country {country}) not found in {table} table"
            ),
            Self::MassConservationViolation { country, residual } => write!(
                f,
                "Shifts for {country} do not sum to zero (residual: {residual:e})"
            ),
            Self::MissingScenarioDependency {
                scenario,
                country: None,
            } => write!(
                f,
                "Scenario {scenario} requires BaU results, which have not been computed"
            ),
            Self::MissingScenarioDependency {
                scenario,
                country: Some(country),
            } => write!(
                f,
                "Scenario {scenario} requires BaU results for {country}, which are missing"
            ),
            Self::UnknownScenarioKind(name) => write!(f, "Unknown scenario: {name}"),
        }
    }
}

impl Error for EngineError {}

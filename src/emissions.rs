//! Functions for estimating greenhouse gas emissions.
//!
//! Emission rates are computed for 2030. Cumulative emissions over 2017 to 2030 assume the rate
//! grows linearly over the period.
use crate::units::{
    Dimensionless, Emissions, EmissionsPerEnergy, EmissionsPerYear, EnergyPerYearPerHousehold,
    Households, Year,
};

/// The first year of the period considered
pub const START_YEAR: u32 = 2017;

/// The last year of the period considered
pub const END_YEAR: u32 = 2030;

/// Length of the period over which emissions are accumulated
pub fn period() -> Year {
    Year(f64::from(END_YEAR - START_YEAR))
}

/// The yearly emissions of a group of households
pub fn emission_rate(
    factor: EmissionsPerEnergy,
    consumption: EnergyPerYearPerHousehold,
    households: Households,
) -> EmissionsPerYear {
    factor * (consumption * households)
}

/// Cumulative emissions of a population served from 2017 onwards.
///
/// The rate ramps up from zero, so this is the area of a triangle.
pub fn cumulative_emissions(rate_end: EmissionsPerYear) -> Emissions {
    rate_end * period() * Dimensionless(0.5)
}

/// Cumulative emissions of the population without access.
///
/// Without a 2017 rate the rate is assumed to ramp up from zero, like for served populations.
/// With one, the area is the rectangle under the 2017 rate plus the triangle between the 2017 and
/// 2030 rates.
pub fn cumulative_emissions_no_access(
    rate_start: Option<EmissionsPerYear>,
    rate_end: EmissionsPerYear,
) -> Emissions {
    match rate_start {
        None => cumulative_emissions(rate_end),
        Some(rate_start) => rate_start * period() + cumulative_emissions(rate_end - rate_start),
    }
}

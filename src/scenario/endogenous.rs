//! Variables derived from the survey data before any scenario is applied.
use crate::country::{CountryID, CountryMap, CountryRecord};
use crate::reference::ReferenceTables;
use crate::technology::PerTechnology;
use crate::tier::{
    TierLevel, get_peak_capacity_from_yearly_consumption, map_capped_tier_yearly_consumption,
    map_tier_yearly_consumption, shs_step_up_capacity,
};
use crate::units::{Dimensionless, EnergyPerYearPerHousehold, PowerPerHousehold};
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// The endogenous variables for one country
#[derive(Debug, Clone, PartialEq)]
pub struct EndogenousVariables {
    /// Ratio of the 2030 population to the 2017 population
    pub growth_ratio: Dimensionless,
    /// Population without access in 2017
    pub pop_dark_2017: f64,
    /// Population with access in 2017
    pub pop_electrified_2017: f64,
    /// Population which needs to gain access by 2030
    pub pop_newly_electrified_2030: f64,
    /// TIER-adjusted yearly consumption of a household on each technology
    pub yearly_consumption: PerTechnology<EnergyPerYearPerHousehold>,
    /// Yearly consumption of a household one TIER level higher
    pub capped_yearly_consumption: PerTechnology<EnergyPerYearPerHousehold>,
    /// Capacity needed per household.
    ///
    /// For grid and mini-grids this is the peak demand; for solar home systems it is the
    /// region's average unit capacity.
    pub peak_demand: PerTechnology<PowerPerHousehold>,
    /// Capacity per household needed to reach one TIER level higher
    pub step_up_capacity: PerTechnology<PowerPerHousehold>,
}

/// A country's (possibly edited) record together with its endogenous variables
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCountry {
    /// The input record
    pub record: CountryRecord,
    /// Variables derived from the record
    pub endogenous: EndogenousVariables,
}

/// Prepared countries, in input order
pub type PreparedCountryMap = IndexMap<CountryID, PreparedCountry>;

impl EndogenousVariables {
    /// Derive the endogenous variables for a country.
    ///
    /// Fails if the country's region is missing from the SHS unit capacity table.
    pub fn new(
        country: &CountryRecord,
        reference: &ReferenceTables,
        min_tier_level: TierLevel,
    ) -> Result<Self> {
        let growth_ratio = Dimensionless(country.pop_2030 / country.pop_2017);
        let pop_dark_2017 = country.pop_2017 * country.dark_rate;
        let pop_electrified_2017 = country.pop_2017 * country.electrification_rate;
        let pop_newly_electrified_2030 = growth_ratio.0 * pop_dark_2017;

        let consumption = EnergyPerYearPerHousehold(country.hh_yearly_electricity_consumption);
        let yearly_consumption = country.hh_shares().map(|share| {
            map_tier_yearly_consumption(consumption, Dimensionless(*share), min_tier_level)
        });
        let capped_yearly_consumption = yearly_consumption
            .map(|consumption| map_capped_tier_yearly_consumption(*consumption, min_tier_level));

        let shs_unit_capacity = reference.shs_unit_capacity_for(country)?;
        let peak_capacity =
            |consumption| get_peak_capacity_from_yearly_consumption(consumption, min_tier_level);
        let peak_demand = PerTechnology::new(
            peak_capacity(yearly_consumption.grid),
            peak_capacity(yearly_consumption.mg),
            shs_unit_capacity,
        );
        let step_up_capacity = PerTechnology::new(
            peak_capacity(capped_yearly_consumption.grid),
            peak_capacity(capped_yearly_consumption.mg),
            shs_step_up_capacity(shs_unit_capacity, min_tier_level),
        );

        Ok(Self {
            growth_ratio,
            pop_dark_2017,
            pop_electrified_2017,
            pop_newly_electrified_2030,
            yearly_consumption,
            capped_yearly_consumption,
            peak_demand,
            step_up_capacity,
        })
    }
}

/// Derive the endogenous variables for every country.
///
/// The input records are cloned, so the caller's map is left untouched.
///
/// # Arguments
///
/// * `countries` - The country records
/// * `reference` - Reference tables
/// * `min_tier_level` - The lowest TIER level a household is assumed to reach
pub fn prepare_endogenous_variables(
    countries: &CountryMap,
    reference: &ReferenceTables,
    min_tier_level: TierLevel,
) -> Result<PreparedCountryMap> {
    countries
        .iter()
        .map(|(iso, record)| {
            let endogenous = EndogenousVariables::new(record, reference, min_tier_level)
                .with_context(|| format!("Could not prepare data for country {iso}"))?;
            let prepared = PreparedCountry {
                record: record.clone(),
                endogenous,
            };
            Ok((iso.clone(), prepared))
        })
        .collect()
}

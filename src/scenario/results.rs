//! Physical, financial and environmental results derived from an allocation.
use super::ScenarioKind;
use super::allocation::{Allocation, AllocationMap};
use super::baseline::BaselineCache;
use super::endogenous::{EndogenousVariables, PreparedCountry, PreparedCountryMap};
use crate::country::{CountryID, CountryRecord};
use crate::emissions::{cumulative_emissions, cumulative_emissions_no_access, emission_rate};
use crate::finance::{MiniGridCostCurve, capacity_investment_cost, household_investment_cost};
use crate::model::ModelParameters;
use crate::reference::ReferenceTables;
use crate::technology::PerTechnology;
use crate::tier::TierLevel;
use crate::units::{
    Emissions, EmissionsPerEnergy, EmissionsPerYear, EnergyPerYearPerHousehold, Households, Money,
    Power,
};
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Emissions of the newly-electrified population
#[derive(Debug, Clone, PartialEq)]
pub struct GhgFigures {
    /// Yearly emissions in 2030 of the households served by each technology
    pub rate_2030: PerTechnology<EmissionsPerYear>,
    /// Yearly emissions in 2030 of the households left without access
    pub rate_2030_no_access: EmissionsPerYear,
    /// Cumulative emissions over 2017 to 2030 of the households served by each technology
    pub cumul: PerTechnology<Emissions>,
    /// Cumulative emissions over 2017 to 2030 of the households left without access
    pub cumul_no_access: Emissions,
}

impl GhgFigures {
    /// Total cumulative emissions, including the households without access
    pub fn total_cumul(&self) -> Emissions {
        self.cumul.total() + self.cumul_no_access
    }
}

/// Cumulative emissions saved relative to BaU (BaU minus scenario)
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionReductions {
    /// Reduction for each technology
    pub cumul: PerTechnology<Emissions>,
    /// Reduction for the households without access
    pub no_access: Emissions,
    /// Reduction in total
    pub total: Emissions,
}

impl EmissionReductions {
    fn new(baseline: &GhgFigures, scenario: &GhgFigures) -> Self {
        Self {
            cumul: PerTechnology::from_fn(|tech| baseline.cumul[tech] - scenario.cumul[tech]),
            no_access: baseline.cumul_no_access - scenario.cumul_no_access,
            total: baseline.total_cumul() - scenario.total_cumul(),
        }
    }
}

/// The results for one country
#[derive(Debug, Clone, PartialEq)]
pub struct CountryResults {
    /// Households served by each technology
    pub households: PerTechnology<Households>,
    /// Households left without access
    pub households_no_access: Households,
    /// Installed capacity for each technology
    pub capacity: PerTechnology<Power>,
    /// Capacity needed if every household reached one TIER level higher
    pub capped_capacity: PerTechnology<Power>,
    /// Investment cost for each technology
    pub investment_cost: PerTechnology<Money>,
    /// Investment cost if every household reached one TIER level higher
    pub capped_investment_cost: PerTechnology<Money>,
    /// Emissions at the households' TIER level
    pub ghg: GhgFigures,
    /// Emissions if every household reached one TIER level higher
    pub capped_ghg: GhgFigures,
    /// Reductions in `ghg` relative to BaU (not computed for BaU itself)
    pub ghg_er: Option<EmissionReductions>,
    /// Reductions in `capped_ghg` relative to BaU (not computed for BaU itself)
    pub capped_ghg_er: Option<EmissionReductions>,
}

/// Everything computed for one country in a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRow {
    /// The input record
    pub record: CountryRecord,
    /// Endogenous variables
    pub endogenous: EndogenousVariables,
    /// The population allocation
    pub allocation: Allocation,
    /// Results derived from the allocation
    pub results: CountryResults,
}

/// The results of running a scenario, keyed by country
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResultTable {
    /// The scenario which was run
    pub kind: ScenarioKind,
    /// One row per country, in input order
    pub rows: IndexMap<CountryID, ScenarioRow>,
}

/// Emission factors for each technology and for households without access
struct EmissionFactors {
    technology: PerTechnology<EmissionsPerEnergy>,
    no_access: EmissionsPerEnergy,
}

impl EmissionFactors {
    fn new(record: &CountryRecord, parameters: &ModelParameters) -> Self {
        Self {
            // Grid factor is given in gCO2/kWh
            technology: PerTechnology::new(
                EmissionsPerEnergy(record.grid_emission_factor / 1000.0),
                parameters.emission_factor_mg,
                parameters.emission_factor_shs,
            ),
            no_access: parameters.emission_factor_no_access,
        }
    }
}

/// Compute the emissions for one country.
///
/// # Arguments
///
/// * `factors` - Emission factors
/// * `consumption` - Yearly consumption of a household on each technology
/// * `households` - Households served by each technology
/// * `households_no_access` - Households without access in 2030
/// * `rate_2017_no_access` - Emissions in 2017 of the households without access then, if the
///   no-access emissions should ramp from this value rather than from zero
fn compute_ghg(
    factors: &EmissionFactors,
    consumption: &PerTechnology<EnergyPerYearPerHousehold>,
    households: &PerTechnology<Households>,
    households_no_access: Households,
    rate_2017_no_access: Option<EmissionsPerYear>,
) -> GhgFigures {
    let rate_2030 = PerTechnology::from_fn(|tech| {
        emission_rate(factors.technology[tech], consumption[tech], households[tech])
    });
    let rate_2030_no_access = emission_rate(
        factors.no_access,
        TierLevel::MIN.min_annual_consumption(),
        households_no_access,
    );

    GhgFigures {
        cumul: rate_2030.map(|rate| cumulative_emissions(*rate)),
        cumul_no_access: cumulative_emissions_no_access(rate_2017_no_access, rate_2030_no_access),
        rate_2030,
        rate_2030_no_access,
    }
}

/// Derive the results for one country.
///
/// `baseline` is only used for scenarios other than BaU.
fn extract_country_results(
    kind: ScenarioKind,
    country: &PreparedCountry,
    allocation: &Allocation,
    reference: &ReferenceTables,
    parameters: &ModelParameters,
    mg_cost_curve: &MiniGridCostCurve,
    baseline: &BaselineCache,
) -> Result<CountryResults> {
    let record = &country.record;
    let endogenous = &country.endogenous;
    let to_households = |pop: f64| Households(pop / record.hh_av_size);

    let households = allocation.pop_get.map(|pop| to_households(*pop));
    let households_no_access = to_households(allocation.pop_no_access);
    let capacity = PerTechnology::from_fn(|tech| endogenous.peak_demand[tech] * households[tech]);
    let capped_capacity =
        PerTechnology::from_fn(|tech| endogenous.step_up_capacity[tech] * households[tech]);

    let grid_cost =
        household_investment_cost(households.grid, parameters.grid_investment_cost_per_household);
    let investment_cost = PerTechnology::new(
        grid_cost,
        capacity_investment_cost(
            capacity.mg,
            mg_cost_curve.cost_per_kw(endogenous.peak_demand.mg),
        ),
        capacity_investment_cost(capacity.shs, reference.shs_cost_per_kw),
    );
    let capped_investment_cost = PerTechnology::new(
        grid_cost,
        capacity_investment_cost(
            capped_capacity.mg,
            mg_cost_curve.cost_per_kw(endogenous.step_up_capacity.mg),
        ),
        capacity_investment_cost(capped_capacity.shs, reference.shs_cost_per_kw),
    );

    // Without a BaU baseline, the no-access emissions ramp up from zero
    let factors = EmissionFactors::new(record, parameters);
    let rate_2017_no_access = (kind != ScenarioKind::Bau).then(|| {
        emission_rate(
            factors.no_access,
            TierLevel::MIN.min_annual_consumption(),
            to_households(endogenous.pop_dark_2017),
        )
    });
    let ghg = compute_ghg(
        &factors,
        &endogenous.yearly_consumption,
        &households,
        households_no_access,
        rate_2017_no_access,
    );
    let capped_ghg = compute_ghg(
        &factors,
        &endogenous.capped_yearly_consumption,
        &households,
        households_no_access,
        rate_2017_no_access,
    );

    let (ghg_er, capped_ghg_er) = if kind == ScenarioKind::Bau {
        (None, None)
    } else {
        let bau = baseline.get(kind, &record.country_iso)?;
        (
            Some(EmissionReductions::new(&bau.ghg, &ghg)),
            Some(EmissionReductions::new(&bau.capped_ghg, &capped_ghg)),
        )
    };

    Ok(CountryResults {
        households,
        households_no_access,
        capacity,
        capped_capacity,
        investment_cost,
        capped_investment_cost,
        ghg,
        capped_ghg,
        ghg_er,
        capped_ghg_er,
    })
}

/// Derive the results of a scenario from its allocation.
///
/// # Arguments
///
/// * `kind` - The scenario
/// * `countries` - Countries with their endogenous variables
/// * `allocations` - The allocation for every country in `countries`
/// * `reference` - Reference tables
/// * `parameters` - Model parameters (costs and emission factors)
/// * `baseline` - BaU results, which every scenario except BaU needs
///
/// # Returns
///
/// The result table, or [`crate::error::EngineError::MissingScenarioDependency`] if a
/// needed BaU result is missing.
pub fn extract_results_scenario(
    kind: ScenarioKind,
    countries: &PreparedCountryMap,
    allocations: AllocationMap,
    reference: &ReferenceTables,
    parameters: &ModelParameters,
    baseline: &BaselineCache,
) -> Result<ScenarioResultTable> {
    let mg_cost_curve = MiniGridCostCurve::new(&parameters.mini_grid_cost);

    let mut rows = IndexMap::new();
    for (iso, allocation) in allocations {
        let country = countries
            .get(&iso)
            .with_context(|| format!("No endogenous variables for country {iso}"))?;
        let results = extract_country_results(
            kind,
            country,
            &allocation,
            reference,
            parameters,
            &mg_cost_curve,
            baseline,
        )?;

        let row = ScenarioRow {
            record: country.record.clone(),
            endogenous: country.endogenous.clone(),
            allocation,
            results,
        };
        rows.insert(iso, row);
    }

    Ok(ScenarioResultTable { kind, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::CountryMap;
    use crate::error::EngineError;
    use crate::fixture::{countries, reference_tables};
    use crate::scenario::allocation::allocate_scenario;
    use crate::scenario::endogenous::prepare_endogenous_variables;
    use crate::units::{Dimensionless, MoneyPerPower};
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn prepared(countries: CountryMap, reference_tables: ReferenceTables) -> PreparedCountryMap {
        prepare_endogenous_variables(&countries, &reference_tables, TierLevel::default()).unwrap()
    }

    fn run(
        kind: ScenarioKind,
        prepared: &PreparedCountryMap,
        reference: &ReferenceTables,
        baseline: &BaselineCache,
    ) -> Result<ScenarioResultTable> {
        let parameters = ModelParameters::default();
        let allocations =
            allocate_scenario(kind, prepared, reference, parameters.drive_weight).unwrap();
        extract_results_scenario(kind, prepared, allocations, reference, &parameters, baseline)
    }

    #[rstest]
    fn test_extract_results_bau(prepared: PreparedCountryMap, reference_tables: ReferenceTables) {
        let table = run(
            ScenarioKind::Bau,
            &prepared,
            &reference_tables,
            &BaselineCache::default(),
        )
        .unwrap();
        let row = &table.rows["KEN"];
        let results = &row.results;
        let endogenous = &row.endogenous;

        let hh_grid = row.allocation.pop_get.grid / 3.9;
        assert_approx_eq!(Households, results.households.grid, Households(hh_grid));
        assert_approx_eq!(
            Power,
            results.capacity.grid,
            Power(hh_grid * endogenous.peak_demand.grid.value())
        );
        assert_approx_eq!(
            Power,
            results.capped_capacity.shs,
            Power(results.households.shs.value() * 0.8)
        );
        assert_approx_eq!(Money, results.investment_cost.grid, Money(hh_grid * 2500.0));

        // Mini-grid peak demand is 0.2 kW, at which the cost curve gives 3700 USD/kW
        assert_approx_eq!(
            Money,
            results.investment_cost.mg,
            Money(results.capacity.mg.value() * 3700.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            Money,
            results.investment_cost.shs,
            MoneyPerPower(4500.0) * results.capacity.shs
        );

        // Grid: 0.3 kgCO2/kWh * 800 kWh per household
        assert_approx_eq!(
            EmissionsPerYear,
            results.ghg.rate_2030.grid,
            EmissionsPerYear(hh_grid * 240.0),
            epsilon = 1e-6
        );
        assert_eq!(results.ghg.rate_2030.shs, EmissionsPerYear(0.0));

        // No baseline, so no-access emissions are a triangle
        assert_approx_eq!(
            Emissions,
            results.ghg.cumul_no_access,
            Emissions(results.ghg.rate_2030_no_access.value() * 6.5)
        );
        assert_eq!(results.ghg_er, None);
    }

    #[rstest]
    fn test_extract_results_population_balance(
        prepared: PreparedCountryMap,
        reference_tables: ReferenceTables,
    ) {
        let table = run(
            ScenarioKind::Bau,
            &prepared,
            &reference_tables,
            &BaselineCache::default(),
        )
        .unwrap();
        let row = &table.rows["KEN"];
        assert_approx_eq!(
            f64,
            row.allocation.pop_get.total() + row.allocation.pop_no_access,
            row.endogenous.pop_newly_electrified_2030,
            epsilon = 1e-6
        );
        let ratio: Dimensionless = row.results.households_no_access / row.results.households.grid;
        assert_approx_eq!(f64, ratio.0, 0.1 / 0.63, epsilon = 1e-12);
    }

    #[rstest]
    fn test_extract_results_missing_baseline(
        prepared: PreparedCountryMap,
        reference_tables: ReferenceTables,
    ) {
        let err = run(
            ScenarioKind::Se4all,
            &prepared,
            &reference_tables,
            &BaselineCache::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::MissingScenarioDependency {
                scenario: "se4all".into(),
                country: None
            })
        );
    }

    #[rstest]
    fn test_extract_results_emission_reductions(
        prepared: PreparedCountryMap,
        reference_tables: ReferenceTables,
    ) {
        let mut baseline = BaselineCache::default();
        let bau = run(ScenarioKind::Bau, &prepared, &reference_tables, &baseline).unwrap();
        baseline.store(&bau);
        let se4all = run(ScenarioKind::Se4all, &prepared, &reference_tables, &baseline).unwrap();

        let bau_ghg = &bau.rows["KEN"].results.ghg;
        let results = &se4all.rows["KEN"].results;
        let er = results.ghg_er.as_ref().unwrap();
        assert_eq!(er.total, bau_ghg.total_cumul() - results.ghg.total_cumul());
        assert_eq!(er.cumul.grid, bau_ghg.cumul.grid - results.ghg.cumul.grid);

        let bau_capped_ghg = &bau.rows["KEN"].results.capped_ghg;
        let capped_er = results.capped_ghg_er.as_ref().unwrap();
        assert_eq!(
            capped_er.no_access,
            bau_capped_ghg.cumul_no_access - results.capped_ghg.cumul_no_access
        );

        // With a baseline, no-access emissions ramp from the 2017 rate
        let rate_2017 = 6.8 * 4.5 * 49_700_000.0 * 0.36 / 3.9;
        let rate_2030 = results.ghg.rate_2030_no_access.value();
        assert_approx_eq!(
            Emissions,
            results.ghg.cumul_no_access,
            Emissions(13.0 * rate_2017 + 6.5 * (rate_2030 - rate_2017)),
            epsilon = 1e-3
        );
    }
}

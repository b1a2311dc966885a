//! Allocation of the newly-electrified population to technologies for each scenario.
use super::ScenarioKind;
use super::endogenous::{PreparedCountry, PreparedCountryMap};
use super::shift::compute_rise_shifts;
use crate::country::CountryID;
use crate::reference::ReferenceTables;
use crate::technology::{PerTechnology, Technology};
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// The score given to mini-grids and solar home systems in the progressive off-grid scenario
const PROG_OFF_GRID_RISE_SCORE: f64 = 100.0;

/// The population allocated to each technology in one country
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Newly-electrified population getting access through each technology by 2030
    pub pop_get: PerTechnology<f64>,
    /// Newly-electrified population left without access in 2030
    pub pop_no_access: f64,
}

/// Allocations, keyed by country
pub type AllocationMap = IndexMap<CountryID, Allocation>;

impl Allocation {
    /// Allocate population according to a share for each technology.
    ///
    /// Negative shares are clamped to zero. If the clamped shares sum to more than one, they are
    /// scaled down so that no more than the newly-electrified population is allocated.
    fn from_shares(shares: &PerTechnology<f64>, pop_newly_electrified: f64) -> Self {
        let mut shares = shares.map(|share| share.max(0.0));
        let total = shares.total();
        if total > 1.0 {
            shares = shares.map(|share| share / total);
        }

        let pop_get = shares.map(|share| share * pop_newly_electrified);
        let pop_no_access = (pop_newly_electrified - pop_get.total()).max(0.0);

        Self {
            pop_get,
            pop_no_access,
        }
    }
}

/// Allocate the population of every country according to the rule for a scenario.
///
/// # Arguments
///
/// * `kind` - The scenario
/// * `countries` - Countries with their endogenous variables
/// * `reference` - Reference tables
/// * `drive_weight` - Weight of the RISE-driven shift relative to the socio-economic one
pub fn allocate_scenario(
    kind: ScenarioKind,
    countries: &PreparedCountryMap,
    reference: &ReferenceTables,
    drive_weight: f64,
) -> Result<AllocationMap> {
    countries
        .iter()
        .map(|(iso, country)| {
            let allocation = match kind {
                ScenarioKind::Bau => allocate_bau(country, reference)
                    .with_context(|| format!("Could not allocate BaU for country {iso}"))?,
                ScenarioKind::Se4all | ScenarioKind::Se4allFlex => {
                    allocate_se4all(country, &country.record.rise_scores(), drive_weight)
                }
                ScenarioKind::Prog => allocate_prog(country, drive_weight),
            };
            Ok((iso.clone(), allocation))
        })
        .collect()
}

/// Allocate according to the regional BaU shares, scaled by IEA coverage
pub fn allocate_bau(country: &PreparedCountry, reference: &ReferenceTables) -> Result<Allocation> {
    let coverage = reference.iea_coverage_for(&country.record)?;
    let shares = reference
        .bau_shares_for(&country.record)?
        .shares
        .map(|share| (coverage * *share).0);

    Ok(Allocation::from_shares(
        &shares,
        country.endogenous.pop_newly_electrified_2030,
    ))
}

/// Allocate by shifting the endogenous shares according to the given RISE scores.
///
/// The RISE-driven shift is blended with a shift driven by socio-economic scores. Mini-grids and
/// solar home systems only take their shift if their shifted share ends up above the current
/// grid share; the grid gives up whatever they take.
pub fn allocate_se4all(
    country: &PreparedCountry,
    rise_scores: &PerTechnology<f64>,
    drive_weight: f64,
) -> Allocation {
    let record = &country.record;
    let iso = &*record.country_iso.0;
    let shares = record.pop_shares();
    let socio_scores = record.socio_economic_scores();

    let shifts = PerTechnology::from_fn(|tech| {
        let rise_shift = compute_rise_shifts(rise_scores, &shares, tech, iso);
        let socio_shift = compute_rise_shifts(&socio_scores, &shares, tech, iso);
        drive_weight * rise_shift + (1.0 - drive_weight) * socio_shift
    });

    let effective_shift = |tech: Technology| {
        if shares[tech] + shifts[tech] > shares.grid {
            shifts[tech]
        } else {
            0.0
        }
    };
    let mg_shift = effective_shift(Technology::MiniGrid);
    let shs_shift = effective_shift(Technology::Shs);

    let allocated_shares = PerTechnology::new(
        shares.grid - mg_shift - shs_shift,
        shares.mg + mg_shift,
        shares.shs + shs_shift,
    );

    Allocation::from_shares(
        &allocated_shares,
        country.endogenous.pop_newly_electrified_2030,
    )
}

/// Allocate as for SE4ALL, but with the best possible off-grid regulatory environment
pub fn allocate_prog(country: &PreparedCountry, drive_weight: f64) -> Allocation {
    let mut rise_scores = country.record.rise_scores();
    rise_scores.mg = PROG_OFF_GRID_RISE_SCORE;
    rise_scores.shs = PROG_OFF_GRID_RISE_SCORE;

    allocate_se4all(country, &rise_scores, drive_weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::CountryRecord;
    use crate::error::EngineError;
    use crate::fixture::{country, reference_tables};
    use crate::scenario::endogenous::EndogenousVariables;
    use crate::tier::TierLevel;
    use crate::units::Dimensionless;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn prepare(record: CountryRecord, reference: &ReferenceTables) -> PreparedCountry {
        let endogenous =
            EndogenousVariables::new(&record, reference, TierLevel::default()).unwrap();
        PreparedCountry { record, endogenous }
    }

    fn with_newly_electrified(mut country: PreparedCountry, pop: f64) -> PreparedCountry {
        country.endogenous.pop_newly_electrified_2030 = pop;
        country
    }

    #[rstest]
    fn test_allocate_bau(country: CountryRecord, mut reference_tables: ReferenceTables) {
        reference_tables.bau_shares["SSA"].iea_coverage = Dimensionless(1.0);
        let country = with_newly_electrified(prepare(country, &reference_tables), 1_000_000.0);

        let allocation = allocate_bau(&country, &reference_tables).unwrap();
        assert_approx_eq!(f64, allocation.pop_get.grid, 700_000.0, epsilon = 1e-6);
        assert_approx_eq!(f64, allocation.pop_get.mg, 200_000.0, epsilon = 1e-6);
        assert_approx_eq!(f64, allocation.pop_get.shs, 100_000.0, epsilon = 1e-6);
        assert_approx_eq!(f64, allocation.pop_no_access, 0.0, epsilon = 1e-6);
    }

    #[rstest]
    fn test_allocate_bau_partial_coverage(
        country: CountryRecord,
        reference_tables: ReferenceTables,
    ) {
        let country = with_newly_electrified(prepare(country, &reference_tables), 1_000_000.0);

        let allocation = allocate_bau(&country, &reference_tables).unwrap();
        assert_approx_eq!(f64, allocation.pop_get.grid, 630_000.0, epsilon = 1e-6);
        assert_approx_eq!(f64, allocation.pop_no_access, 100_000.0, epsilon = 1e-6);
    }

    #[rstest]
    fn test_allocate_bau_unknown_region(
        country: CountryRecord,
        mut reference_tables: ReferenceTables,
    ) {
        let country = prepare(country, &reference_tables);
        reference_tables.bau_shares.clear();

        let err = allocate_bau(&country, &reference_tables).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::UnresolvedRegionLookup { .. })
        ));
    }

    #[rstest]
    fn test_allocate_se4all_gated(country: CountryRecord, reference_tables: ReferenceTables) {
        // Off-grid shares never overtake the grid share, so nothing moves
        let country = with_newly_electrified(prepare(country, &reference_tables), 1000.0);
        let allocation = allocate_se4all(&country, &country.record.rise_scores(), 1.0);

        assert_approx_eq!(f64, allocation.pop_get.grid, 700.0, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_get.mg, 100.0, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_get.shs, 200.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_allocate_se4all_shifted(mut country: CountryRecord, reference_tables: ReferenceTables) {
        country.pop_grid_share = 0.3;
        country.pop_mg_share = 0.1;
        country.pop_shs_share = 0.6;
        let country = with_newly_electrified(prepare(country, &reference_tables), 1000.0);
        let scores = PerTechnology::new(20.0, 50.0, 80.0);

        // Shifts are -0.18 (grid), +0.03 (mg), +0.15 (shs). Mini-grids would only reach 0.13,
        // below the grid's 0.3, so only solar home systems take their shift.
        let allocation = allocate_se4all(&country, &scores, 1.0);
        assert_approx_eq!(f64, allocation.pop_get.grid, 150.0, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_get.mg, 100.0, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_get.shs, 750.0, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_no_access, 0.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_allocate_se4all_gated_against_grid_share(
        mut country: CountryRecord,
        reference_tables: ReferenceTables,
    ) {
        country.pop_grid_share = 0.3;
        country.pop_mg_share = 0.2;
        country.pop_shs_share = 0.45;
        let country = with_newly_electrified(prepare(country, &reference_tables), 1000.0);
        let scores = PerTechnology::new(30.0, 60.0, 80.0);

        // Grid loses 0.3 * 0.5 = 0.15, split 30:50 between mg and shs, then 0.2 * 0.2 = 0.04
        // moves from mg to shs: mg +0.01625, shs +0.13375. Mini-grids would reach 0.21625,
        // which is not above the grid's 0.3, so they keep their share.
        let allocation = allocate_se4all(&country, &scores, 1.0);
        assert_approx_eq!(f64, allocation.pop_get.grid, 166.25, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_get.mg, 200.0, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_get.shs, 583.75, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_no_access, 50.0, epsilon = 1e-9);
    }

    /// Sierra Leone, as in the demo data
    fn sierra_leone(mut country: CountryRecord) -> CountryRecord {
        country.country_iso = "SLE".into();
        country.pop_grid_share = 0.3;
        country.pop_mg_share = 0.2;
        country.pop_shs_share = 0.45;
        country.rise_grid = 30.0;
        country.rise_mg = 60.0;
        country.rise_shs = 80.0;
        country.ease_doing_business_index = 47.5;
        country.corruption_index = 30.0;
        country.weak_grid_index = 66.0;
        country.mobile_money_2017 = 11.0;
        country
    }

    #[rstest]
    fn test_allocate_se4all_sierra_leone(
        country: CountryRecord,
        reference_tables: ReferenceTables,
    ) {
        let country =
            with_newly_electrified(prepare(sierra_leone(country), &reference_tables), 1000.0);

        // RISE (30, 60, 80): grid -0.15, mg +0.01625, shs +0.13375.
        // Socio-economic scores are (47.5 + 30 + 100 - 66) / 3 = 37.1667 (grid),
        // (47.5 + 30 + 66) / 3 = 47.8333 (mg) and (11 + 66) / 2 = 38.5 (shs), so the grid loses
        // 0.3 * 0.10667 = 0.032, split 10.667:1.333 between mg and shs, then
        // 0.45 * 0.09333 = 0.042 moves from shs to mg: grid -0.032, mg +0.070444, shs -0.038444.
        // Blended with weight 0.8: mg +0.027089, shs +0.099311.
        // Mini-grids would reach 0.227089 < 0.3 so are gated; shs reaches 0.549311.
        let allocation = allocate_se4all(&country, &country.record.rise_scores(), 0.8);
        assert_approx_eq!(f64, allocation.pop_get.grid, 200.688_889, epsilon = 1e-5);
        assert_approx_eq!(f64, allocation.pop_get.mg, 200.0, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_get.shs, 549.311_111, epsilon = 1e-5);
        assert_approx_eq!(f64, allocation.pop_no_access, 50.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_allocate_prog_sierra_leone(country: CountryRecord, reference_tables: ReferenceTables) {
        let country =
            with_newly_electrified(prepare(sierra_leone(country), &reference_tables), 1000.0);

        // RISE (30, 100, 100): grid loses 0.3 * 0.7 = 0.21, split evenly, with no secondary move.
        // Blended with the socio-economic shifts above: mg +0.098089, shs +0.076311.
        // Mini-grids would reach 0.298089 < 0.3 so are gated; shs reaches 0.526311.
        let allocation = allocate_prog(&country, 0.8);
        assert_approx_eq!(f64, allocation.pop_get.grid, 223.688_889, epsilon = 1e-5);
        assert_approx_eq!(f64, allocation.pop_get.mg, 200.0, epsilon = 1e-9);
        assert_approx_eq!(f64, allocation.pop_get.shs, 526.311_111, epsilon = 1e-5);
        assert_approx_eq!(f64, allocation.pop_no_access, 50.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_allocate_se4all_equal_scores(
        mut country: CountryRecord,
        reference_tables: ReferenceTables,
    ) {
        // Socio-economic scores are all 50 too
        country.ease_doing_business_index = 50.0;
        country.corruption_index = 50.0;
        country.weak_grid_index = 50.0;
        country.mobile_money_2017 = 50.0;
        let country = with_newly_electrified(prepare(country, &reference_tables), 1000.0);
        let scores = PerTechnology::new(50.0, 50.0, 50.0);

        for drive_weight in [0.0, 0.5, 1.0] {
            let allocation = allocate_se4all(&country, &scores, drive_weight);
            assert_eq!(
                allocation.pop_get,
                country.record.pop_shares().map(|share| share * 1000.0)
            );
        }
    }

    #[rstest]
    fn test_allocate_prog(mut country: CountryRecord, reference_tables: ReferenceTables) {
        country.pop_grid_share = 0.2;
        country.pop_mg_share = 0.3;
        country.pop_shs_share = 0.5;
        let country = with_newly_electrified(prepare(country, &reference_tables), 1000.0);

        let prog = allocate_prog(&country, 1.0);
        let se4all = allocate_se4all(&country, &country.record.rise_scores(), 1.0);
        assert!(prog.pop_get.grid < se4all.pop_get.grid);
        assert_approx_eq!(f64, prog.pop_get.total(), 1000.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_allocation_non_negative(mut country: CountryRecord, reference_tables: ReferenceTables) {
        let values = [0.0, 25.0, 60.0, 100.0];
        let shares = [(0.05, 0.0, 0.95), (0.6, 0.3, 0.1), (0.0, 0.5, 0.2)];
        for (grid_share, mg_share, shs_share) in shares {
            country.pop_grid_share = grid_share;
            country.pop_mg_share = mg_share;
            country.pop_shs_share = shs_share;
            let prepared = prepare(country.clone(), &reference_tables);
            let newly = prepared.endogenous.pop_newly_electrified_2030;

            for (grid, mg, shs) in itertools::iproduct!(values, values, values) {
                let scores = PerTechnology::new(grid, mg, shs);
                for drive_weight in [0.0, 0.3, 1.0] {
                    let allocation = allocate_se4all(&prepared, &scores, drive_weight);
                    assert!(allocation.pop_get.iter().all(|(_, pop)| *pop >= 0.0));
                    assert!(allocation.pop_no_access >= 0.0);
                    assert!(allocation.pop_get.total() <= newly * (1.0 + 1e-12));
                }
            }
        }
    }

    #[test]
    fn test_allocation_from_shares_clamped() {
        let allocation = Allocation::from_shares(&PerTechnology::new(-0.2, 0.6, 0.8), 100.0);
        assert_eq!(allocation.pop_get.grid, 0.0);
        assert_approx_eq!(f64, allocation.pop_get.mg, 600.0 / 14.0);
        assert_approx_eq!(f64, allocation.pop_get.shs, 800.0 / 14.0);
        assert_eq!(allocation.pop_no_access, 0.0);
    }
}

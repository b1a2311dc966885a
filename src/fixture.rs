//! Fixtures for tests

use crate::country::{CountryMap, CountryRecord};
use crate::model::{Model, ModelParameters};
use crate::reference::{ReferenceTables, RegionalShares};
use crate::rise::RiseCatalog;
use crate::technology::{PerTechnology, Technology};
use crate::units::{Dimensionless, MoneyPerPower, PowerPerHousehold};
use indexmap::indexmap;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn country() -> CountryRecord {
    CountryRecord {
        country_iso: "KEN".into(),
        country: "Kenya".into(),
        region: "SSA".into(),
        pop_2017: 49_700_000.0,
        pop_2030: 66_400_000.0,
        dark_rate: 0.36,
        electrification_rate: 0.64,
        hh_av_size: 3.9,
        hh_yearly_electricity_consumption: 1000.0,
        hh_grid_share: 0.8,
        hh_mg_share: 0.05,
        hh_shs_share: 0.15,
        pop_grid_share: 0.7,
        pop_mg_share: 0.1,
        pop_shs_share: 0.2,
        rise_grid: 64.0,
        rise_mg: 45.0,
        rise_shs: 73.0,
        gdp_per_capita: 1508.0,
        mobile_money_2014: 58.4,
        mobile_money_2017: 72.9,
        ease_doing_business_index: 70.3,
        corruption_index: 28.0,
        weak_grid_index: 45.0,
        grid_emission_factor: 300.0,
    }
}

#[fixture]
pub fn rise_catalog() -> RiseCatalog {
    let mut catalog = RiseCatalog::default();
    for (tech, indicator, sub_indicator) in [
        (Technology::Grid, "planning", "grid_plan"),
        (Technology::Grid, "planning", "grid_targets"),
        (Technology::Grid, "tariffs", "utility_tariffs"),
        (Technology::MiniGrid, "mg_framework", "mg_licensing"),
        (Technology::Shs, "shs_framework", "shs_standards"),
    ] {
        catalog.insert(tech, indicator, sub_indicator).unwrap();
    }

    catalog
}

#[fixture]
pub fn reference_tables(rise_catalog: RiseCatalog) -> ReferenceTables {
    ReferenceTables {
        bau_shares: indexmap! {
            "SSA".into() => RegionalShares {
                shares: PerTechnology::new(Dimensionless(0.7), Dimensionless(0.2), Dimensionless(0.1)),
                iea_coverage: Dimensionless(0.9),
            },
        },
        shs_unit_capacity: indexmap! {"SSA".into() => PowerPerHousehold(0.03)},
        shs_cost_per_kw: MoneyPerPower(4500.0),
        rise_catalog,
    }
}

#[fixture]
pub fn countries(country: CountryRecord) -> CountryMap {
    indexmap! {country.country_iso.clone() => country}
}

#[fixture]
pub fn model(reference_tables: ReferenceTables, countries: CountryMap) -> Model {
    Model {
        parameters: ModelParameters::default(),
        reference: reference_tables,
        countries,
    }
}

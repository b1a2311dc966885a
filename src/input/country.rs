//! Code for reading the per-country survey data.
use super::*;
use crate::country::{CountryMap, CountryRecord};
use crate::reference::ReferenceTables;

const COUNTRIES_FILE_NAME: &str = "countries.csv";

/// Read the country records from the data directory.
///
/// # Arguments
///
/// * `data_dir` - Folder containing the input data files
/// * `reference` - Reference tables, used to check that every country's region is known
///
/// # Returns
///
/// The countries, keyed by ISO3 code, in file order
pub fn read_countries(data_dir: &Path, reference: &ReferenceTables) -> Result<CountryMap> {
    let file_path = data_dir.join(COUNTRIES_FILE_NAME);
    let iter = read_csv(&file_path)?;
    read_countries_from_iter(iter, reference).with_context(|| input_err_msg(&file_path))
}

fn read_countries_from_iter<I>(iter: I, reference: &ReferenceTables) -> Result<CountryMap>
where
    I: Iterator<Item = CountryRecord>,
{
    let mut map = CountryMap::new();
    for country in iter {
        check_country(&country, reference)
            .with_context(|| format!("Invalid data for country {}", country.country_iso))?;

        let iso = country.country_iso.clone();
        ensure!(
            map.insert(iso.clone(), country).is_none(),
            "Duplicate entry for country {iso}"
        );
    }

    Ok(map)
}

/// Check the values for one country are in range
fn check_country(country: &CountryRecord, reference: &ReferenceTables) -> Result<()> {
    ensure!(
        country.pop_2017 > 0.0,
        "Population in 2017 must be greater than zero (got {})",
        country.pop_2017
    );
    ensure!(
        country.pop_2030 >= 0.0,
        "Population in 2030 cannot be negative"
    );
    ensure!(
        country.hh_av_size > 0.0,
        "Average household size must be greater than zero"
    );
    ensure!(
        country.hh_yearly_electricity_consumption >= 0.0,
        "Household consumption cannot be negative"
    );

    for (value, name) in [
        (country.dark_rate, "dark_rate"),
        (country.electrification_rate, "electrification_rate"),
        (country.hh_grid_share, "hh_grid_share"),
        (country.hh_mg_share, "hh_mg_share"),
        (country.hh_shs_share, "hh_shs_share"),
        (country.pop_grid_share, "pop_grid_share"),
        (country.pop_mg_share, "pop_mg_share"),
        (country.pop_shs_share, "pop_shs_share"),
    ] {
        check_proportion(value, name)?;
    }

    let pop_total = country.pop_grid_share + country.pop_mg_share + country.pop_shs_share;
    ensure!(
        pop_total <= 1.0 + 1e-6,
        "Population shares sum to more than one ({pop_total})"
    );

    for (tech, score) in country.rise_scores().iter() {
        check_score(*score, &format!("rise_{tech}"))?;
    }

    // Indices feeding the socio-economic drive
    for (value, name) in [
        (country.ease_doing_business_index, "ease_doing_business_index"),
        (country.corruption_index, "corruption_index"),
        (country.weak_grid_index, "weak_grid_index"),
        (country.mobile_money_2014, "mobile_money_2014"),
        (country.mobile_money_2017, "mobile_money_2017"),
    ] {
        check_score(value, name)?;
    }

    // Regions must be resolvable in every regional table
    reference.bau_shares_for(country)?;
    reference.shs_unit_capacity_for(country)?;

    Ok(())
}

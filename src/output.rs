//! The module responsible for writing output data to disk.
use crate::country::CountryID;
use crate::region::RegionID;
use crate::scenario::ScenarioKind;
use crate::scenario::results::{EmissionReductions, ScenarioResultTable, ScenarioRow};
use crate::units::Emissions;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which data-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "se4all_results";

/// Get the default output directory for the data directory at `data_dir`.
///
/// This is a folder named after the data directory under `se4all_results`.
pub fn get_output_dir(data_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let data_dir = data_dir
        .canonicalize()
        .context("Could not resolve path to data directory")?;

    let name = data_dir
        .file_name()
        .context("Data directory cannot be the root folder")?
        .to_str()
        .context("Invalid chars in data directory name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, name].iter().collect())
}

/// Create the output directory, clearing it first if `allow_overwrite` is set.
///
/// # Returns
///
/// Whether existing output is being overwritten, or an error if the directory already has
/// contents and `allow_overwrite` is false.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if output_dir.is_dir() {
        if fs::read_dir(output_dir)?.next().is_none() {
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite (or set overwrite = \
             true in settings.toml) to replace its contents."
        );
        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// The name of the results file for a scenario, with the given extension
fn results_file_name(kind: ScenarioKind, extension: &str) -> String {
    format!("{kind}_results.{extension}")
}

/// One row of a scenario results file.
///
/// Consumptions are per household per year (kWh), capacities are in kW, costs in USD and
/// emissions in kgCO2. Emission reductions are empty for BaU.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ScenarioResultRow {
    country_iso: CountryID,
    country: String,
    region: RegionID,
    growth_ratio: f64,
    pop_dark_2017: f64,
    pop_electrified_2017: f64,
    pop_newly_electrified_2030: f64,
    grid_tier_yearly_consumption: f64,
    mg_tier_yearly_consumption: f64,
    shs_tier_yearly_consumption: f64,
    grid_capped_yearly_consumption: f64,
    mg_capped_yearly_consumption: f64,
    shs_capped_yearly_consumption: f64,
    grid_peak_demand: f64,
    mg_peak_demand: f64,
    shs_unit_av_capacity: f64,
    grid_step_up_capacity: f64,
    mg_step_up_capacity: f64,
    shs_step_up_capacity: f64,
    pop_get_grid_2030: f64,
    pop_get_mg_2030: f64,
    pop_get_shs_2030: f64,
    pop_no_access_2030: f64,
    hh_get_grid_2030: f64,
    hh_get_mg_2030: f64,
    hh_get_shs_2030: f64,
    hh_no_access_2030: f64,
    hh_grid_capacity: f64,
    hh_mg_capacity: f64,
    hh_shs_capacity: f64,
    hh_cap_scn2_grid_capacity: f64,
    hh_cap_scn2_mg_capacity: f64,
    hh_cap_scn2_shs_capacity: f64,
    grid_investment_cost: f64,
    mg_investment_cost: f64,
    shs_investment_cost: f64,
    tier_capped_grid_investment_cost: f64,
    tier_capped_mg_investment_cost: f64,
    tier_capped_shs_investment_cost: f64,
    ghg_grid_2030: f64,
    ghg_mg_2030: f64,
    ghg_shs_2030: f64,
    ghg_no_access_2030: f64,
    ghg_grid_cumul: f64,
    ghg_mg_cumul: f64,
    ghg_shs_cumul: f64,
    ghg_no_access_cumul: f64,
    ghg_tot_cumul: f64,
    tier_capped_ghg_grid_cumul: f64,
    tier_capped_ghg_mg_cumul: f64,
    tier_capped_ghg_shs_cumul: f64,
    tier_capped_ghg_no_access_cumul: f64,
    tier_capped_ghg_tot_cumul: f64,
    #[serde(rename = "ghg_grid_ER_cumul")]
    ghg_grid_er_cumul: Option<f64>,
    #[serde(rename = "ghg_mg_ER_cumul")]
    ghg_mg_er_cumul: Option<f64>,
    #[serde(rename = "ghg_shs_ER_cumul")]
    ghg_shs_er_cumul: Option<f64>,
    #[serde(rename = "ghg_no_access_ER_cumul")]
    ghg_no_access_er_cumul: Option<f64>,
    #[serde(rename = "ghg_tot_ER_cumul")]
    ghg_tot_er_cumul: Option<f64>,
    #[serde(rename = "tier_capped_ghg_grid_ER_cumul")]
    tier_capped_ghg_grid_er_cumul: Option<f64>,
    #[serde(rename = "tier_capped_ghg_mg_ER_cumul")]
    tier_capped_ghg_mg_er_cumul: Option<f64>,
    #[serde(rename = "tier_capped_ghg_shs_ER_cumul")]
    tier_capped_ghg_shs_er_cumul: Option<f64>,
    #[serde(rename = "tier_capped_ghg_no_access_ER_cumul")]
    tier_capped_ghg_no_access_er_cumul: Option<f64>,
    #[serde(rename = "tier_capped_ghg_tot_ER_cumul")]
    tier_capped_ghg_tot_er_cumul: Option<f64>,
}

/// Get one figure from a set of emission reductions, if there are any
fn er<F>(reductions: &Option<EmissionReductions>, f: F) -> Option<f64>
where
    F: FnOnce(&EmissionReductions) -> Emissions,
{
    reductions.as_ref().map(|er| f(er).value())
}

impl ScenarioResultRow {
    fn new(row: &ScenarioRow) -> Self {
        let endogenous = &row.endogenous;
        let allocation = &row.allocation;
        let results = &row.results;

        Self {
            country_iso: row.record.country_iso.clone(),
            country: row.record.country.clone(),
            region: row.record.region.clone(),
            growth_ratio: endogenous.growth_ratio.0,
            pop_dark_2017: endogenous.pop_dark_2017,
            pop_electrified_2017: endogenous.pop_electrified_2017,
            pop_newly_electrified_2030: endogenous.pop_newly_electrified_2030,
            grid_tier_yearly_consumption: endogenous.yearly_consumption.grid.value(),
            mg_tier_yearly_consumption: endogenous.yearly_consumption.mg.value(),
            shs_tier_yearly_consumption: endogenous.yearly_consumption.shs.value(),
            grid_capped_yearly_consumption: endogenous.capped_yearly_consumption.grid.value(),
            mg_capped_yearly_consumption: endogenous.capped_yearly_consumption.mg.value(),
            shs_capped_yearly_consumption: endogenous.capped_yearly_consumption.shs.value(),
            grid_peak_demand: endogenous.peak_demand.grid.value(),
            mg_peak_demand: endogenous.peak_demand.mg.value(),
            shs_unit_av_capacity: endogenous.peak_demand.shs.value(),
            grid_step_up_capacity: endogenous.step_up_capacity.grid.value(),
            mg_step_up_capacity: endogenous.step_up_capacity.mg.value(),
            shs_step_up_capacity: endogenous.step_up_capacity.shs.value(),
            pop_get_grid_2030: allocation.pop_get.grid,
            pop_get_mg_2030: allocation.pop_get.mg,
            pop_get_shs_2030: allocation.pop_get.shs,
            pop_no_access_2030: allocation.pop_no_access,
            hh_get_grid_2030: results.households.grid.value(),
            hh_get_mg_2030: results.households.mg.value(),
            hh_get_shs_2030: results.households.shs.value(),
            hh_no_access_2030: results.households_no_access.value(),
            hh_grid_capacity: results.capacity.grid.value(),
            hh_mg_capacity: results.capacity.mg.value(),
            hh_shs_capacity: results.capacity.shs.value(),
            hh_cap_scn2_grid_capacity: results.capped_capacity.grid.value(),
            hh_cap_scn2_mg_capacity: results.capped_capacity.mg.value(),
            hh_cap_scn2_shs_capacity: results.capped_capacity.shs.value(),
            grid_investment_cost: results.investment_cost.grid.value(),
            mg_investment_cost: results.investment_cost.mg.value(),
            shs_investment_cost: results.investment_cost.shs.value(),
            tier_capped_grid_investment_cost: results.capped_investment_cost.grid.value(),
            tier_capped_mg_investment_cost: results.capped_investment_cost.mg.value(),
            tier_capped_shs_investment_cost: results.capped_investment_cost.shs.value(),
            ghg_grid_2030: results.ghg.rate_2030.grid.value(),
            ghg_mg_2030: results.ghg.rate_2030.mg.value(),
            ghg_shs_2030: results.ghg.rate_2030.shs.value(),
            ghg_no_access_2030: results.ghg.rate_2030_no_access.value(),
            ghg_grid_cumul: results.ghg.cumul.grid.value(),
            ghg_mg_cumul: results.ghg.cumul.mg.value(),
            ghg_shs_cumul: results.ghg.cumul.shs.value(),
            ghg_no_access_cumul: results.ghg.cumul_no_access.value(),
            ghg_tot_cumul: results.ghg.total_cumul().value(),
            tier_capped_ghg_grid_cumul: results.capped_ghg.cumul.grid.value(),
            tier_capped_ghg_mg_cumul: results.capped_ghg.cumul.mg.value(),
            tier_capped_ghg_shs_cumul: results.capped_ghg.cumul.shs.value(),
            tier_capped_ghg_no_access_cumul: results.capped_ghg.cumul_no_access.value(),
            tier_capped_ghg_tot_cumul: results.capped_ghg.total_cumul().value(),
            ghg_grid_er_cumul: er(&results.ghg_er, |er| er.cumul.grid),
            ghg_mg_er_cumul: er(&results.ghg_er, |er| er.cumul.mg),
            ghg_shs_er_cumul: er(&results.ghg_er, |er| er.cumul.shs),
            ghg_no_access_er_cumul: er(&results.ghg_er, |er| er.no_access),
            ghg_tot_er_cumul: er(&results.ghg_er, |er| er.total),
            tier_capped_ghg_grid_er_cumul: er(&results.capped_ghg_er, |er| er.cumul.grid),
            tier_capped_ghg_mg_er_cumul: er(&results.capped_ghg_er, |er| er.cumul.mg),
            tier_capped_ghg_shs_er_cumul: er(&results.capped_ghg_er, |er| er.cumul.shs),
            tier_capped_ghg_no_access_er_cumul: er(&results.capped_ghg_er, |er| er.no_access),
            tier_capped_ghg_tot_er_cumul: er(&results.capped_ghg_er, |er| er.total),
        }
    }
}

/// Write the results of a scenario to a CSV file and a JSON file (an array of records, one per
/// country).
///
/// # Arguments
///
/// * `output_dir` - Folder where files will be saved
/// * `table` - The results to write
pub fn write_scenario_results(output_dir: &Path, table: &ScenarioResultTable) -> Result<()> {
    let rows: Vec<_> = table.rows.values().map(ScenarioResultRow::new).collect();

    let csv_path = output_dir.join(results_file_name(table.kind, "csv"));
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("Could not create {}", csv_path.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let json_path = output_dir.join(results_file_name(table.kind, "json"));
    let file = File::create(&json_path)
        .with_context(|| format!("Could not create {}", json_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &rows)?;

    Ok(())
}

//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{deserialise_proportion, input_err_msg, read_toml};
use crate::tier::TierLevel;
use crate::units::{EmissionsPerEnergy, MoneyPerHousehold, MoneyPerPower};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_drive_weight, f64, 1.0);
define_unit_param_default!(default_grid_cost_per_household, MoneyPerHousehold, 2500.0);
define_unit_param_default!(default_emission_factor_mg, EmissionsPerEnergy, 0.2);
define_unit_param_default!(default_emission_factor_shs, EmissionsPerEnergy, 0.0);
define_unit_param_default!(default_emission_factor_no_access, EmissionsPerEnergy, 6.8);
define_param_default!(default_mg_low_tier, TierLevel, TierLevel::MIN.next());
define_param_default!(default_mg_high_tier, TierLevel, TierLevel::default());
define_unit_param_default!(default_mg_low_cost_per_kw, MoneyPerPower, 4000.0);
define_unit_param_default!(default_mg_high_cost_per_kw, MoneyPerPower, 3700.0);

/// Represents the contents of the entire model file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// The minimum TIER level households are assumed to reach
    #[serde(default)]
    pub min_tier_level: TierLevel,
    /// Blend between RISE-driven (1) and socio-economic-driven (0) shifts
    #[serde(default = "default_drive_weight")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub drive_weight: f64,
    /// Investment cost of connecting one household to the grid
    #[serde(default = "default_grid_cost_per_household")]
    pub grid_investment_cost_per_household: MoneyPerHousehold,
    /// Reference points for the mini-grid cost curve
    #[serde(default)]
    pub mini_grid_cost: MiniGridCostParameters,
    /// Emission factor of mini-grids (kgCO2/kWh)
    #[serde(default = "default_emission_factor_mg")]
    pub emission_factor_mg: EmissionsPerEnergy,
    /// Emission factor of solar home systems (kgCO2/kWh)
    #[serde(default = "default_emission_factor_shs")]
    pub emission_factor_shs: EmissionsPerEnergy,
    /// Emission factor for households without access (kgCO2 per kWh-equivalent)
    #[serde(default = "default_emission_factor_no_access")]
    pub emission_factor_no_access: EmissionsPerEnergy,
}

/// Median mini-grid investment costs at two reference TIER levels.
///
/// The cost per kW is assumed to vary linearly with peak demand between (and beyond) the rated
/// capacities of the two levels.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MiniGridCostParameters {
    /// The lower reference TIER level
    #[serde(default = "default_mg_low_tier")]
    pub low_tier: TierLevel,
    /// Median investment cost per kW at the lower level
    #[serde(default = "default_mg_low_cost_per_kw")]
    pub low_cost_per_kw: MoneyPerPower,
    /// The higher reference TIER level
    #[serde(default = "default_mg_high_tier")]
    pub high_tier: TierLevel,
    /// Median investment cost per kW at the higher level
    #[serde(default = "default_mg_high_cost_per_kw")]
    pub high_cost_per_kw: MoneyPerPower,
}

impl Default for MiniGridCostParameters {
    fn default() -> Self {
        Self {
            low_tier: default_mg_low_tier(),
            low_cost_per_kw: default_mg_low_cost_per_kw(),
            high_tier: default_mg_high_tier(),
            high_cost_per_kw: default_mg_high_cost_per_kw(),
        }
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            min_tier_level: TierLevel::default(),
            drive_weight: default_drive_weight(),
            grid_investment_cost_per_household: default_grid_cost_per_household(),
            mini_grid_cost: MiniGridCostParameters::default(),
            emission_factor_mg: default_emission_factor_mg(),
            emission_factor_shs: default_emission_factor_shs(),
            emission_factor_no_access: default_emission_factor_no_access(),
        }
    }
}

/// Check that a cost parameter is valid
fn check_cost(value: f64, name: &str) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "{name} must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that an emission factor is valid
fn check_emission_factor(value: EmissionsPerEnergy, name: &str) -> Result<()> {
    ensure!(
        value.is_finite() && value >= EmissionsPerEnergy(0.0),
        "{name} must be a finite number which is not negative"
    );

    Ok(())
}

/// Check the mini-grid cost reference points are valid
fn check_mini_grid_cost(params: &MiniGridCostParameters) -> Result<()> {
    ensure!(
        params.low_tier < params.high_tier,
        "mini_grid_cost.low_tier must be lower than mini_grid_cost.high_tier"
    );
    check_cost(
        params.low_cost_per_kw.value(),
        "mini_grid_cost.low_cost_per_kw",
    )?;
    check_cost(
        params.high_cost_per_kw.value(),
        "mini_grid_cost.high_cost_per_kw",
    )?;

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// If the file is not present, default values are used.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Folder containing the input data files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(data_dir: P) -> Result<ModelParameters> {
        let file_path = data_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        if !file_path.is_file() {
            return Ok(ModelParameters::default());
        }

        let model_params: ModelParameters = read_toml(&file_path)?;
        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        // min_tier_level and drive_weight are already validated on deserialisation

        check_cost(
            self.grid_investment_cost_per_household.value(),
            "grid_investment_cost_per_household",
        )?;
        check_mini_grid_cost(&self.mini_grid_cost)?;
        check_emission_factor(self.emission_factor_mg, "emission_factor_mg")?;
        check_emission_factor(self.emission_factor_shs, "emission_factor_shs")?;
        check_emission_factor(self.emission_factor_no_access, "emission_factor_no_access")?;

        Ok(())
    }
}

//! The loaded input data for a scenario computation session.
use crate::country::CountryMap;
use crate::input::load_model;
use crate::reference::ReferenceTables;
use anyhow::Result;
use std::path::Path;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Parameters from the model file
    pub parameters: ModelParameters,
    /// Reference tables shared by all scenarios
    pub reference: ReferenceTables,
    /// Survey data for each country
    pub countries: CountryMap,
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Folder containing the input data files
    pub fn from_path<P: AsRef<Path>>(data_dir: P) -> Result<Model> {
        load_model(data_dir)
    }
}

//! Common routines for handling input data.
use crate::model::Model;
use anyhow::{Context, Result, bail, ensure};
use itertools::Itertools;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

mod bau;
use bau::read_bau_shares;
mod country;
use country::read_countries;
mod rise;
pub use rise::read_rise_answers;
use rise::read_rise_catalog;
mod shs;
use shs::{read_shs_cost_per_kw, read_shs_unit_capacities};

use crate::model::parameters::ModelParameters;
use crate::reference::ReferenceTables;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }
    Ok(vec.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Check that a value is a proportion between 0 and 1 (inclusive)
pub fn check_proportion(value: f64, name: &str) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&value),
        "{name} must be between 0 and 1 (got {value})"
    );
    Ok(())
}

/// Check that a value is a score between 0 and 100 (inclusive)
pub fn check_score(value: f64, name: &str) -> Result<()> {
    ensure!(
        (0.0..=100.0).contains(&value),
        "{name} must be between 0 and 100 (got {value})"
    );
    Ok(())
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Deserialize::deserialize(deserialiser)?;
    check_proportion(value, "Value").map_err(serde::de::Error::custom)?;

    Ok(value)
}

/// Load the reference tables from the data directory.
///
/// # Arguments
///
/// * `data_dir` - Folder containing the input data files
pub fn load_reference_tables(data_dir: &Path) -> Result<ReferenceTables> {
    let bau_shares = read_bau_shares(data_dir)?;
    let shs_unit_capacity = read_shs_unit_capacities(data_dir)?;
    let shs_cost_per_kw = read_shs_cost_per_kw(data_dir)?;
    let rise_catalog = read_rise_catalog(data_dir)?;

    Ok(ReferenceTables {
        bau_shares,
        shs_unit_capacity,
        shs_cost_per_kw,
        rise_catalog,
    })
}

/// Load the input data from the specified directory.
///
/// # Arguments
///
/// * `data_dir` - Folder containing the input data files
///
/// # Returns
///
/// The loaded [`Model`] or an error if any of the files is invalid.
pub fn load_model<P: AsRef<Path>>(data_dir: P) -> Result<Model> {
    let data_dir = data_dir.as_ref();
    let parameters = ModelParameters::from_path(data_dir)?;
    let reference = load_reference_tables(data_dir)?;
    let countries = read_countries(data_dir, &reference)?;

    Ok(Model {
        parameters,
        reference,
        countries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Proportion {
        #[serde(deserialize_with = "deserialise_proportion")]
        value: f64,
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value\nhello,1\n world , 2").unwrap();
        }

        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".into(),
                    value: 1
                },
                Record {
                    id: "world".into(),
                    value: 2
                }
            ]
        );
    }

    #[test]
    fn test_read_csv_empty() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value").unwrap();
        }

        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id = \"hello\"\nvalue = 1").unwrap();
        }

        assert_eq!(
            read_toml::<Record>(&file_path).unwrap(),
            Record {
                id: "hello".into(),
                value: 1
            }
        );

        // Missing file
        assert!(read_toml::<Record>(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_deserialise_proportion() {
        let parse = |s: &str| toml::from_str::<Proportion>(s);
        assert_eq!(parse("value = 0.5").unwrap().value, 0.5);
        assert_eq!(parse("value = 1.0").unwrap().value, 1.0);
        assert!(parse("value = 1.5").is_err());
        assert!(parse("value = -0.1").is_err());
    }

    #[test]
    fn test_check_score() {
        assert!(check_score(0.0, "score").is_ok());
        assert!(check_score(100.0, "score").is_ok());
        assert!(check_score(100.1, "score").is_err());
        assert!(check_score(f64::NAN, "score").is_err());
    }
}

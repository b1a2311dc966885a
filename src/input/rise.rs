//! Code for reading the RISE sub-indicator catalog and sub-indicator answers.
use super::*;
use crate::rise::{RiseAnswer, RiseCatalog};
use crate::technology::Technology;
use serde::Deserialize;

const RISE_CATALOG_FILE_NAME: &str = "rise_sub_indicators.csv";

#[derive(Debug, PartialEq, Deserialize)]
struct RiseSubIndicatorRaw {
    technology: Technology,
    indicator: String,
    sub_indicator: String,
}

/// Read the RISE sub-indicator catalog from the data directory.
///
/// The file also has a free-text `description` column, which is only of interest to people
/// editing answers and is ignored here.
pub fn read_rise_catalog(data_dir: &Path) -> Result<RiseCatalog> {
    let file_path = data_dir.join(RISE_CATALOG_FILE_NAME);
    let iter = read_csv(&file_path)?;
    read_rise_catalog_from_iter(iter).with_context(|| input_err_msg(&file_path))
}

fn read_rise_catalog_from_iter<I>(iter: I) -> Result<RiseCatalog>
where
    I: Iterator<Item = RiseSubIndicatorRaw>,
{
    let mut catalog = RiseCatalog::default();
    for raw in iter {
        catalog.insert(raw.technology, &raw.indicator, &raw.sub_indicator)?;
    }

    Ok(catalog)
}

/// Read a set of RISE sub-indicator answers from a CSV file.
///
/// The file has the columns `technology`, `sub_indicator` and `score`.
pub fn read_rise_answers(file_path: &Path) -> Result<Vec<RiseAnswer>> {
    Ok(read_csv(file_path)?.collect())
}

//! Code for reading the regional BaU technology shares.
use super::*;
use crate::reference::RegionalShares;
use crate::region::RegionID;
use crate::technology::PerTechnology;
use crate::units::Dimensionless;
use indexmap::IndexMap;
use serde::Deserialize;

const BAU_SHARES_FILE_NAME: &str = "bau_shares.csv";

#[derive(Debug, PartialEq, Deserialize)]
struct RegionalSharesRaw {
    region: String,
    #[serde(deserialize_with = "deserialise_proportion")]
    grid: f64,
    #[serde(deserialize_with = "deserialise_proportion")]
    mg: f64,
    #[serde(deserialize_with = "deserialise_proportion")]
    shs: f64,
    #[serde(deserialize_with = "deserialise_proportion")]
    iea_coverage: f64,
}

/// Read the BaU technology shares from the data directory.
///
/// # Arguments
///
/// * `data_dir` - Folder containing the input data files
///
/// # Returns
///
/// The shares for each region
pub fn read_bau_shares(data_dir: &Path) -> Result<IndexMap<RegionID, RegionalShares>> {
    let file_path = data_dir.join(BAU_SHARES_FILE_NAME);
    let iter = read_csv(&file_path)?;
    read_bau_shares_from_iter(iter).with_context(|| input_err_msg(&file_path))
}

fn read_bau_shares_from_iter<I>(iter: I) -> Result<IndexMap<RegionID, RegionalShares>>
where
    I: Iterator<Item = RegionalSharesRaw>,
{
    let mut map = IndexMap::new();
    for raw in iter {
        let total = raw.grid + raw.mg + raw.shs;
        ensure!(
            total <= 1.0 + 1e-6,
            "Shares for region {} sum to more than one ({total})",
            raw.region
        );

        let shares = RegionalShares {
            shares: PerTechnology::new(raw.grid, raw.mg, raw.shs).map(|s| Dimensionless(*s)),
            iea_coverage: Dimensionless(raw.iea_coverage),
        };
        ensure!(
            map.insert(RegionID::from(raw.region.as_str()), shares)
                .is_none(),
            "Duplicate entry for region {}",
            raw.region
        );
    }

    Ok(map)
}

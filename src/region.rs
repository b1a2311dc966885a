//! Regions group countries for the purpose of looking up reference data.
use crate::country::CountryRecord;
use crate::error::EngineError;
use crate::id::define_id_type;
use indexmap::IndexMap;

define_id_type! {RegionID}

/// Look up the entry for a country's region in a reference table.
///
/// # Arguments
///
/// * `table` - The reference table, keyed by region
/// * `table_name` - Name of the table, for error messages
/// * `country` - The country whose region should be looked up
///
/// # Returns
///
/// The entry for the region or [`EngineError::UnresolvedRegionLookup`] if there is none.
pub fn lookup_region<'a, V>(
    table: &'a IndexMap<RegionID, V>,
    table_name: &'static str,
    country: &CountryRecord,
) -> Result<&'a V, EngineError> {
    table
        .get(&country.region)
        .ok_or_else(|| EngineError::UnresolvedRegionLookup {
            table: table_name,
            region: country.region.to_string(),
            country: country.country_iso.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::country;
    use indexmap::indexmap;
    use rstest::rstest;

    #[rstest]
    fn test_lookup_region(country: CountryRecord) {
        let table = indexmap! {country.region.clone() => 1.0};
        assert_eq!(lookup_region(&table, "test", &country), Ok(&1.0));
    }

    #[rstest]
    fn test_lookup_region_missing(mut country: CountryRecord) {
        country.region = "NOWHERE".into();
        let table: IndexMap<RegionID, f64> = indexmap! {"SSA".into() => 1.0};
        assert_eq!(
            lookup_region(&table, "test", &country),
            Err(EngineError::UnresolvedRegionLookup {
                table: "test",
                region: "NOWHERE".into(),
                country: country.country_iso.to_string(),
            })
        );
    }
}

//! Reference tables which are loaded once and shared, read-only, by every scenario computation.
use crate::country::CountryRecord;
use crate::error::EngineError;
use crate::region::{RegionID, lookup_region};
use crate::rise::RiseCatalog;
use crate::technology::PerTechnology;
use crate::units::{Dimensionless, MoneyPerPower, PowerPerHousehold};
use indexmap::IndexMap;

/// Countries whose IEA coverage factor differs from that of their region
const IEA_COVERAGE_OVERRIDES: [(&str, f64); 3] = [("IND", 1.0), ("IDN", 1.0), ("YEM", 0.95)];

/// BaU technology shares and IEA coverage for one region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalShares {
    /// Share of the newly-electrified population going to each technology
    pub shares: PerTechnology<Dimensionless>,
    /// Fraction of the newly-electrified population the IEA projections cover
    pub iea_coverage: Dimensionless,
}

/// The reference tables used by the allocator and the results extractor
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTables {
    /// BaU technology shares, by region
    pub bau_shares: IndexMap<RegionID, RegionalShares>,
    /// Sales-weighted average SHS unit capacity, by region
    pub shs_unit_capacity: IndexMap<RegionID, PowerPerHousehold>,
    /// Average investment cost of solar home systems
    pub shs_cost_per_kw: MoneyPerPower,
    /// The structure of the RISE sub-indicators
    pub rise_catalog: RiseCatalog,
}

impl ReferenceTables {
    /// The BaU shares for a country's region
    pub fn bau_shares_for(&self, country: &CountryRecord) -> Result<&RegionalShares, EngineError> {
        lookup_region(&self.bau_shares, "BaU shares", country)
    }

    /// The IEA coverage factor for a country.
    ///
    /// This is the coverage of the country's region, unless the country has its own value.
    pub fn iea_coverage_for(&self, country: &CountryRecord) -> Result<Dimensionless, EngineError> {
        let overridden = IEA_COVERAGE_OVERRIDES
            .iter()
            .find(|(iso, _)| *iso == &*country.country_iso.0);
        if let Some((_, coverage)) = overridden {
            return Ok(Dimensionless(*coverage));
        }

        Ok(self.bau_shares_for(country)?.iea_coverage)
    }

    /// The average SHS unit capacity for a country's region
    pub fn shs_unit_capacity_for(
        &self,
        country: &CountryRecord,
    ) -> Result<PowerPerHousehold, EngineError> {
        lookup_region(&self.shs_unit_capacity, "SHS unit capacity", country).copied()
    }
}

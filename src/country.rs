//! Countries are the unit for which scenarios are computed.
use crate::id::define_id_type;
use crate::region::RegionID;
use crate::technology::{PerTechnology, Technology};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

define_id_type! {CountryID}

/// A map of [`CountryRecord`]s, keyed by ISO3 code
pub type CountryMap = IndexMap<CountryID, CountryRecord>;

/// Survey and framework data for one country.
///
/// Population counts are for the whole country; consumption is per household.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CountryRecord {
    /// ISO3 code (e.g. "KEN")
    pub country_iso: CountryID,
    /// Display name (e.g. "Kenya")
    pub country: String,
    /// The geographic region the country belongs to
    pub region: RegionID,
    /// Population in 2017
    pub pop_2017: f64,
    /// Projected population in 2030
    pub pop_2030: f64,
    /// Share of the population without electricity access in 2017
    pub dark_rate: f64,
    /// Share of the population with electricity access in 2017
    pub electrification_rate: f64,
    /// Average household size
    pub hh_av_size: f64,
    /// Yearly electricity consumption of a household (kWh)
    pub hh_yearly_electricity_consumption: f64,
    /// Share of households served by the grid
    pub hh_grid_share: f64,
    /// Share of households served by mini-grids
    pub hh_mg_share: f64,
    /// Share of households served by solar home systems
    pub hh_shs_share: f64,
    /// Share of the newly-electrified population expected on the grid
    pub pop_grid_share: f64,
    /// Share of the newly-electrified population expected on mini-grids
    pub pop_mg_share: f64,
    /// Share of the newly-electrified population expected on solar home systems
    pub pop_shs_share: f64,
    /// RISE score for the grid (0 to 100)
    pub rise_grid: f64,
    /// RISE score for mini-grids (0 to 100)
    pub rise_mg: f64,
    /// RISE score for solar home systems (0 to 100)
    pub rise_shs: f64,
    /// GDP per capita (USD)
    pub gdp_per_capita: f64,
    /// Mobile money account ownership in 2014 (% of adults)
    pub mobile_money_2014: f64,
    /// Mobile money account ownership in 2017 (% of adults)
    pub mobile_money_2017: f64,
    /// Ease of doing business score (0 to 100)
    pub ease_doing_business_index: f64,
    /// Corruption perception score (0 to 100, higher is cleaner)
    pub corruption_index: f64,
    /// Grid weakness score (0 to 100, higher is weaker)
    pub weak_grid_index: f64,
    /// Carbon intensity of the grid (gCO2/kWh)
    pub grid_emission_factor: f64,
}

impl CountryRecord {
    /// The RISE scores for the three technologies
    pub fn rise_scores(&self) -> PerTechnology<f64> {
        PerTechnology::new(self.rise_grid, self.rise_mg, self.rise_shs)
    }

    /// Overwrite the RISE score for one technology
    pub fn set_rise_score(&mut self, tech: Technology, score: f64) {
        match tech {
            Technology::Grid => self.rise_grid = score,
            Technology::MiniGrid => self.rise_mg = score,
            Technology::Shs => self.rise_shs = score,
        }
    }

    /// Share of the newly-electrified population expected on each technology
    pub fn pop_shares(&self) -> PerTechnology<f64> {
        PerTechnology::new(self.pop_grid_share, self.pop_mg_share, self.pop_shs_share)
    }

    /// Share of households served by each technology
    pub fn hh_shares(&self) -> PerTechnology<f64> {
        PerTechnology::new(self.hh_grid_share, self.hh_mg_share, self.hh_shs_share)
    }

    /// Scores (0 to 100) for how favourable the socio-economic context is to each technology
    pub fn socio_economic_scores(&self) -> PerTechnology<f64> {
        PerTechnology::new(
            (self.ease_doing_business_index + self.corruption_index + 100.0
                - self.weak_grid_index)
                / 3.0,
            (self.ease_doing_business_index + self.corruption_index + self.weak_grid_index) / 3.0,
            (self.mobile_money_2017 + self.weak_grid_index) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::country;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_set_rise_score(mut country: CountryRecord) {
        country.set_rise_score(Technology::MiniGrid, 100.0);
        assert_eq!(country.rise_scores().mg, 100.0);
        assert_eq!(country.rise_scores().grid, country.rise_grid);
    }

    #[rstest]
    fn test_socio_economic_scores(mut country: CountryRecord) {
        country.ease_doing_business_index = 60.0;
        country.corruption_index = 30.0;
        country.weak_grid_index = 40.0;
        country.mobile_money_2017 = 80.0;

        let scores = country.socio_economic_scores();
        assert_approx_eq!(f64, scores.grid, 50.0);
        assert_approx_eq!(f64, scores.mg, 130.0 / 3.0);
        assert_approx_eq!(f64, scores.shs, 60.0);
    }
}

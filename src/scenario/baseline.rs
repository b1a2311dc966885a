//! An in-memory cache of BaU results, against which emission reductions are measured.
use super::ScenarioKind;
use super::results::{GhgFigures, ScenarioResultTable};
use crate::country::CountryID;
use crate::error::EngineError;
use indexmap::IndexMap;

/// The BaU emissions for one country
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineEmissions {
    /// Emissions at the households' actual TIER level
    pub ghg: GhgFigures,
    /// Emissions if every household reached one TIER level higher
    pub capped_ghg: GhgFigures,
}

/// BaU results for the current session.
///
/// Empty until the BaU scenario has been run.
#[derive(Debug, Clone, Default)]
pub struct BaselineCache(Option<IndexMap<CountryID, BaselineEmissions>>);

impl BaselineCache {
    /// Store the emissions from a BaU result table, replacing anything stored before
    pub fn store(&mut self, table: &ScenarioResultTable) {
        let emissions = table
            .rows
            .iter()
            .map(|(iso, row)| {
                let baseline = BaselineEmissions {
                    ghg: row.results.ghg.clone(),
                    capped_ghg: row.results.capped_ghg.clone(),
                };
                (iso.clone(), baseline)
            })
            .collect();
        self.0 = Some(emissions);
    }

    /// Whether BaU results have been stored
    pub fn is_populated(&self) -> bool {
        self.0.is_some()
    }

    /// Get the BaU emissions for a country.
    ///
    /// # Arguments
    ///
    /// * `scenario` - The scenario requesting the baseline (used in error messages)
    /// * `country` - The country whose baseline is wanted
    pub fn get(
        &self,
        scenario: ScenarioKind,
        country: &CountryID,
    ) -> Result<&BaselineEmissions, EngineError> {
        let emissions = self
            .0
            .as_ref()
            .ok_or_else(|| EngineError::MissingScenarioDependency {
                scenario: scenario.to_string(),
                country: None,
            })?;

        emissions
            .get(country)
            .ok_or_else(|| EngineError::MissingScenarioDependency {
                scenario: scenario.to_string(),
                country: Some(country.to_string()),
            })
    }
}

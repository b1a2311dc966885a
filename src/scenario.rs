//! Running scenarios.
//!
//! A scenario run derives the endogenous variables for each country, allocates the
//! newly-electrified population according to the scenario's rule and then derives costs and
//! emissions from the allocation. BaU has to be run first in a session, because the emission
//! reductions of every other scenario are measured against it.
use crate::country::CountryMap;
use crate::error::EngineError;
use crate::id::IDCollection;
use crate::model::Model;
use crate::tier::TierLevel;
use anyhow::{Context, Result};
use indexmap::indexmap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub mod allocation;
pub mod baseline;
use baseline::BaselineCache;
pub mod endogenous;
use endogenous::prepare_endogenous_variables;
pub mod flex;
use flex::FlexEditState;
pub mod results;
use results::{ScenarioResultTable, extract_results_scenario};
pub mod shift;

/// The scenarios which can be run
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Business as usual, following the IEA regional projections
    Bau,
    /// SE4ALL, with shifts driven by regulatory quality
    Se4all,
    /// SE4ALL with live edits to one country's inputs
    #[strum(serialize = "se4all_flex")]
    #[serde(rename = "se4all_flex")]
    Se4allFlex,
    /// Progressive off-grid: SE4ALL with the best possible off-grid regulation
    Prog,
}

impl ScenarioKind {
    /// Parse a scenario identifier (`bau`, `se4all`, `se4all_flex` or `prog`)
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        name.parse()
            .map_err(|_| EngineError::UnknownScenarioKind(name.to_string()))
    }
}

/// The settings a run uses which can differ from the model's
struct RunSettings {
    min_tier_level: TierLevel,
    drive_weight: f64,
}

/// A computation session: the loaded model and the BaU results computed so far
#[derive(Debug, Clone)]
pub struct ScenarioSession {
    model: Model,
    baseline: BaselineCache,
}

impl ScenarioSession {
    /// Start a session for a model
    pub fn new(model: Model) -> Self {
        Self {
            model,
            baseline: BaselineCache::default(),
        }
    }

    /// The model this session runs
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The BaU results stored so far
    pub fn baseline(&self) -> &BaselineCache {
        &self.baseline
    }

    /// Run a scenario for every country.
    ///
    /// The results of a BaU run are kept as the baseline for later runs.
    pub fn run(&mut self, kind: ScenarioKind) -> Result<ScenarioResultTable> {
        info!("Running scenario {kind}");
        let settings = RunSettings {
            min_tier_level: self.model.parameters.min_tier_level,
            drive_weight: self.model.parameters.drive_weight,
        };
        let table = self.run_for(kind, &self.model.countries, &settings)?;

        if kind == ScenarioKind::Bau {
            self.baseline.store(&table);
        }

        Ok(table)
    }

    /// Rerun the flexible SE4ALL scenario for one country with some of its inputs edited.
    ///
    /// # Arguments
    ///
    /// * `country_iso` - ISO3 code of the country
    /// * `edit` - The values to override
    pub fn run_flex(
        &self,
        country_iso: &str,
        edit: &FlexEditState,
    ) -> Result<ScenarioResultTable> {
        edit.validate()?;
        let iso = self
            .model
            .countries
            .get_id(country_iso)
            .with_context(|| format!("Cannot run flex scenario for {country_iso}"))?;
        info!("Running scenario {} for {iso}", ScenarioKind::Se4allFlex);

        let mut record = self.model.countries[&iso].clone();
        edit.apply(&mut record);
        let settings = RunSettings {
            min_tier_level: edit
                .min_tier_level
                .unwrap_or(self.model.parameters.min_tier_level),
            drive_weight: edit
                .drive_weight
                .unwrap_or(self.model.parameters.drive_weight),
        };

        self.run_for(
            ScenarioKind::Se4allFlex,
            &indexmap! {iso => record},
            &settings,
        )
    }

    /// Run the pipeline for a set of countries
    fn run_for(
        &self,
        kind: ScenarioKind,
        countries: &CountryMap,
        settings: &RunSettings,
    ) -> Result<ScenarioResultTable> {
        let reference = &self.model.reference;
        let prepared = prepare_endogenous_variables(countries, reference, settings.min_tier_level)?;
        debug!(
            "Prepared endogenous variables for {} countries (minimum TIER level {})",
            prepared.len(),
            settings.min_tier_level
        );

        let allocations =
            allocation::allocate_scenario(kind, &prepared, reference, settings.drive_weight)?;
        extract_results_scenario(
            kind,
            &prepared,
            allocations,
            reference,
            &self.model.parameters,
            &self.baseline,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model;
    use rstest::rstest;

    #[rstest]
    #[case("bau", ScenarioKind::Bau)]
    #[case("se4all", ScenarioKind::Se4all)]
    #[case("se4all_flex", ScenarioKind::Se4allFlex)]
    #[case("prog", ScenarioKind::Prog)]
    fn test_scenario_kind_from_name(#[case] name: &str, #[case] expected: ScenarioKind) {
        assert_eq!(ScenarioKind::from_name(name), Ok(expected));
        assert_eq!(expected.to_string(), name);
    }

    #[test]
    fn test_scenario_kind_unknown() {
        assert_eq!(
            ScenarioKind::from_name("SE4ALL"),
            Err(EngineError::UnknownScenarioKind("SE4ALL".into()))
        );
    }

    #[rstest]
    fn test_run_requires_bau(model: Model) {
        let mut session = ScenarioSession::new(model);
        let err = session.run(ScenarioKind::Prog).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::MissingScenarioDependency { country: None, .. })
        ));

        session.run(ScenarioKind::Bau).unwrap();
        assert!(session.baseline().is_populated());
        let table = session.run(ScenarioKind::Prog).unwrap();
        assert!(table.rows["KEN"].results.ghg_er.is_some());
    }

    #[rstest]
    fn test_run_flex_unedited(model: Model) {
        let mut session = ScenarioSession::new(model);
        session.run(ScenarioKind::Bau).unwrap();
        let se4all = session.run(ScenarioKind::Se4all).unwrap();
        let flex = session.run_flex("KEN", &FlexEditState::default()).unwrap();

        assert_eq!(flex.kind, ScenarioKind::Se4allFlex);
        assert_eq!(flex.rows.len(), 1);
        assert_eq!(flex.rows["KEN"].results, se4all.rows["KEN"].results);
    }

    #[rstest]
    fn test_run_flex_edited(model: Model) {
        let mut session = ScenarioSession::new(model);
        session.run(ScenarioKind::Bau).unwrap();
        let edit = FlexEditState {
            rise_grid: Some(10.0),
            rise_mg: Some(100.0),
            rise_shs: Some(100.0),
            min_tier_level: Some(TierLevel::MAX),
            drive_weight: Some(1.0),
        };
        let flex = session.run_flex("KEN", &edit).unwrap();
        let row = &flex.rows["KEN"];

        assert_eq!(row.record.rise_mg, 100.0);
        assert!(row.allocation.pop_get.grid < row.endogenous.pop_newly_electrified_2030 * 0.7);
        assert_eq!(
            row.endogenous.yearly_consumption.mg,
            TierLevel::MAX.min_annual_consumption()
        );

        // The session's own data is untouched
        assert_eq!(session.model().countries["KEN"].rise_mg, 45.0);
    }

    #[rstest]
    fn test_run_flex_unknown_country(model: Model) {
        let session = ScenarioSession::new(model);
        assert!(session.run_flex("XXX", &FlexEditState::default()).is_err());
    }
}

//! Live edits to one country's inputs for the flexible SE4ALL scenario.
use crate::country::CountryRecord;
use crate::input::{check_proportion, check_score};
use crate::rise::{RiseAnswer, RiseCatalog};
use crate::technology::{PerTechnology, Technology};
use crate::tier::TierLevel;
use anyhow::Result;

/// Values overriding a country's inputs.
///
/// Fields which are `None` keep the country's (or the model's) value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlexEditState {
    /// RISE score for the grid
    pub rise_grid: Option<f64>,
    /// RISE score for mini-grids
    pub rise_mg: Option<f64>,
    /// RISE score for solar home systems
    pub rise_shs: Option<f64>,
    /// Minimum TIER level
    pub min_tier_level: Option<TierLevel>,
    /// Weight of the RISE-driven shift
    pub drive_weight: Option<f64>,
}

impl FlexEditState {
    /// The overridden RISE scores
    pub fn rise_scores(&self) -> PerTechnology<Option<f64>> {
        PerTechnology::new(self.rise_grid, self.rise_mg, self.rise_shs)
    }

    fn rise_score_mut(&mut self, tech: Technology) -> &mut Option<f64> {
        match tech {
            Technology::Grid => &mut self.rise_grid,
            Technology::MiniGrid => &mut self.rise_mg,
            Technology::Shs => &mut self.rise_shs,
        }
    }

    /// Check that the overridden values are in range
    pub fn validate(&self) -> Result<()> {
        for (tech, score) in self.rise_scores().iter() {
            if let Some(score) = score {
                check_score(*score, &format!("rise_{tech}"))?;
            }
        }
        if let Some(drive_weight) = self.drive_weight {
            check_proportion(drive_weight, "drive_weight")?;
        }

        Ok(())
    }

    /// Fill in RISE scores computed from sub-indicator answers.
    ///
    /// Scores which have already been set are kept.
    pub fn add_rise_answers(
        &mut self,
        catalog: &RiseCatalog,
        answers: &[RiseAnswer],
    ) -> Result<()> {
        let scores = catalog.scores_from_answers(answers)?;
        for (tech, score) in scores.iter() {
            let current = self.rise_score_mut(tech);
            if current.is_none() {
                *current = *score;
            }
        }

        Ok(())
    }

    /// Overwrite a country's RISE scores with the edited ones
    pub fn apply(&self, record: &mut CountryRecord) {
        for (tech, score) in self.rise_scores().iter() {
            if let Some(score) = score {
                record.set_rise_score(tech, *score);
            }
        }
    }
}

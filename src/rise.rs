//! The RISE (Regulatory Indicators for Sustainable Energy) sub-indicator catalog.
//!
//! Each technology's RISE score is built from a handful of indicators, which are themselves
//! groups of sub-indicator questions. The catalog records this structure so that a RISE score can
//! be recomputed from a set of edited sub-indicator answers.
use crate::technology::{PerTechnology, Technology};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;

/// The sub-indicators of one indicator, in catalog order
pub type SubIndicators = Vec<String>;

/// The indicators for one technology
pub type IndicatorMap = IndexMap<String, SubIndicators>;

/// An answer to a RISE sub-indicator question, scored from 0 to 100
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RiseAnswer {
    /// The technology the sub-indicator belongs to
    pub technology: Technology,
    /// The sub-indicator being answered
    pub sub_indicator: String,
    /// The score given
    pub score: f64,
}

/// The grouping of RISE sub-indicators, by technology and indicator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RiseCatalog(PerTechnology<IndicatorMap>);

impl RiseCatalog {
    /// Add a sub-indicator to the catalog
    pub fn insert(
        &mut self,
        technology: Technology,
        indicator: &str,
        sub_indicator: &str,
    ) -> Result<()> {
        ensure!(
            self.find_indicator(technology, sub_indicator).is_none(),
            "Duplicate sub-indicator {sub_indicator} for {technology}"
        );

        self.0[technology]
            .entry(indicator.to_string())
            .or_default()
            .push(sub_indicator.to_string());

        Ok(())
    }

    /// The indicators for a technology
    pub fn indicators(&self, technology: Technology) -> &IndicatorMap {
        &self.0[technology]
    }

    /// Find the indicator a sub-indicator belongs to
    fn find_indicator(&self, technology: Technology, sub_indicator: &str) -> Option<&str> {
        self.0[technology]
            .iter()
            .find(|(_, subs)| subs.iter().any(|sub| sub == sub_indicator))
            .map(|(indicator, _)| indicator.as_str())
    }

    /// Compute RISE scores from sub-indicator answers.
    ///
    /// Each indicator scores the mean of its answered sub-indicators and the RISE score is the
    /// mean over the indicators which have at least one answer. Technologies without any answers
    /// have no score.
    pub fn scores_from_answers(&self, answers: &[RiseAnswer]) -> Result<PerTechnology<Option<f64>>> {
        let mut by_indicator: PerTechnology<IndexMap<&str, Vec<f64>>> = PerTechnology::default();
        for answer in answers {
            ensure!(
                (0.0..=100.0).contains(&answer.score),
                "Score for sub-indicator {} must be between 0 and 100",
                answer.sub_indicator
            );
            let indicator = self
                .find_indicator(answer.technology, &answer.sub_indicator)
                .with_context(|| {
                    format!(
                        "Unknown sub-indicator {} for {}",
                        answer.sub_indicator, answer.technology
                    )
                })?;
            by_indicator[answer.technology]
                .entry(indicator)
                .or_default()
                .push(answer.score);
        }

        Ok(by_indicator.map(|indicators| {
            if indicators.is_empty() {
                return None;
            }

            let total: f64 = indicators.values().map(|scores| mean(scores)).sum();
            Some(total / count(indicators.len()))
        }))
    }
}

fn count(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / count(values.len())
}

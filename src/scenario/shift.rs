//! The rule for shifting newly-electrified population between technologies.
//!
//! Population moves away from the technology with the lowest score towards the other two, in
//! proportion to how much better they score. The same rule is used with RISE scores and with
//! socio-economic scores.
use crate::error::EngineError;
use crate::technology::{PerTechnology, Technology};
use log::error;

/// Largest residual tolerated when checking that shifts sum to zero
pub const MASS_CONSERVATION_TOLERANCE: f64 = 1e-6;

/// Compute the shift in population share for every technology.
///
/// # Arguments
///
/// * `scores` - Scores (0 to 100) for each technology
/// * `pop_shares` - Share of the newly-electrified population on each technology before shifting
///
/// # Returns
///
/// The change in share for each technology. The changes sum to zero and are all exactly zero if
/// the scores are equal.
pub fn compute_shifts(
    scores: &PerTechnology<f64>,
    pop_shares: &PerTechnology<f64>,
) -> PerTechnology<f64> {
    // Stable sort, so ties keep technology order
    let mut order: Vec<_> = scores.iter().map(|(tech, _)| tech).collect();
    order.sort_by(|a, b| scores[*a].total_cmp(&scores[*b]));
    let (n, p, m) = (order[0], order[1], order[2]);

    let mut shifts = PerTechnology::default();
    let (r_n, r_p, r_m) = (scores[n], scores[p], scores[m]);
    if r_m <= r_n {
        return shifts;
    }

    // Share taken from the lowest-scoring technology, split according to score advantage
    let removed = pop_shares[n] * (r_m - r_n) / 100.0;
    let advantage_total = (r_m - r_n) + (r_p - r_n);
    shifts[n] = -removed;
    shifts[m] = removed * (r_m - r_n) / advantage_total;
    shifts[p] = removed * (r_p - r_n) / advantage_total;

    // Secondary move from the middle technology to the best one
    let correction = pop_shares[p] * (r_m - r_p) / 100.0;
    shifts[p] -= correction;
    shifts[m] += correction;

    shifts
}

/// Check that a set of shifts neither creates nor destroys population
pub fn check_mass_conservation(
    shifts: &PerTechnology<f64>,
    country: &str,
) -> Result<(), EngineError> {
    let residual = shifts.total();
    if residual.abs() > MASS_CONSERVATION_TOLERANCE {
        return Err(EngineError::MassConservationViolation {
            country: country.to_string(),
            residual,
        });
    }

    Ok(())
}

/// Compute the shift in population share for one technology.
///
/// A violation of mass conservation is logged as an error but the shift is still returned.
///
/// # Arguments
///
/// * `scores` - Scores (0 to 100) for each technology
/// * `pop_shares` - Share of the newly-electrified population on each technology
/// * `technology` - The technology whose shift is wanted
/// * `country` - The country the shift is for (used in log messages)
pub fn compute_rise_shifts(
    scores: &PerTechnology<f64>,
    pop_shares: &PerTechnology<f64>,
    technology: Technology,
    country: &str,
) -> f64 {
    let shifts = compute_shifts(scores, pop_shares);
    if let Err(err) = check_mass_conservation(&shifts, country) {
        error!("{err}");
    }

    shifts[technology]
}

//! TIER levels classify the quality of a household's electricity service.
//!
//! Each level is defined by a minimum rated capacity and a minimum yearly consumption. The
//! functions here classify a consumption value, interpolate the peak capacity a household with
//! that consumption needs and estimate what the household would consume one level higher.
use crate::error::EngineError;
use crate::units::{Dimensionless, EnergyPerYearPerHousehold, PowerPerHousehold};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The highest TIER level
pub const MAX_TIER_LEVEL: u32 = 5;

/// The default minimum TIER level used when deriving consumption
pub const DEFAULT_MIN_TIER_LEVEL: u32 = 3;

/// Minimum rated capacity (W) for TIER levels 1 to 5
const MIN_RATED_CAPACITY: [f64; 5] = [3.0, 50.0, 200.0, 800.0, 2000.0];

/// Minimum annual consumption (kWh/year) for TIER levels 1 to 5
const MIN_ANNUAL_CONSUMPTION: [f64; 5] = [4.5, 73.0, 365.0, 1250.0, 3000.0];

/// SHS power (W) needed to step up one TIER level, by current level.
///
/// Level 5 has nowhere to go, so it keeps level 5's rated capacity.
const SHS_STEP_UP_POWER: [f64; 5] = [50.0, 200.0, 800.0, 2000.0, 2000.0];

/// A TIER level between 1 and 5 (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TierLevel(u32);

impl TryFrom<u32> for TierLevel {
    type Error = EngineError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (1..=MAX_TIER_LEVEL).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidTierLevel(value))
        }
    }
}

impl From<TierLevel> for u32 {
    fn from(value: TierLevel) -> Self {
        value.0
    }
}

impl Default for TierLevel {
    fn default() -> Self {
        Self(DEFAULT_MIN_TIER_LEVEL)
    }
}

impl fmt::Display for TierLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TierLevel {
    /// The lowest TIER level
    pub const MIN: TierLevel = TierLevel(1);

    /// The highest TIER level
    pub const MAX: TierLevel = TierLevel(MAX_TIER_LEVEL);

    /// The level as a number
    pub fn get(self) -> u32 {
        self.0
    }

    /// Index into the per-level tables
    fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// The next level up, saturating at [`TierLevel::MAX`]
    pub fn next(self) -> TierLevel {
        TierLevel((self.0 + 1).min(MAX_TIER_LEVEL))
    }

    /// Iterate over this level and all the levels above it
    fn iter_from(self) -> impl DoubleEndedIterator<Item = TierLevel> {
        (self.0..=MAX_TIER_LEVEL).map(TierLevel)
    }

    /// Minimum yearly consumption for a household at this level
    pub fn min_annual_consumption(self) -> EnergyPerYearPerHousehold {
        EnergyPerYearPerHousehold(MIN_ANNUAL_CONSUMPTION[self.index()])
    }

    /// Minimum rated capacity for a household at this level, in kW
    pub fn min_rated_capacity(self) -> PowerPerHousehold {
        PowerPerHousehold(MIN_RATED_CAPACITY[self.index()] / 1000.0)
    }

    /// The slope of rated capacity (W) against yearly consumption between this level and the
    /// next one.
    ///
    /// Only defined for levels 1 to 4.
    pub fn slope(self) -> Result<f64, EngineError> {
        if self.0 >= MAX_TIER_LEVEL {
            return Err(EngineError::InvalidTierLevel(self.0));
        }

        let i = self.index();
        Ok((MIN_RATED_CAPACITY[i + 1] - MIN_RATED_CAPACITY[i])
            / (MIN_ANNUAL_CONSUMPTION[i + 1] - MIN_ANNUAL_CONSUMPTION[i]))
    }
}

/// Find the TIER level whose consumption band contains `consumption`.
///
/// Bands include their lower bound and exclude their upper bound. Consumption below the band of
/// `min_tier_level` is still classified as `min_tier_level`.
pub fn find_tier_level(
    consumption: EnergyPerYearPerHousehold,
    min_tier_level: TierLevel,
) -> TierLevel {
    if consumption >= TierLevel::MAX.min_annual_consumption() {
        return TierLevel::MAX;
    }

    min_tier_level
        .iter_from()
        .filter(|level| *level < TierLevel::MAX)
        .find(|level| {
            level.min_annual_consumption() <= consumption
                && consumption < level.next().min_annual_consumption()
        })
        .unwrap_or(min_tier_level)
}

/// Interpolate the peak capacity (kW) a household with the given yearly consumption needs.
///
/// The interpolation uses the interval between the classified level and the one above it. Level 5
/// has no interval of its own, so the level 4 interval is extended. Consumption below the floor's
/// minimum reports the floor's rated capacity.
pub fn get_peak_capacity_from_yearly_consumption(
    consumption: EnergyPerYearPerHousehold,
    min_tier_level: TierLevel,
) -> PowerPerHousehold {
    let level = find_tier_level(consumption, min_tier_level);
    let interval = if level == TierLevel::MAX {
        TierLevel(MAX_TIER_LEVEL - 1)
    } else {
        level
    };

    let consumption = if consumption < level.min_annual_consumption() {
        level.min_annual_consumption()
    } else {
        consumption
    };

    // Levels 1 to 4 always have a slope
    let slope = interval.slope().unwrap_or_default();
    let watts = MIN_RATED_CAPACITY[interval.index()]
        + (consumption - interval.min_annual_consumption()).value() * slope;

    PowerPerHousehold(watts / 1000.0)
}

/// The yearly consumption attributable to one technology, never below the floor's minimum.
pub fn map_tier_yearly_consumption(
    consumption: EnergyPerYearPerHousehold,
    tech_share: Dimensionless,
    min_tier_level: TierLevel,
) -> EnergyPerYearPerHousehold {
    let floor = min_tier_level.min_annual_consumption();
    if consumption.value() < floor.value() / tech_share.0 {
        floor
    } else {
        consumption * tech_share
    }
}

/// The yearly consumption a household would have if its TIER level were raised by one.
///
/// This is the upper bound of the band one level above the household's level. Level 5 has no
/// upper bound, so levels 4 and 5 both use the upper bound of level 4.
pub fn map_capped_tier_yearly_consumption(
    consumption: EnergyPerYearPerHousehold,
    min_tier_level: TierLevel,
) -> EnergyPerYearPerHousehold {
    let level = find_tier_level(consumption, min_tier_level);
    level.next().next().min_annual_consumption()
}

/// The TIER level a solar home system with the given unit capacity (kW) provides.
///
/// Never lower than `min_tier_level`.
pub fn find_shs_tier_level(
    unit_capacity: PowerPerHousehold,
    min_tier_level: TierLevel,
) -> TierLevel {
    min_tier_level
        .iter_from()
        .rev()
        .find(|level| level.min_rated_capacity() <= unit_capacity)
        .unwrap_or(min_tier_level)
}

/// The SHS unit capacity (kW) needed to reach one TIER level higher than the given unit
/// capacity provides.
pub fn shs_step_up_capacity(
    unit_capacity: PowerPerHousehold,
    min_tier_level: TierLevel,
) -> PowerPerHousehold {
    let level = find_shs_tier_level(unit_capacity, min_tier_level);
    PowerPerHousehold(SHS_STEP_UP_POWER[level.index()] / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn tier(level: u32) -> TierLevel {
        TierLevel::try_from(level).unwrap()
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    fn test_tier_level_invalid(#[case] level: u32) {
        assert_eq!(
            TierLevel::try_from(level),
            Err(EngineError::InvalidTierLevel(level))
        );
    }

    #[test]
    fn test_slope() {
        assert_approx_eq!(f64, tier(3).slope().unwrap(), 600.0 / 885.0);
        assert_eq!(tier(5).slope(), Err(EngineError::InvalidTierLevel(5)));
    }

    #[rstest]
    #[case(365.0, 3, 3)] // Lower bound is inclusive
    #[case(1249.9, 3, 3)]
    #[case(1250.0, 3, 4)] // Upper bound is exclusive
    #[case(100.0, 3, 3)] // Below floor
    #[case(100.0, 1, 2)]
    #[case(0.0, 1, 1)]
    #[case(3000.0, 1, 5)]
    #[case(1e6, 3, 5)]
    #[case(10.0, 5, 5)]
    fn test_find_tier_level(
        #[case] consumption: f64,
        #[case] min_tier_level: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(
            find_tier_level(EnergyPerYearPerHousehold(consumption), tier(min_tier_level)),
            tier(expected)
        );
    }

    #[rstest]
    fn test_find_tier_level_monotonic(#[values(1, 2, 3, 4, 5)] min_tier_level: u32) {
        let floor = tier(min_tier_level);
        let mut last = TierLevel::MIN;
        for step in 0..4000 {
            let consumption = EnergyPerYearPerHousehold(f64::from(step) * 1.25);
            let level = find_tier_level(consumption, floor);
            assert!(level >= last);
            assert!(level >= floor);
            last = level;
        }
    }

    #[rstest]
    #[case(365.0, 3, 0.2)]
    #[case(807.5, 3, 0.5)] // Midpoint of the level 3 band
    #[case(100.0, 3, 0.2)] // Below floor reports floor capacity
    #[case(3000.0, 1, 2.0)]
    #[case(4000.0, 1, (2000.0 + 1000.0 * 1200.0 / 1750.0) / 1000.0)]
    fn test_get_peak_capacity_from_yearly_consumption(
        #[case] consumption: f64,
        #[case] min_tier_level: u32,
        #[case] expected: f64,
    ) {
        let capacity = get_peak_capacity_from_yearly_consumption(
            EnergyPerYearPerHousehold(consumption),
            tier(min_tier_level),
        );
        assert_approx_eq!(PowerPerHousehold, capacity, PowerPerHousehold(expected));
    }

    #[rstest]
    #[case(1000.0, 0.5, 500.0)]
    #[case(600.0, 0.5, 365.0)]
    #[case(1000.0, 0.0, 365.0)]
    fn test_map_tier_yearly_consumption(
        #[case] consumption: f64,
        #[case] share: f64,
        #[case] expected: f64,
    ) {
        let result = map_tier_yearly_consumption(
            EnergyPerYearPerHousehold(consumption),
            Dimensionless(share),
            tier(3),
        );
        assert_approx_eq!(
            EnergyPerYearPerHousehold,
            result,
            EnergyPerYearPerHousehold(expected)
        );
    }

    #[rstest]
    #[case(10.0, 1, 365.0)]
    #[case(100.0, 1, 1250.0)]
    #[case(400.0, 3, 3000.0)]
    #[case(2000.0, 1, 3000.0)]
    #[case(5000.0, 1, 3000.0)]
    fn test_map_capped_tier_yearly_consumption(
        #[case] consumption: f64,
        #[case] min_tier_level: u32,
        #[case] expected: f64,
    ) {
        assert_eq!(
            map_capped_tier_yearly_consumption(
                EnergyPerYearPerHousehold(consumption),
                tier(min_tier_level)
            ),
            EnergyPerYearPerHousehold(expected)
        );
    }

    #[rstest]
    #[case(0.02, 1, 0.05)]
    #[case(0.06, 1, 0.2)]
    #[case(0.06, 3, 0.8)]
    #[case(5.0, 1, 2.0)]
    fn test_shs_step_up_capacity(
        #[case] unit_capacity: f64,
        #[case] min_tier_level: u32,
        #[case] expected: f64,
    ) {
        let result = shs_step_up_capacity(PowerPerHousehold(unit_capacity), tier(min_tier_level));
        assert_approx_eq!(PowerPerHousehold, result, PowerPerHousehold(expected));
    }
}

//! General functions related to investment costs.
use crate::model::parameters::MiniGridCostParameters;
use crate::units::{Households, Money, MoneyPerHousehold, MoneyPerPower, Power, PowerPerHousehold};

/// Mini-grid investment cost per kW as a linear function of household peak demand.
///
/// The line passes through the median costs of two reference TIER levels, placed at the rated
/// capacities of those levels, and is extrapolated outside them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiniGridCostCurve {
    intercept: MoneyPerPower,
    /// Change in cost per kW for each extra kW of peak demand
    slope: f64,
}

impl MiniGridCostCurve {
    /// Fit the curve to the reference points
    pub fn new(params: &MiniGridCostParameters) -> Self {
        let x_low = params.low_tier.min_rated_capacity().value();
        let x_high = params.high_tier.min_rated_capacity().value();
        let slope = (params.high_cost_per_kw - params.low_cost_per_kw).value() / (x_high - x_low);

        Self {
            intercept: MoneyPerPower(params.low_cost_per_kw.value() - slope * x_low),
            slope,
        }
    }

    /// The investment cost per kW for households with the given peak demand
    pub fn cost_per_kw(&self, peak_demand: PowerPerHousehold) -> MoneyPerPower {
        MoneyPerPower(self.intercept.value() + self.slope * peak_demand.value())
    }
}

/// The cost of connecting households at a fixed cost per household
pub fn household_investment_cost(households: Households, cost: MoneyPerHousehold) -> Money {
    cost * households
}

/// The cost of installing capacity at a given cost per kW
pub fn capacity_investment_cost(capacity: Power, cost_per_kw: MoneyPerPower) -> Money {
    cost_per_kw * capacity
}

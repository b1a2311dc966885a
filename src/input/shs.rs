//! Code for reading the solar home system catalogs.
//!
//! Sales volumes and product powers are combined into a sales-weighted unit capacity per region;
//! the cost catalog is reduced to a single average cost per kW.
use super::*;
use crate::region::RegionID;
use crate::units::{MoneyPerPower, PowerPerHousehold};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::ops::RangeInclusive;

const SHS_SALES_FILE_NAME: &str = "shs_sales.csv";
const SHS_POWER_FILE_NAME: &str = "shs_power.csv";
const SHS_COSTS_FILE_NAME: &str = "shs_costs.csv";

/// The SHS product categories considered household systems
const HOUSEHOLD_CATEGORIES: RangeInclusive<u32> = 5..=7;

#[derive(Debug, PartialEq, Deserialize)]
struct ShsSalesRaw {
    region: String,
    category: u32,
    sales_volume: f64,
}

#[derive(Debug, PartialEq, Deserialize)]
struct ShsPowerRaw {
    category: u32,
    /// Typical power of the category (W)
    power: f64,
}

#[derive(Debug, PartialEq, Deserialize)]
struct ShsCostRaw {
    product: String,
    category: u32,
    /// Rated capacity of the product (W)
    capacity: f64,
    /// Investment cost of the product (USD)
    cost: f64,
}

/// Read the sales-weighted average SHS unit capacity (kW) for each region.
pub fn read_shs_unit_capacities(data_dir: &Path) -> Result<IndexMap<RegionID, PowerPerHousehold>> {
    let power_path = data_dir.join(SHS_POWER_FILE_NAME);
    let powers = read_shs_power_from_iter(read_csv(&power_path)?)
        .with_context(|| input_err_msg(&power_path))?;

    let sales_path = data_dir.join(SHS_SALES_FILE_NAME);
    compute_unit_capacities(read_csv(&sales_path)?, &powers)
        .with_context(|| input_err_msg(&sales_path))
}

fn read_shs_power_from_iter<I>(iter: I) -> Result<HashMap<u32, f64>>
where
    I: Iterator<Item = ShsPowerRaw>,
{
    let mut map = HashMap::new();
    for raw in iter {
        ensure!(
            raw.power.is_finite() && raw.power > 0.0,
            "Power for category {} must be a positive number",
            raw.category
        );
        ensure!(
            map.insert(raw.category, raw.power).is_none(),
            "Duplicate power entry for category {}",
            raw.category
        );
    }

    Ok(map)
}

fn compute_unit_capacities<I>(
    iter: I,
    powers: &HashMap<u32, f64>,
) -> Result<IndexMap<RegionID, PowerPerHousehold>>
where
    I: Iterator<Item = ShsSalesRaw>,
{
    // Sum of sales and of sales * power, by region
    let mut totals: IndexMap<RegionID, (f64, f64)> = IndexMap::new();
    for raw in iter {
        ensure!(
            raw.sales_volume >= 0.0,
            "Sales volume cannot be negative (region {}, category {})",
            raw.region,
            raw.category
        );
        let entry = totals
            .entry(RegionID::from(raw.region.as_str()))
            .or_default();
        if !HOUSEHOLD_CATEGORIES.contains(&raw.category) {
            continue;
        }

        let power = powers
            .get(&raw.category)
            .with_context(|| format!("No power given for SHS category {}", raw.category))?;
        entry.0 += raw.sales_volume;
        entry.1 += raw.sales_volume * power;
    }

    totals
        .into_iter()
        .map(|(region, (sales, weighted))| {
            ensure!(
                sales > 0.0,
                "No sales of household SHS categories for region {region}"
            );
            Ok((region, PowerPerHousehold(weighted / sales / 1000.0)))
        })
        .collect()
}

/// Read the average SHS investment cost per kW from the cost catalog.
pub fn read_shs_cost_per_kw(data_dir: &Path) -> Result<MoneyPerPower> {
    let file_path = data_dir.join(SHS_COSTS_FILE_NAME);
    let iter = read_csv(&file_path)?;
    compute_average_cost_per_kw(iter).with_context(|| input_err_msg(&file_path))
}

fn compute_average_cost_per_kw<I>(iter: I) -> Result<MoneyPerPower>
where
    I: Iterator<Item = ShsCostRaw>,
{
    let costs: Vec<f64> = iter
        .filter(|raw| HOUSEHOLD_CATEGORIES.contains(&raw.category))
        .map(|raw| {
            ensure!(
                raw.capacity > 0.0 && raw.cost >= 0.0,
                "Invalid capacity or cost for product {}",
                raw.product
            );
            Ok(raw.cost / (raw.capacity / 1000.0))
        })
        .try_collect()?;
    ensure!(
        !costs.is_empty(),
        "No products in household SHS categories found"
    );

    let total: f64 = costs.iter().sum();
    Ok(MoneyPerPower(
        total / f64::from(u32::try_from(costs.len())?),
    ))
}

//! Common functionality for the SE4ALL scenario engine.
//!
//! The engine estimates how many people gain electricity access by 2030 under a set of policy
//! scenarios, how that population splits between grid extension, mini-grids and solar home
//! systems, and what this means for investment and greenhouse gas emissions.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod country;
pub mod emissions;
pub mod error;
pub mod finance;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod reference;
pub mod region;
pub mod rise;
pub mod scenario;
pub mod settings;
pub mod technology;
pub mod tier;
pub mod units;

#[cfg(test)]
mod fixture;

/// The name of the folder holding the program's files in the user's config directory
const CONFIG_DIR_NAME: &str = "se4all-scenarios";

/// Get the directory where the program's config files are stored.
///
/// Falls back to a relative path if the platform has no config directory.
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_default().join(CONFIG_DIR_NAME)
}

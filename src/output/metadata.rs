//! Code for writing metadata to file
use crate::scenario::ScenarioKind;
use anyhow::Result;
use chrono::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata,
}

/// Information about the run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the data directory which was used
    data_path: &'a Path,
    /// The date and time on which the run started
    datetime: String,
    /// The scenarios whose results were written, in the order they were run
    scenarios: Vec<String>,
    /// The minimum TIER level used
    min_tier_level: u32,
}

#[derive(Serialize)]
struct ProgramMetadata {
    /// The program name
    name: &'static str,
    /// The program version as specified in Cargo.toml
    version: &'static str,
}

impl Default for ProgramMetadata {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Write metadata to the specified output path in TOML format
pub fn write_metadata(
    output_path: &Path,
    data_path: &Path,
    scenarios: &[ScenarioKind],
    min_tier_level: u32,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            data_path,
            datetime: Local::now().to_rfc2822(),
            scenarios: scenarios.iter().map(ToString::to_string).collect(),
            min_tier_level,
        },
        program: ProgramMetadata::default(),
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

//! The command line interface for the scenario engine.
use crate::input::read_rise_answers;
use crate::log;
use crate::model::Model;
use crate::output::metadata::write_metadata;
use crate::output::{create_output_directory, get_output_dir, write_scenario_results};
use crate::scenario::flex::FlexEditState;
use crate::scenario::results::ScenarioResultTable;
use crate::scenario::{ScenarioKind, ScenarioSession};
use crate::settings::Settings;
use crate::tier::TierLevel;
use ::log::{info, warn};
use anyhow::{Context, Result, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the scenario engine.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Scenario to run (bau, se4all or prog). BaU is always run first. If omitted, the se4all
    /// and prog scenarios are run. Use the flex command for se4all_flex.
    #[arg(short, long)]
    pub scenario: Option<String>,
    /// Override the minimum TIER level given in model.toml
    #[arg(long)]
    pub min_tier_level: Option<u32>,
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// Options for the flex command
#[derive(Args)]
pub struct FlexOpts {
    /// ISO3 code of the country to rerun
    #[arg(short, long)]
    pub country: String,
    /// RISE score for the grid
    #[arg(long)]
    pub rise_grid: Option<f64>,
    /// RISE score for mini-grids
    #[arg(long)]
    pub rise_mg: Option<f64>,
    /// RISE score for solar home systems
    #[arg(long)]
    pub rise_shs: Option<f64>,
    /// CSV file of RISE sub-indicator answers, used for scores not given explicitly
    #[arg(long)]
    pub rise_answers: Option<PathBuf>,
    /// Minimum TIER level for this country
    #[arg(long)]
    pub min_tier_level: Option<u32>,
    /// Weight of the RISE-driven shift, between 0 and 1
    #[arg(long)]
    pub drive_weight: Option<f64>,
    /// Directory for output files. If omitted, results are only logged.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run scenarios for every country in a data set.
    Run {
        /// Path to the data directory.
        data_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Rerun the flexible SE4ALL scenario for one country with edited inputs.
    Flex {
        /// Path to the data directory.
        data_dir: PathBuf,
        /// Values to edit
        #[command(flatten)]
        opts: FlexOpts,
    },
    /// Manage example data sets.
    Example {
        /// The available subcommands for managing example data sets.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Validate a data set.
    Validate {
        /// The path to the data directory.
        data_dir: PathBuf,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { data_dir, opts } => handle_run_command(&data_dir, &opts, None),
            Self::Flex { data_dir, opts } => handle_flex_command(&data_dir, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { data_dir } => handle_validate_command(&data_dir, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ se4all-scenarios --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Initialise the program logger
fn init_logger(settings: &Settings, log_file_dir: Option<&Path>) -> Result<()> {
    log::init(&settings.log_level, log_file_dir).context("Failed to initialise logging.")
}

/// Create the output folder, returning whether existing contents will be overwritten
fn prepare_output_directory(output_path: &Path, allow_overwrite: bool) -> Result<bool> {
    create_output_directory(output_path, allow_overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })
}

/// The scenarios to run for the `run` command, always starting with BaU
fn scenarios_to_run(scenario: Option<&str>) -> Result<Vec<ScenarioKind>> {
    let Some(name) = scenario else {
        return Ok(vec![
            ScenarioKind::Bau,
            ScenarioKind::Se4all,
            ScenarioKind::Prog,
        ]);
    };

    let kind = ScenarioKind::from_name(name)?;
    ensure!(
        kind != ScenarioKind::Se4allFlex,
        "The {kind} scenario reruns a single country: use the flex command instead"
    );
    if kind == ScenarioKind::Bau {
        Ok(vec![kind])
    } else {
        Ok(vec![ScenarioKind::Bau, kind])
    }
}

/// Convert an optional TIER level given on the command line
fn parse_tier_level(level: Option<u32>) -> Result<Option<TierLevel>> {
    Ok(level.map(TierLevel::try_from).transpose()?)
}

/// Log the headline figures for each country in a result table
fn log_summary(table: &ScenarioResultTable) {
    for (iso, row) in &table.rows {
        let pop_get = &row.allocation.pop_get;
        info!(
            "{} {iso}: grid {:.0}, mg {:.0}, shs {:.0}, no access {:.0}, investment {:.3e} USD",
            table.kind,
            pop_get.grid,
            pop_get.mg,
            pop_get.shs,
            row.allocation.pop_no_access,
            row.results.investment_cost.total().value()
        );
    }
}

/// Handle the `run` command.
pub fn handle_run_command(
    data_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    let scenarios = scenarios_to_run(opts.scenario.as_deref())?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(data_path)?;
        &pathbuf
    };

    let overwrite = prepare_output_directory(output_path, opts.overwrite || settings.overwrite)?;
    init_logger(&settings, Some(output_path))?;

    // Load the data to run
    let mut model = Model::from_path(data_path).context("Failed to load data.")?;
    if let Some(level) = parse_tier_level(opts.min_tier_level)? {
        model.parameters.min_tier_level = level;
    }
    let min_tier_level = model.parameters.min_tier_level;
    info!("Loaded data from {}", data_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let mut session = ScenarioSession::new(model);
    for kind in &scenarios {
        let table = session.run(*kind)?;
        log_summary(&table);
        write_scenario_results(output_path, &table)?;
    }
    write_metadata(output_path, data_path, &scenarios, min_tier_level.get())?;
    info!("Run complete!");

    Ok(())
}

/// Handle the `flex` command.
pub fn handle_flex_command(
    data_path: &Path,
    opts: &FlexOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    let overwrite = match opts.output_dir.as_deref() {
        Some(output_path) => {
            prepare_output_directory(output_path, opts.overwrite || settings.overwrite)?
        }
        None => false,
    };
    init_logger(&settings, opts.output_dir.as_deref())?;
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let model = Model::from_path(data_path).context("Failed to load data.")?;
    info!("Loaded data from {}", data_path.display());

    let mut edit = FlexEditState {
        rise_grid: opts.rise_grid,
        rise_mg: opts.rise_mg,
        rise_shs: opts.rise_shs,
        min_tier_level: parse_tier_level(opts.min_tier_level)?,
        drive_weight: opts.drive_weight,
    };
    if let Some(answers_path) = opts.rise_answers.as_deref() {
        let answers = read_rise_answers(answers_path)?;
        edit.add_rise_answers(&model.reference.rise_catalog, &answers)?;
    }

    // The flex scenario's emission reductions are relative to BaU
    let mut session = ScenarioSession::new(model);
    session.run(ScenarioKind::Bau)?;
    let table = session.run_flex(&opts.country, &edit)?;
    log_summary(&table);

    if let Some(output_path) = opts.output_dir.as_deref() {
        write_scenario_results(output_path, &table)?;
        let min_tier_level = edit
            .min_tier_level
            .unwrap_or(session.model().parameters.min_tier_level);
        write_metadata(
            output_path,
            data_path,
            &[ScenarioKind::Se4allFlex],
            min_tier_level.get(),
        )?;
        info!("Results written to {}", output_path.display());
    }

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(data_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    init_logger(&settings, None)?;

    // Load/validate the data
    Model::from_path(data_path).context("Failed to validate data.")?;
    info!("Data validation successful!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, &[ScenarioKind::Bau, ScenarioKind::Se4all, ScenarioKind::Prog])]
    #[case(Some("bau"), &[ScenarioKind::Bau])]
    #[case(Some("se4all"), &[ScenarioKind::Bau, ScenarioKind::Se4all])]
    #[case(Some("prog"), &[ScenarioKind::Bau, ScenarioKind::Prog])]
    fn test_scenarios_to_run(#[case] scenario: Option<&str>, #[case] expected: &[ScenarioKind]) {
        assert_eq!(scenarios_to_run(scenario).unwrap(), expected);
    }

    #[test]
    fn test_scenarios_to_run_unknown() {
        assert!(scenarios_to_run(Some("nuclear")).is_err());
    }

    #[test]
    fn test_scenarios_to_run_flex() {
        assert_eq!(
            scenarios_to_run(Some("se4all_flex")).unwrap_err().to_string(),
            "The se4all_flex scenario reruns a single country: use the flex command instead"
        );
    }

    #[test]
    fn test_parse_tier_level() {
        assert_eq!(parse_tier_level(None).unwrap(), None);
        assert_eq!(parse_tier_level(Some(2)).unwrap(), Some(TierLevel::MIN.next()));
        assert!(parse_tier_level(Some(7)).is_err());
    }
}

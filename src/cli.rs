//! The command line interface for the planner.
use crate::boq::ParsedBoq;
use crate::equipment::resolve_equipment_profile;
use crate::input::read_json;
use crate::learned::ModelCache;
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::{create_output_directory, get_output_dir, write_prediction_outputs};
use crate::predictor::{PredictionResult, Predictor};
use crate::rules::RuleTable;
use crate::settings::Settings;
use crate::work_type::{EquipmentRequirement, WorkTypeCatalog};
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the planner.
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

/// Options for the predict command
#[derive(Args, Default, Clone)]
pub struct PredictOpts {
    /// Rule table (JSON or TOML) mapping material keywords to equipment and labour
    #[arg(long)]
    pub rules: Option<PathBuf>,
    /// Directory containing learned model artifacts
    #[arg(long)]
    pub models: Option<PathBuf>,
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Guess the work type from the BOQ text if the input doesn't specify one
    #[arg(long)]
    pub detect_work_type: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Estimate the resources needed for a parsed BOQ.
    Predict {
        /// Path to the parsed BOQ (JSON).
        boq_file: PathBuf,
        /// Other prediction options
        #[command(flatten)]
        opts: PredictOpts,
    },
    /// Show the fuel profile for a piece of equipment.
    Equipment {
        /// Equipment name or alias.
        name: String,
    },
    /// List the known work types and their labour profiles.
    WorkTypes,
    /// Manage example BOQs.
    Example {
        /// The available subcommands for managing example BOQs.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Predict { boq_file, opts } => handle_predict_command(&boq_file, &opts, None),
            Self::Equipment { name } => handle_equipment_command(&name),
            Self::WorkTypes => {
                handle_work_types_command();
                Ok(())
            }
            Self::Example { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the planner
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ boq-planner --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Handle the `predict` command.
pub fn handle_predict_command(
    boq_path: &Path,
    opts: &PredictOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(boq_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(&settings.log_level, output_path)
        .context("Failed to initialise logging.")?;

    let mut boq: ParsedBoq = read_json(boq_path).context("Failed to load BOQ.")?;
    info!("Loaded BOQ from {}", boq_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let rules_file = opts.rules.as_deref().or(settings.rules_file.as_deref());
    let models = match opts.models.as_ref().or(settings.models_dir.as_ref()) {
        Some(models_dir) => ModelCache::lazy(models_dir.clone()),
        None => ModelCache::disabled(),
    };
    let predictor = Predictor::new(RuleTable::load_or_empty(rules_file), models);

    if opts.detect_work_type && boq.work_type.is_none() {
        detect_work_type(&mut boq, predictor.work_types());
    }

    let result = predictor.predict(&boq);
    log_summary(&result);

    write_prediction_outputs(output_path, &result)?;
    write_metadata(
        output_path,
        boq_path,
        rules_file,
        predictor.has_learned_models(),
    )?;
    info!("Prediction complete!");

    Ok(())
}

/// Fill in the BOQ's work type from its text
fn detect_work_type(boq: &mut ParsedBoq, catalog: &WorkTypeCatalog) {
    let text = std::iter::once(boq.raw_text.clone())
        .chain(boq.materials.iter().map(|entry| entry.resolve().text))
        .join(" ");
    match catalog.detect(&text) {
        Some(work_type) => {
            info!("Detected work type: {work_type}");
            boq.work_type = Some(work_type.to_string());
        }
        None => info!("Could not detect a work type"),
    }
}

/// Log the headline figures of a prediction
fn log_summary(result: &PredictionResult) {
    let describe = |counts: &BTreeMap<String, u32>| {
        if counts.is_empty() {
            "none".to_string()
        } else {
            counts
                .iter()
                .map(|(name, count)| format!("{name} x{count}"))
                .join(", ")
        }
    };

    if let Some(work_type) = result.work_type {
        info!("Work type: {work_type}");
    }
    info!("Machinery: {}", describe(&result.machinery_counts));
    info!("Vehicles: {}", describe(&result.vehicle_counts));
    info!(
        "Labour: {} skilled, {} unskilled ({})",
        result.labour.skilled,
        result.labour.unskilled,
        result.labour_roles.iter().join(", ")
    );
    info!(
        "Fuel per shift: {:.2} litres",
        result.fuel_plan.total_liters
    );
}

/// Handle the `equipment` command.
fn handle_equipment_command(name: &str) -> Result<()> {
    let profile = resolve_equipment_profile(name);
    print!("{}", toml::to_string(&profile)?);

    Ok(())
}

/// Handle the `work-types` command.
fn handle_work_types_command() {
    let describe = |requirements: &[EquipmentRequirement]| {
        requirements
            .iter()
            .map(|req| format!("{} (min {})", req.name, req.minimum()))
            .join(", ")
    };

    for profile in WorkTypeCatalog::builtin().iter() {
        println!("{}", profile.work_type);
        println!(
            "  roles: {}",
            profile
                .roles
                .iter()
                .map(|role| format!("{} [{}]", role.slug, role.skill_level))
                .join(", ")
        );
        println!("  vehicles: {}", describe(&profile.vehicles));
        println!("  machinery: {}", describe(&profile.machinery));
    }
}

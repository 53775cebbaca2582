//! Code related to the example BOQs and the CLI commands for interacting with them.
use super::{PredictOpts, handle_predict_command};
use crate::output::output_dir_for;
use crate::settings::Settings;
use anyhow::{Context, Result, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The directory containing the example BOQs.
const EXAMPLES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/demos");

/// The parsed BOQ file in each example
const EXAMPLE_BOQ_FILE: &str = "boq.json";

/// The optional rule table in each example
const EXAMPLE_RULES_FILE: &str = "rules.json";

/// The optional learned model directory in each example
const EXAMPLE_MODELS_DIR: &str = "models";

/// The available subcommands for managing example BOQs.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available examples.
    List,
    /// Provide information about the specified example.
    Info {
        /// The name of the example.
        name: String,
    },
    /// Extract an example to a new directory.
    Extract {
        /// The name of the example to extract.
        name: String,
        /// The destination folder for the example.
        new_path: Option<PathBuf>,
    },
    /// Run the predictor on an example.
    Run {
        /// The name of the example to run.
        name: String,
        /// Directory for output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Whether to overwrite the output directory if it already exists
        #[arg(long)]
        overwrite: bool,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_example_list_command(),
            Self::Info { name } => handle_example_info_command(&name)?,
            Self::Extract {
                name,
                new_path: dest,
            } => handle_example_extract_command(&name, dest.as_deref())?,
            Self::Run {
                name,
                output_dir,
                overwrite,
            } => handle_example_run_command(&name, output_dir, overwrite, None)?,
        }

        Ok(())
    }
}

/// Handle the `example list` command.
fn handle_example_list_command() {
    for entry in EXAMPLES_DIR.dirs() {
        println!("{}", entry.path().display());
    }
}

/// Handle the `example info` command.
fn handle_example_info_command(name: &str) -> Result<()> {
    let path: PathBuf = [name, "README.txt"].iter().collect();
    let readme = EXAMPLES_DIR
        .get_file(path)
        .context("Example not found.")?
        .contents_utf8()
        .context("README.txt is not UTF-8 encoded")?;

    println!("{readme}");

    Ok(())
}

/// Handle the `example extract` command
fn handle_example_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(Path::new(name));
    extract_example(name, dest)
}

/// Extract the specified example to a new directory
pub fn extract_example(name: &str, new_path: &Path) -> Result<()> {
    // Find the subdirectory in EXAMPLES_DIR whose name matches `name`.
    let sub_dir = EXAMPLES_DIR.get_dir(name).context("Example not found.")?;

    ensure!(
        !new_path.exists(),
        "Destination directory {} already exists",
        new_path.display()
    );

    fs::create_dir(new_path)?;
    copy_entries(sub_dir, sub_dir.path(), new_path)
}

/// Recursively copy embedded files, keeping their paths relative to `base`
fn copy_entries(dir: &Dir, base: &Path, dest: &Path) -> Result<()> {
    for entry in dir.entries() {
        let target = dest.join(entry.path().strip_prefix(base)?);
        match entry {
            DirEntry::Dir(sub_dir) => {
                fs::create_dir(&target)?;
                copy_entries(sub_dir, base, dest)?;
            }
            DirEntry::File(file) => fs::write(&target, file.contents())?,
        }
    }

    Ok(())
}

/// Handle the `example run` command.
///
/// The example's own rule table and learned models are used if it has them.
pub fn handle_example_run_command(
    name: &str,
    output_dir: Option<PathBuf>,
    overwrite: bool,
    settings: Option<Settings>,
) -> Result<()> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let example_path = temp_dir.path().join(name);
    extract_example(name, &example_path)?;

    let rules_path = example_path.join(EXAMPLE_RULES_FILE);
    let models_path = example_path.join(EXAMPLE_MODELS_DIR);
    let opts = PredictOpts {
        rules: rules_path.is_file().then_some(rules_path),
        models: models_path.is_dir().then_some(models_path),
        output_dir: Some(output_dir.unwrap_or_else(|| output_dir_for(name))),
        overwrite,
        detect_work_type: true,
    };

    handle_predict_command(&example_path.join(EXAMPLE_BOQ_FILE), &opts, settings)
}

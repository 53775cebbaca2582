//! Code for writing run metadata to file
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
    program: ProgramMetadata<'a>,
}

/// Information about the prediction run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the BOQ which was processed
    boq_path: &'a Path,
    /// Path to the rule table, if one was used
    #[serde(skip_serializing_if = "Option::is_none")]
    rules_file: Option<&'a Path>,
    /// Whether learned models contributed to the prediction
    learned_models: bool,
    /// The date and time on which the run started
    datetime: String,
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            is_debug: cfg!(debug_assertions),
        }
    }
}

/// Write metadata to the specified output path in TOML format
pub fn write_metadata(
    output_path: &Path,
    boq_path: &Path,
    rules_file: Option<&Path>,
    learned_models: bool,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            boq_path,
            rules_file,
            learned_models,
            datetime: Local::now().to_rfc2822(),
        },
        program: ProgramMetadata::default(),
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

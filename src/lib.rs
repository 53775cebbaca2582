//! Common functionality for boq-planner.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod aggregate;
pub mod boq;
pub mod cli;
pub mod equipment;
pub mod fuel;
pub mod fuel_plan;
pub mod heuristics;
pub mod input;
pub mod learned;
pub mod log;
pub mod output;
pub mod predictor;
pub mod rules;
pub mod settings;
pub mod units;
pub mod work_type;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// If the platform has no config dir, the current working directory is used instead.
pub fn get_boq_planner_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        return PathBuf::default();
    };

    config_dir.push("boq-planner");
    config_dir
}

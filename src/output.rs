//! The module responsible for writing prediction results to disk.
use crate::equipment::{EquipmentCategory, FuelType};
use crate::fuel_plan::FuelEntry;
use crate::predictor::PredictionResult;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which BOQ-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "boq_planner_results";

/// The output file name for the full prediction
const PREDICTION_FILE_NAME: &str = "prediction.json";

/// The output file name for the fuel plan
const FUEL_PLAN_FILE_NAME: &str = "fuel_plan.csv";

/// Get the default output directory for the specified BOQ file
pub fn get_output_dir(boq_path: &Path) -> Result<PathBuf> {
    let boq_name = boq_path
        .file_stem()
        .context("BOQ path has no file name")?
        .to_str()
        .context("Invalid chars in BOQ file name")?;

    Ok(output_dir_for(boq_name))
}

/// The default output directory for a named BOQ or example
pub fn output_dir_for(name: &str) -> PathBuf {
    [OUTPUT_DIRECTORY_ROOT, name].iter().collect()
}

/// Create a new output directory.
///
/// Fails if the directory already exists and `allow_overwrite` is false.
///
/// # Returns
///
/// Whether an existing directory is being overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        ensure!(
            allow_overwrite,
            "Output folder already exists. Use --overwrite to replace it."
        );
        return Ok(true);
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// Which section of the fuel plan an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum FuelPlanGroup {
    Machinery,
    Vehicle,
}

/// Represents a row in the fuel plan CSV file
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct FuelPlanRow {
    group: FuelPlanGroup,
    name: String,
    profile_name: String,
    category: EquipmentCategory,
    fuel_type: FuelType,
    liters_per_shift: f64,
    count: u32,
    estimated_total_liters: f64,
}

impl FuelPlanRow {
    fn new(group: FuelPlanGroup, entry: &FuelEntry) -> Self {
        Self {
            group,
            name: entry.name.clone(),
            profile_name: entry.profile_name.clone(),
            category: entry.category,
            fuel_type: entry.fuel_type,
            liters_per_shift: entry.liters_per_shift,
            count: entry.count,
            estimated_total_liters: entry.estimated_total_liters,
        }
    }
}

/// Write the prediction as pretty-printed JSON
fn write_prediction(output_path: &Path, result: &PredictionResult) -> Result<()> {
    let file_path = output_path.join(PREDICTION_FILE_NAME);
    let json = serde_json::to_string_pretty(result)?;
    fs::write(&file_path, json)
        .with_context(|| format!("Failed to write {}", file_path.display()))?;

    Ok(())
}

/// Write one row per fuel plan entry to a CSV file
fn write_fuel_plan(output_path: &Path, result: &PredictionResult) -> Result<()> {
    let file_path = output_path.join(FUEL_PLAN_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Failed to create {}", file_path.display()))?;

    let plan = &result.fuel_plan;
    let rows = plan
        .machinery
        .iter()
        .map(|entry| FuelPlanRow::new(FuelPlanGroup::Machinery, entry))
        .chain(
            plan.vehicles
                .iter()
                .map(|entry| FuelPlanRow::new(FuelPlanGroup::Vehicle, entry)),
        );
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write all output files for a prediction to the given folder
pub fn write_prediction_outputs(output_path: &Path, result: &PredictionResult) -> Result<()> {
    write_prediction(output_path, result)?;
    write_fuel_plan(output_path, result)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{boq, predictor};
    use crate::predictor::Predictor;
    use itertools::Itertools;
    use rstest::rstest;
    use tempfile::tempdir;

    #[test]
    fn test_get_output_dir() {
        assert_eq!(
            get_output_dir(Path::new("data/site_a.json")).unwrap(),
            PathBuf::from("boq_planner_results/site_a")
        );
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("nested").join("results");

        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // Existing directory needs permission to overwrite
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(create_output_directory(&output_dir, true).unwrap());
    }

    #[rstest]
    fn test_write_prediction_outputs(predictor: Predictor) {
        let result = predictor.predict(&boq(&["sand: 45 m3", "excavator hire"]));
        let dir = tempdir().unwrap();
        write_prediction_outputs(dir.path(), &result).unwrap();

        // Read back JSON
        let json = fs::read_to_string(dir.path().join(PREDICTION_FILE_NAME)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vehicle_counts"]["Tipper Truck"], 3);
        assert_eq!(value["labour"]["unskilled"], 3);

        // Read back CSV
        let rows: Vec<FuelPlanRow> = csv::Reader::from_path(dir.path().join(FUEL_PLAN_FILE_NAME))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group, FuelPlanGroup::Machinery);
        assert_eq!(rows[0].name, "Loader");
        assert_eq!(rows[1].group, FuelPlanGroup::Vehicle);
        assert_eq!(rows[1].name, "Tipper Truck");
        assert_eq!(rows[1].count, 3);
        assert_eq!(rows[1].fuel_type, FuelType::Diesel);
    }
}

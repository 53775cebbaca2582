//! Fuel consumption estimates for the equipment in a prediction.
use crate::aggregate::EquipmentCounts;
use crate::equipment::{EquipmentCatalog, EquipmentCategory, FuelType};
use crate::fuel::{FuelGrade, FuelOption, FuelReference};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Round a number of litres to two decimal places
fn round2(liters: f64) -> f64 {
    (liters * 100.0).round() / 100.0
}

/// Estimated fuel use for one piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelEntry {
    /// Equipment name as it appears in the prediction
    pub name: String,
    /// Name of the catalogue profile used
    pub profile_name: String,
    /// Vehicle or machinery, according to the profile
    pub category: EquipmentCategory,
    /// Fuel consumed
    pub fuel_type: FuelType,
    /// Litres consumed per unit per shift
    pub liters_per_shift: f64,
    /// Number of units
    pub count: u32,
    /// Litres consumed by all units in one shift
    pub estimated_total_liters: f64,
    /// Notes from the profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fuel needed per shift by all the equipment in a prediction, with grade recommendations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelPlan {
    /// Entries for machinery, ordered by name
    pub machinery: Vec<FuelEntry>,
    /// Entries for vehicles, ordered by name
    pub vehicles: Vec<FuelEntry>,
    /// Total litres per fuel type
    pub summary_by_fuel_type: BTreeMap<FuelType, f64>,
    /// Total litres across all equipment
    pub total_liters: f64,
    /// Recommended grades for each fuel type in the summary
    pub fuel_grade_recommendations: BTreeMap<FuelType, Vec<FuelGrade>>,
    /// Petrol and diesel grades
    pub light_fuels: IndexMap<String, Vec<FuelGrade>>,
    /// Heavy and auxiliary fuels
    pub other_fuels: Vec<FuelOption>,
    /// Alternative fuels
    pub emerging_fuels: Vec<FuelOption>,
    /// Major fuel retailers
    pub key_suppliers: Vec<String>,
}

impl FuelPlan {
    /// Build a fuel plan for the given machinery and vehicle counts
    pub fn build(
        machinery: &EquipmentCounts,
        vehicles: &EquipmentCounts,
        catalog: &EquipmentCatalog,
        reference: &FuelReference,
    ) -> Self {
        let mut summary_by_fuel_type = BTreeMap::new();
        let mut total_liters = 0.0;
        let mut entries_for = |counts: &EquipmentCounts| -> Vec<FuelEntry> {
            counts
                .iter()
                .map(|(name, count)| {
                    let profile = catalog.resolve(name);
                    let estimated_total_liters = round2(profile.liters_per_shift * f64::from(count));
                    *summary_by_fuel_type.entry(profile.fuel_type).or_insert(0.0) +=
                        estimated_total_liters;
                    total_liters += estimated_total_liters;

                    FuelEntry {
                        name: name.to_string(),
                        profile_name: profile.name,
                        category: profile.category,
                        fuel_type: profile.fuel_type,
                        liters_per_shift: profile.liters_per_shift,
                        count,
                        estimated_total_liters,
                        notes: profile.notes,
                    }
                })
                .collect()
        };
        let machinery = entries_for(machinery);
        let vehicles = entries_for(vehicles);

        for liters in summary_by_fuel_type.values_mut() {
            *liters = round2(*liters);
        }
        let fuel_grade_recommendations = summary_by_fuel_type
            .keys()
            .filter_map(|&fuel_type| {
                reference
                    .recommendations(fuel_type)
                    .map(|grades| (fuel_type, grades.to_vec()))
            })
            .collect();

        Self {
            machinery,
            vehicles,
            summary_by_fuel_type,
            total_liters: round2(total_liters),
            fuel_grade_recommendations,
            light_fuels: reference.light_fuels.clone(),
            other_fuels: reference.other_fuels.clone(),
            emerging_fuels: reference.emerging_fuels.clone(),
            key_suppliers: reference.key_suppliers.clone(),
        }
    }

    /// All entries, machinery first
    pub fn entries(&self) -> impl Iterator<Item = &FuelEntry> {
        self.machinery.iter().chain(&self.vehicles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn counts(items: &[(&str, u32)]) -> EquipmentCounts {
        let mut counts = EquipmentCounts::default();
        for (name, count) in items {
            counts.increment(name, *count);
        }
        counts
    }

    fn build(machinery: &[(&str, u32)], vehicles: &[(&str, u32)]) -> FuelPlan {
        FuelPlan::build(
            &counts(machinery),
            &counts(vehicles),
            EquipmentCatalog::builtin(),
            FuelReference::builtin(),
        )
    }

    #[test]
    fn test_single_excavator() {
        let plan = build(&[("Excavator", 1)], &[]);
        assert_eq!(plan.machinery.len(), 1);
        assert!(plan.vehicles.is_empty());
        assert_approx_eq!(f64, plan.total_liters, 65.0);
        assert_approx_eq!(f64, plan.summary_by_fuel_type[&FuelType::Diesel], 65.0);
        assert!(plan.fuel_grade_recommendations.contains_key(&FuelType::Diesel));
        assert!(!plan.fuel_grade_recommendations.contains_key(&FuelType::Petrol));
    }

    #[test]
    fn test_entries_scale_with_count() {
        let plan = build(
            &[("Concrete Mixer", 3), ("Mortar Mixer", 2)],
            &[("tipper", 2)],
        );
        let mixer = &plan.machinery[0];
        assert_eq!(mixer.name, "Concrete Mixer");
        assert_eq!(mixer.count, 3);
        assert_approx_eq!(f64, mixer.estimated_total_liters, 84.0);

        let tipper = &plan.vehicles[0];
        assert_eq!(tipper.name, "tipper");
        assert_eq!(tipper.profile_name, "Tipper Truck");
        assert_approx_eq!(f64, tipper.estimated_total_liters, 90.0);

        assert_approx_eq!(f64, plan.summary_by_fuel_type[&FuelType::Diesel], 174.0);
        assert_approx_eq!(f64, plan.summary_by_fuel_type[&FuelType::Petrol], 20.0);
        assert_approx_eq!(f64, plan.total_liters, 194.0);
        assert_eq!(plan.entries().count(), 3);
    }

    #[test]
    fn test_unknown_equipment_uses_generic_profile() {
        let plan = build(&[("Hydraulic Gizmo", 2)], &[]);
        let entry = &plan.machinery[0];
        assert_eq!(entry.profile_name, "Hydraulic Gizmo");
        assert_eq!(entry.fuel_type, FuelType::Diesel);
        assert_approx_eq!(f64, entry.estimated_total_liters, 50.0);
    }

    #[test]
    fn test_empty_plan() {
        let plan = build(&[], &[]);
        assert!(plan.summary_by_fuel_type.is_empty());
        assert!(plan.fuel_grade_recommendations.is_empty());
        assert_approx_eq!(f64, plan.total_liters, 0.0);
        assert_eq!(plan.key_suppliers.len(), 3);
    }

    #[test]
    fn test_round2() {
        assert_approx_eq!(f64, round2(12.345_6), 12.35);
        assert_approx_eq!(f64, round2(0.004), 0.0);
    }
}

//! Quantity-aware heuristics which scale equipment and labour with the size of a material line.
use crate::aggregate::Contribution;
use crate::boq::ResolvedMaterial;
use crate::units::Unit;
use anyhow::{Result, ensure};
use strum::Display;

/// Concrete volume handled by one mixer (m3)
const CONCRETE_PER_MIXER: f64 = 50.0;
/// Concrete volume above which a pump is needed (m3)
const CONCRETE_PUMP_THRESHOLD: f64 = 100.0;
/// Concrete volume delivered per bulk cement truck (m3)
const CONCRETE_PER_TRUCK: f64 = 40.0;
/// Concrete volume handled by one unskilled worker (m3)
const CONCRETE_PER_LABOURER: f64 = 20.0;
/// Sand or aggregate carried per tipper trip (m3)
const SAND_PER_TRIP: f64 = 20.0;
/// Bricks or blocks laid per mason
const BRICKS_PER_MASON: f64 = 1000.0;
/// Bricks or blocks handled per labourer
const BRICKS_PER_LABOURER: f64 = 500.0;

/// A class of material with its own scaling formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MaterialCategory {
    /// Concrete or cement
    Concrete,
    /// Sand or aggregate
    Sand,
    /// Bricks or blocks
    Masonry,
    /// Tiles
    Tile,
}

impl MaterialCategory {
    /// Choose the category for a material, if any.
    ///
    /// The material name is checked first. Failing that, any line mentioning concrete is treated
    /// as concrete work.
    pub fn classify(material: &ResolvedMaterial) -> Option<Self> {
        let name = material.name.as_deref()?;
        match name {
            "concrete" | "cement" => Some(Self::Concrete),
            "sand" | "aggregate" => Some(Self::Sand),
            "brick" | "block" => Some(Self::Masonry),
            "tile" => Some(Self::Tile),
            _ if material.text.to_lowercase().contains("concrete") => Some(Self::Concrete),
            _ => None,
        }
    }
}

/// Number of units needed to handle `quantity` at `per_unit` each, rounding up
fn units_needed(quantity: f64, per_unit: f64) -> u32 {
    (quantity / per_unit).ceil() as u32
}

/// Work out the equipment and labour implied by a single material line.
///
/// Materials which don't fall into a known category contribute nothing. An error is returned if
/// the quantity is negative or not finite.
pub fn apply_heuristics(material: &ResolvedMaterial) -> Result<Contribution> {
    let Some(category) = MaterialCategory::classify(material) else {
        return Ok(Contribution::default());
    };

    if let Some(quantity) = material.quantity {
        ensure!(
            quantity.is_finite() && quantity >= 0.0,
            "Invalid quantity {quantity} for {category} line '{}'",
            material.text
        );
    }

    let quantity = material.quantity.unwrap_or(0.0);
    let volume = material
        .normalised_unit()
        .is_some_and(Unit::is_volume_like)
        .then_some(quantity);

    let contribution = match category {
        MaterialCategory::Concrete => concrete(volume),
        MaterialCategory::Sand => sand(volume),
        MaterialCategory::Masonry => masonry(material.quantity.filter(|&q| q > 0.0)),
        MaterialCategory::Tile => tile(),
    };

    Ok(contribution)
}

fn concrete(volume: Option<f64>) -> Contribution {
    let Some(volume) = volume else {
        return Contribution::default()
            .with_machinery("Concrete Mixer", 1)
            .with_vehicles("Bulk Cement Truck", 1)
            .with_labour(1, 2)
            .with_roles(&["mason"]);
    };

    let mixers = units_needed(volume, CONCRETE_PER_MIXER).max(1);
    let trucks = units_needed(volume, CONCRETE_PER_TRUCK).max(1);
    let unskilled = units_needed(volume, CONCRETE_PER_LABOURER).max(2);
    let mut contribution = Contribution::default()
        .with_machinery("Concrete Mixer", mixers)
        .with_vehicles("Bulk Cement Truck", trucks)
        .with_labour(mixers, unskilled)
        .with_roles(&["mason", "operator"]);
    if volume > CONCRETE_PUMP_THRESHOLD {
        contribution = contribution.with_machinery("Concrete Pump", 1);
    }

    contribution
}

fn sand(volume: Option<f64>) -> Contribution {
    let contribution = Contribution::default().with_machinery("Loader", 1);
    match volume {
        Some(volume) => {
            let trips = units_needed(volume, SAND_PER_TRIP).max(1);
            contribution
                .with_vehicles("Tipper Truck", trips)
                .with_labour(0, trips)
                .with_roles(&["operator", "labourer"])
        }
        None => contribution
            .with_vehicles("Tipper Truck", 1)
            .with_labour(0, 2)
            .with_roles(&["labourer"]),
    }
}

fn masonry(quantity: Option<f64>) -> Contribution {
    let contribution = Contribution::default().with_vehicles("Small Truck", 1);
    match quantity {
        Some(quantity) => contribution
            .with_labour(
                units_needed(quantity, BRICKS_PER_MASON).max(1),
                units_needed(quantity, BRICKS_PER_LABOURER).max(3),
            )
            .with_roles(&["mason", "labourer"]),
        None => contribution.with_labour(1, 6).with_roles(&["mason"]),
    }
}

fn tile() -> Contribution {
    Contribution::default()
        .with_vehicles("Small Truck", 1)
        .with_labour(2, 2)
        .with_roles(&["labourer"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::LabourCounts;
    use crate::boq::MaterialEntry;
    use crate::fixture::{assert_error, material};
    use rstest::rstest;

    #[test]
    fn test_concrete_large_pour() {
        let contribution = apply_heuristics(&material("concrete", Some(120.0), Some("m3"))).unwrap();
        assert_eq!(contribution.machinery.get("Concrete Mixer"), Some(3));
        assert_eq!(contribution.machinery.get("Concrete Pump"), Some(1));
        assert_eq!(contribution.vehicles.get("Bulk Cement Truck"), Some(3));
        assert_eq!(contribution.labour, LabourCounts::new(3, 6));
        assert!(contribution.roles.contains("mason"));
        assert!(contribution.roles.contains("operator"));
    }

    #[rstest]
    #[case(Some(100.0), 2, false, 3, LabourCounts::new(2, 5))]
    #[case(Some(10.0), 1, false, 1, LabourCounts::new(1, 2))]
    #[case(Some(0.0), 1, false, 1, LabourCounts::new(1, 2))]
    #[case(Some(101.0), 3, true, 3, LabourCounts::new(3, 6))]
    fn test_concrete_scaling(
        #[case] quantity: Option<f64>,
        #[case] mixers: u32,
        #[case] pump: bool,
        #[case] trucks: u32,
        #[case] labour: LabourCounts,
    ) {
        let contribution = apply_heuristics(&material("cement", quantity, Some("m3"))).unwrap();
        assert_eq!(contribution.machinery.get("Concrete Mixer"), Some(mixers));
        assert_eq!(contribution.machinery.contains("Concrete Pump"), pump);
        assert_eq!(contribution.vehicles.get("Bulk Cement Truck"), Some(trucks));
        assert_eq!(contribution.labour, labour);
    }

    #[rstest]
    #[case(Some(5.0), Some("ton"))]
    #[case(Some(5.0), None)]
    #[case(None, None)]
    fn test_concrete_without_volume(#[case] quantity: Option<f64>, #[case] unit: Option<&str>) {
        let contribution = apply_heuristics(&material("cement", quantity, unit)).unwrap();
        assert_eq!(contribution.machinery.get("Concrete Mixer"), Some(1));
        assert!(!contribution.machinery.contains("Concrete Pump"));
        assert_eq!(contribution.vehicles.get("Bulk Cement Truck"), Some(1));
        assert_eq!(contribution.labour, LabourCounts::new(1, 2));
        assert!(contribution.roles.iter().eq(["mason"]));
    }

    #[test]
    fn test_concrete_mentioned_in_text() {
        let entry = MaterialEntry::from("rebar: for concrete columns - 2 ton");
        let contribution = apply_heuristics(&entry.resolve()).unwrap();
        assert_eq!(contribution.machinery.get("Concrete Mixer"), Some(1));
    }

    #[rstest]
    #[case(45.0, "m3", 3)]
    #[case(45.0, "m", 3)]
    #[case(1.5, "M3", 1)]
    #[case(0.0, "m3", 1)]
    fn test_sand_scaling(#[case] quantity: f64, #[case] unit: &str, #[case] trips: u32) {
        let contribution = apply_heuristics(&material("sand", Some(quantity), Some(unit))).unwrap();
        assert_eq!(contribution.vehicles.get("Tipper Truck"), Some(trips));
        assert_eq!(contribution.machinery.get("Loader"), Some(1));
        assert_eq!(contribution.labour, LabourCounts::new(0, trips));
        assert!(contribution.roles.iter().eq(["labourer", "operator"]));
    }

    #[rstest]
    #[case(Some("cu.m"))]
    #[case(Some("cubic metre"))]
    #[case(Some("m2"))]
    fn test_sand_with_unrecognised_volume_unit(#[case] unit: Option<&str>) {
        let contribution = apply_heuristics(&material("sand", Some(1.5), unit)).unwrap();
        assert_eq!(contribution.vehicles.get("Tipper Truck"), Some(1));
        assert_eq!(contribution.labour, LabourCounts::new(0, 2));
        assert!(contribution.roles.iter().eq(["labourer"]));
    }

    #[test]
    fn test_aggregate_without_unit() {
        let contribution = apply_heuristics(&material("aggregate", Some(20.0), None)).unwrap();
        assert_eq!(contribution.vehicles.get("Tipper Truck"), Some(1));
        assert_eq!(contribution.machinery.get("Loader"), Some(1));
        assert_eq!(contribution.labour, LabourCounts::new(0, 2));
        assert!(contribution.roles.iter().eq(["labourer"]));
    }

    #[rstest]
    #[case(Some(4000.0), LabourCounts::new(4, 8))]
    #[case(Some(200.0), LabourCounts::new(1, 3))]
    #[case(Some(0.0), LabourCounts::new(1, 6))]
    #[case(None, LabourCounts::new(1, 6))]
    fn test_masonry(#[case] quantity: Option<f64>, #[case] labour: LabourCounts) {
        let contribution = apply_heuristics(&material("brick", quantity, Some("pcs"))).unwrap();
        assert_eq!(contribution.vehicles.get("Small Truck"), Some(1));
        assert!(contribution.machinery.is_empty());
        assert_eq!(contribution.labour, labour);
        assert!(contribution.roles.contains("mason"));
    }

    #[test]
    fn test_tile() {
        let contribution = apply_heuristics(&material("tile", Some(80.0), Some("m2"))).unwrap();
        assert_eq!(contribution.vehicles.get("Small Truck"), Some(1));
        assert_eq!(contribution.labour, LabourCounts::new(2, 2));
        assert!(contribution.roles.iter().eq(["labourer"]));
    }

    #[rstest]
    #[case("timber")]
    #[case("sandpaper")]
    #[case("bricks")]
    fn test_unknown_material(#[case] name: &str) {
        let contribution = apply_heuristics(&material(name, Some(10.0), Some("m3"))).unwrap();
        assert_eq!(contribution, Contribution::default());
    }

    #[rstest]
    #[case(-5.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_malformed_quantity(#[case] quantity: f64) {
        let result = apply_heuristics(&material("sand", Some(quantity), Some("m3")));
        assert_error!(
            result,
            format!("Invalid quantity {quantity} for sand line 'sand'")
        );
    }
}

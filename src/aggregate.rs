//! Accumulators used to merge equipment and labour signals into a single estimate.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Add;

/// Headcount split by skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabourCounts {
    /// Skilled workers
    #[serde(default)]
    pub skilled: u32,
    /// Unskilled workers
    #[serde(default)]
    pub unskilled: u32,
}

impl LabourCounts {
    /// Create a new headcount
    pub fn new(skilled: u32, unskilled: u32) -> Self {
        Self { skilled, unskilled }
    }

    /// Raise each count to at least the corresponding value in `minimum`
    pub fn raise_to(&mut self, minimum: LabourCounts) {
        self.skilled = self.skilled.max(minimum.skilled);
        self.unskilled = self.unskilled.max(minimum.unskilled);
    }
}

/// Headcounts saturate rather than overflow
impl Add for LabourCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            skilled: self.skilled.saturating_add(other.skilled),
            unskilled: self.unskilled.saturating_add(other.unskilled),
        }
    }
}

/// Equipment names with their recorded counts, ordered by name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct EquipmentCounts(BTreeMap<String, u32>);

impl EquipmentCounts {
    /// Add `count` units of the named equipment, saturating at `u32::MAX`
    pub fn increment(&mut self, name: &str, count: u32) {
        let recorded = self.0.entry(name.to_string()).or_default();
        *recorded = recorded.saturating_add(count);
    }

    /// Raise the count for the named equipment to at least `minimum`
    pub fn ensure_minimum(&mut self, name: &str, minimum: u32) {
        let count = self.0.entry(name.to_string()).or_default();
        *count = (*count).max(minimum);
    }

    /// Whether the named equipment is present
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The final count for the named equipment.
    ///
    /// Present equipment always has a count of at least 1.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.0.get(name).map(|count| (*count).max(1))
    }

    /// Whether no equipment is present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over equipment names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over equipment names with their final counts
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0
            .iter()
            .map(|(name, count)| (name.as_str(), (*count).max(1)))
    }

    /// The final counts, keyed by name
    pub fn finalised(&self) -> BTreeMap<String, u32> {
        self.iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect()
    }
}

/// The equipment, labour and roles suggested by a single signal (e.g. a rule or heuristic)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contribution {
    /// Machinery increments
    pub machinery: EquipmentCounts,
    /// Vehicle increments
    pub vehicles: EquipmentCounts,
    /// Additional labour
    pub labour: LabourCounts,
    /// Labour roles needed
    pub roles: BTreeSet<String>,
}

impl Contribution {
    /// Add machinery to this contribution
    pub fn with_machinery(mut self, name: &str, count: u32) -> Self {
        self.machinery.increment(name, count);
        self
    }

    /// Add vehicles to this contribution
    pub fn with_vehicles(mut self, name: &str, count: u32) -> Self {
        self.vehicles.increment(name, count);
        self
    }

    /// Add labour to this contribution
    pub fn with_labour(mut self, skilled: u32, unskilled: u32) -> Self {
        self.labour = self.labour + LabourCounts::new(skilled, unskilled);
        self
    }

    /// Add labour roles to this contribution
    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles.extend(roles.iter().map(|role| (*role).to_string()));
        self
    }
}

/// The running estimate for a BOQ as signals are merged in
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregate {
    /// Machinery counts
    pub machinery: EquipmentCounts,
    /// Vehicle counts
    pub vehicles: EquipmentCounts,
    /// Total labour
    pub labour: LabourCounts,
    /// Labour roles
    pub roles: BTreeSet<String>,
}

impl Aggregate {
    /// Merge a contribution additively
    pub fn absorb(&mut self, contribution: Contribution) {
        for (name, count) in contribution.machinery.0 {
            self.machinery.increment(&name, count);
        }
        for (name, count) in contribution.vehicles.0 {
            self.vehicles.increment(&name, count);
        }
        self.labour = self.labour + contribution.labour;
        self.roles.extend(contribution.roles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_macro::btree_map;

    #[test]
    fn test_increment_and_ensure_minimum() {
        let mut counts = EquipmentCounts::default();
        counts.increment("Loader", 1);
        counts.increment("Loader", 2);
        counts.ensure_minimum("Loader", 2);
        counts.ensure_minimum("Excavator", 2);
        counts.ensure_minimum("Tipper Truck", 0);

        assert_eq!(counts.get("Loader"), Some(3));
        assert_eq!(counts.get("Excavator"), Some(2));
        // Present but never counted
        assert_eq!(counts.get("Tipper Truck"), Some(1));
        assert_eq!(counts.get("Crane"), None);
        assert_eq!(
            counts.finalised(),
            btree_map! {
                "Excavator".to_string() => 2,
                "Loader".to_string() => 3,
                "Tipper Truck".to_string() => 1,
            }
        );
    }

    #[test]
    fn test_names_are_sorted() {
        let mut counts = EquipmentCounts::default();
        for name in ["Tipper Truck", "Crane", "Loader"] {
            counts.increment(name, 1);
        }
        assert!(counts.names().eq(["Crane", "Loader", "Tipper Truck"]));
    }

    #[test]
    fn test_labour_raise_to() {
        let mut labour = LabourCounts::new(3, 10);
        labour.raise_to(LabourCounts::new(5, 4));
        assert_eq!(labour, LabourCounts::new(5, 10));
        assert_eq!(labour + LabourCounts::new(1, 1), LabourCounts::new(6, 11));
    }

    #[test]
    fn test_counts_saturate() {
        let mut counts = EquipmentCounts::default();
        counts.increment("Concrete Mixer", u32::MAX);
        counts.increment("Concrete Mixer", 5);
        assert_eq!(counts.get("Concrete Mixer"), Some(u32::MAX));

        let labour = LabourCounts::new(u32::MAX, 1) + LabourCounts::new(1, 1);
        assert_eq!(labour, LabourCounts::new(u32::MAX, 2));
    }

    #[test]
    fn test_absorb_is_additive() {
        let contribution = Contribution::default()
            .with_machinery("Concrete Mixer", 2)
            .with_vehicles("Bulk Cement Truck", 1)
            .with_labour(2, 4)
            .with_roles(&["mason", "operator"]);

        let mut aggregate = Aggregate::default();
        aggregate.absorb(contribution.clone());
        aggregate.absorb(contribution);

        assert_eq!(aggregate.machinery.get("Concrete Mixer"), Some(4));
        assert_eq!(aggregate.vehicles.get("Bulk Cement Truck"), Some(2));
        assert_eq!(aggregate.labour, LabourCounts::new(4, 8));
        assert_eq!(aggregate.roles.len(), 2);
    }
}

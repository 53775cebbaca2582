//! Fuel consumption profiles for construction vehicles and machinery.
//!
//! These reference values let the planner estimate fuel demand for every piece of equipment in a
//! prediction, even when the BOQ says nothing about operating hours.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::{Display, EnumString};
use unicase::UniCase;

/// Name given to the fallback profile when no equipment name was supplied
const GENERIC_EQUIPMENT_NAME: &str = "Generic Equipment";

/// Fuel used per shift by equipment with no catalogue entry
const GENERIC_LITERS_PER_SHIFT: f64 = 25.0;

/// Whether a piece of equipment is driven on roads or operated on site
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCategory {
    /// Trucks, vans, trailers
    Vehicle,
    /// Plant operated on site
    Machinery,
}

/// The energy source consumed by a piece of equipment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
pub enum FuelType {
    /// Diesel fuel
    Diesel,
    /// Petrol (gasoline)
    Petrol,
    /// Grid electricity
    Electric,
    /// On-board battery
    Battery,
    /// Equipment which consumes no fuel (e.g. formwork)
    #[strum(serialize = "None")]
    #[serde(rename = "None")]
    NoFuel,
}

/// Fuel consumption profile for a piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentProfile {
    /// Display name (e.g. "Tipper Truck")
    pub name: String,
    /// Vehicle or machinery
    pub category: EquipmentCategory,
    /// The fuel consumed
    pub fuel_type: FuelType,
    /// Litres of fuel consumed during one standard shift
    pub liters_per_shift: f64,
    /// Free-text notes about the reference equipment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Alternative names which resolve to this profile
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl EquipmentProfile {
    /// The profile used for equipment which isn't in the catalogue
    fn generic(name: &str) -> Self {
        Self {
            name: name.to_string(),
            category: EquipmentCategory::Machinery,
            fuel_type: FuelType::Diesel,
            liters_per_shift: GENERIC_LITERS_PER_SHIFT,
            notes: Some("Baseline consumption for mid-sized diesel equipment".into()),
            aliases: Vec::new(),
        }
    }
}

/// A lookup table of equipment profiles, keyed by lower-cased canonical name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EquipmentCatalog {
    profiles: IndexMap<String, EquipmentProfile>,
}

/// The built-in equipment catalogue
static BUILTIN_CATALOG: LazyLock<EquipmentCatalog> =
    LazyLock::new(|| EquipmentCatalog::from_profiles(builtin_profiles()));

impl EquipmentCatalog {
    /// Create a catalogue from a list of profiles.
    ///
    /// Each profile is keyed by its lower-cased name. Later profiles replace earlier ones with the
    /// same key.
    pub fn from_profiles<I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = EquipmentProfile>,
    {
        let profiles = profiles
            .into_iter()
            .map(|profile| (normalise(&profile.name), profile))
            .collect();
        Self { profiles }
    }

    /// The catalogue shipped with the program
    pub fn builtin() -> &'static Self {
        &BUILTIN_CATALOG
    }

    /// Number of profiles in the catalogue
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the catalogue is empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate over all profiles in catalogue order
    pub fn iter(&self) -> impl Iterator<Item = &EquipmentProfile> {
        self.profiles.values()
    }

    /// Resolve an equipment name to a fuel profile.
    ///
    /// The name is matched against canonical names first, then against aliases (ignoring case).
    /// Unknown names get a generic diesel profile carrying the supplied name. This never fails and
    /// always returns an owned copy.
    pub fn resolve(&self, name: &str) -> EquipmentProfile {
        let key = normalise(name);
        if key.is_empty() {
            return EquipmentProfile::generic(GENERIC_EQUIPMENT_NAME);
        }

        if let Some(profile) = self.profiles.get(&key) {
            return profile.clone();
        }

        let key = UniCase::new(key.as_str());
        let by_alias = self.profiles.values().find(|profile| {
            profile
                .aliases
                .iter()
                .any(|alias| UniCase::new(alias.trim()) == key)
        });
        if let Some(profile) = by_alias {
            return profile.clone();
        }

        EquipmentProfile::generic(name)
    }
}

/// Resolve an equipment name against the built-in catalogue.
///
/// See [`EquipmentCatalog::resolve`].
pub fn resolve_equipment_profile(name: &str) -> EquipmentProfile {
    EquipmentCatalog::builtin().resolve(name)
}

fn normalise(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Helper for building catalogue entries
fn profile(
    name: &str,
    category: EquipmentCategory,
    fuel_type: FuelType,
    liters_per_shift: f64,
    notes: Option<&str>,
    aliases: &[&str],
) -> EquipmentProfile {
    EquipmentProfile {
        name: name.to_string(),
        category,
        fuel_type,
        liters_per_shift,
        notes: notes.map(str::to_string),
        aliases: aliases.iter().map(|alias| (*alias).to_string()).collect(),
    }
}

#[allow(clippy::too_many_lines)]
fn builtin_profiles() -> Vec<EquipmentProfile> {
    use EquipmentCategory::{Machinery, Vehicle};
    use FuelType::{Battery, Diesel, Electric, NoFuel, Petrol};

    vec![
        profile(
            "Tipper Truck",
            Vehicle,
            Diesel,
            45.0,
            Some("10T tipper hauling aggregates"),
            &["tipper", "dump truck", "dumptruck"],
        ),
        profile(
            "Dump Truck",
            Vehicle,
            Diesel,
            50.0,
            Some("Heavy dump truck for demolition debris"),
            &["haul truck"],
        ),
        profile(
            "Pickup Truck",
            Vehicle,
            Diesel,
            18.0,
            Some("Double-cab diesel pickup for supervisors"),
            &["pickup"],
        ),
        profile(
            "Panel Van",
            Vehicle,
            Diesel,
            16.0,
            Some("Light-duty logistics van"),
            &[],
        ),
        profile(
            "Small Truck",
            Vehicle,
            Diesel,
            22.0,
            Some("3.5T truck for block and tile delivery"),
            &[],
        ),
        profile(
            "Large Truck",
            Vehicle,
            Diesel,
            55.0,
            Some("Flatbed >12T logistics"),
            &["flatbed truck"],
        ),
        profile(
            "Bulk Cement Truck",
            Vehicle,
            Diesel,
            52.0,
            Some("Pressurised bulk cement tanker"),
            &[],
        ),
        profile(
            "Concrete Mixer Truck",
            Vehicle,
            Diesel,
            60.0,
            Some("8m3 transit mixer"),
            &["transit mixer", "rmc truck"],
        ),
        profile(
            "Concrete Mixer",
            Machinery,
            Diesel,
            28.0,
            Some("On-site drum mixer"),
            &[],
        ),
        profile(
            "Concrete Pump",
            Machinery,
            Diesel,
            65.0,
            Some("Boom pump 36m class"),
            &[],
        ),
        profile(
            "Concrete Mixer & Pump",
            Machinery,
            Diesel,
            85.0,
            None,
            &["Concrete Mixer;Concrete Pump"],
        ),
        profile(
            "Concrete Vibrator",
            Machinery,
            Petrol,
            8.0,
            Some("Petrol-driven needle vibrator"),
            &["vibrator"],
        ),
        profile(
            "Loader",
            Machinery,
            Diesel,
            40.0,
            Some("1.5m3 bucket wheel loader"),
            &["wheel loader"],
        ),
        profile(
            "Excavator",
            Machinery,
            Diesel,
            65.0,
            Some("20T crawler excavator"),
            &[],
        ),
        profile(
            "Bulldozer",
            Machinery,
            Diesel,
            70.0,
            Some("Mid-size crawler dozer"),
            &["dozer"],
        ),
        profile(
            "Vibratory Roller",
            Machinery,
            Diesel,
            48.0,
            Some("12T smooth drum roller"),
            &["roller"],
        ),
        profile(
            "Scissor Lift",
            Machinery,
            Electric,
            0.0,
            Some("Battery operated access platform"),
            &[],
        ),
        profile("Boom Lift", Machinery, Diesel, 30.0, None, &[]),
        profile(
            "Tower Crane",
            Machinery,
            Electric,
            0.0,
            Some("Grid-powered tower crane"),
            &[],
        ),
        profile(
            "Mobile Crane",
            Machinery,
            Diesel,
            75.0,
            Some("50T hydraulic crane"),
            &[],
        ),
        profile(
            "Crane",
            Machinery,
            Diesel,
            60.0,
            Some("General crawler / mobile crane"),
            &[],
        ),
        profile(
            "Low-bed Trailer",
            Vehicle,
            Diesel,
            58.0,
            Some("Heavy haul tractor with low-bed"),
            &["lowbed", "low bed trailer", "trailer"],
        ),
        profile(
            "Trailer",
            Vehicle,
            Diesel,
            40.0,
            Some("General haulage trailer"),
            &[],
        ),
        profile("Panel Truck", Vehicle, Diesel, 25.0, None, &[]),
        profile(
            "Power Tools",
            Machinery,
            Electric,
            0.0,
            Some("Corded/cordless tools running on grid or battery"),
            &[],
        ),
        profile(
            "Vacuum Sander",
            Machinery,
            Electric,
            0.0,
            Some("Dust extraction sander used in interiors"),
            &[],
        ),
        profile("Laser Level", Machinery, Battery, 0.0, None, &[]),
        profile("HVAC Lift", Machinery, Electric, 0.0, None, &[]),
        profile(
            "Formwork System",
            Machinery,
            NoFuel,
            0.0,
            Some("Modular formwork does not consume fuel"),
            &[],
        ),
        profile(
            "Batching Plant",
            Machinery,
            Diesel,
            80.0,
            Some("Skid batching plant with diesel generator"),
            &[],
        ),
        profile("Water Bowser", Vehicle, Diesel, 32.0, None, &[]),
        profile(
            "Jack Hammer",
            Machinery,
            Electric,
            0.0,
            Some("Typically powered off compressors or electric"),
            &[],
        ),
        profile("Bar Bender", Machinery, Electric, 0.0, None, &[]),
        profile(
            "Scaffolding",
            Machinery,
            NoFuel,
            0.0,
            Some("Tube and coupler access scaffold"),
            &["scaffold"],
        ),
        profile(
            "Mortar Mixer",
            Machinery,
            Petrol,
            10.0,
            Some("Small paddle mixer for mortar and plaster"),
            &[],
        ),
    ]
}

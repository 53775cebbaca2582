//! Reference data on fuel grades and suppliers, used to annotate fuel plans.
//!
//! The grades reflect the products sold by Sri Lankan fuel retailers.
use crate::equipment::FuelType;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::LazyLock;

/// Major fuel retailers
const KEY_FUEL_SUPPLIERS: [&str; 3] = [
    "Ceylon Petroleum Corporation (CEYPETCO)",
    "Lanka IOC PLC (LIOC)",
    "LAUGFS Petroleum",
];

/// A commercial fuel product recommended for a fuel type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelGrade {
    /// Product name (e.g. "92 Octane")
    pub grade: String,
    /// Common name for the product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// What the product is used for
    pub description: String,
    /// Where the product can be bought
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suppliers: Vec<String>,
}

/// A fuel which isn't used by the equipment catalogue but may be relevant to site logistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelOption {
    /// Fuel name
    pub fuel: String,
    /// What the fuel is used for
    pub description: String,
}

/// Grade recommendations and supplier information for all known fuels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelReference {
    /// Petrol and diesel grades
    pub light_fuels: IndexMap<String, Vec<FuelGrade>>,
    /// Heavy and auxiliary fuels
    pub other_fuels: Vec<FuelOption>,
    /// Alternative fuels under evaluation
    pub emerging_fuels: Vec<FuelOption>,
    /// Major fuel retailers
    pub key_suppliers: Vec<String>,
    /// Recommended grades, keyed by fuel name
    grades: IndexMap<String, Vec<FuelGrade>>,
}

/// The built-in fuel reference
static BUILTIN_REFERENCE: LazyLock<FuelReference> = LazyLock::new(FuelReference::new);

impl FuelReference {
    /// The fuel reference shipped with the program
    pub fn builtin() -> &'static Self {
        &BUILTIN_REFERENCE
    }

    fn new() -> Self {
        let suppliers = || KEY_FUEL_SUPPLIERS.map(String::from).to_vec();
        let grade = |grade: &str, alias: Option<&str>, description: &str, with_suppliers: bool| {
            FuelGrade {
                grade: grade.into(),
                alias: alias.map(String::from),
                description: description.into(),
                suppliers: if with_suppliers {
                    suppliers()
                } else {
                    Vec::new()
                },
            }
        };
        let option = |fuel: &str, description: &str| FuelOption {
            fuel: fuel.into(),
            description: description.into(),
        };

        let mut light_fuels = IndexMap::new();
        light_fuels.insert(
            FuelType::Petrol.to_string(),
            vec![
                grade(
                    "92 Octane",
                    Some("Standard Petrol"),
                    "Widely available petrol for light vehicles and generators",
                    true,
                ),
                grade(
                    "95 Octane (Euro 4)",
                    Some("Premium Petrol"),
                    "High-octane petrol suited for modern engines and reduced knocking",
                    true,
                ),
            ],
        );
        light_fuels.insert(
            FuelType::Diesel.to_string(),
            vec![
                grade(
                    "Auto Diesel (Lanka Auto Diesel)",
                    Some("Standard Diesel"),
                    "Conventional diesel for trucks, buses and site equipment",
                    true,
                ),
                grade(
                    "Super Diesel (Lanka Super Diesel 4 Star Euro 4)",
                    Some("Premium Diesel"),
                    "Low-sulfur diesel providing cleaner combustion for Euro 4 engines",
                    true,
                ),
            ],
        );

        let other_fuels = vec![
            option(
                "Kerosene",
                "Lighting, cooking fuel and select industrial burners",
            ),
            option(
                "Fuel Oil (Black Oil)",
                "Heavy fuel for power plants and large industrial boilers",
            ),
            option(
                "Lubricants & Greases",
                "Engine oils, transmission fluids and maintenance consumables",
            ),
            option(
                "Aviation Turbine Fuel (ATF)",
                "Jet fuel for aircraft and select turbine-driven equipment",
            ),
        ];

        let emerging_fuels = vec![
            option(
                "Biofuels (Biodiesel / Biomass)",
                "Pilots and sustainability programs using FAME or biomass blends",
            ),
            option(
                "LPG (Liquefied Petroleum Gas)",
                "Cylinder-based supply for cooking or specialised burners",
            ),
            option(
                "CNG / LNG",
                "Natural gas options under evaluation for transport fleets",
            ),
        ];

        let mut grades = light_fuels.clone();
        let as_grade = |fuel: &FuelOption| grade(&fuel.fuel, None, &fuel.description, false);
        for (key, fuel) in ["Kerosene", "Fuel Oil", "Lubricants", "ATF"]
            .into_iter()
            .zip(&other_fuels)
        {
            grades.insert(key.into(), vec![as_grade(fuel)]);
        }
        for (key, fuel) in ["Biofuel", "LPG", "CNG"].into_iter().zip(&emerging_fuels) {
            grades.insert(key.into(), vec![as_grade(fuel)]);
        }

        let electric = vec![grade(
            "Grid Power / Battery",
            None,
            "Electrical supply (CEB/LECO grid or on-site battery banks)",
            false,
        )];
        grades.insert(FuelType::Electric.to_string(), electric.clone());
        grades.insert(FuelType::Battery.to_string(), electric);
        grades.insert(
            FuelType::NoFuel.to_string(),
            vec![grade(
                "Mechanical",
                None,
                "Equipment that does not consume fuel (e.g., passive formwork)",
                false,
            )],
        );

        Self {
            light_fuels,
            other_fuels,
            emerging_fuels,
            key_suppliers: suppliers(),
            grades,
        }
    }

    /// Recommended grades for the named fuel, if it is known
    pub fn grades_for(&self, fuel: &str) -> Option<&[FuelGrade]> {
        self.grades.get(fuel).map(Vec::as_slice)
    }

    /// Recommended grades for one of the fuel types used by equipment
    pub fn recommendations(&self, fuel_type: FuelType) -> Option<&[FuelGrade]> {
        self.grades_for(&fuel_type.to_string())
    }
}

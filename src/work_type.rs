//! Curated labour and equipment profiles for common kinds of construction work.
//!
//! A work type is a coarse classification of a BOQ (e.g. wall construction or slab concreting).
//! Its profile lists the labour roles usually needed for that work, along with the vehicles and
//! machinery a site of that kind typically runs.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// A known kind of construction work
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Brick and block walls
    WallConstruction,
    /// Interior finishing works
    #[strum(to_string = "interior_fitout", serialize = "interior_fit_out")]
    InteriorFitout,
    /// Reinforced concrete slabs
    SlabConcreting,
    /// Excavation, filling and compaction
    Earthworks,
    /// Roof structures and sheeting
    Roofing,
    /// Plastering, rendering and painting
    PlasteringPainting,
    /// Building services
    PlumbingElectrical,
}

/// The skill level of a labour role
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SkillLevel {
    /// Trades people (masons, welders, operators)
    Skilled,
    /// General labour
    Unskilled,
    /// Workers with some trade training
    SemiSkilled,
    /// Engineers, designers and surveyors
    Professional,
    /// Safety and site support staff
    Support,
}

impl SkillLevel {
    /// The skill level assumed for a role when no work-type profile says otherwise
    pub fn default_for_role(role: &str) -> Self {
        match role {
            "mason" | "welder" | "operator" | "supervisor" => Self::Skilled,
            _ => Self::Unskilled,
        }
    }
}

/// A labour role required by a work type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabourRole {
    /// Machine-readable role name (e.g. "steel_fixer")
    pub slug: String,
    /// Human-readable role name
    pub english: String,
    /// The role's skill level
    pub skill_level: SkillLevel,
}

/// The usual number of units of a piece of equipment on site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    /// Lowest typical count
    pub min: i64,
    /// Highest typical count
    pub max: i64,
}

/// A vehicle or machine typically used for a work type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRequirement {
    /// Equipment name, matching the equipment catalogue where possible
    pub name: String,
    /// The usual number of units on site
    #[serde(default)]
    pub typical_count: Option<CountRange>,
}

impl EquipmentRequirement {
    /// The minimum count to enforce for this equipment.
    ///
    /// Falls back to 1 if no count range is given or its minimum is below 1.
    pub fn minimum(&self) -> u32 {
        match self.typical_count {
            Some(range) if range.min >= 1 => u32::try_from(range.min).unwrap_or(u32::MAX),
            _ => 1,
        }
    }
}

/// The labour and equipment profile for a work type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkTypeLabourProfile {
    /// The work type described by this profile
    pub work_type: WorkType,
    /// Phrases which identify this work type in BOQ text
    pub keywords: Vec<String>,
    /// Whole words which suggest this work type when no keyword matches
    pub fallback_tokens: Vec<String>,
    /// Labour roles needed
    pub roles: Vec<LabourRole>,
    /// Vehicles typically used
    pub vehicles: Vec<EquipmentRequirement>,
    /// Machinery typically used
    pub machinery: Vec<EquipmentRequirement>,
}

/// The set of known work-type profiles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkTypeCatalog {
    profiles: IndexMap<WorkType, WorkTypeLabourProfile>,
}

/// The built-in work-type catalogue
static BUILTIN_CATALOG: LazyLock<WorkTypeCatalog> =
    LazyLock::new(|| WorkTypeCatalog::from_profiles(builtin_profiles()));

impl WorkTypeCatalog {
    /// Create a catalogue from a list of profiles
    pub fn from_profiles<I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = WorkTypeLabourProfile>,
    {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.work_type, profile))
            .collect();
        Self { profiles }
    }

    /// The catalogue shipped with the program
    pub fn builtin() -> &'static Self {
        &BUILTIN_CATALOG
    }

    /// Iterate over all profiles in catalogue order
    pub fn iter(&self) -> impl Iterator<Item = &WorkTypeLabourProfile> {
        self.profiles.values()
    }

    /// Get the profile for a work type
    pub fn get(&self, work_type: WorkType) -> Option<&WorkTypeLabourProfile> {
        self.profiles.get(&work_type)
    }

    /// Look up a profile from a work type name such as `"wall_construction"`.
    ///
    /// Returns `None` for unrecognised names.
    pub fn get_by_name(&self, name: &str) -> Option<&WorkTypeLabourProfile> {
        let work_type = WorkType::from_str(name.trim()).ok()?;
        self.get(work_type)
    }

    /// Guess the work type of a piece of BOQ text.
    ///
    /// Profiles are checked in catalogue order: first for a keyword appearing anywhere in the
    /// text, then for a fallback token appearing as a whole word.
    pub fn detect(&self, text: &str) -> Option<WorkType> {
        let text = text.to_lowercase();
        if let Some(profile) = self
            .iter()
            .find(|profile| profile.keywords.iter().any(|kw| text.contains(kw.as_str())))
        {
            return Some(profile.work_type);
        }

        let words: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();
        self.iter()
            .find(|profile| {
                profile
                    .fallback_tokens
                    .iter()
                    .any(|token| words.contains(&token.as_str()))
            })
            .map(|profile| profile.work_type)
    }
}

/// All known work types
pub fn all_work_types() -> impl Iterator<Item = WorkType> {
    WorkType::iter()
}

fn role(slug: &str, english: &str, skill_level: SkillLevel) -> LabourRole {
    LabourRole {
        slug: slug.into(),
        english: english.into(),
        skill_level,
    }
}

fn equipment(name: &str, min: i64, max: i64) -> EquipmentRequirement {
    EquipmentRequirement {
        name: name.into(),
        typical_count: Some(CountRange { min, max }),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

#[allow(clippy::too_many_lines)]
fn builtin_profiles() -> Vec<WorkTypeLabourProfile> {
    use SkillLevel::{Professional, SemiSkilled, Skilled, Support, Unskilled};

    vec![
        WorkTypeLabourProfile {
            work_type: WorkType::WallConstruction,
            keywords: strings(&["wall", "masonry", "blockwork", "brickwork"]),
            fallback_tokens: strings(&["brick", "bricks", "block", "blocks", "mortar"]),
            roles: vec![
                role("mason", "Mason", Skilled),
                role("mason_helper", "Mason helper", Unskilled),
                role("scaffolder", "Scaffolder", SemiSkilled),
                role("labourer", "General labourer", Unskilled),
                role("supervisor", "Site supervisor", Professional),
            ],
            vehicles: vec![
                equipment("Small Truck", 1, 2),
                equipment("Tipper Truck", 1, 1),
            ],
            machinery: vec![
                equipment("Mortar Mixer", 1, 2),
                equipment("Scaffolding", 1, 4),
            ],
        },
        WorkTypeLabourProfile {
            work_type: WorkType::InteriorFitout,
            keywords: strings(&["interior", "fit-out", "fitout", "gypsum", "joinery"]),
            fallback_tokens: strings(&["ceiling", "partition", "flooring", "hvac"]),
            roles: vec![
                role("interior_designer", "Interior designer", Professional),
                role("drywall_carpenter", "Drywall carpenter", Skilled),
                role("ceiling_installer", "Ceiling installer", Skilled),
                role("finishing_carpenter", "Finishing carpenter", Skilled),
                role("painter", "Painter", SemiSkilled),
                role("electrician_fitout", "Fit-out electrician", Skilled),
                role("plumber_fitout", "Fit-out plumber", Skilled),
                role("hvac_technician", "HVAC technician", Skilled),
                role("interior_helper", "Interior helper", Unskilled),
            ],
            vehicles: vec![
                equipment("Panel Van", 1, 2),
                equipment("Pickup Truck", 1, 1),
            ],
            machinery: vec![
                equipment("Scissor Lift", 1, 2),
                equipment("Power Tools", 2, 6),
                equipment("Vacuum Sander", 1, 2),
            ],
        },
        WorkTypeLabourProfile {
            work_type: WorkType::SlabConcreting,
            keywords: strings(&["slab", "pour", "deck", "raft"]),
            fallback_tokens: strings(&["concrete", "formwork", "rebar", "reinforcement"]),
            roles: vec![
                role("formwork_carpenter", "Formwork carpenter", Skilled),
                role("steel_fixer", "Steel fixer", Skilled),
                role("concrete_pump_operator", "Concrete pump operator", Skilled),
                role(
                    "concrete_vibrator_operator",
                    "Concrete vibrator operator",
                    SemiSkilled,
                ),
                role("batcher_helper", "Batching helper", Unskilled),
                role("general_labourer_slab", "General labourer", Unskilled),
                role("site_engineer_slab", "Site engineer", Professional),
                role("safety_officer_slab", "Safety officer", Support),
            ],
            vehicles: vec![
                equipment("Concrete Mixer Truck", 2, 6),
                equipment("Tipper Truck", 1, 2),
            ],
            machinery: vec![
                equipment("Concrete Pump", 1, 2),
                equipment("Concrete Mixer", 1, 2),
                equipment("Concrete Vibrator", 2, 4),
                equipment("Formwork System", 1, 1),
            ],
        },
        WorkTypeLabourProfile {
            work_type: WorkType::Earthworks,
            keywords: strings(&["earthwork", "excavation", "embankment", "grading"]),
            fallback_tokens: strings(&["soil", "fill", "trench", "compaction"]),
            roles: vec![
                role("operator_skilled", "Plant operator", Skilled),
                role("surveyor_skilled", "Surveyor", Professional),
                role("driver_unskilled", "Driver", Unskilled),
                role("labourer_unskilled", "General labourer", Unskilled),
            ],
            vehicles: vec![
                equipment("Tipper Truck", 2, 6),
                equipment("Dump Truck", 1, 3),
                equipment("Pickup Truck", 1, 1),
            ],
            machinery: vec![
                equipment("Excavator", 1, 3),
                equipment("Loader", 1, 2),
                equipment("Vibratory Roller", 1, 2),
            ],
        },
        WorkTypeLabourProfile {
            work_type: WorkType::Roofing,
            keywords: strings(&["roofing", "roof", "truss"]),
            fallback_tokens: strings(&["sheeting", "gutter", "purlin", "purlins"]),
            roles: vec![
                role("roofer", "Roofer", Skilled),
                role("welder", "Welder", Skilled),
                role("rigger", "Rigger", SemiSkilled),
                role("labourer", "General labourer", Unskilled),
            ],
            vehicles: vec![equipment("Large Truck", 1, 2)],
            machinery: vec![
                equipment("Mobile Crane", 1, 1),
                equipment("Boom Lift", 1, 2),
            ],
        },
        WorkTypeLabourProfile {
            work_type: WorkType::PlasteringPainting,
            keywords: strings(&["plaster", "render", "painting", "skim coat"]),
            fallback_tokens: strings(&["paint", "putty", "emulsion", "primer"]),
            roles: vec![
                role("plasterer", "Plasterer", Skilled),
                role("painter", "Painter", SemiSkilled),
                role("labourer", "General labourer", Unskilled),
            ],
            vehicles: vec![equipment("Pickup Truck", 1, 1)],
            machinery: vec![
                equipment("Mortar Mixer", 1, 1),
                equipment("Scaffolding", 1, 3),
            ],
        },
        WorkTypeLabourProfile {
            work_type: WorkType::PlumbingElectrical,
            keywords: strings(&["plumbing", "electrical", "wiring", "drainage"]),
            fallback_tokens: strings(&["pipe", "pipes", "cable", "conduit"]),
            roles: vec![
                role("plumber", "Plumber", Skilled),
                role("electrician", "Electrician", Skilled),
                role("helper", "Trade helper", Unskilled),
            ],
            vehicles: vec![equipment("Panel Van", 1, 1)],
            machinery: vec![equipment("Power Tools", 1, 4)],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_builtin_catalog_covers_all_work_types() {
        let catalog = WorkTypeCatalog::builtin();
        for work_type in all_work_types() {
            let profile = catalog.get(work_type).unwrap();
            assert_eq!(profile.work_type, work_type);
            assert!(!profile.roles.is_empty(), "{work_type} has no roles");
        }
    }

    #[rstest]
    #[case("wall_construction", Some(WorkType::WallConstruction))]
    #[case(" slab_concreting ", Some(WorkType::SlabConcreting))]
    #[case("interior_fit_out", Some(WorkType::InteriorFitout))]
    #[case("demolition", None)]
    fn test_get_by_name(#[case] name: &str, #[case] expected: Option<WorkType>) {
        assert_eq!(
            WorkTypeCatalog::builtin()
                .get_by_name(name)
                .map(|profile| profile.work_type),
            expected
        );
    }

    #[rstest]
    #[case("Construction of 230mm boundary wall", Some(WorkType::WallConstruction))]
    #[case(
        "Interior fit-out with gypsum ceilings",
        Some(WorkType::InteriorFitout)
    )]
    #[case("Night pour for podium deck", Some(WorkType::SlabConcreting))]
    #[case("Supply 4000 bricks to site", Some(WorkType::WallConstruction))]
    #[case("Lay 200m of PVC pipes", Some(WorkType::PlumbingElectrical))]
    // "pipework" is not a whole-word match for "pipe"
    #[case("Misc pipework", None)]
    #[case("", None)]
    fn test_detect(#[case] text: &str, #[case] expected: Option<WorkType>) {
        assert_eq!(WorkTypeCatalog::builtin().detect(text), expected);
    }

    #[rstest]
    #[case(Some(CountRange { min: 3, max: 5 }), 3)]
    #[case(Some(CountRange { min: 0, max: 2 }), 1)]
    #[case(Some(CountRange { min: -4, max: 2 }), 1)]
    #[case(None, 1)]
    fn test_equipment_minimum(#[case] typical_count: Option<CountRange>, #[case] expected: u32) {
        let requirement = EquipmentRequirement {
            name: "Loader".into(),
            typical_count,
        };
        assert_eq!(requirement.minimum(), expected);
    }

    #[rstest]
    #[case("mason", SkillLevel::Skilled)]
    #[case("operator", SkillLevel::Skilled)]
    #[case("labourer", SkillLevel::Unskilled)]
    #[case("steel_fixer", SkillLevel::Unskilled)]
    fn test_default_skill_level(#[case] role: &str, #[case] expected: SkillLevel) {
        assert_eq!(SkillLevel::default_for_role(role), expected);
    }

    #[test]
    fn test_skill_level_names() {
        assert_eq!(SkillLevel::SemiSkilled.to_string(), "semi-skilled");
        assert_eq!(
            serde_json::to_string(&SkillLevel::SemiSkilled).unwrap(),
            "\"semi-skilled\""
        );
        assert_eq!(WorkType::InteriorFitout.to_string(), "interior_fitout");
    }
}

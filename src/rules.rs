//! The rule table maps material keywords to the equipment and labour they require.
//!
//! Rules are loaded from a JSON or TOML document of the form:
//!
//! ```json
//! {
//!   "materials": {
//!     "cement": {"machinery": ["Concrete Mixer"], "vehicles": ["Bulk Cement Truck"],
//!                "labour": {"skilled": 1, "unskilled": 2}}
//!   }
//! }
//! ```
use crate::aggregate::{Contribution, LabourCounts};
use crate::input::read_config_document;
use anyhow::Result;
use indexmap::IndexMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The equipment and labour required by material matching a keyword
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RuleOutcome {
    /// Machinery to add
    #[serde(default)]
    pub machinery: Vec<String>,
    /// Vehicles to add
    #[serde(default)]
    pub vehicles: Vec<String>,
    /// Labour to add
    #[serde(default)]
    pub labour: LabourCounts,
}

impl RuleOutcome {
    /// Convert to a contribution, adding one unit of each piece of equipment
    pub fn contribution(&self) -> Contribution {
        let mut contribution = Contribution::default().with_labour(
            self.labour.skilled,
            self.labour.unskilled,
        );
        for name in &self.machinery {
            contribution.machinery.increment(name, 1);
        }
        for name in &self.vehicles {
            contribution.vehicles.increment(name, 1);
        }
        contribution
    }
}

/// Layout of a rule table document
#[derive(Debug, Deserialize)]
struct RuleDocument {
    #[serde(default)]
    materials: IndexMap<String, RuleOutcome>,
}

/// Keyword rules, checked in the order they were defined
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleTable {
    rules: IndexMap<String, RuleOutcome>,
}

impl RuleTable {
    /// Create a rule table from keyword/outcome pairs.
    ///
    /// Keywords are trimmed and lower-cased. Empty keywords are discarded, as they would match
    /// every material.
    pub fn from_rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (S, RuleOutcome)>,
        S: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .filter_map(|(keyword, outcome)| {
                let keyword = keyword.as_ref().trim().to_lowercase();
                if keyword.is_empty() {
                    warn!("Ignoring rule with empty keyword");
                    return None;
                }
                Some((keyword, outcome))
            })
            .collect();
        Self { rules }
    }

    /// Read a rule table from a JSON or TOML file
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let document: RuleDocument = read_config_document(file_path)?;
        Ok(Self::from_rules(document.materials))
    }

    /// Read a rule table, falling back to an empty table on error.
    ///
    /// A missing path or unreadable file is logged rather than returned, so the predictor can
    /// still run on heuristics alone.
    pub fn load_or_empty(file_path: Option<&Path>) -> Self {
        let Some(file_path) = file_path else {
            info!("No rule table configured; using heuristics only");
            return Self::default();
        };

        match Self::from_file(file_path) {
            Ok(table) => {
                info!(
                    "Loaded {} rules from {}",
                    table.len(),
                    file_path.display()
                );
                table
            }
            Err(err) => {
                warn!("Could not load rule table; using heuristics only: {err:?}");
                Self::default()
            }
        }
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every rule whose keyword occurs within the material name.
    ///
    /// All matching rules apply, so `"cementitious grout"` triggers both a `"cement"` and a
    /// `"grout"` rule.
    pub fn matches<'a>(
        &'a self,
        material_name: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a RuleOutcome)> + 'a {
        self.rules
            .iter()
            .filter(move |(keyword, _)| material_name.contains(keyword.as_str()))
            .map(|(keyword, outcome)| (keyword.as_str(), outcome))
    }
}

//! Parsed Bill-of-Quantities input consumed by the predictor.
//!
//! The text parser which produces these structures lives outside this crate. Materials can arrive
//! either as structured lines or as raw override strings typed by a user, so both are accepted.
use crate::units::Unit;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Matches a quantity with an optional trailing unit, e.g. `15 m3`, `2,5 tonnes` or `400`
static QUANTITY_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<qty>\d+(?:[.,]\d+)?)\s*(?P<unit>(?:m3|m2|m|kg|tonnes|tonne|tons|ton|pcs|pieces|bags|bag|ltr)\b)?",
    )
    .expect("Invalid quantity regex")
});

/// A single material line produced by the BOQ text parser.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct MaterialLine {
    /// The sentence the line was extracted from
    #[serde(default)]
    pub raw: String,
    /// Normalised material keyword (e.g. "cement")
    #[serde(default)]
    pub material: Option<String>,
    /// Detected quantity
    #[serde(default)]
    pub quantity: Option<f64>,
    /// Detected unit, as written in the source text
    #[serde(default)]
    pub unit: Option<String>,
    /// Brand names mentioned alongside the material
    #[serde(default)]
    pub brands: Vec<String>,
}

/// A material as supplied to the predictor: either structured or a raw override string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MaterialEntry {
    /// A line produced by the parser
    Line(MaterialLine),
    /// A free-text override such as `"sand: river sand - 10 m3"`
    Text(String),
}

impl From<MaterialLine> for MaterialEntry {
    fn from(line: MaterialLine) -> Self {
        Self::Line(line)
    }
}

impl From<&str> for MaterialEntry {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A material entry reduced to the fields used by the predictor
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMaterial {
    /// Lower-cased material name used for keyword matching
    pub name: Option<String>,
    /// Quantity, if one was found
    pub quantity: Option<f64>,
    /// Unit as written, if one was found
    pub unit: Option<String>,
    /// The original text of the entry
    pub text: String,
}

impl ResolvedMaterial {
    /// The normalised unit, if the written unit is recognised
    pub fn normalised_unit(&self) -> Option<Unit> {
        self.unit.as_deref().and_then(Unit::normalise)
    }
}

impl MaterialEntry {
    /// Extract the name, quantity and unit from this entry.
    pub fn resolve(&self) -> ResolvedMaterial {
        match self {
            Self::Line(line) => {
                let name = line
                    .material
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(&line.raw)
                    .to_lowercase();
                ResolvedMaterial {
                    name: (!name.is_empty()).then_some(name),
                    quantity: line.quantity,
                    unit: line.unit.clone(),
                    text: line.raw.clone(),
                }
            }
            Self::Text(text) => {
                let (name, quantity, unit) = parse_material_string(text);
                ResolvedMaterial {
                    name,
                    quantity,
                    unit,
                    text: text.clone(),
                }
            }
        }
    }
}

/// The output of the BOQ text parser, used as input to the predictor.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ParsedBoq {
    /// Material lines found in the BOQ
    #[serde(default)]
    pub materials: Vec<MaterialEntry>,
    /// The full BOQ text
    #[serde(default)]
    pub raw_text: String,
    /// The detected work type (e.g. "wall_construction"), if any
    #[serde(default)]
    pub work_type: Option<String>,
    /// Vehicles explicitly mentioned in the BOQ
    #[serde(default)]
    pub vehicle_hints: BTreeSet<String>,
    /// Machinery explicitly mentioned in the BOQ
    #[serde(default)]
    pub machinery_hints: BTreeSet<String>,
}

/// Parse a material override string into a name, quantity and unit.
///
/// Accepted forms include `"cement: ACC - 5 ton"`, `"sand 10 m3"` and `"10 m3 sand"`. The name is
/// lower-cased and reduced to its first word.
pub fn parse_material_string(text: &str) -> (Option<String>, Option<f64>, Option<String>) {
    let (name, quantity, unit) = if let Some((name_part, rest)) = text.split_once(':') {
        let (quantity, unit) = match QUANTITY_UNIT_RE.captures(rest) {
            Some(caps) => (parse_quantity(&caps["qty"]), caps.name("unit")),
            None => (None, None),
        };
        (name_part.trim().to_lowercase(), quantity, unit)
    } else if let Some(caps) = QUANTITY_UNIT_RE.captures(text) {
        let whole = caps.get(0).expect("Capture group 0 always matches");
        let mut name = text[..whole.start()].trim().to_lowercase();
        if name.is_empty() {
            name = text[whole.end()..].trim().to_lowercase();
        }
        (name, parse_quantity(&caps["qty"]), caps.name("unit"))
    } else {
        (text.trim().to_lowercase(), None, None)
    };

    let name = name.split_whitespace().next().map(str::to_string);
    (name, quantity, unit.map(|u| u.as_str().to_string()))
}

/// Parse a quantity, accepting a comma as the decimal separator
fn parse_quantity(qty: &str) -> Option<f64> {
    qty.replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cement: ACC - 5 ton", Some("cement"), Some(5.0), Some("ton"))]
    #[case("sand: river sand - 10 m3", Some("sand"), Some(10.0), Some("m3"))]
    #[case("aggregate: 20 mm - 15 m3", Some("aggregate"), Some(20.0), None)]
    #[case("sand 10 m3", Some("sand"), Some(10.0), Some("m3"))]
    #[case("sand 10 m2", Some("sand"), Some(10.0), Some("m2"))]
    #[case("10 M3 concrete", Some("concrete"), Some(10.0), Some("M3"))]
    #[case("brick 2,5 pcs", Some("brick"), Some(2.5), Some("pcs"))]
    #[case("Tile", Some("tile"), None, None)]
    #[case("block work 400", Some("block"), Some(400.0), None)]
    #[case("   ", None, None, None)]
    fn test_parse_material_string(
        #[case] text: &str,
        #[case] name: Option<&str>,
        #[case] quantity: Option<f64>,
        #[case] unit: Option<&str>,
    ) {
        assert_eq!(
            parse_material_string(text),
            (
                name.map(str::to_string),
                quantity,
                unit.map(str::to_string)
            )
        );
    }

    #[test]
    fn test_resolve_line_prefers_material() {
        let entry = MaterialEntry::Line(MaterialLine {
            raw: "Supply 50 m3 Concrete".into(),
            material: Some("Cement".into()),
            quantity: Some(50.0),
            unit: Some("m3".into()),
            brands: vec!["ACC".into()],
        });
        let resolved = entry.resolve();
        assert_eq!(resolved.name.as_deref(), Some("cement"));
        assert_eq!(resolved.quantity, Some(50.0));
        assert_eq!(resolved.normalised_unit(), Some(Unit::CubicMetre));
        assert_eq!(resolved.text, "Supply 50 m3 Concrete");
    }

    #[test]
    fn test_resolve_line_falls_back_to_raw() {
        let entry = MaterialEntry::Line(MaterialLine {
            raw: "Bulk Excavation".into(),
            ..Default::default()
        });
        assert_eq!(entry.resolve().name.as_deref(), Some("bulk excavation"));

        let empty = MaterialEntry::Line(MaterialLine::default());
        assert_eq!(empty.resolve().name, None);
    }

    #[test]
    fn test_parsed_boq_deserialise_mixed_materials() {
        let json = r#"{
            "materials": [
                {"raw": "50 m3 concrete", "material": "concrete", "quantity": 50, "unit": "m3"},
                "sand: river sand - 10 m3"
            ],
            "raw_text": "Concrete works",
            "vehicle_hints": ["Pickup Truck"]
        }"#;
        let boq: ParsedBoq = serde_json::from_str(json).unwrap();
        assert_eq!(boq.materials.len(), 2);
        assert!(matches!(boq.materials[0], MaterialEntry::Line(_)));
        assert_eq!(
            boq.materials[1],
            MaterialEntry::Text("sand: river sand - 10 m3".into())
        );
        assert_eq!(boq.work_type, None);
        assert!(boq.vehicle_hints.contains("Pickup Truck"));
        assert!(boq.machinery_hints.is_empty());
    }
}

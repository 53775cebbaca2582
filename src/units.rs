//! Units of measurement found in BOQ line items.
use serde::Serialize;
use std::str::FromStr;
use strum::{Display, EnumString};

/// A normalised unit of measurement for a material quantity.
///
/// Parsing is case-insensitive and accepts the units produced by the BOQ parser, along with their
/// plural forms. Spelled-out or dotted forms such as `cu.m` are not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive)]
pub enum Unit {
    /// Cubic metres
    #[strum(to_string = "m3")]
    #[serde(rename = "m3")]
    CubicMetre,
    /// Square metres
    #[strum(to_string = "m2")]
    #[serde(rename = "m2")]
    SquareMetre,
    /// Metres (linear)
    #[strum(to_string = "m")]
    #[serde(rename = "m")]
    Metre,
    /// Kilograms
    #[strum(to_string = "kg", serialize = "kgs")]
    #[serde(rename = "kg")]
    Kilogram,
    /// Metric tonnes
    #[strum(to_string = "ton", serialize = "tons", serialize = "tonne", serialize = "tonnes")]
    #[serde(rename = "ton")]
    Tonne,
    /// Individual pieces
    #[strum(to_string = "pcs", serialize = "pieces")]
    #[serde(rename = "pcs")]
    Piece,
    /// Bags (e.g. of cement)
    #[strum(to_string = "bag", serialize = "bags")]
    #[serde(rename = "bag")]
    Bag,
    /// Litres
    #[strum(to_string = "ltr")]
    #[serde(rename = "ltr")]
    Litre,
}

impl Unit {
    /// Normalise a written unit, returning `None` if it is not recognised
    pub fn normalise(unit: &str) -> Option<Self> {
        Self::from_str(unit.trim()).ok()
    }

    /// Whether quantities in this unit can be used to scale volume-based heuristics.
    ///
    /// Only `m3` and `m` qualify. Linear metres are accepted because BOQ authors frequently drop
    /// the exponent.
    pub fn is_volume_like(self) -> bool {
        matches!(self, Self::CubicMetre | Self::Metre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("m3", Some(Unit::CubicMetre))]
    #[case("M3", Some(Unit::CubicMetre))]
    #[case(" m3 ", Some(Unit::CubicMetre))]
    #[case("cu.m", None)]
    #[case("m³", None)]
    #[case("metre", None)]
    #[case("m", Some(Unit::Metre))]
    #[case("Tonnes", Some(Unit::Tonne))]
    #[case("pieces", Some(Unit::Piece))]
    #[case("bags", Some(Unit::Bag))]
    #[case("furlong", None)]
    #[case("", None)]
    fn test_normalise(#[case] input: &str, #[case] expected: Option<Unit>) {
        assert_eq!(Unit::normalise(input), expected);
    }

    #[rstest]
    #[case(Unit::CubicMetre, true)]
    #[case(Unit::Metre, true)]
    #[case(Unit::SquareMetre, false)]
    #[case(Unit::Tonne, false)]
    fn test_is_volume_like(#[case] unit: Unit, #[case] expected: bool) {
        assert_eq!(unit.is_volume_like(), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(Unit::CubicMetre.to_string(), "m3");
        assert_eq!(Unit::Tonne.to_string(), "ton");
    }
}

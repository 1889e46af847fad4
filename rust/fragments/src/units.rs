// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model unit assignment
//!
//! Carried through the converter untouched so the renderer can label
//! measurements. Only the length factor has a numeric meaning.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single named unit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitDescriptor {
    /// Prefix and name as declared, e.g. `MILLI METRE`
    pub name: String,
    /// Display symbol when the unit is a known one
    pub symbol: Option<String>,
    /// Prefix scale (MILLI = 0.001, none = 1)
    pub scale: f64,
}

/// Units declared by a model
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct UnitSet {
    pub length: Option<UnitDescriptor>,
    pub area: Option<UnitDescriptor>,
    pub volume: Option<UnitDescriptor>,
    pub mass: Option<UnitDescriptor>,
    /// Length unit expressed in metres
    pub length_factor: f64,
}

impl Default for UnitSet {
    fn default() -> Self {
        Self {
            length: None,
            area: None,
            volume: None,
            mass: None,
            length_factor: 1.0,
        }
    }
}

impl UnitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one unit assignment (`LENGTHUNIT`, `AREAUNIT`, `VOLUMEUNIT`, `MASSUNIT`)
    ///
    /// Other unit types are ignored. Returns whether the assignment was recorded.
    pub fn assign(&mut self, unit_type: &str, prefix: Option<&str>, name: &str) -> bool {
        let full_name = match prefix {
            Some(prefix) => format!("{} {}", prefix, name),
            None => name.to_string(),
        };
        let descriptor = UnitDescriptor {
            symbol: unit_symbol(&full_name).map(str::to_string),
            scale: prefix.map_or(1.0, prefix_scale),
            name: full_name,
        };

        let slot = match unit_type {
            "LENGTHUNIT" => {
                self.length_factor = length_unit_value(name) * prefix_factor(prefix);
                &mut self.length
            }
            "AREAUNIT" => &mut self.area,
            "VOLUMEUNIT" => &mut self.volume,
            "MASSUNIT" => &mut self.mass,
            _ => return false,
        };
        *slot = Some(descriptor);
        true
    }
}

fn unit_symbol(full_name: &str) -> Option<&'static str> {
    Some(match full_name {
        "MILLI METRE" => "mm",
        "METRE" => "m",
        "SQUARE_METRE" => "m²",
        "CUBIC_METRE" => "m³",
        "KILO GRAM" => "kg",
        "FOOT" => "ft",
        "SQUARE FOOT" => "ft²",
        "CUBIC FOOT" => "ft³",
        _ => return None,
    })
}

/// Unknown prefixes scale by 1
fn prefix_scale(prefix: &str) -> f64 {
    match prefix {
        "MILLI" => 0.001,
        "CENTI" => 0.01,
        "DECI" => 0.1,
        "DECA" => 10.0,
        "HECTO" => 100.0,
        "KILO" => 1000.0,
        _ => 1.0,
    }
}

fn length_unit_value(name: &str) -> f64 {
    match name {
        "FOOT" => 0.3048,
        _ => 1.0,
    }
}

// Only a MILLI prefix changes the length factor
fn prefix_factor(prefix: Option<&str>) -> f64 {
    match prefix {
        Some("MILLI") => 0.001,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_millimetre_length() {
        let mut units = UnitSet::new();
        assert!(units.assign("LENGTHUNIT", Some("MILLI"), "METRE"));

        let length = units.length.as_ref().unwrap();
        assert_eq!(length.name, "MILLI METRE");
        assert_eq!(length.symbol.as_deref(), Some("mm"));
        assert_relative_eq!(length.scale, 0.001);
        assert_relative_eq!(units.length_factor, 0.001);
    }

    #[test]
    fn test_foot_length_factor() {
        let mut units = UnitSet::new();
        units.assign("LENGTHUNIT", None, "FOOT");
        assert_relative_eq!(units.length_factor, 0.3048);
        assert_eq!(units.length.unwrap().symbol.as_deref(), Some("ft"));
    }

    #[test]
    fn test_other_kinds() {
        let mut units = UnitSet::new();
        units.assign("AREAUNIT", None, "SQUARE_METRE");
        units.assign("VOLUMEUNIT", None, "CUBIC_METRE");
        units.assign("MASSUNIT", Some("KILO"), "GRAM");
        assert!(!units.assign("TIMEUNIT", None, "SECOND"));

        assert_eq!(units.area.unwrap().symbol.as_deref(), Some("m²"));
        assert_eq!(units.volume.unwrap().symbol.as_deref(), Some("m³"));
        let mass = units.mass.unwrap();
        assert_eq!(mass.symbol.as_deref(), Some("kg"));
        assert_relative_eq!(mass.scale, 1000.0);
        assert_relative_eq!(units.length_factor, 1.0);
    }

    #[test]
    fn test_unknown_symbol_kept_as_name() {
        let mut units = UnitSet::new();
        units.assign("LENGTHUNIT", Some("CENTI"), "METRE");
        let length = units.length.unwrap();
        assert_eq!(length.symbol, None);
        assert_relative_eq!(length.scale, 0.01);
        // CENTI does not contribute to the length factor
        assert_relative_eq!(units.length_factor, 1.0);
    }
}

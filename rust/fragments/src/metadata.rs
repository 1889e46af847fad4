// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-element metadata supplied by the spatial/category annotator

use crate::units::UnitSet;
use rustc_hash::FxHashMap;
use serde_json::Value;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// File header information, passed through to the model
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ModelHeader {
    pub name: String,
    pub description: String,
    pub schema: String,
    #[cfg_attr(feature = "serde", serde(alias = "maxExpressID"))]
    pub max_express_id: u32,
}

/// Free-form property records keyed by the annotator's own keys
///
/// Element records use the decimal element id as key. Model-wide entries such
/// as `"Unit"` sit next to them.
pub type PropertyBag = FxHashMap<String, Value>;

/// Floor level and category codes keyed by element id
///
/// Lookups never fail: identifiers the annotator did not see resolve to 0.
/// Floor levels are signed, basements below the reference storey are negative.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ElementMetadata {
    #[cfg_attr(feature = "serde", serde(alias = "itemsByFloor"))]
    pub floor_levels: FxHashMap<u32, i32>,
    pub categories: FxHashMap<u32, u32>,
    pub units: UnitSet,
    #[cfg_attr(feature = "serde", serde(alias = "uuid"))]
    pub project_id: Option<String>,
    #[cfg_attr(feature = "serde", serde(alias = "ifcMetadata"))]
    pub header: ModelHeader,
    pub properties: PropertyBag,
}

impl ElementMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn floor_level(&self, element_id: u32) -> i32 {
        self.floor_levels.get(&element_id).copied().unwrap_or(0)
    }

    #[inline]
    pub fn category(&self, element_id: u32) -> u32 {
        self.categories.get(&element_id).copied().unwrap_or(0)
    }

    pub fn set_floor_level(&mut self, element_id: u32, level: i32) {
        self.floor_levels.insert(element_id, level);
    }

    pub fn set_category(&mut self, element_id: u32, category: u32) {
        self.categories.insert(element_id, category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ids_default_to_zero() {
        let mut metadata = ElementMetadata::new();
        metadata.set_floor_level(3, 2);
        metadata.set_category(3, 17);

        assert_eq!(metadata.floor_level(3), 2);
        assert_eq!(metadata.category(3), 17);
        assert_eq!(metadata.floor_level(42), 0);
        assert_eq!(metadata.category(42), 0);
    }

    #[test]
    fn test_basement_levels_are_negative() {
        let mut metadata = ElementMetadata::new();
        metadata.set_floor_level(9, -1);
        metadata.set_floor_level(10, -2);

        assert_eq!(metadata.floor_level(9), -1);
        assert_eq!(metadata.floor_level(10), -2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_upstream_document_keeps_negative_levels_and_properties() {
        let json = r#"{
            "itemsByFloor": { "5": -1, "6": 2 },
            "categories": { "5": 3495092785 },
            "properties": { "5": { "Name": "Basement slab" }, "Unit": { "Unit": {} } }
        }"#;
        let metadata: ElementMetadata = serde_json::from_str(json).unwrap();

        assert_eq!(metadata.floor_level(5), -1);
        assert_eq!(metadata.floor_level(6), 2);
        assert_eq!(metadata.category(5), 3_495_092_785);
        assert_eq!(metadata.properties["5"]["Name"], "Basement slab");
        assert!(metadata.properties.contains_key("Unit"));

        let back: ElementMetadata = serde_json::from_str(&serde_json::to_string(&metadata).unwrap()).unwrap();
        assert_eq!(back, metadata);
    }
}

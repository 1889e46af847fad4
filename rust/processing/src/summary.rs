// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable overview of a loaded model

use ifc_fragments::FragmentModel;
use ifc_fragments_geometry::BoundingBox;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsSummary {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundsSummary {
    /// `None` for a model without geometry
    pub fn from_bounds(bounds: &BoundingBox) -> Option<Self> {
        bounds.is_valid().then(|| Self {
            min: [bounds.min.x, bounds.min.y, bounds.min.z],
            max: [bounds.max.x, bounds.max.y, bounds.max.z],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub fragments: usize,
    pub instanced_fragments: usize,
    pub merged_fragments: usize,
    pub instance_slots: usize,
    pub elements: usize,
    pub bounding_box: Option<BoundsSummary>,
    pub length_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub schema: String,
}

impl ModelSummary {
    pub fn from_model(model: &FragmentModel) -> Self {
        Self {
            fragments: model.fragment_count(),
            instanced_fragments: model.instanced_count(),
            merged_fragments: model.merged_count(),
            instance_slots: model.instance_count(),
            elements: model.items().len(),
            bounding_box: BoundsSummary::from_bounds(model.bounding_box()),
            length_factor: model.units().length_factor,
            project_id: model.project_id().map(str::to_string),
            schema: model.header().schema.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_fragments::{
        ElementMetadata, FragmentConverter, Instance, ParsedGeometrySet, RawBuffer, Rgba, ShapeKey,
        IDENTITY_MATRIX,
    };

    #[test]
    fn test_summary_counts() {
        let white = Rgba::opaque(1.0, 1.0, 1.0);
        let buffer = RawBuffer::new(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 1.0], vec![0, 1, 1]);
        let mut set = ParsedGeometrySet::new();
        set.insert(
            ShapeKey::new(1, false),
            buffer.clone(),
            vec![Instance::new(1, white, IDENTITY_MATRIX), Instance::new(2, white, IDENTITY_MATRIX)],
        );
        set.insert(ShapeKey::new(2, false), buffer, vec![Instance::new(3, white, IDENTITY_MATRIX)]);

        let model = FragmentConverter::new().generate(set, &ElementMetadata::default());
        let summary = ModelSummary::from_model(&model);

        assert_eq!(summary.fragments, 2);
        assert_eq!(summary.instanced_fragments, 1);
        assert_eq!(summary.merged_fragments, 1);
        assert_eq!(summary.instance_slots, 3);
        assert_eq!(summary.elements, 3);
        assert_eq!(
            summary.bounding_box,
            Some(BoundsSummary {
                min: [0.0, 0.0, 0.0],
                max: [2.0, 3.0, 4.0]
            })
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["instancedFragments"], 1);
        assert!(json.get("projectId").is_none());
    }

    #[test]
    fn test_empty_model_has_no_bounds() {
        let model = FragmentConverter::new().generate(ParsedGeometrySet::new(), &ElementMetadata::default());
        let summary = ModelSummary::from_model(&model);
        assert_eq!(summary.bounding_box, None);
        assert_eq!(summary.length_factor, 1.0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The assembled model handed to the renderer
//!
//! A [`FragmentModel`] is immutable once the converter returns it. The only
//! later change is its group placement, which geo-rebasing replaces as a whole.

use crate::fragment::{Fragment, FragmentKey};
use crate::index::IdentifierIndex;
use crate::metadata::{ElementMetadata, ModelHeader, PropertyBag};
use crate::units::UnitSet;
use ifc_fragments_geometry::{matrix_to_column_major, BoundingBox, Matrix4};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Property bag key under which the model records its coordination matrix
pub const COORDINATION_MATRIX_PROPERTY: &str = "coordinationMatrix";

/// Per-element join of fragment keys and annotator codes
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub keys: SmallVec<[FragmentKey; 2]>,
    pub floor_level: i32,
    pub category: u32,
}

#[derive(Debug, Clone)]
pub struct FragmentModel {
    fragments: Vec<Fragment>,
    key_fragments: FxHashMap<FragmentKey, String>,
    index: IdentifierIndex,
    items: BTreeMap<u32, ElementData>,
    coordination_matrix: Matrix4<f64>,
    bounding_box: BoundingBox,
    placement: Matrix4<f64>,
    units: UnitSet,
    project_id: Option<String>,
    header: ModelHeader,
    properties: PropertyBag,
}

impl FragmentModel {
    /// Join fragments, index and metadata into a model
    ///
    /// Every indexed element gets an [`ElementData`] entry; elements the
    /// metadata does not know get floor level and category 0. The bounding box
    /// is the union of every fragment's world bounds. The property bag is copied
    /// as is, with the coordination matrix recorded under
    /// [`COORDINATION_MATRIX_PROPERTY`].
    pub(crate) fn assemble(
        fragments: Vec<Fragment>,
        key_fragments: FxHashMap<FragmentKey, String>,
        index: IdentifierIndex,
        metadata: &ElementMetadata,
        coordination_matrix: Matrix4<f64>,
    ) -> Self {
        let items = index
            .iter()
            .map(|(element_id, keys)| {
                let data = ElementData {
                    keys: SmallVec::from_slice(keys),
                    floor_level: metadata.floor_level(element_id),
                    category: metadata.category(element_id),
                };
                (element_id, data)
            })
            .collect();

        let mut properties = metadata.properties.clone();
        properties.insert(
            COORDINATION_MATRIX_PROPERTY.to_string(),
            serde_json::Value::from(matrix_to_column_major(&coordination_matrix).to_vec()),
        );

        let mut bounding_box = BoundingBox::empty();
        for fragment in &fragments {
            bounding_box.union(&fragment.world_bounds());
        }

        Self {
            fragments,
            key_fragments,
            index,
            items,
            coordination_matrix,
            bounding_box,
            placement: Matrix4::identity(),
            units: metadata.units.clone(),
            project_id: metadata.project_id.clone(),
            header: metadata.header.clone(),
            properties,
        }
    }

    /// Fragments in key order
    #[inline]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    #[inline]
    pub fn fragment(&self, key: FragmentKey) -> Option<&Fragment> {
        self.fragments.get(key.index()).filter(|f| f.key == key)
    }

    pub fn fragment_by_id(&self, id: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.id == id)
    }

    /// Fragments holding geometry of `element_id`
    pub fn fragments_for(&self, element_id: u32) -> impl Iterator<Item = &Fragment> + '_ {
        self.index
            .get(element_id)
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&key| self.fragment(key))
    }

    #[inline]
    pub fn key_fragments(&self) -> &FxHashMap<FragmentKey, String> {
        &self.key_fragments
    }

    #[inline]
    pub fn index(&self) -> &IdentifierIndex {
        &self.index
    }

    #[inline]
    pub fn items(&self) -> &BTreeMap<u32, ElementData> {
        &self.items
    }

    #[inline]
    pub fn element(&self, element_id: u32) -> Option<&ElementData> {
        self.items.get(&element_id)
    }

    #[inline]
    pub fn coordination_matrix(&self) -> &Matrix4<f64> {
        &self.coordination_matrix
    }

    /// Bounds in model space, before the group placement
    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Bounds after the group placement
    pub fn world_bounding_box(&self) -> BoundingBox {
        self.bounding_box.transformed(&self.placement)
    }

    #[inline]
    pub fn placement(&self) -> &Matrix4<f64> {
        &self.placement
    }

    pub(crate) fn set_placement(&mut self, placement: Matrix4<f64>) {
        self.placement = placement;
    }

    #[inline]
    pub fn units(&self) -> &UnitSet {
        &self.units
    }

    #[inline]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    #[inline]
    pub fn header(&self) -> &ModelHeader {
        &self.header
    }

    /// Annotator properties plus the column-major coordination matrix
    #[inline]
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    #[inline]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn instanced_count(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_instanced()).count()
    }

    pub fn merged_count(&self) -> usize {
        self.fragments.len() - self.instanced_count()
    }

    /// Instance slots across all fragments
    pub fn instance_count(&self) -> usize {
        self.fragments.iter().map(Fragment::instance_count).sum()
    }
}

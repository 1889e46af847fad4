// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragments: the draw-ready output units
//!
//! A fragment owns one geometry buffer and one material and is drawn either as
//! a set of GPU instances of that buffer, or as a single static buffer built
//! from many merged shapes (one identity instance).

use crate::composite::ItemLabel;
use crate::material::Material;
use ifc_fragments_geometry::{BoundingBox, Color, Matrix4, Mesh};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;

/// Sequential fragment key, unique within one model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentKey(pub u32);

impl FragmentKey {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One GPU instance
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSlot {
    /// Instanced slots carry one label; the merged slot carries one per element
    pub labels: SmallVec<[ItemLabel; 1]>,
    pub transform: Matrix4<f64>,
    /// Per-instance colour (linear); merged fragments colour via their material
    pub color: Option<Color>,
}

/// Sub-buffer of a merged fragment owned by one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRegion {
    pub element_id: u32,
    pub first_vertex: usize,
    pub vertex_count: usize,
    pub first_index: usize,
    pub index_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
    Instanced,
    Merged { regions: Vec<MergedRegion> },
}

#[derive(Debug, Clone)]
pub struct Fragment {
    pub key: FragmentKey,
    /// Unique handle registered in the model's key map
    pub id: String,
    pub geometry: Mesh,
    /// Bounds of `geometry` before any instance transform
    pub geometry_bounds: BoundingBox,
    pub material: Material,
    /// Number of instances the fragment was allocated for
    pub capacity: usize,
    slots: Vec<InstanceSlot>,
    seen: FxHashSet<u32>,
    /// Next repeat index per element seen more than once
    composites: FxHashMap<u32, u32>,
    representation: Representation,
}

impl Fragment {
    /// Empty instanced fragment with room for `capacity` instances
    pub fn instanced(key: FragmentKey, geometry: Mesh, material: Material, capacity: usize) -> Self {
        Self {
            key,
            id: uuid::Uuid::new_v4().to_string(),
            geometry_bounds: geometry.bounds(),
            geometry,
            material,
            capacity,
            slots: Vec::with_capacity(capacity),
            seen: FxHashSet::default(),
            composites: FxHashMap::default(),
            representation: Representation::Instanced,
        }
    }

    /// Merged fragment with its single identity instance labelled by the region owners
    pub fn merged(
        key: FragmentKey,
        geometry: Mesh,
        material: Material,
        regions: Vec<MergedRegion>,
    ) -> Self {
        let labels = regions
            .iter()
            .map(|region| ItemLabel::Bare(region.element_id))
            .collect();
        let slot = InstanceSlot {
            labels,
            transform: Matrix4::identity(),
            color: None,
        };

        Self {
            key,
            id: uuid::Uuid::new_v4().to_string(),
            geometry_bounds: geometry.bounds(),
            geometry,
            material,
            capacity: 1,
            slots: vec![slot],
            seen: FxHashSet::default(),
            composites: FxHashMap::default(),
            representation: Representation::Merged { regions },
        }
    }

    /// Label for the next occurrence of `element_id` in this fragment
    ///
    /// The first occurrence gets the bare id. Every later one gets a composite
    /// label whose repeat index counts up from 1.
    pub fn next_label(&mut self, element_id: u32) -> ItemLabel {
        if self.seen.insert(element_id) {
            return ItemLabel::Bare(element_id);
        }
        let counter = self.composites.entry(element_id).or_insert(1);
        let label = ItemLabel::new(element_id, *counter);
        *counter += 1;
        label
    }

    /// Append an instance slot
    pub fn push_instance(&mut self, label: ItemLabel, transform: Matrix4<f64>, color: Color) {
        self.slots.push(InstanceSlot {
            labels: smallvec::smallvec![label],
            transform,
            color: Some(color),
        });
    }

    #[inline]
    pub fn slots(&self) -> &[InstanceSlot] {
        &self.slots
    }

    #[inline]
    pub fn instance_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    #[inline]
    pub fn is_instanced(&self) -> bool {
        matches!(self.representation, Representation::Instanced)
    }

    /// Regions of a merged fragment (empty for instanced ones)
    pub fn regions(&self) -> &[MergedRegion] {
        match &self.representation {
            Representation::Merged { regions } => regions,
            Representation::Instanced => &[],
        }
    }

    /// Repeat counters of elements that occur more than once
    #[inline]
    pub fn composites(&self) -> &FxHashMap<u32, u32> {
        &self.composites
    }

    /// Bounds after every instance transform is applied
    pub fn world_bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for slot in &self.slots {
            bounds.union(&self.geometry_bounds.transformed(&slot.transform));
        }
        bounds
    }

    /// Every label carried by the fragment's slots, in slot order
    pub fn labels(&self) -> impl Iterator<Item = &ItemLabel> + '_ {
        self.slots.iter().flat_map(|slot| slot.labels.iter())
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragment conversion
//!
//! One pass over the geometry table decides, per shape, between GPU instancing
//! and static merging:
//!
//! - a shape placed more than once becomes its own instanced fragment, one slot
//!   per placement, with repeated elements relabelled as composites;
//! - a shape placed once is moved into model space and parked in a bucket keyed
//!   by its exact colour and transparency. After classification every bucket is
//!   folded into one merged fragment.
//!
//! Keys are handed out sequentially: instanced fragments in table order, then
//! merged fragments in bucket creation order.

use crate::arena::{MeshArena, MeshKey};
use crate::fragment::{Fragment, FragmentKey, MergedRegion};
use crate::index::IdentifierIndex;
use crate::input::{ParsedGeometrySet, ShapeEntry};
use crate::material::{Material, MaterialKey};
use crate::metadata::ElementMetadata;
use crate::model::FragmentModel;
use ifc_fragments_geometry::{matrix_from_column_major, Color, Mesh};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::time::Instant;

/// Counters of one conversion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub shapes_seen: usize,
    pub shapes_skipped: usize,
    pub instanced_fragments: usize,
    pub merged_fragments: usize,
    /// Single-instance shapes folded into merged fragments
    pub merged_shapes: usize,
    pub instance_slots: usize,
}

/// Single-instance shapes sharing one colour and transparency
#[derive(Debug)]
struct MergeBucket {
    key: MaterialKey,
    shapes: Vec<(u32, MeshKey)>,
}

/// Converts a geometry table into a [`FragmentModel`]
///
/// All state is owned by the converter and scoped to one load. It is reset by
/// [`FragmentConverter::clean_up`], which [`FragmentConverter::generate`] also
/// runs before starting, so leftovers of an earlier load never leak into the
/// next one.
#[derive(Debug, Default)]
pub struct FragmentConverter {
    next_key: u32,
    fragments: Vec<Fragment>,
    key_fragments: FxHashMap<FragmentKey, String>,
    index: IdentifierIndex,
    arena: MeshArena,
    buckets: Vec<MergeBucket>,
    bucket_lookup: FxHashMap<MaterialKey, usize>,
    stats: ConversionStats,
}

impl FragmentConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one conversion pass
    ///
    /// Never fails: empty or malformed shapes are skipped, and elements without
    /// metadata get floor level and category 0.
    pub fn generate(
        &mut self,
        geometries: ParsedGeometrySet,
        metadata: &ElementMetadata,
    ) -> FragmentModel {
        let start = Instant::now();
        self.clean_up();

        let coordination_matrix = matrix_from_column_major(&geometries.coordination_matrix);
        tracing::debug!(shapes = geometries.len(), "Starting fragment conversion");

        for entry in geometries.into_items() {
            self.classify(entry);
        }
        self.merge_buckets();

        let model = FragmentModel::assemble(
            std::mem::take(&mut self.fragments),
            std::mem::take(&mut self.key_fragments),
            std::mem::take(&mut self.index),
            metadata,
            coordination_matrix,
        );

        let stats = &self.stats;
        tracing::info!(
            fragments = model.fragment_count(),
            instanced = stats.instanced_fragments,
            merged = stats.merged_fragments,
            merged_shapes = stats.merged_shapes,
            instance_slots = stats.instance_slots,
            elements = model.items().len(),
            skipped = stats.shapes_skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fragment conversion complete"
        );

        model
    }

    /// Counters of the last pass
    #[inline]
    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// Drop all per-load state
    pub fn clean_up(&mut self) {
        self.next_key = 0;
        self.fragments.clear();
        self.key_fragments.clear();
        self.index.clear();
        self.arena.clear();
        self.buckets.clear();
        self.bucket_lookup.clear();
        self.stats = ConversionStats::default();
    }

    fn allocate_key(&mut self) -> FragmentKey {
        let key = FragmentKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn classify(&mut self, entry: ShapeEntry) {
        self.stats.shapes_seen += 1;
        let ShapeEntry {
            key: shape_key,
            buffer,
            instances,
        } = entry;

        let Some(first) = instances.first() else {
            tracing::debug!(shape = %shape_key, "Skipping shape without instances");
            self.stats.shapes_skipped += 1;
            return;
        };

        let mut mesh = match buffer.to_mesh() {
            Ok(mesh) => mesh,
            Err(err) if err.is_empty_mesh() => {
                tracing::debug!(shape = %shape_key, "Skipping empty shape");
                self.stats.shapes_skipped += 1;
                return;
            }
            Err(err) => {
                tracing::warn!(shape = %shape_key, error = %err, "Skipping malformed shape");
                self.stats.shapes_skipped += 1;
                return;
            }
        };
        drop(buffer);

        // Transparency follows the first instance even when later ones differ
        let material = Material::from_alpha(first.color.a);

        if instances.len() == 1 {
            let instance = first;
            mesh.transform(&matrix_from_column_major(&instance.matrix));
            let material_key = MaterialKey::from_rgba(&instance.color, material.transparent);
            let mesh_key = self.arena.insert(mesh);
            self.bucket_for(material_key)
                .shapes
                .push((instance.element_id, mesh_key));
            return;
        }

        let key = self.allocate_key();
        let mut fragment = Fragment::instanced(key, mesh, material, instances.len());
        for instance in &instances {
            let label = fragment.next_label(instance.element_id);
            let color = Color::from_srgb(instance.color.r, instance.color.g, instance.color.b);
            fragment.push_instance(label, matrix_from_column_major(&instance.matrix), color);
            // Repeats are already covered by the bare label's entry
            if !label.is_composite() {
                self.index.insert(instance.element_id, key);
            }
        }

        tracing::trace!(shape = %shape_key, key = key.0, instances = instances.len(), "Instanced fragment");
        self.stats.instanced_fragments += 1;
        self.stats.instance_slots += fragment.instance_count();
        self.key_fragments.insert(key, fragment.id.clone());
        self.fragments.push(fragment);
    }

    fn bucket_for(&mut self, key: MaterialKey) -> &mut MergeBucket {
        let position = match self.bucket_lookup.get(&key) {
            Some(&position) => position,
            None => {
                let position = self.buckets.len();
                self.buckets.push(MergeBucket {
                    key,
                    shapes: Vec::new(),
                });
                self.bucket_lookup.insert(key, position);
                position
            }
        };
        &mut self.buckets[position]
    }

    fn merge_buckets(&mut self) {
        let buckets = std::mem::take(&mut self.buckets);
        self.bucket_lookup.clear();

        for bucket in buckets {
            self.merge_bucket(bucket);
        }

        // Every parked mesh has been folded by now
        debug_assert!(self.arena.is_empty());
        self.arena.clear();
    }

    fn merge_bucket(&mut self, bucket: MergeBucket) {
        // Group by owning element, keeping first-encountered order
        let mut groups: Vec<(u32, SmallVec<[MeshKey; 1]>)> = Vec::new();
        let mut group_lookup: FxHashMap<u32, usize> = FxHashMap::default();
        for &(element_id, mesh_key) in &bucket.shapes {
            match group_lookup.get(&element_id) {
                Some(&position) => groups[position].1.push(mesh_key),
                None => {
                    group_lookup.insert(element_id, groups.len());
                    groups.push((element_id, smallvec::smallvec![mesh_key]));
                }
            }
        }

        let mut merged = Mesh::new();
        let mut regions = Vec::with_capacity(groups.len());
        for (element_id, mesh_keys) in groups {
            let group_mesh = self.fold_group(&mesh_keys);
            if group_mesh.is_empty() {
                continue;
            }
            regions.push(MergedRegion {
                element_id,
                first_vertex: merged.vertex_count(),
                vertex_count: group_mesh.vertex_count(),
                first_index: merged.indices.len(),
                index_count: group_mesh.indices.len(),
            });
            merged.merge(&group_mesh);
            self.stats.merged_shapes += mesh_keys.len();
        }

        if regions.is_empty() {
            return;
        }

        let key = self.allocate_key();
        for region in &regions {
            self.index.insert(region.element_id, key);
        }

        let fragment = Fragment::merged(key, merged, bucket.key.material(), regions);
        tracing::trace!(
            key = key.0,
            elements = fragment.regions().len(),
            vertices = fragment.geometry.vertex_count(),
            transparent = bucket.key.transparent,
            "Merged fragment"
        );
        self.stats.merged_fragments += 1;
        self.stats.instance_slots += 1;
        self.key_fragments.insert(key, fragment.id.clone());
        self.fragments.push(fragment);
    }

    /// Move the meshes of one element out of the arena, merging several into one
    fn fold_group(&mut self, mesh_keys: &[MeshKey]) -> Mesh {
        if let [single] = mesh_keys {
            return self.arena.take(*single).unwrap_or_else(Mesh::new);
        }

        let meshes: Vec<Mesh> = mesh_keys
            .iter()
            .filter_map(|&key| self.arena.take(key))
            .collect();
        let mut group = Mesh::new();
        group.merge_all(&meshes);
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::ItemLabel;
    use crate::fragment::Representation;
    use crate::input::{Instance, RawBuffer, Rgba, ShapeKey, IDENTITY_MATRIX};
    use approx::assert_relative_eq;
    use ifc_fragments_geometry::Point3;

    fn triangle_buffer() -> RawBuffer {
        #[rustfmt::skip]
        let vertex_data = vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0,
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
            0.0, 1.0, 0.0, 0.0, 0.0, 1.0,
        ];
        RawBuffer::new(vertex_data, vec![0, 1, 2])
    }

    fn translation(x: f64, y: f64, z: f64) -> [f64; 16] {
        let mut matrix = IDENTITY_MATRIX;
        matrix[12] = x;
        matrix[13] = y;
        matrix[14] = z;
        matrix
    }

    fn instance(element_id: u32, color: Rgba) -> Instance {
        Instance::new(element_id, color, IDENTITY_MATRIX)
    }

    const GREY: Rgba = Rgba::opaque(0.5, 0.5, 0.5);

    #[test]
    fn test_instanced_keys_come_before_merged() {
        let mut set = ParsedGeometrySet::new();
        set.insert(ShapeKey::new(1, false), triangle_buffer(), vec![instance(1, GREY)]);
        set.insert(
            ShapeKey::new(2, false),
            triangle_buffer(),
            vec![instance(2, GREY), instance(3, GREY)],
        );

        let mut converter = FragmentConverter::new();
        let model = converter.generate(set, &ElementMetadata::default());

        assert_eq!(model.fragment_count(), 2);
        assert!(model.fragments()[0].is_instanced());
        assert_eq!(model.fragments()[0].key, FragmentKey(0));
        assert!(!model.fragments()[1].is_instanced());
        assert_eq!(model.fragments()[1].key, FragmentKey(1));
        assert_eq!(model.index().get(1), Some(&[FragmentKey(1)][..]));
        assert_eq!(model.key_fragments().len(), 2);
    }

    #[test]
    fn test_single_instance_is_moved_into_model_space() {
        let mut set = ParsedGeometrySet::new();
        set.insert(
            ShapeKey::new(1, false),
            triangle_buffer(),
            vec![Instance::new(4, GREY, translation(10.0, 0.0, 0.0))],
        );

        let model = FragmentConverter::new().generate(set, &ElementMetadata::default());
        let fragment = &model.fragments()[0];

        assert_eq!(fragment.slots()[0].transform, ifc_fragments_geometry::Matrix4::identity());
        assert_eq!(&fragment.geometry.positions[0..3], &[10.0, 0.0, 0.0]);
        assert_eq!(model.bounding_box().min, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(model.bounding_box().max, Point3::new(11.0, 1.0, 0.0));
    }

    #[test]
    fn test_buckets_split_by_colour_and_transparency() {
        let red = Rgba::opaque(1.0, 0.0, 0.0);
        let red_glass = Rgba::new(1.0, 0.0, 0.0, 0.3);
        let mut set = ParsedGeometrySet::new();
        set.insert(ShapeKey::new(1, false), triangle_buffer(), vec![instance(1, red)]);
        set.insert(ShapeKey::new(2, true), triangle_buffer(), vec![instance(2, red_glass)]);
        set.insert(ShapeKey::new(3, false), triangle_buffer(), vec![instance(3, GREY)]);
        set.insert(ShapeKey::new(4, false), triangle_buffer(), vec![instance(4, red)]);

        let mut converter = FragmentConverter::new();
        let model = converter.generate(set, &ElementMetadata::default());

        assert_eq!(model.fragment_count(), 3);
        let owners: Vec<Vec<u32>> = model
            .fragments()
            .iter()
            .map(|f| f.regions().iter().map(|r| r.element_id).collect())
            .collect();
        assert_eq!(owners, vec![vec![1, 4], vec![2], vec![3]]);

        let glass = &model.fragments()[1].material;
        assert!(glass.transparent);
        assert_relative_eq!(glass.opacity, 0.4);
        assert!(!model.fragments()[0].material.transparent);
        assert_eq!(model.fragments()[0].material.color, Color::from_srgb(1.0, 0.0, 0.0));

        assert_eq!(converter.stats().merged_fragments, 3);
        assert_eq!(converter.stats().merged_shapes, 4);
    }

    #[test]
    fn test_merged_regions_follow_first_encounter() {
        let mut set = ParsedGeometrySet::new();
        for (geometry, element) in [(1, 8), (2, 3), (3, 8)] {
            set.insert(
                ShapeKey::new(geometry, false),
                triangle_buffer(),
                vec![instance(element, GREY)],
            );
        }

        let model = FragmentConverter::new().generate(set, &ElementMetadata::default());
        let fragment = &model.fragments()[0];

        let Representation::Merged { regions } = fragment.representation() else {
            panic!("expected a merged fragment");
        };
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].element_id, 8);
        assert_eq!(regions[0].vertex_count, 6);
        assert_eq!(regions[0].index_count, 6);
        assert_eq!(regions[1].element_id, 3);
        assert_eq!(regions[1].first_vertex, 6);
        assert_eq!(regions[1].first_index, 6);

        let labels: Vec<ItemLabel> = fragment.labels().copied().collect();
        assert_eq!(labels, vec![ItemLabel::Bare(8), ItemLabel::Bare(3)]);
        assert_eq!(fragment.geometry.indices, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_slot_colours_are_decoded_from_srgb() {
        let mut set = ParsedGeometrySet::new();
        set.insert(
            ShapeKey::new(1, false),
            triangle_buffer(),
            vec![
                instance(1, Rgba::opaque(0.5, 0.2, 0.9)),
                instance(2, Rgba::opaque(0.1, 0.1, 0.1)),
            ],
        );

        let model = FragmentConverter::new().generate(set, &ElementMetadata::default());
        let slots = model.fragments()[0].slots();
        assert_eq!(slots[0].color, Some(Color::from_srgb(0.5, 0.2, 0.9)));
        assert_eq!(slots[1].color, Some(Color::from_srgb(0.1, 0.1, 0.1)));
        assert_eq!(model.fragments()[0].material.color, Color::WHITE);
    }

    #[test]
    fn test_malformed_shapes_are_skipped_without_keys() {
        let mut set = ParsedGeometrySet::new();
        set.insert(
            ShapeKey::new(1, false),
            RawBuffer::new(vec![0.0; 7], vec![0]),
            vec![instance(1, GREY), instance(1, GREY)],
        );
        set.insert(
            ShapeKey::new(2, false),
            RawBuffer::new(vec![0.0; 6], vec![0, 1, 2]),
            vec![instance(2, GREY)],
        );
        set.insert(ShapeKey::new(3, false), triangle_buffer(), Vec::new());
        set.insert(
            ShapeKey::new(4, false),
            triangle_buffer(),
            vec![instance(4, GREY), instance(5, GREY)],
        );

        let mut converter = FragmentConverter::new();
        let model = converter.generate(set, &ElementMetadata::default());

        assert_eq!(model.fragment_count(), 1);
        assert_eq!(model.fragments()[0].key, FragmentKey(0));
        assert_eq!(converter.stats().shapes_seen, 4);
        assert_eq!(converter.stats().shapes_skipped, 3);
        assert!(!model.index().contains(1));
        assert!(!model.index().contains(2));
    }

    #[test]
    fn test_clean_up_resets_state() {
        let build = || {
            let mut set = ParsedGeometrySet::new();
            set.insert(
                ShapeKey::new(1, false),
                triangle_buffer(),
                vec![instance(1, GREY), instance(2, GREY)],
            );
            set
        };

        let mut converter = FragmentConverter::new();
        let first = converter.generate(build(), &ElementMetadata::default());
        let second = converter.generate(build(), &ElementMetadata::default());
        assert_eq!(first.fragments()[0].key, FragmentKey(0));
        assert_eq!(second.fragments()[0].key, FragmentKey(0));
        assert_eq!(second.fragment_count(), 1);

        converter.clean_up();
        assert_eq!(*converter.stats(), ConversionStats::default());
    }
}

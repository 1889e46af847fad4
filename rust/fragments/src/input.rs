// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry input contract
//!
//! The geometry reader hands the converter a flat table: one entry per unique
//! shape (interleaved vertex buffer + index buffer) with every placement of that
//! shape as an [`Instance`]. Shapes keep their insertion order, which is the
//! order the converter classifies them in.

use crate::error::{Error, Result};
use ifc_fragments_geometry::Mesh;
use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Column-major identity matrix
#[rustfmt::skip]
pub const IDENTITY_MATRIX: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// Alpha forced onto placements whose category must render transparent
pub const FORCED_TRANSPARENT_ALPHA: f32 = 0.1;

/// Shape identifier, prefixed by transparency (`+12` opaque, `-12` transparent)
///
/// The same geometry can appear both opaque and transparent; the prefix keeps
/// those apart so a shape never mixes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct ShapeKey {
    pub transparent: bool,
    pub geometry_id: u32,
}

impl ShapeKey {
    #[inline]
    pub fn new(geometry_id: u32, transparent: bool) -> Self {
        Self {
            transparent,
            geometry_id,
        }
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.transparent { '-' } else { '+' };
        write!(f, "{}{}", prefix, self.geometry_id)
    }
}

impl FromStr for ShapeKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidShapeKey(s.to_string());
        let transparent = match s.as_bytes().first() {
            Some(b'+') => false,
            Some(b'-') => true,
            _ => return Err(invalid()),
        };
        let digits = &s[1..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let geometry_id = digits.parse().map_err(|_| invalid())?;
        Ok(Self::new(geometry_id, transparent))
    }
}

impl TryFrom<String> for ShapeKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ShapeKey> for String {
    fn from(key: ShapeKey) -> Self {
        key.to_string()
    }
}

/// RGBA colour with 0..1 channels (sRGB-encoded)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgba {
    #[cfg_attr(feature = "serde", serde(alias = "x"))]
    pub r: f32,
    #[cfg_attr(feature = "serde", serde(alias = "y"))]
    pub g: f32,
    #[cfg_attr(feature = "serde", serde(alias = "z"))]
    pub b: f32,
    #[cfg_attr(feature = "serde", serde(alias = "w"))]
    pub a: f32,
}

impl Rgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque colour
    #[inline]
    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Anything other than alpha exactly 1 counts as transparent
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.a != 1.0
    }
}

/// Raw decoded buffer: interleaved `[px, py, pz, nx, ny, nz]` vertices + u32 indices
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RawBuffer {
    pub vertex_data: Vec<f32>,
    pub index_data: Vec<u32>,
}

impl RawBuffer {
    pub fn new(vertex_data: Vec<f32>, index_data: Vec<u32>) -> Self {
        Self {
            vertex_data,
            index_data,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_data.is_empty() || self.index_data.is_empty()
    }

    /// De-interleave into a renderer mesh
    pub fn to_mesh(&self) -> Result<Mesh> {
        Ok(Mesh::from_interleaved(&self.vertex_data, &self.index_data)?)
    }
}

/// One placement of a shape
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Instance {
    pub color: Rgba,
    /// Column-major 4x4 placement
    pub matrix: [f64; 16],
    /// Owning model element (express id)
    #[cfg_attr(feature = "serde", serde(alias = "expressID", alias = "elementID"))]
    pub element_id: u32,
}

impl Instance {
    pub fn new(element_id: u32, color: Rgba, matrix: [f64; 16]) -> Self {
        Self {
            color,
            matrix,
            element_id,
        }
    }
}

/// A unique shape and all of its placements
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeEntry {
    pub key: ShapeKey,
    pub buffer: RawBuffer,
    pub instances: Vec<Instance>,
}

/// The geometry table produced by the geometry reader
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "camelCase", from = "GeometrySetRepr")
)]
pub struct ParsedGeometrySet {
    items: Vec<ShapeEntry>,
    /// File-to-world transform supplied by the source format
    pub coordination_matrix: [f64; 16],
    #[cfg_attr(feature = "serde", serde(skip))]
    lookup: FxHashMap<ShapeKey, usize>,
}

impl ParsedGeometrySet {
    pub fn new() -> Self {
        Self::with_coordination_matrix(IDENTITY_MATRIX)
    }

    pub fn with_coordination_matrix(coordination_matrix: [f64; 16]) -> Self {
        Self {
            items: Vec::new(),
            coordination_matrix,
            lookup: FxHashMap::default(),
        }
    }

    /// Add a shape; instances of an already known key are appended to it
    pub fn insert(&mut self, key: ShapeKey, buffer: RawBuffer, instances: Vec<Instance>) {
        match self.lookup.get(&key) {
            Some(&index) => self.items[index].instances.extend(instances),
            None => {
                self.lookup.insert(key, self.items.len());
                self.items.push(ShapeEntry {
                    key,
                    buffer,
                    instances,
                });
            }
        }
    }

    /// Record one placed geometry from the reader's mesh stream
    ///
    /// A placement is transparent when its alpha is not 1 or transparency is
    /// forced (forced placements get alpha [`FORCED_TRANSPARENT_ALPHA`]). The
    /// first placement of a shape loads its buffer through `load_buffer`; when
    /// that yields nothing or an empty buffer the placement is dropped. Returns
    /// whether the placement was recorded.
    pub fn stream_geometry<F>(
        &mut self,
        element_id: u32,
        geometry_id: u32,
        color: Rgba,
        matrix: [f64; 16],
        force_transparent: bool,
        load_buffer: F,
    ) -> bool
    where
        F: FnOnce(u32) -> Option<RawBuffer>,
    {
        let key = ShapeKey::new(geometry_id, color.is_transparent() || force_transparent);
        let mut color = color;
        if force_transparent {
            color.a = FORCED_TRANSPARENT_ALPHA;
        }
        let instance = Instance::new(element_id, color, matrix);

        if let Some(&index) = self.lookup.get(&key) {
            self.items[index].instances.push(instance);
            return true;
        }

        match load_buffer(geometry_id) {
            Some(buffer) if !buffer.is_empty() => {
                self.insert(key, buffer, vec![instance]);
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn get(&self, key: &ShapeKey) -> Option<&ShapeEntry> {
        self.lookup.get(key).map(|&index| &self.items[index])
    }

    /// Shapes in insertion order
    #[inline]
    pub fn items(&self) -> &[ShapeEntry] {
        &self.items
    }

    /// Consume the set, yielding shapes in insertion order
    #[inline]
    pub fn into_items(self) -> Vec<ShapeEntry> {
        self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total placements across all shapes
    pub fn instance_count(&self) -> usize {
        self.items.iter().map(|item| item.instances.len()).sum()
    }
}

impl Default for ParsedGeometrySet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeometrySetRepr {
    #[serde(default)]
    items: Vec<ShapeEntry>,
    #[serde(default = "identity_matrix")]
    coordination_matrix: [f64; 16],
}

#[cfg(feature = "serde")]
fn identity_matrix() -> [f64; 16] {
    IDENTITY_MATRIX
}

#[cfg(feature = "serde")]
impl From<GeometrySetRepr> for ParsedGeometrySet {
    fn from(repr: GeometrySetRepr) -> Self {
        let mut set = ParsedGeometrySet::with_coordination_matrix(repr.coordination_matrix);
        for entry in repr.items {
            set.insert(entry.key, entry.buffer, entry.instances);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_buffer() -> RawBuffer {
        RawBuffer::new(vec![0.0; 18], vec![0, 1, 2])
    }

    #[test]
    fn test_shape_key_round_trip() {
        let opaque: ShapeKey = "+12".parse().unwrap();
        assert_eq!(opaque, ShapeKey::new(12, false));
        assert_eq!(opaque.to_string(), "+12");

        let transparent: ShapeKey = "-7".parse().unwrap();
        assert!(transparent.transparent);
        assert_eq!(String::from(transparent), "-7");
    }

    #[test]
    fn test_shape_key_rejects_unprefixed() {
        for key in ["12", "", "+", "-", "+1a", "*3", "+-3"] {
            assert!(key.parse::<ShapeKey>().is_err(), "key {:?}", key);
        }
    }

    #[test]
    fn test_insert_appends_instances_to_known_key() {
        let mut set = ParsedGeometrySet::new();
        let key = ShapeKey::new(1, false);
        let red = Rgba::opaque(1.0, 0.0, 0.0);

        set.insert(key, cube_buffer(), vec![Instance::new(5, red, IDENTITY_MATRIX)]);
        set.insert(key, RawBuffer::default(), vec![Instance::new(6, red, IDENTITY_MATRIX)]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.instance_count(), 2);
        assert_eq!(set.get(&key).unwrap().buffer, cube_buffer());
    }

    #[test]
    fn test_stream_geometry_splits_by_transparency() {
        let mut set = ParsedGeometrySet::new();
        let mut loads = 0;

        for (element, alpha) in [(1, 1.0), (2, 1.0), (3, 0.5)] {
            let recorded = set.stream_geometry(
                element,
                40,
                Rgba::new(0.2, 0.2, 0.2, alpha),
                IDENTITY_MATRIX,
                false,
                |_| {
                    loads += 1;
                    Some(cube_buffer())
                },
            );
            assert!(recorded);
        }

        assert_eq!(loads, 2);
        assert_eq!(set.len(), 2);
        assert_eq!(set.items()[0].key.to_string(), "+40");
        assert_eq!(set.items()[0].instances.len(), 2);
        assert_eq!(set.items()[1].key.to_string(), "-40");
    }

    #[test]
    fn test_stream_geometry_forced_transparency_and_missing_buffers() {
        let mut set = ParsedGeometrySet::new();

        assert!(set.stream_geometry(
            9,
            3,
            Rgba::opaque(1.0, 1.0, 1.0),
            IDENTITY_MATRIX,
            true,
            |_| Some(cube_buffer()),
        ));
        let entry = set.get(&ShapeKey::new(3, true)).unwrap();
        assert_eq!(entry.instances[0].color.a, FORCED_TRANSPARENT_ALPHA);

        assert!(!set.stream_geometry(10, 4, Rgba::opaque(1.0, 1.0, 1.0), IDENTITY_MATRIX, false, |_| None));
        assert!(!set.stream_geometry(
            11,
            5,
            Rgba::opaque(1.0, 1.0, 1.0),
            IDENTITY_MATRIX,
            false,
            |_| Some(RawBuffer::default()),
        ));
        assert_eq!(set.len(), 1);
    }
}

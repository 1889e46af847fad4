// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-load storage for intermediate shape meshes
//!
//! Single-instance shapes are transformed into model space and parked here
//! until their colour bucket is merged. The merge loop moves each mesh out as
//! it is folded, so a folded mesh can no longer be reached through its key.
//! Whatever is left is dropped wholesale with [`MeshArena::clear`].

use ifc_fragments_geometry::Mesh;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key for a parked shape mesh
    pub struct MeshKey;
}

#[derive(Debug, Default)]
pub struct MeshArena {
    meshes: SlotMap<MeshKey, Mesh>,
}

impl MeshArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert(&mut self, mesh: Mesh) -> MeshKey {
        self.meshes.insert(mesh)
    }

    #[inline]
    pub fn get(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    /// Move a mesh out of the arena, releasing its slot
    #[inline]
    pub fn take(&mut self, key: MeshKey) -> Option<Mesh> {
        self.meshes.remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Bytes held by parked meshes
    pub fn byte_size(&self) -> usize {
        self.meshes.values().map(Mesh::byte_size).sum()
    }

    /// Drop every parked mesh
    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}

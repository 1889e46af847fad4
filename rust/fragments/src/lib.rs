// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Fragments
//!
//! Converts a parsed building model (unique shapes plus their placements) into
//! draw-ready fragments:
//!
//! - shapes placed many times become **instanced** fragments, one GPU instance
//!   per placement;
//! - shapes placed once are moved into model space and **merged** per colour
//!   into a single static buffer.
//!
//! The resulting [`FragmentModel`] carries an element id to fragment key index,
//! per-element floor/category codes and the aggregate bounding box.
//!
//! ```rust,ignore
//! use ifc_fragments::{ElementMetadata, FragmentConverter, ParsedGeometrySet};
//!
//! let mut converter = FragmentConverter::new();
//! let model = converter.generate(geometries, &metadata);
//! for fragment in model.fragments_for(42) {
//!     println!("{} -> {}", fragment.key, fragment.id);
//! }
//! converter.clean_up();
//! ```

pub mod arena;
pub mod composite;
pub mod converter;
pub mod error;
pub mod fragment;
pub mod index;
pub mod input;
pub mod material;
pub mod metadata;
pub mod model;
pub mod rebase;
pub mod units;

pub use composite::{decode_composite, element_id_of, encode_composite, ItemLabel, COMPOSITE_SEPARATOR};
pub use converter::{ConversionStats, FragmentConverter};
pub use error::{Error, Result};
pub use fragment::{Fragment, FragmentKey, InstanceSlot, MergedRegion, Representation};
pub use index::IdentifierIndex;
pub use input::{
    Instance, ParsedGeometrySet, RawBuffer, Rgba, ShapeEntry, ShapeKey, FORCED_TRANSPARENT_ALPHA,
    IDENTITY_MATRIX,
};
pub use material::{Material, MaterialKey, PolygonOffset, TRANSPARENT_OPACITY};
pub use metadata::{ElementMetadata, ModelHeader, PropertyBag};
pub use model::{ElementData, FragmentModel, COORDINATION_MATRIX_PROPERTY};
pub use rebase::{rebase_on_host, GeoAnchor, GeoRebase, MapHost, RebaseOutcome};
pub use units::{UnitDescriptor, UnitSet};

// Re-export geometry types used in the public API
pub use ifc_fragments_geometry::{BoundingBox, Color, Matrix4, Mesh, Point3};

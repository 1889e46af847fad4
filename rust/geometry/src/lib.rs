// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Fragments Geometry
//!
//! Render-ready buffers for the fragment converter: de-interleaved meshes,
//! f64 bounding boxes, sRGB/linear colour conversion and column-major 4x4
//! transform helpers built on nalgebra.

pub mod bounds;
pub mod color;
pub mod error;
pub mod mesh;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use bounds::BoundingBox;
pub use color::Color;
pub use error::{Error, Result};
pub use mesh::Mesh;
pub use transform::{
    matrix_from_column_major, matrix_from_slice, matrix_to_column_major, rotation_x,
    uniform_scale,
};

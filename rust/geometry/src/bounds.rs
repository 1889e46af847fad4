// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes in f64 precision
//!
//! Shapes compute their local box while their buffer is built; the model box
//! is the union of every fragment box after instance/merge transforms. Union is
//! commutative and associative, so the aggregation order never matters.

use nalgebra::{Matrix4, Point3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Point3<f64>,
    /// Maximum corner
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Create an empty box (invalid until a point is added)
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Create a box from two corners
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Compute the box of a flat `[x, y, z, ...]` position array
    pub fn from_positions(positions: &[f32]) -> Self {
        let mut bounds = Self::empty();
        positions.chunks_exact(3).for_each(|chunk| {
            bounds.expand(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        });
        bounds
    }

    /// Check if the box contains at least one point
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Expand the box to include a point
    #[inline]
    pub fn expand(&mut self, x: f64, y: f64, z: f64) {
        self.min.x = self.min.x.min(x);
        self.min.y = self.min.y.min(y);
        self.min.z = self.min.z.min(z);
        self.max.x = self.max.x.max(x);
        self.max.y = self.max.y.max(y);
        self.max.z = self.max.z.max(z);
    }

    #[inline]
    pub fn expand_point(&mut self, point: &Point3<f64>) {
        self.expand(point.x, point.y, point.z);
    }

    /// Grow this box to cover `other`; empty boxes are ignored
    #[inline]
    pub fn union(&mut self, other: &BoundingBox) {
        if !other.is_valid() {
            return;
        }
        self.expand_point(&other.min);
        self.expand_point(&other.max);
    }

    /// Box of this box after `matrix` is applied (all 8 corners are transformed)
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> BoundingBox {
        if !self.is_valid() {
            return *self;
        }

        let mut result = BoundingBox::empty();
        for &x in &[self.min.x, self.max.x] {
            for &y in &[self.min.y, self.max.y] {
                for &z in &[self.min.z, self.max.z] {
                    result.expand_point(&matrix.transform_point(&Point3::new(x, y, z)));
                }
            }
        }
        result
    }

    /// Get centroid (center of bounding box)
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        if !self.is_valid() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis (zero for an empty box)
    #[inline]
    pub fn size(&self) -> (f64, f64, f64) {
        if !self.is_valid() {
            return (0.0, 0.0, 0.0);
        }
        (
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared 4x4 transform utilities
//!
//! Placement matrices arrive as flat 16-element arrays in column-major order
//! (the renderer convention). nalgebra stores matrices column-major as well,
//! so conversion is a straight copy.

use crate::error::{Error, Result};
use nalgebra::{Matrix4, Rotation3, Vector3};

/// Build a matrix from a column-major array
#[inline]
pub fn matrix_from_column_major(values: &[f64; 16]) -> Matrix4<f64> {
    Matrix4::from_column_slice(values)
}

/// Build a matrix from a column-major slice, validating length and finiteness
pub fn matrix_from_slice(values: &[f64]) -> Result<Matrix4<f64>> {
    if values.len() != 16 {
        return Err(Error::InvalidMatrix(format!(
            "expected 16 values, got {}",
            values.len()
        )));
    }
    if let Some(position) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::InvalidMatrix(format!(
            "non-finite value at index {}",
            position
        )));
    }
    Ok(Matrix4::from_column_slice(values))
}

/// Flatten a matrix into a column-major array
#[inline]
pub fn matrix_to_column_major(matrix: &Matrix4<f64>) -> [f64; 16] {
    let mut values = [0.0; 16];
    values.copy_from_slice(matrix.as_slice());
    values
}

/// Rotation about the X axis
#[inline]
pub fn rotation_x(angle: f64) -> Matrix4<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle).to_homogeneous()
}

/// Uniform scale
#[inline]
pub fn uniform_scale(scale: f64) -> Matrix4<f64> {
    Matrix4::new_scaling(scale)
}

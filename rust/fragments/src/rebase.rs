// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geo-rebasing of an assembled model into a host map's render frame
//!
//! The model is scaled, turned Y-up to Z-up and then placed with the host's
//! render transform at a WGS84 anchor:
//!
//! ```text
//! placement = host_transform * Rx(up_axis_rotation) * S(scale)
//! ```
//!
//! Only the model's group placement changes. Fragment buffers are never
//! touched, and a failing host query leaves the model where it was.

use crate::model::FragmentModel;
use ifc_fragments_geometry::{matrix_from_slice, rotation_x, uniform_scale, Matrix4};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

pub const DEFAULT_ANCHOR_LONGITUDE: f64 = 10.544538805374891;
pub const DEFAULT_ANCHOR_LATITUDE: f64 = 46.50861247649143;
pub const DEFAULT_REBASE_SCALE: f64 = 1000.0;

/// WGS84 position the model origin is pinned to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoAnchor {
    pub longitude: f64,
    pub latitude: f64,
    /// Ground elevation; filled in from the host before the transform is requested
    pub elevation: f64,
}

impl GeoAnchor {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            elevation: 0.0,
        }
    }
}

impl Default for GeoAnchor {
    fn default() -> Self {
        Self::new(DEFAULT_ANCHOR_LONGITUDE, DEFAULT_ANCHOR_LATITUDE)
    }
}

/// The map engine hosting the renderer
///
/// Both queries may fail; a failure skips rebasing.
pub trait MapHost {
    type Error: fmt::Display;

    /// Ground elevation at a WGS84 position
    fn query_elevation(&self, longitude: f64, latitude: f64) -> Result<f64, Self::Error>;

    /// Column-major render transform at `anchor`
    fn render_transform_at(&self, anchor: &GeoAnchor) -> Result<Vec<f64>, Self::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RebaseOutcome {
    Applied {
        anchor: GeoAnchor,
        placement: Matrix4<f64>,
    },
    /// Placement left untouched
    Skipped(String),
}

impl RebaseOutcome {
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, RebaseOutcome::Applied { .. })
    }
}

/// Fixed part of the rebase transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRebase {
    pub scale: f64,
    /// Rotation about X reconciling the model's up axis with the host's
    pub up_axis_rotation: f64,
}

impl Default for GeoRebase {
    fn default() -> Self {
        Self {
            scale: DEFAULT_REBASE_SCALE,
            up_axis_rotation: FRAC_PI_2,
        }
    }
}

impl GeoRebase {
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    pub fn placement(&self, host_transform: &Matrix4<f64>) -> Matrix4<f64> {
        host_transform * rotation_x(self.up_axis_rotation) * uniform_scale(self.scale)
    }

    /// Replace the model's placement for a known host transform
    pub fn apply(&self, model: &mut FragmentModel, host_transform: &Matrix4<f64>) -> Matrix4<f64> {
        let placement = self.placement(host_transform);
        model.set_placement(placement);
        placement
    }
}

/// Query the host for the anchor's elevation and render transform and rebase the model
///
/// Never fails: any host error is logged and reported as
/// [`RebaseOutcome::Skipped`], leaving the model at its current placement.
pub fn rebase_on_host<H>(
    model: &mut FragmentModel,
    host: &H,
    anchor: GeoAnchor,
    rebase: &GeoRebase,
) -> RebaseOutcome
where
    H: MapHost + ?Sized,
{
    let skipped = |reason: String| {
        tracing::warn!(
            longitude = anchor.longitude,
            latitude = anchor.latitude,
            reason = %reason,
            "Geo-rebasing skipped"
        );
        RebaseOutcome::Skipped(reason)
    };

    let elevation = match host.query_elevation(anchor.longitude, anchor.latitude) {
        Ok(elevation) if elevation.is_finite() => elevation,
        Ok(elevation) => return skipped(format!("non-finite elevation {}", elevation)),
        Err(err) => return skipped(format!("elevation query failed: {}", err)),
    };
    let anchor = GeoAnchor { elevation, ..anchor };

    let values = match host.render_transform_at(&anchor) {
        Ok(values) => values,
        Err(err) => return skipped(format!("render transform query failed: {}", err)),
    };
    let host_transform = match matrix_from_slice(&values) {
        Ok(matrix) => matrix,
        Err(err) => return skipped(err.to_string()),
    };

    let placement = rebase.apply(model, &host_transform);
    tracing::info!(
        longitude = anchor.longitude,
        latitude = anchor.latitude,
        elevation = anchor.elevation,
        scale = rebase.scale,
        "Model rebased onto host"
    );
    RebaseOutcome::Applied { anchor, placement }
}

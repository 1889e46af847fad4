// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragment materials and the merge-bucket key

use crate::input::Rgba;
use ifc_fragments_geometry::Color;

/// Opacity of every transparent material
pub const TRANSPARENT_OPACITY: f32 = 0.4;

/// Depth offset applied to transparent materials against coplanar z-fighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonOffset {
    pub factor: f32,
    pub units: f32,
}

impl PolygonOffset {
    pub const TRANSPARENT: PolygonOffset = PolygonOffset {
        factor: 5.0,
        units: 1.0,
    };
}

/// Renderer material descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub transparent: bool,
    pub opacity: f32,
    pub depth_write: bool,
    pub polygon_offset: Option<PolygonOffset>,
}

impl Material {
    /// Material for a shape whose first instance has `alpha`
    pub fn from_alpha(alpha: f32) -> Self {
        Self::new(Color::WHITE, alpha != 1.0)
    }

    pub fn new(color: Color, transparent: bool) -> Self {
        if transparent {
            Self {
                color,
                transparent,
                opacity: TRANSPARENT_OPACITY,
                depth_write: false,
                polygon_offset: Some(PolygonOffset::TRANSPARENT),
            }
        } else {
            Self {
                color,
                transparent,
                opacity: 1.0,
                depth_write: true,
                polygon_offset: None,
            }
        }
    }

    #[inline]
    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Color::WHITE, false)
    }
}

/// Merge bucket key: exact RGB channels plus transparency
///
/// Channels are stored as f32 bit patterns so equality is exact with no
/// tolerance. `-0.0` is folded into `0.0`; NaN channels compare by bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    r: u32,
    g: u32,
    b: u32,
    pub transparent: bool,
}

impl MaterialKey {
    pub fn new(r: f32, g: f32, b: f32, transparent: bool) -> Self {
        Self {
            r: channel_bits(r),
            g: channel_bits(g),
            b: channel_bits(b),
            transparent,
        }
    }

    /// Key of `color` for a shape whose transparency was already decided
    #[inline]
    pub fn from_rgba(color: &Rgba, transparent: bool) -> Self {
        Self::new(color.r, color.g, color.b, transparent)
    }

    /// Channels as given (sRGB-encoded)
    #[inline]
    pub fn rgb(&self) -> [f32; 3] {
        [
            f32::from_bits(self.r),
            f32::from_bits(self.g),
            f32::from_bits(self.b),
        ]
    }

    /// Material shared by every shape in the bucket
    pub fn material(&self) -> Material {
        let [r, g, b] = self.rgb();
        Material::new(Color::from_srgb(r, g, b), self.transparent)
    }
}

#[inline]
fn channel_bits(value: f32) -> u32 {
    if value == 0.0 {
        0.0f32.to_bits()
    } else {
        value.to_bits()
    }
}

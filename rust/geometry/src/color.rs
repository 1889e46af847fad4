// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Colour handling
//!
//! Upstream colours are sRGB-encoded 0..1 channels. The renderer works in
//! linear space, so every colour handed to a material or instance slot is
//! decoded once here. [`Color::to_srgb`] is the exact inverse (within f32
//! precision), which keeps picked/exported colours identical to the input.

/// RGB colour in the renderer's linear working space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Create from linear channels
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decode sRGB-encoded channels into linear space
    #[inline]
    pub fn from_srgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: srgb_to_linear(r),
            g: srgb_to_linear(g),
            b: srgb_to_linear(b),
        }
    }

    /// Encode back to sRGB channels
    #[inline]
    pub fn to_srgb(&self) -> [f32; 3] {
        [
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
        ]
    }

    /// Linear channels as an array
    #[inline]
    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// sRGB transfer function, decoding direction
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

/// sRGB transfer function, encoding direction
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(0.416_666_66) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_endpoints_are_fixed() {
        let black = Color::from_srgb(0.0, 0.0, 0.0);
        assert_eq!(black.to_array(), [0.0, 0.0, 0.0]);

        let white = Color::from_srgb(1.0, 1.0, 1.0);
        assert_abs_diff_eq!(white.r, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(white.g, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(white.b, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mid_grey_decodes_darker() {
        let grey = Color::from_srgb(0.5, 0.5, 0.5);
        // Reference value of the sRGB curve at 0.5
        assert_abs_diff_eq!(grey.r, 0.214_041, epsilon = 1e-5);
    }

    #[test]
    fn test_round_trip_through_linear() {
        for &c in &[0.0f32, 0.01, 0.03, 0.2, 0.5, 0.73, 0.99, 1.0] {
            let color = Color::from_srgb(c, c * 0.5, 1.0 - c);
            let [r, g, b] = color.to_srgb();
            assert_abs_diff_eq!(r, c, epsilon = 1e-5);
            assert_abs_diff_eq!(g, c * 0.5, epsilon = 1e-5);
            assert_abs_diff_eq!(b, 1.0 - c, epsilon = 1e-5);
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Composite item labels
//!
//! An element may occur several times inside one instanced fragment. The first
//! occurrence is labelled with the bare element id (`"42"`); the N-th repeat
//! (N >= 1) gets the composite label `"42.N"`. A stringified integer never
//! contains [`COMPOSITE_SEPARATOR`], so bare and composite labels cannot be
//! confused.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Separator between element id and repeat index
pub const COMPOSITE_SEPARATOR: char = '.';

/// Encode the `repeat`-th repeat of `element_id` (`repeat >= 1`)
#[inline]
pub fn encode_composite(element_id: u32, repeat: u32) -> String {
    debug_assert!(repeat >= 1, "repeat 0 is the bare element id");
    format!("{}{}{}", element_id, COMPOSITE_SEPARATOR, repeat)
}

/// Decode a composite label into `(element_id, repeat)`
///
/// Returns `None` for bare ids and for anything that is not a well-formed
/// composite label.
pub fn decode_composite(label: &str) -> Option<(u32, u32)> {
    let (id, repeat) = label.split_once(COMPOSITE_SEPARATOR)?;
    let element_id = parse_id(id)?;
    let repeat = parse_id(repeat)?;
    (repeat >= 1).then_some((element_id, repeat))
}

/// Element id owning a bare or composite label
#[inline]
pub fn element_id_of(label: &str) -> Option<u32> {
    label.parse::<ItemLabel>().ok().map(|l| l.element_id())
}

/// Strict decimal parse: digits only, no sign or whitespace
fn parse_id(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// A parsed instance label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemLabel {
    /// First occurrence of an element
    Bare(u32),
    /// A repeated occurrence inside the same fragment
    Composite { element_id: u32, repeat: u32 },
}

impl ItemLabel {
    /// Label for the `repeat`-th occurrence; 0 gives the bare label
    #[inline]
    pub fn new(element_id: u32, repeat: u32) -> Self {
        if repeat == 0 {
            ItemLabel::Bare(element_id)
        } else {
            ItemLabel::Composite { element_id, repeat }
        }
    }

    #[inline]
    pub fn element_id(&self) -> u32 {
        match *self {
            ItemLabel::Bare(id) => id,
            ItemLabel::Composite { element_id, .. } => element_id,
        }
    }

    /// Repeat index (0 for the bare label)
    #[inline]
    pub fn repeat(&self) -> u32 {
        match *self {
            ItemLabel::Bare(_) => 0,
            ItemLabel::Composite { repeat, .. } => repeat,
        }
    }

    #[inline]
    pub fn is_composite(&self) -> bool {
        matches!(self, ItemLabel::Composite { .. })
    }
}

impl fmt::Display for ItemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ItemLabel::Bare(id) => write!(f, "{}", id),
            ItemLabel::Composite { element_id, repeat } => {
                write!(f, "{}{}{}", element_id, COMPOSITE_SEPARATOR, repeat)
            }
        }
    }
}

impl FromStr for ItemLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(id) = parse_id(s) {
            return Ok(ItemLabel::Bare(id));
        }
        decode_composite(s)
            .map(|(element_id, repeat)| ItemLabel::Composite { element_id, repeat })
            .ok_or_else(|| Error::InvalidLabel(s.to_string()))
    }
}

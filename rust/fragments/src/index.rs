// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element id to fragment key index

use crate::composite::ItemLabel;
use crate::fragment::FragmentKey;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Fragment keys containing geometry of each element, ordered by element id
///
/// Each fragment is listed at most once per element no matter how many of its
/// instances belong to that element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifierIndex {
    entries: BTreeMap<u32, SmallVec<[FragmentKey; 2]>>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` holds geometry of `element_id`; false when already recorded
    pub fn insert(&mut self, element_id: u32, key: FragmentKey) -> bool {
        let keys = self.entries.entry(element_id).or_default();
        if keys.contains(&key) {
            return false;
        }
        keys.push(key);
        true
    }

    #[inline]
    pub fn get(&self, element_id: u32) -> Option<&[FragmentKey]> {
        self.entries.get(&element_id).map(|keys| keys.as_slice())
    }

    /// Look up by a bare (`"42"`) or composite (`"42.3"`) label
    pub fn get_by_label(&self, label: &str) -> Option<&[FragmentKey]> {
        let label: ItemLabel = label.parse().ok()?;
        self.get(label.element_id())
    }

    #[inline]
    pub fn contains(&self, element_id: u32) -> bool {
        self.entries.contains_key(&element_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[FragmentKey])> + '_ {
        self.entries.iter().map(|(&id, keys)| (id, keys.as_slice()))
    }

    pub fn element_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_dedups_per_fragment() {
        let mut index = IdentifierIndex::new();
        assert!(index.insert(5, FragmentKey(0)));
        assert!(!index.insert(5, FragmentKey(0)));
        assert!(index.insert(5, FragmentKey(3)));

        assert_eq!(index.get(5), Some(&[FragmentKey(0), FragmentKey(3)][..]));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_lookup_by_label() {
        let mut index = IdentifierIndex::new();
        index.insert(42, FragmentKey(1));

        assert_eq!(index.get_by_label("42"), Some(&[FragmentKey(1)][..]));
        assert_eq!(index.get_by_label("42.2"), Some(&[FragmentKey(1)][..]));
        assert_eq!(index.get_by_label("43"), None);
        assert_eq!(index.get_by_label("4x"), None);
    }

    #[test]
    fn test_iteration_is_ordered_by_id() {
        let mut index = IdentifierIndex::new();
        for id in [30, 2, 17] {
            index.insert(id, FragmentKey(0));
        }
        assert_eq!(index.element_ids().collect::<Vec<_>>(), vec![2, 17, 30]);
        assert!(index.contains(17));

        index.clear();
        assert!(index.is_empty());
    }
}

//! Sizes grouped by aspect ratio.

use super::{AspectRatio, Size};
use std::collections::BTreeSet;

/// Maps each aspect ratio to the ascending set of sizes that reduce to it.
///
/// Ratios iterate in the order their first size was added.
#[derive(Debug, Clone, Default)]
pub struct SizeMap {
    buckets: Vec<(AspectRatio, BTreeSet<Size>)>,
}

impl SizeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a size to the bucket of its ratio, creating the bucket if needed.
    ///
    /// Returns false if the size was already present or has a zero dimension.
    pub fn add(&mut self, size: Size) -> bool {
        if let Some((_, sizes)) = self
            .buckets
            .iter_mut()
            .find(|(ratio, _)| ratio.matches(&size))
        {
            return sizes.insert(size);
        }

        let Some(ratio) = AspectRatio::of_size(&size) else {
            return false;
        };
        self.buckets.push((ratio, BTreeSet::from([size])));
        true
    }

    /// Drops the bucket for `ratio`.
    pub fn remove(&mut self, ratio: &AspectRatio) {
        self.buckets.retain(|(r, _)| r != ratio);
    }

    /// Returns the ratios present, in insertion order.
    pub fn ratios(&self) -> Vec<AspectRatio> {
        self.buckets.iter().map(|(ratio, _)| *ratio).collect()
    }

    /// Returns true if a bucket exists for `ratio`.
    pub fn contains_ratio(&self, ratio: &AspectRatio) -> bool {
        self.buckets.iter().any(|(r, _)| r == ratio)
    }

    /// Returns the ascending sizes for `ratio`, if any were added.
    pub fn sizes(&self, ratio: &AspectRatio) -> Option<&BTreeSet<Size>> {
        self.buckets
            .iter()
            .find(|(r, _)| r == ratio)
            .map(|(_, sizes)| sizes)
    }

    /// Removes every bucket.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Returns true if no size has been added.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ratio(x: u32, y: u32) -> AspectRatio {
        AspectRatio::of(x, y).unwrap()
    }

    #[test]
    fn test_groups_by_ratio() {
        let mut map = SizeMap::new();
        assert!(map.add(Size::new(1920, 1080)));
        assert!(map.add(Size::new(1280, 720)));
        assert!(map.add(Size::new(640, 480)));

        assert_eq!(map.ratios(), vec![ratio(16, 9), ratio(4, 3)]);

        let wide: Vec<Size> = map.sizes(&ratio(16, 9)).unwrap().iter().copied().collect();
        assert_eq!(wide, vec![Size::new(1280, 720), Size::new(1920, 1080)]);

        let standard: Vec<Size> = map.sizes(&ratio(4, 3)).unwrap().iter().copied().collect();
        assert_eq!(standard, vec![Size::new(640, 480)]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut map = SizeMap::new();
        assert!(map.add(Size::new(640, 480)));
        assert!(!map.add(Size::new(640, 480)));
        assert_eq!(map.sizes(&ratio(4, 3)).unwrap().len(), 1);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let mut map = SizeMap::new();
        assert!(!map.add(Size::new(0, 480)));
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut map = SizeMap::new();
        map.add(Size::new(1920, 1080));
        map.add(Size::new(640, 480));

        map.remove(&ratio(16, 9));
        assert!(!map.contains_ratio(&ratio(16, 9)));
        assert!(map.sizes(&ratio(16, 9)).is_none());
        assert!(map.contains_ratio(&ratio(4, 3)));

        map.clear();
        assert!(map.is_empty());
    }

    proptest! {
        #[test]
        fn prop_every_size_matches_its_bucket(
            sizes in proptest::collection::vec((1u32..4000, 1u32..4000), 0..64)
        ) {
            let mut map = SizeMap::new();
            for (w, h) in sizes {
                map.add(Size::new(w, h));
            }
            for r in map.ratios() {
                for size in map.sizes(&r).unwrap() {
                    prop_assert!(r.matches(size));
                }
            }
        }
    }
}

//! Immutable pixel dimensions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Width and height of an image stream, in pixels.
///
/// Sizes order by area, ties broken by width, so the last element of a
/// sorted set is always the largest output a device offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    /// Creates a size from its dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns width times height.
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Returns true when both dimensions are non-zero.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl Ord for Size {
    fn cmp(&self, other: &Self) -> Ordering {
        self.area()
            .cmp(&other.area())
            .then_with(|| self.width.cmp(&other.width))
    }
}

impl PartialOrd for Size {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_by_area() {
        assert!(Size::new(640, 480) < Size::new(1280, 720));
        assert!(Size::new(1920, 1080) > Size::new(1600, 1200));
    }

    #[test]
    fn test_ties_broken_by_width() {
        // Same area, different shape.
        let wide = Size::new(200, 50);
        let tall = Size::new(50, 200);
        assert!(tall < wide);
        assert_ne!(tall, wide);
    }

    #[test]
    fn test_display() {
        assert_eq!(Size::new(1920, 1080).to_string(), "1920x1080");
    }
}

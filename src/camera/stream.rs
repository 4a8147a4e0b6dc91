//! Size selection for the preview stream and the still buffer.

use crate::geometry::{AspectRatio, Size, SizeMap};
use std::collections::BTreeSet;

/// Queue depth of the still buffer.
pub const STILL_BUFFER_DEPTH: usize = 2;

/// Picks the smallest candidate covering the surface, else the largest.
///
/// The surface is compared orientation-independently: its longer side
/// against a candidate's width, its shorter side against the height.
pub fn choose_optimal_size(
    surface_width: u32,
    surface_height: u32,
    candidates: &BTreeSet<Size>,
) -> Option<Size> {
    let (longer, shorter) = if surface_width < surface_height {
        (surface_height, surface_width)
    } else {
        (surface_width, surface_height)
    };

    candidates
        .iter()
        .find(|size| size.width() >= longer && size.height() >= shorter)
        .or_else(|| candidates.last())
        .copied()
}

/// The largest still size for `ratio`.
pub fn largest_picture_size(picture_sizes: &SizeMap, ratio: &AspectRatio) -> Option<Size> {
    picture_sizes
        .sizes(ratio)
        .and_then(|sizes| sizes.last())
        .copied()
}

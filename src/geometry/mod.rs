//! Pixel sizes, aspect ratios and ratio-bucketed size sets.
//!
//! Every size a device advertises is grouped under the reduced aspect
//! ratio it belongs to, so the stream configurator can pick preview and
//! still sizes that share a ratio.

mod aspect_ratio;
mod size;
mod size_map;

pub use aspect_ratio::AspectRatio;
pub use size::Size;
pub use size_map::SizeMap;

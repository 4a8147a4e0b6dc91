//! Collects the preview and still sizes a camera supports.

use crate::driver::{CameraCharacteristics, ImageFormat, OutputClass};
use crate::error::CameraError;
use crate::geometry::{AspectRatio, SizeMap};

/// Largest preview width streamed to the preview surface.
pub const MAX_PREVIEW_WIDTH: u32 = 1920;
/// Largest preview height streamed to the preview surface.
pub const MAX_PREVIEW_HEIGHT: u32 = 1080;

/// Refills `preview_sizes` and `picture_sizes` from `characteristics`.
///
/// Preview sizes are clamped to 1920x1080 and restricted to ratios that
/// also have a still size. Returns `aspect_ratio` if it survived, otherwise
/// the first remaining preview ratio.
pub fn collect_camera_info(
    characteristics: &CameraCharacteristics,
    output_class: OutputClass,
    aspect_ratio: AspectRatio,
    preview_sizes: &mut SizeMap,
    picture_sizes: &mut SizeMap,
) -> Result<AspectRatio, CameraError> {
    let map = characteristics
        .stream_configuration_map
        .as_ref()
        .ok_or_else(|| {
            CameraError::CapabilityUnavailable("missing stream configuration map".to_owned())
        })?;

    preview_sizes.clear();
    for size in map.output_sizes_for_class(output_class) {
        if size.width() <= MAX_PREVIEW_WIDTH && size.height() <= MAX_PREVIEW_HEIGHT {
            preview_sizes.add(*size);
        }
    }

    picture_sizes.clear();
    for size in map.output_sizes_for_format(ImageFormat::Jpeg) {
        picture_sizes.add(*size);
    }

    for ratio in preview_sizes.ratios() {
        if !picture_sizes.contains_ratio(&ratio) {
            tracing::debug!(%ratio, "Dropping preview ratio without still sizes");
            preview_sizes.remove(&ratio);
        }
    }

    if preview_sizes.contains_ratio(&aspect_ratio) {
        return Ok(aspect_ratio);
    }
    let fallback = preview_sizes.ratios().first().copied().ok_or_else(|| {
        CameraError::CapabilityUnavailable(
            "no preview size shares an aspect ratio with a still size".to_owned(),
        )
    })?;
    tracing::info!(requested = %aspect_ratio, chosen = %fallback, "Aspect ratio unsupported");
    Ok(fallback)
}

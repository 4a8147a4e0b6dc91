//! Flash, auto-focus and orientation policies applied to capture requests.

use super::{Facing, Flash};
use crate::driver::{AeMode, AfMode, CaptureRequest, FlashMode};

/// Applies the preview-side flash policy.
///
/// `On` keeps the preview unlit; only the still fires the flash.
pub fn apply_preview_flash(request: &mut CaptureRequest, flash: Flash) {
    let (ae_mode, flash_mode) = match flash {
        Flash::Off | Flash::On => (AeMode::On, FlashMode::Off),
        Flash::Torch => (AeMode::On, FlashMode::Torch),
        Flash::Auto => (AeMode::OnAutoFlash, FlashMode::Off),
        Flash::RedEye => (AeMode::OnAutoFlashRedeye, FlashMode::Off),
    };
    request.ae_mode = Some(ae_mode);
    request.flash_mode = Some(flash_mode);
}

/// Applies the still-capture flash policy.
pub fn apply_still_flash(request: &mut CaptureRequest, flash: Flash) {
    match flash {
        Flash::Off => {
            request.ae_mode = Some(AeMode::On);
            request.flash_mode = Some(FlashMode::Off);
        }
        Flash::On => request.ae_mode = Some(AeMode::OnAlwaysFlash),
        Flash::Torch => {
            request.ae_mode = Some(AeMode::On);
            request.flash_mode = Some(FlashMode::Torch);
        }
        Flash::Auto | Flash::RedEye => request.ae_mode = Some(AeMode::OnAutoFlash),
    }
}

/// True if the device offers any AF mode other than `Off`.
pub fn supports_auto_focus(af_modes: &[AfMode]) -> bool {
    af_modes.iter().any(|mode| *mode != AfMode::Off)
}

/// Sets the AF mode and returns the auto-focus setting that took effect.
///
/// Auto focus is forced off on devices that cannot focus.
pub fn apply_auto_focus(request: &mut CaptureRequest, auto_focus: bool, af_modes: &[AfMode]) -> bool {
    let effective = auto_focus && supports_auto_focus(af_modes);
    request.af_mode = Some(if effective {
        AfMode::ContinuousPicture
    } else {
        AfMode::Off
    });
    effective
}

/// Rotation for the encoded JPEG, in `[0, 360)`.
pub fn jpeg_orientation(sensor_orientation: i32, display_orientation: i32, facing: Facing) -> i32 {
    let sign = match facing {
        Facing::Front => 1,
        Facing::Back => -1,
    };
    (sensor_orientation.rem_euclid(360) + display_orientation.rem_euclid(360) * sign).rem_euclid(360)
}

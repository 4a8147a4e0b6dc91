//! Resolves a requested facing to a concrete camera id.

use super::Facing;
use crate::driver::{CameraCharacteristics, CameraDriver, HardwareLevel, LensFacing};
use crate::error::CameraError;

/// The camera chosen for a facing.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Chosen camera id.
    pub camera_id: String,
    /// Its characteristics.
    pub characteristics: CameraCharacteristics,
    /// The facing the chosen camera actually has.
    pub facing: Facing,
}

fn lens_for(facing: Facing) -> LensFacing {
    match facing {
        Facing::Back => LensFacing::Back,
        Facing::Front => LensFacing::Front,
    }
}

fn facing_for(lens: LensFacing) -> Facing {
    match lens {
        LensFacing::Front => Facing::Front,
        // No user-facing enumerator for external cameras.
        LensFacing::Back | LensFacing::External => Facing::Back,
    }
}

fn is_usable(characteristics: &CameraCharacteristics) -> bool {
    !matches!(
        characteristics.hardware_level,
        None | Some(HardwareLevel::Legacy)
    )
}

fn read_characteristics(
    driver: &dyn CameraDriver,
    camera_id: &str,
) -> Result<CameraCharacteristics, CameraError> {
    driver
        .camera_characteristics(camera_id)
        .map_err(|e| CameraError::driver("reading camera characteristics", e))
}

/// Picks the first non-legacy camera facing `facing`.
///
/// Falls back to the first listed camera when none matches. Returns
/// `Ok(None)` if that fallback is a legacy device.
pub fn choose_camera_by_facing(
    driver: &dyn CameraDriver,
    facing: Facing,
) -> Result<Option<Selection>, CameraError> {
    let ids = driver
        .camera_id_list()
        .map_err(|e| CameraError::driver("listing cameras", e))?;
    let Some(first_id) = ids.first() else {
        return Err(CameraError::NoDeviceAvailable);
    };

    let wanted = lens_for(facing);
    for id in &ids {
        let characteristics = read_characteristics(driver, id)?;
        if !is_usable(&characteristics) {
            tracing::debug!(camera_id = %id, "Skipping legacy camera");
            continue;
        }
        let Some(lens) = characteristics.lens_facing else {
            tracing::debug!(camera_id = %id, "Skipping camera without lens facing");
            continue;
        };
        if lens == wanted {
            return Ok(Some(Selection {
                camera_id: id.clone(),
                characteristics,
                facing,
            }));
        }
    }

    let characteristics = read_characteristics(driver, first_id)?;
    if !is_usable(&characteristics) {
        tracing::warn!(camera_id = %first_id, %facing, "No usable camera for requested facing");
        return Ok(None);
    }
    let lens = characteristics.lens_facing.ok_or_else(|| {
        CameraError::UnexpectedState(format!("camera {first_id} reports no lens facing"))
    })?;
    let actual = facing_for(lens);
    tracing::info!(
        camera_id = %first_id,
        requested = %facing,
        actual = %actual,
        "Falling back to first camera"
    );

    Ok(Some(Selection {
        camera_id: first_id.clone(),
        characteristics,
        facing: actual,
    }))
}

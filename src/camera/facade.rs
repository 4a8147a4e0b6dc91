//! The public camera handle.

use super::callback::{CallbackBridge, CameraCallback};
use super::capture::CaptureState;
use super::engine::{with_core, CameraCore};
use super::events::{CoreHandle, SurfaceChangedHandler};
use super::{CameraStats, Facing, Flash};
use crate::config::{CameraConfig, ConfigError};
use crate::driver::{CameraDriver, PreviewSurface};
use crate::error::CameraError;
use crate::geometry::AspectRatio;
use crate::metrics::MetricsSnapshot;
use std::sync::{Arc, Mutex};

/// A camera streaming preview frames and taking stills.
///
/// Operations may be called from any thread; driver callbacks are
/// serialized with them. Host callbacks run without internal locks held,
/// so they may call back into the camera.
///
/// # Example
///
/// ```
/// use cameraview::{Camera, MockDriver, MockPreview};
///
/// let driver = MockDriver::with_default_cameras();
/// let camera = Camera::new(Box::new(driver.clone()), Box::new(MockPreview::new(1080, 1920)));
///
/// assert!(camera.start().unwrap());
/// driver.dispatch();
/// assert!(camera.is_camera_opened());
/// ```
pub struct Camera {
    core: Arc<Mutex<CameraCore>>,
    callbacks: Arc<CallbackBridge>,
}

impl Camera {
    /// Creates a detached camera over `driver`, streaming into `preview`.
    pub fn new(driver: Box<dyn CameraDriver>, mut preview: Box<dyn PreviewSurface>) -> Self {
        let callbacks = Arc::new(CallbackBridge::new());
        let core = Arc::new_cyclic(|weak| {
            let handle = CoreHandle::new(weak.clone(), Arc::clone(&callbacks));
            preview.set_callback(Arc::new(SurfaceChangedHandler::new(handle.clone())));
            Mutex::new(CameraCore::new(driver, preview, handle))
        });
        Self { core, callbacks }
    }

    /// Creates a detached camera with `config` applied.
    pub fn with_config(
        driver: Box<dyn CameraDriver>,
        preview: Box<dyn PreviewSurface>,
        config: &CameraConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let camera = Self::new(driver, preview);
        camera.with(|core| core.apply_config(config));
        Ok(camera)
    }

    fn with<R>(&self, f: impl FnOnce(&mut CameraCore) -> R) -> R {
        with_core(&self.core, &self.callbacks, f)
    }

    /// Registers a host callback.
    pub fn add_callback(&self, callback: Arc<dyn CameraCallback>) {
        self.callbacks.add(callback);
    }

    /// Unregisters a host callback. Returns false if it was not registered.
    pub fn remove_callback(&self, callback: &Arc<dyn CameraCallback>) -> bool {
        self.callbacks.remove(callback)
    }

    /// Selects a device for the current facing, probes it and starts
    /// opening it. Returns `Ok(false)` when no usable device exists.
    ///
    /// The device is open once `on_camera_opened` fires.
    pub fn start(&self) -> Result<bool, CameraError> {
        self.with(CameraCore::start)
    }

    /// Closes the session, the device and the still buffer. Idempotent.
    pub fn stop(&self) {
        self.with(CameraCore::stop);
    }

    /// True while a device is open.
    pub fn is_camera_opened(&self) -> bool {
        self.with(|core| core.is_camera_opened())
    }

    /// Id of the selected device, if any.
    pub fn camera_id(&self) -> Option<String> {
        self.with(|core| core.camera_id().map(str::to_owned))
    }

    /// Current facing.
    pub fn facing(&self) -> Facing {
        self.with(|core| core.facing())
    }

    /// Switches cameras, restarting an active one. Returns false if the
    /// facing is unchanged or the switch failed and was reverted.
    pub fn set_facing(&self, facing: Facing) -> bool {
        self.with(|core| core.set_facing(facing))
    }

    /// Current aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.with(|core| core.aspect_ratio())
    }

    /// Ratios the probed device can stream, in probe order.
    pub fn supported_aspect_ratios(&self) -> Vec<AspectRatio> {
        self.with(|core| core.supported_aspect_ratios())
    }

    /// Changes the aspect ratio. Returns false for the current ratio, an
    /// unsupported one, or when the change was reverted.
    pub fn set_aspect_ratio(&self, ratio: AspectRatio) -> bool {
        self.with(|core| core.set_aspect_ratio(ratio))
    }

    /// Whether continuous auto focus is in effect.
    ///
    /// Reads false once the device turned out not to support it.
    pub fn auto_focus(&self) -> bool {
        self.with(|core| core.auto_focus())
    }

    /// Toggles auto focus. Returns false if unchanged or reverted.
    pub fn set_auto_focus(&self, auto_focus: bool) -> bool {
        self.with(|core| core.set_auto_focus(auto_focus))
    }

    /// Current flash mode.
    pub fn flash(&self) -> Flash {
        self.with(|core| core.flash())
    }

    /// Changes the flash mode. Returns false if unchanged or reverted.
    pub fn set_flash(&self, flash: Flash) -> bool {
        self.with(|core| core.set_flash(flash))
    }

    /// Display rotation in degrees.
    pub fn display_orientation(&self) -> i32 {
        self.with(|core| core.display_orientation())
    }

    /// Sets the display rotation and forwards it to the preview surface.
    pub fn set_display_orientation(&self, degrees: i32) {
        self.with(|core| core.set_display_orientation(degrees));
    }

    /// The current settings as a config.
    pub fn config(&self) -> CameraConfig {
        self.with(|core| CameraConfig {
            facing: core.facing(),
            aspect_ratio: core.aspect_ratio(),
            auto_focus: core.auto_focus(),
            flash: core.flash(),
            display_orientation: core.display_orientation(),
        })
    }

    /// Starts a still capture. Returns false if one is already in flight or
    /// no preview is running. The still arrives via `on_picture_taken`.
    pub fn take_picture(&self) -> bool {
        self.with(CameraCore::take_picture)
    }

    /// Where the still-capture protocol currently is.
    pub fn capture_state(&self) -> CaptureState {
        self.with(|core| core.capture_state())
    }

    /// Counters accumulated since creation.
    pub fn stats(&self) -> CameraStats {
        self.with(|core| core.stats().clone())
    }

    /// Snapshot for the metrics registry.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.with(|core| {
            MetricsSnapshot::from_stats(core.stats(), core.is_camera_opened(), core.capture_state())
        })
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockPreview};

    fn detached() -> Camera {
        Camera::new(
            Box::new(MockDriver::with_default_cameras()),
            Box::new(MockPreview::new(1080, 1920)),
        )
    }

    #[test]
    fn test_detached_defaults() {
        let camera = detached();
        assert!(!camera.is_camera_opened());
        assert_eq!(camera.facing(), Facing::Back);
        assert_eq!(camera.aspect_ratio(), AspectRatio::of(4, 3).unwrap());
        assert!(camera.auto_focus());
        assert_eq!(camera.flash(), Flash::Off);
        assert_eq!(camera.capture_state(), CaptureState::Preview);
        assert!(camera.supported_aspect_ratios().is_empty());
        assert!(!camera.take_picture());
    }

    #[test]
    fn test_settings_stored_while_detached() {
        let camera = detached();
        assert!(camera.set_flash(Flash::Torch));
        assert!(!camera.set_flash(Flash::Torch));
        assert!(camera.set_auto_focus(false));
        assert!(camera.set_facing(Facing::Front));
        // Nothing probed yet.
        assert!(!camera.set_aspect_ratio(AspectRatio::of(16, 9).unwrap()));
        assert_eq!(camera.config().flash, Flash::Torch);
    }

    #[test]
    fn test_with_config() {
        let preview = MockPreview::new(1080, 1920);
        let config = CameraConfig {
            facing: Facing::Front,
            display_orientation: 90,
            ..Default::default()
        };
        let camera = Camera::with_config(
            Box::new(MockDriver::with_default_cameras()),
            Box::new(preview.clone()),
            &config,
        )
        .unwrap();
        assert_eq!(camera.config(), config);
        assert_eq!(preview.display_orientation(), 90);

        let invalid = CameraConfig {
            display_orientation: 45,
            ..Default::default()
        };
        assert!(Camera::with_config(
            Box::new(MockDriver::new()),
            Box::new(MockPreview::new(640, 480)),
            &invalid,
        )
        .is_err());
    }

    #[test]
    fn test_start_without_cameras() {
        let camera = Camera::new(Box::new(MockDriver::new()), Box::new(MockPreview::new(640, 480)));
        assert!(matches!(camera.start(), Err(CameraError::NoDeviceAvailable)));
        assert!(!camera.is_camera_opened());
    }
}

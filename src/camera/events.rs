//! Driver callback handlers.
//!
//! Each handler owns a weak back-reference to the camera core and the
//! generation it was issued under. Once the camera is dropped the handlers
//! become inert; the core itself ignores events from stale generations.

use super::callback::CallbackBridge;
use super::engine::{with_core, CameraCore};
use crate::driver::{
    CameraDevice, CaptureCallback, CaptureResult, CaptureSession, DeviceStateCallback,
    ImageAvailableListener, SessionStateCallback, SurfaceChangedCallback,
};
use std::sync::{Arc, Mutex, Weak};

/// Weak entry point into the core shared by every handler.
#[derive(Clone)]
pub(crate) struct CoreHandle {
    core: Weak<Mutex<CameraCore>>,
    callbacks: Arc<CallbackBridge>,
}

impl CoreHandle {
    pub(crate) fn new(core: Weak<Mutex<CameraCore>>, callbacks: Arc<CallbackBridge>) -> Self {
        Self { core, callbacks }
    }

    /// Runs `f` on the core if it is still alive.
    fn with<R>(&self, f: impl FnOnce(&mut CameraCore) -> R) -> Option<R> {
        let core = self.core.upgrade()?;
        Some(with_core(&core, &self.callbacks, f))
    }
}

pub(crate) struct DeviceStateHandler {
    handle: CoreHandle,
    generation: u64,
}

impl DeviceStateHandler {
    pub(crate) fn new(handle: CoreHandle, generation: u64) -> Self {
        Self { handle, generation }
    }
}

impl DeviceStateCallback for DeviceStateHandler {
    fn on_opened(&self, device: Box<dyn CameraDevice>) {
        let mut slot = Some(device);
        self.handle.with(|core| {
            if let Some(device) = slot.take() {
                core.on_device_opened(self.generation, device);
            }
        });
        // Nobody left to own it.
        if let Some(mut orphan) = slot {
            orphan.close();
        }
    }

    fn on_closed(&self, camera_id: &str) {
        self.handle
            .with(|core| core.on_device_closed(self.generation, camera_id));
    }

    fn on_disconnected(&self, camera_id: &str) {
        self.handle
            .with(|core| core.on_device_lost(self.generation, camera_id, None));
    }

    fn on_error(&self, camera_id: &str, error: i32) {
        self.handle
            .with(|core| core.on_device_lost(self.generation, camera_id, Some(error)));
    }
}

pub(crate) struct SessionStateHandler {
    handle: CoreHandle,
    generation: u64,
}

impl SessionStateHandler {
    pub(crate) fn new(handle: CoreHandle, generation: u64) -> Self {
        Self { handle, generation }
    }
}

impl SessionStateCallback for SessionStateHandler {
    fn on_configured(&self, session: Box<dyn CaptureSession>) {
        let mut slot = Some(session);
        self.handle.with(|core| {
            if let Some(session) = slot.take() {
                core.on_session_configured(self.generation, session);
            }
        });
        if let Some(mut orphan) = slot {
            orphan.close();
        }
    }

    fn on_configure_failed(&self) {
        self.handle
            .with(|core| core.on_session_configure_failed(self.generation));
    }

    fn on_closed(&self, session_id: u64) {
        self.handle.with(|core| core.on_session_closed(session_id));
    }
}

/// Feeds preview metadata (repeating and one-shot) into the capture machine.
pub(crate) struct PreviewCaptureHandler {
    handle: CoreHandle,
    generation: u64,
}

impl PreviewCaptureHandler {
    pub(crate) fn new(handle: CoreHandle, generation: u64) -> Self {
        Self { handle, generation }
    }
}

impl CaptureCallback for PreviewCaptureHandler {
    fn on_capture_progressed(&self, partial: &CaptureResult) {
        self.handle
            .with(|core| core.on_preview_result(self.generation, partial));
    }

    fn on_capture_completed(&self, result: &CaptureResult) {
        self.handle
            .with(|core| core.on_preview_result(self.generation, result));
    }
}

pub(crate) struct StillCaptureHandler {
    handle: CoreHandle,
    generation: u64,
}

impl StillCaptureHandler {
    pub(crate) fn new(handle: CoreHandle, generation: u64) -> Self {
        Self { handle, generation }
    }
}

impl CaptureCallback for StillCaptureHandler {
    fn on_capture_completed(&self, _result: &CaptureResult) {
        self.handle.with(|core| core.on_still_completed(self.generation));
    }

    fn on_capture_failed(&self) {
        self.handle.with(|core| core.on_still_failed(self.generation));
    }
}

pub(crate) struct ImageAvailableHandler {
    handle: CoreHandle,
}

impl ImageAvailableHandler {
    pub(crate) fn new(handle: CoreHandle) -> Self {
        Self { handle }
    }
}

impl ImageAvailableListener for ImageAvailableHandler {
    fn on_image_available(&self) {
        self.handle.with(CameraCore::on_image_available);
    }
}

pub(crate) struct SurfaceChangedHandler {
    handle: CoreHandle,
}

impl SurfaceChangedHandler {
    pub(crate) fn new(handle: CoreHandle) -> Self {
        Self { handle }
    }
}

impl SurfaceChangedCallback for SurfaceChangedHandler {
    fn on_surface_changed(&self) {
        self.handle.with(CameraCore::on_surface_changed);
    }
}

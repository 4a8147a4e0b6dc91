//! The camera core: device lifecycle, session setup and still capture.
//!
//! All mutable camera state lives in one [`CameraCore`] behind a mutex. Host
//! calls and driver callbacks both enter through [`with_core`], which holds
//! the lock for the duration of one event and delivers the host
//! notifications the event produced only after the lock is released.

use super::callback::{CallbackBridge, Notification};
use super::capture::{CaptureAction, CaptureState, PictureCaptureMachine};
use super::events::{
    CoreHandle, DeviceStateHandler, ImageAvailableHandler, PreviewCaptureHandler,
    SessionStateHandler, StillCaptureHandler,
};
use super::request::{apply_auto_focus, apply_preview_flash, apply_still_flash, jpeg_orientation};
use super::{probe, selector, stream, CameraStats, Facing, Flash};
use crate::config::CameraConfig;
use crate::driver::{
    AePrecaptureTrigger, AfTrigger, CameraCharacteristics, CameraDevice, CameraDriver,
    CaptureRequest, CaptureResult, CaptureSession, ImageFormat, ImageReader, PreviewSurface,
    RequestTemplate,
};
use crate::error::CameraError;
use crate::geometry::{AspectRatio, SizeMap};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Runs `f` on the locked core, then delivers queued notifications.
pub(crate) fn with_core<R>(
    core: &Mutex<CameraCore>,
    callbacks: &CallbackBridge,
    f: impl FnOnce(&mut CameraCore) -> R,
) -> R {
    let (result, notifications) = {
        let mut guard = core.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut guard);
        (result, std::mem::take(&mut guard.outbox))
    };
    callbacks.dispatch_all(notifications);
    result
}

/// Stream changes requested while a still was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    /// The preview surface changed.
    Session,
    /// The aspect ratio changed from `previous`.
    Streams { previous: AspectRatio },
}

/// Mutable camera state.
pub(crate) struct CameraCore {
    driver: Box<dyn CameraDriver>,
    preview: Box<dyn PreviewSurface>,
    handle: CoreHandle,

    facing: Facing,
    aspect_ratio: AspectRatio,
    auto_focus: bool,
    flash: Flash,
    display_orientation: i32,

    camera_id: Option<String>,
    characteristics: Option<CameraCharacteristics>,
    device: Option<Box<dyn CameraDevice>>,
    session: Option<Box<dyn CaptureSession>>,
    preview_request: Option<CaptureRequest>,
    image_reader: Option<Box<dyn ImageReader>>,
    // Replaced while its still was pending; closed once that still arrives.
    retired_reader: Option<Box<dyn ImageReader>>,
    awaiting_image: bool,
    deferred: Option<Deferred>,
    preview_sizes: SizeMap,
    picture_sizes: SizeMap,

    machine: PictureCaptureMachine,
    stats: CameraStats,
    outbox: Vec<Notification>,

    opening: bool,
    // Callbacks carry the generation they were issued under; anything
    // older than the current value belongs to a torn-down device/session.
    device_generation: u64,
    session_generation: u64,
    announced: BTreeSet<u64>,
}

impl CameraCore {
    pub(crate) fn new(
        driver: Box<dyn CameraDriver>,
        preview: Box<dyn PreviewSurface>,
        handle: CoreHandle,
    ) -> Self {
        Self {
            driver,
            preview,
            handle,
            facing: Facing::default(),
            aspect_ratio: AspectRatio::default(),
            auto_focus: true,
            flash: Flash::default(),
            display_orientation: 0,
            camera_id: None,
            characteristics: None,
            device: None,
            session: None,
            preview_request: None,
            image_reader: None,
            retired_reader: None,
            awaiting_image: false,
            deferred: None,
            preview_sizes: SizeMap::new(),
            picture_sizes: SizeMap::new(),
            machine: PictureCaptureMachine::new(),
            stats: CameraStats::default(),
            outbox: Vec::new(),
            opening: false,
            device_generation: 0,
            session_generation: 0,
            announced: BTreeSet::new(),
        }
    }

    /// Applies stored settings. Only meaningful before `start`.
    pub(crate) fn apply_config(&mut self, config: &CameraConfig) {
        self.facing = config.facing;
        self.aspect_ratio = config.aspect_ratio;
        self.auto_focus = config.auto_focus;
        self.flash = config.flash;
        self.set_display_orientation(config.display_orientation);
    }

    // ---- lifecycle -------------------------------------------------------

    /// Resolves a device, probes it, prepares the still buffer and starts
    /// opening it. Returns `Ok(false)` if no usable device exists.
    pub(crate) fn start(&mut self) -> Result<bool, CameraError> {
        if self.is_active() {
            debug!("Camera already started");
            return Ok(true);
        }

        let Some(selection) = selector::choose_camera_by_facing(self.driver.as_ref(), self.facing)?
        else {
            warn!(facing = %self.facing, "No usable camera");
            return Ok(false);
        };

        self.aspect_ratio = probe::collect_camera_info(
            &selection.characteristics,
            self.preview.output_class(),
            self.aspect_ratio,
            &mut self.preview_sizes,
            &mut self.picture_sizes,
        )?;
        self.facing = selection.facing;
        self.camera_id = Some(selection.camera_id);
        self.characteristics = Some(selection.characteristics);

        self.prepare_image_reader()?;
        if let Err(e) = self.open_camera() {
            self.stop();
            return Err(e);
        }
        info!(
            camera_id = self.camera_id.as_deref().unwrap_or_default(),
            facing = %self.facing,
            aspect_ratio = %self.aspect_ratio,
            "Opening camera"
        );
        Ok(true)
    }

    /// Closes the session, the device and the still buffer, in that order.
    pub(crate) fn stop(&mut self) {
        self.close_session();
        if let Some(mut device) = self.device.take() {
            info!(camera_id = device.id(), "Closing camera");
            device.close();
        }
        if let Some(mut reader) = self.image_reader.take() {
            reader.close();
        }
        if let Some(mut reader) = self.retired_reader.take() {
            reader.close();
        }
        self.awaiting_image = false;
        self.deferred = None;
        self.opening = false;
        self.device_generation += 1;
        self.preview_request = None;
    }

    fn is_active(&self) -> bool {
        self.device.is_some() || self.opening
    }

    fn open_camera(&mut self) -> Result<(), CameraError> {
        let camera_id = self.camera_id.clone().ok_or(CameraError::NotOpen)?;
        self.device_generation += 1;
        let callback = Arc::new(DeviceStateHandler::new(
            self.handle.clone(),
            self.device_generation,
        ));
        self.driver
            .open_camera(&camera_id, callback)
            .map_err(|e| CameraError::driver("opening the camera", e))?;
        self.opening = true;
        Ok(())
    }

    fn prepare_image_reader(&mut self) -> Result<(), CameraError> {
        if let Some(mut reader) = self.image_reader.take() {
            if self.awaiting_image {
                if let Some(mut older) = self.retired_reader.replace(reader) {
                    older.close();
                }
            } else {
                reader.close();
            }
        }
        let size = stream::largest_picture_size(&self.picture_sizes, &self.aspect_ratio)
            .ok_or_else(|| {
                CameraError::CapabilityUnavailable(format!(
                    "no still size for {}",
                    self.aspect_ratio
                ))
            })?;
        let mut reader = self
            .driver
            .new_image_reader(size, ImageFormat::Jpeg, stream::STILL_BUFFER_DEPTH)
            .map_err(|e| CameraError::driver("allocating the still buffer", e))?;
        reader.set_on_image_available(Arc::new(ImageAvailableHandler::new(self.handle.clone())));
        debug!(%size, "Still buffer prepared");
        self.image_reader = Some(reader);
        Ok(())
    }

    /// Configures a session over the preview surface and the still buffer.
    ///
    /// Does nothing until the device is open and the surface is ready.
    fn start_capture_session(&mut self) -> Result<(), CameraError> {
        let Some(device) = self.device.as_mut() else {
            return Ok(());
        };
        let Some(reader_surface) = self.image_reader.as_ref().map(|reader| reader.surface()) else {
            return Ok(());
        };
        if !self.preview.is_ready() {
            debug!("Preview surface not ready; session deferred");
            return Ok(());
        }
        let Some(preview_surface) = self.preview.surface() else {
            return Ok(());
        };

        let candidates = self
            .preview_sizes
            .sizes(&self.aspect_ratio)
            .ok_or_else(|| {
                CameraError::CapabilityUnavailable(format!(
                    "no preview size for {}",
                    self.aspect_ratio
                ))
            })?;
        let size = stream::choose_optimal_size(self.preview.width(), self.preview.height(), candidates)
            .ok_or_else(|| CameraError::CapabilityUnavailable("empty preview size set".to_owned()))?;
        self.preview.set_buffer_size(size.width(), size.height());

        let mut request = device
            .create_capture_request(RequestTemplate::Preview)
            .map_err(|e| CameraError::driver("building the preview request", e))?;
        request.add_target(preview_surface);
        self.preview_request = Some(request);

        self.session_generation += 1;
        let callback = Arc::new(SessionStateHandler::new(
            self.handle.clone(),
            self.session_generation,
        ));
        device
            .create_capture_session(&[preview_surface, reader_surface], callback)
            .map_err(|e| CameraError::driver("creating the capture session", e))?;
        debug!(%size, "Capture session requested");
        Ok(())
    }

    fn close_session(&mut self) {
        self.session_generation += 1;
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        self.machine.set_state(CaptureState::Preview);
    }

    fn restart_session(&mut self) -> Result<(), CameraError> {
        self.close_session();
        self.start_capture_session()
    }

    // ---- preview request -------------------------------------------------

    fn preview_active(&self) -> bool {
        self.session.is_some()
            && self.preview_request.is_some()
            && self.machine.state() == CaptureState::Preview
    }

    fn update_auto_focus(&mut self) {
        let af_modes = self
            .characteristics
            .as_ref()
            .map(|c| c.af_available_modes.as_slice())
            .unwrap_or_default();
        if let Some(request) = self.preview_request.as_mut() {
            self.auto_focus = apply_auto_focus(request, self.auto_focus, af_modes);
        }
    }

    fn update_flash(&mut self) {
        if let Some(request) = self.preview_request.as_mut() {
            apply_preview_flash(request, self.flash);
        }
    }

    fn set_preview_af_trigger(&mut self, trigger: AfTrigger) {
        if let Some(request) = self.preview_request.as_mut() {
            request.af_trigger = Some(trigger);
        }
    }

    fn set_preview_ae_trigger(&mut self, trigger: AePrecaptureTrigger) {
        if let Some(request) = self.preview_request.as_mut() {
            request.ae_precapture_trigger = Some(trigger);
        }
    }

    fn preview_callback(&self) -> Arc<PreviewCaptureHandler> {
        Arc::new(PreviewCaptureHandler::new(
            self.handle.clone(),
            self.session_generation,
        ))
    }

    fn set_repeating_preview(&mut self) -> Result<(), CameraError> {
        let callback = self.preview_callback();
        let (Some(session), Some(request)) = (self.session.as_mut(), self.preview_request.as_ref())
        else {
            return Err(CameraError::NotOpen);
        };
        session
            .set_repeating_request(request, callback)
            .map_err(|e| CameraError::driver("starting the preview", e))
    }

    fn capture_preview_once(&mut self, context: &'static str) -> Result<(), CameraError> {
        let callback = self.preview_callback();
        let (Some(session), Some(request)) = (self.session.as_mut(), self.preview_request.as_ref())
        else {
            return Err(CameraError::NotOpen);
        };
        session
            .capture(request, callback)
            .map_err(|e| CameraError::driver(context, e))
    }

    // ---- still capture ---------------------------------------------------

    /// Starts a still capture. Returns false if one is already in flight
    /// or no session is running.
    pub(crate) fn take_picture(&mut self) -> bool {
        if self.session.is_none() {
            warn!("Cannot take a picture without a capture session");
            return false;
        }
        if self.machine.is_busy() {
            debug!(state = %self.machine.state(), "Still capture already in progress");
            return false;
        }
        if self.auto_focus {
            self.lock_focus()
        } else {
            self.machine.set_state(CaptureState::Capturing);
            self.capture_still_picture()
        }
    }

    fn lock_focus(&mut self) -> bool {
        self.set_preview_af_trigger(AfTrigger::Start);
        self.machine.set_state(CaptureState::Locking);
        let result = self.capture_preview_once("locking focus");
        self.set_preview_af_trigger(AfTrigger::Idle);
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to lock focus");
                self.machine.set_state(CaptureState::Preview);
                false
            }
        }
    }

    fn run_precapture(&mut self) {
        self.set_preview_ae_trigger(AePrecaptureTrigger::Start);
        self.machine.set_state(CaptureState::Precapture);
        let result = self.capture_preview_once("running precapture metering");
        self.set_preview_ae_trigger(AePrecaptureTrigger::Idle);
        if let Err(e) = result {
            warn!(error = %e, "Failed to run precapture sequence");
            self.unlock_focus();
        }
    }

    fn capture_still_picture(&mut self) -> bool {
        match self.submit_still() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to capture still picture");
                self.stats.still_capture_failures += 1;
                self.unlock_focus();
                false
            }
        }
    }

    fn submit_still(&mut self) -> Result<(), CameraError> {
        let device = self.device.as_ref().ok_or(CameraError::NotOpen)?;
        let reader_surface = self
            .image_reader
            .as_ref()
            .map(|reader| reader.surface())
            .ok_or(CameraError::NotOpen)?;

        let mut request = device
            .create_capture_request(RequestTemplate::StillCapture)
            .map_err(|e| CameraError::driver("building the still request", e))?;
        request.add_target(reader_surface);
        request.af_mode = self.preview_request.as_ref().and_then(|r| r.af_mode);
        apply_still_flash(&mut request, self.flash);
        let sensor_orientation = self
            .characteristics
            .as_ref()
            .map_or(0, |c| c.sensor_orientation);
        request.jpeg_orientation = Some(jpeg_orientation(
            sensor_orientation,
            self.display_orientation,
            self.facing,
        ));

        let callback = Arc::new(StillCaptureHandler::new(
            self.handle.clone(),
            self.session_generation,
        ));
        let session = self.session.as_mut().ok_or(CameraError::NotOpen)?;
        session
            .stop_repeating()
            .map_err(|e| CameraError::driver("stopping the preview", e))?;
        session
            .capture(&request, callback)
            .map_err(|e| CameraError::driver("capturing the still", e))?;
        self.awaiting_image = true;
        debug!(orientation = ?request.jpeg_orientation, "Still capture submitted");
        Ok(())
    }

    /// Cancels the focus lock and resumes the preview. Always ends in
    /// `Preview`, whatever the driver reports.
    fn unlock_focus(&mut self) {
        if self.session.is_some() {
            self.set_preview_af_trigger(AfTrigger::Cancel);
            if let Err(e) = self.capture_preview_once("cancelling the focus lock") {
                warn!(error = %e, "Failed to cancel focus lock");
            }
            self.update_auto_focus();
            self.update_flash();
            self.set_preview_af_trigger(AfTrigger::Idle);
            if let Err(e) = self.set_repeating_preview() {
                warn!(error = %e, "Failed to resume preview");
            }
        }
        self.machine.set_state(CaptureState::Preview);
        self.apply_deferred();
    }

    /// Applies stream changes held back while a still was in flight.
    fn apply_deferred(&mut self) {
        match self.deferred.take() {
            Some(Deferred::Streams { previous }) => {
                if let Err(e) = self.reconfigure_streams() {
                    warn!(error = %e, ratio = %self.aspect_ratio, "Failed to apply aspect ratio; reverting");
                    self.aspect_ratio = previous;
                    if let Err(e) = self.reconfigure_streams() {
                        error!(error = %e, "Failed to restore previous aspect ratio");
                    }
                }
            }
            Some(Deferred::Session) => {
                if let Err(e) = self.restart_session() {
                    error!(error = %e, "Failed to restart capture session");
                }
            }
            None => {}
        }
    }

    // ---- settings --------------------------------------------------------

    /// Switches cameras. An active camera is stopped and restarted; if the
    /// restart fails the previous facing is restored.
    pub(crate) fn set_facing(&mut self, facing: Facing) -> bool {
        if self.facing == facing {
            return false;
        }
        let previous = self.facing;
        self.facing = facing;
        if !self.is_active() {
            return true;
        }

        self.stop();
        let failure = match self.start() {
            Ok(true) => return true,
            Ok(false) => CameraError::NoDeviceAvailable,
            Err(e) => e,
        };
        warn!(error = %failure, %facing, "Failed to switch camera; reverting");
        self.facing = previous;
        if let Err(e) = self.start() {
            error!(error = %e, "Failed to reopen previous camera");
        }
        false
    }

    /// Changes the aspect ratio. Rejects the current ratio and ratios the
    /// open device cannot stream. Mid-capture changes rebuild the streams
    /// once the capture completes.
    pub(crate) fn set_aspect_ratio(&mut self, ratio: AspectRatio) -> bool {
        if ratio == self.aspect_ratio {
            return false;
        }
        if !self.preview_sizes.contains_ratio(&ratio) {
            debug!(%ratio, "Aspect ratio not supported");
            return false;
        }
        let previous = self.aspect_ratio;
        self.aspect_ratio = ratio;
        if !self.is_active() {
            return true;
        }
        if self.machine.is_busy() {
            debug!(%ratio, "Still in flight; aspect ratio applied after capture");
            if !matches!(self.deferred, Some(Deferred::Streams { .. })) {
                self.deferred = Some(Deferred::Streams { previous });
            }
            return true;
        }

        match self.reconfigure_streams() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, %ratio, "Failed to apply aspect ratio; reverting");
                self.aspect_ratio = previous;
                if let Err(e) = self.reconfigure_streams() {
                    error!(error = %e, "Failed to restore previous aspect ratio");
                }
                false
            }
        }
    }

    /// Rebuilds the still buffer and, once the device is open, the session.
    fn reconfigure_streams(&mut self) -> Result<(), CameraError> {
        self.prepare_image_reader()?;
        if self.device.is_some() {
            self.restart_session()?;
        }
        Ok(())
    }

    /// Toggles continuous auto focus. Mid-capture changes take effect when
    /// the capture completes.
    pub(crate) fn set_auto_focus(&mut self, auto_focus: bool) -> bool {
        if self.auto_focus == auto_focus {
            return false;
        }
        let previous = self.auto_focus;
        self.auto_focus = auto_focus;
        if !self.preview_active() {
            return true;
        }

        self.update_auto_focus();
        if let Err(e) = self.set_repeating_preview() {
            warn!(error = %e, auto_focus, "Failed to apply auto focus; reverting");
            self.auto_focus = previous;
            self.update_auto_focus();
            return false;
        }
        true
    }

    /// Changes the flash mode. Mid-capture changes take effect when the
    /// capture completes.
    pub(crate) fn set_flash(&mut self, flash: Flash) -> bool {
        if self.flash == flash {
            return false;
        }
        let previous = self.flash;
        self.flash = flash;
        if !self.preview_active() {
            return true;
        }

        self.update_flash();
        if let Err(e) = self.set_repeating_preview() {
            warn!(error = %e, %flash, "Failed to apply flash; reverting");
            self.flash = previous;
            self.update_flash();
            return false;
        }
        true
    }

    pub(crate) fn set_display_orientation(&mut self, degrees: i32) {
        self.display_orientation = degrees;
        self.preview.set_display_orientation(degrees);
    }

    // ---- getters ---------------------------------------------------------

    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub(crate) fn auto_focus(&self) -> bool {
        self.auto_focus
    }

    pub(crate) fn flash(&self) -> Flash {
        self.flash
    }

    pub(crate) fn display_orientation(&self) -> i32 {
        self.display_orientation
    }

    pub(crate) fn supported_aspect_ratios(&self) -> Vec<AspectRatio> {
        self.preview_sizes.ratios()
    }

    pub(crate) fn is_camera_opened(&self) -> bool {
        self.device.is_some()
    }

    pub(crate) fn camera_id(&self) -> Option<&str> {
        self.camera_id.as_deref()
    }

    pub(crate) fn capture_state(&self) -> CaptureState {
        self.machine.state()
    }

    pub(crate) fn stats(&self) -> &CameraStats {
        &self.stats
    }

    // ---- driver events ---------------------------------------------------

    pub(super) fn on_device_opened(&mut self, generation: u64, mut device: Box<dyn CameraDevice>) {
        if generation != self.device_generation || !self.opening {
            debug!(camera_id = device.id(), "Closing stale camera device");
            device.close();
            return;
        }
        info!(camera_id = device.id(), "Camera opened");
        self.opening = false;
        self.device = Some(device);
        self.announced.insert(generation);
        self.outbox.push(Notification::Opened);
        if let Err(e) = self.start_capture_session() {
            error!(error = %e, "Failed to start capture session");
        }
    }

    pub(super) fn on_device_closed(&mut self, generation: u64, camera_id: &str) {
        if self.announced.remove(&generation) {
            info!(camera_id, "Camera closed");
            self.outbox.push(Notification::Closed);
        }
    }

    /// Disconnection and fatal errors leave the core detached until the
    /// next `start`.
    pub(super) fn on_device_lost(&mut self, generation: u64, camera_id: &str, error: Option<i32>) {
        if generation != self.device_generation {
            return;
        }
        match error {
            Some(code) => error!(camera_id, code, "Camera device error"),
            None => warn!(camera_id, "Camera disconnected"),
        }
        self.stats.device_errors += 1;
        self.deferred = None;
        self.close_session();
        if let Some(mut device) = self.device.take() {
            device.close();
        }
        self.opening = false;
        self.preview_request = None;
    }

    pub(super) fn on_session_configured(&mut self, generation: u64, mut session: Box<dyn CaptureSession>) {
        if generation != self.session_generation || self.device.is_none() {
            debug!(session = session.id(), "Closing stale capture session");
            session.close();
            return;
        }
        self.stats.sessions_configured += 1;
        self.session = Some(session);
        self.update_auto_focus();
        self.update_flash();
        if let Err(e) = self.set_repeating_preview() {
            error!(error = %e, "Failed to start camera preview");
            return;
        }
        info!(aspect_ratio = %self.aspect_ratio, "Preview started");
    }

    pub(super) fn on_session_configure_failed(&mut self, generation: u64) {
        if generation == self.session_generation {
            error!("Failed to configure capture session");
        }
    }

    pub(super) fn on_session_closed(&mut self, session_id: u64) {
        if self.session.as_ref().is_some_and(|s| s.id() == session_id) {
            debug!(session = session_id, "Capture session closed");
            self.session = None;
            self.machine.set_state(CaptureState::Preview);
        }
    }

    pub(super) fn on_preview_result(&mut self, generation: u64, result: &CaptureResult) {
        if generation != self.session_generation {
            return;
        }
        match self.machine.process(result) {
            Some(CaptureAction::CaptureStill) => {
                self.capture_still_picture();
            }
            Some(CaptureAction::RunPrecapture) => self.run_precapture(),
            None => {}
        }
    }

    pub(super) fn on_still_completed(&mut self, generation: u64) {
        if generation != self.session_generation {
            return;
        }
        debug!("Still capture completed");
        self.unlock_focus();
    }

    pub(super) fn on_still_failed(&mut self, generation: u64) {
        if generation != self.session_generation {
            return;
        }
        error!("Still capture failed");
        self.stats.still_capture_failures += 1;
        self.awaiting_image = false;
        self.unlock_focus();
    }

    pub(super) fn on_image_available(&mut self) {
        let mut data = None;
        if let Some(reader) = self.retired_reader.as_mut() {
            data = take_still(&mut **reader);
            if data.is_some() {
                if let Some(mut reader) = self.retired_reader.take() {
                    reader.close();
                }
            }
        }
        if data.is_none() {
            if let Some(reader) = self.image_reader.as_mut() {
                data = take_still(&mut **reader);
            }
        }
        let Some(data) = data else {
            return;
        };
        self.awaiting_image = false;

        match data {
            Some(data) => {
                info!(bytes = data.len(), "Picture taken");
                self.stats.record_picture(data.len());
                self.outbox.push(Notification::PictureTaken(data));
            }
            None => warn!("Still image had no planes"),
        }
    }

    pub(super) fn on_surface_changed(&mut self) {
        if self.device.is_none() {
            return;
        }
        if self.machine.is_busy() {
            debug!("Still in flight; session restarted after capture");
            if self.deferred.is_none() {
                self.deferred = Some(Deferred::Session);
            }
            return;
        }
        if let Err(e) = self.restart_session() {
            error!(error = %e, "Failed to restart capture session");
        }
    }
}

/// Dequeues one still and copies out its first plane. `Some(None)` means
/// an image arrived without planes.
fn take_still(reader: &mut dyn ImageReader) -> Option<Option<Vec<u8>>> {
    let image = match reader.acquire_next_image() {
        Ok(Some(image)) => image,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "Failed to acquire still image");
            return None;
        }
    };
    let data = image.planes().first().map(|plane| plane.to_vec());
    drop(image);
    Some(data)
}

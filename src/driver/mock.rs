//! In-process driver and preview provider for tests and the demo binary.
//!
//! Nothing is delivered on its own. Queued driver events (device opened,
//! session configured, ...) run when [`MockDriver::dispatch`] is called,
//! and per-frame metadata and still completions are pushed explicitly, so
//! a test decides exactly when the driver's delivery thread "runs".

use super::{
    AfMode, CameraCharacteristics, CameraDevice, CameraDriver, CaptureCallback, CaptureRequest,
    CaptureResult, CaptureSession, DeviceStateCallback, HardwareLevel, Image,
    ImageAvailableListener, ImageFormat, ImageReader, LensFacing, OutputClass, PreviewSurface,
    RequestTemplate, SessionStateCallback, StreamConfigurationMap, Surface,
    SurfaceChangedCallback,
};
use crate::error::DriverError;
use crate::geometry::Size;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Surface id the mock preview hands out.
const PREVIEW_SURFACE_ID: u64 = 1;

/// Operations a test can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    /// `CameraDriver::camera_id_list`.
    ListCameras,
    /// `CameraDriver::open_camera`.
    OpenCamera,
    /// `CameraDriver::new_image_reader`.
    NewImageReader,
    /// `CameraDevice::create_capture_request`.
    CreateRequest,
    /// `CameraDevice::create_capture_session` returns an error.
    CreateSession,
    /// The session is created but reports `on_configure_failed`.
    ConfigureSession,
    /// `CaptureSession::set_repeating_request`.
    SetRepeating,
    /// `CaptureSession::capture`.
    Capture,
    /// `CaptureSession::stop_repeating`.
    StopRepeating,
}

/// A driver call, as recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// A camera was opened.
    OpenCamera(String),
    /// A still buffer was allocated.
    NewImageReader {
        /// Buffer image size.
        size: Size,
        /// Buffer image format.
        format: ImageFormat,
        /// Queue depth.
        max_images: usize,
    },
    /// A still buffer was closed.
    CloseImageReader(Surface),
    /// A request was built from a template.
    CreateCaptureRequest(RequestTemplate),
    /// A session was requested over `outputs`.
    CreateSession {
        /// Device the session belongs to.
        camera_id: String,
        /// Output surfaces.
        outputs: Vec<Surface>,
    },
    /// The repeating request was replaced.
    SetRepeating {
        /// Session id.
        session: u64,
        /// The submitted request.
        request: CaptureRequest,
    },
    /// A one-shot request was submitted.
    Capture {
        /// Session id.
        session: u64,
        /// The submitted request.
        request: CaptureRequest,
    },
    /// The repeating request was stopped.
    StopRepeating(u64),
    /// A session was closed.
    CloseSession(u64),
    /// A device was closed.
    CloseDevice(String),
}

/// One camera the mock driver exposes.
#[derive(Debug, Clone)]
pub struct MockCameraSpec {
    /// Camera id.
    pub id: String,
    /// Characteristics reported for the camera.
    pub characteristics: CameraCharacteristics,
}

impl MockCameraSpec {
    /// A full-level camera with the standard size tables.
    pub fn new(id: impl Into<String>, facing: LensFacing) -> Self {
        Self {
            id: id.into(),
            characteristics: CameraCharacteristics {
                hardware_level: Some(HardwareLevel::Full),
                lens_facing: Some(facing),
                stream_configuration_map: Some(standard_stream_map()),
                sensor_orientation: if facing == LensFacing::Front { 270 } else { 90 },
                af_available_modes: vec![AfMode::Off, AfMode::Auto, AfMode::ContinuousPicture],
            },
        }
    }

    /// Overrides the hardware level.
    pub fn with_hardware_level(mut self, level: Option<HardwareLevel>) -> Self {
        self.characteristics.hardware_level = level;
        self
    }

    /// Overrides the lens facing.
    pub fn with_lens_facing(mut self, facing: Option<LensFacing>) -> Self {
        self.characteristics.lens_facing = facing;
        self
    }

    /// Overrides the sensor orientation.
    pub fn with_sensor_orientation(mut self, degrees: i32) -> Self {
        self.characteristics.sensor_orientation = degrees;
        self
    }

    /// Overrides the advertised AF modes.
    pub fn with_af_modes(mut self, modes: Vec<AfMode>) -> Self {
        self.characteristics.af_available_modes = modes;
        self
    }

    /// Overrides the stream configuration map.
    pub fn with_stream_map(mut self, map: Option<StreamConfigurationMap>) -> Self {
        self.characteristics.stream_configuration_map = map;
        self
    }
}

/// Size tables of a typical phone sensor.
pub fn standard_stream_map() -> StreamConfigurationMap {
    let preview = [
        Size::new(352, 288),
        Size::new(640, 480),
        Size::new(960, 720),
        Size::new(1280, 720),
        Size::new(1440, 1080),
        Size::new(1600, 1200),
        Size::new(1920, 1080),
        Size::new(2560, 1440),
    ];
    let jpeg = [
        Size::new(640, 480),
        Size::new(1920, 1080),
        Size::new(3264, 2448),
        Size::new(3840, 2160),
        Size::new(4000, 3000),
    ];
    StreamConfigurationMap::new()
        .with_class_sizes(OutputClass::SurfaceHolder, &preview)
        .with_class_sizes(OutputClass::SurfaceTexture, &preview)
        .with_format_sizes(ImageFormat::Jpeg, &jpeg)
}

enum MockEvent {
    DeviceOpened {
        camera_id: String,
        callback: Arc<dyn DeviceStateCallback>,
    },
    DeviceClosed {
        camera_id: String,
        callback: Arc<dyn DeviceStateCallback>,
    },
    SessionConfigured {
        session_id: u64,
        callback: Arc<dyn SessionStateCallback>,
    },
    SessionConfigureFailed {
        callback: Arc<dyn SessionStateCallback>,
    },
    SessionClosed {
        session_id: u64,
        callback: Arc<dyn SessionStateCallback>,
    },
}

struct SessionState {
    callback: Arc<dyn SessionStateCallback>,
    repeating: Option<(CaptureRequest, Arc<dyn CaptureCallback>)>,
    closed: bool,
}

struct ReaderState {
    size: Size,
    queue: VecDeque<Vec<u8>>,
    listener: Option<Arc<dyn ImageAvailableListener>>,
    closed: bool,
}

#[derive(Default)]
struct MockState {
    cameras: Vec<MockCameraSpec>,
    calls: Vec<DriverCall>,
    failing: HashSet<MockOp>,
    pending: VecDeque<MockEvent>,
    next_surface: u64,
    next_session: u64,
    open_device: Option<(String, Arc<dyn DeviceStateCallback>)>,
    sessions: HashMap<u64, SessionState>,
    in_flight: VecDeque<(CaptureRequest, Arc<dyn CaptureCallback>)>,
    readers: HashMap<Surface, ReaderState>,
    images_released: usize,
}

impl MockState {
    fn check(&self, op: MockOp) -> Result<(), DriverError> {
        if self.failing.contains(&op) {
            return Err(DriverError::Other(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scriptable in-memory camera driver.
///
/// Clones share state, so a test keeps one handle while the camera core
/// owns another.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// A driver with no cameras.
    pub fn new() -> Self {
        let driver = Self::default();
        lock(&driver.state).next_surface = 100;
        driver
    }

    /// A driver exposing a back camera `"0"` and a front camera `"1"`.
    pub fn with_default_cameras() -> Self {
        Self::new()
            .with_camera(MockCameraSpec::new("0", LensFacing::Back))
            .with_camera(MockCameraSpec::new("1", LensFacing::Front))
    }

    /// Adds a camera.
    pub fn with_camera(self, spec: MockCameraSpec) -> Self {
        lock(&self.state).cameras.push(spec);
        self
    }

    /// Makes `op` fail (or succeed again) until changed.
    pub fn set_failing(&self, op: MockOp, failing: bool) {
        let mut state = lock(&self.state);
        if failing {
            state.failing.insert(op);
        } else {
            state.failing.remove(&op);
        }
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<DriverCall> {
        lock(&self.state).calls.clone()
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    /// Number of acquired images that have been released.
    pub fn images_released(&self) -> usize {
        lock(&self.state).images_released
    }

    /// Number of one-shot requests not yet completed.
    pub fn in_flight_captures(&self) -> usize {
        lock(&self.state).in_flight.len()
    }

    /// The repeating request of the newest open session.
    pub fn repeating_request(&self) -> Option<CaptureRequest> {
        let state = lock(&self.state);
        newest_open_session(&state)
            .and_then(|session| session.repeating.as_ref())
            .map(|(request, _)| request.clone())
    }

    /// Runs queued lifecycle events until none remain. Returns how many ran.
    pub fn dispatch(&self) -> usize {
        let mut delivered = 0;
        loop {
            let event = lock(&self.state).pending.pop_front();
            let Some(event) = event else {
                break;
            };
            delivered += 1;
            match event {
                MockEvent::DeviceOpened {
                    camera_id,
                    callback,
                } => {
                    lock(&self.state).open_device = Some((camera_id.clone(), Arc::clone(&callback)));
                    let device = MockDevice {
                        id: camera_id,
                        state: Arc::clone(&self.state),
                        callback: Arc::clone(&callback),
                        closed: false,
                    };
                    callback.on_opened(Box::new(device));
                }
                MockEvent::DeviceClosed {
                    camera_id,
                    callback,
                } => callback.on_closed(&camera_id),
                MockEvent::SessionConfigured {
                    session_id,
                    callback,
                } => {
                    let session = MockSession {
                        id: session_id,
                        state: Arc::clone(&self.state),
                    };
                    callback.on_configured(Box::new(session));
                }
                MockEvent::SessionConfigureFailed { callback } => callback.on_configure_failed(),
                MockEvent::SessionClosed {
                    session_id,
                    callback,
                } => callback.on_closed(session_id),
            }
        }
        delivered
    }

    /// Delivers `result` as completed metadata of the current repeating
    /// request. Returns false when nothing is repeating.
    pub fn emit_frame(&self, result: CaptureResult) -> bool {
        let callback = self.repeating_callback();
        match callback {
            Some(callback) => {
                callback.on_capture_completed(&result);
                true
            }
            None => false,
        }
    }

    /// Delivers `result` as partial metadata of the current repeating request.
    pub fn emit_partial(&self, result: CaptureResult) -> bool {
        let callback = self.repeating_callback();
        match callback {
            Some(callback) => {
                callback.on_capture_progressed(&result);
                true
            }
            None => false,
        }
    }

    fn repeating_callback(&self) -> Option<Arc<dyn CaptureCallback>> {
        let state = lock(&self.state);
        newest_open_session(&state)
            .and_then(|session| session.repeating.as_ref())
            .map(|(_, callback)| Arc::clone(callback))
    }

    /// Completes every in-flight one-shot request with `result`.
    ///
    /// Requests that target a still buffer also queue a JPEG into it and
    /// notify the buffer's listener. Returns how many requests completed.
    pub fn complete_captures(&self, result: CaptureResult) -> usize {
        let mut completed = 0;
        loop {
            let (callback, listener) = {
                let mut state = lock(&self.state);
                let Some((request, callback)) = state.in_flight.pop_front() else {
                    break;
                };
                let mut listener = None;
                for target in &request.targets {
                    if let Some(reader) = state.readers.get_mut(target) {
                        if reader.closed {
                            continue;
                        }
                        reader
                            .queue
                            .push_back(fake_jpeg(reader.size, request.jpeg_orientation));
                        listener = reader.listener.clone();
                    }
                }
                (callback, listener)
            };
            callback.on_capture_completed(&result);
            if let Some(listener) = listener {
                listener.on_image_available();
            }
            completed += 1;
        }
        completed
    }

    /// Fails every in-flight one-shot request.
    pub fn fail_captures(&self) -> usize {
        let drained: Vec<_> = lock(&self.state).in_flight.drain(..).collect();
        for (_, callback) in &drained {
            callback.on_capture_failed();
        }
        drained.len()
    }

    /// Reports the open device as disconnected.
    pub fn disconnect(&self) {
        let device = lock(&self.state).open_device.take();
        if let Some((camera_id, callback)) = device {
            callback.on_disconnected(&camera_id);
        }
    }

    /// Reports a fatal error on the open device.
    pub fn raise_device_error(&self, error: i32) {
        let device = lock(&self.state).open_device.take();
        if let Some((camera_id, callback)) = device {
            callback.on_error(&camera_id, error);
        }
    }
}

fn newest_open_session(state: &MockState) -> Option<&SessionState> {
    state
        .sessions
        .iter()
        .filter(|(_, session)| !session.closed)
        .max_by_key(|(id, _)| **id)
        .map(|(_, session)| session)
}

/// Minimal JPEG-framed payload encoding the buffer size and rotation.
fn fake_jpeg(size: Size, orientation: Option<i32>) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend_from_slice(&size.width().to_be_bytes());
    data.extend_from_slice(&size.height().to_be_bytes());
    data.extend_from_slice(&orientation.unwrap_or(0).to_be_bytes());
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

impl CameraDriver for MockDriver {
    fn camera_id_list(&self) -> Result<Vec<String>, DriverError> {
        let state = lock(&self.state);
        state.check(MockOp::ListCameras)?;
        Ok(state.cameras.iter().map(|spec| spec.id.clone()).collect())
    }

    fn camera_characteristics(&self, camera_id: &str) -> Result<CameraCharacteristics, DriverError> {
        lock(&self.state)
            .cameras
            .iter()
            .find(|spec| spec.id == camera_id)
            .map(|spec| spec.characteristics.clone())
            .ok_or_else(|| DriverError::Other(format!("unknown camera {camera_id}")))
    }

    fn open_camera(
        &mut self,
        camera_id: &str,
        callback: Arc<dyn DeviceStateCallback>,
    ) -> Result<(), DriverError> {
        let mut state = lock(&self.state);
        state.calls.push(DriverCall::OpenCamera(camera_id.to_owned()));
        state.check(MockOp::OpenCamera)?;
        if !state.cameras.iter().any(|spec| spec.id == camera_id) {
            return Err(DriverError::Other(format!("unknown camera {camera_id}")));
        }
        state.pending.push_back(MockEvent::DeviceOpened {
            camera_id: camera_id.to_owned(),
            callback,
        });
        Ok(())
    }

    fn new_image_reader(
        &mut self,
        size: Size,
        format: ImageFormat,
        max_images: usize,
    ) -> Result<Box<dyn ImageReader>, DriverError> {
        let mut state = lock(&self.state);
        state.calls.push(DriverCall::NewImageReader {
            size,
            format,
            max_images,
        });
        state.check(MockOp::NewImageReader)?;
        state.next_surface += 1;
        let surface = Surface::new(state.next_surface);
        state.readers.insert(
            surface,
            ReaderState {
                size,
                queue: VecDeque::new(),
                listener: None,
                closed: false,
            },
        );
        Ok(Box::new(MockImageReader {
            surface,
            size,
            format,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockDevice {
    id: String,
    state: Arc<Mutex<MockState>>,
    callback: Arc<dyn DeviceStateCallback>,
    closed: bool,
}

impl CameraDevice for MockDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn create_capture_request(&self, template: RequestTemplate) -> Result<CaptureRequest, DriverError> {
        let mut state = lock(&self.state);
        state.calls.push(DriverCall::CreateCaptureRequest(template));
        state.check(MockOp::CreateRequest)?;
        Ok(CaptureRequest::new(template))
    }

    fn create_capture_session(
        &mut self,
        outputs: &[Surface],
        callback: Arc<dyn SessionStateCallback>,
    ) -> Result<(), DriverError> {
        let mut state = lock(&self.state);
        state.calls.push(DriverCall::CreateSession {
            camera_id: self.id.clone(),
            outputs: outputs.to_vec(),
        });
        state.check(MockOp::CreateSession)?;
        if self.closed {
            return Err(DriverError::InvalidState("device closed".to_owned()));
        }
        if state.failing.contains(&MockOp::ConfigureSession) {
            state
                .pending
                .push_back(MockEvent::SessionConfigureFailed { callback });
            return Ok(());
        }
        state.next_session += 1;
        let session_id = state.next_session;
        state.sessions.insert(
            session_id,
            SessionState {
                callback: Arc::clone(&callback),
                repeating: None,
                closed: false,
            },
        );
        state.pending.push_back(MockEvent::SessionConfigured {
            session_id,
            callback,
        });
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let mut state = lock(&self.state);
        state.calls.push(DriverCall::CloseDevice(self.id.clone()));
        if state
            .open_device
            .as_ref()
            .is_some_and(|(id, _)| *id == self.id)
        {
            state.open_device = None;
        }
        state.pending.push_back(MockEvent::DeviceClosed {
            camera_id: self.id.clone(),
            callback: Arc::clone(&self.callback),
        });
    }
}

struct MockSession {
    id: u64,
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    fn live<'a>(&self, state: &'a mut MockState) -> Result<&'a mut SessionState, DriverError> {
        state
            .sessions
            .get_mut(&self.id)
            .filter(|session| !session.closed)
            .ok_or_else(|| DriverError::InvalidState(format!("session {} closed", self.id)))
    }
}

impl CaptureSession for MockSession {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_repeating_request(
        &mut self,
        request: &CaptureRequest,
        callback: Arc<dyn CaptureCallback>,
    ) -> Result<(), DriverError> {
        let mut state = lock(&self.state);
        state.calls.push(DriverCall::SetRepeating {
            session: self.id,
            request: request.clone(),
        });
        state.check(MockOp::SetRepeating)?;
        self.live(&mut state)?.repeating = Some((request.clone(), callback));
        Ok(())
    }

    fn capture(
        &mut self,
        request: &CaptureRequest,
        callback: Arc<dyn CaptureCallback>,
    ) -> Result<(), DriverError> {
        let mut state = lock(&self.state);
        state.calls.push(DriverCall::Capture {
            session: self.id,
            request: request.clone(),
        });
        state.check(MockOp::Capture)?;
        self.live(&mut state)?;
        state.in_flight.push_back((request.clone(), callback));
        Ok(())
    }

    fn stop_repeating(&mut self) -> Result<(), DriverError> {
        let mut state = lock(&self.state);
        state.calls.push(DriverCall::StopRepeating(self.id));
        state.check(MockOp::StopRepeating)?;
        self.live(&mut state)?.repeating = None;
        Ok(())
    }

    fn close(&mut self) {
        let mut state = lock(&self.state);
        let Some(session) = state.sessions.get_mut(&self.id) else {
            return;
        };
        if session.closed {
            return;
        }
        session.closed = true;
        session.repeating = None;
        let callback = Arc::clone(&session.callback);
        state.calls.push(DriverCall::CloseSession(self.id));
        state.pending.push_back(MockEvent::SessionClosed {
            session_id: self.id,
            callback,
        });
    }
}

struct MockImageReader {
    surface: Surface,
    size: Size,
    format: ImageFormat,
    state: Arc<Mutex<MockState>>,
}

impl ImageReader for MockImageReader {
    fn size(&self) -> Size {
        self.size
    }

    fn format(&self) -> ImageFormat {
        self.format
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn set_on_image_available(&mut self, listener: Arc<dyn ImageAvailableListener>) {
        if let Some(reader) = lock(&self.state).readers.get_mut(&self.surface) {
            reader.listener = Some(listener);
        }
    }

    fn acquire_next_image(&mut self) -> Result<Option<Box<dyn Image>>, DriverError> {
        let mut state = lock(&self.state);
        let reader = state
            .readers
            .get_mut(&self.surface)
            .filter(|reader| !reader.closed)
            .ok_or_else(|| DriverError::InvalidState("image reader closed".to_owned()))?;
        Ok(reader.queue.pop_front().map(|data| {
            Box::new(MockImage {
                data,
                state: Arc::clone(&self.state),
            }) as Box<dyn Image>
        }))
    }

    fn close(&mut self) {
        let mut state = lock(&self.state);
        let newly_closed = match state.readers.get_mut(&self.surface) {
            Some(reader) if !reader.closed => {
                reader.closed = true;
                reader.queue.clear();
                reader.listener = None;
                true
            }
            _ => false,
        };
        if newly_closed {
            state.calls.push(DriverCall::CloseImageReader(self.surface));
        }
    }
}

struct MockImage {
    data: Vec<u8>,
    state: Arc<Mutex<MockState>>,
}

impl Image for MockImage {
    fn planes(&self) -> Vec<&[u8]> {
        vec![self.data.as_slice()]
    }
}

impl Drop for MockImage {
    fn drop(&mut self) {
        lock(&self.state).images_released += 1;
    }
}

struct PreviewState {
    width: u32,
    height: u32,
    ready: bool,
    buffer_size: Option<(u32, u32)>,
    display_orientation: i32,
    output_class: OutputClass,
    callback: Option<Arc<dyn SurfaceChangedCallback>>,
}

/// In-memory preview provider.
///
/// Clones share state, so a test can resize the surface the camera holds.
#[derive(Clone)]
pub struct MockPreview {
    state: Arc<Mutex<PreviewState>>,
}

impl MockPreview {
    /// A ready texture-backed surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(PreviewState {
                width,
                height,
                ready: true,
                buffer_size: None,
                display_orientation: 0,
                output_class: OutputClass::SurfaceTexture,
                callback: None,
            })),
        }
    }

    /// A surface that is not ready until [`MockPreview::resize`] is called.
    pub fn pending() -> Self {
        let preview = Self::new(0, 0);
        preview.lock().ready = false;
        preview
    }

    fn lock(&self) -> MutexGuard<'_, PreviewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resizes (and readies) the surface, then notifies the listener.
    pub fn resize(&self, width: u32, height: u32) {
        let callback = {
            let mut state = self.lock();
            state.width = width;
            state.height = height;
            state.ready = true;
            state.callback.clone()
        };
        if let Some(callback) = callback {
            callback.on_surface_changed();
        }
    }

    /// The buffer size last requested by the camera.
    pub fn buffer_size(&self) -> Option<(u32, u32)> {
        self.lock().buffer_size
    }

    /// The display orientation last set by the camera.
    pub fn display_orientation(&self) -> i32 {
        self.lock().display_orientation
    }
}

impl PreviewSurface for MockPreview {
    fn is_ready(&self) -> bool {
        self.lock().ready
    }

    fn width(&self) -> u32 {
        self.lock().width
    }

    fn height(&self) -> u32 {
        self.lock().height
    }

    fn surface(&self) -> Option<Surface> {
        self.lock().ready.then(|| Surface::new(PREVIEW_SURFACE_ID))
    }

    fn set_buffer_size(&mut self, width: u32, height: u32) {
        self.lock().buffer_size = Some((width, height));
    }

    fn set_display_orientation(&mut self, degrees: i32) {
        self.lock().display_orientation = degrees;
    }

    fn set_callback(&mut self, callback: Arc<dyn SurfaceChangedCallback>) {
        self.lock().callback = Some(callback);
    }

    fn output_class(&self) -> OutputClass {
        self.lock().output_class
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cameras_listed() {
        let driver = MockDriver::with_default_cameras();
        assert_eq!(driver.camera_id_list().unwrap(), vec!["0", "1"]);
        let front = driver.camera_characteristics("1").unwrap();
        assert_eq!(front.lens_facing, Some(LensFacing::Front));
        assert!(driver.camera_characteristics("7").is_err());
    }

    #[test]
    fn test_injected_failure() {
        let driver = MockDriver::with_default_cameras();
        driver.set_failing(MockOp::ListCameras, true);
        assert!(driver.camera_id_list().is_err());
        driver.set_failing(MockOp::ListCameras, false);
        assert!(driver.camera_id_list().is_ok());
    }

    #[test]
    fn test_fake_jpeg_framing() {
        let data = fake_jpeg(Size::new(4000, 3000), Some(90));
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
        assert_eq!(&data[data.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_image_release_counted() {
        let mut driver = MockDriver::with_default_cameras();
        let mut reader = driver
            .new_image_reader(Size::new(640, 480), ImageFormat::Jpeg, 2)
            .unwrap();
        lock(&driver.state)
            .readers
            .get_mut(&reader.surface())
            .unwrap()
            .queue
            .push_back(vec![1, 2, 3]);

        let image = reader.acquire_next_image().unwrap().unwrap();
        assert_eq!(image.planes()[0], &[1, 2, 3]);
        drop(image);
        assert_eq!(driver.images_released(), 1);
        assert!(reader.acquire_next_image().unwrap().is_none());
    }

    #[test]
    fn test_preview_pending_until_resized() {
        let preview = MockPreview::pending();
        assert!(!preview.is_ready());
        assert!(preview.surface().is_none());
        preview.resize(1080, 1920);
        assert!(preview.is_ready());
        assert_eq!((preview.width(), preview.height()), (1080, 1920));
    }
}

//! End-to-end capture flows driven through the public `Camera` API over the
//! mock driver.

use cameraview::camera::{choose_optimal_size, CaptureState};
use cameraview::driver::{
    AeMode, AeState, AePrecaptureTrigger, AfMode, AfState, AfTrigger, CaptureRequest,
    CaptureResult, DriverCall, FlashMode, HardwareLevel, ImageFormat, LensFacing, MockCameraSpec,
    MockOp, RequestTemplate, Surface,
};
use cameraview::{
    AspectRatio, Camera, CameraCallback, CameraConfig, Facing, Flash, MockDriver, MockPreview,
    Size, SizeMap,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

const PREVIEW_SURFACE: Surface = Surface::new(1);
const FIRST_READER: Surface = Surface::new(101);

#[derive(Default)]
struct Recorder {
    opened: AtomicUsize,
    closed: AtomicUsize,
    pictures: Mutex<Vec<Vec<u8>>>,
}

impl Recorder {
    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn pictures(&self) -> Vec<Vec<u8>> {
        self.pictures.lock().unwrap().clone()
    }
}

impl CameraCallback for Recorder {
    fn on_camera_opened(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn on_camera_closed(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_picture_taken(&self, data: &[u8]) {
        self.pictures.lock().unwrap().push(data.to_vec());
    }
}

struct Rig {
    camera: Camera,
    driver: MockDriver,
    preview: MockPreview,
    recorder: Arc<Recorder>,
}

fn rig_with(driver: MockDriver, preview: MockPreview) -> Rig {
    let camera = Camera::new(Box::new(driver.clone()), Box::new(preview.clone()));
    let recorder = Arc::new(Recorder::default());
    camera.add_callback(recorder.clone());
    Rig {
        camera,
        driver,
        preview,
        recorder,
    }
}

/// A camera with the back device open and the preview repeating.
fn open_rig() -> Rig {
    let rig = rig_with(MockDriver::with_default_cameras(), MockPreview::new(1080, 1920));
    assert!(rig.camera.start().unwrap());
    rig.driver.dispatch();
    assert!(rig.camera.is_camera_opened());
    rig
}

fn ratio(x: u32, y: u32) -> AspectRatio {
    AspectRatio::of(x, y).unwrap()
}

fn frame(af: AfState, ae: AeState) -> CaptureResult {
    CaptureResult::new(Some(af), Some(ae))
}

fn captures(driver: &MockDriver, template: RequestTemplate) -> Vec<CaptureRequest> {
    driver
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            DriverCall::Capture { request, .. } if request.template == template => Some(request),
            _ => None,
        })
        .collect()
}

fn stills(driver: &MockDriver) -> Vec<CaptureRequest> {
    captures(driver, RequestTemplate::StillCapture)
}

fn one_shots(driver: &MockDriver) -> Vec<CaptureRequest> {
    captures(driver, RequestTemplate::Preview)
}

fn last_repeating(driver: &MockDriver) -> Option<CaptureRequest> {
    driver.calls().into_iter().rev().find_map(|call| match call {
        DriverCall::SetRepeating { request, .. } => Some(request),
        _ => None,
    })
}

fn position(calls: &[DriverCall], pred: impl Fn(&DriverCall) -> bool) -> usize {
    calls.iter().position(pred).expect("call not recorded")
}

#[test]
fn value_model_scenarios() {
    // S1
    let a = ratio(16, 9);
    let b = ratio(32, 18);
    assert!(a.ptr_eq(&b));
    assert!((a.to_float() - 1.777_777_8).abs() < 1e-6);
    assert_eq!(a.to_string(), "16:9");
    assert_eq!(AspectRatio::parse(&a.to_string()).unwrap(), a);

    // S2
    let mut map = SizeMap::new();
    assert!(map.add(Size::new(1920, 1080)));
    assert!(map.add(Size::new(1280, 720)));
    assert!(map.add(Size::new(640, 480)));
    assert_eq!(map.ratios(), vec![ratio(16, 9), ratio(4, 3)]);
    let wide: Vec<_> = map.sizes(&ratio(16, 9)).unwrap().iter().copied().collect();
    assert_eq!(wide, vec![Size::new(1280, 720), Size::new(1920, 1080)]);

    // S3
    let candidates = BTreeSet::from([
        Size::new(640, 480),
        Size::new(960, 720),
        Size::new(1440, 1080),
        Size::new(1600, 1200),
    ]);
    assert_eq!(
        choose_optimal_size(1080, 1920, &candidates),
        Some(Size::new(1600, 1200))
    );
}

#[test]
fn start_streams_preview_over_both_outputs() {
    let rig = open_rig();
    let calls = rig.driver.calls();

    assert_eq!(
        calls[0],
        DriverCall::NewImageReader {
            size: Size::new(4000, 3000),
            format: ImageFormat::Jpeg,
            max_images: 2,
        }
    );
    assert_eq!(calls[1], DriverCall::OpenCamera("0".to_owned()));
    assert!(calls.contains(&DriverCall::CreateSession {
        camera_id: "0".to_owned(),
        outputs: vec![PREVIEW_SURFACE, FIRST_READER],
    }));

    let repeating = rig.driver.repeating_request().unwrap();
    assert_eq!(repeating.template, RequestTemplate::Preview);
    assert_eq!(repeating.targets, vec![PREVIEW_SURFACE]);
    assert_eq!(repeating.af_mode, Some(AfMode::ContinuousPicture));
    assert_eq!(repeating.ae_mode, Some(AeMode::On));
    assert_eq!(repeating.flash_mode, Some(FlashMode::Off));

    assert_eq!(rig.preview.buffer_size(), Some((1440, 1080)));
    assert_eq!(rig.camera.camera_id().as_deref(), Some("0"));
    assert_eq!(rig.camera.supported_aspect_ratios(), vec![ratio(4, 3), ratio(16, 9)]);
    assert_eq!(rig.recorder.opened(), 1);
    assert_eq!(rig.camera.stats().sessions_configured, 1);
}

#[test]
fn autofocus_capture_returns_to_preview() {
    let rig = open_rig();

    assert!(rig.camera.take_picture());
    assert_eq!(rig.camera.capture_state(), CaptureState::Locking);
    assert_eq!(one_shots(&rig.driver).last().unwrap().af_trigger, Some(AfTrigger::Start));

    assert!(rig.driver.emit_frame(frame(AfState::FocusedLocked, AeState::Converged)));
    assert_eq!(rig.camera.capture_state(), CaptureState::Capturing);
    assert!(rig.driver.calls().contains(&DriverCall::StopRepeating(1)));
    assert!(rig.driver.repeating_request().is_none());

    let still = stills(&rig.driver);
    assert_eq!(still.len(), 1);
    assert_eq!(still[0].targets, vec![FIRST_READER]);
    assert_eq!(still[0].af_mode, Some(AfMode::ContinuousPicture));
    assert_eq!(still[0].jpeg_orientation, Some(90));

    rig.driver.complete_captures(CaptureResult::default());
    assert_eq!(rig.camera.capture_state(), CaptureState::Preview);

    let calls = rig.driver.calls();
    let cancel = position(&calls, |call| {
        matches!(call, DriverCall::Capture { request, .. } if request.af_trigger == Some(AfTrigger::Cancel))
    });
    let resumed = calls
        .iter()
        .rposition(|call| matches!(call, DriverCall::SetRepeating { .. }))
        .unwrap();
    assert!(cancel < resumed);
    assert_eq!(
        rig.driver.repeating_request().unwrap().af_trigger,
        Some(AfTrigger::Idle)
    );

    let pictures = rig.recorder.pictures();
    assert_eq!(pictures.len(), 1);
    let jpeg = &pictures[0];
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    assert_eq!(&jpeg[2..6], &4000u32.to_be_bytes());
    assert_eq!(&jpeg[10..14], &90i32.to_be_bytes());
    assert_eq!(rig.driver.images_released(), 1);

    let stats = rig.camera.stats();
    assert_eq!(stats.pictures_taken, 1);
    assert_eq!(stats.picture_bytes, jpeg.len() as u64);
}

#[test]
fn take_picture_is_ignored_while_busy() {
    let rig = open_rig();

    assert!(rig.camera.take_picture());
    assert!(!rig.camera.take_picture());
    assert_eq!(one_shots(&rig.driver).len(), 1);

    rig.driver.emit_frame(frame(AfState::FocusedLocked, AeState::Converged));
    assert!(!rig.camera.take_picture());
    assert_eq!(stills(&rig.driver).len(), 1);

    rig.driver.complete_captures(CaptureResult::default());
    assert!(rig.camera.take_picture());
    assert_eq!(rig.recorder.pictures().len(), 1);
}

#[test]
fn unconverged_exposure_runs_precapture() {
    let rig = open_rig();
    assert!(rig.camera.take_picture());

    rig.driver.emit_frame(frame(AfState::FocusedLocked, AeState::Searching));
    assert_eq!(rig.camera.capture_state(), CaptureState::Precapture);
    let metering = one_shots(&rig.driver);
    assert_eq!(
        metering.last().unwrap().ae_precapture_trigger,
        Some(AePrecaptureTrigger::Start)
    );
    assert_eq!(metering.last().unwrap().af_trigger, Some(AfTrigger::Idle));

    rig.driver.emit_frame(frame(AfState::FocusedLocked, AeState::Precapture));
    assert_eq!(rig.camera.capture_state(), CaptureState::Waiting);
    rig.driver.emit_frame(frame(AfState::FocusedLocked, AeState::Precapture));
    assert_eq!(rig.camera.capture_state(), CaptureState::Waiting);
    assert!(stills(&rig.driver).is_empty());

    rig.driver.emit_frame(frame(AfState::FocusedLocked, AeState::FlashRequired));
    assert_eq!(rig.camera.capture_state(), CaptureState::Capturing);
    assert_eq!(stills(&rig.driver).len(), 1);

    rig.driver.complete_captures(CaptureResult::default());
    assert_eq!(rig.camera.capture_state(), CaptureState::Preview);
    assert_eq!(rig.recorder.pictures().len(), 1);
    assert_eq!(
        rig.driver.repeating_request().unwrap().ae_precapture_trigger,
        Some(AePrecaptureTrigger::Idle)
    );
}

#[test]
fn partial_results_drive_the_machine() {
    let rig = open_rig();
    assert!(rig.camera.take_picture());
    assert!(rig.driver.emit_partial(frame(AfState::NotFocusedLocked, AeState::Converged)));
    assert_eq!(rig.camera.capture_state(), CaptureState::Capturing);
}

#[test]
fn capture_without_autofocus_skips_the_lock() {
    let rig = open_rig();
    assert!(rig.camera.set_auto_focus(false));
    assert_eq!(
        rig.driver.repeating_request().unwrap().af_mode,
        Some(AfMode::Off)
    );

    assert!(rig.camera.take_picture());
    assert_eq!(rig.camera.capture_state(), CaptureState::Capturing);
    assert!(one_shots(&rig.driver).is_empty());
    let still = stills(&rig.driver);
    assert_eq!(still.len(), 1);
    assert_eq!(still[0].af_mode, Some(AfMode::Off));

    rig.driver.complete_captures(CaptureResult::default());
    assert_eq!(rig.camera.capture_state(), CaptureState::Preview);
    assert_eq!(rig.recorder.pictures().len(), 1);
}

#[test]
fn flash_policy_on_preview_and_still() {
    let rig = open_rig();
    rig.camera.set_auto_focus(false);

    // Flash off.
    rig.camera.take_picture();
    let still = stills(&rig.driver).pop().unwrap();
    assert_eq!(still.ae_mode, Some(AeMode::On));
    assert_eq!(still.flash_mode, Some(FlashMode::Off));
    rig.driver.complete_captures(CaptureResult::default());

    // Flash on fires only for the still.
    assert!(rig.camera.set_flash(Flash::On));
    let repeating = rig.driver.repeating_request().unwrap();
    assert_eq!(repeating.ae_mode, Some(AeMode::On));
    assert_eq!(repeating.flash_mode, Some(FlashMode::Off));

    rig.camera.take_picture();
    let still = stills(&rig.driver).pop().unwrap();
    assert_eq!(still.ae_mode, Some(AeMode::OnAlwaysFlash));
    rig.driver.complete_captures(CaptureResult::default());

    assert!(rig.camera.set_flash(Flash::RedEye));
    assert_eq!(
        rig.driver.repeating_request().unwrap().ae_mode,
        Some(AeMode::OnAutoFlashRedeye)
    );
    assert!(!rig.camera.set_flash(Flash::RedEye));
}

#[test]
fn jpeg_orientation_follows_display_and_facing() {
    let driver = MockDriver::new()
        .with_camera(MockCameraSpec::new("0", LensFacing::Back))
        .with_camera(MockCameraSpec::new("1", LensFacing::Front).with_sensor_orientation(90));
    let rig = rig_with(driver, MockPreview::new(1080, 1920));
    rig.camera.set_auto_focus(false);
    rig.camera.set_display_orientation(270);
    assert_eq!(rig.preview.display_orientation(), 270);

    rig.camera.start().unwrap();
    rig.driver.dispatch();
    rig.camera.take_picture();
    assert_eq!(stills(&rig.driver).pop().unwrap().jpeg_orientation, Some(180));
    rig.driver.complete_captures(CaptureResult::default());

    assert!(rig.camera.set_facing(Facing::Front));
    rig.driver.dispatch();
    rig.camera.take_picture();
    assert_eq!(stills(&rig.driver).pop().unwrap().jpeg_orientation, Some(0));
}

#[test]
fn facing_change_restarts_camera() {
    let rig = open_rig();
    rig.driver.clear_calls();

    assert!(rig.camera.set_facing(Facing::Front));
    assert_eq!(
        rig.driver.calls(),
        vec![
            DriverCall::CloseSession(1),
            DriverCall::CloseDevice("0".to_owned()),
            DriverCall::CloseImageReader(FIRST_READER),
            DriverCall::NewImageReader {
                size: Size::new(4000, 3000),
                format: ImageFormat::Jpeg,
                max_images: 2,
            },
            DriverCall::OpenCamera("1".to_owned()),
        ]
    );

    rig.driver.dispatch();
    assert!(rig.camera.is_camera_opened());
    assert_eq!(rig.camera.camera_id().as_deref(), Some("1"));
    assert_eq!(rig.camera.facing(), Facing::Front);
    assert_eq!(rig.recorder.closed(), 1);
    assert_eq!(rig.recorder.opened(), 2);
    assert!(rig.driver.calls().contains(&DriverCall::CreateSession {
        camera_id: "1".to_owned(),
        outputs: vec![PREVIEW_SURFACE, Surface::new(102)],
    }));
    assert!(rig.driver.repeating_request().is_some());

    assert!(!rig.camera.set_facing(Facing::Front));
}

#[test]
fn facing_falls_back_to_first_camera() {
    let rig = rig_with(
        MockDriver::new().with_camera(MockCameraSpec::new("0", LensFacing::Back)),
        MockPreview::new(1080, 1920),
    );
    rig.camera.set_facing(Facing::Front);
    assert!(rig.camera.start().unwrap());
    assert_eq!(rig.camera.facing(), Facing::Back);
}

#[test]
fn legacy_only_device_is_not_started() {
    let driver = MockDriver::new().with_camera(
        MockCameraSpec::new("0", LensFacing::Back).with_hardware_level(Some(HardwareLevel::Legacy)),
    );
    let rig = rig_with(driver, MockPreview::new(1080, 1920));
    assert!(!rig.camera.start().unwrap());
    assert!(rig.driver.calls().is_empty());
}

#[test]
fn aspect_ratio_rejections_leave_state_alone() {
    let rig = open_rig();
    rig.driver.clear_calls();

    assert!(!rig.camera.set_aspect_ratio(ratio(4, 3)));
    assert!(!rig.camera.set_aspect_ratio(ratio(1, 1)));
    assert!(!rig.camera.set_aspect_ratio(ratio(11, 9)));
    assert_eq!(rig.camera.aspect_ratio(), ratio(4, 3));
    assert!(rig.driver.calls().is_empty());
}

#[test]
fn aspect_ratio_change_rebuilds_streams() {
    let rig = open_rig();
    rig.driver.clear_calls();

    assert!(rig.camera.set_aspect_ratio(ratio(16, 9)));
    let calls = rig.driver.calls();
    assert_eq!(calls[0], DriverCall::CloseImageReader(FIRST_READER));
    assert_eq!(
        calls[1],
        DriverCall::NewImageReader {
            size: Size::new(3840, 2160),
            format: ImageFormat::Jpeg,
            max_images: 2,
        }
    );
    assert_eq!(calls[2], DriverCall::CloseSession(1));

    rig.driver.dispatch();
    assert_eq!(rig.preview.buffer_size(), Some((1920, 1080)));
    assert_eq!(rig.camera.aspect_ratio(), ratio(16, 9));
    assert!(rig.driver.repeating_request().is_some());
    assert_eq!(rig.camera.stats().sessions_configured, 2);
}

#[test]
fn aspect_ratio_reverts_when_session_fails() {
    let rig = open_rig();
    rig.driver.set_failing(MockOp::CreateSession, true);

    assert!(!rig.camera.set_aspect_ratio(ratio(16, 9)));
    assert_eq!(rig.camera.aspect_ratio(), ratio(4, 3));
    let last_buffer = rig.driver.calls().into_iter().rev().find_map(|call| match call {
        DriverCall::NewImageReader { size, .. } => Some(size),
        _ => None,
    });
    assert_eq!(last_buffer, Some(Size::new(4000, 3000)));

    // The surface callback brings the session back once the driver recovers.
    rig.driver.set_failing(MockOp::CreateSession, false);
    rig.preview.resize(1080, 1920);
    rig.driver.dispatch();
    assert!(rig.driver.repeating_request().is_some());
}

#[test]
fn setters_revert_on_driver_failure() {
    let rig = open_rig();
    rig.driver.set_failing(MockOp::SetRepeating, true);

    assert!(!rig.camera.set_flash(Flash::Torch));
    assert_eq!(rig.camera.flash(), Flash::Off);

    assert!(!rig.camera.set_auto_focus(false));
    assert!(rig.camera.auto_focus());

    rig.driver.set_failing(MockOp::SetRepeating, false);
    assert!(rig.camera.set_flash(Flash::Torch));
    assert_eq!(
        rig.driver.repeating_request().unwrap().flash_mode,
        Some(FlashMode::Torch)
    );
}

#[test]
fn facing_reverts_when_open_fails() {
    let rig = open_rig();
    rig.driver.set_failing(MockOp::OpenCamera, true);

    assert!(!rig.camera.set_facing(Facing::Front));
    assert_eq!(rig.camera.facing(), Facing::Back);

    rig.driver.set_failing(MockOp::OpenCamera, false);
    assert!(rig.camera.start().unwrap());
    rig.driver.dispatch();
    assert_eq!(rig.camera.camera_id().as_deref(), Some("0"));
    assert!(rig.camera.is_camera_opened());
}

#[test]
fn settings_changed_mid_capture_apply_on_unlock() {
    let rig = open_rig();
    assert!(rig.camera.take_picture());

    let repeating_before = rig.driver.calls().len();
    assert!(rig.camera.set_flash(Flash::Torch));
    assert_eq!(rig.driver.calls().len(), repeating_before);

    rig.driver.emit_frame(frame(AfState::FocusedLocked, AeState::Converged));
    assert_eq!(stills(&rig.driver)[0].flash_mode, Some(FlashMode::Torch));
    rig.driver.complete_captures(CaptureResult::default());

    let resumed = last_repeating(&rig.driver).unwrap();
    assert_eq!(resumed.flash_mode, Some(FlashMode::Torch));
}

#[test]
fn still_failure_returns_to_preview() {
    let rig = open_rig();
    rig.camera.set_auto_focus(false);

    assert!(rig.camera.take_picture());
    assert_eq!(rig.driver.fail_captures(), 1);
    assert_eq!(rig.camera.capture_state(), CaptureState::Preview);
    assert!(rig.driver.repeating_request().is_some());
    assert!(rig.recorder.pictures().is_empty());
    assert_eq!(rig.camera.stats().still_capture_failures, 1);
}

#[test]
fn capture_submission_failure_unlocks() {
    let rig = open_rig();
    rig.camera.set_auto_focus(false);
    rig.driver.set_failing(MockOp::Capture, true);

    assert!(!rig.camera.take_picture());
    assert_eq!(rig.camera.capture_state(), CaptureState::Preview);
    assert!(rig.driver.repeating_request().is_some());
    assert_eq!(rig.camera.stats().still_capture_failures, 1);
}

#[test]
fn disconnect_detaches_until_restart() {
    let rig = open_rig();

    rig.driver.disconnect();
    assert!(!rig.camera.is_camera_opened());
    assert!(!rig.camera.take_picture());
    assert_eq!(rig.camera.stats().device_errors, 1);

    rig.driver.dispatch();
    assert_eq!(rig.recorder.closed(), 1);

    assert!(rig.camera.start().unwrap());
    rig.driver.dispatch();
    assert!(rig.camera.is_camera_opened());
    assert_eq!(rig.recorder.opened(), 2);

    rig.driver.raise_device_error(3);
    assert!(!rig.camera.is_camera_opened());
    assert_eq!(rig.camera.stats().device_errors, 2);
}

#[test]
fn stop_is_ordered_and_idempotent() {
    let rig = open_rig();
    rig.driver.clear_calls();

    rig.camera.stop();
    assert_eq!(
        rig.driver.calls(),
        vec![
            DriverCall::CloseSession(1),
            DriverCall::CloseDevice("0".to_owned()),
            DriverCall::CloseImageReader(FIRST_READER),
        ]
    );
    assert!(!rig.camera.is_camera_opened());

    rig.camera.stop();
    assert_eq!(rig.driver.calls().len(), 3);

    rig.driver.dispatch();
    assert_eq!(rig.recorder.closed(), 1);
}

#[test]
fn stop_before_open_discards_the_device() {
    let rig = rig_with(MockDriver::with_default_cameras(), MockPreview::new(1080, 1920));
    rig.camera.start().unwrap();
    rig.camera.stop();
    rig.driver.dispatch();

    assert!(!rig.camera.is_camera_opened());
    assert!(rig.driver.calls().contains(&DriverCall::CloseDevice("0".to_owned())));
    assert_eq!(rig.recorder.opened(), 0);
    assert_eq!(rig.recorder.closed(), 0);
}

#[test]
fn session_waits_for_the_surface() {
    let rig = rig_with(MockDriver::with_default_cameras(), MockPreview::pending());
    rig.camera.start().unwrap();
    rig.driver.dispatch();

    assert!(rig.camera.is_camera_opened());
    assert!(!rig
        .driver
        .calls()
        .iter()
        .any(|call| matches!(call, DriverCall::CreateSession { .. })));
    assert!(!rig.camera.take_picture());

    rig.preview.resize(720, 1280);
    rig.driver.dispatch();
    assert_eq!(rig.preview.buffer_size(), Some((1440, 1080)));
    assert!(rig.driver.repeating_request().is_some());
}

#[test]
fn surface_change_restarts_the_session() {
    let rig = open_rig();
    rig.driver.clear_calls();

    rig.preview.resize(480, 640);
    assert_eq!(rig.driver.calls()[0], DriverCall::CloseSession(1));
    rig.driver.dispatch();
    assert_eq!(rig.preview.buffer_size(), Some((640, 480)));
    assert_eq!(rig.camera.stats().sessions_configured, 2);
}

#[test]
fn unsupported_autofocus_reads_false() {
    let driver = MockDriver::new()
        .with_camera(MockCameraSpec::new("0", LensFacing::Back).with_af_modes(vec![AfMode::Off]));
    let rig = rig_with(driver, MockPreview::new(1080, 1920));
    rig.camera.start().unwrap();
    rig.driver.dispatch();

    assert!(!rig.camera.auto_focus());
    assert_eq!(
        rig.driver.repeating_request().unwrap().af_mode,
        Some(AfMode::Off)
    );
    assert!(rig.camera.take_picture());
    assert_eq!(rig.camera.capture_state(), CaptureState::Capturing);
}

#[test]
fn config_applies_before_start() {
    let driver = MockDriver::with_default_cameras();
    let config = CameraConfig {
        facing: Facing::Front,
        aspect_ratio: ratio(16, 9),
        flash: Flash::Auto,
        ..Default::default()
    };
    let camera =
        Camera::with_config(Box::new(driver.clone()), Box::new(MockPreview::new(1080, 1920)), &config)
            .unwrap();
    camera.start().unwrap();
    driver.dispatch();

    assert_eq!(camera.camera_id().as_deref(), Some("1"));
    assert_eq!(camera.aspect_ratio(), ratio(16, 9));
    assert_eq!(
        driver.repeating_request().unwrap().ae_mode,
        Some(AeMode::OnAutoFlash)
    );
}

#[test]
fn removed_callbacks_are_not_notified() {
    let rig = open_rig();
    let extra = Arc::new(Recorder::default());
    let extra_dyn: Arc<dyn CameraCallback> = extra.clone();
    rig.camera.add_callback(Arc::clone(&extra_dyn));
    rig.camera.set_auto_focus(false);

    rig.camera.take_picture();
    rig.driver.complete_captures(CaptureResult::default());
    assert_eq!(extra.pictures().len(), 1);

    assert!(rig.camera.remove_callback(&extra_dyn));
    rig.camera.take_picture();
    rig.driver.complete_captures(CaptureResult::default());
    assert_eq!(extra.pictures().len(), 1);
    assert_eq!(rig.recorder.pictures().len(), 2);
}

#[derive(Default)]
struct Reentrant {
    camera: OnceLock<Weak<Camera>>,
    seen: Mutex<Vec<CaptureState>>,
}

impl CameraCallback for Reentrant {
    fn on_picture_taken(&self, _data: &[u8]) {
        if let Some(camera) = self.camera.get().and_then(Weak::upgrade) {
            self.seen.lock().unwrap().push(camera.capture_state());
        }
    }
}

#[test]
fn callbacks_may_call_back_into_the_camera() {
    let driver = MockDriver::with_default_cameras();
    let camera = Arc::new(Camera::new(
        Box::new(driver.clone()),
        Box::new(MockPreview::new(1080, 1920)),
    ));
    let reentrant = Arc::new(Reentrant::default());
    reentrant.camera.set(Arc::downgrade(&camera)).unwrap();
    camera.add_callback(reentrant.clone());

    camera.start().unwrap();
    driver.dispatch();
    camera.take_picture();
    driver.emit_frame(frame(AfState::FocusedLocked, AeState::Converged));
    driver.complete_captures(CaptureResult::default());

    assert_eq!(*reentrant.seen.lock().unwrap(), vec![CaptureState::Preview]);
}

#[test]
fn metrics_snapshot_tracks_the_camera() {
    let rig = open_rig();
    rig.camera.set_auto_focus(false);
    rig.camera.take_picture();

    let busy = rig.camera.metrics_snapshot();
    assert!(busy.camera_open);
    assert_eq!(busy.capture_state, CaptureState::Capturing);

    rig.driver.complete_captures(CaptureResult::default());
    let done = rig.camera.metrics_snapshot();
    assert_eq!(done.pictures_taken, 1);
    assert_eq!(done.sessions_configured, 1);
    assert_eq!(done.capture_state, CaptureState::Preview);
}

#[test]
fn extreme_display_orientation_still_completes() {
    let rig = open_rig();
    rig.camera.set_auto_focus(false);

    for degrees in [i32::MIN, i32::MAX, -90] {
        rig.camera.set_display_orientation(degrees);
        assert!(rig.camera.take_picture());
        let orientation = stills(&rig.driver).pop().unwrap().jpeg_orientation.unwrap();
        assert!((0..360).contains(&orientation));

        rig.driver.complete_captures(CaptureResult::default());
        assert_eq!(rig.camera.capture_state(), CaptureState::Preview);
    }
    assert_eq!(stills(&rig.driver).last().unwrap().jpeg_orientation, Some(180));
    assert_eq!(rig.recorder.pictures().len(), 3);
}

#[test]
fn aspect_ratio_change_waits_for_the_still() {
    let rig = open_rig();
    assert!(rig.camera.take_picture());
    rig.driver.clear_calls();

    assert!(rig.camera.set_aspect_ratio(ratio(16, 9)));
    assert_eq!(rig.camera.aspect_ratio(), ratio(16, 9));
    assert!(rig.driver.calls().is_empty());

    rig.driver.emit_frame(frame(AfState::FocusedLocked, AeState::Converged));
    assert_eq!(stills(&rig.driver)[0].targets, vec![FIRST_READER]);
    rig.driver.complete_captures(CaptureResult::default());

    let pictures = rig.recorder.pictures();
    assert_eq!(pictures.len(), 1);
    assert_eq!(&pictures[0][2..6], &4000u32.to_be_bytes());
    assert_eq!(rig.camera.stats().still_capture_failures, 0);

    let calls = rig.driver.calls();
    assert!(calls.contains(&DriverCall::NewImageReader {
        size: Size::new(3840, 2160),
        format: ImageFormat::Jpeg,
        max_images: 2,
    }));
    assert!(calls.contains(&DriverCall::CloseImageReader(FIRST_READER)));
    assert!(calls.contains(&DriverCall::CloseSession(1)));

    rig.driver.dispatch();
    assert_eq!(rig.camera.capture_state(), CaptureState::Preview);
    assert_eq!(rig.preview.buffer_size(), Some((1920, 1080)));
    assert!(rig.driver.repeating_request().is_some());
    assert!(rig.camera.take_picture());
}

#[test]
fn surface_change_waits_for_the_still() {
    let rig = open_rig();
    rig.camera.set_auto_focus(false);
    assert!(rig.camera.take_picture());
    rig.driver.clear_calls();

    rig.preview.resize(480, 640);
    assert!(rig.driver.calls().is_empty());
    assert_eq!(rig.camera.capture_state(), CaptureState::Capturing);

    rig.driver.complete_captures(CaptureResult::default());
    assert_eq!(rig.recorder.pictures().len(), 1);
    assert!(rig.driver.calls().contains(&DriverCall::CloseSession(1)));

    rig.driver.dispatch();
    assert_eq!(rig.preview.buffer_size(), Some((640, 480)));
    assert_eq!(rig.camera.stats().sessions_configured, 2);
    assert!(rig.driver.repeating_request().is_some());
}

#[test]
fn focus_lock_failure_keeps_preview_running() {
    let rig = open_rig();
    rig.driver.set_failing(MockOp::Capture, true);

    assert!(!rig.camera.take_picture());
    assert_eq!(rig.camera.capture_state(), CaptureState::Preview);
    assert!(!rig.driver.calls().contains(&DriverCall::StopRepeating(1)));
    assert_eq!(
        rig.driver.repeating_request().unwrap().targets,
        vec![PREVIEW_SURFACE]
    );

    rig.driver.set_failing(MockOp::Capture, false);
    assert!(rig.camera.take_picture());
    assert_eq!(rig.camera.capture_state(), CaptureState::Locking);
}

#[test]
fn precapture_failure_unlocks_focus() {
    let rig = open_rig();
    assert!(rig.camera.take_picture());
    rig.driver.set_failing(MockOp::Capture, true);

    rig.driver.emit_frame(frame(AfState::FocusedLocked, AeState::Searching));
    assert_eq!(rig.camera.capture_state(), CaptureState::Preview);
    assert!(stills(&rig.driver).is_empty());

    let resumed = rig.driver.repeating_request().unwrap();
    assert_eq!(resumed.af_trigger, Some(AfTrigger::Idle));
    assert_eq!(resumed.ae_precapture_trigger, Some(AePrecaptureTrigger::Idle));
    assert_eq!(
        last_repeating(&rig.driver).unwrap().af_mode,
        Some(AfMode::ContinuousPicture)
    );

    rig.driver.set_failing(MockOp::Capture, false);
    assert!(rig.camera.take_picture());
}

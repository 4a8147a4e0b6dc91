//! Typed camera metadata: device characteristics, capture requests and
//! per-frame capture results.

use crate::geometry::Size;
use std::collections::HashMap;

/// Opaque handle to a stream target owned by the driver or preview provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Surface(u64);

impl Surface {
    /// Wraps a driver-assigned surface id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the driver-assigned id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Device capability classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareLevel {
    /// Backward-compatibility mode with limited per-frame control.
    Legacy,
    /// Subset of full capabilities.
    Limited,
    /// Full per-frame control.
    Full,
    /// Full plus vendor extras.
    Level3,
    /// Externally attached camera.
    External,
}

/// Which way the lens points relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LensFacing {
    /// Same side as the screen.
    Front,
    /// Opposite side from the screen.
    Back,
    /// Attached camera with no fixed facing.
    External,
}

/// Pixel format of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Compressed 8-bit JPEG.
    Jpeg,
    /// Planar YUV 4:2:0.
    Yuv420,
    /// Opaque driver-private format.
    Private,
}

/// Class of consumer a preview provider renders into.
///
/// Drivers advertise preview sizes per output class rather than per format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputClass {
    /// A surface owned by a surface view.
    SurfaceHolder,
    /// A GPU texture.
    SurfaceTexture,
}

/// Output sizes a device supports, per format and per output class.
#[derive(Debug, Clone, Default)]
pub struct StreamConfigurationMap {
    format_sizes: HashMap<ImageFormat, Vec<Size>>,
    class_sizes: HashMap<OutputClass, Vec<Size>>,
}

impl StreamConfigurationMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds output sizes for an image format.
    pub fn with_format_sizes(mut self, format: ImageFormat, sizes: &[Size]) -> Self {
        self.format_sizes
            .entry(format)
            .or_default()
            .extend_from_slice(sizes);
        self
    }

    /// Adds output sizes for an output class.
    pub fn with_class_sizes(mut self, class: OutputClass, sizes: &[Size]) -> Self {
        self.class_sizes
            .entry(class)
            .or_default()
            .extend_from_slice(sizes);
        self
    }

    /// Sizes available for `format`.
    pub fn output_sizes_for_format(&self, format: ImageFormat) -> &[Size] {
        self.format_sizes.get(&format).map_or(&[], Vec::as_slice)
    }

    /// Sizes available for `class`.
    pub fn output_sizes_for_class(&self, class: OutputClass) -> &[Size] {
        self.class_sizes.get(&class).map_or(&[], Vec::as_slice)
    }
}

/// Static description of a camera device.
///
/// Fields a driver may leave unset are optional; the core decides how to
/// treat each absence.
#[derive(Debug, Clone, Default)]
pub struct CameraCharacteristics {
    /// Supported hardware level.
    pub hardware_level: Option<HardwareLevel>,
    /// Lens facing.
    pub lens_facing: Option<LensFacing>,
    /// Output stream configurations.
    pub stream_configuration_map: Option<StreamConfigurationMap>,
    /// Clockwise rotation of the sensor relative to the device's natural
    /// orientation, in degrees.
    pub sensor_orientation: i32,
    /// Auto-focus modes the device advertises.
    pub af_available_modes: Vec<AfMode>,
}

/// Template a capture request is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestTemplate {
    /// Continuous preview frames.
    Preview,
    /// A single high-quality still.
    StillCapture,
}

/// `CONTROL_AF_MODE` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AfMode {
    /// Focus is fixed or manual.
    Off,
    /// Single sweep on trigger.
    Auto,
    /// Close-up single sweep on trigger.
    Macro,
    /// Continuous focus tuned for video.
    ContinuousVideo,
    /// Continuous focus tuned for stills.
    ContinuousPicture,
    /// Extended depth of field.
    Edof,
}

/// `CONTROL_AF_TRIGGER` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AfTrigger {
    /// No trigger.
    Idle,
    /// Start a focus lock.
    Start,
    /// Cancel any lock and return to scanning.
    Cancel,
}

/// `CONTROL_AF_STATE` values reported per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AfState {
    /// Not scanning.
    Inactive,
    /// Continuous mode scanning.
    PassiveScan,
    /// Continuous mode in focus.
    PassiveFocused,
    /// Triggered scan running.
    ActiveScan,
    /// Locked and in focus.
    FocusedLocked,
    /// Locked but not in focus.
    NotFocusedLocked,
    /// Continuous mode not in focus.
    PassiveUnfocused,
}

impl AfState {
    /// True when the AF routine has finished a locked scan.
    pub fn is_locked(self) -> bool {
        matches!(self, Self::FocusedLocked | Self::NotFocusedLocked)
    }
}

/// `CONTROL_AE_MODE` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AeMode {
    /// Manual exposure.
    Off,
    /// Auto exposure, flash controlled by `FLASH_MODE`.
    On,
    /// Auto exposure, flash fired when needed.
    OnAutoFlash,
    /// Auto exposure, flash fired for every still.
    OnAlwaysFlash,
    /// Auto flash with red-eye reduction.
    OnAutoFlashRedeye,
}

/// `CONTROL_AE_PRECAPTURE_TRIGGER` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AePrecaptureTrigger {
    /// No trigger.
    Idle,
    /// Start the precapture metering sequence.
    Start,
}

/// `CONTROL_AE_STATE` values reported per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AeState {
    /// Not running.
    Inactive,
    /// Adjusting exposure.
    Searching,
    /// Exposure settled.
    Converged,
    /// Exposure locked.
    Locked,
    /// Settled, but the still will need flash.
    FlashRequired,
    /// Precapture sequence running.
    Precapture,
}

/// `FLASH_MODE` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlashMode {
    /// Flash unit off.
    Off,
    /// Fire once for this capture.
    Single,
    /// Continuously lit.
    Torch,
}

/// A capture request: a template plus the control values the core sets.
///
/// Unset controls are left to the template's defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// The template this request was built from.
    pub template: RequestTemplate,
    /// Output surfaces the frame is delivered to.
    pub targets: Vec<Surface>,
    /// Auto-focus mode.
    pub af_mode: Option<AfMode>,
    /// Auto-focus trigger.
    pub af_trigger: Option<AfTrigger>,
    /// Auto-exposure mode.
    pub ae_mode: Option<AeMode>,
    /// Precapture metering trigger.
    pub ae_precapture_trigger: Option<AePrecaptureTrigger>,
    /// Flash unit mode.
    pub flash_mode: Option<FlashMode>,
    /// Clockwise rotation applied to the encoded JPEG, in degrees.
    pub jpeg_orientation: Option<i32>,
}

impl CaptureRequest {
    /// Creates an empty request for `template`.
    pub fn new(template: RequestTemplate) -> Self {
        Self {
            template,
            targets: Vec::new(),
            af_mode: None,
            af_trigger: None,
            ae_mode: None,
            ae_precapture_trigger: None,
            flash_mode: None,
            jpeg_orientation: None,
        }
    }

    /// Adds an output target, ignoring duplicates.
    pub fn add_target(&mut self, surface: Surface) {
        if !self.targets.contains(&surface) {
            self.targets.push(surface);
        }
    }
}

/// Per-frame metadata delivered by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureResult {
    /// Auto-focus state, if the driver reported it.
    pub af_state: Option<AfState>,
    /// Auto-exposure state, if the driver reported it.
    pub ae_state: Option<AeState>,
}

impl CaptureResult {
    /// Creates a result carrying both states.
    pub fn new(af_state: Option<AfState>, ae_state: Option<AeState>) -> Self {
        Self { af_state, ae_state }
    }
}

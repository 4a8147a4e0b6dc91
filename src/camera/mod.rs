//! Camera control: device selection, stream setup and still capture.
//!
//! [`Camera`] is the entry point. Starting it resolves the requested facing
//! to a device, probes the device's preview and still sizes, allocates the
//! still buffer and opens the device. Once the driver reports the device
//! open, a capture session over the preview surface and the still buffer is
//! configured and the preview starts repeating.
//!
//! A still capture runs through [`PictureCaptureMachine`]: focus is locked
//! first (when auto focus is on), exposure is metered if it has not
//! converged, the still is fired, and focus is unlocked again before the
//! preview resumes.

mod callback;
mod capture;
mod engine;
mod events;
mod facade;
mod probe;
mod request;
mod selector;
mod settings;
mod stats;
mod stream;

pub use callback::{CallbackBridge, CameraCallback, Notification};
pub use capture::{CaptureAction, CaptureState, PictureCaptureMachine};
pub use facade::Camera;
pub use probe::{collect_camera_info, MAX_PREVIEW_HEIGHT, MAX_PREVIEW_WIDTH};
pub use request::{
    apply_auto_focus, apply_preview_flash, apply_still_flash, jpeg_orientation,
    supports_auto_focus,
};
pub use selector::{choose_camera_by_facing, Selection};
pub use settings::{Facing, Flash};
pub use stats::CameraStats;
pub use stream::{choose_optimal_size, largest_picture_size, STILL_BUFFER_DEPTH};

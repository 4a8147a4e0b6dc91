//! Platform camera driver contracts.
//!
//! The core never talks to a camera stack directly. It drives these traits,
//! and the driver reports progress back through the callback traits. Every
//! platform call is asynchronous: the call only queues work, and its outcome
//! arrives later through a callback on the driver's own delivery thread.
//!
//! Drivers must not invoke a callback synchronously from inside the call
//! that registered it; callbacks re-enter the camera core, which is still
//! busy with that call.

mod metadata;
mod mock;

pub use metadata::{
    AeMode, AePrecaptureTrigger, AeState, AfMode, AfState, AfTrigger, CameraCharacteristics,
    CaptureRequest, CaptureResult, FlashMode, HardwareLevel, ImageFormat, LensFacing,
    OutputClass, RequestTemplate, StreamConfigurationMap, Surface,
};
pub use mock::{DriverCall, MockCameraSpec, MockDriver, MockOp, MockPreview};

use crate::error::DriverError;
use crate::geometry::Size;
use std::sync::Arc;

/// Entry point into a platform camera stack.
pub trait CameraDriver: Send {
    /// Lists the ids of every camera the platform exposes.
    fn camera_id_list(&self) -> Result<Vec<String>, DriverError>;

    /// Reads the static characteristics of one camera.
    fn camera_characteristics(&self, camera_id: &str) -> Result<CameraCharacteristics, DriverError>;

    /// Starts opening a camera. `callback` receives the outcome.
    fn open_camera(
        &mut self,
        camera_id: &str,
        callback: Arc<dyn DeviceStateCallback>,
    ) -> Result<(), DriverError>;

    /// Allocates a still buffer holding at most `max_images` frames.
    fn new_image_reader(
        &mut self,
        size: Size,
        format: ImageFormat,
        max_images: usize,
    ) -> Result<Box<dyn ImageReader>, DriverError>;
}

/// Device lifecycle notifications.
pub trait DeviceStateCallback: Send + Sync {
    /// The device finished opening.
    fn on_opened(&self, device: Box<dyn CameraDevice>);
    /// The device was closed.
    fn on_closed(&self, camera_id: &str);
    /// The device was disconnected and is no longer usable.
    fn on_disconnected(&self, camera_id: &str);
    /// The device hit a fatal error.
    fn on_error(&self, camera_id: &str, error: i32);
}

/// An open camera device.
pub trait CameraDevice: Send {
    /// The device's id.
    fn id(&self) -> &str;

    /// Builds a request pre-populated from `template`.
    fn create_capture_request(&self, template: RequestTemplate) -> Result<CaptureRequest, DriverError>;

    /// Starts configuring a session over a fixed list of outputs.
    fn create_capture_session(
        &mut self,
        outputs: &[Surface],
        callback: Arc<dyn SessionStateCallback>,
    ) -> Result<(), DriverError>;

    /// Closes the device. Any session on it is closed as well.
    fn close(&mut self);
}

/// Session configuration notifications.
pub trait SessionStateCallback: Send + Sync {
    /// The session is ready to accept requests.
    fn on_configured(&self, session: Box<dyn CaptureSession>);
    /// The requested output configuration could not be set up.
    fn on_configure_failed(&self);
    /// The session identified by `session_id` was closed.
    fn on_closed(&self, session_id: u64);
}

/// A configured capture session.
pub trait CaptureSession: Send {
    /// Driver-assigned session id.
    fn id(&self) -> u64;

    /// Replaces the repeating request.
    fn set_repeating_request(
        &mut self,
        request: &CaptureRequest,
        callback: Arc<dyn CaptureCallback>,
    ) -> Result<(), DriverError>;

    /// Submits a one-shot request.
    fn capture(
        &mut self,
        request: &CaptureRequest,
        callback: Arc<dyn CaptureCallback>,
    ) -> Result<(), DriverError>;

    /// Stops the repeating request.
    fn stop_repeating(&mut self) -> Result<(), DriverError>;

    /// Closes the session.
    fn close(&mut self);
}

/// Per-request progress notifications.
pub trait CaptureCallback: Send + Sync {
    /// Partial metadata for an in-flight frame.
    fn on_capture_progressed(&self, _partial: &CaptureResult) {}
    /// Final metadata for a frame.
    fn on_capture_completed(&self, result: &CaptureResult);
    /// The frame was lost.
    fn on_capture_failed(&self) {}
}

/// A driver-side queue of captured still images.
pub trait ImageReader: Send {
    /// Size of the images this reader holds.
    fn size(&self) -> Size;
    /// Format of the images this reader holds.
    fn format(&self) -> ImageFormat;
    /// The input surface a capture request targets to fill this reader.
    fn surface(&self) -> Surface;
    /// Registers the listener told about newly queued images.
    fn set_on_image_available(&mut self, listener: Arc<dyn ImageAvailableListener>);
    /// Dequeues the oldest image, if any.
    fn acquire_next_image(&mut self) -> Result<Option<Box<dyn Image>>, DriverError>;
    /// Releases the reader and every image it still holds.
    fn close(&mut self);
}

/// Told when an [`ImageReader`] has an image ready.
pub trait ImageAvailableListener: Send + Sync {
    /// An image can be acquired.
    fn on_image_available(&self);
}

/// An acquired image. Dropping it returns the buffer to the driver.
pub trait Image: Send {
    /// Remaining bytes of each plane, in plane order.
    fn planes(&self) -> Vec<&[u8]>;
}

/// The render target preview frames are streamed into.
pub trait PreviewSurface: Send {
    /// True once the surface can accept frames.
    fn is_ready(&self) -> bool;
    /// Current surface width in pixels.
    fn width(&self) -> u32;
    /// Current surface height in pixels.
    fn height(&self) -> u32;
    /// The surface to target, once ready.
    fn surface(&self) -> Option<Surface>;
    /// Sets the size of the buffers the camera renders into.
    fn set_buffer_size(&mut self, width: u32, height: u32);
    /// Sets the display rotation in degrees.
    fn set_display_orientation(&mut self, degrees: i32);
    /// Registers the listener told when the surface is (re)created or resized.
    fn set_callback(&mut self, callback: Arc<dyn SurfaceChangedCallback>);
    /// The output class used to query supported preview sizes.
    fn output_class(&self) -> OutputClass;
}

/// Told when the preview surface changes.
pub trait SurfaceChangedCallback: Send + Sync {
    /// The surface was created or resized.
    fn on_surface_changed(&self);
}

//! CameraView Library
//!
//! Still-capture coordination over an asynchronous platform camera
//! pipeline. A [`Camera`] keeps a preview stream running and, on request,
//! drives it through focus lock, precapture metering and a JPEG still
//! before resuming the preview.
//!
//! # Architecture
//!
//! ```text
//! Camera (facade) → selector → probe → stream setup → capture machine
//!                                                          ⇅
//!                                               driver callbacks
//! ```
//!
//! The platform stack sits behind the [`driver`] traits. Every driver call
//! is asynchronous and reports back through callbacks, which the camera
//! serializes with host calls under a single lock.
//!
//! # Example
//!
//! ```
//! use cameraview::{Camera, CameraCallback, MockDriver, MockPreview};
//! use cameraview::driver::{AeState, AfState, CaptureResult};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Sink(Mutex<Vec<Vec<u8>>>);
//!
//! impl CameraCallback for Sink {
//!     fn on_picture_taken(&self, data: &[u8]) {
//!         self.0.lock().unwrap().push(data.to_vec());
//!     }
//! }
//!
//! let driver = MockDriver::with_default_cameras();
//! let camera = Camera::new(Box::new(driver.clone()), Box::new(MockPreview::new(1080, 1920)));
//! let sink = Arc::new(Sink::default());
//! camera.add_callback(sink.clone());
//!
//! camera.start().unwrap();
//! driver.dispatch(); // device opened, session configured
//!
//! assert!(camera.take_picture());
//! driver.emit_frame(CaptureResult::new(Some(AfState::FocusedLocked), Some(AeState::Converged)));
//! driver.complete_captures(CaptureResult::default());
//!
//! assert_eq!(sink.0.lock().unwrap().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod camera;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod metrics;

// Re-export commonly used types at crate root
pub use camera::{Camera, CameraCallback, CameraStats, CaptureState, Facing, Flash};
pub use config::{CameraConfig, ConfigError, FileConfig};
pub use driver::{MockDriver, MockPreview};
pub use error::{CameraError, DriverError};
pub use geometry::{AspectRatio, Size, SizeMap};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

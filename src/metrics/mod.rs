//! Prometheus metrics exporter for camera monitoring.
//!
//! # Metrics Exposed
//!
//! ## State Metrics
//! - `cameraview_camera_open` - Whether a device is open (1=open, 0=closed)
//! - `cameraview_capture_state` - Still-capture state code (0=preview .. 5=capturing)
//!
//! ## Capture Metrics
//! - `cameraview_pictures_taken_total` - Stills delivered to the host
//! - `cameraview_picture_bytes_total` - Encoded bytes delivered to the host
//! - `cameraview_still_capture_failures_total` - Still captures that failed
//!
//! ## Device Metrics
//! - `cameraview_sessions_configured_total` - Capture sessions configured
//! - `cameraview_device_errors_total` - Disconnections and fatal device errors
//!
//! With the `metrics` feature, [`MetricsServer`] serves the registry over
//! HTTP at `/metrics`, next to `/health` and `/state` probes.
//!
//! # Example
//!
//! ```
//! use cameraview::camera::{CameraStats, CaptureState};
//! use cameraview::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let stats = CameraStats { pictures_taken: 3, ..Default::default() };
//! registry.update(&MetricsSnapshot::from_stats(&stats, true, CaptureState::Preview));
//!
//! assert!(registry.encode().unwrap().contains("cameraview_pictures_taken_total 3"));
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};

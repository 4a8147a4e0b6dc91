//! Metrics collection and registry.

use crate::camera::{CameraStats, CaptureState};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registering or encoding a metric failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of camera state for metrics update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Whether a device is open.
    pub camera_open: bool,
    /// Current still-capture state.
    pub capture_state: CaptureState,
    /// Stills delivered to the host.
    pub pictures_taken: u64,
    /// Encoded bytes delivered to the host.
    pub picture_bytes: u64,
    /// Still captures that failed.
    pub still_capture_failures: u64,
    /// Capture sessions configured.
    pub sessions_configured: u64,
    /// Disconnections and fatal device errors.
    pub device_errors: u64,
}

impl MetricsSnapshot {
    /// Creates a snapshot from the camera's counters and current state.
    pub fn from_stats(stats: &CameraStats, camera_open: bool, capture_state: CaptureState) -> Self {
        Self {
            camera_open,
            capture_state,
            pictures_taken: stats.pictures_taken,
            picture_bytes: stats.picture_bytes,
            still_capture_failures: stats.still_capture_failures,
            sessions_configured: stats.sessions_configured,
            device_errors: stats.device_errors,
        }
    }
}

/// Prometheus metrics registry for camera monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // State metrics
    camera_open: IntGauge,
    capture_state: IntGauge,

    // Capture metrics
    pictures_taken_total: IntCounter,
    picture_bytes_total: IntCounter,
    still_capture_failures_total: IntCounter,

    // Device metrics
    sessions_configured_total: IntCounter,
    device_errors_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all camera metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let camera_open = IntGauge::new(
            "cameraview_camera_open",
            "Whether a camera device is open (1=open, 0=closed)",
        )?;
        let capture_state = IntGauge::new(
            "cameraview_capture_state",
            "Still-capture state (0=preview, 1=locking, 2=locked, 3=precapture, 4=waiting, 5=capturing)",
        )?;

        let pictures_taken_total = IntCounter::new(
            "cameraview_pictures_taken_total",
            "Total stills delivered to the host",
        )?;
        let picture_bytes_total = IntCounter::new(
            "cameraview_picture_bytes_total",
            "Total encoded still bytes delivered to the host",
        )?;
        let still_capture_failures_total = IntCounter::new(
            "cameraview_still_capture_failures_total",
            "Total still captures that failed",
        )?;

        let sessions_configured_total = IntCounter::new(
            "cameraview_sessions_configured_total",
            "Total capture sessions configured",
        )?;
        let device_errors_total = IntCounter::new(
            "cameraview_device_errors_total",
            "Total device disconnections and fatal errors",
        )?;

        registry.register(Box::new(camera_open.clone()))?;
        registry.register(Box::new(capture_state.clone()))?;
        registry.register(Box::new(pictures_taken_total.clone()))?;
        registry.register(Box::new(picture_bytes_total.clone()))?;
        registry.register(Box::new(still_capture_failures_total.clone()))?;
        registry.register(Box::new(sessions_configured_total.clone()))?;
        registry.register(Box::new(device_errors_total.clone()))?;

        Ok(Self {
            registry,
            camera_open,
            capture_state,
            pictures_taken_total,
            picture_bytes_total,
            still_capture_failures_total,
            sessions_configured_total,
            device_errors_total,
        })
    }

    /// Updates all metrics from a snapshot of camera state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.camera_open.set(i64::from(snapshot.camera_open));
        self.capture_state.set(snapshot.capture_state.code());

        // Counters only move forward; add the difference.
        advance(&self.pictures_taken_total, snapshot.pictures_taken);
        advance(&self.picture_bytes_total, snapshot.picture_bytes);
        advance(&self.still_capture_failures_total, snapshot.still_capture_failures);
        advance(&self.sessions_configured_total, snapshot.sessions_configured);
        advance(&self.device_errors_total, snapshot.device_errors);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let stats = CameraStats {
            pictures_taken: 2,
            picture_bytes: 4096,
            sessions_configured: 1,
            ..Default::default()
        };
        registry.update(&MetricsSnapshot::from_stats(&stats, true, CaptureState::Waiting));

        let output = registry.encode().unwrap();
        assert!(output.contains("cameraview_camera_open 1"));
        assert!(output.contains("cameraview_capture_state 4"));
        assert!(output.contains("cameraview_pictures_taken_total 2"));
        assert!(output.contains("cameraview_picture_bytes_total 4096"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();
        let mut snapshot = MetricsSnapshot {
            device_errors: 3,
            ..Default::default()
        };
        registry.update(&snapshot);
        snapshot.device_errors = 1;
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("cameraview_device_errors_total 3"));
    }

    #[test]
    fn test_metrics_encode() {
        let registry = MetricsRegistry::new().unwrap();
        let output = registry.encode().unwrap();

        assert!(output.contains("cameraview_camera_open"));
        assert!(output.contains("cameraview_still_capture_failures_total"));
        assert!(output.contains("cameraview_sessions_configured_total"));
    }
}

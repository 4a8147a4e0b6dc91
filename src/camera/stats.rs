//! Running counters kept by the camera core.

use serde::Serialize;

/// Counters accumulated since the camera was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CameraStats {
    /// Stills delivered to the host.
    pub pictures_taken: u64,
    /// Total encoded bytes delivered to the host.
    pub picture_bytes: u64,
    /// Still captures that failed before an image was produced.
    pub still_capture_failures: u64,
    /// Capture sessions that finished configuring.
    pub sessions_configured: u64,
    /// Disconnections and fatal device errors.
    pub device_errors: u64,
}

impl CameraStats {
    /// Records one delivered still of `bytes` bytes.
    pub fn record_picture(&mut self, bytes: usize) {
        self.pictures_taken += 1;
        self.picture_bytes += bytes as u64;
    }

    /// Average encoded size of delivered stills.
    pub fn average_picture_bytes(&self) -> Option<u64> {
        (self.pictures_taken > 0).then(|| self.picture_bytes / self.pictures_taken)
    }
}

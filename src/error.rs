//! Error types shared across the crate.

use thiserror::Error;

/// Failures reported by a platform camera driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The device is no longer connected.
    #[error("camera device disconnected")]
    Disconnected,
    /// The device is disabled by policy.
    #[error("camera device disabled")]
    Disabled,
    /// Another client holds the device.
    #[error("camera device in use")]
    InUse,
    /// The caller lacks permission to use the device.
    #[error("camera access denied")]
    AccessDenied,
    /// The operation is invalid for the current device or session state.
    #[error("camera device in an invalid state: {0}")]
    InvalidState(String),
    /// Any other driver-specific failure.
    #[error("camera driver error: {0}")]
    Other(String),
}

/// Errors surfaced by the camera core.
#[derive(Debug, Error)]
pub enum CameraError {
    /// A caller-supplied value was malformed or unsupported.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The platform reports no camera at all.
    #[error("no camera device available")]
    NoDeviceAvailable,

    /// The device lacks a capability the core depends on.
    #[error("camera capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// The platform camera API returned an access error.
    #[error("driver error while {context}: {source}")]
    Driver {
        /// What the core was doing when the driver failed.
        context: &'static str,
        /// The underlying driver failure.
        #[source]
        source: DriverError,
    },

    /// Metadata documented as always present was missing.
    #[error("unexpected state: {0}")]
    UnexpectedState(String),

    /// The operation needs an open device or an active session.
    #[error("camera is not open")]
    NotOpen,
}

impl CameraError {
    /// Wraps a driver failure with the operation that triggered it.
    #[inline]
    pub fn driver(context: &'static str, source: DriverError) -> Self {
        Self::Driver { context, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_driver_error_keeps_source() {
        let err = CameraError::driver("opening camera", DriverError::InUse);
        assert_eq!(
            err.to_string(),
            "driver error while opening camera: camera device in use"
        );
        assert!(err.source().is_some());
    }
}

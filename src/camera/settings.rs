//! User-facing camera settings with stable integer codes.

use crate::error::CameraError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which camera to use, by the side of the device it faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Facing {
    /// Rear camera.
    #[default]
    Back = 0,
    /// Screen-side camera.
    Front = 1,
}

/// Flash behavior for preview and stills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Flash {
    /// Never fire.
    #[default]
    Off = 0,
    /// Fire for every still.
    On = 1,
    /// Keep the flash lit.
    Torch = 2,
    /// Fire when exposure needs it.
    Auto = 3,
    /// Auto with red-eye reduction.
    RedEye = 4,
}

impl TryFrom<u8> for Facing {
    type Error = CameraError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Back),
            1 => Ok(Self::Front),
            other => Err(CameraError::InvalidArgument(format!("unknown facing code {other}"))),
        }
    }
}

impl From<Facing> for u8 {
    fn from(facing: Facing) -> Self {
        facing as u8
    }
}

impl TryFrom<u8> for Flash {
    type Error = CameraError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            2 => Ok(Self::Torch),
            3 => Ok(Self::Auto),
            4 => Ok(Self::RedEye),
            other => Err(CameraError::InvalidArgument(format!("unknown flash code {other}"))),
        }
    }
}

impl From<Flash> for u8 {
    fn from(flash: Flash) -> Self {
        flash as u8
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Back => "back",
            Self::Front => "front",
        })
    }
}

impl fmt::Display for Flash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Torch => "torch",
            Self::Auto => "auto",
            Self::RedEye => "red-eye",
        })
    }
}

impl FromStr for Facing {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "back" => Ok(Self::Back),
            "front" => Ok(Self::Front),
            _ => Err(CameraError::InvalidArgument(format!("unknown facing {s:?}"))),
        }
    }
}

impl FromStr for Flash {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "on" => Ok(Self::On),
            "torch" => Ok(Self::Torch),
            "auto" => Ok(Self::Auto),
            "red-eye" | "redeye" => Ok(Self::RedEye),
            _ => Err(CameraError::InvalidArgument(format!("unknown flash mode {s:?}"))),
        }
    }
}

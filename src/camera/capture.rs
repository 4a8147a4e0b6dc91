//! Still-capture coordination state machine.
//!
//! The machine consumes per-frame metadata of the preview stream and says
//! when the camera core should run precapture metering or fire the still.
//! It performs no I/O itself.
//!
//! ```text
//! PREVIEW --take_picture(af)--> LOCKING --AF locked, AE ok--> CAPTURING
//!                                  |                              ^
//!                                  +--AF locked, AE busy--> PRECAPTURE
//!                                                               |
//!                      AE precapture acknowledged          WAITING
//!                                                  (AE left PRECAPTURE)
//! CAPTURING --still completed (unlock)--> PREVIEW
//! ```

use crate::driver::{AeState, CaptureResult};
use std::fmt;

/// Where the camera is in the still-capture protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CaptureState {
    /// Preview is streaming, no still in flight.
    #[default]
    Preview,
    /// Waiting for the AF routine to lock.
    Locking,
    /// AF locked, exposure still settling.
    Locked,
    /// Precapture metering requested.
    Precapture,
    /// Waiting for precapture metering to finish.
    Waiting,
    /// The still request is being issued or is in flight.
    Capturing,
}

impl CaptureState {
    /// Numeric code used when exporting the state as a metric.
    pub fn code(self) -> i64 {
        match self {
            Self::Preview => 0,
            Self::Locking => 1,
            Self::Locked => 2,
            Self::Precapture => 3,
            Self::Waiting => 4,
            Self::Capturing => 5,
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Preview => "preview",
            Self::Locking => "locking",
            Self::Locked => "locked",
            Self::Precapture => "precapture",
            Self::Waiting => "waiting",
            Self::Capturing => "capturing",
        })
    }
}

/// What the core must do after a metadata frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureAction {
    /// Issue the still capture.
    CaptureStill,
    /// Trigger AE precapture metering.
    RunPrecapture,
}

/// Tracks the capture state across metadata frames.
#[derive(Debug, Default)]
pub struct PictureCaptureMachine {
    state: CaptureState,
}

impl PictureCaptureMachine {
    /// Creates a machine in `Preview`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// True if a still is being coordinated.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.state != CaptureState::Preview
    }

    /// Forces a state. Used by the core for transitions it drives itself.
    pub fn set_state(&mut self, state: CaptureState) {
        if self.state != state {
            tracing::trace!(from = %self.state, to = %state, "Capture state changed");
            self.state = state;
        }
    }

    /// Advances on a metadata frame.
    pub fn process(&mut self, result: &CaptureResult) -> Option<CaptureAction> {
        match self.state {
            CaptureState::Locking => {
                let af = result.af_state?;
                if !af.is_locked() {
                    return None;
                }
                match result.ae_state {
                    None | Some(AeState::Converged) => {
                        self.set_state(CaptureState::Capturing);
                        Some(CaptureAction::CaptureStill)
                    }
                    Some(_) => {
                        self.set_state(CaptureState::Locked);
                        Some(CaptureAction::RunPrecapture)
                    }
                }
            }
            CaptureState::Precapture => {
                if matches!(
                    result.ae_state,
                    None | Some(AeState::Precapture | AeState::FlashRequired | AeState::Converged)
                ) {
                    self.set_state(CaptureState::Waiting);
                }
                None
            }
            CaptureState::Waiting => {
                if result.ae_state != Some(AeState::Precapture) {
                    self.set_state(CaptureState::Capturing);
                    return Some(CaptureAction::CaptureStill);
                }
                None
            }
            CaptureState::Preview | CaptureState::Locked | CaptureState::Capturing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::AfState;

    fn frame(af: Option<AfState>, ae: Option<AeState>) -> CaptureResult {
        CaptureResult::new(af, ae)
    }

    fn locking() -> PictureCaptureMachine {
        let mut machine = PictureCaptureMachine::new();
        machine.set_state(CaptureState::Locking);
        machine
    }

    #[test]
    fn test_preview_ignores_metadata() {
        let mut machine = PictureCaptureMachine::new();
        let action = machine.process(&frame(Some(AfState::FocusedLocked), Some(AeState::Converged)));
        assert_eq!(action, None);
        assert_eq!(machine.state(), CaptureState::Preview);
        assert!(!machine.is_busy());
    }

    #[test]
    fn test_locked_and_converged_captures() {
        let mut machine = locking();
        let action = machine.process(&frame(Some(AfState::FocusedLocked), Some(AeState::Converged)));
        assert_eq!(action, Some(CaptureAction::CaptureStill));
        assert_eq!(machine.state(), CaptureState::Capturing);
    }

    #[test]
    fn test_locked_without_ae_captures() {
        let mut machine = locking();
        let action = machine.process(&frame(Some(AfState::NotFocusedLocked), None));
        assert_eq!(action, Some(CaptureAction::CaptureStill));
    }

    #[test]
    fn test_locking_waits_for_af() {
        let mut machine = locking();
        assert_eq!(machine.process(&frame(None, Some(AeState::Converged))), None);
        assert_eq!(
            machine.process(&frame(Some(AfState::ActiveScan), Some(AeState::Converged))),
            None
        );
        assert_eq!(machine.state(), CaptureState::Locking);
    }

    #[test]
    fn test_unconverged_ae_requests_precapture() {
        let mut machine = locking();
        let action = machine.process(&frame(Some(AfState::FocusedLocked), Some(AeState::Searching)));
        assert_eq!(action, Some(CaptureAction::RunPrecapture));
        assert_eq!(machine.state(), CaptureState::Locked);
    }

    #[test]
    fn test_precapture_sequence() {
        let mut machine = PictureCaptureMachine::new();
        machine.set_state(CaptureState::Precapture);

        assert_eq!(machine.process(&frame(None, Some(AeState::Searching))), None);
        assert_eq!(machine.state(), CaptureState::Precapture);

        assert_eq!(machine.process(&frame(None, Some(AeState::Precapture))), None);
        assert_eq!(machine.state(), CaptureState::Waiting);

        assert_eq!(machine.process(&frame(None, Some(AeState::Precapture))), None);
        assert_eq!(machine.state(), CaptureState::Waiting);

        let action = machine.process(&frame(None, Some(AeState::FlashRequired)));
        assert_eq!(action, Some(CaptureAction::CaptureStill));
        assert_eq!(machine.state(), CaptureState::Capturing);
    }

    #[test]
    fn test_capturing_holds() {
        let mut machine = PictureCaptureMachine::new();
        machine.set_state(CaptureState::Capturing);
        for ae in [None, Some(AeState::Converged), Some(AeState::Precapture)] {
            assert_eq!(machine.process(&frame(Some(AfState::FocusedLocked), ae)), None);
            assert_eq!(machine.state(), CaptureState::Capturing);
        }
    }
}

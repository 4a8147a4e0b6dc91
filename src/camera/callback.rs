//! Host callbacks and their fan-out.
//!
//! The core never calls host code while it holds its state lock. It queues
//! [`Notification`]s instead, and they are delivered once the lock is
//! released, so a host callback may call straight back into the camera.

use std::sync::{Arc, PoisonError, RwLock};

/// Receives camera lifecycle events and captured stills.
pub trait CameraCallback: Send + Sync {
    /// The device finished opening.
    fn on_camera_opened(&self) {}

    /// The device was closed.
    fn on_camera_closed(&self) {}

    /// A still was captured. `data` holds the encoded JPEG.
    fn on_picture_taken(&self, _data: &[u8]) {}
}

/// An event queued for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// See [`CameraCallback::on_camera_opened`].
    Opened,
    /// See [`CameraCallback::on_camera_closed`].
    Closed,
    /// See [`CameraCallback::on_picture_taken`].
    PictureTaken(Vec<u8>),
}

/// Fans notifications out to every registered callback.
#[derive(Default)]
pub struct CallbackBridge {
    callbacks: RwLock<Vec<Arc<dyn CameraCallback>>>,
}

impl CallbackBridge {
    /// Creates a bridge with no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback.
    pub fn add(&self, callback: Arc<dyn CameraCallback>) {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    /// Unregisters a callback. Returns false if it was not registered.
    pub fn remove(&self, callback: &Arc<dyn CameraCallback>) -> bool {
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|registered| !Arc::ptr_eq(registered, callback));
        callbacks.len() != before
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers one notification to every callback.
    pub fn dispatch(&self, notification: &Notification) {
        // Snapshot so callbacks may register or remove callbacks.
        let callbacks: Vec<_> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for callback in &callbacks {
            match notification {
                Notification::Opened => callback.on_camera_opened(),
                Notification::Closed => callback.on_camera_closed(),
                Notification::PictureTaken(data) => callback.on_picture_taken(data),
            }
        }
    }

    /// Delivers notifications in order.
    pub fn dispatch_all(&self, notifications: Vec<Notification>) {
        for notification in &notifications {
            self.dispatch(notification);
        }
    }
}

//! Contract for the native capture session behind a controller
//!
//! The video engine itself (frame capture, encoding, transport) lives outside
//! this crate. Engines plug in by implementing [`CaptureSession`] and a
//! [`SessionFactory`] that creates or attaches sessions by identifying context.

use crate::errors::CameraError;
use crate::types::CameraFacing;
use std::sync::{Arc, RwLock};

/// A native capture session owned by exactly one controller
pub trait CaptureSession: Send {
    /// Address of the engine object, handed down to lower-level components.
    /// Must be non-zero while the session is alive.
    fn native_address(&self) -> usize;

    /// Physically switch to `target`. May block until the hardware settles.
    fn switch_camera(&mut self, target: CameraFacing) -> Result<(), CameraError>;

    /// Release engine resources. Called at most once.
    fn release(&mut self) -> Result<(), CameraError>;
}

/// Creates or attaches native sessions keyed by identifying context
pub trait SessionFactory: Send + Sync {
    fn create(&self, identifying_context: &str) -> Result<Box<dyn CaptureSession>, CameraError>;
}

lazy_static::lazy_static! {
    static ref GLOBAL_FACTORY: RwLock<Option<Arc<dyn SessionFactory>>> = RwLock::new(None);
}

/// Install the factory used by the host bridge commands
pub fn install_session_factory(factory: Arc<dyn SessionFactory>) {
    let mut slot = GLOBAL_FACTORY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if slot.is_some() {
        log::info!("Replacing installed capture session factory");
    }
    *slot = Some(factory);
}

/// Currently installed factory, if any
pub fn installed_session_factory() -> Result<Arc<dyn SessionFactory>, CameraError> {
    GLOBAL_FACTORY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
        .ok_or_else(|| {
            CameraError::InitializationError("no capture session factory installed".to_string())
        })
}

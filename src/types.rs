use serde::{Deserialize, Serialize};
use std::fmt;

/// Which physical camera feeds the capture pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    Front,
    Back,
}

impl CameraFacing {
    /// The other camera
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }

    pub fn from_front(is_front: bool) -> Self {
        if is_front {
            CameraFacing::Front
        } else {
            CameraFacing::Back
        }
    }

    pub fn is_front(self) -> bool {
        self == CameraFacing::Front
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CameraFacing::Front => "front",
            CameraFacing::Back => "back",
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier of a live native capture session.
///
/// Handles index the process-wide handle table (see [`crate::handles`]).
/// They start at 1 and are never reused, so zero is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeHandle(u64);

impl NativeHandle {
    /// Rebuild a handle from its integer form. Whether it is live is decided
    /// by [`crate::handles::resolve`].
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Integer form handed across the host boundary
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Snapshot of a controller returned to the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerStatus {
    pub identifying_context: String,
    pub native_handle: Option<NativeHandle>,
    pub facing: CameraFacing,
    pub disposed: bool,
    pub switch_in_flight: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

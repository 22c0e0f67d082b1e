use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    InitializationError(String),
    SwitchFailed(String),
    SwitchInProgress,
    UseAfterDispose,
    ReleaseError(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CameraError::InitializationError(msg) => {
                write!(f, "Capture session initialization error: {}", msg)
            }
            CameraError::SwitchFailed(msg) => write!(f, "Camera switch failed: {}", msg),
            CameraError::SwitchInProgress => write!(f, "Camera switch already in progress"),
            CameraError::UseAfterDispose => write!(f, "Camera controller has been disposed"),
            CameraError::ReleaseError(msg) => write!(f, "Capture session release error: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}

//! Render error type

use ridgeline_core::RidgelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to get adapter")]
    AdapterNotFound,
    #[error("Failed to create device: {0}")]
    DeviceCreation(String),
    #[error("Failed to read render buffer: {0}")]
    BufferReadFailed(String),
    #[error("Pixel data does not fit a {width}x{height} image")]
    ImageSize { width: u32, height: u32 },
}

impl From<RenderError> for RidgelineError {
    fn from(err: RenderError) -> Self {
        RidgelineError::RenderError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_core_error() {
        let err: RidgelineError = RenderError::AdapterNotFound.into();
        assert!(matches!(err, RidgelineError::RenderError(ref msg) if msg == "Failed to get adapter"));
        assert!(!err.is_configuration());
    }
}

//! Error types for Ridgeline

use thiserror::Error;

/// Grid axis named in dimension diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Depth,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Width => write!(f, "Width"),
            Axis::Depth => write!(f, "Depth"),
        }
    }
}

/// The main error type for Ridgeline operations
#[derive(Debug, Error)]
pub enum RidgelineError {
    #[error(
        "The number of vertices in the patch minus one must be a power of two (patch size {0})"
    )]
    InvalidPatchSize(u32),

    #[error("The minimum patch size is 3 (got {0})")]
    PatchTooSmall(u32),

    #[error("Patch size must be an odd number (got {0})")]
    PatchSizeEven(u32),

    #[error(
        "{axis} minus 1 ({}) must be divisible by patch size minus 1 ({}); try using {axis} = {suggested}",
        .value.saturating_sub(1),
        .patch_size.saturating_sub(1)
    )]
    GridNotDivisible {
        axis: Axis,
        value: u32,
        patch_size: u32,
        suggested: u32,
    },

    #[error("{axis} {value} exceeds the height field size {size}")]
    GridExceedsHeightField { axis: Axis, value: u32, size: u32 },

    #[error("Heightmap format error: {0}")]
    HeightmapFormat(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

impl RidgelineError {
    /// Whether this error describes an inconsistent grid/patch configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RidgelineError::InvalidPatchSize(_)
                | RidgelineError::PatchTooSmall(_)
                | RidgelineError::PatchSizeEven(_)
                | RidgelineError::GridNotDivisible { .. }
                | RidgelineError::GridExceedsHeightField { .. }
                | RidgelineError::HeightmapFormat(_)
        )
    }
}

/// Result type alias for Ridgeline operations
pub type Result<T> = std::result::Result<T, RidgelineError>;

impl From<toml::de::Error> for RidgelineError {
    fn from(err: toml::de::Error) -> Self {
        RidgelineError::TomlParseError(err.to_string())
    }
}

/// Error type shared by every stage of the pipeline
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RasterError {
    /// The screen buffer and the camera frustum disagree on aspect ratio.
    #[error("screen ratio {screen:.4} does not match camera ratio {camera:.4}")]
    AspectMismatch { screen: f64, camera: f64 },

    #[error("screen has no pixels ({width}x{height})")]
    EmptyScreen { width: usize, height: usize },

    #[error("division by zero: {0}")]
    DivisionByZero(&'static str),

    #[error("degenerate frustum: {axis} bounds are equal, zero or not finite")]
    DegenerateFrustum { axis: &'static str },

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("failed to parse STL: {0}")]
    Stl(String),
}

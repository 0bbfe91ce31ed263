//! Renderer errors
//!
//! Construction failures are fatal for the renderer being built. Frame input
//! errors only affect the draw that reported them.

/// Errors that can occur while building or drawing with a renderer
#[derive(Debug)]
pub enum RendererError {
    /// The generated shader failed validation
    ShaderCompilation(String),
    /// GPU buffers or pipeline could not be created
    ResourceAllocation(String),
    /// A draw call received unusable props
    InvalidFrameInput(FrameInputError),
    /// The GPU rejected a draw, e.g. a destroyed texture was bound
    DrawFailed(String),
}

impl RendererError {
    /// Whether the error leaves the renderer usable for the next frame
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RendererError::InvalidFrameInput(_) | RendererError::DrawFailed(_)
        )
    }
}

impl std::fmt::Display for RendererError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererError::ShaderCompilation(msg) => write!(f, "Shader compilation failed: {}", msg),
            RendererError::ResourceAllocation(msg) => {
                write!(f, "GPU resource allocation failed: {}", msg)
            }
            RendererError::InvalidFrameInput(e) => write!(f, "Invalid frame input: {}", e),
            RendererError::DrawFailed(msg) => write!(f, "Draw failed: {}", msg),
        }
    }
}

impl std::error::Error for RendererError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RendererError::InvalidFrameInput(e) => Some(e),
            _ => None,
        }
    }
}

impl RendererError {
    /// Map an error captured by a draw's validation scope
    pub(crate) fn from_draw_scope(error: Option<wgpu::Error>) -> Result<(), Self> {
        match error {
            Some(e) => Err(RendererError::DrawFailed(e.to_string())),
            None => Ok(()),
        }
    }
}

impl From<FrameInputError> for RendererError {
    fn from(e: FrameInputError) -> Self {
        RendererError::InvalidFrameInput(e)
    }
}

/// Reasons a set of per-eye draw props is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum FrameInputError {
    /// A matrix contains NaN or infinity (names the matrix)
    NonFiniteMatrix(&'static str),
    /// The texture coordinate window contains NaN or infinity
    NonFiniteTexCoordWindow,
    /// The viewport covers no pixels
    EmptyViewport,
    /// The viewport reaches past the target surface
    ViewportOutOfBounds {
        viewport: (u32, u32, u32, u32),
        target: (u32, u32),
    },
}

impl std::fmt::Display for FrameInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameInputError::NonFiniteMatrix(name) => {
                write!(f, "{} matrix has non-finite values", name)
            }
            FrameInputError::NonFiniteTexCoordWindow => {
                write!(f, "texture coordinate window has non-finite values")
            }
            FrameInputError::EmptyViewport => write!(f, "viewport has zero area"),
            FrameInputError::ViewportOutOfBounds { viewport, target } => write!(
                f,
                "viewport {}x{} at ({}, {}) exceeds target {}x{}",
                viewport.2, viewport.3, viewport.0, viewport.1, target.0, target.1
            ),
        }
    }
}

impl std::error::Error for FrameInputError {}

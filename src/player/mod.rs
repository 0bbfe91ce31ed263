//! Video surface player core
//!
//! Decides, per format and layout, which mesh is drawn, which shader runs
//! and which texture window each eye samples.

pub mod error;
pub mod eye;
pub mod mesh;
pub mod props;
pub mod renderer;
pub mod shader;
pub mod types;

pub use error::{FrameInputError, RendererError};
pub use eye::{aspect_ratio, try_aspect_ratio, Eye, EyeWindows, TexCoordWindow};
pub use mesh::{Mesh, MeshVertex, SPHERE_SEGMENTS};
pub use props::{EyeTransforms, RenderProps, Viewport};
pub use renderer::{RenderTarget, Renderer};
pub use shader::{build_shader_source, ShaderProgram};
pub use types::{Format, Layout};

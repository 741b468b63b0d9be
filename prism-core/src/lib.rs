//! Prism Core Library - Software rasterization pipeline
//!
//! Everything needed to turn triangle meshes into a shaded, depth-tested
//! pixel buffer without a GPU: vector helpers, affine transforms, cameras,
//! mesh and light data, STL ingestion and the renderer itself.

pub mod error;
pub mod geometry;
pub mod light;
pub mod projection;
pub mod renderer;
pub mod screen;
pub mod stl;
pub mod transform;
pub mod vector;

// Re-export commonly used types
pub use error::{RasterError, Result};
pub use geometry::{Material, Mesh};
pub use light::PointLight;
pub use projection::{Frustum, OrthographicCamera, PerspectiveCamera, Projection, ProjectionMode};
pub use renderer::{RenderSettings, RenderStats, Renderer, ShadingMode};
pub use screen::{Framebuffer, Screen};
pub use transform::Transform;
pub use vector::{Vec3, VectorExt};

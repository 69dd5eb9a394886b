//! WebGPU rendering module
//!
//! `scene` tessellates simulation state into canvas-space triangles and text
//! labels; `pipeline` uploads the triangles each frame.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{DrawOptions, Frame, TextLabel, draw, draw_with};
pub use vertex::Vertex;

//! This module contains the OpenGL building blocks of the demo: window and
//! context setup, capability probing, shaders, meshes and textures.

pub mod app;
pub mod caps;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use app::*;
pub use caps::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;

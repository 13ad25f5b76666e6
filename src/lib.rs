//! A rotating textured cube with an orbit/fly camera, rendered with OpenGL
//! through SDL2 and glow.

pub mod abs;
pub mod assets;
pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod renderer;
pub mod viewer;

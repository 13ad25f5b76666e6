//! Locations of the files the demo reads at startup.
//!
//! Everything lives under an `assets/` directory next to the executable. When
//! the binary runs straight out of `target/`, the crate's own `assets/`
//! directory is used instead.

use std::path::{Path, PathBuf};

pub const TEXTURE: &str = "textures/golddiag.png";

pub const CUBE_VERTEX_120: &str = "shaders/glsl120/cube.vert";
pub const CUBE_FRAGMENT_120: &str = "shaders/glsl120/cube.frag";
pub const LINES_VERTEX_120: &str = "shaders/glsl120/lines.vert";
pub const LINES_FRAGMENT_120: &str = "shaders/glsl120/lines.frag";

pub const CUBE_VERTEX_330: &str = "shaders/glsl330/cube.vert";
pub const CUBE_FRAGMENT_330: &str = "shaders/glsl330/cube.frag";
pub const LINES_VERTEX_330: &str = "shaders/glsl330/lines.vert";
pub const LINES_FRAGMENT_330: &str = "shaders/glsl330/lines.frag";

/// Resolves asset names to paths on disk.
#[derive(Debug, Clone)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    /// Uses `root` as the asset directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Picks `<exe dir>/assets`, or the crate's `assets/` if that does not exist.
    pub fn locate(exe_dir: &Path) -> Self {
        let beside_exe = exe_dir.join("assets");
        if beside_exe.is_dir() {
            Self::new(beside_exe)
        } else {
            Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"))
        }
    }

    /// The asset directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the asset `name`.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Directory containing the running executable.
pub fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

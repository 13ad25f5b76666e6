//! Error types for startup and asset loading.
//!
//! Every fallible step returns one of these instead of appending to a shared
//! log. [`StartupError`] is what `main` finally reports to the user.

use std::{fmt, path::PathBuf};

/// Failures while creating the window and the OpenGL context.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("SDL initialisation failed: {0}")]
    Init(String),
    #[error("window creation failed: {0}")]
    Window(#[from] sdl2::video::WindowBuildError),
    #[error("OpenGL context creation failed: {0}")]
    Context(String),
    #[error("making the OpenGL context current failed: {0}")]
    MakeCurrent(String),
    #[error("forward compatible OpenGL {major}.{minor} context creation failed: {reason}")]
    ForwardCompatible { major: u8, minor: u8, reason: String },
    #[error("OpenGL version string {0:?} could not be parsed")]
    Version(String),
    #[error("event pump creation failed: {0}")]
    EventPump(String),
}

/// Failures while loading a 2D texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("error loading file {path:?}: unknown image format")]
    UnknownFormat { path: PathBuf },
    #[error("error loading file {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("error loading file {path:?}: width or height is 0")]
    ZeroSize { path: PathBuf },
    #[error("error loading file {path:?}: unsupported bit depth {bits_per_pixel}")]
    UnsupportedBitDepth { path: PathBuf, bits_per_pixel: u16 },
    #[error("error loading file {path:?}: no pixel data")]
    NoPixelData { path: PathBuf },
    #[error("error creating texture for {path:?}: {reason}")]
    Create { path: PathBuf, reason: String },
}

/// Failures while building a shader program.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("error loading file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error creating shader object: {0}")]
    Create(String),
    #[error("error compiling shader {path:?}!\n{log}")]
    Compile { path: PathBuf, log: String },
    #[error("error linking program ({vertex:?}, {fragment:?})!\n{log}")]
    Link {
        vertex: PathBuf,
        fragment: PathBuf,
        log: String,
    },
}

/// A single asset that failed to load.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Failures while reading `orbitcube.json`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error reading config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing config {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything that can abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("OpenGL {}.{} not supported, {}.{} or newer is required", .found / 10, .found % 10, .required / 10, .required % 10)]
    UnsupportedVersion { required: u32, found: u32 },
    #[error("{}", AssetErrors(.0))]
    Assets(Vec<AssetError>),
    #[error("could not create vertex buffer: {0}")]
    Mesh(String),
}

/// Renders a list of asset errors one per line.
struct AssetErrors<'a>(&'a [AssetError]);

impl fmt::Display for AssetErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_errors_are_listed_one_per_line() {
        let error = StartupError::Assets(vec![
            TextureError::ZeroSize {
                path: "a.png".into(),
            }
            .into(),
            TextureError::NoPixelData {
                path: "b.png".into(),
            }
            .into(),
        ]);
        let text = error.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("a.png"));
        assert!(lines[0].contains("width or height is 0"));
        assert!(lines[1].contains("no pixel data"));
    }

    #[test]
    fn unsupported_version_reads_as_dotted_versions() {
        let error = StartupError::UnsupportedVersion {
            required: 21,
            found: 14,
        };
        assert_eq!(
            error.to_string(),
            "OpenGL 1.4 not supported, 2.1 or newer is required"
        );
    }
}

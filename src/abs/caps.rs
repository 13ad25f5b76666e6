//! OpenGL capability probing.
//!
//! [`GlCaps`] is filled in once by the host after the final context is current
//! and then handed to the loaders by reference.

use glow::HasContext;

/// `GL_MAX_TEXTURE_MAX_ANISOTROPY_EXT`
pub const MAX_TEXTURE_MAX_ANISOTROPY_EXT: u32 = 0x84FF;
/// `GL_TEXTURE_MAX_ANISOTROPY_EXT`
pub const TEXTURE_MAX_ANISOTROPY_EXT: u32 = 0x84FE;

/// Limits and feature flags of the current OpenGL context.
#[derive(Debug, Clone, PartialEq)]
pub struct GlCaps {
    /// `major * 10 + minor`, e.g. 21 for OpenGL 2.1.
    pub version: u32,
    pub renderer: String,
    pub max_texture_size: u32,
    /// 0 when anisotropic filtering is unavailable.
    pub max_anisotropy: i32,
    pub anisotropic_filtering: bool,
    pub non_power_of_two: bool,
    pub vertex_array_objects: bool,
    pub forward_compatible: bool,
}

impl GlCaps {
    /// Queries the limits of the context `gl` belongs to.
    pub fn query(gl: &glow::Context, version: u32, forward_compatible: bool) -> Self {
        let extensions = gl.supported_extensions();
        let anisotropic_filtering = extensions.contains("GL_EXT_texture_filter_anisotropic");
        let non_power_of_two =
            version >= 20 || extensions.contains("GL_ARB_texture_non_power_of_two");
        let vertex_array_objects =
            version >= 30 || extensions.contains("GL_ARB_vertex_array_object");

        unsafe {
            let renderer = gl.get_parameter_string(glow::RENDERER);
            let max_texture_size = gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE).max(0) as u32;
            let max_anisotropy = if anisotropic_filtering {
                gl.get_parameter_i32(MAX_TEXTURE_MAX_ANISOTROPY_EXT)
            } else {
                0
            };

            Self {
                version,
                renderer,
                max_texture_size,
                max_anisotropy,
                anisotropic_filtering,
                non_power_of_two,
                vertex_array_objects,
                forward_compatible,
            }
        }
    }

    /// Whether the context is at least `major.minor`.
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        self.version >= major * 10 + minor
    }
}

/// Parses the leading `major.minor` of a `GL_VERSION` string into
/// `major * 10 + minor`.
///
/// Vendor suffixes and an `OpenGL ES` prefix are ignored.
pub fn parse_gl_version(version: &str) -> Option<u32> {
    let version = version.trim();
    let version = version
        .strip_prefix("OpenGL ES-CM ")
        .or_else(|| version.strip_prefix("OpenGL ES-CL "))
        .or_else(|| version.strip_prefix("OpenGL ES "))
        .unwrap_or(version);
    let numbers = version.split_whitespace().next()?;
    let mut parts = numbers.split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some(major * 10 + minor)
}

/// Splits a comparable version back into `(major, minor)`.
pub fn split_gl_version(version: u32) -> (u8, u8) {
    ((version / 10) as u8, (version % 10) as u8)
}

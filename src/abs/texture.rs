//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture,
//! and the preparation steps an image goes through before upload: clamping to the driver's
//! maximum size, power-of-two rescaling for old drivers, and reordering the pixels into the
//! bottom-up BGR(A) layout the upload expects.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use glow::HasContext;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, imageops::FilterType};

use super::caps::{GlCaps, TEXTURE_MAX_ANISOTROPY_EXT};
use crate::error::TextureError;

/// `GL_GENERATE_MIPMAP`, a texture parameter removed from core profiles.
const GENERATE_MIPMAP: u32 = 0x8191;

/// Size limits a texture has to fit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureLimits {
    pub max_size: u32,
    pub non_power_of_two: bool,
}

impl From<&GlCaps> for TextureLimits {
    fn from(caps: &GlCaps) -> Self {
        Self {
            max_size: caps.max_texture_size,
            non_power_of_two: caps.non_power_of_two,
        }
    }
}

/// How mipmaps get built for a given OpenGL version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipmapStrategy {
    /// Before 1.4 there are no automatic mipmaps.
    None,
    /// 1.4 to 2.1: the `GL_GENERATE_MIPMAP` texture parameter.
    GenerateParameter,
    /// 3.0 and later: `glGenerateMipmap` after the upload.
    GenerateCall,
}

impl MipmapStrategy {
    pub fn for_version(version: u32) -> Self {
        match version {
            14..=21 => Self::GenerateParameter,
            30.. => Self::GenerateCall,
            _ => Self::None,
        }
    }
}

/// An image ready for `glTexImage2D`: bottom row first, BGR or BGRA order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// 24 or 32.
    pub bits_per_pixel: u16,
    pub pixels: Vec<u8>,
}

impl PreparedImage {
    /// Bytes per pixel.
    pub fn channels(&self) -> usize {
        usize::from(self.bits_per_pixel / 8)
    }

    /// Chooses the external upload format for `version`, swapping red and blue
    /// in place when the driver predates the BGR formats (OpenGL 1.2).
    pub fn upload_format(&mut self, version: u32) -> u32 {
        let alpha = self.bits_per_pixel == 32;
        if version < 12 {
            let channels = self.channels();
            swap_red_blue(&mut self.pixels, channels);
            if alpha { glow::RGBA } else { glow::RGB }
        } else if alpha {
            glow::BGRA
        } else {
            glow::BGR
        }
    }
}

/// Rounds `value` to the nearest power of two in the logarithmic sense.
pub fn round_to_power_of_two(value: u32) -> u32 {
    if value <= 1 {
        return 1;
    }
    1 << ((value as f32).log2() + 0.5).floor() as u32
}

/// The size a `width` x `height` image is stored at under `limits`.
pub fn target_size(width: u32, height: u32, limits: TextureLimits) -> (u32, u32) {
    let mut width = width.min(limits.max_size);
    let mut height = height.min(limits.max_size);

    if !limits.non_power_of_two {
        width = round_to_power_of_two(width);
        height = round_to_power_of_two(height);
    }

    (width, height)
}

/// Swaps the first and third byte of every `channels`-sized pixel.
pub fn swap_red_blue(pixels: &mut [u8], channels: usize) {
    for pixel in pixels.chunks_exact_mut(channels) {
        pixel.swap(0, 2);
    }
}

/// Reorders top-down RGB(A) rows into bottom-up BGR(A) rows.
fn to_bottom_up_bgr(pixels: &[u8], width: u32, channels: usize) -> Vec<u8> {
    let row_len = width as usize * channels;
    let mut out = Vec::with_capacity(pixels.len());
    for row in pixels.chunks_exact(row_len).rev() {
        out.extend_from_slice(row);
    }
    swap_red_blue(&mut out, channels);
    out
}

/// Fits `image` into `limits` and converts it to the upload layout.
pub fn prepare_image(
    image: DynamicImage,
    limits: TextureLimits,
    path: &Path,
) -> Result<PreparedImage, TextureError> {
    let (original_width, original_height) = image.dimensions();

    if original_width == 0 || original_height == 0 {
        return Err(TextureError::ZeroSize {
            path: path.to_path_buf(),
        });
    }

    let (width, height) = target_size(original_width, original_height, limits);
    let image = if (width, height) != (original_width, original_height) {
        log::debug!(
            "rescaling {path:?} from {original_width}x{original_height} to {width}x{height}"
        );
        image.resize_exact(width, height, FilterType::CatmullRom)
    } else {
        image
    };

    if image.as_bytes().is_empty() {
        return Err(TextureError::NoPixelData {
            path: path.to_path_buf(),
        });
    }

    let (bits_per_pixel, raw) = match image {
        DynamicImage::ImageRgba8(buffer) => (32, buffer.into_raw()),
        DynamicImage::ImageRgb8(buffer) => (24, buffer.into_raw()),
        other => {
            return Err(TextureError::UnsupportedBitDepth {
                path: path.to_path_buf(),
                bits_per_pixel: other.color().bits_per_pixel(),
            });
        }
    };

    let channels = usize::from(bits_per_pixel / 8);
    Ok(PreparedImage {
        width,
        height,
        bits_per_pixel,
        pixels: to_bottom_up_bgr(&raw, width, channels),
    })
}

/// Decodes the image at `path`, detecting the format from its content first
/// and from its extension second.
pub fn decode_image(path: &Path) -> Result<DynamicImage, TextureError> {
    let decode_error = |source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(image::ImageError::IoError(e)))?;

    if reader.format().is_none() {
        let format = ImageFormat::from_path(path).map_err(|_| TextureError::UnknownFormat {
            path: path.to_path_buf(),
        })?;
        reader.set_format(format);
    }

    reader.decode().map_err(decode_error)
}

/// Represents a texture stored on the GPU side.
///
/// A `Texture` always owns a live GL object; loading failures never produce one.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    width: u32,
    height: u32,
    path: PathBuf,
}

impl Texture {
    /// Loads the image at `path` as a mipmapped 2D texture.
    pub fn load(gl: &Arc<glow::Context>, path: &Path, caps: &GlCaps) -> Result<Self, TextureError> {
        let image = decode_image(path)?;
        let mut prepared = prepare_image(image, TextureLimits::from(caps), path)?;
        let format = prepared.upload_format(caps.version);
        let mipmaps = MipmapStrategy::for_version(caps.version);

        unsafe {
            let texture = gl
                .create_texture()
                .map_err(|reason| TextureError::Create {
                    path: path.to_path_buf(),
                    reason,
                })?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            let min_filter = if caps.version >= 14 {
                glow::LINEAR_MIPMAP_LINEAR
            } else {
                glow::LINEAR
            };
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, min_filter as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );

            if caps.anisotropic_filtering {
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    TEXTURE_MAX_ANISOTROPY_EXT,
                    caps.max_anisotropy,
                );
            }

            if mipmaps == MipmapStrategy::GenerateParameter {
                gl.tex_parameter_i32(glow::TEXTURE_2D, GENERATE_MIPMAP, 1);
            }

            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                prepared.width as i32,
                prepared.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(prepared.pixels.as_slice())),
            );

            if mipmaps == MipmapStrategy::GenerateCall {
                gl.generate_mipmap(glow::TEXTURE_2D);
            }

            gl.bind_texture(glow::TEXTURE_2D, None);

            log::info!(
                "loaded texture {path:?} ({}x{}, {} bpp)",
                prepared.width,
                prepared.height,
                prepared.bits_per_pixel
            );

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                width: prepared.width,
                height: prepared.height,
                path: path.to_path_buf(),
            })
        }
    }

    /// The driver id of this texture.
    pub fn handle(&self) -> glow::Texture {
        self.id
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }

    /// Releases the GL object now instead of at the end of scope.
    pub fn delete(self) {
        drop(self);
    }

    /// Unbinds any 2D texture from the active unit.
    pub fn unbind(&self) {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        log::debug!("deleting texture {:?}", self.path);
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NPOT: TextureLimits = TextureLimits {
        max_size: 256,
        non_power_of_two: true,
    };
    const POT_ONLY: TextureLimits = TextureLimits {
        max_size: 256,
        non_power_of_two: false,
    };

    #[test]
    fn rounds_to_nearest_power_of_two() {
        assert_eq!(round_to_power_of_two(1), 1);
        assert_eq!(round_to_power_of_two(3), 4);
        assert_eq!(round_to_power_of_two(5), 4);
        assert_eq!(round_to_power_of_two(6), 8);
        assert_eq!(round_to_power_of_two(200), 256);
        assert_eq!(round_to_power_of_two(256), 256);
        assert_eq!(round_to_power_of_two(700), 512);
        assert_eq!(round_to_power_of_two(1000), 1024);
    }

    #[test]
    fn oversized_image_is_clamped() {
        let image = DynamicImage::new_rgb8(300, 1000);
        let prepared = prepare_image(image, NPOT, Path::new("big.png")).unwrap();
        assert_eq!((prepared.width, prepared.height), (256, 256));
        assert_eq!(prepared.bits_per_pixel, 24);
        assert_eq!(prepared.pixels.len(), 256 * 256 * 3);
    }

    #[test]
    fn clamped_image_is_rounded_without_npot_support() {
        let limits = TextureLimits {
            max_size: 1024,
            non_power_of_two: false,
        };
        assert_eq!(target_size(2000, 700, limits), (1024, 512));
        assert_eq!(target_size(2000, 700, NPOT), (256, 256));

        let image = DynamicImage::new_rgb8(300, 100);
        let prepared = prepare_image(image, POT_ONLY, Path::new("wide.png")).unwrap();
        assert_eq!((prepared.width, prepared.height), (256, 128));
    }

    #[test]
    fn fitting_image_keeps_its_size() {
        let image = DynamicImage::new_rgba8(100, 60);
        let prepared = prepare_image(image, NPOT, Path::new("small.png")).unwrap();
        assert_eq!((prepared.width, prepared.height), (100, 60));
        assert_eq!(prepared.bits_per_pixel, 32);
        assert_eq!(prepared.channels(), 4);
    }

    #[test]
    fn unsupported_bit_depths_are_rejected() {
        for image in [
            DynamicImage::new_luma8(4, 4),
            DynamicImage::new_luma_a8(4, 4),
            DynamicImage::new_rgb16(4, 4),
            DynamicImage::new_rgba32f(4, 4),
        ] {
            let expected = image.color().bits_per_pixel();
            match prepare_image(image, NPOT, Path::new("odd.png")) {
                Err(TextureError::UnsupportedBitDepth { bits_per_pixel, .. }) => {
                    assert_eq!(bits_per_pixel, expected)
                }
                other => panic!("expected UnsupportedBitDepth, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let image = DynamicImage::new_rgb8(0, 16);
        assert!(matches!(
            prepare_image(image, NPOT, Path::new("empty.png")),
            Err(TextureError::ZeroSize { .. })
        ));
    }

    #[test]
    fn pixels_are_bottom_up_bgr() {
        let mut buffer = image::RgbImage::new(1, 2);
        buffer.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        buffer.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        let prepared =
            prepare_image(DynamicImage::ImageRgb8(buffer), NPOT, Path::new("p.png")).unwrap();
        // bottom (blue) row first, each pixel in B, G, R order
        assert_eq!(prepared.pixels, vec![255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn legacy_drivers_get_rgb_order() {
        let mut prepared = PreparedImage {
            width: 1,
            height: 1,
            bits_per_pixel: 32,
            pixels: vec![10, 20, 30, 40],
        };
        assert_eq!(prepared.upload_format(46), glow::BGRA);
        assert_eq!(prepared.pixels, vec![10, 20, 30, 40]);

        assert_eq!(prepared.upload_format(11), glow::RGBA);
        assert_eq!(prepared.pixels, vec![30, 20, 10, 40]);

        let mut prepared = PreparedImage {
            width: 2,
            height: 1,
            bits_per_pixel: 24,
            pixels: vec![1, 2, 3, 4, 5, 6],
        };
        assert_eq!(prepared.upload_format(11), glow::RGB);
        assert_eq!(prepared.pixels, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn mipmap_strategy_follows_version() {
        assert_eq!(MipmapStrategy::for_version(11), MipmapStrategy::None);
        assert_eq!(MipmapStrategy::for_version(13), MipmapStrategy::None);
        assert_eq!(
            MipmapStrategy::for_version(14),
            MipmapStrategy::GenerateParameter
        );
        assert_eq!(
            MipmapStrategy::for_version(21),
            MipmapStrategy::GenerateParameter
        );
        assert_eq!(MipmapStrategy::for_version(30), MipmapStrategy::GenerateCall);
        assert_eq!(MipmapStrategy::for_version(46), MipmapStrategy::GenerateCall);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        assert!(matches!(
            decode_image(Path::new("/nonexistent/texture.png")),
            Err(TextureError::Decode { .. })
        ));
    }

    #[test]
    fn unrecognised_content_and_extension_is_unknown_format() {
        let path = std::env::temp_dir().join("orbitcube-texture-test.notanimage");
        std::fs::write(&path, b"definitely not pixels").unwrap();
        let result = decode_image(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(TextureError::UnknownFormat { .. })));
    }
}

//! Textures and samplers.
//!
//! [`TextureData`] is an RGBA8 image in memory, loaded from disk with the
//! `image` crate or generated procedurally. [`Texture`] is its GPU upload:
//! a 2D texture, a six-face cube texture or a depth target.

use std::path::Path;

use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::error::{GlintError, Result};
use crate::shader::{SamplerKind, TextureKind};

/// Format used for depth targets and shadow maps.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// How texel values are interpreted on upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color data such as albedo; decoded from sRGB when sampled.
    Srgb,
    /// Non-color data such as normal, roughness or metalness maps.
    Linear,
}

impl ColorSpace {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// RGBA8 pixels, row-major from the top-left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decodes an image file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let image = image::open(path.as_ref())?.to_rgba8();
        let (width, height) = image.dimensions();
        log::debug!("loaded {} ({width}x{height})", path.as_ref().display());
        Ok(Self::new(width, height, image.into_raw()))
    }

    /// Decodes an image held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self::new(width, height, image.into_raw()))
    }

    /// A single texel.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self::new(1, 1, rgba.to_vec())
    }

    /// Tangent-space normal map pointing straight out of the surface.
    pub fn flat_normal() -> Self {
        Self::solid([128, 128, 255, 255])
    }

    /// Two-color checkerboard with `cells` squares per side.
    pub fn checker(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let even = (x / cell + y / cell) % 2 == 0;
                pixels.extend_from_slice(if even { &a } else { &b });
            }
        }
        Self::new(size, size, pixels)
    }

    /// Grayscale value noise around `base`, for roughness and metalness maps.
    pub fn speckle(size: u32, seed: u32, base: u8, variation: u8) -> Self {
        let size = size.max(1);
        let spread = i32::from(variation);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let offset = if spread == 0 {
                    0
                } else {
                    (hash(x, y, seed) % (2 * spread as u32 + 1)) as i32 - spread
                };
                let value = (i32::from(base) + offset).clamp(0, 255) as u8;
                pixels.extend_from_slice(&[value, value, value, 255]);
            }
        }
        Self::new(size, size, pixels)
    }

    /// Multiplies the color channels by `rgb / 255`, leaving alpha.
    pub fn tinted(mut self, rgb: [u8; 3]) -> Self {
        for pixel in self.pixels.chunks_exact_mut(4) {
            for (channel, tint) in pixel.iter_mut().zip(rgb) {
                *channel = ((u16::from(*channel) * u16::from(tint)) / 255) as u8;
            }
        }
        self
    }

    /// Six faces of a vertical gradient sky, in cube face order
    /// (+X, -X, +Y, -Y, +Z, -Z).
    pub fn sky_faces(size: u32, horizon: [u8; 3], zenith: [u8; 3], ground: [u8; 3]) -> [Self; 6] {
        let size = size.max(1);
        std::array::from_fn(|face| {
            let mut pixels = Vec::with_capacity((size * size * 4) as usize);
            for y in 0..size {
                for x in 0..size {
                    let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                    let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                    let height = cube_direction(face, u, v).normalize().y;
                    let (from, to, t) = if height >= 0.0 {
                        (horizon, zenith, height.sqrt())
                    } else {
                        (horizon, ground, (-height).sqrt())
                    };
                    pixels.extend_from_slice(&[
                        lerp_u8(from[0], to[0], t),
                        lerp_u8(from[1], to[1], t),
                        lerp_u8(from[2], to[2], t),
                        255,
                    ]);
                }
            }
            Self::new(size, size, pixels)
        })
    }
}

/// Direction through texel `(u, v)` in `[-1, 1]` of a cube face.
fn cube_direction(face: usize, u: f32, v: f32) -> Vec3 {
    match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    (f32::from(a) + (f32::from(b) - f32::from(a)) * t.clamp(0.0, 1.0)).round() as u8
}

fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

/// A GPU texture and its default view.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) kind: TextureKind,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Uploads a 2D texture.
    pub fn from_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        color_space: ColorSpace,
        label: &str,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: data.width,
                    height: data.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: color_space.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data.pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            kind: TextureKind::D2,
            width: data.width,
            height: data.height,
        }
    }

    /// Uploads a cube texture from six square faces of equal size, ordered
    /// +X, -X, +Y, -Y, +Z, -Z.
    pub fn cube(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[TextureData],
        label: &str,
    ) -> Result<Self> {
        let size = faces.first().map(|face| face.width).unwrap_or(0);
        let valid = faces.len() == 6
            && size > 0
            && faces.iter().all(|face| {
                face.width == size
                    && face.height == size
                    && face.pixels.len() == (size * size * 4) as usize
            });
        if !valid {
            return Err(GlintError::CubeFaces { size });
        }

        let pixels: Vec<u8> = faces.iter().flat_map(|face| face.pixels.iter().copied()).collect();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 6,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: ColorSpace::Srgb.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            kind: TextureKind::Cube,
            width: size,
            height: size,
        })
    }

    /// Depth target that can also be sampled, e.g. a shadow map.
    pub fn depth(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            kind: TextureKind::Depth,
            width,
            height,
        }
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }
}

/// Creates a sampler of the given kind.
///
/// Filtering samplers wrap and filter linearly. Comparison samplers clamp to
/// the edge; lookups outside the shadow volume are treated as lit by the
/// shader before sampling.
pub fn create_sampler(device: &wgpu::Device, kind: SamplerKind, label: &str) -> wgpu::Sampler {
    match kind {
        SamplerKind::Filtering => device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: 16,
            ..Default::default()
        }),
        SamplerKind::Comparison => device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_alternates() {
        let white = [255, 255, 255, 255];
        let black = [0, 0, 0, 255];
        let data = TextureData::checker(4, 2, white, black);
        assert_eq!(data.pixels.len(), 4 * 4 * 4);
        assert_eq!(&data.pixels[0..4], &white);
        // Third pixel on the first row starts the second cell
        assert_eq!(&data.pixels[8..12], &black);
        // First pixel of the third row
        assert_eq!(&data.pixels[32..36], &black);
    }

    #[test]
    fn flat_normal_points_out() {
        assert_eq!(TextureData::flat_normal().pixels, vec![128, 128, 255, 255]);
    }

    #[test]
    fn tint_scales_color_not_alpha() {
        let data = TextureData::solid([255, 100, 200, 128]).tinted([255, 0, 128]);
        assert_eq!(data.pixels, vec![255, 0, 100, 128]);
    }

    #[test]
    fn speckle_stays_in_band() {
        let data = TextureData::speckle(16, 7, 200, 20);
        for texel in data.pixels.chunks_exact(4) {
            assert!((180..=220).contains(&texel[0]));
            assert_eq!(texel[0], texel[1]);
            assert_eq!(texel[3], 255);
        }
        assert_eq!(TextureData::speckle(8, 1, 10, 0).pixels[0], 10);
    }

    #[test]
    fn sky_is_brighter_up_than_down() {
        let faces = TextureData::sky_faces(8, [200, 200, 200], [40, 90, 200], [20, 20, 20]);
        let up = &faces[2].pixels;
        let down = &faces[3].pixels;
        // Face centers look straight up and down
        let center = ((4 * 8 + 4) * 4) as usize;
        assert!(up[center + 2] > 150);
        assert!(down[center + 2] < 60);
        assert!(faces.iter().all(|face| face.width == 8 && face.height == 8));
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        let result = TextureData::from_bytes(&[1, 2, 3, 4]);
        assert!(matches!(result, Err(GlintError::Image(_))));
    }
}

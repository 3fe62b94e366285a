//! Scene lighting.
//!
//! A [`LightSet`] is built once with up to [`MAX_LIGHTS`] lights and an
//! ambient color. Lights cannot be added or removed afterwards, but their
//! colors, intensities and placement can be edited in place.

use glam::Vec3;

/// Upper bound on lights per scene; sized to the pixel shader's array.
pub const MAX_LIGHTS: usize = 8;

/// Byte size of the packed light array uploaded to the pixel stage.
pub const LIGHTS_BYTES: usize = MAX_LIGHTS * std::mem::size_of::<GpuLight>();

const LIGHT_TYPE_DIRECTIONAL: i32 = 0;
const LIGHT_TYPE_POINT: i32 = 1;

/// A single light source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Directional {
        direction: Vec3,
        color: Vec3,
        intensity: f32,
    },
    Point {
        position: Vec3,
        color: Vec3,
        intensity: f32,
        /// Distance at which the contribution reaches zero.
        range: f32,
    },
}

impl Light {
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self::Directional {
            direction,
            color,
            intensity,
        }
    }

    pub fn point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self::Point {
            position,
            color,
            intensity,
            range,
        }
    }

    pub fn color(&self) -> Vec3 {
        match *self {
            Self::Directional { color, .. } | Self::Point { color, .. } => color,
        }
    }

    pub fn set_color(&mut self, value: Vec3) {
        match self {
            Self::Directional { color, .. } | Self::Point { color, .. } => *color = value,
        }
    }

    pub fn intensity(&self) -> f32 {
        match *self {
            Self::Directional { intensity, .. } | Self::Point { intensity, .. } => intensity,
        }
    }

    pub fn set_intensity(&mut self, value: f32) {
        match self {
            Self::Directional { intensity, .. } | Self::Point { intensity, .. } => {
                *intensity = value
            }
        }
    }

    /// Packs the light into the layout of the WGSL `Light` struct.
    ///
    /// Directions are normalized here so the shader never has to.
    pub fn to_gpu(&self) -> GpuLight {
        match *self {
            Self::Directional {
                direction,
                color,
                intensity,
            } => GpuLight {
                direction: direction.normalize_or_zero().to_array(),
                kind: LIGHT_TYPE_DIRECTIONAL,
                position: [0.0; 3],
                range: 0.0,
                color: color.to_array(),
                intensity,
            },
            Self::Point {
                position,
                color,
                intensity,
                range,
            } => GpuLight {
                direction: [0.0; 3],
                kind: LIGHT_TYPE_POINT,
                position: position.to_array(),
                range,
                color: color.to_array(),
                intensity,
            },
        }
    }
}

/// GPU layout of one light (48 bytes, three 16-byte rows).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub direction: [f32; 3],
    pub kind: i32,
    pub position: [f32; 3],
    pub range: f32,
    pub color: [f32; 3],
    pub intensity: f32,
}

/// The fixed lights of a scene plus its ambient term.
#[derive(Clone, Debug)]
pub struct LightSet {
    lights: Vec<Light>,
    ambient: Vec3,
}

impl LightSet {
    /// Takes at most [`MAX_LIGHTS`] lights; extras are dropped with a warning.
    pub fn new(ambient: Vec3, lights: impl IntoIterator<Item = Light>) -> Self {
        let mut lights: Vec<Light> = lights.into_iter().collect();
        if lights.len() > MAX_LIGHTS {
            log::warn!(
                "{} lights supplied, only the first {MAX_LIGHTS} are used",
                lights.len()
            );
            lights.truncate(MAX_LIGHTS);
        }
        Self { lights, ambient }
    }

    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    pub fn set_ambient(&mut self, ambient: Vec3) {
        self.ambient = ambient;
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Edits a light in place. The slice length is fixed.
    pub fn lights_mut(&mut self) -> &mut [Light] {
        &mut self.lights
    }

    /// Packed records for upload, one per light.
    pub fn to_gpu(&self) -> Vec<GpuLight> {
        self.lights.iter().map(Light::to_gpu).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_light_is_three_rows() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 48);
        assert_eq!(LIGHTS_BYTES, 384);
    }

    #[test]
    fn packs_directional_and_point() {
        let sun = Light::directional(Vec3::new(0.0, -2.0, 0.0), Vec3::X, 5.0).to_gpu();
        assert_eq!(sun.kind, LIGHT_TYPE_DIRECTIONAL);
        assert_eq!(sun.direction, [0.0, -1.0, 0.0]);
        assert_eq!(sun.intensity, 5.0);

        let lamp = Light::point(Vec3::new(-3.0, 2.0, -2.0), Vec3::Y, 5.0, 10.0).to_gpu();
        assert_eq!(lamp.kind, LIGHT_TYPE_POINT);
        assert_eq!(lamp.position, [-3.0, 2.0, -2.0]);
        assert_eq!(lamp.range, 10.0);
        assert_eq!(lamp.color, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn set_is_capped_at_max_lights() {
        let lights = (0..12).map(|i| Light::point(Vec3::splat(i as f32), Vec3::ONE, 1.0, 5.0));
        let set = LightSet::new(Vec3::ZERO, lights);
        assert_eq!(set.len(), MAX_LIGHTS);
    }

    #[test]
    fn colors_edit_in_place() {
        let mut set = LightSet::new(
            Vec3::splat(0.1),
            [Light::directional(Vec3::Y, Vec3::X, 5.0)],
        );
        set.lights_mut()[0].set_color(Vec3::Z);
        set.lights_mut()[0].set_intensity(2.0);

        let packed = set.to_gpu();
        assert_eq!(packed[0].color, [0.0, 0.0, 1.0]);
        assert_eq!(packed[0].intensity, 2.0);
        assert_eq!(set.len(), 1);
    }
}

//! Per-frame scene state.
//!
//! A [`Scene`] owns everything the renderer walks each frame: entities in
//! draw order, the materials they share, the cameras, the light set, the
//! shadow parameters and an optional sky. [`Scene::update`] applies one frame
//! of input.

use glam::Vec3;
use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::entity::Entity;
use crate::error::{GlintError, Result};
use crate::handles::MaterialId;
use crate::input::Input;
use crate::light::LightSet;
use crate::material::Material;
use crate::shadow::ShadowMap;
use crate::sky::Sky;

/// Camera selection keys, in camera order.
const CAMERA_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// What the app shell should do after an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct Scene {
    entities: Vec<Entity>,
    materials: Vec<Material>,
    cameras: Vec<Camera>,
    active_camera: usize,
    lights: LightSet,
    shadow_map: ShadowMap,
    sky: Option<Sky>,
}

impl Scene {
    /// Creates a scene with no entities. At least one camera is required; the
    /// first becomes active.
    pub fn new(cameras: Vec<Camera>, lights: LightSet, shadow_map: ShadowMap) -> Result<Self> {
        if cameras.is_empty() {
            return Err(GlintError::NoCamera);
        }
        Ok(Self {
            entities: Vec::new(),
            materials: Vec::new(),
            cameras,
            active_camera: 0,
            lights,
            shadow_map,
            sky: None,
        })
    }

    pub fn with_sky(mut self, sky: Sky) -> Self {
        self.sky = Some(sky);
        self
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Appends an entity and returns its index in draw order.
    pub fn add_entity(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    /// Applies one frame of input.
    ///
    /// Escape quits. Keys 1 to 9 select a camera when one exists at that
    /// index. The active camera then moves and refreshes its view.
    pub fn update(&mut self, input: &Input, dt: f32) -> FrameControl {
        if input.key_down(KeyCode::Escape) {
            return FrameControl::Quit;
        }

        for (index, key) in CAMERA_KEYS.iter().enumerate() {
            if input.key_pressed(*key) && index < self.cameras.len() && index != self.active_camera
            {
                log::debug!("switching to camera {}", index + 1);
                self.active_camera = index;
            }
        }

        self.cameras[self.active_camera].update(input, dt);
        FrameControl::Continue
    }

    /// Recomputes every camera's projection for a new aspect ratio.
    pub fn on_resize(&mut self, aspect_ratio: f32) {
        for camera in &mut self.cameras {
            camera.update_projection_matrix(aspect_ratio);
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn camera_mut(&mut self, index: usize) -> Option<&mut Camera> {
        self.cameras.get_mut(index)
    }

    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active_camera]
    }

    pub fn active_camera_index(&self) -> usize {
        self.active_camera
    }

    /// Selects the active camera. Out-of-range indices are ignored.
    pub fn set_active_camera(&mut self, index: usize) {
        if index < self.cameras.len() {
            self.active_camera = index;
        }
    }

    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightSet {
        &mut self.lights
    }

    pub fn ambient(&self) -> Vec3 {
        self.lights.ambient()
    }

    pub fn shadow_map(&self) -> &ShadowMap {
        &self.shadow_map
    }

    pub fn sky(&self) -> Option<&Sky> {
        self.sky.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::{MeshId, ShaderId};
    use glam::{Vec2, Vec4};

    fn camera(x: f32) -> Camera {
        Camera::new(1.5, Vec3::new(x, 0.0, -4.0), 1.0, 0.1, 100.0, 3.0, 0.01, false)
    }

    fn scene() -> Scene {
        Scene::new(
            vec![camera(0.0), camera(1.0), camera(2.0)],
            LightSet::new(Vec3::ZERO, []),
            ShadowMap::from_directional(Vec3::NEG_Y, 512),
        )
        .expect("scene has cameras")
    }

    #[test]
    fn needs_a_camera() {
        let result = Scene::new(
            Vec::new(),
            LightSet::new(Vec3::ZERO, []),
            ShadowMap::from_directional(Vec3::NEG_Y, 512),
        );
        assert!(matches!(result, Err(GlintError::NoCamera)));
    }

    #[test]
    fn escape_quits_before_anything_moves() {
        let mut scene = scene();
        let mut input = Input::new();
        input.key_event(KeyCode::Escape, true);
        input.key_event(KeyCode::KeyW, true);

        assert_eq!(scene.update(&input, 1.0), FrameControl::Quit);
        assert_eq!(scene.active_camera().transform().position(), Vec3::new(0.0, 0.0, -4.0));
    }

    #[test]
    fn number_keys_select_existing_cameras() {
        let mut scene = scene();
        let mut input = Input::new();

        input.key_event(KeyCode::Digit3, true);
        assert_eq!(scene.update(&input, 0.016), FrameControl::Continue);
        assert_eq!(scene.active_camera_index(), 2);
        input.end_frame();

        input.key_event(KeyCode::Digit9, true);
        scene.update(&input, 0.016);
        assert_eq!(scene.active_camera_index(), 2);
    }

    #[test]
    fn only_active_camera_moves() {
        let mut scene = scene();
        scene.set_active_camera(1);
        let mut input = Input::new();
        input.key_event(KeyCode::KeyD, true);
        scene.update(&input, 1.0);

        assert_eq!(scene.cameras()[0].transform().position(), Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(scene.cameras()[1].transform().position(), Vec3::new(4.0, 0.0, -4.0));
    }

    #[test]
    fn resize_reaches_every_camera() {
        let mut scene = scene();
        let before: Vec<_> = scene.cameras().iter().map(Camera::projection).collect();
        scene.on_resize(0.5);
        for (camera, old) in scene.cameras().iter().zip(before) {
            assert_ne!(camera.projection(), old);
        }
    }

    #[test]
    fn shared_material_edits_are_shared() {
        let mut scene = scene();
        let material = scene.add_material(Material::new(
            Vec4::ONE,
            0.5,
            Vec2::ONE,
            Vec2::ZERO,
            ShaderId(0),
            ShaderId(1),
        ));
        scene.add_entity(Entity::new(MeshId(0), material));
        scene.add_entity(Entity::new(MeshId(1), material));

        if let Some(shared) = scene.material_mut(material) {
            shared.set_roughness(0.1);
        }
        for entity in scene.entities() {
            let roughness = scene.material(entity.material()).map(Material::roughness);
            assert_eq!(roughness, Some(0.1));
        }
    }
}

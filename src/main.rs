//! Demo scene: four textured primitives on a large floor cube, five lights,
//! three cameras (keys 1-3) and a procedural sky.
//!
//! Controls: WASD to move, Space/Shift for up/down, hold the left mouse
//! button to look around, Escape to quit. Set `RUST_LOG=debug` for details.

use glint::{
    AppConfig, Camera, ColorSpace, Entity, Light, LightSet, Material, MeshData, SamplerKind,
    Scene, SetupContext, ShadowMap, Sky, TextureData, Vec2, Vec3, Vec4,
};

const SHADOW_MAP_RESOLUTION: u32 = 1024;

/// Texture set for one surface type.
struct Surface {
    albedo: TextureData,
    normal: TextureData,
    roughness: TextureData,
    metalness: TextureData,
}

fn surfaces() -> [(&'static str, Surface); 5] {
    [
        (
            "bronze",
            Surface {
                albedo: TextureData::speckle(64, 1, 150, 20).tinted([205, 127, 50]),
                normal: TextureData::flat_normal(),
                roughness: TextureData::speckle(64, 2, 90, 40),
                metalness: TextureData::solid([255, 255, 255, 255]),
            },
        ),
        (
            "cobblestone",
            Surface {
                albedo: TextureData::checker(128, 8, [120, 118, 112, 255], [88, 86, 82, 255]),
                normal: TextureData::flat_normal(),
                roughness: TextureData::speckle(64, 3, 230, 20),
                metalness: TextureData::solid([0, 0, 0, 255]),
            },
        ),
        (
            "floor",
            Surface {
                albedo: TextureData::checker(128, 4, [180, 180, 185, 255], [60, 60, 66, 255]),
                normal: TextureData::flat_normal(),
                roughness: TextureData::speckle(64, 4, 160, 30),
                metalness: TextureData::solid([255, 255, 255, 255]),
            },
        ),
        (
            "paint",
            Surface {
                albedo: TextureData::solid([40, 90, 200, 255]),
                normal: TextureData::flat_normal(),
                roughness: TextureData::speckle(64, 5, 120, 10),
                metalness: TextureData::solid([0, 0, 0, 255]),
            },
        ),
        (
            "scratched",
            Surface {
                albedo: TextureData::speckle(64, 6, 170, 40),
                normal: TextureData::flat_normal(),
                roughness: TextureData::speckle(64, 7, 100, 90),
                metalness: TextureData::solid([255, 255, 255, 255]),
            },
        ),
    ]
}

fn build_scene(ctx: &mut SetupContext) -> glint::Result<Scene> {
    let aspect = ctx.aspect();
    let cameras = vec![
        Camera::new(aspect, Vec3::new(0.0, 0.0, -4.0), 45f32.to_radians(), 0.01, 1000.0, 3.0, 0.01, false),
        Camera::new(aspect, Vec3::new(0.0, 2.0, -3.0), 108f32.to_radians(), 0.1, 100.0, 3.0, 0.01, false),
        Camera::new(aspect, Vec3::new(1.0, -2.0, -5.0), 140f32.to_radians(), 0.1, 150.0, 3.0, 0.01, false),
    ];

    let sun_direction = Vec3::Y;
    let lights = LightSet::new(
        Vec3::new(0.969, 0.6, 0.0) * 0.1,
        [
            Light::directional(sun_direction, Vec3::new(1.0, 0.0, 0.0), 5.0),
            Light::directional(Vec3::NEG_Y, Vec3::new(0.0, 1.0, 0.0), 5.0),
            Light::directional(Vec3::NEG_X, Vec3::new(0.0, 0.0, 1.0), 5.0),
            Light::point(Vec3::new(-3.0, 2.0, -2.0), Vec3::new(0.0, 0.5, 0.8), 5.0, 10.0),
            Light::point(Vec3::new(3.0, -2.0, -2.0), Vec3::new(0.8, 0.5, 0.0), 5.0, 10.0),
        ],
    );
    let shadow_map = ShadowMap::from_directional(sun_direction, SHADOW_MAP_RESOLUTION);

    let shaders = ctx.shaders;
    let sampler = ctx.sampler(SamplerKind::Filtering);

    let sky_faces = TextureData::sky_faces(128, [200, 215, 230], [60, 110, 190], [70, 60, 50]);
    let sky = Sky::new(
        ctx.mesh(&MeshData::cube()),
        ctx.cube_texture(&sky_faces, "Sky")?,
        sampler,
        shaders.sky_vertex,
        shaders.sky_pixel,
    );

    let mut scene = Scene::new(cameras, lights, shadow_map)?.with_sky(sky);

    let mut materials = Vec::new();
    for (name, surface) in surfaces() {
        let mut material = Material::new(
            Vec4::ONE,
            0.99,
            Vec2::splat(2.0),
            Vec2::ZERO,
            shaders.main_vertex,
            shaders.main_pixel,
        );
        material.add_sampler("BasicSampler", sampler);
        material.add_texture("Albedo", ctx.texture(&surface.albedo, ColorSpace::Srgb, name));
        material.add_texture("NormalMap", ctx.texture(&surface.normal, ColorSpace::Linear, name));
        material.add_texture("RoughnessMap", ctx.texture(&surface.roughness, ColorSpace::Linear, name));
        material.add_texture("MetalnessMap", ctx.texture(&surface.metalness, ColorSpace::Linear, name));
        materials.push(scene.add_material(material));
    }

    let meshes = [
        MeshData::sphere(32, 16),
        MeshData::torus(0.4, 0.15, 32, 16),
        MeshData::cylinder(32),
        MeshData::torus(0.35, 0.1, 24, 12),
        MeshData::cube(),
    ];
    let positions = [
        Vec3::new(-5.0, 0.0, 0.0),
        Vec3::new(-2.5, 0.0, 0.0),
        Vec3::ZERO,
        Vec3::new(2.5, 0.0, 0.0),
        Vec3::new(0.0, -12.0, 0.0),
    ];
    for ((data, position), material) in meshes.iter().zip(positions).zip(materials) {
        let mut entity = Entity::new(ctx.mesh(data), material);
        entity.transform_mut().set_position(position);
        scene.add_entity(entity);
    }

    // Standing ring and floor
    let entities = scene.entities_mut();
    entities[3]
        .transform_mut()
        .set_rotation(Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0));
    entities[4].transform_mut().set_scale(Vec3::splat(10.0));

    Ok(scene)
}

fn main() -> glint::Result<()> {
    env_logger::init();

    glint::run(
        AppConfig::new()
            .title("Glint")
            .size(1280, 720)
            .shadow_map_resolution(SHADOW_MAP_RESOLUTION),
        build_scene,
    )
}

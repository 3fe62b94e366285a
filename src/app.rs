use std::sync::Arc;
use std::time::Instant;

use glam::Vec4;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::device::{BuiltinShaders, WgpuDevice};
use crate::error::{GlintError, Result};
use crate::gpu::GpuContext;
use crate::handles::{MeshId, SamplerId, TextureId};
use crate::input::Input;
use crate::mesh::MeshData;
use crate::renderer::FrameRenderer;
use crate::scene::{FrameControl, Scene};
use crate::shader::SamplerKind;
use crate::texture::{ColorSpace, TextureData};

/// Seconds between stats refreshes in the window title.
const STATS_INTERVAL: f32 = 0.5;

/// Resource creation available while building the scene.
pub struct SetupContext<'a> {
    pub device: &'a mut WgpuDevice,
    pub shaders: BuiltinShaders,
}

impl SetupContext<'_> {
    /// Aspect ratio of the window, for camera projections.
    pub fn aspect(&self) -> f32 {
        self.device.aspect()
    }

    pub fn mesh(&mut self, data: &MeshData) -> MeshId {
        self.device.add_mesh(data)
    }

    pub fn texture(&mut self, data: &TextureData, color_space: ColorSpace, label: &str) -> TextureId {
        self.device.add_texture(data, color_space, label)
    }

    pub fn texture_from_file(&mut self, path: &str, color_space: ColorSpace) -> Result<TextureId> {
        self.device.load_texture(path, color_space)
    }

    pub fn cube_texture(&mut self, faces: &[TextureData], label: &str) -> Result<TextureId> {
        self.device.add_cube_texture(faces, label)
    }

    pub fn sampler(&mut self, kind: SamplerKind) -> SamplerId {
        self.device.add_sampler(kind)
    }
}

/// Configuration for the app window and renderer.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub shadow_map_resolution: u32,
    pub clear_color: Vec4,
    /// Show FPS and camera state in the window title.
    pub show_stats: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Glint".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            shadow_map_resolution: 1024,
            clear_color: Vec4::new(0.4, 0.6, 0.75, 1.0),
            show_stats: true,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn shadow_map_resolution(mut self, resolution: u32) -> Self {
        self.shadow_map_resolution = resolution.max(1);
        self
    }

    pub fn clear_color(mut self, color: Vec4) -> Self {
        self.clear_color = color;
        self
    }

    pub fn show_stats(mut self, show: bool) -> Self {
        self.show_stats = show;
        self
    }
}

/// Opens a window, builds the scene with `setup` and runs the frame loop
/// until the window closes or the scene asks to quit.
///
/// # Example
/// ```ignore
/// glint::run(AppConfig::new().title("Demo"), |ctx| {
///     let cube = ctx.mesh(&MeshData::cube());
///     let camera = Camera::new(ctx.aspect(), Vec3::new(0.0, 0.0, -5.0), 0.8, 0.1, 100.0, 5.0, 0.005, false);
///     let mut scene = Scene::new(vec![camera], LightSet::new(Vec3::splat(0.1), []), ShadowMap::from_directional(Vec3::NEG_Y, 1024))?;
///     // ...
///     Ok(scene)
/// })
/// ```
pub fn run<S>(config: AppConfig, setup: S) -> Result<()>
where
    S: FnOnce(&mut SetupContext) -> Result<Scene> + 'static,
{
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GlintApp::Pending {
        config,
        setup: Some(Box::new(setup)),
    };
    event_loop.run_app(&mut app)?;

    match app {
        GlintApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

type SetupFn = Box<dyn FnOnce(&mut SetupContext) -> Result<Scene>>;

struct Running {
    window: Arc<Window>,
    device: WgpuDevice,
    renderer: FrameRenderer,
    scene: Scene,
    input: Input,
    config: AppConfig,
    last_frame: Instant,
    stats: FrameStats,
}

enum GlintApp {
    Pending {
        config: AppConfig,
        setup: Option<SetupFn>,
    },
    Running(Box<Running>),
    Failed(GlintError),
}

impl GlintApp {
    fn start(event_loop: &ActiveEventLoop, config: AppConfig, setup: SetupFn) -> Result<Running> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone(), config.vsync)?;
        let mut device = WgpuDevice::new(gpu, config.shadow_map_resolution);
        let shaders = BuiltinShaders::load(&mut device);

        let scene = setup(&mut SetupContext {
            device: &mut device,
            shaders,
        })?;
        log::info!(
            "scene ready: {} entities, {} cameras, {} lights",
            scene.entities().len(),
            scene.cameras().len(),
            scene.lights().len()
        );

        Ok(Running {
            window,
            device,
            renderer: FrameRenderer::new(shaders.shadow_vertex, config.clear_color),
            scene,
            input: Input::new(),
            config,
            last_frame: Instant::now(),
            stats: FrameStats::default(),
        })
    }
}

impl ApplicationHandler for GlintApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let GlintApp::Pending { config, setup } = self else {
            return;
        };
        let Some(setup) = setup.take() else {
            return;
        };

        *self = match GlintApp::start(event_loop, config.clone(), setup) {
            Ok(running) => {
                running.window.request_redraw();
                GlintApp::Running(Box::new(running))
            }
            Err(err) => {
                log::error!("startup failed: {err}");
                event_loop.exit();
                GlintApp::Failed(err)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let GlintApp::Running(app) = self else {
            return;
        };

        app.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    app.device.resize(size.width, size.height);
                    app.scene.on_resize(app.device.aspect());
                    log::debug!("resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(app.last_frame).as_secs_f32();
                app.last_frame = now;

                if app.scene.update(&app.input, dt) == FrameControl::Quit {
                    log::info!("quit requested");
                    event_loop.exit();
                    return;
                }

                if let Err(err) = app.renderer.draw(&app.scene, &mut app.device) {
                    log::error!("frame failed: {err}");
                }

                if app.config.show_stats && app.stats.tick(dt) {
                    app.window.set_title(&app.stats.title(&app.config.title, &app.scene, &app.device));
                }

                app.input.end_frame();
                app.window.request_redraw();
            }
            _ => {}
        }
    }
}

/// Frame counter behind the window title stats.
#[derive(Debug, Default)]
struct FrameStats {
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FrameStats {
    /// Counts a frame; true when the stats were refreshed.
    fn tick(&mut self, dt: f32) -> bool {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < STATS_INTERVAL {
            return false;
        }
        self.fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        true
    }

    fn title(&self, base: &str, scene: &Scene, device: &WgpuDevice) -> String {
        let camera = scene.active_camera();
        let position = camera.transform().position();
        let gpu = device.gpu();
        format!(
            "{base} | {:.0} fps | {}x{} | camera {} at ({:.1}, {:.1}, {:.1}) fov {:.0}°",
            self.fps,
            gpu.width(),
            gpu.height(),
            scene.active_camera_index() + 1,
            position.x,
            position.y,
            position.z,
            camera.field_of_view().to_degrees()
        )
    }
}

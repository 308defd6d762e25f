use glam::{Quat, Vec3};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::asset::Assets;
use crate::renderer::{
    primitives, AlphaMode, Material, Renderer, Texture,
};
use crate::scene::{
    Camera, Light, LightKind, RenderableKind, Scene, Transform, TransformComponent,
};
use crate::settings::RenderSettings;
use crate::time::FrameTimer;

/// Orbit state for the editor camera (Tab toggles it in).
struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    radius: f32,
}

impl OrbitCamera {
    fn camera(&self, target: Vec3) -> Camera {
        let rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
        let eye = target + rotation * Vec3::new(0.0, 0.0, self.radius);
        Camera {
            eye,
            target,
            ..Camera::default()
        }
    }
}

pub struct App {
    window: Option<Window>,
    window_id: Option<WindowId>,
    renderer: Option<Renderer>,
    assets: Assets,
    scene: Scene,
    timer: FrameTimer,
    main_camera: Camera,
    orbit: OrbitCamera,
    editor_camera_active: bool,
    atlas_page: Option<u32>,
    spinner: Option<hecs::Entity>,
}

impl App {
    pub fn new() -> Self {
        Self {
            window: None,
            window_id: None,
            renderer: None,
            assets: Assets::new(),
            scene: Scene::new(),
            timer: FrameTimer::new(),
            main_camera: Camera {
                eye: Vec3::new(0.0, 6.0, 14.0),
                target: Vec3::new(0.0, 1.0, 0.0),
                ..Camera::default()
            },
            orbit: OrbitCamera {
                yaw: 0.6,
                pitch: -0.5,
                radius: 18.0,
            },
            editor_camera_active: false,
            atlas_page: None,
            spinner: None,
        }
    }

    fn build_demo_scene(&mut self, renderer: &Renderer) {
        let device = renderer.device();
        let queue = renderer.queue();

        let (cube_vertices, cube_indices) = primitives::cube_mesh(0.5);
        let cube = self.assets.meshes.get_or_insert_with("meshes/cube", || {
            crate::asset::Mesh::from_vertices(device, &cube_vertices, &cube_indices)
        });
        let (ground_vertices, ground_indices) = primitives::plane_mesh(20.0);
        let ground_mesh = self.assets.meshes.get_or_insert_with("meshes/ground", || {
            crate::asset::Mesh::from_vertices(device, &ground_vertices, &ground_indices)
        });

        let checker = self.assets.textures.get_or_insert_with("textures/checker", || {
            let mut pixels = Vec::with_capacity(8 * 8 * 4);
            for y in 0..8u32 {
                for x in 0..8u32 {
                    let value = if (x + y) % 2 == 0 { 200u8 } else { 90u8 };
                    pixels.extend_from_slice(&[value, value, value, 255]);
                }
            }
            Texture::from_pixels(device, queue, "textures/checker", 8, 8, &pixels)
        });

        let ground_material = self.assets.materials.get_or_insert_with("materials/ground", || {
            Material::new()
                .with_albedo(Vec3::new(0.55, 0.55, 0.6))
                .with_albedo_texture(checker)
        });
        let character_material =
            self.assets.materials.get_or_insert_with("materials/character", || {
                Material::new().with_albedo(Vec3::new(0.8, 0.25, 0.2))
            });
        let companion_material =
            self.assets.materials.get_or_insert_with("materials/companion", || {
                Material::new()
                    .with_albedo(Vec3::new(0.35, 0.2, 0.6))
                    .with_emissive(Vec3::new(0.15, 0.0, 0.3))
            });
        let crate_material = self.assets.materials.get_or_insert_with("materials/crate", || {
            Material::new()
                .with_albedo(Vec3::new(0.6, 0.45, 0.25))
                .with_albedo_texture(checker)
        });
        let glass_material = self.assets.materials.get_or_insert_with("materials/glass", || {
            Material::new()
                .with_alpha_mode(AlphaMode::Blend)
                .with_albedo(Vec3::new(0.4, 0.7, 0.9))
                .with_two_sided()
        });

        self.scene.spawn_renderable(
            RenderableKind::WorldObject,
            "ground",
            Transform::IDENTITY,
            Some(ground_mesh),
            Some(ground_material),
        );
        self.scene.spawn_renderable(
            RenderableKind::Character,
            "character",
            Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)),
            Some(cube),
            Some(character_material),
        );
        self.scene.spawn_renderable(
            RenderableKind::Companion,
            "companion",
            Transform::from_translation(Vec3::new(2.5, 0.5, -1.5)),
            Some(cube),
            Some(companion_material),
        );

        // A stacked crate exercises hierarchical transforms.
        let base = self.scene.spawn_renderable(
            RenderableKind::WorldObject,
            "crate base",
            Transform::from_translation(Vec3::new(-3.0, 0.5, 2.0)),
            Some(cube),
            Some(crate_material),
        );
        let top = self.scene.spawn_renderable(
            RenderableKind::WorldObject,
            "crate top",
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            Some(cube),
            Some(crate_material),
        );
        self.scene.set_parent(top, base);
        self.spinner = Some(base);

        self.scene.spawn_renderable(
            RenderableKind::WorldObject,
            "glass pane",
            Transform::from_trs(
                Vec3::new(1.5, 1.0, 3.0),
                Quat::IDENTITY,
                Vec3::new(2.0, 2.0, 0.1),
            ),
            Some(cube),
            Some(glass_material),
        );

        // Nine lights: two shadow-casting spots plus a ring of points, so the
        // lighting loop runs two batches every frame.
        let spot_down = |position: Vec3| {
            Transform::from_trs(
                position,
                Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
                Vec3::ONE,
            )
        };
        self.scene.add_light(
            Light::new(
                LightKind::Spot {
                    cone_angle: 45f32.to_radians(),
                    cone_exp: 20.0,
                },
                spot_down(Vec3::new(0.0, 8.0, 0.0)),
            )
            .with_color(Vec3::new(1.0, 0.95, 0.8))
            .with_intensity(2.0)
            .with_max_distance(30.0)
            .with_shadows(0.002),
        );
        self.scene.add_light(
            Light::new(
                LightKind::Spot {
                    cone_angle: 30f32.to_radians(),
                    cone_exp: 40.0,
                },
                spot_down(Vec3::new(-3.0, 7.0, 2.0)),
            )
            .with_color(Vec3::new(0.6, 0.7, 1.0))
            .with_intensity(1.5)
            .with_max_distance(25.0)
            .with_shadows(0.002),
        );

        for i in 0..7 {
            let angle = i as f32 / 7.0 * std::f32::consts::TAU;
            let position = Vec3::new(angle.cos() * 8.0, 2.0, angle.sin() * 8.0);
            self.scene.add_light(
                Light::new(LightKind::Point, Transform::from_translation(position))
                    .with_color(Vec3::new(0.9, 0.5 + 0.05 * i as f32, 0.4))
                    .with_intensity(0.6)
                    .with_max_distance(12.0),
            );
        }

        log::info!(
            "Demo scene ready: {} entities, {} lights",
            self.scene.world.len(),
            self.scene.lights.len()
        );
    }

    fn handle_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Named(NamedKey::Tab) => {
                self.editor_camera_active = !self.editor_camera_active;
                log::info!(
                    "Active camera: {}",
                    if self.editor_camera_active {
                        "editor orbit"
                    } else {
                        "main"
                    }
                );
            }
            Key::Named(NamedKey::F1) => {
                self.atlas_page = match self.atlas_page {
                    Some(_) => None,
                    None => Some(0),
                };
            }
            Key::Named(NamedKey::PageUp) => {
                if let Some(page) = &mut self.atlas_page {
                    *page = page.saturating_add(1);
                }
            }
            Key::Named(NamedKey::PageDown) => {
                if let Some(page) = &mut self.atlas_page {
                    *page = page.saturating_sub(1);
                }
            }
            Key::Named(NamedKey::ArrowLeft) => self.orbit.yaw -= 0.15,
            Key::Named(NamedKey::ArrowRight) => self.orbit.yaw += 0.15,
            Key::Named(NamedKey::ArrowUp) => {
                self.orbit.pitch = (self.orbit.pitch + 0.1).min(-0.05)
            }
            Key::Named(NamedKey::ArrowDown) => {
                self.orbit.pitch = (self.orbit.pitch - 0.1).max(-1.4)
            }
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let dt = self.timer.tick();

        // Spin the crate stack so the hierarchy visibly composes.
        if let Some(spinner) = self.spinner {
            if let Ok(mut transform) = self.scene.world.get::<&mut TransformComponent>(spinner) {
                transform.0.rotation *= Quat::from_rotation_y(dt * 0.8);
            }
        }

        self.scene.update(&self.assets);

        let camera = if self.editor_camera_active {
            self.orbit.camera(self.main_camera.target)
        } else {
            self.main_camera
        };

        match renderer.render(
            &mut self.scene,
            &camera,
            &self.assets,
            self.timer.elapsed(),
            self.atlas_page,
        ) {
            Ok(clamped_page) => {
                if let (Some(page), Some(clamped)) = (&mut self.atlas_page, clamped_page) {
                    *page = clamped;
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(window) = &self.window {
                    renderer.resize(window.inner_size());
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory, shutting down");
                self.window = None;
            }
            Err(err) => log::warn!("Frame skipped: {:?}", err),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let settings = RenderSettings::load();
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("lantern")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        settings.resolution.width,
                        settings.resolution.height,
                    )),
            )
            .expect("create window");
        let id = window.id();

        let renderer = pollster::block_on(Renderer::new(&window, &settings));
        self.build_demo_scene(&renderer);

        window.request_redraw();
        self.window = Some(window);
        self.window_id = Some(id);
        self.renderer = Some(renderer);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if Some(id) != self.window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(&event, event_loop);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use knotfade_common::{ParamError, ParamRange, ShadingParams, Transform};
use knotfade_geometry::{Mesh, TorusKnot};
use knotfade_render_wgpu::{KnotRenderer, OrbitCamera};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser, Debug)]
#[command(
    name = "knotfade-desktop",
    about = "Torus knot with live fresnel, shine and fade controls"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Fade threshold, 0..=1
    #[arg(long, default_value = "0")]
    progress: f32,

    /// Fresnel exponent, -3..=3
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    fresnel_amount: f32,

    /// Shine band width, 0..=1
    #[arg(long, default_value = "0.012")]
    shine_size: f32,

    /// Shine scroll rate, 1..=20
    #[arg(long, default_value = "3")]
    shine_speed: f32,
}

impl Cli {
    fn shading_params(&self) -> Result<ShadingParams> {
        let params = ShadingParams::new(
            self.progress,
            self.fresnel_amount,
            self.shine_size,
            self.shine_speed,
        )
        .context("invalid initial shading parameters")?;
        Ok(params.snapped())
    }
}

/// Application state.
struct AppState {
    params: ShadingParams,
    camera: OrbitCamera,
    knot_transform: Transform,
    show_controls: bool,
    // Input state
    rotating: bool,
    panning: bool,
    viewport_height: f32,
    // Clock
    started: Instant,
    last_frame: Instant,
    fps: f32,
}

impl AppState {
    fn new(params: ShadingParams) -> Self {
        let now = Instant::now();
        Self {
            params,
            camera: OrbitCamera::default(),
            knot_transform: Transform::default(),
            show_controls: true,
            rotating: false,
            panning: false,
            viewport_height: 720.0,
            started: now,
            last_frame: now,
            fps: 0.0,
        }
    }

    /// Seconds since startup; drives the shine animation.
    fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    /// Restart the clock once the window is ready, so setup time is not
    /// counted as the first frame.
    fn restart_clock(&mut self) {
        let now = Instant::now();
        self.started = now;
        self.last_frame = now;
        self.fps = 0.0;
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().max(1e-4);
        self.last_frame = now;
        self.fps = if self.fps == 0.0 {
            1.0 / dt
        } else {
            self.fps * 0.9 + 0.1 / dt
        };

        self.camera.update();
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.aspect = width.max(1) as f32 / height.max(1) as f32;
        self.viewport_height = height.max(1) as f32;
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            return;
        }

        match key {
            KeyCode::F1 => {
                self.show_controls = !self.show_controls;
            }
            KeyCode::KeyR => {
                self.params = ShadingParams::default();
                tracing::info!("shading parameters reset");
            }
            _ => {}
        }
    }

    fn handle_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.rotating = pressed,
            MouseButton::Right => self.panning = pressed,
            _ => {}
        }
    }

    fn handle_motion(&mut self, dx: f32, dy: f32) {
        if self.rotating {
            self.camera.rotate(dx, dy);
        }
        if self.panning {
            self.camera.pan(dx, dy, self.viewport_height);
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_controls {
            return;
        }

        egui::SidePanel::right("controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Knot Shader");
                ui.separator();

                let p = &mut self.params;
                if let Some(v) = param_slider(ui, p.progress, ShadingParams::PROGRESS) {
                    log_rejected(p.set_progress(v));
                }
                if let Some(v) =
                    param_slider(ui, p.fresnel_amount, ShadingParams::FRESNEL_AMOUNT)
                {
                    log_rejected(p.set_fresnel_amount(v));
                }
                if let Some(v) = param_slider(ui, p.shine_size, ShadingParams::SHINE_SIZE) {
                    log_rejected(p.set_shine_size(v));
                }
                if let Some(v) = param_slider(ui, p.shine_speed, ShadingParams::SHINE_SPEED) {
                    log_rejected(p.set_shine_speed(v));
                }

                if ui.button("Reset (R)").clicked() {
                    self.params = ShadingParams::default();
                }

                ui.separator();
                ui.label(format!(
                    "Time: {:.2}s  FPS: {:.0}",
                    self.elapsed(),
                    self.fps
                ));
                ui.label(format!(
                    "Camera: ({:.2}, {:.2}, {:.2})  distance {:.2}",
                    self.camera.position().x,
                    self.camera.position().y,
                    self.camera.position().z,
                    self.camera.distance
                ));
                if ui.button("Reset Camera").clicked() {
                    let aspect = self.camera.aspect;
                    self.camera = OrbitCamera::default();
                    self.camera.aspect = aspect;
                }

                ui.separator();
                ui.small("F1: Toggle Controls | LMB: Orbit | RMB: Pan | Wheel: Zoom");
            });
    }
}

/// Slider over a copy of `value`; returns the snapped new value when dragged.
fn param_slider(ui: &mut egui::Ui, value: f32, range: ParamRange) -> Option<f32> {
    let mut edited = value;
    let response = ui.add(
        egui::Slider::new(&mut edited, range.min..=range.max)
            .step_by(range.step as f64)
            .text(range.name),
    );
    response.changed().then(|| range.snap(edited))
}

fn log_rejected(result: Result<(), ParamError>) {
    if let Err(e) = result {
        tracing::warn!("slider value rejected: {e}");
    }
}

/// Scroll distance in wheel lines. Touchpads report pixels.
fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
    }
}

/// Window, device and renderers, created together once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: KnotRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        window: Arc<Window>,
        egui_ctx: &EguiContext,
        mesh: &Mesh,
        knot_transform: &Transform,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("knotfade_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        // Shader output is display-referred; write it without sRGB encoding.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut renderer =
            KnotRenderer::new(&device, surface_format, config.width, config.height, mesh);
        renderer.set_transform(knot_transform);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend, surface format {:?}",
            adapter.get_info().backend.to_str(),
            surface_format
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn render_frame(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .update_shading(&self.queue, state.elapsed(), &state.params);
        self.renderer
            .render(&self.device, &self.queue, &view, &state.camera);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });

        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    mesh: Mesh,
    initial_size: PhysicalSize<u32>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(params: ShadingParams, mesh: Mesh, initial_size: PhysicalSize<u32>) -> Self {
        Self {
            state: AppState::new(params),
            mesh,
            initial_size,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("knotfade")
            .with_inner_size(self.initial_size);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("create window")?,
        );
        Gpu::new(
            window,
            &self.egui_ctx,
            &self.mesh,
            &self.state.knot_transform,
        )
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.set_viewport(size.width, size.height);
                self.state.restart_clock();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        // A release over the panel must still end a drag.
        if let WindowEvent::MouseInput {
            state: ElementState::Released,
            button,
            ..
        } = event
        {
            self.state.handle_button(button, false);
        }

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
                self.state.set_viewport(new_size.width, new_size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                self.state
                    .handle_button(button, btn_state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.camera.zoom(scroll_lines(delta));
            }
            WindowEvent::RedrawRequested => {
                self.state.update();
                gpu.render_frame(&mut self.state, &self.egui_ctx);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.handle_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let params = cli.shading_params()?;
    let mesh = TorusKnot::default()
        .build()
        .context("build torus knot")?;

    tracing::info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "knotfade-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(params, mesh, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_scene_defaults() {
        let cli = Cli::try_parse_from(["knotfade-desktop"]).unwrap();
        assert_eq!(cli.shading_params().unwrap(), ShadingParams::default());
        assert_eq!((cli.width, cli.height), (1280, 720));
    }

    #[test]
    fn cli_accepts_negative_fresnel() {
        let cli = Cli::try_parse_from(["knotfade-desktop", "--fresnel-amount", "-2.5"]).unwrap();
        assert_eq!(cli.shading_params().unwrap().fresnel_amount, -2.5);
    }

    #[test]
    fn cli_rejects_out_of_range_params() {
        let cli = Cli::try_parse_from(["knotfade-desktop", "--shine-speed", "40"]).unwrap();
        assert!(cli.shading_params().is_err());
    }

    #[test]
    fn scroll_units() {
        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        let pixels = MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(0.0, 100.0));
        assert_eq!(scroll_lines(pixels), 2.0);
    }

    #[test]
    fn drag_buttons_route_to_camera() {
        let mut state = AppState::new(ShadingParams::default());
        let start = state.camera.target;

        state.handle_button(MouseButton::Right, true);
        state.handle_motion(40.0, 0.0);
        assert_ne!(state.camera.target, start);
        state.handle_button(MouseButton::Right, false);

        let moved = state.camera.target;
        state.handle_motion(40.0, 0.0);
        assert_eq!(state.camera.target, moved);
    }

    #[test]
    fn cli_params_snap_to_slider_steps() {
        let cli = Cli::try_parse_from(["knotfade-desktop", "--progress", "0.12345"]).unwrap();
        assert_eq!(cli.shading_params().unwrap().progress, 0.123);
    }

    #[test]
    fn first_frame_after_restart_excludes_setup_time() {
        let mut stale = AppState::new(ShadingParams::default());
        let mut fresh = AppState::new(ShadingParams::default());
        std::thread::sleep(std::time::Duration::from_millis(100));

        stale.update();
        assert!(stale.fps <= 10.0, "fps {}", stale.fps);

        fresh.restart_clock();
        fresh.update();
        assert!(fresh.fps > 100.0, "fps {}", fresh.fps);
        assert!(fresh.elapsed() < 0.1);
    }

    #[test]
    fn reset_key_restores_defaults() {
        let mut state = AppState::new(ShadingParams::default());
        state.params.progress = 0.7;
        state.handle_key(KeyCode::KeyR, true);
        assert_eq!(state.params, ShadingParams::default());
    }
}

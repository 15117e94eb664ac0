use glam::Vec2;
use rings_core::gpu::RingsRenderer;
use rings_core::{FrameClock, RingScene, SceneParams, TouchPoint};
use std::collections::BTreeMap;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: RingsRenderer,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window, scene: &RingScene) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        log::info!("[gpu] surface {}x{} {:?}", config.width, config.height, format);

        let renderer = RingsRenderer::new(&device, format, scene.rings(), scene.trails());
        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.width as f32, self.config.height as f32)
    }

    fn render(&mut self, scene: &mut RingScene, time: f32) -> Result<(), wgpu::SurfaceError> {
        let (rings, trails) = scene.buffers_mut();
        self.renderer.upload(&self.queue, rings, trails);

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .render(&self.device, &self.queue, &view, self.viewport().to_array(), time);
        frame.present();
        Ok(())
    }
}

/// Touches currently down, re-sent as a whole list on every touch event.
#[derive(Default)]
struct TouchSet {
    active: BTreeMap<u64, Vec2>,
}

impl TouchSet {
    fn apply(&mut self, touch: &Touch) {
        let pos = Vec2::new(touch.location.x as f32, touch.location.y as f32);
        match touch.phase {
            TouchPhase::Started | TouchPhase::Moved => {
                self.active.insert(touch.id, pos);
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.active.remove(&touch.id);
            }
        }
    }

    fn batch(&self) -> Vec<TouchPoint> {
        self.active
            .iter()
            .map(|(id, position)| TouchPoint {
                id: *id,
                position: *position,
            })
            .collect()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Pointer Rings (native)")
        .build(&event_loop)?;

    let size = window.inner_size();
    let viewport = Vec2::new(size.width as f32, size.height as f32);
    let mut scene = RingScene::new(SceneParams::default(), viewport)?;
    let mut state = pollster::block_on(GpuState::new(&window, &scene))?;
    let mut clock = FrameClock::new();
    let mut cursor = Vec2::ZERO;
    let mut touches = TouchSet::default();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => {
                state.resize(size);
                scene.set_viewport(state.viewport());
            }
            WindowEvent::CloseRequested => {
                scene.shutdown();
                elwt.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                cursor = Vec2::new(position.x as f32, position.y as f32);
                scene.on_pointer_move(clock.now_ms(), cursor);
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ElementState::Pressed => scene.on_pointer_down(clock.now_ms(), cursor),
                ElementState::Released => scene.on_pointer_up(clock.now_ms(), cursor),
            },
            WindowEvent::Touch(touch) => {
                touches.apply(&touch);
                scene.on_touch_batch(clock.now_ms(), &touches.batch());
            }
            _ => {}
        },
        Event::AboutToWait => {
            let time = clock.tick();
            scene.advance(time.dt, time.elapsed_sec);
            match state.render(&mut scene, time.elapsed_sec) {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::warn!("surface error: {:?}", e),
            }
        }
        _ => {}
    })?;
    Ok(())
}

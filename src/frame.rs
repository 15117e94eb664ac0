use crate::audio::WebVoiceHooks;
use crate::events::SharedScene;
use crate::mapping;
use crate::render;
use glam::Vec2;
use rings_core::{FrameClock, RingEventBuffer, RingScene, TrailLineBuffer};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub scene: SharedScene,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState>,
    pub clock: FrameClock,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let time = self.clock.tick();
        let w = self.canvas.width();
        let h = self.canvas.height();
        let size = Vec2::new(w as f32, h as f32);

        let mut scene = self.scene.borrow_mut();
        scene.set_viewport(size);
        let summary = scene.advance(time.dt, time.elapsed_sec);
        if summary.rings_spawned > 0 {
            log::trace!(
                "[frame] {} rings spawned, {} voices playing",
                summary.rings_spawned,
                scene.tracker().hooks().active_voices()
            );
        }

        update_voices(&mut scene, size);

        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(w, h);
            let (rings, trails) = scene.buffers_mut();
            if let Err(e) = g.render(rings, trails, time.elapsed_sec) {
                log::error!("render error: {:?}", e);
            }
        }
    }
}

fn update_voices(scene: &mut RingScene<WebVoiceHooks>, canvas: Vec2) {
    let tracker = scene.tracker_mut();
    let now = tracker.hooks().current_time();
    for slot in tracker.resources_mut() {
        if let Some(voice) = slot.resource.as_ref() {
            voice.apply(now, mapping::voice_params(slot.position, slot.velocity, canvas));
        }
    }
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
    rings: &RingEventBuffer,
    trails: &TrailLineBuffer,
) -> Option<render::GpuState> {
    match render::GpuState::new(canvas, rings, trails).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

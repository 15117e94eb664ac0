#![cfg(target_arch = "wasm32")]
use glam::Vec2;
use rings_core::{FrameClock, RingScene, SceneParams};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod mapping;
mod render;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("rings-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas_el = document
        .get_element_by_id(constants::CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", constants::CANVAS_ID))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    // Maintain canvas internal pixel size to match CSS size * devicePixelRatio
    dom::wire_canvas_resize(&canvas);

    let audio_ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let hooks = audio::WebVoiceHooks::new(audio_ctx)?;
    let viewport = Vec2::new(canvas.width() as f32, canvas.height() as f32);
    let scene = RingScene::with_hooks(SceneParams::default(), viewport, hooks)?;

    // GPU is set up before the scene is shared, so no borrow spans the await
    let gpu = frame::init_gpu(&canvas, scene.rings(), scene.trails()).await;
    let scene = Rc::new(RefCell::new(scene));

    events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        scene: scene.clone(),
    });

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        scene,
        canvas,
        gpu,
        clock: FrameClock::new(),
    }));
    frame::start_loop(frame_ctx);
    log::info!("[init] ready");
    Ok(())
}

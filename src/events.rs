use crate::audio::WebVoiceHooks;
use crate::input;
use glam::Vec2;
use rings_core::{RingScene, TouchPoint};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type SharedScene = Rc<RefCell<RingScene<WebVoiceHooks>>>;

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub scene: SharedScene,
}

pub fn wire_input_handlers(w: InputWiring) {
    for name in ["touchstart", "touchmove", "touchend", "touchcancel"] {
        wire_touch(&w, name);
    }
    wire_mousedown(&w);
    wire_mousemove(&w);
    wire_mouseup(&w);
}

fn canvas_px(canvas: &web::HtmlCanvasElement, client_x: i32, client_y: i32) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    input::client_to_canvas_px(
        Vec2::new(client_x as f32, client_y as f32),
        Vec2::new(rect.left() as f32, rect.top() as f32),
        Vec2::new(rect.width() as f32, rect.height() as f32),
        Vec2::new(canvas.width() as f32, canvas.height() as f32),
    )
}

// Non-passive so preventDefault can stop scrolling and synthetic mouse events.
fn listen_active(target: &web::EventTarget, name: &str, closure: &Closure<dyn FnMut(web::Event)>) {
    let opts = web::AddEventListenerOptions::new();
    opts.set_passive(false);
    if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
        name,
        closure.as_ref().unchecked_ref(),
        &opts,
    ) {
        log::error!("[events] {} listener: {:?}", name, e);
    }
}

// Every touch event carries the full list of touches still down; the tracker
// diffs it against its own set, so start/move/end/cancel share one handler.
fn wire_touch(w: &InputWiring, name: &str) {
    let w_inner = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        let Some(ev) = ev.dyn_ref::<web::TouchEvent>() else {
            return;
        };
        ev.prevent_default();
        let touches = ev.touches();
        let mut batch: SmallVec<[TouchPoint; 10]> = SmallVec::new();
        for i in 0..touches.length() {
            if let Some(t) = touches.item(i) {
                batch.push(TouchPoint {
                    id: input::touch_key(t.identifier()),
                    position: canvas_px(&w_inner.canvas, t.client_x(), t.client_y()),
                });
            }
        }
        let mut scene = w_inner.scene.borrow_mut();
        scene.tracker().hooks().resume();
        scene.on_touch_batch(ev.time_stamp(), &batch);
    }) as Box<dyn FnMut(web::Event)>);
    listen_active(&w.canvas, name, &closure);
    closure.forget();
}

fn wire_mousedown(w: &InputWiring) {
    let w_inner = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        let Some(ev) = ev.dyn_ref::<web::MouseEvent>() else {
            return;
        };
        ev.prevent_default();
        let pos = canvas_px(&w_inner.canvas, ev.client_x(), ev.client_y());
        let mut scene = w_inner.scene.borrow_mut();
        scene.tracker().hooks().resume();
        scene.on_pointer_down(ev.time_stamp(), pos);
    }) as Box<dyn FnMut(web::Event)>);
    listen_active(&w.canvas, "mousedown", &closure);
    closure.forget();
}

// move and up go on the window so a drag released off the canvas still ends
fn wire_mousemove(w: &InputWiring) {
    let w_inner = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
        let pos = canvas_px(&w_inner.canvas, ev.client_x(), ev.client_y());
        w_inner
            .scene
            .borrow_mut()
            .on_pointer_move(ev.time_stamp(), pos);
    }) as Box<dyn FnMut(web::MouseEvent)>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_mouseup(w: &InputWiring) {
    let w_inner = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
        let pos = canvas_px(&w_inner.canvas, ev.client_x(), ev.client_y());
        w_inner.scene.borrow_mut().on_pointer_up(ev.time_stamp(), pos);
    }) as Box<dyn FnMut(web::MouseEvent)>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

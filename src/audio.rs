use crate::constants::{MASTER_GAIN, MAX_VOICES, VOICE_RELEASE_SEC, VOICE_SMOOTH_SEC};
use crate::mapping::{VoiceBudget, VoiceParams};
use glam::Vec2;
use rings_core::{PointerId, TrackHooks};
use wasm_bindgen::JsValue;
use web_sys as web;

/// One sine oscillator bound to a pointer: osc -> gain -> panner -> master.
pub struct Voice {
    osc: web::OscillatorNode,
    gain: web::GainNode,
    panner: web::StereoPannerNode,
}

impl Voice {
    fn start(ctx: &web::AudioContext, master: &web::GainNode) -> Result<Self, JsValue> {
        let osc = web::OscillatorNode::new(ctx)?;
        osc.set_type(web::OscillatorType::Sine);
        let gain = web::GainNode::new(ctx)?;
        gain.gain().set_value(0.0);
        let panner = web::StereoPannerNode::new(ctx)?;
        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&panner)?;
        panner.connect_with_audio_node(master)?;
        osc.start_with_when(ctx.current_time())?;
        Ok(Self { osc, gain, panner })
    }

    pub fn apply(&self, now: f64, params: VoiceParams) {
        _ = self
            .osc
            .frequency()
            .set_target_at_time(params.frequency_hz, now, VOICE_SMOOTH_SEC);
        _ = self
            .gain
            .gain()
            .set_target_at_time(params.gain, now, VOICE_SMOOTH_SEC);
        self.panner.pan().set_value(params.pan);
    }

    fn release(self, now: f64) {
        _ = self
            .gain
            .gain()
            .set_target_at_time(0.0, now, VOICE_RELEASE_SEC / 3.0);
        _ = self.osc.stop_with_when(now + VOICE_RELEASE_SEC);
    }
}

/// Binds a Web Audio voice to each pointer track for as long as it lives.
pub struct WebVoiceHooks {
    ctx: web::AudioContext,
    master: web::GainNode,
    budget: VoiceBudget,
}

impl WebVoiceHooks {
    pub fn new(ctx: web::AudioContext) -> anyhow::Result<Self> {
        let master = web::GainNode::new(&ctx).map_err(|e| anyhow::anyhow!("{:?}", e))?;
        master.gain().set_value(MASTER_GAIN);
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Self {
            ctx,
            master,
            budget: VoiceBudget::new(MAX_VOICES),
        })
    }

    /// Browsers keep the context suspended until a user gesture.
    pub fn resume(&self) {
        _ = self.ctx.resume();
    }

    pub fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    pub fn active_voices(&self) -> usize {
        self.budget.active()
    }
}

impl TrackHooks for WebVoiceHooks {
    type Resource = Option<Voice>;

    fn on_create(&mut self, id: PointerId, _position: Vec2) -> Option<Voice> {
        if !self.budget.try_acquire() {
            log::debug!(
                "[audio] all {} voices busy, {:?} stays silent",
                self.budget.max(),
                id
            );
            return None;
        }
        match Voice::start(&self.ctx, &self.master) {
            Ok(v) => Some(v),
            Err(e) => {
                self.budget.release();
                log::error!("[audio] voice for {:?} failed: {:?}", id, e);
                None
            }
        }
    }

    fn on_destroy(&mut self, _id: PointerId, resource: Option<Voice>) {
        if let Some(voice) = resource {
            voice.release(self.ctx.current_time());
            self.budget.release();
        }
    }
}

//! Audio cues via the Web Audio API
//!
//! Procedurally generated tones - no sample files. Playback failures are
//! swallowed so the simulation never stalls on audio.

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::sim::SoundCue;

/// Plays a short oscillator sweep per game cue
pub struct AudioPlayer {
    ctx: Option<AudioContext>,
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer {
    pub fn new() -> Self {
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    /// Resume the context (browsers require a user gesture first)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Play the sweep mapped to a cue
    pub fn play(&self, cue: SoundCue) {
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        // (start Hz, end Hz, seconds, waveform)
        let (from, to, secs, wave) = match cue {
            SoundCue::Flap => (200.0, 400.0, 0.2, OscillatorType::Square),
            SoundCue::CoinGrab => (800.0, 1000.0, 0.1, OscillatorType::Sine),
            SoundCue::PipePass => (300.0, 350.0, 0.15, OscillatorType::Square),
            SoundCue::Crash => (200.0, 150.0, 0.2, OscillatorType::Sine),
            SoundCue::BoostReady => (500.0, 600.0, 0.3, OscillatorType::Sawtooth),
            SoundCue::PowerUp => (600.0, 800.0, 0.2, OscillatorType::Sine),
            SoundCue::HeartGrab => (700.0, 900.0, 0.15, OscillatorType::Triangle),
            SoundCue::Victory => (1000.0, 1200.0, 0.5, OscillatorType::Sine),
        };
        self.sweep(ctx, from, to, secs, wave);
    }

    fn sweep(&self, ctx: &AudioContext, from: f32, to: f32, secs: f64, wave: OscillatorType) {
        let Some((osc, gain)) = create_osc(ctx, from, wave) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.3, t).ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .linear_ramp_to_value_at_time(to, t + secs)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + secs).ok();
    }
}

/// Create an oscillator wired through a gain node
fn create_osc(
    ctx: &AudioContext,
    freq: f32,
    osc_type: OscillatorType,
) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(osc_type);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;

    Some((osc, gain))
}

//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and a synthesized siren loop - no
//! external files needed!

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Run starts from the title screen
    EngineRev,
    /// The crash that ends a run
    Crash,
    /// New best score
    HighScore,
    /// Restarting after a crash
    Restart,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Gain node of the running siren loop; the oscillators behind it keep
    /// themselves alive in the audio graph once started
    siren_gain: Option<GainNode>,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            siren_gain: None,
            music_volume: 0.5,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
        self.apply_music_gain();
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_music_gain();
    }

    fn effective_sfx_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume }
    }

    fn effective_music_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume }
    }

    fn apply_music_gain(&self) {
        if let Some(gain) = &self.siren_gain {
            gain.gain().set_value(self.effective_music_volume() * 0.15);
        }
    }

    /// Is the siren loop running?
    pub fn music_started(&self) -> bool {
        self.siren_gain.is_some()
    }

    /// Start the endless siren wail. Safe to call repeatedly; the loop keeps
    /// running for the life of the page, volume-controlled by settings.
    pub fn start_music(&mut self) {
        if self.siren_gain.is_some() {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        self.siren_gain = build_siren(ctx);
        self.apply_music_gain();
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_sfx_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require a user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::EngineRev => self.play_engine_rev(ctx, vol),
            SoundEffect::Crash => self.play_crash(ctx, vol),
            SoundEffect::HighScore => self.play_high_score(ctx, vol),
            SoundEffect::Restart => self.play_restart(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
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

    /// Engine rev - rising growl as the run starts
    fn play_engine_rev(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 90.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.45)
            .ok();
        osc.frequency().set_value_at_time(90.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(340.0, t + 0.35)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();
    }

    /// Crash - low boom with a metallic crack on top
    fn play_crash(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        // Body of the impact
        if let Some((osc, gain)) = self.create_osc(ctx, 110.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.45)
                .ok();
            osc.frequency().set_value_at_time(110.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.45)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();
        }

        // Sheet-metal crack
        if let Some((osc, gain)) = self.create_osc(ctx, 1700.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.18, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(1700.0, t).ok();
            osc.frequency().set_value_at_time(900.0, t + 0.03).ok();
            osc.frequency().set_value_at_time(1300.0, t + 0.06).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        // Sub thump
        if let Some((osc, gain)) = self.create_osc(ctx, 50.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }
    }

    /// High score - celebratory ascending chime
    fn play_high_score(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
            let delay = i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }

    /// Restart - short whoosh back onto the road
    fn play_restart(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(620.0, t + 0.15)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.25).ok();
    }
}

/// Wire up the two-tone siren: a pair of slightly detuned oscillators swept
/// through the wail by a slow LFO, all behind one gain node.
fn build_siren(ctx: &AudioContext) -> Option<GainNode> {
    let gain = ctx.create_gain().ok()?;
    gain.gain().set_value(0.0);
    gain.connect_with_audio_node(&ctx.destination()).ok()?;

    let osc_a = ctx.create_oscillator().ok()?;
    osc_a.set_type(OscillatorType::Sine);
    osc_a.frequency().set_value(650.0);
    osc_a.connect_with_audio_node(&gain).ok()?;

    // Detuned partner thickens the tone
    let osc_b = ctx.create_oscillator().ok()?;
    osc_b.set_type(OscillatorType::Triangle);
    osc_b.frequency().set_value(655.0);
    osc_b.connect_with_audio_node(&gain).ok()?;

    let lfo = ctx.create_oscillator().ok()?;
    lfo.set_type(OscillatorType::Sine);
    lfo.frequency().set_value(0.35);
    let lfo_gain = ctx.create_gain().ok()?;
    lfo_gain.gain().set_value(180.0);
    lfo.connect_with_audio_node(&lfo_gain).ok()?;
    lfo_gain.connect_with_audio_param(&osc_a.frequency()).ok()?;
    lfo_gain.connect_with_audio_param(&osc_b.frequency()).ok()?;

    osc_a.start().ok()?;
    osc_b.start().ok()?;
    lfo.start().ok()?;

    Some(gain)
}

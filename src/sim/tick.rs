//! Per-frame simulation step and frame admission control
//!
//! The driving loop is external (requestAnimationFrame in the browser, a
//! plain loop natively); it feeds timestamps through `FrameAdmission` and the
//! resulting dt into `tick`. The core never blocks and never schedules.

use glam::Vec2;
use rand::Rng;

use super::state::{
    ActivePowerUp, GameEvent, GameState, MAX_PARTICLES, Mode, Particle, ParticleKind, PowerUpKind,
    SoundCue,
};
use super::{collision, progress, spawn};
use crate::consts::*;
use crate::persistence::KvStore;
use crate::{frame_units, share};

/// Debounced one-shot intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap (tap/space); doubles as default craft select during Intro
    pub flap: bool,
    /// Craft selection from the intro screen
    pub select: Option<usize>,
    /// Restart from a terminal screen
    pub restart: bool,
    /// Compose a share string from a terminal screen
    pub share: bool,
}

/// Frame admission: clamp large real-time deltas, skip pathological ones
///
/// A skipped frame still records its timestamp, so a long pause (tab
/// backgrounding) costs one skipped frame instead of wedging the loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameAdmission {
    prev_ms: Option<f64>,
}

impl FrameAdmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `now_ms` produces a simulation step. Returns the
    /// normalized dt in 60 Hz frame units, or `None` to skip.
    pub fn admit(&mut self, now_ms: f64) -> Option<f32> {
        let prev = self.prev_ms.replace(now_ms);
        let prev = prev?; // first frame only establishes the reference
        let delta = (now_ms - prev).min(MAX_DELTA_MS);
        if delta > SKIP_DELTA_MS {
            log::debug!("Skipping frame after {delta:.0} ms stall");
            return None;
        }
        Some(frame_units(delta))
    }
}

/// Real-time debounce for discrete intents, independent of the sim clock
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentGate {
    last_ms: Option<f64>,
}

impl IntentGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept at most one intent per 150 ms window
    pub fn accept(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_ms
            && now_ms - last < INPUT_DEBOUNCE_MS
        {
            return false;
        }
        self.last_ms = Some(now_ms);
        true
    }
}

/// Advance the session by one admitted frame
///
/// `dt` is the admitted delta in frame units, `now_ms` the real-time stamp
/// used only for the hazard debounce. Within the frame: motion, spawning,
/// pickup/hazard resolution, progression, lifecycle cleanup, in that order.
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    dt: f32,
    now_ms: f64,
    store: &mut dyn KvStore,
) {
    // The backdrop drifts in every mode, intro and end screens included
    let view = state.view;
    let speed = state.pipe_speed();
    let stage = state.score / STAGE_STEP;
    {
        let GameState {
            background, rng, ..
        } = state;
        background.advance(view, speed, stage, rng);
    }

    if state.shake_frames > 0 {
        state.shake_frames -= 1;
    }

    match state.mode {
        Mode::Intro => {
            if let Some(index) = input.select {
                state.select_craft(index);
            } else if input.flap {
                // Default select: the always-unlocked base craft
                state.select_craft(0);
            }
        }
        Mode::Playing => {
            step_player(state, input, dt);
            spawn::spawn_pair(state);
            advance_entities(state);
            collision::resolve(state, now_ms);
            // A crash that ended the run stops progression this same frame
            if state.mode == Mode::Playing {
                progress::update(state, dt, store);
            }
            update_particles(state);
            cleanup(state);
            state.frame += 1;
        }
        Mode::GameOver | Mode::Victory => {
            update_particles(state);
            if input.restart {
                state.reset();
            } else if input.share {
                let message = share::share_message(state.score, state.mode == Mode::Victory);
                state.events.push(GameEvent::ShareComposed(message));
            }
        }
    }
}

fn step_player(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.flap {
        state.player.flap();
        state.push_sound(SoundCue::Flap);
    }

    let player = &mut state.player;
    player.velocity += player.gravity * dt;
    player.y += player.velocity * dt;
    if player.boost {
        player.velocity -= BOOST_LIFT * dt;
        player.boost_timer -= dt;
        if player.boost_timer <= 0.0 {
            player.boost = false;
        }
    }

    if state.player.boost && state.frame % 2 == 0 {
        spawn_exhaust(state);
    }

    // Timed power-ups wind down here; blast self-terminates in the resolver
    if let Some(active) = state.power_up
        && active.kind != PowerUpKind::Blast
    {
        let timer = active.timer - dt;
        state.power_up = if timer <= 0.0 {
            None
        } else {
            Some(ActivePowerUp { timer, ..active })
        };
    }
}

/// Boost trail behind the craft, every second frame
fn spawn_exhaust(state: &mut GameState) {
    if state.particles.len() + 3 > MAX_PARTICLES {
        return;
    }
    let center = state.player.center();
    for _ in 0..3 {
        let vel = Vec2::new(
            -state.rng.random_range(1.0..4.0),
            state.rng.random_range(-1.0..1.0),
        );
        let size = state.rng.random_range(1.0..4.0);
        state.particles.push(Particle {
            pos: center,
            vel,
            life: 15,
            size,
            kind: ParticleKind::Exhaust,
        });
    }
}

fn advance_entities(state: &mut GameState) {
    let speed = state.pipe_speed();
    for obstacle in &mut state.obstacles {
        obstacle.advance(speed);
    }
    for collectible in &mut state.collectibles {
        collectible.x -= speed;
    }
}

fn update_particles(state: &mut GameState) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life -= 1;
        particle.size *= 0.97;
    }
    state.particles.retain(|p| p.life > 0);
}

/// Drop entities whose trailing edge left the viewport
fn cleanup(state: &mut GameState) {
    state.obstacles.retain(|o| o.trailing_edge() > 0.0);
    state.collectibles.retain(|c| c.x + COIN_SIZE > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, SavedProgress};
    use proptest::prelude::*;

    fn playing_state() -> (GameState, MemoryStore) {
        let mut state = GameState::new(1280.0, 720.0, 42, SavedProgress::default());
        state.select_craft(0);
        (state, MemoryStore::new())
    }

    fn step(state: &mut GameState, store: &mut MemoryStore, input: TickInput, now_ms: f64) {
        tick(state, &input, 1.0, now_ms, store);
    }

    #[test]
    fn test_admission_first_frame_establishes_reference() {
        let mut admission = FrameAdmission::new();
        assert_eq!(admission.admit(0.0), None);
        let dt = admission.admit(16.67).expect("second frame steps");
        assert!((dt - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_admission_skips_large_delta_and_recovers() {
        let mut admission = FrameAdmission::new();
        admission.admit(0.0);
        // Tab was backgrounded for a second: skip, but keep the timestamp
        assert_eq!(admission.admit(1000.0), None);
        let dt = admission.admit(1016.0).expect("loop resumes after one skip");
        assert!((dt - 16.0 / 16.67 as f32).abs() < 1e-3);
    }

    #[test]
    fn test_admission_steps_at_boundary() {
        let mut admission = FrameAdmission::new();
        admission.admit(0.0);
        let dt = admission.admit(50.0).expect("50 ms is still admitted");
        assert!((dt - 3.0).abs() < 0.01);
        assert_eq!(admission.admit(101.0), None);
    }

    #[test]
    fn test_intent_gate_debounces() {
        let mut gate = IntentGate::new();
        assert!(gate.accept(0.0)); // first intent always lands
        assert!(!gate.accept(100.0));
        assert!(gate.accept(160.0));
        assert!(!gate.accept(200.0));
    }

    #[test]
    fn test_flap_sets_velocity() {
        let (mut state, mut store) = playing_state();
        let input = TickInput {
            flap: true,
            ..Default::default()
        };
        tick(&mut state, &input, 1.0, 1000.0, &mut store);
        // Lift is an instant set; gravity then pulls within the same frame
        assert!((state.player.velocity - (-10.0 + 0.5)).abs() < 1e-5);
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::Flap)));
    }

    #[test]
    fn test_gravity_integration() {
        let (mut state, mut store) = playing_state();
        let y0 = state.player.y;
        step(&mut state, &mut store, TickInput::default(), 1000.0);
        assert!((state.player.velocity - 0.5).abs() < 1e-5);
        assert!((state.player.y - (y0 + 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_boost_bias_and_expiry() {
        let (mut state, mut store) = playing_state();
        state.player.boost = true;
        state.player.boost_timer = 1.5;
        step(&mut state, &mut store, TickInput::default(), 1000.0);
        // gravity 0.5 minus boost bias 0.2
        assert!((state.player.velocity - 0.3).abs() < 1e-5);
        assert!(state.player.boost);
        step(&mut state, &mut store, TickInput::default(), 1000.0);
        assert!(!state.player.boost);
    }

    #[test]
    fn test_boost_emits_exhaust() {
        let (mut state, mut store) = playing_state();
        state.player.boost = true;
        state.player.boost_timer = 50.0;
        state.player.invincible = true;
        state.player.invincible_timer = 1e9;
        for now in 0..10 {
            step(&mut state, &mut store, TickInput::default(), now as f64 * 16.67);
        }
        assert!(
            state
                .particles
                .iter()
                .any(|p| p.kind == ParticleKind::Exhaust)
        );
    }

    #[test]
    fn test_timed_power_up_expires() {
        let (mut state, mut store) = playing_state();
        state.power_up = Some(ActivePowerUp {
            kind: PowerUpKind::Slow,
            timer: 0.5,
        });
        assert_eq!(state.pipe_speed(), SLOW_PIPE_SPEED);
        step(&mut state, &mut store, TickInput::default(), 1000.0);
        assert!(state.power_up.is_none());
        // Level-derived speed resumes the moment the effect drops
        assert_eq!(state.pipe_speed(), BASE_PIPE_SPEED);
    }

    #[test]
    fn test_spawn_cadence_over_full_ticks() {
        let (mut state, mut store) = playing_state();
        state.player.invincible = true;
        state.player.invincible_timer = 1e9;
        for frame in 0..=(SPAWN_INTERVAL_FRAMES as usize) {
            step(
                &mut state,
                &mut store,
                TickInput::default(),
                frame as f64 * 16.67,
            );
        }
        // Pair at frame 0 and pair at frame 150, nothing recycled yet
        assert_eq!(state.obstacles.len(), 4);
        assert_eq!(state.collectibles.len(), 2);
    }

    #[test]
    fn test_intro_flap_default_selects() {
        let mut state = GameState::new(1280.0, 720.0, 42, SavedProgress::default());
        let mut store = MemoryStore::new();
        let input = TickInput {
            flap: true,
            ..Default::default()
        };
        tick(&mut state, &input, 1.0, 0.0, &mut store);
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.craft_index, 0);
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let (mut state, mut store) = playing_state();
        state.score = 30;
        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &input, 1.0, 1000.0, &mut store);
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.score, 30);
    }

    #[test]
    fn test_restart_resets_transients_keeps_persisted() {
        let (mut state, mut store) = playing_state();
        state.saved.high_score = 900;
        state.saved.unlocks[1] = true;
        state.score = 250;
        state.lives = 1;
        state.mode = Mode::GameOver;
        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &input, 1.0, 1000.0, &mut store);
        assert_eq!(state.mode, Mode::Intro);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.saved.high_score, 900);
        assert!(state.saved.unlocks[1]);
    }

    #[test]
    fn test_share_composes_result_string() {
        let (mut state, mut store) = playing_state();
        state.score = 40;
        state.mode = Mode::GameOver;
        let input = TickInput {
            share: true,
            ..Default::default()
        };
        tick(&mut state, &input, 1.0, 1000.0, &mut store);
        assert!(state.events.contains(&GameEvent::ShareComposed(
            "Scored 40 in Galaxy Dash Challenge!".into()
        )));
        // Pure side-effecting export: no state change
        assert_eq!(state.mode, Mode::GameOver);
        assert_eq!(state.score, 40);
    }

    #[test]
    fn test_share_victory_variant() {
        let (mut state, mut store) = playing_state();
        state.score = 10_250;
        state.mode = Mode::Victory;
        let input = TickInput {
            share: true,
            ..Default::default()
        };
        tick(&mut state, &input, 1.0, 1000.0, &mut store);
        assert!(state.events.contains(&GameEvent::ShareComposed(
            "I escaped the galaxy with 10250 points in Galaxy Dash Challenge!".into()
        )));
    }

    #[test]
    fn test_flap_ignored_on_end_screen() {
        let (mut state, mut store) = playing_state();
        state.mode = Mode::GameOver;
        state.player.velocity = 3.0;
        let input = TickInput {
            flap: true,
            ..Default::default()
        };
        tick(&mut state, &input, 1.0, 1000.0, &mut store);
        assert_eq!(state.player.velocity, 3.0);
        assert_eq!(state.mode, Mode::GameOver);
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let mut a = GameState::new(1280.0, 720.0, 99, SavedProgress::default());
        let mut b = GameState::new(1280.0, 720.0, 99, SavedProgress::default());
        let mut store_a = MemoryStore::new();
        let mut store_b = MemoryStore::new();
        a.select_craft(0);
        b.select_craft(0);

        for frame in 0..600u64 {
            let input = TickInput {
                flap: frame % 30 == 0,
                ..Default::default()
            };
            let now = frame as f64 * 16.67;
            tick(&mut a, &input, 1.0, now, &mut store_a);
            tick(&mut b, &input, 1.0, now, &mut store_b);
        }

        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.mode, b.mode);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        assert_eq!(a.player.y.to_bits(), b.player.y.to_bits());
    }

    proptest! {
        /// Core invariants hold under arbitrary flap patterns and frame deltas
        #[test]
        fn prop_session_invariants(
            seed in 0u64..1000,
            flaps in proptest::collection::vec(any::<bool>(), 50..300),
            dts in proptest::collection::vec(0.5f32..3.0, 50..300),
        ) {
            let mut state = GameState::new(1280.0, 720.0, seed, SavedProgress::default());
            let mut store = MemoryStore::new();
            state.select_craft(0);

            let mut now_ms = 0.0;
            let mut last_score = 0;
            let mut last_level = 1;
            let mut last_high = state.saved.high_score;
            for (i, dt) in dts.iter().enumerate() {
                now_ms += (*dt as f64) * 16.67;
                let input = TickInput {
                    flap: flaps.get(i).copied().unwrap_or(false),
                    ..Default::default()
                };
                tick(&mut state, &input, *dt, now_ms, &mut store);

                prop_assert!(state.lives <= MAX_LIVES);
                prop_assert!(state.score >= last_score);
                prop_assert!(state.level >= last_level);
                prop_assert!(state.saved.high_score >= last_high);
                if state.mode == Mode::GameOver {
                    prop_assert_eq!(state.lives, 0);
                }
                last_score = state.score;
                last_level = state.level;
                last_high = state.saved.high_score;
            }
        }
    }
}

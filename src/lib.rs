//! Galaxy Dash - a space-themed dodge-and-collect arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, progression)
//! - `persistence`: High score and unlock storage behind a key-value boundary
//! - `share`: Plain-text result export boundary
//! - `audio`: Web Audio sound cues (wasm only)

pub mod persistence;
pub mod share;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use persistence::{KvStore, MemoryStore, SavedProgress};
pub use sim::{FrameAdmission, GameState, IntentGate, Mode, TickInput, tick};

/// Game configuration constants
pub mod consts {
    /// Reference frame duration (60 Hz) used to normalize real-time deltas
    pub const FRAME_MS: f64 = 16.67;
    /// Real-time deltas are clamped to this before normalization
    pub const MAX_DELTA_MS: f64 = 100.0;
    /// Frames with a larger real-time delta are skipped outright
    pub const SKIP_DELTA_MS: f64 = 50.0;
    /// Minimum real time between accepted discrete intents
    pub const INPUT_DEBOUNCE_MS: f64 = 150.0;
    /// Minimum real time between resolved hazard collisions
    pub const COLLISION_DEBOUNCE_MS: f64 = 200.0;

    /// Player's fixed horizontal position
    pub const PLAYER_X: f32 = 50.0;
    /// Lives at the start of a session
    pub const START_LIVES: u8 = 3;
    /// Hearts stop counting here
    pub const MAX_LIVES: u8 = 5;

    /// Obstacle column width
    pub const PIPE_WIDTH: f32 = 80.0;
    /// Simulation frames between obstacle-pair spawns
    pub const SPAWN_INTERVAL_FRAMES: u64 = 150;
    /// Obstacle speed at level 1
    pub const BASE_PIPE_SPEED: f32 = 2.5;
    /// Speed gained per level
    pub const PIPE_SPEED_PER_LEVEL: f32 = 0.2;
    /// Gap between a pair at levels 1-2
    pub const BASE_PIPE_GAP: f32 = 300.0;
    /// Narrowest gap the level curve reaches
    pub const MIN_PIPE_GAP: f32 = 200.0;
    /// Gap while boost is active
    pub const BOOST_PIPE_GAP: f32 = 350.0;
    /// Obstacle speed while the slow power-up is active
    pub const SLOW_PIPE_SPEED: f32 = 1.5;

    /// Collectible hit-box size
    pub const COIN_SIZE: f32 = 20.0;
    /// Coins needed to trigger a boost
    pub const COINS_PER_BOOST: u32 = 5;
    /// Boost duration in frame units
    pub const BOOST_FRAMES: f32 = 200.0;
    /// Upward velocity bias per frame unit while boosting
    pub const BOOST_LIFT: f32 = 0.2;

    /// Score that ends the run in victory
    pub const VICTORY_SCORE: u64 = 10_000;
    /// Spacing between invincibility milestones
    pub const MILESTONE_STEP: u64 = 250;
    /// Invincibility duration in frame units
    pub const INVINCIBLE_FRAMES: f32 = 900.0;
    /// Score per background stage
    pub const STAGE_STEP: u64 = 200;

    /// Camera shake duration in frames
    pub const SHAKE_FRAMES: u32 = 10;
}

/// Normalize a real-time delta (ms) to 60 Hz frame units
#[inline]
pub fn frame_units(delta_ms: f64) -> f32 {
    (delta_ms / consts::FRAME_MS) as f32
}

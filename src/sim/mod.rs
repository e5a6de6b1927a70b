//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Normalized 60 Hz frame units only (`dt` = real delta / 16.67 ms)
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! In-frame ordering is load-bearing: motion precedes spawning, spawning
//! precedes pickup/hazard resolution, resolution precedes progression
//! bookkeeping, and lifecycle cleanup runs last.

pub mod background;
pub mod collision;
pub mod progress;
pub mod spawn;
pub mod state;
pub mod tick;

pub use background::Background;
pub use state::{
    ActivePowerUp, CRAFT_CATALOG, Collectible, CollectibleKind, Craft, FrameView, GameEvent,
    GameState, Hud, MAX_PARTICLES, Mode, Obstacle, Particle, ParticleKind, Player, PowerUpKind,
    Ring, SoundCue,
};
pub use tick::{FrameAdmission, IntentGate, TickInput, tick};

//! Game state and core simulation types
//!
//! Everything the tick loop mutates lives in one `GameState` aggregate; the
//! presentation layer only ever sees a read-only `FrameView` of it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::background::Background;
use crate::consts::*;
use crate::persistence::SavedProgress;

/// Current session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Craft-select screen, waiting for a selection
    Intro,
    /// Active gameplay
    Playing,
    /// Run ended in a crash
    GameOver,
    /// Run ended at the victory score
    Victory,
}

/// A selectable craft archetype (immutable)
#[derive(Debug, Clone, Copy)]
pub struct Craft {
    pub name: &'static str,
    /// Score at which this craft becomes selectable
    pub unlock_score: u64,
    pub width: f32,
    pub height: f32,
    /// Instant vertical velocity applied on flap (negative = up)
    pub lift: f32,
    /// Downward acceleration per frame unit
    pub gravity: f32,
}

/// Fixed craft catalog; index 0 is always unlocked
pub const CRAFT_CATALOG: [Craft; 4] = [
    Craft {
        name: "UFO",
        unlock_score: 0,
        width: 60.0,
        height: 60.0,
        lift: -10.0,
        gravity: 0.5,
    },
    Craft {
        name: "Rocket",
        unlock_score: 500,
        width: 60.0,
        height: 60.0,
        lift: -12.0,
        gravity: 0.5,
    },
    Craft {
        name: "Spaceship",
        unlock_score: 1000,
        width: 60.0,
        height: 60.0,
        lift: -10.0,
        gravity: 0.45,
    },
    Craft {
        name: "Drone",
        unlock_score: 5000,
        width: 50.0,
        height: 50.0,
        lift: -10.0,
        gravity: 0.5,
    },
];

/// The player's craft in flight
#[derive(Debug, Clone)]
pub struct Player {
    /// Horizontal position, fixed for the whole session
    pub x: f32,
    /// Vertical position; unconstrained until the hazard pass resolves it
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Vertical velocity (positive = down)
    pub velocity: f32,
    pub gravity: f32,
    pub lift: f32,
    pub boost: bool,
    pub boost_timer: f32,
    pub invincible: bool,
    pub invincible_timer: f32,
    /// Lifetime count of invincibility milestones claimed
    pub invincible_count: u32,
}

impl Player {
    pub fn new(craft: &Craft, view_height: f32) -> Self {
        Self {
            x: PLAYER_X,
            y: view_height / 2.0,
            width: craft.width,
            height: craft.height,
            velocity: 0.0,
            gravity: craft.gravity,
            lift: craft.lift,
            boost: false,
            boost_timer: 0.0,
            invincible: false,
            invincible_timer: 0.0,
            invincible_count: 0,
        }
    }

    /// Apply a craft's stats without touching flight state
    pub fn apply_craft(&mut self, craft: &Craft) {
        self.width = craft.width;
        self.height = craft.height;
        self.lift = craft.lift;
        self.gravity = craft.gravity;
    }

    /// Flap: instant velocity set, not additive
    pub fn flap(&mut self) {
        self.velocity = self.lift;
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Decorative ring drifting inside an obstacle column
#[derive(Debug, Clone, Copy)]
pub struct Ring {
    /// Offset within the column (0 at the gap-facing edge for bottom columns)
    pub y: f32,
    pub alpha: f32,
    pub speed: f32,
}

/// One column of an obstacle pair
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub x: f32,
    pub height: f32,
    pub is_top: bool,
    pub width: f32,
    /// Flipped exactly once when the trailing edge crosses the player
    pub passed: bool,
    pub rings: Vec<Ring>,
}

impl Obstacle {
    pub fn new(x: f32, height: f32, is_top: bool, rng: &mut Pcg32) -> Self {
        let mut rings = Vec::with_capacity(3);
        // A cramped gap can push a column's height to zero or below; such a
        // column has no interior for rings to drift in.
        if height > 0.0 {
            for _ in 0..3 {
                rings.push(Ring {
                    y: rng.random_range(0.0..height),
                    alpha: 1.0,
                    speed: (rng.random::<f32>() - 0.5) * 0.5,
                });
            }
        }
        Self {
            x,
            height,
            is_top,
            width: PIPE_WIDTH,
            passed: false,
            rings,
        }
    }

    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    /// Advance one frame: translate left and drift the rings
    pub fn advance(&mut self, speed: f32) {
        self.x -= speed;
        let height = self.height;
        let is_top = self.is_top;
        for ring in &mut self.rings {
            ring.y += ring.speed;
            ring.alpha = (ring.alpha - 0.01).max(0.0);
            if ring.y < 0.0 || ring.y > height {
                ring.y = if is_top { height } else { 0.0 };
                ring.alpha = 1.0;
            }
        }
    }
}

/// Collectible kinds, weighted at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleKind {
    Coin,
    Heart,
    PowerUpCapsule,
}

/// A collectible floating in an obstacle gap
#[derive(Debug, Clone, Copy)]
pub struct Collectible {
    pub x: f32,
    pub y: f32,
    pub kind: CollectibleKind,
}

/// Power-up kinds rolled from a capsule pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Doubles coin and pipe score
    Double,
    /// Forces obstacle speed down to the slow override
    Slow,
    /// Absorbs one hazard collision
    Shield,
    /// Clears all obstacles each frame until its timer runs out
    Blast,
}

impl PowerUpKind {
    /// Initial timer in frame units
    pub fn duration(self) -> f32 {
        match self {
            PowerUpKind::Double => 600.0,
            PowerUpKind::Slow => 600.0,
            PowerUpKind::Shield => 300.0,
            PowerUpKind::Blast => 10.0,
        }
    }
}

/// The single active power-up slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub timer: f32,
}

/// Particle effect class, resolved to colors by the presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Coin,
    Heart,
    Crash,
    Victory,
    /// Boost trail behind the craft
    Exhaust,
}

/// A short-lived cosmetic particle
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining lifetime in frames
    pub life: i32,
    pub size: f32,
    pub kind: ParticleKind,
}

/// Maximum concurrent particles; spawn requests past the cap are dropped whole
pub const MAX_PARTICLES: usize = 200;

/// Sound cues surfaced to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Flap and craft selection
    Flap,
    CoinGrab,
    PipePass,
    Crash,
    /// Fifth coin banked, boost engaged
    BoostReady,
    /// Capsule pickup and invincibility grant
    PowerUp,
    HeartGrab,
    Victory,
}

/// Feedback events drained by the presenter once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundCue),
    /// Camera shake started (duration exposed via `FrameView::shake_frames`)
    ShakeStarted,
    /// Craft at this catalog index just unlocked
    CraftUnlocked(usize),
    /// Share intent resolved into its result string
    ShareComposed(String),
}

/// Derived HUD values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u64,
    pub high_score: u64,
    pub level: u32,
    pub lives: u8,
}

/// Read-only per-frame snapshot handed to the presentation layer
#[derive(Debug)]
pub struct FrameView<'a> {
    pub mode: Mode,
    pub player: &'a Player,
    pub obstacles: &'a [Obstacle],
    pub collectibles: &'a [Collectible],
    pub particles: &'a [Particle],
    pub background: &'a Background,
    pub hud: Hud,
    pub shake_frames: u32,
}

/// Complete session state, owned exclusively by the tick loop
#[derive(Debug, Clone)]
pub struct GameState {
    /// Viewport dimensions in logical pixels
    pub view: Vec2,
    pub mode: Mode,
    /// Selected craft, kept across resets
    pub craft_index: usize,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub particles: Vec<Particle>,
    pub background: Background,
    /// At most one power-up at a time; a new pickup overwrites it
    pub power_up: Option<ActivePowerUp>,
    pub score: u64,
    pub level: u32,
    pub lives: u8,
    /// Coins banked toward the next boost (mod 5)
    pub coin_count: u32,
    /// Consecutive pipes passed, feeding the every-3rd bonus
    pub pipe_streak: u32,
    /// Simulation frame counter, drives the spawn cadence
    pub frame: u64,
    pub shake_frames: u32,
    /// Real-time stamp of the last resolved hazard collision
    pub last_collision_ms: f64,
    /// score / 200 at the last background regeneration
    pub background_stage: u64,
    /// Persisted progress (high score + unlocks), survives resets
    pub saved: SavedProgress,
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    pub seed: u64,
}

impl GameState {
    /// Create a fresh session on the intro screen
    pub fn new(view_width: f32, view_height: f32, seed: u64, saved: SavedProgress) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let view = Vec2::new(view_width, view_height);
        let background = Background::generate(view, &mut rng);
        Self {
            view,
            mode: Mode::Intro,
            craft_index: 0,
            player: Player::new(&CRAFT_CATALOG[0], view_height),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            particles: Vec::new(),
            background,
            power_up: None,
            score: 0,
            level: 1,
            lives: START_LIVES,
            coin_count: 0,
            pipe_streak: 0,
            frame: 0,
            shake_frames: 0,
            last_collision_ms: 0.0,
            background_stage: 0,
            saved,
            events: Vec::new(),
            rng,
            seed,
        }
    }

    /// Reinitialize all transient state; persisted progress and the selected
    /// craft survive
    pub fn reset(&mut self) {
        let craft = &CRAFT_CATALOG[self.craft_index];
        self.player = Player::new(craft, self.view.y);
        self.obstacles.clear();
        self.collectibles.clear();
        self.particles.clear();
        self.power_up = None;
        self.score = 0;
        self.level = 1;
        self.lives = START_LIVES;
        self.coin_count = 0;
        self.pipe_streak = 0;
        self.frame = 0;
        self.shake_frames = 0;
        self.last_collision_ms = 0.0;
        self.background_stage = 0;
        self.mode = Mode::Intro;
        self.events.clear();
        let field = Background::generate(self.view, &mut self.rng);
        self.background = field;
        log::info!("Session reset");
    }

    /// Intro-screen craft selection; locked or out-of-range picks are ignored
    pub fn select_craft(&mut self, index: usize) {
        if self.mode != Mode::Intro {
            return;
        }
        let Some(craft) = CRAFT_CATALOG.get(index) else {
            return;
        };
        if !self.saved.unlocks.get(index).copied().unwrap_or(false) {
            return;
        }
        self.craft_index = index;
        self.player.apply_craft(craft);
        self.mode = Mode::Playing;
        self.events.push(GameEvent::Sound(SoundCue::Flap));
        log::info!("Selected {}", craft.name);
    }

    /// Effective obstacle speed: slow power-up overrides the level curve
    pub fn pipe_speed(&self) -> f32 {
        if self.power_up_active(PowerUpKind::Slow) {
            SLOW_PIPE_SPEED
        } else {
            BASE_PIPE_SPEED + (self.level - 1) as f32 * PIPE_SPEED_PER_LEVEL
        }
    }

    /// Effective gap between a pair: boost overrides the level curve
    pub fn pipe_gap(&self) -> f32 {
        if self.player.boost {
            BOOST_PIPE_GAP
        } else if self.level >= 3 {
            (BASE_PIPE_GAP - (self.level - 2) as f32 * 20.0).max(MIN_PIPE_GAP)
        } else {
            BASE_PIPE_GAP
        }
    }

    pub fn power_up_active(&self, kind: PowerUpKind) -> bool {
        matches!(self.power_up, Some(active) if active.kind == kind)
    }

    /// Spawn a burst of particles; requests past the global cap are dropped
    pub fn spawn_particles(&mut self, pos: Vec2, kind: ParticleKind, count: usize) {
        if self.particles.len() + count > MAX_PARTICLES {
            return;
        }
        let life = match kind {
            ParticleKind::Crash => 30,
            ParticleKind::Victory => 50,
            _ => 20,
        };
        for _ in 0..count {
            let vel = Vec2::new(
                self.rng.random_range(-2.5..2.5),
                self.rng.random_range(-2.5..2.5),
            );
            let size = self.rng.random_range(2.0..6.0);
            self.particles.push(Particle {
                pos,
                vel,
                life,
                size,
                kind,
            });
        }
    }

    pub fn push_sound(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Drain this frame's feedback events for the presenter
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            high_score: self.saved.high_score,
            level: self.level,
            lives: self.lives,
        }
    }

    /// Read-only snapshot for the presentation collaborator
    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            mode: self.mode,
            player: &self.player,
            obstacles: &self.obstacles,
            collectibles: &self.collectibles,
            particles: &self.particles,
            background: &self.background,
            hud: self.hud(),
            shake_frames: self.shake_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SavedProgress;

    fn fresh_state() -> GameState {
        GameState::new(1280.0, 720.0, 42, SavedProgress::default())
    }

    #[test]
    fn test_new_session_defaults() {
        let state = fresh_state();
        assert_eq!(state.mode, Mode::Intro);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.x, PLAYER_X);
        assert_eq!(state.player.y, 360.0);
        assert!(state.obstacles.is_empty());
        assert!(state.power_up.is_none());
    }

    #[test]
    fn test_select_craft_enters_playing() {
        let mut state = fresh_state();
        state.select_craft(0);
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.craft_index, 0);
        assert_eq!(state.player.lift, CRAFT_CATALOG[0].lift);
    }

    #[test]
    fn test_select_locked_craft_ignored() {
        let mut state = fresh_state();
        state.select_craft(1); // Rocket unlocks at 500
        assert_eq!(state.mode, Mode::Intro);

        state.select_craft(99); // out of range
        assert_eq!(state.mode, Mode::Intro);
    }

    #[test]
    fn test_select_unlocked_craft_applies_stats() {
        let mut state = fresh_state();
        state.saved.unlocks[2] = true;
        state.select_craft(2);
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.player.gravity, CRAFT_CATALOG[2].gravity);
        // Flight state untouched by selection
        assert_eq!(state.player.velocity, 0.0);
        assert_eq!(state.player.y, 360.0);
    }

    #[test]
    fn test_reset_preserves_persisted_progress() {
        let mut state = fresh_state();
        state.saved.high_score = 777;
        state.saved.unlocks[1] = true;
        state.select_craft(1);
        state.score = 123;
        state.level = 4;
        state.lives = 1;
        state.coin_count = 3;
        state.pipe_streak = 2;
        state.power_up = Some(ActivePowerUp {
            kind: PowerUpKind::Double,
            timer: 100.0,
        });

        state.reset();

        assert_eq!(state.mode, Mode::Intro);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.coin_count, 0);
        assert_eq!(state.pipe_streak, 0);
        assert!(state.power_up.is_none());
        // Persisted fields and the craft choice survive
        assert_eq!(state.saved.high_score, 777);
        assert!(state.saved.unlocks[1]);
        assert_eq!(state.craft_index, 1);
        // Reset player uses the previously selected craft's stats
        assert_eq!(state.player.lift, CRAFT_CATALOG[1].lift);
    }

    #[test]
    fn test_particle_cap_drops_overflow() {
        let mut state = fresh_state();
        for _ in 0..19 {
            state.spawn_particles(Vec2::ZERO, ParticleKind::Coin, 10);
        }
        assert_eq!(state.particles.len(), 190);
        // 190 + 20 > 200: the whole request is dropped, oldest are kept
        state.spawn_particles(Vec2::ZERO, ParticleKind::Crash, 20);
        assert_eq!(state.particles.len(), 190);
        // A request that still fits goes through
        state.spawn_particles(Vec2::ZERO, ParticleKind::Coin, 10);
        assert_eq!(state.particles.len(), 200);
    }

    #[test]
    fn test_pipe_speed_and_gap_derivation() {
        let mut state = fresh_state();
        assert_eq!(state.pipe_speed(), 2.5);
        assert_eq!(state.pipe_gap(), 300.0);

        state.level = 2;
        assert!((state.pipe_speed() - 2.7).abs() < 1e-6);
        assert_eq!(state.pipe_gap(), 300.0);

        state.level = 3;
        assert_eq!(state.pipe_gap(), 280.0);

        state.level = 10;
        assert_eq!(state.pipe_gap(), MIN_PIPE_GAP);

        state.power_up = Some(ActivePowerUp {
            kind: PowerUpKind::Slow,
            timer: 600.0,
        });
        assert_eq!(state.pipe_speed(), SLOW_PIPE_SPEED);

        state.player.boost = true;
        assert_eq!(state.pipe_gap(), BOOST_PIPE_GAP);
    }

    #[test]
    fn test_ring_wraps_at_column_bounds() {
        let mut state = fresh_state();
        let mut obstacle = Obstacle::new(100.0, 200.0, true, &mut state.rng);
        obstacle.rings[0].y = 199.9;
        obstacle.rings[0].speed = 0.5;
        obstacle.rings[0].alpha = 0.3;
        obstacle.advance(2.5);
        assert_eq!(obstacle.rings[0].y, 200.0);
        assert_eq!(obstacle.rings[0].alpha, 1.0);
        assert_eq!(obstacle.x, 97.5);
    }

    #[test]
    fn test_degenerate_column_has_no_rings() {
        let mut state = fresh_state();
        let obstacle = Obstacle::new(100.0, -20.0, false, &mut state.rng);
        assert!(obstacle.rings.is_empty());
    }
}

//! Ambient star/nebula backdrop
//!
//! Purely cosmetic. Regenerated on reset and each time the score crosses a
//! 200-point stage boundary; drifts every frame in every mode.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

pub const STAR_COUNT: usize = 100;
pub const NEBULA_COUNT: usize = 7;

/// A parallax star
#[derive(Debug, Clone, Copy)]
pub struct Star {
    pub pos: Vec2,
    pub speed: f32,
    pub size: f32,
}

/// A drifting nebula blob
#[derive(Debug, Clone, Copy)]
pub struct Nebula {
    pub pos: Vec2,
    pub size: f32,
    /// Hue in degrees for the presenter's color ramp
    pub hue: f32,
}

/// The whole decorative field
#[derive(Debug, Clone, Default)]
pub struct Background {
    pub stars: Vec<Star>,
    pub nebulas: Vec<Nebula>,
}

impl Background {
    pub fn generate(view: Vec2, rng: &mut Pcg32) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                pos: Vec2::new(rng.random_range(0.0..view.x), rng.random_range(0.0..view.y)),
                speed: rng.random_range(0.5..1.3),
                size: rng.random_range(1.0..4.0),
            })
            .collect();
        let nebulas = (0..NEBULA_COUNT)
            .map(|_| Nebula {
                pos: Vec2::new(rng.random_range(0.0..view.x), rng.random_range(0.0..view.y)),
                size: rng.random_range(60.0..180.0),
                hue: rng.random_range(0.0..360.0),
            })
            .collect();
        Self { stars, nebulas }
    }

    /// Drift one frame. Stars scale with the score stage, nebulas trail the
    /// obstacles at half speed and re-roll when they wrap.
    pub fn advance(&mut self, view: Vec2, pipe_speed: f32, stage: u64, rng: &mut Pcg32) {
        let stage_scale = 1.0 + stage as f32 * 0.1;
        for star in &mut self.stars {
            star.pos.x -= star.speed * stage_scale;
            if star.pos.x < 0.0 {
                star.pos.x = view.x;
            }
        }
        for nebula in &mut self.nebulas {
            nebula.pos.x -= pipe_speed * 0.5;
            if nebula.pos.x + nebula.size < 0.0 {
                nebula.pos.x = view.x + nebula.size;
                nebula.pos.y = rng.random_range(0.0..view.y);
                nebula.hue = rng.random_range(0.0..360.0);
            }
        }
    }
}

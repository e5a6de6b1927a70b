//! Pickup and hazard resolution
//!
//! Runs once per frame after motion. The pickup pass always runs; the hazard
//! pass is skipped while invincible and debounced by 200 ms of real time so a
//! single physical collision cannot cost two lives.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{
    ActivePowerUp, CollectibleKind, GameEvent, GameState, Mode, ParticleKind, PowerUpKind,
    SoundCue,
};
use crate::consts::*;

/// Axis-aligned overlap test for origin + size boxes
#[inline]
pub fn overlaps(ax: f32, ay: f32, aw: f32, ah: f32, bx: f32, by: f32, bw: f32, bh: f32) -> bool {
    ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
}

/// Resolve this frame's pickups, hazards and the blast effect, in that order
pub fn resolve(state: &mut GameState, now_ms: f64) {
    resolve_pickups(state);
    resolve_hazards(state, now_ms);
    resolve_blast(state);
}

fn resolve_pickups(state: &mut GameState) {
    let mut i = 0;
    while i < state.collectibles.len() {
        let collectible = state.collectibles[i];
        let player = &state.player;
        let hit = overlaps(
            player.x,
            player.y,
            player.width,
            player.height,
            collectible.x,
            collectible.y,
            COIN_SIZE,
            COIN_SIZE,
        );
        if !hit {
            i += 1;
            continue;
        }
        // Consumed regardless of which branch applies below
        state.collectibles.remove(i);
        let at = Vec2::new(collectible.x, collectible.y);

        match collectible.kind {
            CollectibleKind::PowerUpCapsule => {
                let kind = roll_power_up(&mut state.rng);
                // Last pickup wins: an already-active power-up is overwritten
                state.power_up = Some(ActivePowerUp {
                    kind,
                    timer: kind.duration(),
                });
                state.push_sound(SoundCue::PowerUp);
                state.spawn_particles(at, ParticleKind::Coin, 10);
            }
            CollectibleKind::Heart => {
                if state.lives < MAX_LIVES {
                    state.lives += 1;
                }
                state.push_sound(SoundCue::HeartGrab);
                state.spawn_particles(at, ParticleKind::Heart, 10);
            }
            CollectibleKind::Coin => {
                state.score += if state.power_up_active(PowerUpKind::Double) {
                    20
                } else {
                    10
                };
                state.coin_count += 1;
                state.push_sound(SoundCue::CoinGrab);
                state.spawn_particles(at, ParticleKind::Coin, 10);
                if state.coin_count >= COINS_PER_BOOST {
                    state.player.boost = true;
                    state.player.boost_timer = BOOST_FRAMES;
                    state.coin_count = 0;
                    state.push_sound(SoundCue::BoostReady);
                }
            }
        }
    }
}

/// Uniform capsule roll with the source weights: 33/33/17/17
fn roll_power_up(rng: &mut Pcg32) -> PowerUpKind {
    let roll: f32 = rng.random();
    if roll < 0.33 {
        PowerUpKind::Double
    } else if roll < 0.66 {
        PowerUpKind::Slow
    } else if roll < 0.83 {
        PowerUpKind::Shield
    } else {
        PowerUpKind::Blast
    }
}

fn resolve_hazards(state: &mut GameState, now_ms: f64) {
    if state.player.invincible {
        return;
    }
    if now_ms - state.last_collision_ms < COLLISION_DEBOUNCE_MS {
        return;
    }

    let player = &state.player;
    let view = state.view;
    let mut hit = player.y + player.height > view.y || player.y < 0.0;
    if !hit {
        for obstacle in &state.obstacles {
            let overlapping_x = player.x + player.width > obstacle.x
                && player.x < obstacle.x + obstacle.width;
            let overlapping_y = (obstacle.is_top && player.y < obstacle.height)
                || (!obstacle.is_top && player.y + player.height > view.y - obstacle.height);
            if overlapping_x && overlapping_y {
                hit = true;
                break;
            }
        }
    }
    if !hit {
        return;
    }

    state.last_collision_ms = now_ms;
    let at = state.player.center();

    if state.power_up_active(PowerUpKind::Shield) {
        // Shield absorbs the hit and is consumed
        state.power_up = None;
        state.spawn_particles(at, ParticleKind::Crash, 20);
        state.push_sound(SoundCue::Crash);
    } else if state.lives > 1 {
        state.lives -= 1;
        state.player.y = view.y / 2.0;
        state.player.velocity = 0.0;
        // Clear everything not yet fully past the player so the recentered
        // craft cannot instantly collide again
        let px = state.player.x;
        state.obstacles.retain(|o| o.trailing_edge() < px);
        state.spawn_particles(at, ParticleKind::Crash, 20);
        state.push_sound(SoundCue::Crash);
        state.shake_frames = SHAKE_FRAMES;
        state.events.push(GameEvent::ShakeStarted);
    } else {
        state.lives = 0;
        state.mode = Mode::GameOver;
        state.spawn_particles(at, ParticleKind::Crash, 20);
        state.push_sound(SoundCue::Crash);
        state.shake_frames = SHAKE_FRAMES;
        state.events.push(GameEvent::ShakeStarted);
        log::info!("Game over at score {}", state.score);
    }
}

/// Blast clears the field once per frame while its timer runs, then frees the
/// slot the moment it expires
fn resolve_blast(state: &mut GameState) {
    let Some(active) = state.power_up else {
        return;
    };
    if active.kind != PowerUpKind::Blast {
        return;
    }
    if active.timer > 0.0 {
        state.obstacles.clear();
        let center = state.view * 0.5;
        state.spawn_particles(center, ParticleKind::Crash, 10);
    }
    let timer = active.timer - 1.0;
    state.power_up = if timer <= 0.0 {
        None
    } else {
        Some(ActivePowerUp { timer, ..active })
    };
}

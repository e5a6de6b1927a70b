//! Scoring, levels, unlocks and the victory condition
//!
//! Runs once per playing frame, after collision resolution, so a coin picked
//! up this frame is already counted before any threshold check.

use crate::consts::*;
use crate::persistence::KvStore;
use crate::sim::background::Background;
use crate::sim::state::{
    CRAFT_CATALOG, GameEvent, GameState, Mode, ParticleKind, PowerUpKind, SoundCue,
};

/// Score threshold that ends the given level
pub fn level_threshold(level: u32) -> u64 {
    match level {
        1 => 50,
        2 => 100,
        3 => 175,
        4 => 275,
        n => 275 + (n as u64 - 4) * 100,
    }
}

/// Per-frame progression bookkeeping
pub fn update(state: &mut GameState, dt: f32, store: &mut dyn KvStore) {
    score_passed_pipes(state);
    persist_high_score(state, store);
    persist_unlocks(state, store);
    check_victory(state);
    advance_level(state);
    check_invincibility(state, dt);
    refresh_background_stage(state);
}

/// Mark pipes whose trailing edge crossed the player; the bottom member of a
/// pair scores, and every third consecutive pipe pays a streak bonus
fn score_passed_pipes(state: &mut GameState) {
    let px = state.player.x;
    let mut bottom_passes = 0u32;
    for obstacle in state.obstacles.iter_mut() {
        if !obstacle.passed && obstacle.trailing_edge() < px {
            obstacle.passed = true;
            if !obstacle.is_top {
                bottom_passes += 1;
            }
        }
    }
    let double = state.power_up_active(PowerUpKind::Double);
    for _ in 0..bottom_passes {
        state.score += if double { 10 } else { 5 };
        state.pipe_streak += 1;
        state.push_sound(SoundCue::PipePass);
        if state.pipe_streak % 3 == 0 {
            state.score += 10;
            state.push_sound(SoundCue::CoinGrab);
        }
    }
}

fn persist_high_score(state: &mut GameState, store: &mut dyn KvStore) {
    if state.score > state.saved.high_score {
        state.saved.high_score = state.score;
        state.saved.save_high_score(store);
    }
}

fn persist_unlocks(state: &mut GameState, store: &mut dyn KvStore) {
    let mut changed = false;
    for (i, craft) in CRAFT_CATALOG.iter().enumerate() {
        if !state.saved.unlocks[i] && state.score >= craft.unlock_score {
            state.saved.unlocks[i] = true;
            state.events.push(GameEvent::CraftUnlocked(i));
            log::info!("Unlocked {} at score {}", craft.name, state.score);
            changed = true;
        }
    }
    if changed {
        state.saved.save_unlocks(store);
    }
}

fn check_victory(state: &mut GameState) {
    if state.score >= VICTORY_SCORE && state.mode != Mode::Victory {
        state.mode = Mode::Victory;
        state.push_sound(SoundCue::Victory);
        let center = state.view * 0.5;
        state.spawn_particles(center, ParticleKind::Victory, 50);
        log::info!("Victory at score {}", state.score);
    }
}

/// One level per frame, never a jump to the final level: a score that skips
/// several thresholds climbs them over successive frames
fn advance_level(state: &mut GameState) {
    if state.score >= level_threshold(state.level) {
        state.level += 1;
        log::debug!(
            "Level {} (speed {:.1}, gap {:.0})",
            state.level,
            state.pipe_speed(),
            state.pipe_gap()
        );
    }
}

/// Every 250-point multiple grants one invincibility window, skipped while a
/// power-up is live or the player is already invincible
fn check_invincibility(state: &mut GameState, dt: f32) {
    let next = MILESTONE_STEP * (state.player.invincible_count as u64 + 1);
    if state.score >= next && !state.player.invincible && state.power_up.is_none() {
        state.player.invincible = true;
        state.player.invincible_count += 1;
        state.player.invincible_timer = INVINCIBLE_FRAMES;
        state.push_sound(SoundCue::PowerUp);
    }
    if state.player.invincible {
        state.player.invincible_timer -= dt;
        if state.player.invincible_timer <= 0.0 {
            state.player.invincible = false;
        }
    }
}

/// Re-roll the decorative field once per 200-point stage crossing
fn refresh_background_stage(state: &mut GameState) {
    let stage = state.score / STAGE_STEP;
    if stage != state.background_stage {
        state.background_stage = stage;
        let field = Background::generate(state.view, &mut state.rng);
        state.background = field;
    }
}

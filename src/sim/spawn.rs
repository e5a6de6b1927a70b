//! Periodic obstacle-pair and collectible spawner
//!
//! Fires on a fixed frame cadence while playing. The pair always fills the
//! viewport: top height + gap + bottom height = view height, with exactly one
//! collectible centered in the gap.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Collectible, CollectibleKind, GameState, Obstacle};
use crate::consts::*;

/// Spawn an obstacle pair plus one gap collectible on the fixed cadence
pub fn spawn_pair(state: &mut GameState) {
    if state.frame % SPAWN_INTERVAL_FRAMES != 0 {
        return;
    }

    let view = state.view;
    let gap = state.pipe_gap();
    let pipe_height = state.rng.random_range(view.y * 0.2..view.y * 0.6);

    let top = Obstacle::new(view.x, pipe_height, true, &mut state.rng);
    let bottom = Obstacle::new(view.x, view.y - pipe_height - gap, false, &mut state.rng);
    state.obstacles.push(top);
    state.obstacles.push(bottom);

    let kind = roll_collectible(&mut state.rng);
    state.collectibles.push(Collectible {
        x: view.x + PIPE_WIDTH / 2.0,
        y: pipe_height + gap / 2.0,
        kind,
    });
}

/// Weighted roll: 10% capsule, 5% heart, 85% coin
fn roll_collectible(rng: &mut Pcg32) -> CollectibleKind {
    let roll: f32 = rng.random();
    if roll < 0.1 {
        CollectibleKind::PowerUpCapsule
    } else if roll < 0.15 {
        CollectibleKind::Heart
    } else {
        CollectibleKind::Coin
    }
}

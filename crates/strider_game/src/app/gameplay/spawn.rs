use std::time::Duration;

use rand::Rng;

use super::types::{Coin, EntityId, Obstacle, ObstacleKind};
use super::{
    BIRD_HEIGHT_PX, COIN_OFFSET_MAX_PX, COIN_OFFSET_MIN_PX, INITIAL_COIN_FIRST_X_PX,
    INITIAL_COIN_SPACING_PX, INITIAL_OBSTACLE_FIRST_X_PX, INITIAL_OBSTACLE_SPACING_PX,
    OBSTACLE_HEIGHT_MAX_PX, OBSTACLE_HEIGHT_MIN_PX, OBSTACLE_WIDTH_MAX_PX, OBSTACLE_WIDTH_MIN_PX,
    SPAWN_INTERVAL_MAX_MS, SPAWN_INTERVAL_MIN_MS,
};

/// Elapsed-time accumulator for one spawn lane. Each poll compares the
/// elapsed time against a fresh uniform draw from the spawn interval, so
/// gaps between spawns land anywhere in [min, max).
#[derive(Debug, Default)]
pub(crate) struct SpawnTimer {
    since_last: Duration,
}

impl SpawnTimer {
    pub(crate) fn reset(&mut self) {
        self.since_last = Duration::ZERO;
    }

    pub(crate) fn poll<R: Rng>(&mut self, dt: Duration, rng: &mut R) -> bool {
        self.since_last = self.since_last.saturating_add(dt);
        let threshold_ms = rng.gen_range(SPAWN_INTERVAL_MIN_MS..SPAWN_INTERVAL_MAX_MS);
        if self.since_last.as_secs_f64() * 1000.0 > threshold_ms {
            self.since_last = Duration::ZERO;
            true
        } else {
            false
        }
    }
}

pub(crate) fn roll_kind<R: Rng>(rng: &mut R) -> ObstacleKind {
    match rng.gen_range(0..3) {
        0 => ObstacleKind::Cactus,
        1 => ObstacleKind::Rock,
        _ => ObstacleKind::Bird,
    }
}

pub(crate) fn roll_obstacle<R: Rng>(rng: &mut R, id: EntityId, x: f32) -> Obstacle {
    let kind = roll_kind(rng);
    let width = rng.gen_range(OBSTACLE_WIDTH_MIN_PX..OBSTACLE_WIDTH_MAX_PX) as f32;
    let height = if kind == ObstacleKind::Bird {
        BIRD_HEIGHT_PX
    } else {
        rng.gen_range(OBSTACLE_HEIGHT_MIN_PX..OBSTACLE_HEIGHT_MAX_PX) as f32
    };
    Obstacle {
        id,
        x,
        width,
        height,
        kind,
    }
}

pub(crate) fn roll_coin<R: Rng>(rng: &mut R, id: EntityId, x: f32) -> Coin {
    Coin {
        id,
        x,
        offset_y: rng.gen_range(COIN_OFFSET_MIN_PX..COIN_OFFSET_MAX_PX) as f32,
        collected: false,
        fade_ticks_left: 0,
    }
}

/// Populates the stretch ahead of the runner at session start: 2-3 obstacles
/// spaced down the course and 1-2 coins on a different rhythm.
pub(crate) fn seed_course<R: Rng>(
    rng: &mut R,
    next_entity_id: &mut u64,
) -> (Vec<Obstacle>, Vec<Coin>) {
    let obstacle_count = rng.gen_range(2..4);
    let mut obstacles = Vec::with_capacity(obstacle_count);
    for index in 0..obstacle_count {
        let id = alloc_entity_id(next_entity_id);
        let x = INITIAL_OBSTACLE_FIRST_X_PX + index as f32 * INITIAL_OBSTACLE_SPACING_PX;
        obstacles.push(roll_obstacle(rng, id, x));
    }

    let coin_count = rng.gen_range(1..3);
    let mut coins = Vec::with_capacity(coin_count);
    for index in 0..coin_count {
        let id = alloc_entity_id(next_entity_id);
        let x = INITIAL_COIN_FIRST_X_PX + index as f32 * INITIAL_COIN_SPACING_PX;
        coins.push(roll_coin(rng, id, x));
    }

    (obstacles, coins)
}

fn alloc_entity_id(next_entity_id: &mut u64) -> EntityId {
    let id = EntityId(*next_entity_id);
    *next_entity_id = next_entity_id.saturating_add(1);
    id
}

use std::time::Duration;

mod hitbox;
mod scoreboard;
mod session;
mod spawn;
mod types;

pub(crate) use scoreboard::{HighScoreStore, JsonScoreboard, MemoryScoreboard};
pub(crate) use session::RunnerSession;
pub(crate) use types::{GamePhase, ObstacleKind, RunnerEvent};

#[cfg(test)]
pub(crate) use types::{Coin, EntityId, Obstacle};

// Course geometry. Coordinates are play-area pixels with y growing downward;
// the runner's feet rest on the ground line at 180.
pub(crate) const VIEW_WIDTH_PX: f32 = 800.0;
pub(crate) const PLAYER_LEFT_PX: f32 = 50.0;
pub(crate) const PLAYER_RIGHT_PX: f32 = 80.0;
pub(crate) const PLAYER_STAND_TOP_PX: f32 = 150.0;
pub(crate) const PLAYER_STAND_BOTTOM_PX: f32 = 180.0;
pub(crate) const OBSTACLE_GROUND_TOP_PX: f32 = 150.0;
pub(crate) const BIRD_BAND_TOP_PX: f32 = 90.0;
pub(crate) const BIRD_HEIGHT_PX: f32 = 20.0;

// Spawn parameter ranges; min inclusive, max exclusive.
pub(crate) const OBSTACLE_WIDTH_MIN_PX: i32 = 20;
pub(crate) const OBSTACLE_WIDTH_MAX_PX: i32 = 40;
pub(crate) const OBSTACLE_HEIGHT_MIN_PX: i32 = 30;
pub(crate) const OBSTACLE_HEIGHT_MAX_PX: i32 = 60;
pub(crate) const COIN_SIZE_PX: f32 = 20.0;
pub(crate) const COIN_OFFSET_MIN_PX: i32 = 20;
pub(crate) const COIN_OFFSET_MAX_PX: i32 = 100;
pub(crate) const SPAWN_INTERVAL_MIN_MS: f64 = 1000.0;
pub(crate) const SPAWN_INTERVAL_MAX_MS: f64 = 3000.0;

// Scoring and pacing.
pub(crate) const COIN_BONUS_POINTS: u32 = 50;
pub(crate) const COIN_FADE_TICKS: u32 = 18;
pub(crate) const BASE_GAME_SPEED_PX: f32 = 5.0;
pub(crate) const SPEED_STEP_PX: f32 = 0.1;
pub(crate) const SPEED_STEP_SCORE: u32 = 500;

// Jump arc: a 15 ms sub-frame timer drives progress 0..=30; offset peaks at
// 75 px on step 15 and is back on the ground past step 30.
pub(crate) const JUMP_TICK_PERIOD: Duration = Duration::from_millis(15);
pub(crate) const JUMP_RISE_STEPS: u32 = 15;
pub(crate) const JUMP_TOTAL_STEPS: u32 = 30;
pub(crate) const JUMP_STEP_PX: f32 = 5.0;

// Initial course seeded by the start operation so the first stretch is not
// empty while the spawn timers warm up.
pub(crate) const INITIAL_OBSTACLE_FIRST_X_PX: f32 = 800.0;
pub(crate) const INITIAL_OBSTACLE_SPACING_PX: f32 = 400.0;
pub(crate) const INITIAL_COIN_FIRST_X_PX: f32 = 1000.0;
pub(crate) const INITIAL_COIN_SPACING_PX: f32 = 350.0;

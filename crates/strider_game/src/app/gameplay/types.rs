use super::{BIRD_BAND_TOP_PX, OBSTACLE_GROUND_TOP_PX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntityId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObstacleKind {
    Cactus,
    Rock,
    Bird,
}

impl ObstacleKind {
    /// Top of the vertical band the obstacle occupies. Ground kinds anchor at
    /// ground level; birds fly in a band 90 px up.
    pub(crate) fn band_top_px(self) -> f32 {
        match self {
            ObstacleKind::Cactus | ObstacleKind::Rock => OBSTACLE_GROUND_TOP_PX,
            ObstacleKind::Bird => BIRD_BAND_TOP_PX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Obstacle {
    pub(crate) id: EntityId,
    pub(crate) x: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) kind: ObstacleKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Coin {
    pub(crate) id: EntityId,
    pub(crate) x: f32,
    pub(crate) offset_y: f32,
    pub(crate) collected: bool,
    /// Remaining fade-out ticks once collected; unused before collection.
    pub(crate) fade_ticks_left: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct PlayerState {
    pub(crate) offset_y: f32,
    pub(crate) jumping: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum GamePhase {
    #[default]
    Idle,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunnerEvent {
    SessionStarted,
    CoinCollected {
        coin_total: u32,
        score_bonus: u32,
    },
    NewHighScore {
        score: u32,
    },
    GameOver {
        final_score: u32,
        high_score: u32,
    },
}

/// Fire-and-forget notification queue. The session emits, the shell drains
/// once per tick; nothing here ever blocks or re-enters the session.
#[derive(Debug, Default)]
pub(crate) struct RunnerEventBus {
    pending: Vec<RunnerEvent>,
}

impl RunnerEventBus {
    pub(crate) fn emit(&mut self, event: RunnerEvent) {
        self.pending.push(event);
    }

    pub(crate) fn drain(&mut self) -> Vec<RunnerEvent> {
        std::mem::take(&mut self.pending)
    }
}

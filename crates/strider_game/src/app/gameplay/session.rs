use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use super::hitbox::{coin_hitbox, obstacle_hitbox, player_hitbox};
use super::spawn::{roll_coin, roll_obstacle, seed_course, SpawnTimer};
use super::types::{
    Coin, EntityId, GamePhase, Obstacle, PlayerState, RunnerEvent, RunnerEventBus,
};
use super::{
    BASE_GAME_SPEED_PX, COIN_BONUS_POINTS, COIN_FADE_TICKS, COIN_SIZE_PX, JUMP_RISE_STEPS,
    JUMP_STEP_PX, JUMP_TICK_PERIOD, JUMP_TOTAL_STEPS, SPEED_STEP_PX, SPEED_STEP_SCORE,
    VIEW_WIDTH_PX,
};

/// Sub-frame jump timer. Independent of the frame cadence: it consumes wall
/// time in 15 ms steps and is cancelled by dropping the handle, which is
/// safe to do any number of times.
#[derive(Debug, Default)]
struct JumpArc {
    progress: u32,
    carry: Duration,
}

/// Owns every piece of mutable game state and advances it once per fixed
/// tick. Renderers only ever see `&self`; the host maps raw input edges to
/// the `start`/`press_jump`/`restart` operations.
pub(crate) struct RunnerSession<R: Rng> {
    phase: GamePhase,
    score: u32,
    coin_count: u32,
    high_score: u32,
    speed: f32,
    speed_level: u32,
    player: PlayerState,
    jump: Option<JumpArc>,
    obstacles: Vec<Obstacle>,
    coins: Vec<Coin>,
    obstacle_timer: SpawnTimer,
    coin_timer: SpawnTimer,
    next_entity_id: u64,
    events: RunnerEventBus,
    rng: R,
}

impl<R: Rng> RunnerSession<R> {
    pub(crate) fn new(rng: R, high_score: u32) -> Self {
        Self {
            phase: GamePhase::Idle,
            score: 0,
            coin_count: 0,
            high_score,
            speed: BASE_GAME_SPEED_PX,
            speed_level: 0,
            player: PlayerState::default(),
            jump: None,
            obstacles: Vec::new(),
            coins: Vec::new(),
            obstacle_timer: SpawnTimer::default(),
            coin_timer: SpawnTimer::default(),
            next_entity_id: 0,
            events: RunnerEventBus::default(),
            rng,
        }
    }

    pub(crate) fn phase(&self) -> GamePhase {
        self.phase
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn coin_count(&self) -> u32 {
        self.coin_count
    }

    pub(crate) fn high_score(&self) -> u32 {
        self.high_score
    }

    pub(crate) fn speed(&self) -> f32 {
        self.speed
    }

    pub(crate) fn player(&self) -> PlayerState {
        self.player
    }

    pub(crate) fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub(crate) fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub(crate) fn drain_events(&mut self) -> Vec<RunnerEvent> {
        self.events.drain()
    }

    /// Start operation; doubles as restart from `GameOver`. Everything but
    /// the high score resets.
    pub(crate) fn start(&mut self) {
        if self.phase == GamePhase::Playing {
            return;
        }

        self.score = 0;
        self.coin_count = 0;
        self.speed = BASE_GAME_SPEED_PX;
        self.speed_level = 0;
        self.player = PlayerState::default();
        self.jump = None;
        self.obstacle_timer.reset();
        self.coin_timer.reset();
        let (obstacles, coins) = seed_course(&mut self.rng, &mut self.next_entity_id);
        self.obstacles = obstacles;
        self.coins = coins;
        self.phase = GamePhase::Playing;
        self.events.emit(RunnerEvent::SessionStarted);
        info!(high_score = self.high_score, "session_started");
    }

    /// Jump/start action. In `Idle` this is a start; mid-air and in
    /// `GameOver` it is a silent no-op.
    pub(crate) fn press_jump(&mut self) {
        match self.phase {
            GamePhase::Idle => self.start(),
            GamePhase::GameOver => {}
            GamePhase::Playing => {
                if self.player.jumping {
                    return;
                }
                self.player.jumping = true;
                self.jump = Some(JumpArc::default());
                debug!("jump_started");
            }
        }
    }

    /// Restart control; only live while the game-over overlay is shown.
    pub(crate) fn restart(&mut self) {
        if self.phase == GamePhase::GameOver {
            self.start();
        }
    }

    /// One fixed simulation tick. Does nothing outside `Playing`, which is
    /// what stops the world after game-over without any flag checks inside
    /// the update steps themselves.
    pub(crate) fn advance(&mut self, dt: Duration) {
        if self.phase != GamePhase::Playing {
            return;
        }

        self.step_jump_arc(dt);

        self.score = self.score.saturating_add(1);
        self.apply_speed_steps();

        if self.obstacle_timer.poll(dt, &mut self.rng) {
            let id = self.alloc_entity_id();
            self.obstacles
                .push(roll_obstacle(&mut self.rng, id, VIEW_WIDTH_PX));
        }
        if self.coin_timer.poll(dt, &mut self.rng) {
            let id = self.alloc_entity_id();
            self.coins.push(roll_coin(&mut self.rng, id, VIEW_WIDTH_PX));
        }

        self.advect_entities();
        self.prune_entities();
        self.collect_coins();

        if self.player_hit_obstacle() {
            self.finish_run();
        }
    }

    fn alloc_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        id
    }

    fn step_jump_arc(&mut self, dt: Duration) {
        let Some(arc) = self.jump.as_mut() else {
            return;
        };

        arc.carry = arc.carry.saturating_add(dt);
        while arc.carry >= JUMP_TICK_PERIOD && arc.progress <= JUMP_TOTAL_STEPS {
            arc.carry -= JUMP_TICK_PERIOD;
            arc.progress += 1;
        }
        let progress = arc.progress;

        if progress > JUMP_TOTAL_STEPS {
            self.jump = None;
            self.player.offset_y = 0.0;
            self.player.jumping = false;
        } else {
            self.player.offset_y = jump_offset_px(progress);
        }
    }

    /// Credits one speed step per 500-point boundary crossed, so a coin
    /// bonus that jumps straight over a boundary still counts.
    fn apply_speed_steps(&mut self) {
        let boundaries_crossed = self.score / SPEED_STEP_SCORE;
        if boundaries_crossed > self.speed_level {
            let steps = boundaries_crossed - self.speed_level;
            self.speed += SPEED_STEP_PX * steps as f32;
            self.speed_level = boundaries_crossed;
            debug!(score = self.score, speed = self.speed, "speed_step");
        }
    }

    fn advect_entities(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.x -= self.speed;
        }
        for coin in &mut self.coins {
            coin.x -= self.speed;
            if coin.collected {
                coin.fade_ticks_left = coin.fade_ticks_left.saturating_sub(1);
            }
        }
    }

    fn prune_entities(&mut self) {
        self.obstacles.retain(|obstacle| obstacle.x > -obstacle.width);
        self.coins.retain(|coin| {
            if coin.collected {
                coin.fade_ticks_left > 0
            } else {
                coin.x > -COIN_SIZE_PX
            }
        });
    }

    fn collect_coins(&mut self) {
        let player_box = player_hitbox(self.player.offset_y);
        for coin in &mut self.coins {
            if coin.collected || !coin_hitbox(coin).overlaps(&player_box) {
                continue;
            }
            coin.collected = true;
            coin.fade_ticks_left = COIN_FADE_TICKS;
            self.coin_count = self.coin_count.saturating_add(1);
            self.score = self.score.saturating_add(COIN_BONUS_POINTS);
            self.events.emit(RunnerEvent::CoinCollected {
                coin_total: self.coin_count,
                score_bonus: COIN_BONUS_POINTS,
            });
        }
    }

    fn player_hit_obstacle(&self) -> bool {
        let player_box = player_hitbox(self.player.offset_y);
        self.obstacles
            .iter()
            .any(|obstacle| obstacle_hitbox(obstacle).overlaps(&player_box))
    }

    fn finish_run(&mut self) {
        self.phase = GamePhase::GameOver;
        self.jump = None;
        self.player.jumping = false;

        let final_score = self.score;
        if final_score > self.high_score {
            self.high_score = final_score;
            self.events
                .emit(RunnerEvent::NewHighScore { score: final_score });
        }
        self.events.emit(RunnerEvent::GameOver {
            final_score,
            high_score: self.high_score,
        });
        info!(
            final_score,
            coin_count = self.coin_count,
            high_score = self.high_score,
            "session_over"
        );
    }
}

fn jump_offset_px(progress: u32) -> f32 {
    if progress <= JUMP_RISE_STEPS {
        progress as f32 * JUMP_STEP_PX
    } else if progress <= JUMP_TOTAL_STEPS {
        (JUMP_TOTAL_STEPS - progress) as f32 * JUMP_STEP_PX
    } else {
        0.0
    }
}

#[cfg(test)]
impl<R: Rng> RunnerSession<R> {
    pub(crate) fn force_score(&mut self, score: u32) {
        self.score = score;
        self.speed_level = score / SPEED_STEP_SCORE;
    }

    pub(crate) fn clear_course(&mut self) {
        self.obstacles.clear();
        self.coins.clear();
    }

    pub(crate) fn inject_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub(crate) fn inject_coin(&mut self, coin: Coin) {
        self.coins.push(coin);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::super::types::ObstacleKind;
    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn session_with_high_score(high_score: u32) -> RunnerSession<StdRng> {
        RunnerSession::new(StdRng::seed_from_u64(7), high_score)
    }

    fn playing_session() -> RunnerSession<StdRng> {
        let mut session = session_with_high_score(0);
        session.start();
        session.drain_events();
        session.clear_course();
        session
    }

    fn obstacle_on_player() -> Obstacle {
        Obstacle {
            id: EntityId(900),
            x: 55.0,
            width: 20.0,
            height: 40.0,
            kind: ObstacleKind::Cactus,
        }
    }

    fn coin_on_grounded_player() -> Coin {
        // Offset 15 puts the band at 135..155, clipping the resting player's
        // top edge at 150.
        Coin {
            id: EntityId(901),
            x: 60.0,
            offset_y: 15.0,
            collected: false,
            fade_ticks_left: 0,
        }
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 0.0001,
            "{actual} vs {expected}"
        );
    }

    #[test]
    fn new_session_idles_with_the_seeded_high_score() {
        let session = session_with_high_score(420);

        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.score(), 0);
        assert_eq!(session.high_score(), 420);
        assert!(session.obstacles().is_empty());
        assert!(session.coins().is_empty());
    }

    #[test]
    fn advance_outside_playing_changes_nothing() {
        let mut session = session_with_high_score(0);
        session.advance(FRAME);

        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn start_enters_playing_and_seeds_the_course() {
        let mut session = session_with_high_score(0);
        session.start();

        assert_eq!(session.phase(), GamePhase::Playing);
        assert!((2..=3).contains(&session.obstacles().len()));
        assert!((1..=2).contains(&session.coins().len()));
        assert_eq!(session.obstacles()[0].x, 800.0);
        assert_eq!(session.coins()[0].x, 1000.0);
        assert_eq!(session.drain_events(), vec![RunnerEvent::SessionStarted]);
    }

    #[test]
    fn start_while_playing_is_ignored() {
        let mut session = playing_session();
        session.advance(FRAME);
        let score_before = session.score();
        session.start();

        assert_eq!(session.score(), score_before);
    }

    #[test]
    fn score_increases_every_playing_tick() {
        let mut session = playing_session();
        for expected in 1..=50 {
            session.advance(FRAME);
            assert_eq!(session.score(), expected);
        }
    }

    #[test]
    fn speed_steps_by_a_tenth_at_each_five_hundred_boundary() {
        let mut session = playing_session();
        assert_close(session.speed(), 5.0);

        session.force_score(499);
        session.advance(FRAME);
        assert_eq!(session.score(), 500);
        assert_close(session.speed(), 5.1);

        session.force_score(999);
        session.advance(FRAME);
        assert_eq!(session.score(), 1000);
        assert_close(session.speed(), 5.2);
    }

    #[test]
    fn speed_never_decreases_over_a_session() {
        let mut session = playing_session();
        let mut last_speed = session.speed();
        for _ in 0..120 {
            session.advance(FRAME);
            assert!(session.speed() >= last_speed);
            last_speed = session.speed();
        }
    }

    #[test]
    fn coin_bonus_skipping_a_boundary_still_credits_the_step() {
        let mut session = playing_session();
        session.force_score(480);
        let speed = session.speed();
        session.inject_coin(Coin {
            x: 60.0 + speed,
            ..coin_on_grounded_player()
        });

        session.advance(FRAME);
        assert_eq!(session.score(), 531);

        session.advance(FRAME);
        assert_eq!(session.score(), 532);
        assert_close(session.speed(), 5.1);
        assert_eq!(session.speed_level, 1);
    }

    #[test]
    fn entities_advect_left_by_exactly_the_current_speed() {
        let mut session = playing_session();
        session.inject_obstacle(Obstacle {
            x: 300.0,
            ..obstacle_on_player()
        });
        session.inject_coin(Coin {
            x: 400.0,
            ..coin_on_grounded_player()
        });

        let speed = session.speed();
        session.advance(FRAME);
        assert_close(session.obstacles()[0].x, 300.0 - speed);
        assert_close(session.coins()[0].x, 400.0 - speed);
    }

    #[test]
    fn offscreen_obstacles_prune_within_one_tick() {
        let mut session = playing_session();
        session.inject_obstacle(Obstacle {
            x: -25.0,
            width: 20.0,
            ..obstacle_on_player()
        });

        session.advance(FRAME);
        assert!(session.obstacles().is_empty());
    }

    #[test]
    fn offscreen_uncollected_coins_prune_within_one_tick() {
        let mut session = playing_session();
        session.inject_coin(Coin {
            x: -21.0,
            ..coin_on_grounded_player()
        });

        session.advance(FRAME);
        assert!(session.coins().is_empty());
    }

    #[test]
    fn collected_coins_linger_only_until_the_fade_runs_out() {
        let mut session = playing_session();
        session.inject_coin(Coin {
            x: -100.0,
            collected: true,
            fade_ticks_left: 3,
            ..coin_on_grounded_player()
        });

        session.advance(FRAME);
        assert_eq!(session.coins().len(), 1);
        session.advance(FRAME);
        assert_eq!(session.coins().len(), 1);
        session.advance(FRAME);
        assert!(session.coins().is_empty());
    }

    #[test]
    fn overlapping_coin_collects_exactly_once() {
        let mut session = playing_session();
        let speed = session.speed();
        session.inject_coin(Coin {
            x: 55.0 + speed,
            ..coin_on_grounded_player()
        });

        session.advance(FRAME);
        assert_eq!(session.coin_count(), 1);
        assert_eq!(session.score(), 1 + COIN_BONUS_POINTS);
        assert!(session.coins()[0].collected);
        let events = session.drain_events();
        assert_eq!(
            events,
            vec![RunnerEvent::CoinCollected {
                coin_total: 1,
                score_bonus: COIN_BONUS_POINTS,
            }]
        );

        // Still overlapping on the next tick; nothing collects twice.
        session.advance(FRAME);
        assert_eq!(session.coin_count(), 1);
        assert_eq!(session.score(), 2 + COIN_BONUS_POINTS);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn collected_flag_never_reverts() {
        let mut session = playing_session();
        let speed = session.speed();
        session.inject_coin(Coin {
            x: 55.0 + speed,
            ..coin_on_grounded_player()
        });

        session.advance(FRAME);
        for _ in 0..5 {
            session.advance(FRAME);
            if let Some(coin) = session.coins().first() {
                assert!(coin.collected);
            }
        }
    }

    #[test]
    fn obstacle_overlap_transitions_to_game_over_and_halts_updates() {
        let mut session = playing_session();
        session.inject_obstacle(Obstacle {
            x: 55.0 + session.speed(),
            ..obstacle_on_player()
        });

        session.advance(FRAME);
        assert_eq!(session.phase(), GamePhase::GameOver);
        let frozen_score = session.score();

        session.advance(FRAME);
        assert_eq!(session.score(), frozen_score);
        assert_eq!(session.phase(), GamePhase::GameOver);
    }

    #[test]
    fn game_over_records_a_new_high_score() {
        let mut session = playing_session();
        session.force_score(119);
        session.inject_obstacle(Obstacle {
            x: 55.0 + session.speed(),
            ..obstacle_on_player()
        });

        session.advance(FRAME);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.score(), 120);
        assert_eq!(session.high_score(), 120);
        assert_eq!(
            session.drain_events(),
            vec![
                RunnerEvent::NewHighScore { score: 120 },
                RunnerEvent::GameOver {
                    final_score: 120,
                    high_score: 120,
                },
            ]
        );
    }

    #[test]
    fn game_over_keeps_a_larger_previous_high_score() {
        let mut session = session_with_high_score(500);
        session.start();
        session.drain_events();
        session.clear_course();
        session.force_score(149);
        session.inject_obstacle(Obstacle {
            x: 55.0 + session.speed(),
            ..obstacle_on_player()
        });

        session.advance(FRAME);
        assert_eq!(session.high_score(), 500);
        assert_eq!(
            session.drain_events(),
            vec![RunnerEvent::GameOver {
                final_score: 150,
                high_score: 500,
            }]
        );
    }

    #[test]
    fn jump_press_in_idle_starts_the_session() {
        let mut session = session_with_high_score(0);
        session.press_jump();

        assert_eq!(session.phase(), GamePhase::Playing);
        assert!(!session.player().jumping);
    }

    #[test]
    fn jump_press_after_game_over_is_a_no_op() {
        let mut session = playing_session();
        session.inject_obstacle(Obstacle {
            x: 55.0 + session.speed(),
            ..obstacle_on_player()
        });
        session.advance(FRAME);
        assert_eq!(session.phase(), GamePhase::GameOver);

        session.press_jump();
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert!(!session.player().jumping);
    }

    #[test]
    fn jump_press_mid_arc_does_not_restart_the_arc() {
        let mut session = playing_session();
        session.press_jump();
        for _ in 0..5 {
            session.step_jump_arc(JUMP_TICK_PERIOD);
        }
        let progress_before = session.jump.as_ref().expect("arc").progress;
        let offset_before = session.player().offset_y;

        session.press_jump();
        assert_eq!(session.jump.as_ref().expect("arc").progress, progress_before);
        assert_close(session.player().offset_y, offset_before);
    }

    #[test]
    fn jump_arc_rises_to_the_peak_then_lands() {
        let mut session = playing_session();
        session.press_jump();
        assert!(session.player().jumping);

        for step in 1..=15u32 {
            session.step_jump_arc(JUMP_TICK_PERIOD);
            assert_close(session.player().offset_y, step as f32 * 5.0);
        }
        assert_close(session.player().offset_y, 75.0);

        for step in 16..=30u32 {
            session.step_jump_arc(JUMP_TICK_PERIOD);
            assert_close(session.player().offset_y, (30 - step) as f32 * 5.0);
        }
        assert_close(session.player().offset_y, 0.0);
        assert!(session.player().jumping);

        session.step_jump_arc(JUMP_TICK_PERIOD);
        assert!(!session.player().jumping);
        assert!(session.jump.is_none());
        assert_close(session.player().offset_y, 0.0);
    }

    #[test]
    fn jump_arc_catches_up_across_a_long_tick() {
        let mut session = playing_session();
        session.press_jump();

        // One 60 Hz frame covers one 15 ms step plus carry.
        session.step_jump_arc(Duration::from_millis(45));
        assert_close(session.player().offset_y, 15.0);
    }

    #[test]
    fn game_over_cancels_an_inflight_jump() {
        let mut session = playing_session();
        session.press_jump();
        session.inject_obstacle(Obstacle {
            x: 55.0 + session.speed(),
            ..obstacle_on_player()
        });

        session.advance(FRAME);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert!(session.jump.is_none());
        assert!(!session.player().jumping);
    }

    #[test]
    fn restart_resets_the_run_but_keeps_the_high_score() {
        let mut session = playing_session();
        session.force_score(239);
        session.inject_obstacle(Obstacle {
            x: 55.0 + session.speed(),
            ..obstacle_on_player()
        });
        session.advance(FRAME);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.high_score(), 240);

        session.restart();
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.coin_count(), 0);
        assert_close(session.speed(), 5.0);
        assert_eq!(session.high_score(), 240);
        assert!((2..=3).contains(&session.obstacles().len()));
    }

    #[test]
    fn restart_outside_game_over_is_ignored() {
        let mut session = playing_session();
        session.advance(FRAME);
        let score_before = session.score();

        session.restart();
        assert_eq!(session.score(), score_before);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn spawned_obstacles_arrive_inside_the_interval_window() {
        let mut session = playing_session();

        let mut ticks = 0u32;
        while session.obstacles().is_empty() {
            session.advance(FRAME);
            ticks += 1;
            assert!(ticks < 200, "no spawn within the maximum interval");
        }

        // 1000 ms of 60 Hz ticks is the earliest legal spawn.
        assert!(ticks >= 59, "spawned after only {ticks} ticks");
        let obstacle = session.obstacles()[0];
        assert!(obstacle.x > VIEW_WIDTH_PX - 2.0 * session.speed());
        assert!(obstacle.width >= 20.0 && obstacle.width < 40.0);
    }

    #[test]
    fn entity_ids_stay_unique_across_spawns_and_restarts() {
        let mut session = playing_session();
        for _ in 0..190 {
            session.advance(FRAME);
        }
        session.inject_obstacle(obstacle_on_player());
        session.advance(FRAME);
        session.restart();

        let mut ids: Vec<u64> = session
            .obstacles()
            .iter()
            .map(|obstacle| obstacle.id.0)
            .chain(session.coins().iter().map(|coin| coin.id.0))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), session.obstacles().len() + session.coins().len());
    }
}

use std::time::Duration;

use rand::rngs::StdRng;
use strider_engine::{Canvas, GameApp, InputSnapshot, LoopCommand};
use tracing::{info, warn};

use super::gameplay::{
    GamePhase, HighScoreStore, ObstacleKind, RunnerEvent, RunnerSession, COIN_SIZE_PX,
    PLAYER_LEFT_PX, PLAYER_RIGHT_PX, PLAYER_STAND_TOP_PX, VIEW_WIDTH_PX,
};

type Color = [u8; 4];

const SKY_COLOR: Color = [247, 247, 247, 255];
const INK_COLOR: Color = [40, 44, 52, 255];
const PLAYER_COLOR: Color = [60, 64, 72, 255];
const PLAYER_CRASH_COLOR: Color = [190, 70, 60, 255];
const CACTUS_COLOR: Color = [46, 125, 50, 255];
const ROCK_COLOR: Color = [120, 113, 108, 255];
const BIRD_COLOR: Color = [84, 110, 160, 255];
const COIN_COLOR: Color = [255, 200, 40, 255];
const COIN_FADE_COLOR: Color = [255, 228, 160, 255];
const GROUND_COLOR: Color = [90, 90, 90, 255];
const PANEL_BG_COLOR: Color = [252, 252, 252, 255];
const PANEL_BORDER_COLOR: Color = [92, 106, 126, 255];
const TOAST_BG_COLOR: Color = [24, 26, 32, 255];
const TOAST_TEXT_COLOR: Color = [244, 248, 252, 255];

// Screen layout: HUD row above the play band, ground strip below it.
const PLAY_AREA_TOP_PX: i32 = 60;
const GROUND_LINE_SCREEN_PX: i32 = PLAY_AREA_TOP_PX + 180;
const HUD_ORIGIN_PX: (i32, i32) = (12, 12);
const HUD_TEXT_SCALE: i32 = 2;
const FOOTER_HINT: &str = "SPACE OR CLICK TO JUMP";
const GROUND_DASH_PX: f32 = 24.0;

const TOAST_TTL_TICKS: u32 = 90;
const MAX_TOASTS: usize = 3;

#[derive(Debug)]
struct Toast {
    line: String,
    ticks_left: u32,
}

/// The windowed shell around the session: maps input edges to session
/// operations, relays session events to the log, the scoreboard store, and
/// on-screen toasts, and paints every frame from a read-only snapshot.
pub(crate) struct RunnerApp {
    session: RunnerSession<StdRng>,
    store: Box<dyn HighScoreStore>,
    toasts: Vec<Toast>,
    ground_phase: f32,
    celebrating_high_score: bool,
}

impl RunnerApp {
    pub(crate) fn new(session: RunnerSession<StdRng>, store: Box<dyn HighScoreStore>) -> Self {
        Self {
            session,
            store,
            toasts: Vec::new(),
            ground_phase: 0.0,
            celebrating_high_score: false,
        }
    }

    fn apply_input(&mut self, input: &InputSnapshot) {
        if input.jump_pressed() || input.pointer_pressed() {
            self.session.press_jump();
        }
        if input.restart_pressed() && self.session.phase() == GamePhase::GameOver {
            self.session.restart();
        }
    }

    fn relay_session_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                RunnerEvent::SessionStarted => {
                    self.celebrating_high_score = false;
                    self.toasts.clear();
                    self.ground_phase = 0.0;
                    self.push_toast("GO!".to_string());
                }
                RunnerEvent::CoinCollected {
                    coin_total,
                    score_bonus,
                } => {
                    info!(coin_total, score_bonus, "coin_collected");
                    self.push_toast(format!("COIN +{score_bonus}"));
                }
                RunnerEvent::NewHighScore { score } => {
                    self.celebrating_high_score = true;
                    self.push_toast("NEW HIGH SCORE!".to_string());
                    if let Err(error) = self.store.store(score) {
                        warn!(error = error.as_str(), "high_score_save_failed");
                    } else {
                        info!(score, "high_score_saved");
                    }
                }
                RunnerEvent::GameOver {
                    final_score,
                    high_score,
                } => {
                    info!(final_score, high_score, "game_over");
                }
            }
        }
    }

    fn push_toast(&mut self, line: String) {
        self.toasts.insert(
            0,
            Toast {
                line,
                ticks_left: TOAST_TTL_TICKS,
            },
        );
        self.toasts.truncate(MAX_TOASTS);
    }

    fn expire_toasts(&mut self) {
        for toast in &mut self.toasts {
            toast.ticks_left = toast.ticks_left.saturating_sub(1);
        }
        self.toasts.retain(|toast| toast.ticks_left > 0);
    }

    fn draw_ground(&self, canvas: &mut Canvas<'_>) {
        canvas.hline(
            GROUND_LINE_SCREEN_PX,
            0,
            canvas.width() as i32,
            GROUND_COLOR,
        );
        let dash_width = GROUND_DASH_PX as i32 / 2;
        let mut x = -self.ground_phase;
        while x < VIEW_WIDTH_PX {
            canvas.fill_rect(
                x as i32,
                GROUND_LINE_SCREEN_PX + 5,
                dash_width,
                3,
                GROUND_COLOR,
            );
            x += GROUND_DASH_PX * 2.0;
        }
    }

    fn draw_player(&self, canvas: &mut Canvas<'_>) {
        let player = self.session.player();
        let color = if self.session.phase() == GamePhase::GameOver {
            PLAYER_CRASH_COLOR
        } else {
            PLAYER_COLOR
        };
        let top = PLAY_AREA_TOP_PX + (PLAYER_STAND_TOP_PX - player.offset_y) as i32;
        let width = (PLAYER_RIGHT_PX - PLAYER_LEFT_PX) as i32;
        canvas.fill_rect(PLAYER_LEFT_PX as i32, top, width, 30, color);
    }

    fn draw_obstacles(&self, canvas: &mut Canvas<'_>) {
        for obstacle in self.session.obstacles() {
            let color = match obstacle.kind {
                ObstacleKind::Cactus => CACTUS_COLOR,
                ObstacleKind::Rock => ROCK_COLOR,
                ObstacleKind::Bird => BIRD_COLOR,
            };
            let top = PLAY_AREA_TOP_PX + obstacle.kind.band_top_px() as i32;
            canvas.fill_rect(
                obstacle.x as i32,
                top,
                obstacle.width as i32,
                obstacle.height as i32,
                color,
            );
        }
    }

    fn draw_coins(&self, canvas: &mut Canvas<'_>) {
        for coin in self.session.coins() {
            let color = if coin.collected {
                COIN_FADE_COLOR
            } else {
                COIN_COLOR
            };
            let top = PLAY_AREA_TOP_PX + (PLAYER_STAND_TOP_PX - coin.offset_y) as i32;
            let size = COIN_SIZE_PX as i32;
            canvas.fill_rect(coin.x as i32, top, size, size, color);
            canvas.outline_rect(coin.x as i32, top, size, size, INK_COLOR);
        }
    }

    fn draw_hud(&self, canvas: &mut Canvas<'_>) {
        let line = hud_line(
            self.session.score(),
            self.session.coin_count(),
            self.session.high_score(),
        );
        canvas.draw_text(
            HUD_ORIGIN_PX.0,
            HUD_ORIGIN_PX.1,
            &line,
            HUD_TEXT_SCALE,
            INK_COLOR,
        );

        let footer_y = canvas.height() as i32 - 22;
        let footer_x = (canvas.width() as i32 - Canvas::text_width(FOOTER_HINT, 1)) / 2;
        canvas.draw_text(footer_x, footer_y, FOOTER_HINT, 1, GROUND_COLOR);
    }

    fn draw_toasts(&self, canvas: &mut Canvas<'_>) {
        let mut y = HUD_ORIGIN_PX.1;
        for toast in &self.toasts {
            let text_width = Canvas::text_width(&toast.line, 1);
            let panel_width = text_width + 12;
            let panel_height = Canvas::text_height(1) + 8;
            let x = canvas.width() as i32 - panel_width - 12;
            canvas.fill_rect(x, y, panel_width, panel_height, TOAST_BG_COLOR);
            canvas.draw_text(x + 6, y + 4, &toast.line, 1, TOAST_TEXT_COLOR);
            y += panel_height + 6;
        }
    }

    fn draw_overlay_panel(&self, canvas: &mut Canvas<'_>, lines: &[(String, i32)]) {
        let line_gap = 8;
        let panel_inset = 14;
        let content_width = lines
            .iter()
            .map(|(text, scale)| Canvas::text_width(text, *scale))
            .max()
            .unwrap_or(0);
        let content_height: i32 = lines
            .iter()
            .map(|(_, scale)| Canvas::text_height(*scale) + line_gap)
            .sum::<i32>()
            - line_gap;

        let panel_width = content_width + panel_inset * 2;
        let panel_height = content_height + panel_inset * 2;
        let panel_x = (canvas.width() as i32 - panel_width) / 2;
        let panel_y = PLAY_AREA_TOP_PX + (180 - panel_height) / 2;

        canvas.fill_rect(panel_x, panel_y, panel_width, panel_height, PANEL_BG_COLOR);
        canvas.outline_rect(panel_x, panel_y, panel_width, panel_height, PANEL_BORDER_COLOR);

        let mut y = panel_y + panel_inset;
        for (text, scale) in lines {
            let x = (canvas.width() as i32 - Canvas::text_width(text, *scale)) / 2;
            canvas.draw_text(x, y, text, *scale, INK_COLOR);
            y += Canvas::text_height(*scale) + line_gap;
        }
    }

    fn draw_idle_overlay(&self, canvas: &mut Canvas<'_>) {
        let lines = vec![
            ("STRIDER".to_string(), 3),
            ("PRESS SPACE OR CLICK TO START".to_string(), 1),
        ];
        self.draw_overlay_panel(canvas, &lines);
    }

    fn draw_game_over_overlay(&self, canvas: &mut Canvas<'_>) {
        let mut lines = vec![
            ("GAME OVER".to_string(), 3),
            (format!("SCORE {:05}", self.session.score()), 2),
            (format!("HI {:05}", self.session.high_score()), 2),
        ];
        if self.celebrating_high_score {
            lines.push(("NEW HIGH SCORE!".to_string(), 2));
        }
        lines.push(("PRESS R TO RESTART".to_string(), 1));
        self.draw_overlay_panel(canvas, &lines);
    }
}

impl GameApp for RunnerApp {
    fn update(&mut self, dt: Duration, input: &InputSnapshot) -> LoopCommand {
        if input.quit_requested() {
            return LoopCommand::Exit;
        }

        self.apply_input(input);
        self.session.advance(dt);
        if self.session.phase() == GamePhase::Playing {
            self.ground_phase =
                (self.ground_phase + self.session.speed()) % (GROUND_DASH_PX * 2.0);
        }
        self.relay_session_events();
        self.expire_toasts();
        LoopCommand::Continue
    }

    fn draw(&self, canvas: &mut Canvas<'_>) {
        canvas.clear(SKY_COLOR);
        self.draw_ground(canvas);
        self.draw_coins(canvas);
        self.draw_obstacles(canvas);
        self.draw_player(canvas);
        self.draw_hud(canvas);
        match self.session.phase() {
            GamePhase::Idle => self.draw_idle_overlay(canvas),
            GamePhase::GameOver => self.draw_game_over_overlay(canvas),
            GamePhase::Playing => {}
        }
        self.draw_toasts(canvas);
    }
}

fn hud_line(score: u32, coin_count: u32, high_score: u32) -> String {
    format!("SCORE {score:05}  COINS {coin_count:02}  HI {high_score:05}")
}

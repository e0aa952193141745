use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::canvas::Renderer;
use super::game::{GameApp, LoopCommand};
use super::input::{ActionStates, InputAction, InputSnapshot};
use super::metrics::MetricsWindow;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Strider".to_string(),
            window_width: 800,
            window_height: 300,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, mut game: Box<dyn GameApp>) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let tick_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let max_frame_delta = non_zero_or(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval = non_zero_or(config.metrics_log_interval, Duration::from_secs(1));

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut accumulated = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics = MetricsWindow::new(metrics_log_interval);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;
                        accumulated =
                            accumulated.saturating_add(raw_frame_dt.min(max_frame_delta));

                        let budget = budget_ticks(accumulated, tick_dt, max_ticks_per_frame);
                        accumulated = budget.carry;
                        for _ in 0..budget.ticks {
                            let snapshot = input_collector.snapshot_for_tick();
                            if game.update(tick_dt, &snapshot) == LoopCommand::Exit {
                                info!(reason = "game_request", "shutdown_requested");
                                window_target.exit();
                                return;
                            }
                        }
                        if budget.dropped > Duration::ZERO {
                            warn!(
                                dropped_backlog_ms = budget.dropped.as_millis() as u64,
                                max_ticks_per_frame, "sim_clamp_triggered"
                            );
                        }

                        if let Err(error) = renderer.present(game.as_ref()) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }

                        metrics.on_frame(raw_frame_dt);
                        metrics.on_ticks(budget.ticks);
                        if let Some(snapshot) = metrics.rollover(now) {
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                frame_time_ms = snapshot.frame_time_ms,
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// How many fixed ticks to run this frame. Backlog beyond the tick cap is
/// dropped instead of carried, so a long stall cannot snowball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickBudget {
    ticks: u32,
    carry: Duration,
    dropped: Duration,
}

fn budget_ticks(accumulated: Duration, tick_dt: Duration, max_ticks: u32) -> TickBudget {
    let available = (accumulated.as_nanos() / tick_dt.as_nanos().max(1)) as u32;
    let ticks = available.min(max_ticks);
    let consumed = tick_dt
        .checked_mul(ticks)
        .unwrap_or(accumulated)
        .min(accumulated);
    let remainder = accumulated.saturating_sub(consumed);

    if available > max_ticks {
        TickBudget {
            ticks,
            carry: Duration::ZERO,
            dropped: remainder,
        }
    } else {
        TickBudget {
            ticks,
            carry: remainder,
            dropped: Duration::ZERO,
        }
    }
}

fn non_zero_or(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    jump_key_is_down: bool,
    jump_pressed_edge: bool,
    restart_key_is_down: bool,
    restart_pressed_edge: bool,
    left_mouse_is_down: bool,
    pointer_pressed_edge: bool,
    action_states: ActionStates,
}

impl InputCollector {
    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        match key_event.physical_key {
            PhysicalKey::Code(KeyCode::Space) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.handle_jump_key_state(is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyR) => {
                self.handle_restart_key_state(is_pressed);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    fn handle_jump_key_state(&mut self, is_pressed: bool) {
        if is_pressed {
            if !self.jump_key_is_down {
                self.jump_pressed_edge = true;
            }
            self.jump_key_is_down = true;
        } else {
            self.jump_key_is_down = false;
        }
        self.action_states.set(InputAction::Jump, is_pressed);
    }

    fn handle_restart_key_state(&mut self, is_pressed: bool) {
        if is_pressed {
            if !self.restart_key_is_down {
                self.restart_pressed_edge = true;
            }
            self.restart_key_is_down = true;
        } else {
            self.restart_key_is_down = false;
        }
        self.action_states.set(InputAction::Restart, is_pressed);
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    self.pointer_pressed_edge = true;
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.jump_pressed_edge,
            self.restart_pressed_edge,
            self.pointer_pressed_edge,
            self.action_states,
        );
        self.jump_pressed_edge = false;
        self.restart_pressed_edge = false;
        self.pointer_pressed_edge = false;
        snapshot
    }
}

mod canvas;
mod game;
mod input;
mod loop_runner;
mod metrics;

pub use canvas::Canvas;
pub use game::{GameApp, LoopCommand};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;

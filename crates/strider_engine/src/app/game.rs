use std::time::Duration;

use super::canvas::Canvas;
use super::input::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCommand {
    Continue,
    Exit,
}

/// Seam between the host loop and a game. `update` runs once per fixed
/// simulation tick with the input edges collected since the previous tick;
/// `draw` runs once per presented frame and owns the whole canvas, clear
/// included.
pub trait GameApp {
    fn update(&mut self, dt: Duration, input: &InputSnapshot) -> LoopCommand;
    fn draw(&self, canvas: &mut Canvas<'_>);
}

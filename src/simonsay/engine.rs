// engine.rs

use std::io;

use ratatui::Frame;

use super::input::GameInput;

/// One turn of the cooperative game loop: apply any user input, fire due
/// timers and report whether the loop should exit.
pub trait Engine {
    fn tick(&mut self, user_input: Option<GameInput>) -> io::Result<bool>;
    fn render_frame(&self, frame: &mut Frame);
}

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode};

use super::game_model::Pad;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameInput {
    Press(Pad),
    Start,
    Stop,
    ToggleStrict,
    ClearRecords,
    Confirm,
    CycleTheme,
    Quit,
}

pub fn handle_events() -> io::Result<Option<GameInput>> {
    if event::poll(Duration::from_millis(50))? {
        if let Event::Key(key) = event::read()? {
            return Ok(map_key(key.code));
        }
    }
    Ok(None)
}

// Each pad has a digit and a home-row binding; both reach the same logical
// input, with the engine's debounce catching doubled events.
pub fn map_key(code: KeyCode) -> Option<GameInput> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(GameInput::Quit),
        KeyCode::Enter => Some(GameInput::Start),
        KeyCode::Char('s') => Some(GameInput::Stop),
        KeyCode::Char('m') => Some(GameInput::ToggleStrict),
        KeyCode::Char('c') => Some(GameInput::ClearRecords),
        KeyCode::Char('y') => Some(GameInput::Confirm),
        KeyCode::Char('t') => Some(GameInput::CycleTheme),
        KeyCode::Char('1') | KeyCode::Char('h') => Some(GameInput::Press(Pad::Green)),
        KeyCode::Char('2') | KeyCode::Char('j') => Some(GameInput::Press(Pad::Red)),
        KeyCode::Char('3') | KeyCode::Char('k') => Some(GameInput::Press(Pad::Yellow)),
        KeyCode::Char('4') | KeyCode::Char('l') => Some(GameInput::Press(Pad::Blue)),
        _ => None,
    }
}

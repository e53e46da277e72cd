use std::time::{Duration, Instant};

use super::{game_model::Pad, theme::Theme};

/// Presentation side of the round engine. The engine only emits abstract
/// events through this trait and never touches the terminal itself.
pub trait Presenter {
    /// Light up one pad for `duration`, starting at `now`.
    fn highlight(&mut self, pad: Pad, duration: Duration, now: Instant);
    fn status(&mut self, text: &str);
    fn score(&mut self, score: u32, high_score: u32);
    fn controls(&mut self, start_enabled: bool, stop_enabled: bool);
}

/// Terminal presenter state. Records the engine's events; drawing happens in
/// the render engine.
pub struct GameView {
    status: String,
    score: u32,
    high_score: u32,
    lit: Option<(Pad, Instant)>,
    start_enabled: bool,
    stop_enabled: bool,
    strict: bool,
    theme: Theme,
}

impl GameView {
    pub fn new(high_score: u32, strict: bool, theme: Theme) -> Self {
        Self {
            status: String::new(),
            score: 0,
            high_score,
            lit: None,
            start_enabled: true,
            stop_enabled: false,
            strict,
            theme,
        }
    }

    /// Clears an expired highlight. Called once per loop iteration.
    pub fn expire(&mut self, now: Instant) {
        if let Some((_, until)) = self.lit {
            if now >= until {
                self.lit = None;
            }
        }
    }

    pub fn lit_pad(&self) -> Option<Pad> {
        self.lit.map(|(pad, _)| pad)
    }

    pub fn status_text(&self) -> &str {
        &self.status
    }

    pub fn score_line(&self) -> String {
        format!("Score: {} (High: {})", self.score, self.high_score)
    }

    pub fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    pub fn stop_enabled(&self) -> bool {
        self.stop_enabled
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

impl Presenter for GameView {
    fn highlight(&mut self, pad: Pad, duration: Duration, now: Instant) {
        self.lit = Some((pad, now + duration));
    }

    fn status(&mut self, text: &str) {
        self.status.clear();
        self.status.push_str(text);
    }

    fn score(&mut self, score: u32, high_score: u32) {
        self.score = score;
        self.high_score = high_score;
    }

    fn controls(&mut self, start_enabled: bool, stop_enabled: bool) {
        self.start_enabled = start_enabled;
        self.stop_enabled = stop_enabled;
    }
}

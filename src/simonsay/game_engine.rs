// game_engine.rs

use ratatui::Frame;
use std::io;
use std::time::Instant;

use super::{
    engine::Engine,
    game_model::RoundEngine,
    input::GameInput,
    presenter::{GameView, Presenter},
    score_store::ScoreStore,
    theme::Theme,
};

/// Routes user input to the round engine and the view, and owns the
/// out-of-band commands (strict toggle, theme cycling, record clearing).
pub struct GameEngine<S: ScoreStore> {
    pub round: RoundEngine,
    pub view: GameView,
    store: S,
    confirm_clear: bool,
}

impl<S: ScoreStore> GameEngine<S> {
    pub fn new(store: S, strict: bool, max_level: u32, theme: Theme) -> GameEngine<S> {
        let high_score = store.read();
        let round = RoundEngine::new(high_score, strict, max_level);
        let mut view = GameView::new(high_score, strict, theme);
        view.score(0, high_score);
        GameEngine {
            round,
            view,
            store,
            confirm_clear: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One loop iteration at an explicit `now`; returns true when the game
    /// should quit.
    pub fn step(&mut self, user_input: Option<GameInput>, now: Instant) -> bool {
        let mut should_quit = false;
        match user_input {
            Some(GameInput::Quit) => should_quit = true,
            Some(user_input) => self.apply(user_input, now),
            None => {}
        }
        self.round.tick(now, &mut self.view, &mut self.store);
        self.view.expire(now);
        should_quit
    }

    fn apply(&mut self, user_input: GameInput, now: Instant) {
        if self.confirm_clear {
            self.confirm_clear = false;
            if user_input == GameInput::Confirm {
                self.clear_records();
            } else {
                self.view.status("Records kept.");
            }
            return;
        }
        match user_input {
            GameInput::Start => self.round.start(now, &mut self.view),
            GameInput::Stop => self.round.stop(&mut self.view),
            GameInput::Press(pad) => self.round.press(pad, now, &mut self.view),
            GameInput::ToggleStrict => {
                let strict = !self.round.strict();
                self.round.set_strict(strict);
                self.view.set_strict(strict);
            }
            GameInput::ClearRecords => {
                self.confirm_clear = true;
                self.view
                    .status("Clear all records? Press y to confirm.");
            }
            GameInput::CycleTheme => {
                let theme = self.view.theme().cycle();
                self.view.set_theme(theme);
                self.store.set_theme(theme.name());
            }
            // a stray confirm outside the clear flow means nothing
            GameInput::Confirm => {}
            GameInput::Quit => {}
        }
    }

    fn clear_records(&mut self) {
        if self.round.is_active() {
            self.round.stop(&mut self.view);
        }
        self.store.clear();
        self.round.reset_high_score();
        self.view.score(self.round.score(), 0);
        self.view.status("All records cleared!");
    }
}

impl<S: ScoreStore> Engine for GameEngine<S> {
    fn tick(&mut self, user_input: Option<GameInput>) -> io::Result<bool> {
        Ok(self.step(user_input, Instant::now()))
    }

    fn render_frame(&self, frame: &mut Frame) {
        frame.render_widget(&self.view, frame.size());
    }
}

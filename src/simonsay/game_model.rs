// game_model.rs

use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use super::{presenter::Presenter, score_store::ScoreStore};

pub const PLAYBACK_INTERVAL: Duration = Duration::from_millis(600);
pub const HIGHLIGHT_TIME: Duration = Duration::from_millis(300);
pub const INPUT_COOLDOWN: Duration = Duration::from_millis(300);
pub const NEXT_ROUND_DELAY: Duration = Duration::from_millis(1000);
pub const GAME_OVER_DELAY: Duration = Duration::from_millis(1500);
pub const WIN_DELAY: Duration = Duration::from_millis(3000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pad {
    Green,
    Red,
    Yellow,
    Blue,
}

impl Pad {
    pub const ALL: [Pad; 4] = [Pad::Green, Pad::Red, Pad::Yellow, Pad::Blue];

    pub fn name(self) -> &'static str {
        match self {
            Pad::Green => "Green",
            Pad::Red => "Red",
            Pad::Yellow => "Yellow",
            Pad::Blue => "Blue",
        }
    }

    pub fn key_hint(self) -> &'static str {
        match self {
            Pad::Green => "1/h",
            Pad::Red => "2/j",
            Pad::Yellow => "3/k",
            Pad::Blue => "4/l",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Presenting,
    AwaitingInput,
    Evaluating,
    RoundWon,
    GameOver,
}

#[derive(Clone, Copy, Debug)]
struct Playback {
    cursor: usize,
    due: Instant,
}

#[derive(Clone, Copy, Debug)]
enum AfterDelay {
    NextRound,
    Replay,
    Reset,
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    action: AfterDelay,
    due: Instant,
}

/// The round state machine: grows the sequence, drives playback at a fixed
/// cadence, validates input and resolves each round. All timing flows through
/// the `now` passed by the caller, so at most one playback timer and one
/// post-evaluation timer are ever pending.
pub struct RoundEngine {
    state: GameState,
    sequence: Vec<Pad>,
    player_input: Vec<Pad>,
    score: u32,
    high_score: u32,
    strict: bool,
    max_level: u32,
    playback: Option<Playback>,
    pending: Option<Scheduled>,
    cooldown_until: Option<Instant>,
    rng: StdRng,
}

impl RoundEngine {
    pub fn new(high_score: u32, strict: bool, max_level: u32) -> Self {
        Self::with_rng(high_score, strict, max_level, StdRng::from_entropy())
    }

    pub fn with_rng(high_score: u32, strict: bool, max_level: u32, rng: StdRng) -> Self {
        Self {
            state: GameState::Idle,
            sequence: Vec::new(),
            player_input: Vec::new(),
            score: 0,
            high_score,
            strict,
            max_level,
            playback: None,
            pending: None,
            cooldown_until: None,
            rng,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn sequence(&self) -> &[Pad] {
        &self.sequence
    }

    pub fn player_input(&self) -> &[Pad] {
        &self.player_input
    }

    pub fn is_active(&self) -> bool {
        self.state != GameState::Idle
    }

    // Read live at evaluation time, so toggling mid-round affects the
    // current round's failure handling.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn reset_high_score(&mut self) {
        self.high_score = 0;
    }

    /// No-op unless idle.
    pub fn start(&mut self, now: Instant, presenter: &mut dyn Presenter) {
        if self.state != GameState::Idle {
            return;
        }
        self.sequence.clear();
        self.player_input.clear();
        self.score = 0;
        presenter.status("Watch the sequence!");
        presenter.controls(false, true);
        debug!("game started");
        self.next_round(now, presenter);
    }

    /// Ends the game without touching the high score. No-op unless started.
    pub fn stop(&mut self, presenter: &mut dyn Presenter) {
        if self.state == GameState::Idle {
            return;
        }
        self.cancel_pending();
        self.state = GameState::Idle;
        self.sequence.clear();
        self.player_input.clear();
        presenter.status("Game stopped");
        presenter.controls(true, false);
        debug!("game stopped");
    }

    /// Accepts one symbol while awaiting input, subject to the debounce
    /// window, and evaluates it against the sequence.
    pub fn press(&mut self, pad: Pad, now: Instant, presenter: &mut dyn Presenter) {
        if self.state != GameState::AwaitingInput {
            return;
        }
        if let Some(until) = self.cooldown_until {
            if now < until {
                return;
            }
        }
        self.cooldown_until = Some(now + INPUT_COOLDOWN);
        presenter.highlight(pad, HIGHLIGHT_TIME, now);
        self.player_input.push(pad);
        self.state = GameState::Evaluating;
        self.evaluate(now, presenter);
    }

    /// Fires whatever timers are due at `now`.
    pub fn tick(&mut self, now: Instant, presenter: &mut dyn Presenter, store: &mut dyn ScoreStore) {
        while let Some(playback) = self.playback {
            if playback.due > now {
                break;
            }
            if playback.cursor < self.sequence.len() {
                presenter.highlight(self.sequence[playback.cursor], HIGHLIGHT_TIME, playback.due);
                self.playback = Some(Playback {
                    cursor: playback.cursor + 1,
                    due: playback.due + PLAYBACK_INTERVAL,
                });
            } else {
                self.playback = None;
                self.state = GameState::AwaitingInput;
                presenter.status("Your turn! Repeat the sequence.");
            }
        }
        if let Some(scheduled) = self.pending {
            if scheduled.due <= now {
                self.pending = None;
                match scheduled.action {
                    AfterDelay::NextRound => self.next_round(now, presenter),
                    AfterDelay::Replay => {
                        presenter.status("Try again...");
                        self.player_input.clear();
                        self.begin_playback(now);
                    }
                    AfterDelay::Reset => self.resolve_reset(presenter, store),
                }
            }
        }
    }

    fn evaluate(&mut self, now: Instant, presenter: &mut dyn Presenter) {
        let index = self.player_input.len() - 1;
        if self.player_input[index] != self.sequence[index] {
            debug!(position = index, "wrong symbol");
            self.state = GameState::GameOver;
            presenter.status("Wrong sequence! Game over.");
            // The failure mode is captured here; toggling strict during the
            // delay does not change an already resolved round.
            let action = if self.strict {
                AfterDelay::Reset
            } else {
                AfterDelay::Replay
            };
            self.pending = Some(Scheduled {
                action,
                due: now + GAME_OVER_DELAY,
            });
            return;
        }
        if self.player_input.len() == self.sequence.len() {
            if self.score == self.max_level {
                debug!(score = self.score, "game won");
                self.state = GameState::RoundWon;
                presenter.status("Congratulations! You won!");
                self.pending = Some(Scheduled {
                    action: AfterDelay::Reset,
                    due: now + WIN_DELAY,
                });
            } else {
                // Stays in Evaluating until the next round is presented, so
                // extra presses during the delay are ignored.
                presenter.status("Correct! Next round...");
                self.pending = Some(Scheduled {
                    action: AfterDelay::NextRound,
                    due: now + NEXT_ROUND_DELAY,
                });
            }
        } else {
            self.state = GameState::AwaitingInput;
        }
    }

    fn next_round(&mut self, now: Instant, presenter: &mut dyn Presenter) {
        self.player_input.clear();
        self.score += 1;
        presenter.score(self.score, self.high_score);
        let pad = self.random_pad();
        self.sequence.push(pad);
        debug!(score = self.score, "next round");
        self.begin_playback(now);
    }

    fn begin_playback(&mut self, now: Instant) {
        self.pending = None;
        self.playback = Some(Playback {
            cursor: 0,
            due: now + PLAYBACK_INTERVAL,
        });
        self.state = GameState::Presenting;
    }

    fn resolve_reset(&mut self, presenter: &mut dyn Presenter, store: &mut dyn ScoreStore) {
        self.high_score = self.score.max(self.high_score);
        store.write(self.high_score);
        debug!(high_score = self.high_score, "game resolved");
        self.state = GameState::Idle;
        self.sequence.clear();
        self.player_input.clear();
        self.score = 0;
        presenter.score(self.score, self.high_score);
        presenter.status("");
        presenter.controls(true, false);
    }

    fn cancel_pending(&mut self) {
        self.playback = None;
        self.pending = None;
        self.cooldown_until = None;
    }

    fn random_pad(&mut self) -> Pad {
        // Uniform and independent each round, repeats allowed.
        match self.rng.gen_range(0..4) {
            0 => Pad::Green,
            1 => Pad::Red,
            2 => Pad::Yellow,
            _ => Pad::Blue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simonsay::presenter::GameView;
    use crate::simonsay::score_store::MemoryScoreStore;
    use crate::simonsay::theme::Theme;

    const MAX_LEVEL: u32 = 20;

    struct Fixture {
        engine: RoundEngine,
        view: GameView,
        store: MemoryScoreStore,
        now: Instant,
    }

    fn fixture(strict: bool) -> Fixture {
        fixture_with(0, strict, MAX_LEVEL)
    }

    fn fixture_with(high_score: u32, strict: bool, max_level: u32) -> Fixture {
        Fixture {
            engine: RoundEngine::with_rng(
                high_score,
                strict,
                max_level,
                StdRng::seed_from_u64(7),
            ),
            view: GameView::new(high_score, strict, Theme::Default),
            store: MemoryScoreStore::default(),
            now: Instant::now(),
        }
    }

    impl Fixture {
        fn tick(&mut self) {
            self.engine.tick(self.now, &mut self.view, &mut self.store);
        }

        fn advance(&mut self, delta: Duration) {
            self.now += delta;
            self.tick();
        }

        fn finish_playback(&mut self) {
            for _ in 0..(self.engine.sequence().len() + 2) * 2 {
                if self.engine.state() == GameState::AwaitingInput {
                    return;
                }
                self.advance(PLAYBACK_INTERVAL);
            }
            panic!("playback never finished");
        }

        fn press(&mut self, pad: Pad) {
            self.now += INPUT_COOLDOWN + Duration::from_millis(10);
            self.engine.press(pad, self.now, &mut self.view);
        }

        /// Reproduces the current sequence correctly, leaving the engine
        /// waiting on its post-round timer.
        fn play_round_correctly(&mut self) {
            self.finish_playback();
            let expected = self.engine.sequence().to_vec();
            for pad in expected {
                self.press(pad);
            }
        }

        fn wrong_pad(&self, position: usize) -> Pad {
            let right = self.engine.sequence()[position];
            Pad::ALL
                .into_iter()
                .find(|pad| *pad != right)
                .expect("alphabet has more than one symbol")
        }
    }

    #[test]
    fn start_begins_round_one() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        assert_eq!(fx.engine.state(), GameState::Presenting);
        assert_eq!(fx.engine.sequence().len(), 1);
        assert_eq!(fx.engine.score(), 1);
        assert_eq!(fx.view.status_text(), "Watch the sequence!");

        // start while started is a silent no-op
        fx.engine.start(now, &mut fx.view);
        assert_eq!(fx.engine.sequence().len(), 1);
        assert_eq!(fx.engine.score(), 1);
    }

    #[test]
    fn input_ignored_while_presenting_and_idle() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.press(Pad::Green, now, &mut fx.view);
        assert_eq!(fx.engine.state(), GameState::Idle);
        assert!(fx.engine.player_input().is_empty());

        fx.engine.start(now, &mut fx.view);
        fx.engine.press(Pad::Green, now, &mut fx.view);
        assert_eq!(fx.engine.state(), GameState::Presenting);
        assert!(fx.engine.player_input().is_empty());
    }

    #[test]
    fn playback_highlights_each_symbol_in_order() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.play_round_correctly();
        fx.advance(NEXT_ROUND_DELAY);
        fx.play_round_correctly();
        fx.advance(NEXT_ROUND_DELAY);
        assert_eq!(fx.engine.sequence().len(), 3);

        let expected = fx.engine.sequence().to_vec();
        for pad in expected {
            fx.advance(PLAYBACK_INTERVAL);
            assert_eq!(fx.view.lit_pad(), Some(pad));
        }
        fx.advance(PLAYBACK_INTERVAL);
        assert_eq!(fx.engine.state(), GameState::AwaitingInput);
        assert_eq!(fx.view.status_text(), "Your turn! Repeat the sequence.");
    }

    #[test]
    fn correct_round_advances() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        let first = fx.engine.sequence()[0];
        fx.play_round_correctly();
        assert_eq!(fx.view.status_text(), "Correct! Next round...");

        fx.advance(NEXT_ROUND_DELAY);
        assert_eq!(fx.engine.state(), GameState::Presenting);
        assert_eq!(fx.engine.sequence().len(), 2);
        assert_eq!(fx.engine.score(), 2);
        assert_eq!(fx.engine.sequence()[0], first);
    }

    #[test]
    fn sequence_is_append_only() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        let mut previous = fx.engine.sequence().to_vec();
        for _ in 0..4 {
            fx.play_round_correctly();
            fx.advance(NEXT_ROUND_DELAY);
            let current = fx.engine.sequence().to_vec();
            assert_eq!(current.len(), previous.len() + 1);
            assert_eq!(&current[..previous.len()], &previous[..]);
            previous = current;
        }
    }

    #[test]
    fn extra_presses_during_round_delay_are_ignored() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.play_round_correctly();
        assert_eq!(fx.engine.state(), GameState::Evaluating);
        fx.press(Pad::Green);
        assert_eq!(fx.engine.player_input().len(), 1);
    }

    #[test]
    fn mismatch_transitions_to_game_over() {
        // at position 0
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.finish_playback();
        let wrong = fx.wrong_pad(0);
        fx.press(wrong);
        assert_eq!(fx.engine.state(), GameState::GameOver);
        assert_eq!(fx.view.status_text(), "Wrong sequence! Game over.");

        // at a later position
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.play_round_correctly();
        fx.advance(NEXT_ROUND_DELAY);
        fx.finish_playback();
        let first = fx.engine.sequence()[0];
        let wrong = fx.wrong_pad(1);
        fx.press(first);
        assert_eq!(fx.engine.state(), GameState::AwaitingInput);
        fx.press(wrong);
        assert_eq!(fx.engine.state(), GameState::GameOver);
    }

    #[test]
    fn strict_game_over_fully_resets() {
        let mut fx = fixture(true);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.finish_playback();
        let wrong = fx.wrong_pad(0);
        fx.press(wrong);

        fx.advance(GAME_OVER_DELAY);
        assert_eq!(fx.engine.state(), GameState::Idle);
        assert!(fx.engine.sequence().is_empty());
        assert_eq!(fx.engine.score(), 0);
        assert_eq!(fx.engine.high_score(), 1);
        assert_eq!(fx.store.read(), 1);
    }

    #[test]
    fn lenient_game_over_replays_same_sequence() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.play_round_correctly();
        fx.advance(NEXT_ROUND_DELAY);
        let sequence = fx.engine.sequence().to_vec();

        fx.finish_playback();
        let wrong = fx.wrong_pad(0);
        fx.press(wrong);
        fx.advance(GAME_OVER_DELAY);
        assert_eq!(fx.engine.state(), GameState::Presenting);
        assert_eq!(fx.engine.sequence(), &sequence[..]);
        assert_eq!(fx.engine.score(), 2);
        assert_eq!(fx.view.status_text(), "Try again...");
        // a retry is not a scoring event
        assert_eq!(fx.store.read(), 0);

        // the identical sequence can now be completed
        fx.play_round_correctly();
        fx.advance(NEXT_ROUND_DELAY);
        assert_eq!(fx.engine.score(), 3);
    }

    #[test]
    fn strict_flag_is_read_at_mismatch_time() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.finish_playback();
        let wrong = fx.wrong_pad(0);
        fx.press(wrong);
        // too late: the lenient replay is already scheduled
        fx.engine.set_strict(true);
        fx.advance(GAME_OVER_DELAY);
        assert_eq!(fx.engine.state(), GameState::Presenting);
        assert_eq!(fx.engine.score(), 1);
    }

    #[test]
    fn reaching_max_level_wins_even_in_strict_mode() {
        let mut fx = fixture_with(0, true, 3);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.play_round_correctly();
        fx.advance(NEXT_ROUND_DELAY);
        fx.play_round_correctly();
        fx.advance(NEXT_ROUND_DELAY);
        assert_eq!(fx.engine.score(), 3);
        fx.play_round_correctly();
        assert_eq!(fx.engine.state(), GameState::RoundWon);
        assert_eq!(fx.view.status_text(), "Congratulations! You won!");

        fx.advance(WIN_DELAY);
        assert_eq!(fx.engine.state(), GameState::Idle);
        assert_eq!(fx.engine.high_score(), 3);
        assert_eq!(fx.store.read(), 3);
    }

    #[test]
    fn manual_stop_does_not_touch_high_score() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.play_round_correctly();
        assert_eq!(fx.engine.score(), 1);

        fx.engine.stop(&mut fx.view);
        assert_eq!(fx.engine.state(), GameState::Idle);
        assert!(fx.engine.sequence().is_empty());
        assert_eq!(fx.engine.high_score(), 0);
        assert_eq!(fx.store.read(), 0);
        assert_eq!(fx.view.status_text(), "Game stopped");

        // stop while stopped is a silent no-op
        fx.engine.stop(&mut fx.view);
        assert_eq!(fx.engine.state(), GameState::Idle);
    }

    #[test]
    fn stop_cancels_pending_timers() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.finish_playback();
        let wrong = fx.wrong_pad(0);
        fx.press(wrong);
        fx.engine.stop(&mut fx.view);

        // the scheduled replay must not fire after the stop
        fx.advance(GAME_OVER_DELAY + PLAYBACK_INTERVAL);
        assert_eq!(fx.engine.state(), GameState::Idle);
        assert!(fx.engine.sequence().is_empty());
    }

    #[test]
    fn cooldown_drops_duplicate_input() {
        let mut fx = fixture(false);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.play_round_correctly();
        fx.advance(NEXT_ROUND_DELAY);
        fx.finish_playback();

        let sequence = fx.engine.sequence().to_vec();
        fx.press(sequence[0]);
        // duplicate event source fires inside the debounce window
        fx.now += Duration::from_millis(100);
        fx.engine.press(sequence[1], fx.now, &mut fx.view);
        assert_eq!(fx.engine.player_input().len(), 1);
        assert_eq!(fx.engine.state(), GameState::AwaitingInput);

        // once the window has passed the press is accepted
        fx.press(sequence[1]);
        assert_eq!(fx.engine.player_input().len(), 2);
        assert_eq!(fx.engine.state(), GameState::Evaluating);
    }

    #[test]
    fn high_score_is_the_maximum_over_games() {
        let mut fx = fixture_with(5, true, MAX_LEVEL);
        let now = fx.now;
        fx.engine.start(now, &mut fx.view);
        fx.finish_playback();
        let wrong = fx.wrong_pad(0);
        fx.press(wrong);
        fx.advance(GAME_OVER_DELAY);
        assert_eq!(fx.engine.high_score(), 5);
        assert_eq!(fx.store.read(), 5);
    }
}

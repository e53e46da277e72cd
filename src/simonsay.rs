mod engine;
mod game_engine;
mod game_model;
mod input;
mod presenter;
mod render_engine;
mod score_store;
mod theme;

use input::handle_events;

use crate::SimonsayArgs;

use self::{
    engine::Engine,
    game_engine::GameEngine,
    render_engine::RenderEngine,
    score_store::{FileScoreStore, ScoreStore},
    theme::Theme,
};
use std::io;

pub fn game_loop(args: SimonsayArgs) -> io::Result<()> {
    let mut render_engine = RenderEngine::init_render_engine()?;
    let mut should_quit = false;

    let records_path = args.records.unwrap_or_else(FileScoreStore::default_path);
    let store = FileScoreStore::open(records_path);
    let theme = store
        .theme()
        .and_then(|name| Theme::from_name(&name))
        .unwrap_or_default();
    let mut game_engine = GameEngine::new(store, args.strict, args.max_level, theme);
    while !should_quit {
        // rendering
        render_engine.render(|frame| game_engine.render_frame(frame))?;
        // tick
        let user_input = handle_events()?;
        should_quit = game_engine.tick(user_input)?;
    }
    render_engine.deinit_render_engine()?;
    Ok(())
}

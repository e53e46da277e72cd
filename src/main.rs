mod simonsay;

use std::{fs, io, path::PathBuf, sync::Mutex};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(about)]
pub struct SimonsayArgs {
    /// Start with strict mode on (a miss resets the whole game)
    #[arg(long)]
    pub strict: bool,

    /// Rounds needed to win the game
    #[arg(long, default_value_t = 20)]
    pub max_level: u32,

    /// Records file (defaults to the platform data directory)
    #[arg(long)]
    pub records: Option<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_path = dirs::cache_dir().map(|dir| dir.join("simonsay").join("simonsay.log"));
    let log_file = log_path.and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        fs::OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match log_file {
        Some(file) => tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init(),
        // No log file means no logs; writing to stdout would corrupt the
        // alternate screen.
        None => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn main() -> io::Result<()> {
    init_tracing();
    let args = SimonsayArgs::parse();
    simonsay::game_loop(args)
}

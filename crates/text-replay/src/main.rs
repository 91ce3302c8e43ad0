use std::{
    io::{self, IsTerminal},
    path::PathBuf,
};

use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use text_replay_core::{Separator, Session};

mod app;
mod app_dir;
mod logging;

#[derive(Debug, Parser)]
#[command(name = "text-replay", version, about = "Group, page through and tag rows of a CSV file")]
struct Cli {
    /// File to upload at start-up
    file: Option<PathBuf>,
    /// `comma` or `tab`; guessed from the extension when omitted
    #[arg(long, short)]
    separator: Option<Separator>,
    /// Session settings (JSON); defaults to config.json in the config directory
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for random jumps
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logger()?;

    let config = app_dir::load_config(cli.config.as_deref())?;
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut app = app::TextReplayApp::new(Session::new(config), rng);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    if let Some(file) = &cli.file {
        if let Err(e) = app.load(file, cli.separator, &mut stdout) {
            eprintln!("Error: {e:#}");
        }
    }

    let prompt = stdin.is_terminal();
    app.run(stdin.lock(), &mut stdout, prompt)
}

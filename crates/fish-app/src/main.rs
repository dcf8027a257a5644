use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use fish_app::config::AppConfig;
use fish_app::host::Host;
use fish_app::logging::init_logging;

/// Collect sets of four against three bots.
#[derive(Debug, Parser)]
#[command(
    name = "mdfish",
    author,
    version,
    about = "Four-player set collecting card game in the terminal"
)]
struct Cli {
    /// Path to a YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for shuffles and bot choices (overrides MDF_SEED and the config).
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Let a random policy play the human seat and skip all prompts.
    #[arg(long)]
    auto: bool,

    /// Print the final standings as JSON after the game.
    #[arg(long)]
    json: bool,

    /// Tracing level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_ref() {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };

    config
        .apply_env_overrides(|key| std::env::var(key).ok())
        .context("reading environment overrides")?;

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    if cli.auto {
        config.auto = true;
    }

    if let Some(level) = cli.log_level {
        config.logging.tracing_level = level;
    }

    config.validate()?;

    let _logging_guard = init_logging(&config.logging)?;

    let outcome = {
        let stdin = io::stdin();
        let mut host = Host::new(&config, stdin.lock(), io::stdout().lock());
        host.run().context("running game")?
    };

    if cli.json {
        println!("{}", outcome.summary.to_json()?);
    }

    Ok(())
}

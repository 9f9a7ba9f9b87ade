/// Entry point: load config, build a cave, run one mission, print the report.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use cavewalk::config::RunConfig;
use cavewalk::sim::cave::{self, Cave, EMBEDDED_CAVES};
use cavewalk::{logging, Session};

#[derive(Parser)]
#[command(name = "cavewalk", version, about = "Belief-propagating Wumpus World agent")]
struct Cli {
    /// Cave diagram file, a name under the caves directory, or a built-in cave.
    #[arg(long, default_value = "classic")]
    cave: String,
    /// Seed for the agent's tie-breaking RNG.
    #[arg(long)]
    seed: Option<u64>,
    /// Actions before the run is declared stalled.
    #[arg(long)]
    max_steps: Option<usize>,
    /// Config file (default: config.toml next to the binary or in CWD).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print every event of the mission.
    #[arg(long)]
    trace: bool,
    /// Print the agent's belief map at the end.
    #[arg(long)]
    map: bool,
    /// List the built-in caves and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RunConfig::load_from(path),
        None => RunConfig::load(),
    };
    logging::init(&config.log);

    if cli.list {
        for (name, _) in EMBEDDED_CAVES {
            println!("{name}");
        }
        return Ok(());
    }

    let seed = cli.seed.unwrap_or(config.mission.seed);
    let max_steps = cli.max_steps.unwrap_or(config.mission.max_steps);
    let text = cave_text(&cli.cave, &config.caves_dir)?;
    let world = Cave::parse(&text).with_context(|| format!("invalid cave '{}'", cli.cave))?;
    info!(cave = %cli.cave, width = world.width(), height = world.height(), "cave loaded");

    let report = Session::new(world, seed, max_steps)
        .run()
        .context("mission aborted")?;

    if cli.trace {
        for (i, event) in report.events.iter().enumerate() {
            println!("{:>4}  {event}", i + 1);
        }
        println!();
    }
    println!("{report}");
    if cli.map {
        println!();
        print!("{}", report.belief_map);
    }
    Ok(())
}

/// Resolve `--cave`: an existing file, then `<caves_dir>/<name>.txt`,
/// then a built-in cave.
fn cave_text(cave: &str, caves_dir: &Path) -> Result<String> {
    let direct = PathBuf::from(cave);
    let named = caves_dir.join(format!("{cave}.txt"));
    for path in [direct, named] {
        if path.is_file() {
            return std::fs::read_to_string(&path)
                .with_context(|| format!("could not read {}", path.display()));
        }
    }
    match cave::embedded(cave) {
        Some(text) => Ok(text.to_string()),
        None => bail!("no cave named '{cave}' (try --list)"),
    }
}

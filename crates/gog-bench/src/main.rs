use std::path::PathBuf;

use clap::Parser;

use gog_bench::arena::ArenaRunner;
use gog_bench::config::ArenaConfig;
use gog_bench::logging::init_logging;
use gog_core::AppInfo;

/// Head-to-head arena for Game of the Generals bots.
#[derive(Debug, Parser)]
#[command(
    name = "gog-bench",
    author,
    version,
    about = "Deterministic two-agent arena for Game of the Generals bots"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/arena.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the per-game ply limit.
    #[arg(long, value_name = "PLIES")]
    max_plies: Option<u32>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ArenaConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }
    if let Some(games) = cli.games {
        config.matches.games = games;
    }
    if let Some(seed) = cli.seed {
        config.matches.seed = Some(seed);
    }
    if let Some(max_plies) = cli.max_plies {
        config.matches.max_plies = max_plies;
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.matches.games;
    let names: Vec<&str> = config.agents.iter().map(|a| a.name.as_str()).collect();

    println!(
        "{} {} ({}): '{run_id}' with {} ({games} game{})",
        AppInfo::name(),
        AppInfo::version(),
        AppInfo::codename(),
        names.join(" vs "),
        if games == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = ArenaRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: arena execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Arena complete for '{run_id}': {} games → {} rows at {}",
        summary.games_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    for agent in summary.standings.agents() {
        println!(
            "  {}: {}W {}L {}D ({:.1}% wins, {:.2} ms/decision)",
            agent.name,
            agent.wins,
            agent.losses,
            agent.draws,
            agent.win_rate() * 100.0,
            agent.average_ms_per_decision()
        );
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}

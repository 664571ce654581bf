use std::path::PathBuf;

use clap::Parser;

use pitch_sim::config::{ResolvedOutputs, SimConfig};
use pitch_sim::logging::init_logging;
use pitch_sim::runner::GameRunner;

/// Plays complete AI-only Pitch games through the shared-table session layer.
#[derive(Debug, Parser)]
#[command(
    name = "pitch-sim",
    author,
    version,
    about = "Deterministic Pitch table simulator"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "sim/table.yaml")]
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

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let agents = config
        .agents
        .iter()
        .map(|a| format!("{} ({})", a.name, a.difficulty))
        .collect::<Vec<_>>()
        .join(", ");

    println!(
        "Loaded configuration '{run_id}' with {games} game{}: {agents}",
        if games == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: no games played.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = GameRunner::new(config, outputs)?;
    let summary = runner.run()?;

    println!(
        "Run complete for '{run_id}': {} games ({} unfinished), {} hands → {} rows at {}",
        summary.games_played,
        summary.unfinished,
        summary.hands_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    for agent in &summary.agents {
        println!(
            "  {:<12} win {:>5.1}%  made {:>5.1}% of {} contracts",
            agent.name,
            agent.win_rate() * 100.0,
            agent.make_rate() * 100.0,
            agent.contracts
        );
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}

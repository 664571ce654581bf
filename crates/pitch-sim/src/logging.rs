use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Crates whose events are written at the configured level.
const PITCH_TARGETS: [&str; 3] = ["pitch_core", "pitch_bot", "pitch_sim"];

/// Keeps the background writer alive; dropping it flushes the telemetry file.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Filter used when `RUST_LOG` is unset: the pitch crates at `level`,
/// everything else at warn.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    PITCH_TARGETS
        .iter()
        .fold(String::from("warn"), |mut directives, target| {
            directives.push(',');
            directives.push_str(target);
            directives.push('=');
            directives.push_str(&level);
            directives
        })
}

fn filter_for(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(default_directives(logging.level().unwrap_or(Level::INFO)))
    })
}

/// Streams engine, bot and runner events as JSON lines next to the summary.
/// Returns `None` when structured logging is switched off.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let dir = telemetry_dir(outputs);
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    let telemetry_path = dir.join(TELEMETRY_FILE);
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    // Every hand and decision event must land in the file, so never drop lines.
    let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(file);
    let json = fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(writer);

    // Tests may install a subscriber first; keep theirs.
    let _ = tracing_subscriber::registry()
        .with(filter_for(logging))
        .with(json)
        .try_init();

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}

/// Directory holding the telemetry file: the summary's parent, or `.`.
pub fn telemetry_dir(outputs: &ResolvedOutputs) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

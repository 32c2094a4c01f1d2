use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{Level, event};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

const TELEMETRY_FILE: &str = "telemetry.jsonl";
/// Crates whose events land in the telemetry log at the configured level.
const ARENA_TARGETS: [&str; 3] = ["gog_bench", "gog_bot", "gog_core"];

/// Keeps the background writer alive; dropping it flushes the log.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub run_id: String,
    pub telemetry_path: PathBuf,
}

/// Installs a JSON subscriber writing `telemetry.jsonl` beside the summary.
///
/// Returns `None` when structured logging is disabled. `RUST_LOG` replaces
/// the arena filter entirely when set.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_path = telemetry_path(outputs);
    if let Some(dir) = telemetry_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;
    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(arena_directives(level)))
        .context("building the telemetry filter")?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_target(true)
        .with_current_span(false)
        .with_writer(writer)
        .finish();

    // Tests may race to install the global subscriber; the first one wins.
    let installed = tracing::subscriber::set_global_default(subscriber).is_ok();
    event!(
        target: "gog_bench::logging",
        Level::INFO,
        run_id,
        installed,
        level = %level,
        telemetry = %telemetry_path.display(),
    );

    Ok(Some(LoggingGuard {
        _guard: guard,
        run_id: run_id.to_string(),
        telemetry_path,
    }))
}

/// Telemetry lives next to `summary.md`, or in the working directory when
/// the summary path has no parent.
fn telemetry_path(outputs: &ResolvedOutputs) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        .join(TELEMETRY_FILE)
}

/// Third-party crates only report warnings.
fn arena_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = String::from("warn");
    for target in ARENA_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

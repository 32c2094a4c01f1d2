use gog_bot::{BotConfig, BotDifficulty, SearchBudget};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

const DEFAULT_MAX_PLIES: u32 = 3_000;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root arena configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ArenaConfig {
    pub run_id: String,
    pub matches: MatchesConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ArenaConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ArenaConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.matches.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        validate_agents(&self.agents)?;
        Ok(())
    }

    /// Resolve `{run_id}` placeholders into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatchesConfig {
    pub seed: Option<u64>,
    pub games: usize,
    /// Plies after which an undecided game is recorded as a draw.
    #[serde(default = "default_max_plies")]
    pub max_plies: u32,
    /// Alternate which agent plays Player One.
    #[serde(default = "default_swap_sides")]
    pub swap_sides: bool,
}

impl MatchesConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.games == 0 {
            return Err(ValidationError::InvalidField {
                field: "matches.games".to_string(),
                message: "number of games must be greater than zero".to_string(),
            });
        }
        if self.max_plies == 0 {
            return Err(ValidationError::InvalidField {
                field: "matches.max_plies".to_string(),
                message: "ply limit must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_max_plies() -> u32 {
    DEFAULT_MAX_PLIES
}

fn default_swap_sides() -> bool {
    true
}

/// One arena participant.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: AgentParams,
}

impl AgentConfig {
    /// Bot configuration for one game, seeded by the arena.
    pub fn bot_config(&self, seed: u64) -> BotConfig {
        let defaults = SearchBudget::default();
        let params = &self.params;
        BotConfig {
            difficulty: self.kind.difficulty(),
            budget: SearchBudget {
                trials: params.trials.unwrap_or(defaults.trials),
                ply_cap: params.ply_cap.unwrap_or(defaults.ply_cap),
                time_cap: params
                    .time_cap_ms
                    .map(Duration::from_millis)
                    .or(defaults.time_cap),
                threads: params.threads.unwrap_or(defaults.threads),
                sample_attempts: params.sample_attempts.unwrap_or(defaults.sample_attempts),
            },
            seed: Some(seed),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Random,
    MonteCarlo,
}

impl AgentKind {
    pub const fn difficulty(self) -> BotDifficulty {
        match self {
            AgentKind::Random => BotDifficulty::Random,
            AgentKind::MonteCarlo => BotDifficulty::MonteCarlo,
        }
    }
}

/// Search overrides; unset fields keep the bot defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AgentParams {
    pub trials: Option<usize>,
    pub ply_cap: Option<u32>,
    pub time_cap_ms: Option<u64>,
    pub threads: Option<usize>,
    pub sample_attempts: Option<usize>,
}

impl AgentParams {
    fn validate(&self, name: &str) -> Result<(), ValidationError> {
        let positive = [
            ("trials", self.trials.map(|v| v as u64)),
            ("ply_cap", self.ply_cap.map(u64::from)),
            ("time_cap_ms", self.time_cap_ms),
            ("threads", self.threads.map(|v| v as u64)),
            ("sample_attempts", self.sample_attempts.map(|v| v as u64)),
        ];
        for (label, value) in positive {
            if value == Some(0) {
                return Err(ValidationError::InvalidField {
                    field: format!("agents[{name}].params.{label}"),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_agents(agents: &[AgentConfig]) -> Result<(), ValidationError> {
    if agents.len() != 2 {
        return Err(ValidationError::InvalidField {
            field: "agents".to_string(),
            message: format!("exactly two agents are required, found {}", agents.len()),
        });
    }

    let mut seen = HashSet::new();
    for agent in agents {
        if agent.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "agents.name".to_string(),
                message: "agent name must not be empty".to_string(),
            });
        }

        if !agent.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("agents[{}].name", agent.name),
                message: "agent name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(agent.name.clone()) {
            return Err(ValidationError::InvalidField {
                field: "agents".to_string(),
                message: format!("agent name '{}' defined more than once", agent.name),
            });
        }

        agent.params.validate(&agent.name)?;
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

use makao_bot::BotDifficulty;
use makao_core::game::engine::{EngineConfig, MAX_OPPONENTS, MIN_OPPONENTS};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_PLAYER_NAME: &str = "Player";
const DEFAULT_OPPONENTS: usize = 2;
const DEFAULT_MAX_TURNS: u64 = 2_000;
const DEFAULT_MAX_INVALID_ATTEMPTS: u32 = 16;
const MAX_NAME_LEN: usize = 24;

/// Game setup loaded from YAML; every field has a default.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GameConfig {
    #[serde(default = "default_player_name")]
    pub player_name: String,
    #[serde(default = "default_opponents")]
    pub opponents: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_turns")]
    pub max_turns: u64,
    #[serde(default = "default_max_invalid_attempts")]
    pub max_invalid_attempts: u32,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_name: default_player_name(),
            opponents: DEFAULT_OPPONENTS,
            seed: None,
            max_turns: DEFAULT_MAX_TURNS,
            max_invalid_attempts: DEFAULT_MAX_INVALID_ATTEMPTS,
            autoplay: false,
            difficulty: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: GameConfig =
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

    /// Normalizes and checks every field without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.player_name = self.player_name.trim().to_string();
        if self.player_name.is_empty() {
            return Err(invalid("player_name", "name must not be empty"));
        }
        if self.player_name.chars().count() > MAX_NAME_LEN {
            return Err(invalid(
                "player_name",
                format!("name must be at most {MAX_NAME_LEN} characters"),
            ));
        }

        if !(MIN_OPPONENTS..=MAX_OPPONENTS).contains(&self.opponents) {
            return Err(invalid(
                "opponents",
                format!(
                    "the number of opponents has to be between {MIN_OPPONENTS} and {MAX_OPPONENTS}"
                ),
            ));
        }

        if self.max_turns == 0 {
            return Err(invalid("max_turns", "turn limit must be greater than zero"));
        }

        if self.max_invalid_attempts == 0 {
            return Err(invalid(
                "max_invalid_attempts",
                "at least one attempt per move is required",
            ));
        }

        if let Some(raw) = self.difficulty.as_deref() {
            if BotDifficulty::parse(raw).is_none() {
                return Err(invalid(
                    "difficulty",
                    format!("unknown difficulty '{raw}' (expected easy or normal)"),
                ));
            }
        }

        self.logging.validate()
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_invalid_attempts: self.max_invalid_attempts,
            ..EngineConfig::default()
        }
    }

    /// Configured difficulty, else `MAKAO_BOT_DIFFICULTY`, else easy.
    pub fn bot_difficulty(&self) -> BotDifficulty {
        self.difficulty
            .as_deref()
            .and_then(BotDifficulty::parse)
            .unwrap_or_else(BotDifficulty::from_env)
    }
}

fn default_player_name() -> String {
    DEFAULT_PLAYER_NAME.to_string()
}

fn default_opponents() -> usize {
    DEFAULT_OPPONENTS
}

fn default_max_turns() -> u64 {
    DEFAULT_MAX_TURNS
}

fn default_max_invalid_attempts() -> u32 {
    DEFAULT_MAX_INVALID_ATTEMPTS
}

/// Logging configuration defaults to quiet stderr output.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            file: default_log_file(),
        }
    }
}

impl LoggingConfig {
    fn validate(&mut self) -> Result<(), ValidationError> {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
        if self.level().is_none() {
            return Err(invalid(
                "logging.tracing_level",
                format!("unknown level '{}'", self.tracing_level),
            ));
        }
        if self.enable_structured && self.file.as_os_str().is_empty() {
            return Err(invalid(
                "logging.file",
                "structured logging needs a file path",
            ));
        }
        Ok(())
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
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
    "warn".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("makao.log.jsonl")
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
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

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BASIC_YAML: &str = r#"
player_name: "  Alice  "
opponents: 3
seed: 42
max_turns: 500
autoplay: true
difficulty: "normal"
logging:
  enable_structured: true
  tracing_level: "debug"
  file: "logs/makao.jsonl"
"#;

    fn field_of(err: ValidationError) -> String {
        let ValidationError::InvalidField { field, .. } = err;
        field
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: GameConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.player_name, "Alice");
        assert_eq!(cfg.opponents, 3);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.max_invalid_attempts, DEFAULT_MAX_INVALID_ATTEMPTS);
        assert_eq!(cfg.bot_difficulty(), BotDifficulty::Normal);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert_eq!(cfg.logging.file, PathBuf::from("logs/makao.jsonl"));
        assert_eq!(cfg.engine_config().max_invalid_attempts, 16);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let mut cfg: GameConfig = serde_yaml::from_str("{}").expect("parse");
        cfg.validate().expect("defaults validate");
        assert_eq!(cfg, GameConfig::default());
        assert!(!cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::WARN));
    }

    #[test]
    fn rejects_opponent_count_out_of_range() {
        let yaml = BASIC_YAML.replace("opponents: 3", "opponents: 4");
        let mut cfg: GameConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("four opponents");
        assert_eq!(field_of(err), "opponents");
    }

    #[test]
    fn rejects_blank_name() {
        let yaml = BASIC_YAML.replace("\"  Alice  \"", "\"   \"");
        let mut cfg: GameConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(field_of(cfg.validate().expect_err("blank")), "player_name");
    }

    #[test]
    fn rejects_unknown_difficulty_and_level() {
        let yaml = BASIC_YAML.replace("\"normal\"", "\"hard\"");
        let mut cfg: GameConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(field_of(cfg.validate().expect_err("hard")), "difficulty");

        let yaml = BASIC_YAML.replace("\"debug\"", "\"loud\"");
        let mut cfg: GameConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(
            field_of(cfg.validate().expect_err("loud")),
            "logging.tracing_level"
        );
    }

    #[test]
    fn from_path_reports_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"opponents: 0\n").expect("write");
        let err = GameConfig::from_path(file.path()).expect_err("zero opponents");
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert_eq!(err.path(), file.path());
    }

    #[test]
    fn from_path_reports_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.yaml");
        let err = GameConfig::from_path(&missing).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

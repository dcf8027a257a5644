use fish_core::model::player::{PLAYER_COUNT, Seat};
use serde::Deserialize;
use std::array;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const NAME_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";
const MAX_NAME_LEN: usize = 24;
const DEFAULT_LOG_PATH: &str = "mdfish-log.jsonl";

pub const ENV_SEED: &str = "MDF_SEED";
pub const ENV_AUTO: &str = "MDF_AUTO";

/// Root configuration loaded from YAML. Every field is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    /// Display names for Human, BotA, BotB and BotC, in that order.
    #[serde(default = "default_names")]
    pub names: Vec<String>,
    /// Let a random policy answer for the human seat.
    #[serde(default)]
    pub auto: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: None,
            names: default_names(),
            auto: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: AppConfig =
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
        validate_names(&self.names)?;
        self.logging.normalize();
        if self.logging.level().is_none() {
            return Err(ValidationError::InvalidField {
                field: "logging.tracing_level".to_string(),
                message: format!("unknown level '{}'", self.logging.tracing_level),
            });
        }
        if self.logging.enable_structured && self.logging.path.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "logging.path".to_string(),
                message: "path must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Applies `MDF_SEED` / `MDF_AUTO` as returned by `lookup`. The binary
    /// passes the process environment; tests pass a map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SEED) {
            let seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidField {
                    field: ENV_SEED.to_string(),
                    message: format!("'{raw}' is not an unsigned integer"),
                })?;
            self.seed = Some(seed);
        }
        if let Some(raw) = lookup(ENV_AUTO) {
            self.auto = parse_flag(&raw).ok_or_else(|| ValidationError::InvalidField {
                field: ENV_AUTO.to_string(),
                message: format!("'{raw}' is not one of 1/0, true/false, on/off"),
            })?;
        }
        Ok(())
    }

    /// Names indexed by seat. Missing entries fall back to the seat default.
    pub fn seat_names(&self) -> [String; PLAYER_COUNT] {
        array::from_fn(|i| {
            self.names
                .get(i)
                .cloned()
                .unwrap_or_else(|| Seat::LOOP[i].default_name().to_string())
        })
    }
}

fn default_names() -> Vec<String> {
    Seat::LOOP
        .iter()
        .map(|seat| seat.default_name().to_string())
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    let value = raw.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("on") {
        Some(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("off")
    {
        Some(false)
    } else {
        None
    }
}

fn validate_names(names: &[String]) -> Result<(), ValidationError> {
    if names.len() != PLAYER_COUNT {
        return Err(ValidationError::InvalidField {
            field: "names".to_string(),
            message: format!("expected {PLAYER_COUNT} names, found {}", names.len()),
        });
    }

    let mut seen = HashSet::new();
    for (idx, name) in names.iter().enumerate() {
        let field = format!("names[{idx}]");
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field,
                message: "name must not be empty".to_string(),
            });
        }
        if name.len() > MAX_NAME_LEN {
            return Err(ValidationError::InvalidField {
                field,
                message: format!("name is longer than {MAX_NAME_LEN} characters"),
            });
        }
        if !name.chars().all(|c| NAME_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field,
                message: "name may only contain alphanumeric characters, '.', '_' or '-'"
                    .to_string(),
            });
        }
        // Seat numbers double as ask targets on the prompt.
        if name.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidField {
                field,
                message: "name must not be a number".to_string(),
            });
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(ValidationError::InvalidField {
                field: "names".to_string(),
                message: format!("name '{name}' used more than once"),
            });
        }
    }
    Ok(())
}

/// Logging configuration defaults to terminal output at `warn`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Write JSON lines to `path` instead of the terminal.
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default = "default_log_path")]
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            path: default_log_path(),
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
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

fn default_tracing_level() -> String {
    "warn".to_string()
}

fn default_log_path() -> String {
    DEFAULT_LOG_PATH.to_string()
}

/// Failures while loading a config file, tagged with its path.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot open mdfish config {}: {}", .path.display(), .source)]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("config {} is not valid YAML: {}", .path.display(), .source)]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("config {} rejected: {}", .path.display(), .source)]
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

/// A config or environment value that failed validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FULL_YAML: &str = r#"
seed: 42
names: ["Me", "Ann", "Ben", "Cat"]
auto: true
logging:
  enable_structured: true
  tracing_level: "debug"
  path: "logs/run.jsonl"
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_full_config() {
        let mut cfg: AppConfig = serde_yaml::from_str(FULL_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.seed, Some(42));
        assert!(cfg.auto);
        assert_eq!(cfg.seat_names()[2], "Ben");
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert_eq!(cfg.logging.log_path(), PathBuf::from("logs/run.jsonl"));
    }

    #[test]
    fn empty_document_uses_defaults() {
        let mut cfg: AppConfig = serde_yaml::from_str("{}").expect("parse yaml");
        cfg.validate().expect("validate");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(
            cfg.seat_names(),
            ["Human", "Alice", "Bob", "Charlie"].map(String::from)
        );
        assert_eq!(cfg.logging.level(), Some(Level::WARN));
    }

    #[test]
    fn rejects_wrong_name_count() {
        let mut cfg = AppConfig {
            names: vec!["Solo".into()],
            ..AppConfig::default()
        };
        let err = cfg.validate().expect_err("one name");
        assert!(err.to_string().contains("expected 4 names"));
    }

    #[test]
    fn rejects_duplicate_names_ignoring_case() {
        let mut cfg = AppConfig {
            names: ["Human", "bob", "Bob", "Cat"].map(String::from).to_vec(),
            ..AppConfig::default()
        };
        let err = cfg.validate().expect_err("duplicate");
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_numeric_and_spaced_names() {
        for bad in ["2", "Mary Ann", ""] {
            let mut cfg = AppConfig {
                names: ["Human", bad, "Bob", "Cat"].map(String::from).to_vec(),
                ..AppConfig::default()
            };
            let err = cfg.validate().expect_err(bad);
            assert!(err.to_string().starts_with("names[1]"), "{bad}: {err}");
        }
    }

    #[test]
    fn rejects_unknown_level() {
        let mut cfg = AppConfig::default();
        cfg.logging.tracing_level = "loud".to_string();
        assert!(cfg.validate().is_err());

        cfg.logging.tracing_level = "  ".to_string();
        cfg.validate().expect("blank level falls back to default");
        assert_eq!(cfg.logging.tracing_level, "warn");
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(env(&[(ENV_SEED, " 99 "), (ENV_AUTO, "On")]))
            .expect("overrides");
        assert_eq!(cfg.seed, Some(99));
        assert!(cfg.auto);

        cfg.apply_env_overrides(env(&[(ENV_AUTO, "0")]))
            .expect("overrides");
        assert!(!cfg.auto);
        assert_eq!(cfg.seed, Some(99));
    }

    #[test]
    fn env_overrides_reject_garbage() {
        let mut cfg = AppConfig::default();
        let err = cfg
            .apply_env_overrides(env(&[(ENV_SEED, "-3")]))
            .expect_err("negative seed");
        assert!(err.to_string().starts_with("MDF_SEED"));

        let err = cfg
            .apply_env_overrides(env(&[(ENV_AUTO, "maybe")]))
            .expect_err("bad flag");
        assert!(err.to_string().starts_with("MDF_AUTO"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::from_path("definitely/not/here.yaml").expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.path(), Path::new("definitely/not/here.yaml"));
    }
}

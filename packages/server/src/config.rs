//! Process configuration.
//!
//! Values come from the command line and an optional JSON file. Command-line
//! values win over file values, which win over the built-in defaults.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid duration for `{name}`: {value}")]
    InvalidDuration { name: &'static str, value: f64 },
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "antenna-server")]
#[command(about = "Antenna room server (HTTP + WebSocket)", long_about = None)]
pub struct Args {
    /// Host address to bind the server to [default: 127.0.0.1]
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port number to bind the server to [default: 8080]
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Enable development tokens (`!<user_id>`)
    #[arg(long)]
    pub debug: bool,

    /// Path to a JSON configuration file
    #[arg(short = 'c', long, env = "CONFIG")]
    pub config: Option<PathBuf>,
}

/// Every duration the room runtime depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTimings {
    pub appointment: Duration,
    pub card_selection: Duration,
    pub storytelling: Duration,
    pub storytelling_continuation: Duration,
    /// A room without its creator connected for this long is closed.
    pub creator_absence: Duration,
    pub ping_interval: Duration,
    /// A connection silent for this long is considered lost.
    pub read_timeout: Duration,
    pub room_tick: Duration,
}

impl Default for GameTimings {
    fn default() -> Self {
        Self {
            appointment: Duration::from_secs(30),
            card_selection: Duration::from_secs(60),
            storytelling: Duration::from_secs(180),
            storytelling_continuation: Duration::from_secs(120),
            creator_absence: Duration::from_secs(180),
            ping_interval: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            room_tick: Duration::from_secs(10),
        }
    }
}

/// Timing overrides in the config file, in seconds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingsFile {
    pub appointment: Option<f64>,
    pub card_selection: Option<f64>,
    pub storytelling: Option<f64>,
    pub storytelling_continuation: Option<f64>,
    pub creator_absence: Option<f64>,
    pub ping_interval: Option<f64>,
    pub read_timeout: Option<f64>,
    pub room_tick: Option<f64>,
}

impl TimingsFile {
    pub fn apply(&self, base: GameTimings) -> Result<GameTimings, ConfigError> {
        fn pick(
            name: &'static str,
            value: Option<f64>,
            fallback: Duration,
        ) -> Result<Duration, ConfigError> {
            match value {
                None => Ok(fallback),
                Some(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs)
                    .map_err(|_| ConfigError::InvalidDuration { name, value: secs }),
                Some(secs) => Err(ConfigError::InvalidDuration { name, value: secs }),
            }
        }

        Ok(GameTimings {
            appointment: pick("appointment", self.appointment, base.appointment)?,
            card_selection: pick("card_selection", self.card_selection, base.card_selection)?,
            storytelling: pick("storytelling", self.storytelling, base.storytelling)?,
            storytelling_continuation: pick(
                "storytelling_continuation",
                self.storytelling_continuation,
                base.storytelling_continuation,
            )?,
            creator_absence: pick("creator_absence", self.creator_absence, base.creator_absence)?,
            ping_interval: pick("ping_interval", self.ping_interval, base.ping_interval)?,
            read_timeout: pick("read_timeout", self.read_timeout, base.read_timeout)?,
            room_tick: pick("room_tick", self.room_tick, base.room_tick)?,
        })
    }
}

/// The JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: Option<bool>,
    pub timings: TimingsFile,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub timings: GameTimings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            timings: GameTimings::default(),
        }
    }
}

impl ServerConfig {
    /// Resolve the command line, reading the config file it points to.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Layer command-line values over file values over defaults.
    pub fn merge(args: Args, file: FileConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: args.host.or(file.host).unwrap_or(defaults.host),
            port: args.port.or(file.port).unwrap_or(defaults.port),
            debug: args.debug || file.debug.unwrap_or(defaults.debug),
            timings: file.timings.apply(defaults.timings)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        // テスト項目: 設定ファイルも引数もなければ既定値になる
        // given (前提条件):
        let args = Args::parse_from(["antenna-server"]);

        // when (操作):
        let config = ServerConfig::merge(args, FileConfig::default()).unwrap();

        // then (期待する結果):
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.timings.appointment, Duration::from_secs(30));
        assert_eq!(config.timings.creator_absence, Duration::from_secs(180));
    }

    #[test]
    fn test_command_line_wins_over_file() {
        // テスト項目: コマンドライン引数が設定ファイルより優先される
        // given (前提条件):
        let args = Args::parse_from(["antenna-server", "--port", "9000"]);
        let file: FileConfig =
            serde_json::from_str(r#"{"host": "0.0.0.0", "port": 7000, "debug": true}"#).unwrap();

        // when (操作):
        let config = ServerConfig::merge(args, file).unwrap();

        // then (期待する結果):
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert!(config.debug);
    }

    #[test]
    fn test_timings_from_file() {
        // テスト項目: 設定ファイルの秒数でタイミングを上書きできる
        // given (前提条件):
        let file: FileConfig =
            serde_json::from_str(r#"{"timings": {"appointment": 0.5, "room_tick": 2}}"#).unwrap();

        // when (操作):
        let config = ServerConfig::merge(Args::default(), file).unwrap();

        // then (期待する結果):
        assert_eq!(config.timings.appointment, Duration::from_millis(500));
        assert_eq!(config.timings.room_tick, Duration::from_secs(2));
        assert_eq!(config.timings.storytelling, Duration::from_secs(180));
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        // テスト項目: 0 以下の秒数はエラーになる
        // given (前提条件):
        let file: FileConfig =
            serde_json::from_str(r#"{"timings": {"storytelling": -1}}"#).unwrap();

        // when (操作):
        let result = ServerConfig::merge(Args::default(), file);

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration { name: "storytelling", .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        // テスト項目: 未知のキーを含む設定ファイルはパースに失敗する
        // given (前提条件):
        let json = r#"{"prot": 8080}"#;

        // when (操作):
        let result = serde_json::from_str::<FileConfig>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }
}

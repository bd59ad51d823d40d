//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数 (`MCAL_*`)
//! 2. mac-calendar-mcp.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mac-calendar-mcp.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "MCAL_CONFIG";

/// Upper bound for `days_ahead` and `search_days_ahead`
pub const MAX_DAYS_AHEAD: u32 = 3650;

/// Which store backs the calendar tools
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The macOS EventKit framework
    #[default]
    EventKit,
    /// A JSON fixture file served from memory
    Fixture,
}

impl FromStr for StoreBackend {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "eventkit" => Ok(Self::EventKit),
            "fixture" | "memory" => Ok(Self::Fixture),
            other => Err(crate::Error::Config(format!(
                "Unknown store backend '{}' (expected 'eventkit' or 'fixture')",
                other
            ))),
        }
    }
}

/// Server identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Name reported to the MCP peer
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

/// Store selection and access settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend type
    #[serde(default)]
    pub backend: StoreBackend,

    /// Fixture file (required for the fixture backend)
    pub fixture_path: Option<PathBuf>,

    /// Seconds to wait for the user to answer an access prompt
    #[serde(default = "default_access_timeout_secs")]
    pub access_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            fixture_path: None,
            access_timeout_secs: default_access_timeout_secs(),
        }
    }
}

/// Defaults applied when a tool call leaves a parameter out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultsConfig {
    /// Window length for events and reminders
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,

    /// Window length for search
    #[serde(default = "default_search_days_ahead")]
    pub search_days_ahead: u32,

    /// Keep reminders without a due date when a date window is active
    #[serde(default)]
    pub include_undated_reminders: bool,

    /// "local" or an IANA zone name
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            days_ahead: default_days_ahead(),
            search_days_ahead: default_search_days_ahead(),
            include_undated_reminders: false,
            timezone: default_timezone(),
        }
    }
}

/// Main configuration for mac-calendar-mcp
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

fn default_server_name() -> String {
    "mac-calendar-mcp".to_string()
}

fn default_access_timeout_secs() -> u64 {
    30
}

fn default_days_ahead() -> u32 {
    7
}

fn default_search_days_ahead() -> u32 {
    30
}

fn default_timezone() -> String {
    "local".to_string()
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML の値を再帰的にたどり、文字列中の `${VAR}` を展開する
    fn expand_toml_value(value: toml::Value) -> toml::Value {
        match value {
            toml::Value::String(s) => toml::Value::String(Self::expand_env_vars(&s)),
            toml::Value::Array(items) => {
                toml::Value::Array(items.into_iter().map(Self::expand_toml_value).collect())
            }
            toml::Value::Table(table) => toml::Value::Table(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::expand_toml_value(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Parse TOML text (with `${VAR}` expansion) into a configuration
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let raw: toml::Value = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Invalid TOML: {}", e)))?;
        let expanded = Self::expand_toml_value(raw);

        let toml_config: TomlConfig = expanded
            .try_into()
            .map_err(|e| crate::Error::Config(format!("Invalid configuration: {}", e)))?;

        Self::from_toml_config(toml_config)
    }

    /// Read a TOML configuration file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// 設定を読み込む
    ///
    /// `.env` を読み込んだ後、`path` → `MCAL_CONFIG` → `./mac-calendar-mcp.toml`
    /// の順に設定ファイルを探し、見つからなければデフォルト値を使います。
    /// 最後に環境変数で上書きし、検証します。
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading configuration");
                Self::from_toml_file(&path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!(path = DEFAULT_CONFIG_FILE, "Loading configuration");
                Self::from_toml_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Configuration from defaults plus environment variables only
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_toml_config(toml: TomlConfig) -> crate::Result<Self> {
        let server = toml.server.unwrap_or_default();
        let store = toml.store.unwrap_or_default();
        let defaults = toml.defaults.unwrap_or_default();

        let backend = match store.backend {
            Some(name) => name.parse()?,
            None => StoreBackend::default(),
        };

        Ok(Config {
            server: ServerConfig {
                name: server.name.unwrap_or_else(default_server_name),
            },
            store: StoreConfig {
                backend,
                fixture_path: store
                    .fixture_path
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from),
                access_timeout_secs: store
                    .access_timeout_secs
                    .unwrap_or_else(default_access_timeout_secs),
            },
            defaults: DefaultsConfig {
                days_ahead: defaults.days_ahead.unwrap_or_else(default_days_ahead),
                search_days_ahead: defaults
                    .search_days_ahead
                    .unwrap_or_else(default_search_days_ahead),
                include_undated_reminders: defaults.include_undated_reminders.unwrap_or(false),
                timezone: defaults.timezone.unwrap_or_else(default_timezone),
            },
        })
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// `lookup` で得た値で設定を上書きする（空文字列は無視）
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(name) = get("MCAL_SERVER_NAME") {
            self.server.name = name;
        }

        if let Some(backend) = get("MCAL_STORE_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.store.backend = backend,
                Err(e) => tracing::warn!("Ignoring MCAL_STORE_BACKEND: {}", e),
            }
        }
        if let Some(path) = get("MCAL_FIXTURE_PATH") {
            self.store.fixture_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = get("MCAL_ACCESS_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.store.access_timeout_secs = secs,
                Err(_) => {
                    tracing::warn!(value = %secs, "Ignoring invalid MCAL_ACCESS_TIMEOUT_SECS")
                }
            }
        }

        if let Some(days) = get("MCAL_DAYS_AHEAD") {
            match days.trim().parse() {
                Ok(days) => self.defaults.days_ahead = days,
                Err(_) => tracing::warn!(value = %days, "Ignoring invalid MCAL_DAYS_AHEAD"),
            }
        }
        if let Some(days) = get("MCAL_SEARCH_DAYS_AHEAD") {
            match days.trim().parse() {
                Ok(days) => self.defaults.search_days_ahead = days,
                Err(_) => tracing::warn!(value = %days, "Ignoring invalid MCAL_SEARCH_DAYS_AHEAD"),
            }
        }
        if let Some(flag) = get("MCAL_INCLUDE_UNDATED_REMINDERS") {
            match parse_bool(&flag) {
                Some(flag) => self.defaults.include_undated_reminders = flag,
                None => tracing::warn!(
                    value = %flag,
                    "Ignoring invalid MCAL_INCLUDE_UNDATED_REMINDERS"
                ),
            }
        }
        if let Some(tz) = get("MCAL_TIMEZONE") {
            self.defaults.timezone = tz.trim().to_string();
        }
    }

    /// 読み込んだ設定の整合性を検証する
    pub fn validate(&self) -> crate::Result<()> {
        if self.store.backend == StoreBackend::Fixture && self.store.fixture_path.is_none() {
            return Err(crate::Error::Config(
                "store.fixture_path is required when store.backend = \"fixture\"".to_string(),
            ));
        }
        if self.store.access_timeout_secs == 0 {
            return Err(crate::Error::Config(
                "store.access_timeout_secs must be greater than zero".to_string(),
            ));
        }
        for (key, days) in [
            ("defaults.days_ahead", self.defaults.days_ahead),
            ("defaults.search_days_ahead", self.defaults.search_days_ahead),
        ] {
            if days > MAX_DAYS_AHEAD {
                return Err(crate::Error::Config(format!(
                    "{} must be at most {}, got {}",
                    key, MAX_DAYS_AHEAD, days
                )));
            }
        }
        if self.defaults.timezone.trim().is_empty() {
            return Err(crate::Error::Config(
                "defaults.timezone must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// TOML 設定ファイル用の構造体
// ============================================================================

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    server: Option<TomlServerConfig>,
    #[serde(default)]
    store: Option<TomlStoreConfig>,
    #[serde(default)]
    defaults: Option<TomlDefaultsConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlServerConfig {
    /// サーバー名
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlStoreConfig {
    /// "eventkit" または "fixture"
    backend: Option<String>,
    /// フィクスチャ JSON のパス
    fixture_path: Option<String>,
    /// アクセス許可ダイアログの待ち時間（秒）
    access_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDefaultsConfig {
    days_ahead: Option<u32>,
    search_days_ahead: Option<u32>,
    include_undated_reminders: Option<bool>,
    timezone: Option<String>,
}

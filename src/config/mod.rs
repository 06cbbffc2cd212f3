//! Settings store: the user's preferences for `autofill`, kept in a YAML file.
//!
//! Loading never fails on content: a missing key, or a key holding something
//! unusable, silently falls back to its default, and numbers are clamped.

use crate::errors::{AppError, AppResult};
use crate::page::wait::{DEFAULT_SETTLE_MS, DEFAULT_TIMEOUT_MS, Waiter};
use crate::ui::messages::warning;
use crate::utils::time::parse_time;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_NOMINAL_START: &str = "08:00";
/// `DEFAULT_NOMINAL_START` as a time of day, checked at compile time.
pub const DEFAULT_NOMINAL_START_TIME: NaiveTime = match NaiveTime::from_hms_opt(8, 0, 0) {
    Some(t) => t,
    None => panic!("08:00 is a valid time of day"),
};
pub const DEFAULT_FUZZ_START: i64 = 15;
pub const DEFAULT_FUZZ_DURATION: i64 = 15;
pub const DEFAULT_FTE_PERCENT: i64 = 100;
/// Upper bound for both jitters: a whole day.
pub const MAX_FUZZ_MINUTES: i64 = 24 * 60;

/// Keys as they appear in the file.
pub const KEYS: [&str; 7] = [
    "database",
    "nominalStartTime",
    "fuzzStartTime",
    "fuzzDuration",
    "ftePercent",
    "uiSettleMs",
    "uiTimeoutMs",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// SQLite file holding the operation log
    pub database: String,
    /// Nominal start of the working day (HH:MM)
    pub nominal_start_time: String,
    /// Start time jitter, ± minutes
    pub fuzz_start_time: i64,
    /// Duration jitter, ± minutes
    pub fuzz_duration: i64,
    /// Share of the short rows to fill, in percent
    pub fte_percent: i64,
    /// Settle step between UI actions
    pub ui_settle_ms: u64,
    /// Give up waiting for the page after this long
    pub ui_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            nominal_start_time: DEFAULT_NOMINAL_START.to_string(),
            fuzz_start_time: DEFAULT_FUZZ_START,
            fuzz_duration: DEFAULT_FUZZ_DURATION,
            fte_percent: DEFAULT_FTE_PERCENT,
            ui_settle_ms: DEFAULT_SETTLE_MS,
            ui_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Integer from a YAML number or a numeric string ("15" from a form field).
fn as_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("sheetfill")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".sheetfill")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("sheetfill.conf")
    }

    /// Return the full path of the operation log database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("sheetfill.sqlite")
    }

    /// Load the configuration file, or defaults if there is none.
    /// An unreadable file is reported and replaced by defaults.
    pub fn load() -> Self {
        let path = Self::config_file();
        if !path.exists() {
            return Config::default();
        }

        match Self::load_from(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warning(format!(
                    "Cannot read {:?} ({}), using default settings",
                    path, e
                ));
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Lenient parse: each key is taken on its own, defaults fill the gaps.
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let yaml: Value = if content.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(content)?
        };

        let mut cfg = Config::default();
        let Some(map) = yaml.as_mapping() else {
            return Ok(cfg);
        };
        let get = |key: &str| map.get(Value::String(key.to_string()));

        if let Some(db) = get("database").and_then(Value::as_str)
            && !db.trim().is_empty()
        {
            cfg.database = db.to_string();
        }
        if let Some(start) = get("nominalStartTime").and_then(Value::as_str)
            && parse_time(start).is_some()
        {
            cfg.nominal_start_time = start.trim().to_string();
        }
        if let Some(v) = get("fuzzStartTime").and_then(as_int) {
            cfg.fuzz_start_time = v;
        }
        if let Some(v) = get("fuzzDuration").and_then(as_int) {
            cfg.fuzz_duration = v;
        }
        if let Some(v) = get("ftePercent").and_then(as_int) {
            cfg.fte_percent = v;
        }
        if let Some(v) = get("uiSettleMs").and_then(as_int) {
            cfg.ui_settle_ms = v.max(0) as u64;
        }
        if let Some(v) = get("uiTimeoutMs").and_then(as_int) {
            cfg.ui_timeout_ms = v.max(0) as u64;
        }

        cfg.clamp();
        Ok(cfg)
    }

    /// Jitters within a day, FTE at least 1%, timeout not below one settle step.
    pub fn clamp(&mut self) {
        self.fuzz_start_time = self.fuzz_start_time.clamp(0, MAX_FUZZ_MINUTES);
        self.fuzz_duration = self.fuzz_duration.clamp(0, MAX_FUZZ_MINUTES);
        self.fte_percent = self.fte_percent.max(1);
        self.ui_settle_ms = self.ui_settle_ms.max(1);
        self.ui_timeout_ms = self.ui_timeout_ms.max(self.ui_settle_ms);
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self) -> AppResult<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;
        self.save_to(&Self::config_file())
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let mut clamped = self.clone();
        clamped.clamp();
        let yaml = clamped.to_yaml()?;
        fs::write(path, yaml).map_err(|_| AppError::ConfigSave)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "database" => Some(self.database.clone()),
            "nominalStartTime" => Some(self.nominal_start_time.clone()),
            "fuzzStartTime" => Some(self.fuzz_start_time.to_string()),
            "fuzzDuration" => Some(self.fuzz_duration.to_string()),
            "ftePercent" => Some(self.fte_percent.to_string()),
            "uiSettleMs" => Some(self.ui_settle_ms.to_string()),
            "uiTimeoutMs" => Some(self.ui_timeout_ms.to_string()),
            _ => None,
        }
    }

    /// Strict counterpart of the lenient loader: bad input is an error here.
    pub fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        let value = value.trim();
        let int = || -> AppResult<i64> {
            value
                .parse()
                .map_err(|_| AppError::Config(format!("'{}' expects a number, got '{}'", key, value)))
        };

        match key {
            "database" => self.database = value.to_string(),
            "nominalStartTime" => {
                parse_time(value).ok_or_else(|| AppError::InvalidTime(value.to_string()))?;
                self.nominal_start_time = value.to_string();
            }
            "fuzzStartTime" => self.fuzz_start_time = int()?,
            "fuzzDuration" => self.fuzz_duration = int()?,
            "ftePercent" => self.fte_percent = int()?,
            "uiSettleMs" => self.ui_settle_ms = int()?.max(0) as u64,
            "uiTimeoutMs" => self.ui_timeout_ms = int()?.max(0) as u64,
            other => {
                return Err(AppError::Config(format!(
                    "unknown key '{}' (known: {})",
                    other,
                    KEYS.join(", ")
                )));
            }
        }

        self.clamp();
        Ok(())
    }

    /// Keys absent from the file on disk.
    pub fn missing_keys(path: &Path) -> AppResult<Vec<&'static str>> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let yaml: Value = serde_yaml::from_str(&content)?;
        let map = yaml.as_mapping();

        Ok(KEYS
            .iter()
            .copied()
            .filter(|k| map.is_none_or(|m| !m.contains_key(Value::String(k.to_string()))))
            .collect())
    }

    /// Nominal start as a time of day; a hand-edited bad value means 08:00.
    pub fn nominal_start(&self) -> NaiveTime {
        parse_time(&self.nominal_start_time).unwrap_or(DEFAULT_NOMINAL_START_TIME)
    }

    pub fn waiter(&self) -> Waiter {
        Waiter::new(
            Duration::from_millis(self.ui_settle_ms),
            Duration::from_millis(self.ui_timeout_ms),
        )
    }

    /// Initialize configuration file and log database
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> io::Result<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        // Keep the user's settings if a config file already exists
        let mut config = if Self::config_file().exists() {
            Self::load()
        } else {
            Config::default()
        };
        config.database = db_path.to_string_lossy().to_string();

        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(io::Error::other)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        Ok(config)
    }
}

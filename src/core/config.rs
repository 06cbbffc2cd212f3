use crate::config::{Config, KEYS};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(cfg: &Config) -> AppResult<()> {
        println!("📄 Current configuration:\n");
        println!("{}", cfg.to_yaml()?);
        Ok(())
    }

    pub fn get(cfg: &Config, key: &str) -> AppResult<String> {
        cfg.get(key).ok_or_else(|| {
            AppError::Config(format!("unknown key '{}' (known: {})", key, KEYS.join(", ")))
        })
    }

    /// `KEY=VALUE`, validated, clamped and saved.
    pub fn set(cfg: &Config, assignment: &str) -> AppResult<Config> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| AppError::Config(format!("expected KEY=VALUE, got '{}'", assignment)))?;

        let mut updated = cfg.clone();
        updated.set(key.trim(), value)?;
        updated.save()?;

        success(format!(
            "{} = {}",
            key.trim(),
            updated.get(key.trim()).unwrap_or_default()
        ));
        Ok(updated)
    }

    /// Report keys the file on disk does not set (their defaults apply).
    pub fn check(path: &Path) -> AppResult<Vec<&'static str>> {
        if !path.exists() {
            warning(format!("No configuration file at {:?}, defaults apply", path));
            return Ok(KEYS.to_vec());
        }

        let missing = Config::missing_keys(path)?;
        if missing.is_empty() {
            success("Configuration file is complete.");
        } else {
            for key in &missing {
                warning(format!("'{}' not set, default applies", key));
            }
        }
        Ok(missing)
    }

    /// Open the file in `editor`, then `$EDITOR`/`$VISUAL`, then the platform default.
    pub fn edit(path: &Path, editor: &Option<String>) -> AppResult<()> {
        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });
        let requested = editor.clone().unwrap_or_else(|| default_editor.clone());

        match Command::new(&requested).arg(path).status() {
            Ok(s) if s.success() => {
                success(format!(
                    "Configuration file edited successfully using '{}'",
                    requested
                ));
                return Ok(());
            }
            _ => warning(format!(
                "Editor '{}' not available, falling back to '{}'",
                requested, default_editor
            )),
        }

        let status = Command::new(&default_editor)
            .arg(path)
            .status()
            .map_err(|e| AppError::Config(e.to_string()))?;
        if !status.success() {
            return Err(AppError::Config(format!(
                "failed to edit configuration file using '{}'",
                default_editor
            )));
        }

        success(format!(
            "Configuration file edited successfully using fallback '{}'",
            default_editor
        ));
        Ok(())
    }
}

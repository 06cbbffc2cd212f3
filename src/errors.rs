//! Unified application error type.
//! All modules (page, core, db, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage. Every variant is fatal to the
//! operation in flight: nothing is retried and earlier writes are not rolled back.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    // ---------------------------
    // Page / table errors
    // ---------------------------
    #[error("Timesheet file not found: {0}")]
    PageNotFound(String),

    #[error("Unexpected page structure: {0}")]
    Structure(String),

    #[error("Date out of timesheet period: {0}")]
    DateOutOfRange(String),

    #[error("Row {0} is no longer present in the table")]
    RowNotFound(u32),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Operation cancelled")]
    Cancelled,

    // ---------------------------
    // Logic errors
    // ---------------------------
    #[error("Inconsistent table between passes: {0}")]
    Consistency(String),

    #[error("Cannot schedule row: {0}")]
    Schedule(String),

    #[error("Another operation is already running")]
    Busy,

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

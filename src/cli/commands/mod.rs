pub mod config;
pub mod init;
pub mod log;
pub mod message;
pub mod run;

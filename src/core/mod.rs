pub mod calculator;
pub mod config;
pub mod engine;
pub mod extract;
pub mod interact;
pub mod log;
pub mod table;

//! Status lines for the terminal: coloured icon, then the message.

use std::fmt;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

#[derive(Clone, Copy)]
enum Level {
    Info,
    Success,
    Warning,
}

impl Level {
    fn style(self) -> (&'static str, &'static str) {
        match self {
            Level::Info => ("\x1b[34m", "ℹ️"),
            Level::Success => ("\x1b[32m", "✅"),
            Level::Warning => ("\x1b[33m", "⚠️"),
        }
    }
}

fn emit<T: fmt::Display>(level: Level, msg: T) {
    let (color, icon) = level.style();
    let line = format!("{}{}{} {}{}", color, BOLD, icon, RESET, msg);
    // stderr keeps machine-readable stdout (`message`) clean
    match level {
        Level::Warning => eprintln!("{}", line),
        _ => println!("{}", line),
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    emit(Level::Info, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    emit(Level::Success, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    emit(Level::Warning, msg);
}

/// Banner opening an operation's output.
pub fn header<T: fmt::Display>(msg: T) {
    println!("{}{}── {} ──{}\n", Level::Info.style().0, BOLD, msg, RESET);
}

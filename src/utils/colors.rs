//! ANSI colours for the written-rows table.

pub const RESET: &str = "\x1b[0m";

const GREY: &str = "\x1b[90m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";

fn paint(color: &str, value: &str) -> String {
    format!("{color}{value}{RESET}")
}

fn is_blank(value: &str) -> bool {
    matches!(value.trim(), "" | "--:--")
}

/// Start of a working day: green, grey when blanked.
pub fn colorize_start(value: &str) -> String {
    paint(if is_blank(value) { GREY } else { GREEN }, value)
}

/// End of a working day: red, grey when blanked.
pub fn colorize_end(value: &str) -> String {
    paint(if is_blank(value) { GREY } else { RED }, value)
}

/// Worked minus required: over is green, short is red.
pub fn color_for_delta(value: i64) -> &'static str {
    match value.signum() {
        1 => GREEN,
        -1 => RED,
        _ => RESET,
    }
}

//! Text helpers for terminal output.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Signed clock-style difference: `+00:12`, `-01:05`, `00:00`.
pub fn signed_hhmm(mins: i64) -> String {
    let sign = match mins.signum() {
        1 => "+",
        -1 => "-",
        _ => "",
    };
    let abs = mins.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

use chrono::NaiveDate;

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// English ordinal suffix for a day of month: 1 → "st", 12 → "th", 22 → "nd".
pub fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Row label as the timesheet prints it: "Sun, Oct 18th".
pub fn row_label(d: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{}{}", d.format("%a, %b %-d"), ordinal_suffix(d.day()))
}

/// Period header as the timesheet prints it: "Oct 1st, 2026 - Oct 31st, 2026".
pub fn period_label(min: NaiveDate, max: NaiveDate) -> String {
    use chrono::Datelike;
    format!(
        "{}{}, {} - {}{}, {}",
        min.format("%b %-d"),
        ordinal_suffix(min.day()),
        min.year(),
        max.format("%b %-d"),
        ordinal_suffix(max.day()),
        max.year()
    )
}

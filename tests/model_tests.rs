use chrono::{NaiveDate, Weekday};
use proptest::prelude::*;
use sheetfill::errors::AppError;
use sheetfill::models::duration::WorkDuration;
use sheetfill::models::month_day::MonthDay;
use sheetfill::models::period::TimesheetPeriod;
use sheetfill::utils::date::{period_label, row_label};
use sheetfill::utils::time::{add_duration, parse_slot, parse_time};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ------------------------------------------------
// WorkDuration
// ------------------------------------------------

#[test]
fn duration_labels_parse_with_or_without_spaces() {
    assert_eq!(WorkDuration::parse("8h 30m").unwrap().to_minutes(), 510);
    assert_eq!(WorkDuration::parse(" 08h 00m ").unwrap().to_minutes(), 480);
    assert_eq!(WorkDuration::parse("0h0m").unwrap(), WorkDuration::ZERO);
    assert_eq!(WorkDuration::parse("26h 05m").unwrap().hours(), 26);
}

#[test]
fn duration_rejects_text_without_hours_and_minutes() {
    for bad in ["", "8h", "30m", "08:30", "eight hours"] {
        assert!(
            matches!(WorkDuration::parse(bad), Err(AppError::Parse(_))),
            "'{}' accepted",
            bad
        );
    }
}

#[test]
fn duration_add_carries_minutes_without_wrapping() {
    let a = WorkDuration::new(23, 50).unwrap();
    let b = WorkDuration::new(0, 20).unwrap();
    let sum = a.add(b).unwrap();
    assert_eq!((sum.hours(), sum.minutes()), (24, 10));
}

#[test]
fn duration_too_large_for_minutes_is_a_parse_error() {
    for huge in ["4294967295h 00m", "71582789h 00m", "99999999999h 00m"] {
        assert!(
            matches!(WorkDuration::parse(huge), Err(AppError::Parse(_))),
            "'{}' accepted",
            huge
        );
    }
    // largest hour count that still fits
    assert_eq!(
        WorkDuration::parse("71582788h 15m").unwrap().to_minutes(),
        71_582_788 * 60 + 15
    );

    assert_eq!(WorkDuration::new(u32::MAX, 0), None);
    let max = WorkDuration::from_minutes(u32::MAX);
    assert_eq!(max.add(WorkDuration::from_minutes(1)), None);
    assert_eq!(max.add(WorkDuration::ZERO), Some(max));
}

proptest! {
    #[test]
    fn duration_minutes_round_trip(mins in any::<u32>()) {
        let w = WorkDuration::from_minutes(mins);
        prop_assert_eq!(w.to_minutes(), mins);
        prop_assert!(w.minutes() < 60);
        prop_assert_eq!(WorkDuration::from_minutes(w.to_minutes()), w);
    }

    #[test]
    fn duration_order_matches_total_minutes(a in any::<u32>(), b in any::<u32>()) {
        let (x, y) = (WorkDuration::from_minutes(a), WorkDuration::from_minutes(b));
        prop_assert_eq!(x.cmp(&y), a.cmp(&b));
    }

    #[test]
    fn duration_label_parses_back(mins in 0u32..(1_000_000 * 60)) {
        let w = WorkDuration::from_minutes(mins);
        prop_assert_eq!(WorkDuration::parse(&w.label()).unwrap(), w);
    }
}

#[test]
fn duration_order_follows_minutes() {
    let mut v = vec![
        WorkDuration::new(8, 0).unwrap(),
        WorkDuration::new(7, 59).unwrap(),
        WorkDuration::new(8, 1).unwrap(),
        WorkDuration::ZERO,
    ];
    v.sort();
    let mins: Vec<u32> = v.iter().map(|x| x.to_minutes()).collect();
    assert_eq!(mins, vec![0, 479, 480, 481]);
}

#[test]
fn duration_formats() {
    let w = WorkDuration::from_minutes(485);
    assert_eq!(w.to_string(), "08:05");
    assert_eq!(w.label(), "08h 05m");
}

// ------------------------------------------------
// Time of day
// ------------------------------------------------

#[test]
fn empty_slot_sentinel_reads_as_no_time() {
    assert_eq!(parse_slot("--:--").unwrap(), None);
    assert_eq!(parse_slot("  ").unwrap(), None);
    assert_eq!(parse_slot("07:45").unwrap(), parse_time("07:45"));
    assert!(matches!(parse_slot("7h45"), Err(AppError::InvalidTime(_))));
}

#[test]
fn adding_past_midnight_is_refused() {
    let late = parse_time("20:00").unwrap();
    assert_eq!(
        add_duration(late, WorkDuration::new(3, 59).unwrap()).unwrap(),
        parse_time("23:59").unwrap()
    );
    assert!(matches!(
        add_duration(late, WorkDuration::new(4, 0).unwrap()),
        Err(AppError::Schedule(_))
    ));
}

// ------------------------------------------------
// MonthDay
// ------------------------------------------------

#[test]
fn row_labels_parse_with_optional_weekday_and_suffix() {
    let md = MonthDay::parse("Sun, Oct 18th").unwrap();
    assert_eq!((md.month(), md.day, md.weekday), (10, 18, Some(Weekday::Sun)));

    let md = MonthDay::parse("Oct 2").unwrap();
    assert_eq!((md.month0, md.day, md.weekday), (9, 2, None));

    assert!(MonthDay::parse("Sept 1st").is_ok());
}

#[test]
fn row_labels_with_unknown_month_fail() {
    assert!(matches!(MonthDay::parse("Foo 18th"), Err(AppError::Parse(_))));
    assert!(matches!(MonthDay::parse("Oct 32nd"), Err(AppError::Parse(_))));
    assert!(matches!(MonthDay::parse("18/10"), Err(AppError::Parse(_))));
}

// ------------------------------------------------
// TimesheetPeriod
// ------------------------------------------------

#[test]
fn period_label_parses_both_dates() {
    let p = TimesheetPeriod::parse("Oct 1st, 2026 - Oct 31st, 2026").unwrap();
    assert_eq!(p.min_date(), d(2026, 10, 1));
    assert_eq!(p.max_date(), d(2026, 10, 31));

    // our own label format reads back
    let label = period_label(d(2025, 12, 15), d(2026, 1, 14));
    assert_eq!(label, "Dec 15th, 2025 - Jan 14th, 2026");
    assert!(TimesheetPeriod::parse(&label).is_ok());
}

#[test]
fn period_invariants_are_enforced() {
    // backwards
    assert!(matches!(
        TimesheetPeriod::parse("Oct 31st, 2026 - Oct 1st, 2026"),
        Err(AppError::Parse(_))
    ));
    // too long
    assert!(matches!(
        TimesheetPeriod::parse("Jan 1st, 2025 - Feb 1st, 2026"),
        Err(AppError::Parse(_))
    ));
    // one date only
    assert!(matches!(
        TimesheetPeriod::parse("Oct 1st, 2026"),
        Err(AppError::Parse(_))
    ));
}

#[test]
fn row_dates_resolve_across_the_new_year() {
    let p = TimesheetPeriod::new(d(2025, 12, 15), d(2026, 1, 14)).unwrap();

    let jan = MonthDay::parse("Fri, Jan 2nd").unwrap();
    assert_eq!(p.resolve(&jan).unwrap(), d(2026, 1, 2));

    let dec = MonthDay::parse("Wed, Dec 31st").unwrap();
    assert_eq!(p.resolve(&dec).unwrap(), d(2025, 12, 31));

    let early_dec = MonthDay::parse("Dec 1st").unwrap();
    assert!(matches!(
        p.resolve(&early_dec),
        Err(AppError::DateOutOfRange(_))
    ));
}

#[test]
fn leap_day_resolves_into_the_year_that_has_it() {
    let p = TimesheetPeriod::new(d(2027, 3, 1), d(2028, 2, 29)).unwrap();
    let md = MonthDay::parse("Feb 29th").unwrap();
    assert_eq!(p.resolve(&md).unwrap(), d(2028, 2, 29));
}

#[test]
fn weekday_must_agree_with_the_resolved_date() {
    let p = TimesheetPeriod::new(d(2026, 10, 1), d(2026, 10, 31)).unwrap();
    assert!(p.resolve(&MonthDay::parse("Sun, Oct 18th").unwrap()).is_ok());
    assert!(matches!(
        p.resolve(&MonthDay::parse("Sat, Oct 18th").unwrap()),
        Err(AppError::DateOutOfRange(_))
    ));
}

#[test]
fn generated_row_labels_resolve_to_their_own_date() {
    let p = TimesheetPeriod::new(d(2026, 10, 1), d(2026, 10, 31)).unwrap();
    for day in 1..=31 {
        let date = d(2026, 10, day);
        let md = MonthDay::parse(&row_label(date)).unwrap();
        assert_eq!(p.resolve(&md).unwrap(), date);
    }
}

// SPDX-License-Identifier: MIT

use super::*;
use chrono::TimeZone;

#[test]
fn parses_valid_five_field_expression() {
    let schedule = CronSchedule::parse("*/5 * * * *").unwrap();
    assert_eq!(schedule.as_str(), "*/5 * * * *");
}

#[test]
fn rejects_wrong_field_count() {
    let err = CronSchedule::parse("* * * *").unwrap_err();
    assert!(err.contains("5-field"));
}

#[test]
fn rejects_malformed_expression() {
    assert!(CronSchedule::parse("99 * * * *").is_err());
}

#[test]
fn next_after_advances_to_next_minute_boundary() {
    let schedule = CronSchedule::parse("* * * * *").unwrap();
    let now = Utc.with_ymd_and_hms(2026, 7, 28, 12, 0, 30).unwrap();
    let next = schedule.next_after(now).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 7, 28, 12, 1, 0).unwrap());
}

#[test]
fn daily_schedule_lands_on_configured_hour() {
    let schedule = CronSchedule::parse("0 3 * * *").unwrap();
    let now = Utc.with_ymd_and_hms(2026, 7, 28, 12, 0, 0).unwrap();
    let next = schedule.next_after(now).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 7, 29, 3, 0, 0).unwrap());
}

proptest::proptest! {
    #[test]
    fn parse_never_panics_on_arbitrary_input(raw in "\\PC{0,40}") {
        let _ = CronSchedule::parse(&raw);
    }

    #[test]
    fn valid_minute_hour_pairs_round_trip_through_as_str(minute in 0u32..60, hour in 0u32..24) {
        let raw = format!("{minute} {hour} * * *");
        let schedule = CronSchedule::parse(&raw).unwrap();
        proptest::prop_assert_eq!(schedule.as_str(), raw);
    }
}

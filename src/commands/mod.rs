pub mod add;
pub mod check;
pub mod config;
pub mod delete;
pub mod edit;
pub mod list;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use medshift_core::DateRange;
use medshift_core::date_range::{parse_end, parse_start};
use medshift_core::recurrence::{EndCondition, Frequency, RecurrenceRule};
use medshift_core::schedule::EntryId;

/// Build a range from `--start` plus either `--end` or `--duration`.
/// With neither, a date-only start covers that day and a timed start lasts an hour.
pub fn resolve_range(start: &str, end: Option<&str>, duration: Option<&str>) -> Result<DateRange> {
    let start_dt = parse_start(start)?;

    let end_dt = if let Some(end) = end {
        parse_end(end)?
    } else {
        let length = match duration {
            Some(dur_input) => parse_duration(dur_input)?,
            None if is_date_only(start) => Duration::days(1),
            None => Duration::hours(1),
        };
        start_dt
            .checked_add_signed(length)
            .context("Duration too large")?
    };

    Ok(DateRange::new(start_dt, end_dt)?)
}

fn parse_duration(input: &str) -> Result<Duration> {
    let std_dur = humantime::parse_duration(input)
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;
    Duration::from_std(std_dur).context("Duration too large")
}

fn is_date_only(input: &str) -> bool {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").is_ok()
}

/// Build a recurrence rule from the `--repeat/--count/--until` flags.
pub fn build_rule(
    frequency: Frequency,
    count: Option<u32>,
    until: Option<&str>,
) -> Result<RecurrenceRule> {
    let end_condition = match (count, until) {
        (Some(n), _) => EndCondition::AfterCount(n),
        (None, Some(date)) => EndCondition::OnDate(
            NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid --until date '{}'. Expected YYYY-MM-DD", date))?,
        ),
        (None, None) => EndCondition::Never,
    };

    if frequency == Frequency::None && end_condition != EndCondition::Never {
        anyhow::bail!("--count and --until need --repeat daily, weekly or monthly");
    }

    Ok(RecurrenceRule::new(frequency, end_condition))
}

pub fn parse_entry_id(id: &str) -> Result<EntryId> {
    id.parse()
        .with_context(|| format!("Invalid entry id '{}'", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn range_with_end() {
        let range = resolve_range("2026-03-20T08:00", Some("2026-03-20T12:00"), None).unwrap();
        assert_eq!(range.start, at(20, 8, 0));
        assert_eq!(range.end, at(20, 12, 0));
    }

    #[test]
    fn range_with_duration() {
        let range = resolve_range("2026-03-20T14:00", None, Some("4h")).unwrap();
        assert_eq!(range.end, at(20, 18, 0));
    }

    #[test]
    fn range_with_minutes_duration() {
        let range = resolve_range("2026-03-20T14:00", None, Some("30m")).unwrap();
        assert_eq!(range.end, at(20, 14, 30));
    }

    #[test]
    fn date_only_start_defaults_to_whole_day() {
        let range = resolve_range("2026-03-20", None, None).unwrap();
        assert_eq!(range.start, at(20, 0, 0));
        assert_eq!(range.end, at(21, 0, 0));
    }

    #[test]
    fn timed_start_defaults_to_one_hour() {
        let range = resolve_range("2026-03-20T15:00", None, None).unwrap();
        assert_eq!(range.end, at(20, 16, 0));
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(resolve_range("2026-03-20T15:00", Some("2026-03-20T09:00"), None).is_err());
    }

    #[test]
    fn bad_duration_is_rejected() {
        assert!(resolve_range("2026-03-20T15:00", None, Some("a while")).is_err());
    }

    #[test]
    fn huge_duration_is_rejected() {
        let err = resolve_range("2026-03-20T14:00", None, Some("100000000years")).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn rule_from_count() {
        let rule = build_rule(Frequency::Weekly, Some(3), None).unwrap();
        assert_eq!(rule.end_condition, EndCondition::AfterCount(3));
    }

    #[test]
    fn rule_from_until() {
        let rule = build_rule(Frequency::Daily, None, Some("2026-04-01")).unwrap();
        assert_eq!(
            rule.end_condition,
            EndCondition::OnDate(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())
        );
    }

    #[test]
    fn rule_without_end_never_stops() {
        let rule = build_rule(Frequency::Monthly, None, None).unwrap();
        assert_eq!(rule.end_condition, EndCondition::Never);
    }

    #[test]
    fn count_without_repeat_is_rejected() {
        assert!(build_rule(Frequency::None, Some(3), None).is_err());
    }

    #[test]
    fn entry_id_must_be_uuid() {
        assert!(parse_entry_id("42").is_err());
        let id = EntryId::generate();
        assert_eq!(parse_entry_id(&id.to_string()).unwrap(), id);
    }
}

//! Recurrence expansion for repeating availability.
//!
//! Expands one base range and a rule into the concrete occurrences to store,
//! one schedule entry per occurrence.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::{PlanError, PlanResult};

/// Cap for rules that never end, counted from the base start.
pub const DEFAULT_HORIZON_DAYS: i64 = 365;

/// No series reaches this many days past its first occurrence, whatever its
/// end condition or horizon.
pub const MAX_HORIZON_DAYS: i64 = DEFAULT_HORIZON_DAYS * 100;

/// Exclusive bound on occurrence starts for a series beginning at `start`.
fn span_end(start: NaiveDateTime) -> NaiveDateTime {
    start
        .checked_add_signed(Duration::days(MAX_HORIZON_DAYS))
        .unwrap_or(NaiveDateTime::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Shortest gap between two consecutive occurrences.
    fn min_period(self) -> Option<Duration> {
        match self {
            Frequency::None => None,
            Frequency::Daily => Some(Duration::days(1)),
            Frequency::Weekly => Some(Duration::weeks(1)),
            Frequency::Monthly => Some(Duration::days(28)),
        }
    }

    /// Start of the `step`-th occurrence (0 is the base itself).
    ///
    /// Monthly steps are taken from the base rather than the previous
    /// occurrence so a base on the 31st lands on the 31st again whenever the
    /// month allows it.
    fn nth_start(self, base: NaiveDateTime, step: u32) -> Option<NaiveDateTime> {
        match self {
            Frequency::None => (step == 0).then_some(base),
            Frequency::Daily => base.checked_add_signed(Duration::days(i64::from(step))),
            Frequency::Weekly => base.checked_add_signed(Duration::weeks(i64::from(step))),
            Frequency::Monthly => base.checked_add_months(Months::new(step)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Frequency::None => "none",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

impl FromStr for Frequency {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "once" => Ok(Frequency::None),
            "daily" | "day" => Ok(Frequency::Daily),
            "weekly" | "week" => Ok(Frequency::Weekly),
            "monthly" | "month" => Ok(Frequency::Monthly),
            other => Err(PlanError::InvalidRecurrence(format!(
                "unknown frequency '{}' (expected none, daily, weekly or monthly)",
                other
            ))),
        }
    }
}

/// When a recurrence stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    /// Runs until the expansion horizon
    #[default]
    Never,
    /// Exactly this many occurrences, the base included
    AfterCount(u32),
    /// Occurrences starting on or before this date
    OnDate(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub end_condition: EndCondition,
}

impl RecurrenceRule {
    /// A rule that produces only the base range.
    pub fn once() -> Self {
        Self::default()
    }

    pub fn new(frequency: Frequency, end_condition: EndCondition) -> Self {
        RecurrenceRule {
            frequency,
            end_condition,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.frequency != Frequency::None
    }

    /// Reject rules that would produce nothing sensible for `base`.
    pub fn check(&self, base: &DateRange) -> PlanResult<()> {
        if !base.is_well_formed() {
            return Err(PlanError::InvalidRange {
                start: base.start.to_string(),
                end: base.end.to_string(),
            });
        }

        if !self.is_recurring() {
            return Ok(());
        }

        if let Some(period) = self.frequency.min_period() {
            if base.duration() > period {
                return Err(PlanError::InvalidRecurrence(format!(
                    "a {} repeat cannot be longer than its period",
                    self.frequency
                )));
            }
        }

        let limit = span_end(base.start);

        match self.end_condition {
            EndCondition::AfterCount(0) => Err(PlanError::InvalidRecurrence(
                "occurrence count must be at least 1".into(),
            )),
            EndCondition::AfterCount(count)
                if self
                    .frequency
                    .nth_start(base.start, count - 1)
                    .is_none_or(|last| last >= limit) =>
            {
                Err(PlanError::InvalidRecurrence(format!(
                    "{} {} occurrences would run past {} days",
                    count, self.frequency, MAX_HORIZON_DAYS
                )))
            }
            EndCondition::OnDate(until) if until < base.start.date() => {
                Err(PlanError::InvalidRecurrence(format!(
                    "end date {} is before the first occurrence on {}",
                    until,
                    base.start.date()
                )))
            }
            EndCondition::OnDate(until) if until >= limit.date() => {
                Err(PlanError::InvalidRecurrence(format!(
                    "end date {} is more than {} days after the first occurrence",
                    until, MAX_HORIZON_DAYS
                )))
            }
            _ => Ok(()),
        }
    }
}

/// One concrete instance of a (possibly recurring) range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub range: DateRange,
}

impl Occurrence {
    pub fn start(&self) -> NaiveDateTime {
        self.range.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.range.end
    }
}

/// Expand `base` according to `rule`, capping open-ended rules at
/// [`DEFAULT_HORIZON_DAYS`].
pub fn expand(base: &DateRange, rule: &RecurrenceRule) -> Vec<Occurrence> {
    expand_with_horizon(base, rule, Duration::days(DEFAULT_HORIZON_DAYS))
}

/// Expand `base` according to `rule`.
///
/// The first occurrence is always `base`. Every later one keeps the base
/// duration. `EndCondition::Never` emits occurrences starting strictly
/// before `base.start + horizon`. The horizon is clamped to
/// [`MAX_HORIZON_DAYS`], and no occurrence starts that far past the base.
pub fn expand_with_horizon(
    base: &DateRange,
    rule: &RecurrenceRule,
    horizon: Duration,
) -> Vec<Occurrence> {
    let mut occurrences = vec![Occurrence { range: *base }];
    if !rule.is_recurring() {
        return occurrences;
    }

    let duration = base.duration();
    let limit = span_end(base.start);
    let horizon_end = base
        .start
        .checked_add_signed(horizon.min(Duration::days(MAX_HORIZON_DAYS)))
        .unwrap_or(NaiveDateTime::MAX);

    for step in 1u32.. {
        let Some(start) = rule.frequency.nth_start(base.start, step) else {
            break;
        };
        if start >= limit {
            break;
        }

        let within = match rule.end_condition {
            EndCondition::Never => start < horizon_end,
            EndCondition::AfterCount(count) => step < count,
            EndCondition::OnDate(until) => start.date() <= until,
        };
        if !within {
            break;
        }

        let Some(end) = start.checked_add_signed(duration) else {
            break;
        };
        occurrences.push(Occurrence {
            range: DateRange::unchecked(start, end),
        });
    }

    occurrences
}

/// Check the rule against `base`, then expand.
pub fn try_expand(
    base: &DateRange,
    rule: &RecurrenceRule,
    horizon: Duration,
) -> PlanResult<Vec<Occurrence>> {
    rule.check(base)?;
    Ok(expand_with_horizon(base, rule, horizon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monday_morning() -> DateRange {
        // 2024-01-01 is a Monday
        DateRange::new(at(2024, 1, 1, 9), at(2024, 1, 1, 10)).unwrap()
    }

    fn starts(occurrences: &[Occurrence]) -> Vec<NaiveDateTime> {
        occurrences.iter().map(Occurrence::start).collect()
    }

    #[test]
    fn none_yields_base_only() {
        let base = monday_morning();
        let occurrences = expand(&base, &RecurrenceRule::once());
        assert_eq!(occurrences, vec![Occurrence { range: base }]);
    }

    #[test]
    fn none_ignores_end_condition() {
        let base = monday_morning();
        let rule = RecurrenceRule::new(Frequency::None, EndCondition::AfterCount(10));
        assert_eq!(expand(&base, &rule).len(), 1);
    }

    #[test]
    fn weekly_after_three() {
        let base = monday_morning();
        let rule = RecurrenceRule::new(Frequency::Weekly, EndCondition::AfterCount(3));
        let occurrences = expand(&base, &rule);

        assert_eq!(
            starts(&occurrences),
            vec![at(2024, 1, 1, 9), at(2024, 1, 8, 9), at(2024, 1, 15, 9)]
        );
        assert!(
            occurrences
                .iter()
                .all(|o| o.range.duration() == Duration::hours(1))
        );
    }

    #[test]
    fn daily_until_date_is_inclusive() {
        let base = DateRange::new(at(2024, 1, 1, 8), at(2024, 1, 1, 12)).unwrap();
        let rule = RecurrenceRule::new(Frequency::Daily, EndCondition::OnDate(date(2024, 1, 5)));
        let days: Vec<u32> = expand(&base, &rule)
            .iter()
            .map(|o| chrono::Datelike::day(&o.start()))
            .collect();

        assert_eq!(days, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn expansion_is_deterministic() {
        let base = monday_morning();
        let rule = RecurrenceRule::new(Frequency::Monthly, EndCondition::AfterCount(6));
        assert_eq!(expand(&base, &rule), expand(&base, &rule));
    }

    #[test]
    fn never_ending_daily_is_capped_at_horizon() {
        let base = monday_morning();
        let rule = RecurrenceRule::new(Frequency::Daily, EndCondition::Never);
        let occurrences = expand(&base, &rule);

        assert_eq!(occurrences.len(), DEFAULT_HORIZON_DAYS as usize);
        assert_eq!(occurrences.last().unwrap().start(), at(2024, 12, 30, 9));
    }

    #[test]
    fn never_ending_weekly_is_capped_at_horizon() {
        let base = monday_morning();
        let rule = RecurrenceRule::new(Frequency::Weekly, EndCondition::Never);
        assert_eq!(expand(&base, &rule).len(), 53);
    }

    #[test]
    fn custom_horizon() {
        let base = monday_morning();
        let rule = RecurrenceRule::new(Frequency::Daily, EndCondition::Never);
        let occurrences = expand_with_horizon(&base, &rule, Duration::days(30));
        assert_eq!(occurrences.len(), 30);
    }

    #[test]
    fn monthly_clamps_to_month_end() {
        let base = DateRange::new(at(2024, 1, 31, 14), at(2024, 1, 31, 18)).unwrap();
        let rule = RecurrenceRule::new(Frequency::Monthly, EndCondition::AfterCount(4));

        assert_eq!(
            starts(&expand(&base, &rule)),
            vec![
                at(2024, 1, 31, 14),
                at(2024, 2, 29, 14),
                at(2024, 3, 31, 14),
                at(2024, 4, 30, 14),
            ]
        );
    }

    #[test]
    fn multi_day_duration_is_preserved() {
        let base = DateRange::all_day(date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        let rule = RecurrenceRule::new(Frequency::Monthly, EndCondition::AfterCount(2));
        let occurrences = expand(&base, &rule);

        assert_eq!(occurrences[1].start(), at(2024, 2, 1, 0));
        assert_eq!(occurrences[1].end(), at(2024, 2, 4, 0));
    }

    #[test]
    fn check_rejects_zero_count() {
        let rule = RecurrenceRule::new(Frequency::Daily, EndCondition::AfterCount(0));
        let result = rule.check(&monday_morning());
        assert!(matches!(result, Err(PlanError::InvalidRecurrence(_))));
    }

    #[test]
    fn check_rejects_end_date_before_start() {
        let rule = RecurrenceRule::new(Frequency::Weekly, EndCondition::OnDate(date(2023, 12, 31)));
        assert!(rule.check(&monday_morning()).is_err());
    }

    #[test]
    fn check_accepts_end_date_on_start_day() {
        let rule = RecurrenceRule::new(Frequency::Weekly, EndCondition::OnDate(date(2024, 1, 1)));
        assert!(rule.check(&monday_morning()).is_ok());
        assert_eq!(expand(&monday_morning(), &rule).len(), 1);
    }

    #[test]
    fn check_rejects_occurrences_longer_than_period() {
        let base = DateRange::all_day(date(2024, 1, 1), date(2024, 1, 2)).unwrap();
        let rule = RecurrenceRule::new(Frequency::Daily, EndCondition::AfterCount(3));
        assert!(matches!(rule.check(&base), Err(PlanError::InvalidRecurrence(_))));
    }

    #[test]
    fn check_accepts_back_to_back_days() {
        let base = DateRange::all_day(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        let rule = RecurrenceRule::new(Frequency::Daily, EndCondition::AfterCount(3));
        assert!(rule.check(&base).is_ok());
    }

    #[test]
    fn check_rejects_malformed_base() {
        let base = DateRange::unchecked(at(2024, 1, 2, 0), at(2024, 1, 1, 0));
        let result = RecurrenceRule::once().check(&base);
        assert!(matches!(result, Err(PlanError::InvalidRange { .. })));
    }

    #[test]
    fn try_expand_checks_first() {
        let rule = RecurrenceRule::new(Frequency::Daily, EndCondition::AfterCount(0));
        let result = try_expand(&monday_morning(), &rule, Duration::days(365));
        assert!(result.is_err());
    }

    #[test]
    fn oversized_horizon_still_starts_with_base() {
        let base = monday_morning();
        let rule = RecurrenceRule::new(Frequency::Weekly, EndCondition::Never);
        let occurrences = expand_with_horizon(&base, &rule, Duration::days(100_000_000));

        assert_eq!(occurrences[0].range, base);
        // clamped to MAX_HORIZON_DAYS: weeks 0..=5214
        assert_eq!(occurrences.len(), 5215);
        assert!(occurrences.last().unwrap().start() < at(2123, 12, 31, 0));
    }

    #[test]
    fn base_at_end_of_calendar_is_kept() {
        let base = DateRange::new(
            NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap(),
            NaiveDate::MAX.and_hms_opt(12, 0, 0).unwrap(),
        )
        .unwrap();
        let rule = RecurrenceRule::new(Frequency::Daily, EndCondition::Never);

        assert_eq!(expand(&base, &rule), vec![Occurrence { range: base }]);
    }

    #[test]
    fn check_rejects_counts_past_the_limit() {
        let base = monday_morning();
        let huge = RecurrenceRule::new(Frequency::Daily, EndCondition::AfterCount(4_000_000_000));
        assert!(matches!(huge.check(&base), Err(PlanError::InvalidRecurrence(_))));

        let just_over = RecurrenceRule::new(
            Frequency::Daily,
            EndCondition::AfterCount(MAX_HORIZON_DAYS as u32 + 1),
        );
        assert!(just_over.check(&base).is_err());

        let at_limit = RecurrenceRule::new(
            Frequency::Daily,
            EndCondition::AfterCount(MAX_HORIZON_DAYS as u32),
        );
        assert!(at_limit.check(&base).is_ok());
        assert_eq!(expand(&base, &at_limit).len(), MAX_HORIZON_DAYS as usize);
    }

    #[test]
    fn check_rejects_far_end_dates() {
        let rule = RecurrenceRule::new(Frequency::Daily, EndCondition::OnDate(date(9999, 12, 31)));
        assert!(matches!(
            rule.check(&monday_morning()),
            Err(PlanError::InvalidRecurrence(_))
        ));
    }

    #[test]
    fn frequency_parses_case_insensitively() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("none".parse::<Frequency>().unwrap(), Frequency::None);
        assert!("fortnightly".parse::<Frequency>().is_err());
    }
}

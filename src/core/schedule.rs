use crate::core::units::{HOURS_PER_DAY, MINUTES_PER_DAY, MINUTES_PER_HOUR};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contiguous block of time within one day with a fixed number of lights switched on.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Period {
    pub duration_hours: f64,
    pub lights_on: u32,
}

impl Period {
    pub fn new(duration_hours: f64, lights_on: u32) -> Self {
        Self {
            duration_hours,
            lights_on,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("'{0}' is not a valid time of day (expected HH:MM)")]
    InvalidClockTime(String),
    #[error("Period {period_number} has an invalid duration of {duration_hours} hours")]
    InvalidDuration {
        period_number: usize,
        duration_hours: f64,
    },
    #[error("At least one period is needed to describe a schedule")]
    NoPeriods,
    #[error("A schedule can have at most {max} periods (was given {count})")]
    TooManyPeriods { count: usize, max: usize },
    #[error("Period {period_number} has {lights_on} lights on, but there are only {total_lights} lights in total")]
    TooManyLightsOn {
        period_number: usize,
        lights_on: u32,
        total_lights: u32,
    },
    #[error("The total duration ({total_hours:.1} hours) must be approximately 24 hours (within {tolerance_hours} hours). Please adjust the time periods.")]
    TotalNotOneDay {
        total_hours: f64,
        tolerance_hours: f64,
    },
}

pub fn parse_clock_time(time: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| ScheduleError::InvalidClockTime(time.to_string()))
}

/// Length in hours of the period from `start` to `end`, where an `end` earlier than `start` is
/// taken to be on the following day. Seconds are ignored.
pub fn duration_hours(start: NaiveTime, end: NaiveTime) -> f64 {
    let start_minutes = minutes_since_midnight(start);
    let mut end_minutes = minutes_since_midnight(end);

    if end_minutes < start_minutes {
        end_minutes += MINUTES_PER_DAY;
    }

    (end_minutes - start_minutes) as f64 / MINUTES_PER_HOUR as f64
}

fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * MINUTES_PER_HOUR + time.minute()
}

pub fn total_duration_hours(periods: &[Period]) -> f64 {
    periods.iter().map(|period| period.duration_hours).sum()
}

/// Check that the periods of a schedule add up to one day, give or take `tolerance_hours`.
pub fn check_schedule_total(periods: &[Period], tolerance_hours: f64) -> Result<(), ScheduleError> {
    let total_hours = total_duration_hours(periods);

    if is_close!(total_hours, HOURS_PER_DAY as f64, abs_tol = tolerance_hours) {
        Ok(())
    } else {
        Err(ScheduleError::TotalNotOneDay {
            total_hours,
            tolerance_hours,
        })
    }
}

/// Data structures representing how schedule periods can be provided as input (in JSON).
pub mod input {
    use super::{duration_hours, parse_clock_time, Period, ScheduleError};
    use crate::core::units::round_to_decimal_places;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
    #[serde(untagged)]
    pub enum ScheduleEntry {
        Clock(ClockPeriodEntry),
        Duration(DurationPeriodEntry),
    }

    /// A period given as wall-clock start and end times, e.g. "23:00" to "01:00".
    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
    #[serde(deny_unknown_fields)]
    pub struct ClockPeriodEntry {
        pub start: String,
        pub end: String,
        pub lights_on: u32,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
    #[serde(deny_unknown_fields)]
    pub struct DurationPeriodEntry {
        pub duration_hours: f64,
        pub lights_on: u32,
    }

    impl ScheduleEntry {
        /// Convert into a period. Durations derived from clock times are rounded to
        /// `duration_decimal_places`; explicit durations are taken as given.
        pub fn to_period(&self, duration_decimal_places: i32) -> Result<Period, ScheduleError> {
            match self {
                ScheduleEntry::Clock(ClockPeriodEntry {
                    start,
                    end,
                    lights_on,
                }) => {
                    let duration = duration_hours(parse_clock_time(start)?, parse_clock_time(end)?);
                    Ok(Period::new(
                        round_to_decimal_places(duration, duration_decimal_places),
                        *lights_on,
                    ))
                }
                ScheduleEntry::Duration(DurationPeriodEntry {
                    duration_hours,
                    lights_on,
                }) => Ok(Period::new(*duration_hours, *lights_on)),
            }
        }
    }

    impl From<Period> for ScheduleEntry {
        fn from(period: Period) -> Self {
            ScheduleEntry::Duration(DurationPeriodEntry {
                duration_hours: period.duration_hours,
                lights_on: period.lights_on,
            })
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[rstest]
    #[case(time(23, 0), time(1, 0), 2.0)]
    #[case(time(8, 0), time(23, 0), 15.0)]
    #[case(time(0, 0), time(0, 0), 0.0)]
    #[case(time(22, 30), time(6, 15), 7.75)]
    #[case(time(0, 0), time(23, 59), 1439. / 60.)]
    fn should_calculate_duration_hours(
        #[case] start: NaiveTime,
        #[case] end: NaiveTime,
        #[case] expected: f64,
    ) {
        assert_eq!(duration_hours(start, end), expected);
    }

    #[rstest]
    fn should_ignore_seconds_when_calculating_duration() {
        let start = NaiveTime::from_hms_opt(8, 0, 59).unwrap();
        assert_eq!(duration_hours(start, time(9, 0)), 1.0);
    }

    #[rstest]
    fn should_parse_clock_times() {
        assert_eq!(parse_clock_time("07:45").unwrap(), time(7, 45));
        assert_eq!(parse_clock_time(" 23:00 ").unwrap(), time(23, 0));
        assert!(parse_clock_time("25:00").is_err());
    }

    #[fixture]
    fn split_day() -> Vec<Period> {
        vec![Period::new(12., 500), Period::new(8., 250), Period::new(4., 0)]
    }

    #[rstest]
    fn should_accept_schedule_covering_one_day(split_day: Vec<Period>) {
        assert_eq!(total_duration_hours(&split_day), 24.);
        assert!(check_schedule_total(&split_day, 0.1).is_ok());
    }

    #[rstest]
    fn should_accept_schedule_within_tolerance() {
        let periods = vec![Period::new(16., 10), Period::new(7.95, 10)];
        assert!(check_schedule_total(&periods, 0.1).is_ok());
    }

    #[rstest]
    fn should_reject_schedule_outside_tolerance() {
        let periods = vec![Period::new(16., 10), Period::new(7.5, 10)];
        assert_eq!(
            check_schedule_total(&periods, 0.1),
            Err(ScheduleError::TotalNotOneDay {
                total_hours: 23.5,
                tolerance_hours: 0.1,
            })
        );
    }
}

//! Recurrence options for scheduled jobs.
//!
//! Cadences are written as `daily HH:MM` or `weekly DAY HH:MM` (UTC), where
//! `DAY` is a three-letter weekday such as `MON`.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc, Weekday};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily { at: NaiveTime },
    Weekly { weekday: Weekday, at: NaiveTime },
}

impl Cadence {
    /// Six-field cron expression (`sec min hour dom month dow`) as accepted
    /// by `tokio-cron-scheduler`.
    #[must_use]
    pub fn to_cron(&self) -> String {
        match self {
            Cadence::Daily { at } => format!("0 {} {} * * *", at.minute(), at.hour()),
            Cadence::Weekly { weekday, at } => format!(
                "0 {} {} * * {}",
                at.minute(),
                at.hour(),
                weekday_code(*weekday)
            ),
        }
    }

    /// The first fire time strictly after `now`.
    #[must_use]
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Cadence::Daily { at } => {
                let candidate = now.date_naive().and_time(*at).and_utc();
                if candidate > now {
                    candidate
                } else {
                    candidate + Duration::days(1)
                }
            }
            Cadence::Weekly { weekday, at } => {
                let today = now.weekday().num_days_from_monday();
                let target = weekday.num_days_from_monday();
                let days_ahead = (target + 7 - today) % 7;
                let candidate = (now.date_naive() + Duration::days(i64::from(days_ahead)))
                    .and_time(*at)
                    .and_utc();
                if candidate > now {
                    candidate
                } else {
                    candidate + Duration::days(7)
                }
            }
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cadence::Daily { at } => write!(f, "daily {}", at.format("%H:%M")),
            Cadence::Weekly { weekday, at } => {
                write!(f, "weekly {} {}", weekday_code(*weekday), at.format("%H:%M"))
            }
        }
    }
}

impl FromStr for Cadence {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidCadence {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [kind, time] if kind.eq_ignore_ascii_case("daily") => Ok(Cadence::Daily {
                at: parse_time(time).ok_or_else(|| invalid("expected HH:MM time"))?,
            }),
            [kind, day, time] if kind.eq_ignore_ascii_case("weekly") => Ok(Cadence::Weekly {
                weekday: parse_weekday(day)
                    .ok_or_else(|| invalid("expected weekday such as MON"))?,
                at: parse_time(time).ok_or_else(|| invalid("expected HH:MM time"))?,
            }),
            _ => Err(invalid("expected `daily HH:MM` or `weekly DAY HH:MM`")),
        }
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

fn parse_weekday(raw: &str) -> Option<Weekday> {
    match raw.to_uppercase().as_str() {
        "MON" | "MONDAY" => Some(Weekday::Mon),
        "TUE" | "TUESDAY" => Some(Weekday::Tue),
        "WED" | "WEDNESDAY" => Some(Weekday::Wed),
        "THU" | "THURSDAY" => Some(Weekday::Thu),
        "FRI" | "FRIDAY" => Some(Weekday::Fri),
        "SAT" | "SATURDAY" => Some(Weekday::Sat),
        "SUN" | "SUNDAY" => Some(Weekday::Sun),
        _ => None,
    }
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}

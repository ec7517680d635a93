// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reset cadence policy and its pure next-fire evaluator

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One day in seconds; the upper bound for interval sub-mode.
pub const SECS_PER_DAY: u32 = 86_400;

/// Reset cadence kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetKind {
    Daily,
    Weekly,
    Monthly,
    Interval,
}

impl fmt::Display for ResetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResetKind::Daily => "daily",
            ResetKind::Weekly => "weekly",
            ResetKind::Monthly => "monthly",
            ResetKind::Interval => "interval",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ResetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(ResetKind::Daily),
            "weekly" => Ok(ResetKind::Weekly),
            "monthly" => Ok(ResetKind::Monthly),
            "interval" => Ok(ResetKind::Interval),
            other => Err(format!("unknown reset type: {}", other)),
        }
    }
}

/// Immutable description of when resets occur.
///
/// Exactly one mode-specific field is authoritative per `kind`; the others
/// are stored anyway so switching kinds never loses previously entered
/// values. All fields are validated at the settings boundary — the
/// evaluator assumes a well-formed policy and is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPolicy {
    pub kind: ResetKind,
    /// Target local hour (0-23) for daily/weekly/monthly cadences.
    pub hour_of_day: u8,
    /// ISO day of week, 1 = Monday .. 7 = Sunday (weekly only).
    pub day_of_week: u8,
    /// Day of month 1-31, clamped to the target month's length (monthly only).
    pub day_of_month: u8,
    /// Fixed period in seconds; active only strictly inside (0, 86400).
    pub interval_secs: u32,
}

impl ResetPolicy {
    /// The repeating period when interval sub-mode is active.
    ///
    /// An interval of 0 or >= one day falls back to hour-based daily
    /// scheduling and yields `None` here.
    pub fn interval_period(&self) -> Option<Duration> {
        if self.kind == ResetKind::Interval
            && self.interval_secs > 0
            && self.interval_secs < SECS_PER_DAY
        {
            Some(Duration::from_secs(u64::from(self.interval_secs)))
        } else {
            None
        }
    }

    /// Compute the next fire instant strictly after `now`.
    ///
    /// For interval sub-mode this is only used for the very first fire;
    /// the scheduler arms a repeating timer at `interval_period()` instead
    /// of re-deriving a one-shot after each fire.
    pub fn next_fire(&self, now: NaiveDateTime) -> NaiveDateTime {
        if self.interval_period().is_some() {
            return now + chrono::Duration::seconds(i64::from(self.interval_secs));
        }
        match self.kind {
            ResetKind::Weekly => self.next_weekly(now),
            ResetKind::Monthly => self.next_monthly(now),
            ResetKind::Daily | ResetKind::Interval => self.next_daily(now),
        }
    }

    /// Human-readable cadence description for status output.
    pub fn describe(&self) -> String {
        match self.kind {
            ResetKind::Daily => format!("daily at {:02}:00", self.hour_of_day),
            ResetKind::Weekly => format!(
                "weekly on {} at {:02}:00",
                weekday_name(self.day_of_week),
                self.hour_of_day
            ),
            ResetKind::Monthly => format!(
                "monthly on day {} at {:02}:00",
                self.day_of_month, self.hour_of_day
            ),
            ResetKind::Interval => match self.interval_period() {
                Some(p) if p.as_secs() % 3600 == 0 => {
                    format!("every {} hour(s)", p.as_secs() / 3600)
                }
                Some(p) => format!("every {}s", p.as_secs()),
                // Out-of-range interval behaves as daily.
                None => format!("daily at {:02}:00", self.hour_of_day),
            },
        }
    }

    fn at_hour(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(u32::from(self.hour_of_day), 0, 0)
            .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
    }

    fn next_daily(&self, now: NaiveDateTime) -> NaiveDateTime {
        let mut candidate = self.at_hour(now.date());
        if candidate <= now {
            candidate += chrono::Duration::days(1);
        }
        candidate
    }

    fn next_weekly(&self, now: NaiveDateTime) -> NaiveDateTime {
        // Delta applies to the same-day candidate: "target day, hour already
        // passed" lands exactly 7 days out.
        let base = self.at_hour(now.date());
        let current = i64::from(now.weekday().number_from_monday());
        let mut delta = (i64::from(self.day_of_week) - current).rem_euclid(7);
        if delta == 0 && base <= now {
            delta = 7;
        }
        base + chrono::Duration::days(delta)
    }

    fn next_monthly(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        // Clamp before the has-it-passed comparison so a day-31 policy in a
        // 30-day month rolls over once the clamped day has passed.
        let this_day = u32::from(self.day_of_month).min(days_in_month(today.year(), today.month()));
        let this_candidate = self.at_hour(today.with_day(this_day).unwrap_or(today));
        let passed = today.day() > this_day || (today.day() == this_day && this_candidate <= now);
        if !passed {
            return this_candidate;
        }

        let (year, month) = if today.month() == 12 {
            (today.year() + 1, 1)
        } else {
            (today.year(), today.month() + 1)
        };
        let day = u32::from(self.day_of_month).min(days_in_month(year, month));
        NaiveDate::from_ymd_opt(year, month, day)
            .map(|d| self.at_hour(d))
            .unwrap_or(this_candidate)
    }
}

/// Length of the given month, leap-year aware.
fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn weekday_name(day: u8) -> String {
    match day {
        1 => "Monday".to_string(),
        2 => "Tuesday".to_string(),
        3 => "Wednesday".to_string(),
        4 => "Thursday".to_string(),
        5 => "Friday".to_string(),
        6 => "Saturday".to_string(),
        7 => "Sunday".to_string(),
        other => format!("day {}", other),
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;

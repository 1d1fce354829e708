//! Best-effort interpretation of the load-timestamp column.
//!
//! The export does not commit to a timestamp format, so this module guesses
//! one for the whole column and reports how confident the guess is. Fallback
//! order: epoch milliseconds, epoch seconds, day-first calendar dates,
//! month-first calendar dates. Callers that get nothing usable keep the
//! original file order. This is a heuristic, not a format contract.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Epoch values above this are read as milliseconds.
const EPOCH_MILLIS_FLOOR: i64 = 1_000_000_000_000;
/// Epoch values above this (but below the millisecond floor) are seconds.
const EPOCH_SECONDS_FLOOR: i64 = 1_000_000_000;
/// Day-first parsing is abandoned when it leaves more than this share
/// of values unparsed.
const DAY_FIRST_GIVE_UP_PERCENT: usize = 80;

const DAY_FIRST_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

const MONTH_FIRST_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y",
    "%m-%d-%Y",
];

/// How the column was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    EpochMillis,
    EpochSeconds,
    DayFirst,
    MonthFirst,
    /// Nothing parsed; callers should fall back to original order.
    Unparsed,
}

impl TimestampFormat {
    pub fn describe(self) -> &'static str {
        match self {
            Self::EpochMillis => "epoch milliseconds",
            Self::EpochSeconds => "epoch seconds",
            Self::DayFirst => "day-first dates",
            Self::MonthFirst => "month-first dates",
            Self::Unparsed => "unparsed",
        }
    }
}

/// Per-row parse results plus the confidence indicator for the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnParse {
    pub values: Vec<Option<NaiveDateTime>>,
    pub format: TimestampFormat,
    /// Rows that produced a timestamp.
    pub parsed: usize,
    /// Rows carrying a non-blank raw value.
    pub populated: usize,
}

impl ColumnParse {
    /// At least one value parsed, so ordering by timestamp is meaningful.
    pub fn usable(&self) -> bool {
        self.parsed > 0
    }
}

/// Interprets a whole column of raw values.
pub fn parse_column(raw: &[Option<&str>]) -> ColumnParse {
    let populated = raw
        .iter()
        .filter(|value| value.is_some_and(|v| !v.trim().is_empty()))
        .count();

    let digits: Vec<i64> = raw
        .iter()
        .filter_map(|value| value.and_then(parse_all_digits))
        .collect();

    if !digits.is_empty() {
        let over_millis = digits.iter().filter(|v| **v > EPOCH_MILLIS_FLOOR).count();
        if over_millis * 2 > digits.len() {
            return epoch_column(raw, TimestampFormat::EpochMillis, populated);
        }
        let over_seconds = digits.iter().filter(|v| **v > EPOCH_SECONDS_FLOOR).count();
        if over_seconds * 2 > digits.len() {
            return epoch_column(raw, TimestampFormat::EpochSeconds, populated);
        }
    }

    calendar_column(raw, populated)
}

/// Accepts only pure digit strings (optional leading minus); the epoch
/// heuristic must not fire on dates like `2024-01-01`.
fn parse_all_digits(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

fn epoch_column(raw: &[Option<&str>], format: TimestampFormat, populated: usize) -> ColumnParse {
    let values: Vec<Option<NaiveDateTime>> = raw
        .iter()
        .map(|value| {
            let epoch = value.and_then(parse_all_digits)?;
            let parsed = match format {
                TimestampFormat::EpochMillis => DateTime::from_timestamp_millis(epoch),
                _ => DateTime::from_timestamp(epoch, 0),
            };
            parsed.map(|dt| dt.naive_utc())
        })
        .collect();
    let parsed = values.iter().filter(|v| v.is_some()).count();
    ColumnParse {
        values,
        format,
        parsed,
        populated,
    }
}

fn calendar_column(raw: &[Option<&str>], populated: usize) -> ColumnParse {
    let day_first = calendar_pass(raw, &DAY_FIRST_FORMATS);
    let day_parsed = day_first.iter().filter(|v| v.is_some()).count();

    if populated == 0 {
        return ColumnParse {
            values: day_first,
            format: TimestampFormat::Unparsed,
            parsed: 0,
            populated,
        };
    }

    let day_unparsed_percent = (populated - day_parsed) * 100 / populated;
    if day_unparsed_percent > DAY_FIRST_GIVE_UP_PERCENT {
        let month_first = calendar_pass(raw, &MONTH_FIRST_FORMATS);
        let month_parsed = month_first.iter().filter(|v| v.is_some()).count();
        // Keep whichever convention failed less; ties stay day-first.
        if month_parsed > day_parsed {
            return ColumnParse {
                values: month_first,
                format: TimestampFormat::MonthFirst,
                parsed: month_parsed,
                populated,
            };
        }
    }

    let format = if day_parsed > 0 {
        TimestampFormat::DayFirst
    } else {
        TimestampFormat::Unparsed
    };
    ColumnParse {
        values: day_first,
        format,
        parsed: day_parsed,
        populated,
    }
}

fn calendar_pass(raw: &[Option<&str>], formats: &[&str]) -> Vec<Option<NaiveDateTime>> {
    raw.iter()
        .map(|value| value.and_then(|v| parse_calendar(v.trim(), formats)))
        .collect()
}

fn parse_calendar(raw: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

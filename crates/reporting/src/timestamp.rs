//! Tolerant parsing of client-supplied record instants.
//!
//! Input is first rewritten (first `T` becomes a space, one trailing `Z` is
//! dropped, a bare date gets ` 00:00:00`, a minute-precision value gets `:00`)
//! and then matched against a fixed list of shapes in order. The rewrite makes
//! the `T`-separated shapes unreachable; they stay in the list so the set of
//! accepted inputs does not change under clients. Unlabelled literals are read
//! as UTC. Second 60 is out of range, and a comma is accepted as the
//! fractional-second separator.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use regex::Regex;
use thiserror::Error;

use revdesk_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("unrecognized timestamp format: '{0}'")]
    Unrecognized(String),
}

impl From<TimestampError> for DomainError {
    fn from(value: TimestampError) -> Self {
        DomainError::invalid_input(value.to_string())
    }
}

/// Accepted shapes, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `YYYY-MM-DDTHH:MM:SS[.fff]±HH:MM`
    OffsetQualified,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    UtcSeconds,
    /// `YYYY-MM-DDTHH:MM:SS.mmmZ`
    UtcMillis,
    /// `YYYY-MM-DDTHH:MM`
    TMinutes,
    /// `YYYY-MM-DD HH:MM:SS` (fractional seconds tolerated, `.` or `,`)
    SpaceSeconds,
    /// `YYYY-MM-DD HH:MM`
    SpaceMinutes,
    /// `YYYY-MM-DD`
    DateOnly,
}

impl Shape {
    pub const PRECEDENCE: [Shape; 7] = [
        Shape::OffsetQualified,
        Shape::UtcSeconds,
        Shape::UtcMillis,
        Shape::TMinutes,
        Shape::SpaceSeconds,
        Shape::SpaceMinutes,
        Shape::DateOnly,
    ];

    fn pattern(self) -> &'static Regex {
        static PATTERNS: LazyLock<[Regex; 7]> = LazyLock::new(|| {
            [
                r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}([.,]\d+)?[+-]\d{2}:\d{2}$",
                r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$",
                r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$",
                r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}$",
                r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}([.,]\d+)?$",
                r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}$",
                r"^\d{4}-\d{2}-\d{2}$",
            ]
            .map(|p| Regex::new(p).expect("static timestamp pattern"))
        });
        &PATTERNS[self as usize]
    }

    /// Parse `input` if it has exactly this shape and names a real instant.
    pub fn parse(self, input: &str) -> Option<DateTime<Utc>> {
        if !self.pattern().is_match(input) {
            return None;
        }
        let input = input.replacen(',', ".", 1);
        let input = input.as_str();

        let naive = |fmt: &str| {
            NaiveDateTime::parse_from_str(input, fmt)
                .ok()
                .map(|n| n.and_utc())
        };

        let parsed = match self {
            Shape::OffsetQualified => DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f%:z")
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Shape::UtcSeconds => naive("%Y-%m-%dT%H:%M:%SZ"),
            Shape::UtcMillis => naive("%Y-%m-%dT%H:%M:%S%.3fZ"),
            Shape::TMinutes => naive("%Y-%m-%dT%H:%M"),
            Shape::SpaceSeconds => naive("%Y-%m-%d %H:%M:%S%.f"),
            Shape::SpaceMinutes => naive("%Y-%m-%d %H:%M"),
            Shape::DateOnly => NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|n| n.and_utc()),
        };

        // chrono folds second 60 into the nanosecond field.
        parsed.filter(|t| t.nanosecond() < 1_000_000_000)
    }
}

/// The pre-match rewrite applied to every input.
pub fn rewrite(input: &str) -> String {
    let mut s = input.replacen('T', " ", 1);
    if s.ends_with('Z') {
        s.pop();
    }
    match s.len() {
        10 => s.push_str(" 00:00:00"),
        16 => s.push_str(":00"),
        _ => {}
    }
    s
}

/// Normalize a free-text instant into a canonical UTC instant.
pub fn normalize_timestamp(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let rewritten = rewrite(input);
    Shape::PRECEDENCE
        .iter()
        .find_map(|shape| shape.parse(&rewritten))
        .ok_or_else(|| TimestampError::Unrecognized(input.to_string()))
}

/// Like [`normalize_timestamp`], also reporting which shape matched.
pub fn normalize_with_shape(input: &str) -> Result<(DateTime<Utc>, Shape), TimestampError> {
    let rewritten = rewrite(input);
    Shape::PRECEDENCE
        .iter()
        .find_map(|shape| shape.parse(&rewritten).map(|t| (t, *shape)))
        .ok_or_else(|| TimestampError::Unrecognized(input.to_string()))
}

// ABOUTME: Timestamp formats used by SMPP: receipt dates (YYMMDDhhmm) and absolute time
// ABOUTME: Absolute time is YYMMDDhhmmsstnnp with a quarter-hour UTC offset

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeFormatError {
    #[error("expected {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("non-digit in {0:?}")]
    InvalidDigit(String),
    #[error("date or time out of range in {0:?}")]
    OutOfRange(String),
    #[error("unsupported offset direction {0:?}")]
    InvalidOffset(char),
}

fn digits(value: &str, range: std::ops::Range<usize>) -> Result<u32, TimeFormatError> {
    let part = &value[range];
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeFormatError::InvalidDigit(value.to_string()));
    }
    part.parse()
        .map_err(|_| TimeFormatError::InvalidDigit(value.to_string()))
}

fn civil(value: &str, sec: u32) -> Result<NaiveDateTime, TimeFormatError> {
    let year = 2000 + digits(value, 0..2)? as i32;
    let month = digits(value, 2..4)?;
    let day = digits(value, 4..6)?;
    let hour = digits(value, 6..8)?;
    let minute = digits(value, 8..10)?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, sec))
        .ok_or_else(|| TimeFormatError::OutOfRange(value.to_string()))
}

fn check_digits(value: &str, count: usize) -> Result<(), TimeFormatError> {
    if value.bytes().take(count).all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(TimeFormatError::InvalidDigit(value.to_string()))
    }
}

/// Parses a delivery receipt date, `YYMMDDhhmm`. Years map to 2000-2099.
pub fn parse_report_date(value: &str) -> Result<NaiveDateTime, TimeFormatError> {
    if value.len() != 10 {
        return Err(TimeFormatError::InvalidLength {
            expected: 10,
            actual: value.len(),
        });
    }
    check_digits(value, 10)?;
    civil(value, 0)
}

pub fn format_report_date(value: &NaiveDateTime) -> String {
    value.format("%y%m%d%H%M").to_string()
}

/// Parses an SMPP absolute time (Section 7.1.1). Empty means "not set".
pub fn parse_absolute(value: &str) -> Result<Option<DateTime<FixedOffset>>, TimeFormatError> {
    if value.is_empty() {
        return Ok(None);
    }
    if value.len() != 16 {
        return Err(TimeFormatError::InvalidLength {
            expected: 16,
            actual: value.len(),
        });
    }
    // One-octet ASCII check so the byte ranges below are char boundaries.
    if !value.is_ascii() {
        return Err(TimeFormatError::InvalidDigit(value.to_string()));
    }
    check_digits(value, 15)?;
    let direction = value.as_bytes()[15] as char;
    if direction != '+' && direction != '-' {
        return Err(TimeFormatError::InvalidOffset(direction));
    }

    let naive = civil(value, digits(value, 10..12)?)?;
    let tenths = digits(value, 12..13)?;
    let naive = naive
        .with_nanosecond(tenths * 100_000_000)
        .ok_or_else(|| TimeFormatError::OutOfRange(value.to_string()))?;

    let quarters = digits(value, 13..15)? as i32;
    let seconds = quarters * 15 * 60;
    let offset = if direction == '+' {
        FixedOffset::east_opt(seconds)
    } else {
        FixedOffset::west_opt(seconds)
    }
    .ok_or_else(|| TimeFormatError::OutOfRange(value.to_string()))?;

    naive
        .and_local_timezone(offset)
        .single()
        .map(Some)
        .ok_or_else(|| TimeFormatError::OutOfRange(value.to_string()))
}

/// Formats an absolute time for `schedule_delivery_time` / `validity_period`.
pub fn format_absolute(value: &DateTime<FixedOffset>) -> String {
    let offset = value.offset().local_minus_utc();
    let direction = if offset < 0 { '-' } else { '+' };
    let quarters = offset.unsigned_abs() / (15 * 60);
    let tenths = value.nanosecond() / 100_000_000;
    format!(
        "{}{}{:02}{}",
        value.format("%y%m%d%H%M%S"),
        tenths.min(9),
        quarters,
        direction
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_date_maps_to_this_century() {
        let parsed = parse_report_date("1110261646").unwrap();
        let expected = NaiveDate::from_ymd_opt(2011, 10, 26)
            .unwrap()
            .and_hms_opt(16, 46, 0)
            .unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(format_report_date(&parsed), "1110261646");
    }

    #[test]
    fn report_date_rejects_bad_input() {
        assert_eq!(
            parse_report_date("11102616"),
            Err(TimeFormatError::InvalidLength {
                expected: 10,
                actual: 8
            })
        );
        assert!(matches!(
            parse_report_date("11102616x6"),
            Err(TimeFormatError::InvalidDigit(_))
        ));
        assert!(matches!(
            parse_report_date("1113261646"),
            Err(TimeFormatError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_report_date("1110262546"),
            Err(TimeFormatError::OutOfRange(_))
        ));
    }

    #[test]
    fn absolute_time_with_offset() {
        let parsed = parse_absolute("111026164630508+").unwrap().unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(parsed.second(), 30);
        assert_eq!(parsed.nanosecond(), 500_000_000);
        assert_eq!(format_absolute(&parsed), "111026164630508+");
    }

    #[test]
    fn absolute_time_west_of_utc() {
        let parsed = parse_absolute("240101000000012-").unwrap().unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -3 * 3600);
        assert_eq!(format_absolute(&parsed), "240101000000012-");
    }

    #[test]
    fn empty_absolute_time_is_unset() {
        assert_eq!(parse_absolute(""), Ok(None));
    }

    #[test]
    fn relative_time_is_not_absolute() {
        assert_eq!(
            parse_absolute("000001000000000R"),
            Err(TimeFormatError::InvalidOffset('R'))
        );
        assert_eq!(
            parse_absolute("020610233429000R"),
            Err(TimeFormatError::InvalidOffset('R'))
        );
        assert_eq!(
            parse_absolute("240301120000004x"),
            Err(TimeFormatError::InvalidOffset('x'))
        );
    }
}

//! Flexible timestamp parsing
//!
//! Accepts the machine formats query strings actually carry: RFC 3339 (with
//! any fractional precision), ISO date-times without an offset, space
//! separated date-times, bare dates and bare times. The first layout that
//! parses wins.
//!
//! Form decoding turns a literal `+` into a space, so
//! `2025-07-04T17:12:32+07:00` usually arrives as `2025-07-04T17:12:32 07:00`.
//! [`parse_timestamp`] puts the sign back before matching.

use crate::error::{DecodeError, DecodeResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy)]
enum Layout {
    /// RFC 3339 with `Z` or an explicit offset, any fraction length
    Rfc3339,
    /// Date-time without offset, interpreted as UTC
    Naive(&'static str),
    DateOnly,
    /// Time without date, placed on 1970-01-01 UTC
    TimeOnly(&'static str),
    /// Date-time with an explicit `%:z` offset
    Offset(&'static str),
}

/// Priority order. Earlier entries win.
const LAYOUTS: &[Layout] = &[
    Layout::Rfc3339,
    Layout::Naive("%Y-%m-%dT%H:%M:%S"),
    Layout::Naive("%Y-%m-%dT%H:%M:%S%.f"),
    Layout::Naive("%Y-%m-%d %H:%M:%S"),
    Layout::Naive("%Y-%m-%d %H:%M:%S%.f"),
    Layout::DateOnly,
    Layout::TimeOnly("%H:%M:%S"),
    Layout::TimeOnly("%H:%M:%S%.f"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%:z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%.3f%:z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%.6f%:z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%.9f%:z"),
    Layout::Offset("%Y-%m-%d %H:%M:%S%:z"),
    Layout::Offset("%Y-%m-%d %H:%M:%S%.3f%:z"),
    Layout::Offset("%Y-%m-%d %H:%M:%S%.6f%:z"),
    Layout::Offset("%Y-%m-%d %H:%M:%S%.9f%:z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S %:z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%.3f %:z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%.6f %:z"),
    Layout::Offset("%Y-%m-%dT%H:%M:%S%.9f %:z"),
];

/// Parse a timestamp literal, repairing a sign lost to form decoding
pub fn parse_timestamp(raw: &str) -> DecodeResult<DateTime<FixedOffset>> {
    parse_timestamp_with(raw, true)
}

/// Parse a timestamp literal; `repair_offsets` controls the `" HH:MM"` fix-up
pub fn parse_timestamp_with(raw: &str, repair_offsets: bool) -> DecodeResult<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    let value = if repair_offsets { repair_offset(trimmed) } else { Cow::Borrowed(trimmed) };

    if let Some(layout) = guess_layout(&value) {
        if let Some(parsed) = try_layout(layout, &value) {
            return Ok(parsed);
        }
    }

    LAYOUTS
        .iter()
        .find_map(|layout| try_layout(*layout, &value))
        .ok_or_else(|| {
            DecodeError::InvalidValue(format!(
                "unable to parse with any known date format: {}",
                value
            ))
        })
}

/// Cheap shape checks that pick the most likely layout before the full scan
fn guess_layout(value: &str) -> Option<Layout> {
    let b = value.as_bytes();

    if b.len() >= 20 && is_datetime_head(&b[..19], b'T') {
        let tail = &b[19..];
        if tail.ends_with(b"Z") || tail.ends_with(b"z") || tail.iter().any(|c| *c == b'+' || *c == b'-')
        {
            return Some(Layout::Rfc3339);
        }
    }
    if b.len() == 10 && b[4] == b'-' && b[7] == b'-' {
        return Some(Layout::DateOnly);
    }
    if b.len() >= 8 && b[2] == b':' && b[5] == b':' {
        return Some(Layout::TimeOnly("%H:%M:%S%.f"));
    }
    None
}

fn try_layout(layout: Layout, value: &str) -> Option<DateTime<FixedOffset>> {
    match layout {
        Layout::Rfc3339 => DateTime::parse_from_rfc3339(value).ok(),
        Layout::Naive(fmt) => NaiveDateTime::parse_from_str(value, fmt).ok().map(as_utc),
        Layout::DateOnly => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(as_utc),
        Layout::TimeOnly(fmt) => {
            let time = NaiveTime::parse_from_str(value, fmt).ok()?;
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
            Some(as_utc(epoch.and_time(time)))
        }
        Layout::Offset(fmt) => DateTime::parse_from_str(value, fmt).ok(),
    }
}

fn as_utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.fix().from_utc_datetime(&naive)
}

/// `YYYY-MM-DDTHH:MM:SS[.f] HH:MM` -> `YYYY-MM-DDTHH:MM:SS[.f]+HH:MM`
///
/// Offsets that already carry a sign are left alone.
fn repair_offset(value: &str) -> Cow<'_, str> {
    let b = value.as_bytes();
    if b.len() < 25 {
        return Cow::Borrowed(value);
    }

    let split = b.len() - 6;
    let (head, tail) = b.split_at(split);
    let offset_ok = tail[0] == b' '
        && tail[1..3].iter().all(u8::is_ascii_digit)
        && tail[3] == b':'
        && tail[4..6].iter().all(u8::is_ascii_digit);
    if !offset_ok || head.len() < 19 || !is_datetime_head(&head[..19], b'T') {
        return Cow::Borrowed(value);
    }

    let fraction = &head[19..];
    let fraction_ok = fraction.is_empty()
        || (fraction[0] == b'.'
            && (2..=10).contains(&fraction.len())
            && fraction[1..].iter().all(u8::is_ascii_digit));
    if !fraction_ok {
        return Cow::Borrowed(value);
    }

    Cow::Owned(format!("{}+{}", &value[..split], &value[split + 1..]))
}

/// Matches `dddd-dd-dd?dd:dd:dd` where `?` is `sep`
fn is_datetime_head(b: &[u8], sep: u8) -> bool {
    const TEMPLATE: &[u8; 19] = b"dddd-dd-dd dd:dd:dd";
    b.len() == 19
        && b.iter().zip(TEMPLATE.iter()).all(|(c, t)| match t {
            b'd' => c.is_ascii_digit(),
            b' ' => *c == sep,
            _ => c == t,
        })
}

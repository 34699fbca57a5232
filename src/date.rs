//! HTTP date parsing and formatting.
//!
//! [RFC 7231 §7.1.1.1] allows three formats for an `HTTP-date`:
//!
//! ```text
//! Sun, 06 Nov 1994 08:49:37 GMT    ; IMF-fixdate (preferred)
//! Sunday, 06-Nov-94 08:49:37 GMT   ; obsolete RFC 850 format
//! Sun Nov  6 08:49:37 1994         ; ANSI C's asctime() format
//! ```
//!
//! Servers send plenty of dates that match none of them, so when the strict
//! formats fail [`parse_http_date`] tries ISO 8601 ([RFC 3339]) and then
//! falls back to the token based `cookie-date` algorithm of
//! [RFC 6265 §5.1.1]. That algorithm is extended to honour numeric zone
//! offsets, `am`/`pm` markers and times without seconds, and to read a date
//! with no time of day as midnight.
//!
//! [RFC 7231 §7.1.1.1]: https://tools.ietf.org/html/rfc7231#section-7.1.1.1
//! [RFC 3339]: https://tools.ietf.org/html/rfc3339
//! [RFC 6265 §5.1.1]: https://tools.ietf.org/html/rfc6265#section-5.1.1

use std::convert::TryFrom;

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::parsing::Parsed;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

// The three formats allowed by RFC 7231, in order of preference.
pub(crate) const FMT1: &[BorrowedFormatItem<'_>] = format_description!("[weekday repr:short], [day] [month repr:short] [year padding:none] [hour]:[minute]:[second] GMT");
pub(crate) const FMT2: &[BorrowedFormatItem<'_>] = format_description!("[weekday], [day]-[month repr:short]-[year repr:last_two] [hour]:[minute]:[second] GMT");
pub(crate) const FMT3: &[BorrowedFormatItem<'_>] = format_description!("[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year padding:none]");

/// Parses an HTTP date into a UTC timestamp.
///
/// The strict RFC 7231 formats are tried first against the whole (trimmed)
/// input, then ISO 8601, then a lenient token based parse. Returns `None` when the input is
/// empty or no date can be made of it.
///
/// # Example
///
/// ```rust
/// use scrape_cookies::parse_http_date;
///
/// let preferred = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
/// let rfc850 = parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT").unwrap();
/// let asctime = parse_http_date("Sun Nov  6 08:49:37 1994").unwrap();
/// assert_eq!(preferred, rfc850);
/// assert_eq!(preferred, asctime);
/// assert_eq!(preferred.unix_timestamp(), 784111777);
///
/// // Not a standard format, but sensible enough.
/// let odd = parse_http_date("Sun, 02 Jul 2017 22:07:33 +0000").unwrap();
/// assert_eq!(odd.unix_timestamp(), 1499033253);
/// assert_eq!(parse_http_date("2017-07-02T22:07:33Z"), Some(odd));
///
/// assert!(parse_http_date("").is_none());
/// assert!(parse_http_date("Xxx, 00-Xxx-00 00:00:00 GMT").is_none());
/// ```
pub fn parse_http_date(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    [FMT1, FMT2, FMT3].iter()
        .find_map(|format| parse_strict(s, format))
        .or_else(|| parse_iso8601(s))
        .or_else(|| parse_lenient(s))
}

/// Formats `datetime` in the preferred HTTP date format, in UTC.
///
/// Returns `None` only for dates that cannot be represented, such as years
/// before the common era.
///
/// # Example
///
/// ```rust
/// use scrape_cookies::{format_http_date, parse_http_date};
///
/// let date = parse_http_date("Sun Nov  6 08:49:37 1994").unwrap();
/// assert_eq!(format_http_date(date).unwrap(), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn format_http_date(datetime: OffsetDateTime) -> Option<String> {
    let utc = to_utc(PrimitiveDateTime::new(datetime.date(), datetime.time()), datetime.offset())?;
    utc.format(FMT1).ok()
}

/// Converts a local date-time at `offset` to UTC, failing instead of
/// panicking when the result leaves the supported range.
fn to_utc(local: PrimitiveDateTime, offset: UtcOffset) -> Option<OffsetDateTime> {
    let seconds = i64::from(offset.whole_seconds());
    local.checked_sub(Duration::seconds(seconds)).map(PrimitiveDateTime::assume_utc)
}

/// Expands a two digit year the way RFC 6265 does: `70..=99` land in the
/// 1900s and `0..=69` in the 2000s. Longer years are returned unchanged.
fn expand_year(year: i32) -> i32 {
    match year {
        0..=69 => year + 2000,
        70..=99 => year + 1900,
        _ => year,
    }
}

fn parse_strict(s: &str, format: &[BorrowedFormatItem<'_>]) -> Option<OffsetDateTime> {
    let mut parsed = Parsed::new();
    let remaining = parsed.parse_items(s.as_bytes(), format).ok()?;
    if !remaining.is_empty() {
        return None;
    }

    let year = parsed.year().or_else(|| parsed.year_last_two().map(i32::from))?;
    parsed.set_year(expand_year(year))?;
    PrimitiveDateTime::try_from(parsed).ok().map(PrimitiveDateTime::assume_utc)
}

/// An ISO 8601 date-time such as `2017-07-02T23:07:33+01:00`. A missing
/// offset means UTC and a bare date means midnight. Fractional seconds are
/// dropped.
fn parse_iso8601(s: &str) -> Option<OffsetDateTime> {
    let with_offset = OffsetDateTime::parse(s, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(s, &Iso8601::DEFAULT));

    let (date, time, offset) = if let Ok(datetime) = with_offset {
        (datetime.date(), datetime.time(), datetime.offset())
    } else if let Ok(datetime) = PrimitiveDateTime::parse(s, &Iso8601::DEFAULT) {
        (datetime.date(), datetime.time(), UtcOffset::UTC)
    } else {
        (Date::parse(s, &Iso8601::DEFAULT).ok()?, Time::MIDNIGHT, UtcOffset::UTC)
    };

    let time = Time::from_hms(time.hour(), time.minute(), time.second()).ok()?;
    to_utc(PrimitiveDateTime::new(date, time), offset).filter(|utc| utc.year() >= 1601)
}

/// RFC 6265 `delimiter`:
///
/// ```text
/// delimiter = %x09 / %x20-2F / %x3B-40 / %x5B-60 / %x7B-7E
/// ```
fn is_delimiter(byte: u8) -> bool {
    byte == 0x09
        || (0x20..=0x2F).contains(&byte)
        || (0x3B..=0x40).contains(&byte)
        || (0x5B..=0x60).contains(&byte)
        || (0x7B..=0x7E).contains(&byte)
}

/// Splits `s` into date tokens, each paired with the delimiter byte directly
/// preceding it (if any). Delimiters are all ASCII, so slicing at them always
/// lands on a character boundary.
fn date_tokens(s: &str) -> Vec<(Option<u8>, &str)> {
    let bytes = s.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let mut preceding = None;
        while i < bytes.len() && is_delimiter(bytes[i]) {
            preceding = Some(bytes[i]);
            i += 1;
        }

        let start = i;
        while i < bytes.len() && !is_delimiter(bytes[i]) {
            i += 1;
        }

        if start < i {
            tokens.push((preceding, &s[start..i]));
        }
    }

    tokens
}

/// Reads between `min` and `max` leading ASCII digits. Fails if fewer than
/// `min` digits are present or if a digit follows the last one read.
fn leading_digits(token: &str, min: usize, max: usize) -> Option<(u32, &str)> {
    let len = token.bytes().take_while(u8::is_ascii_digit).count();
    if len < min || len > max {
        return None;
    }

    let value = token[..len].parse().ok()?;
    Some((value, &token[len..]))
}

/// `hms-time ( non-digit *OCTET )`, where the seconds may be left out and
/// the trailing octets may carry an `am`/`pm` marker as in `10:07:33pm`.
fn date_time(token: &str) -> Option<(u32, u32, u32, Option<Meridiem>)> {
    let (hour, rest) = leading_digits(token, 1, 2)?;
    let (minute, rest) = leading_digits(rest.strip_prefix(':')?, 1, 2)?;
    let (second, rest) = match rest.strip_prefix(':') {
        Some(seconds) => leading_digits(seconds, 1, 2)?,
        None => (0, rest),
    };

    Some((hour, minute, second, meridiem(rest)))
}

fn day_of_month(token: &str) -> Option<u32> {
    leading_digits(token, 1, 2).map(|(day, _)| day)
}

fn month(token: &str) -> Option<Month> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun",
        "jul", "aug", "sep", "oct", "nov", "dec",
    ];

    let prefix = token.get(..3)?;
    let index = MONTHS.iter().position(|m| m.eq_ignore_ascii_case(prefix))?;
    Month::try_from(index as u8 + 1).ok()
}

fn year(token: &str) -> Option<i32> {
    leading_digits(token, 2, 4).map(|(year, _)| expand_year(year as i32))
}

/// A numeric zone offset such as `+0100`, `-0000` or `+05:30`. The sign is
/// the delimiter that preceded the digits.
fn zone_offset(sign: Option<u8>, token: &str) -> Option<UtcOffset> {
    let negative = match sign {
        Some(b'+') => false,
        Some(b'-') => true,
        _ => return None,
    };

    let (h1, h2, m1, m2) = match *token.as_bytes() {
        [h1, h2, m1, m2] | [h1, h2, b':', m1, m2] => (h1, h2, m1, m2),
        _ => return None,
    };

    if ![h1, h2, m1, m2].iter().all(u8::is_ascii_digit) {
        return None;
    }

    let hours = ((h1 - b'0') * 10 + (h2 - b'0')) as i8;
    let minutes = ((m1 - b'0') * 10 + (m2 - b'0')) as i8;
    if negative {
        UtcOffset::from_hms(-hours, -minutes, 0).ok()
    } else {
        UtcOffset::from_hms(hours, minutes, 0).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

fn meridiem(s: &str) -> Option<Meridiem> {
    if s.eq_ignore_ascii_case("am") {
        Some(Meridiem::Am)
    } else if s.eq_ignore_ascii_case("pm") {
        Some(Meridiem::Pm)
    } else {
        None
    }
}

fn parse_lenient(s: &str) -> Option<OffsetDateTime> {
    let mut time = None;
    let mut day = None;
    let mut month_value = None;
    let mut year_value = None;
    let mut offset = None;
    let mut marker = None;

    for (preceding, token) in date_tokens(s) {
        if time.is_none() {
            if let Some((hour, minute, second, suffix)) = date_time(token) {
                time = Some((hour, minute, second));
                marker = marker.or(suffix);
                continue;
            }
        }

        // Offsets look like years, so they are only taken after the time.
        if time.is_some() && offset.is_none() {
            if let Some(zone) = zone_offset(preceding, token) {
                offset = Some(zone);
                continue;
            }
        }

        if day.is_none() {
            if let Some(value) = day_of_month(token) {
                day = Some(value);
                continue;
            }
        }

        if month_value.is_none() {
            if let Some(value) = month(token) {
                month_value = Some(value);
                continue;
            }
        }

        if year_value.is_none() {
            if let Some(value) = year(token) {
                year_value = Some(value);
                continue;
            }
        }

        if marker.is_none() {
            marker = meridiem(token);
        }
    }

    // A date without a time of day is taken as midnight.
    let (hour, minute, second) = match (time, marker) {
        (Some((hour, minute, second)), Some(Meridiem::Pm)) if hour < 12 => {
            (hour + 12, minute, second)
        }
        (Some((12, minute, second)), Some(Meridiem::Am)) => (0, minute, second),
        (Some(time), _) => time,
        (None, _) => (0, 0, 0),
    };

    let (day, year) = (day?, year_value?);
    if !(1..=31).contains(&day) || year < 1601 || hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let date = Date::from_calendar_date(year, month_value?, day as u8).ok()?;
    let time = Time::from_hms(hour as u8, minute as u8, second as u8).ok()?;
    to_utc(PrimitiveDateTime::new(date, time), offset.unwrap_or(UtcOffset::UTC))
}

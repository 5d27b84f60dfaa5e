//! Parsers for OFX datetime values (OFX 1.6 §3.2.8.2).
//!
//! `YYYYMMDDHHMMSS[.XXX][[gmt offset[:tz name]]]`, for example `19961005132200.124[-5:EST]`.

use std::str::FromStr;

use nom::{
    bytes::complete::{tag, take_till, take_while1, take_while_m_n},
    character::complete::{char, one_of},
    combinator::{all_consuming, map, opt, recognize},
    error::{Error as BriefError, ParseError},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

use crate::config::DEFAULT_DATETIME_CANDIDATES;
use crate::error::{Error, Result};
use crate::ofx::datetime::OfxDateTime;
use crate::ofx::document::Node;

/// Largest offset accepted in a timestamp, in minutes.
const MAX_OFFSET_MINUTES: i32 = 24 * 60;

/// The lexical parts of a timestamp, before calendar validation.
#[derive(Clone, Debug, PartialEq)]
struct RawDateTime<'a> {
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    millisecond: u32,
    offset: Option<&'a str>,
    tz_name: Option<&'a str>,
}

/// Parses exactly `n` ASCII digits as a number.
fn fixed_digits<'a, E>(n: usize) -> impl FnMut(&'a str) -> IResult<&'a str, u32, E>
where
    E: ParseError<&'a str>,
{
    map(take_while_m_n(n, n, |c: char| c.is_ascii_digit()), |s: &str| {
        s.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
    })
}

/// Parses a signed, possibly fractional, number of hours.
fn offset_hours<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    recognize(tuple((
        opt(one_of("+-")),
        take_while1(|c: char| c.is_ascii_digit()),
        opt(pair(char('.'), take_while1(|c: char| c.is_ascii_digit()))),
    )))(input)
}

/// Parses the `[offset:name]` suffix.
fn zone<'a, E>(input: &'a str) -> IResult<&'a str, (&'a str, Option<&'a str>), E>
where
    E: ParseError<&'a str>,
{
    delimited(
        char('['),
        pair(
            offset_hours,
            opt(preceded(char(':'), take_till(|c| c == ']'))),
        ),
        char(']'),
    )(input)
}

fn raw_datetime<'a, E>(input: &'a str) -> IResult<&'a str, RawDateTime<'a>, E>
where
    E: ParseError<&'a str>,
{
    let (input, (year, month, day, hour, minute, second)) = tuple((
        fixed_digits(4),
        fixed_digits(2),
        fixed_digits(2),
        fixed_digits(2),
        fixed_digits(2),
        fixed_digits(2),
    ))(input)?;
    let (input, millisecond) = opt(preceded(tag("."), fixed_digits(3)))(input)?;
    let (input, zone) = opt(zone)(input)?;

    Ok((
        input,
        RawDateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond: millisecond.unwrap_or(0),
            offset: zone.map(|(offset, _)| offset),
            tz_name: zone.and_then(|(_, name)| name).filter(|n| !n.is_empty()),
        },
    ))
}

/// Decodes an OFX timestamp literal into an instant normalized to UTC.
pub fn ofx_datetime(literal: &str) -> Result<OfxDateTime> {
    let raw = literal.trim();
    let malformed = || Error::MalformedTimestamp(String::from(raw));

    let (_, parts) = all_consuming(raw_datetime::<BriefError<&str>>)(raw).map_err(|_| malformed())?;

    let month = u8::try_from(parts.month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(malformed)?;
    let date = Date::from_calendar_date(parts.year as i32, month, parts.day as u8)
        .map_err(|_| malformed())?;
    let time = Time::from_hms_milli(
        parts.hour as u8,
        parts.minute as u8,
        parts.second as u8,
        parts.millisecond as u16,
    )
    .map_err(|_| malformed())?;

    let offset_minutes = match parts.offset {
        Some(hours) => {
            let hours: f64 = hours.parse().map_err(|_| malformed())?;
            let minutes = (hours * 60.0).round();
            if minutes.abs() > f64::from(MAX_OFFSET_MINUTES) {
                return Err(malformed());
            }
            Some(minutes as i32)
        }
        None => None,
    };
    // Shifting to UTC can carry the instant past year 9999.
    let instant = PrimitiveDateTime::new(date, time)
        .checked_sub(Duration::minutes(offset_minutes.unwrap_or(0).into()))
        .ok_or_else(malformed)?
        .assume_utc();

    Ok(OfxDateTime {
        raw: String::from(raw),
        instant,
        offset_minutes,
        tz_name: parts.tz_name.map(String::from),
    })
}

impl FromStr for OfxDateTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ofx_datetime(s)
    }
}

/// Decodes the first timestamp field found below `node`, trying `candidates` in order.
pub fn parse_datetime<S>(node: Node<'_>, candidates: &[S]) -> Result<OfxDateTime>
where
    S: AsRef<str>,
{
    let field = candidates
        .iter()
        .find_map(|name| node.first_descendant(name.as_ref()))
        .ok_or_else(|| {
            Error::MissingTimestampField(candidates.iter().map(|c| String::from(c.as_ref())).collect())
        })?;

    tracing::trace!(field = field.name(), "decoding timestamp");
    ofx_datetime(field.text().unwrap_or_default())
}

/// [`parse_datetime`] with the default candidates.
pub fn find_datetime(node: Node<'_>) -> Result<OfxDateTime> {
    parse_datetime(node, &DEFAULT_DATETIME_CANDIDATES)
}

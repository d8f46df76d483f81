//! Conversion between race clock codes, display strings and milliseconds.
//!
//! Three notations are in play:
//!
//! - the 6-digit race clock code `mmsscc` typed on the timing keypad,
//! - the display string `mm:ss.cc`,
//! - integer milliseconds, used for all arithmetic and comparison.
//!
//! Every function here is pure. Whether an empty input means "no time" is the
//! caller's decision: `parse_race_clock_code("")` is an error, never zero.

use nom::{
    bytes::complete::take_while_m_n,
    character::complete::char,
    combinator::{all_consuming, map_res},
    IResult, Parser,
};

use crate::error::TimingError;
use crate::models::Millis;

/// Number of digits in a race clock code.
pub const CLOCK_CODE_LEN: usize = 6;

/// Explicit zero time. Distinct from "nothing entered".
pub const ZERO_CLOCK_CODE: &str = "000000";

/// Shown in place of a lap that cannot be computed.
pub const BLANK_LAP: &str = "--:--.--";

const MS_PER_MINUTE: Millis = 60_000;
const MS_PER_SECOND: Millis = 1_000;
const MS_PER_CENTISECOND: Millis = 10;

/// Parse a race clock code (`mmsscc`) into milliseconds.
///
/// Non-digit characters are stripped first, so `01:23.45` and `012345` are
/// the same code. Seconds and centiseconds are not range checked: `017500`
/// is 1 minute plus 75 seconds.
pub fn parse_race_clock_code(code: &str) -> Result<Millis, TimingError> {
    let cleaned: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.len() != CLOCK_CODE_LEN {
        return Err(TimingError::invalid_code(code));
    }

    let (_, (minutes, seconds, centis)) = all_consuming((two_digits, two_digits, two_digits))
        .parse(cleaned.as_str())
        .map_err(|_| TimingError::invalid_code(code))?;

    Ok(millis_from_parts(minutes, seconds, centis))
}

/// Parse a display string (`m:ss.cc` or `mm:ss.cc`) into milliseconds.
///
/// Surrounding whitespace is ignored; anything else outside the pattern is
/// rejected.
pub fn parse_display_duration(input: &str) -> Result<Millis, TimingError> {
    let (_, (minutes, seconds, centis)) = all_consuming(display_time)
        .parse(input.trim())
        .map_err(|_| TimingError::invalid_display(input))?;

    Ok(millis_from_parts(minutes, seconds, centis))
}

/// Format milliseconds as `mm:ss.cc`.
///
/// Minutes are padded to two digits and grow past 99 when needed. Values
/// that are not whole centiseconds round to the nearest one.
pub fn format_duration(ms: Millis) -> String {
    let (minutes, seconds, centis) = components(ms);
    format!("{:02}:{:02}.{:02}", minutes, seconds, centis)
}

/// Entry time display: a zero (unset) time is blank.
pub fn format_entry_time(ms: Millis) -> String {
    if ms == 0 {
        String::new()
    } else {
        format_duration(ms)
    }
}

/// Format a lap, or [`BLANK_LAP`] when it is undefined.
pub fn format_lap(lap: Option<Millis>) -> String {
    match lap {
        Some(ms) => format_duration(ms),
        None => BLANK_LAP.to_string(),
    }
}

/// Write milliseconds back as a race clock code.
///
/// Fails when the time needs more than two minute digits.
pub fn race_clock_code(ms: Millis) -> Result<String, TimingError> {
    let (minutes, seconds, centis) = components(ms);
    if minutes > 99 {
        return Err(TimingError::OutOfRange { millis: ms });
    }
    Ok(format!("{:02}{:02}{:02}", minutes, seconds, centis))
}

/// Prefill for an edit field: blank when no time is recorded.
pub fn edit_code(ms: Millis) -> String {
    if ms == 0 {
        return String::new();
    }
    race_clock_code(ms).unwrap_or_default()
}

/// Masked inputs show `_` for digits not typed yet; treat them as zeros.
pub fn normalize_masked_input(input: &str) -> String {
    input.replace('_', "0")
}

/// Validate a typed time before it is saved.
///
/// [`ZERO_CLOCK_CODE`] is accepted as an explicit zero. Any other input that
/// comes out as zero milliseconds is a typing mistake and fails.
pub fn validate_time_input(code: &str) -> Result<Millis, TimingError> {
    let ms = parse_race_clock_code(code)?;
    if ms == 0 && code != ZERO_CLOCK_CODE {
        return Err(TimingError::invalid_code(code));
    }
    Ok(ms)
}

fn millis_from_parts(minutes: Millis, seconds: Millis, centis: Millis) -> Millis {
    minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + centis * MS_PER_CENTISECOND
}

/// Split into (minutes, seconds, centiseconds), rounding to the nearest
/// centisecond with carry.
fn components(ms: Millis) -> (Millis, Millis, Millis) {
    let total_centis =
        ms / MS_PER_CENTISECOND + Millis::from(ms % MS_PER_CENTISECOND >= MS_PER_CENTISECOND / 2);
    let minutes = total_centis / 6_000;
    let seconds = (total_centis / 100) % 60;
    let centis = total_centis % 100;
    (minutes, seconds, centis)
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn two_digits(input: &str) -> IResult<&str, Millis> {
    map_res(take_while_m_n(2, 2, is_digit), |s: &str| s.parse::<Millis>()).parse(input)
}

fn one_or_two_digits(input: &str) -> IResult<&str, Millis> {
    map_res(take_while_m_n(1, 2, is_digit), |s: &str| s.parse::<Millis>()).parse(input)
}

fn display_time(input: &str) -> IResult<&str, (Millis, Millis, Millis)> {
    (one_or_two_digits, char(':'), two_digits, char('.'), two_digits)
        .map(|(minutes, _, seconds, _, centis)| (minutes, seconds, centis))
        .parse(input)
}

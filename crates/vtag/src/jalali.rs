//! Jalali (Solar Hijri) date parsing.
//!
//! Accepts `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed by ` HH:MM` or
//! ` HH:MM:SS`, and converts the result to a Gregorian [`NaiveDateTime`].

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Years at which the 33-year leap cycle shifts.
const BREAKS: [i32; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

/// Errors returned by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JalaliError {
    #[error("malformed jalali date '{0}'")]
    Malformed(String),

    #[error("year {0} is outside the supported jalali range")]
    YearOutOfRange(i32),

    #[error("month {0} is out of range")]
    MonthOutOfRange(u32),

    #[error("day {day} is out of range for month {month}")]
    DayOutOfRange { month: u32, day: u32 },

    #[error("invalid time of day '{0}'")]
    InvalidTime(String),
}

struct YearInfo {
    /// 0 for leap years
    leap: i32,
    /// Gregorian year in which the jalali year starts
    gy: i32,
    /// Day of March on which Farvardin 1 falls
    march: u32,
}

fn year_info(jy: i32) -> Result<YearInfo, JalaliError> {
    if jy < BREAKS[0] || jy >= BREAKS[BREAKS.len() - 1] {
        return Err(JalaliError::YearOutOfRange(jy));
    }

    let gy = jy + 621;
    let mut leap_j = -14;
    let mut jp = BREAKS[0];
    let mut jump = 0;

    for &jm in &BREAKS[1..] {
        jump = jm - jp;
        if jy < jm {
            break;
        }
        leap_j += jump / 33 * 8 + jump % 33 / 4;
        jp = jm;
    }

    let mut n = jy - jp;
    leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }

    let leap_g = gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
    let march = (20 + leap_j - leap_g) as u32;

    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    Ok(YearInfo { leap, gy, march })
}

/// Whether `year` is a jalali leap year.
pub fn is_leap_year(year: i32) -> bool {
    year_info(year).map(|info| info.leap == 0).unwrap_or(false)
}

/// Number of days in a jalali month, `None` for months outside 1..=12.
pub fn month_length(year: i32, month: u32) -> Option<u32> {
    match month {
        1..=6 => Some(31),
        7..=11 => Some(30),
        12 if is_leap_year(year) => Some(30),
        12 => Some(29),
        _ => None,
    }
}

/// Convert a jalali calendar date to its Gregorian equivalent.
pub fn to_gregorian(year: i32, month: u32, day: u32) -> Result<NaiveDate, JalaliError> {
    let info = year_info(year)?;
    let length = month_length(year, month).ok_or(JalaliError::MonthOutOfRange(month))?;
    if day == 0 || day > length {
        return Err(JalaliError::DayOutOfRange { month, day });
    }

    let m = month as i64;
    let offset = (m - 1) * 31 - (m / 7) * (m - 7) + day as i64 - 1;
    let farvardin_first = NaiveDate::from_ymd_opt(info.gy, 3, info.march)
        .ok_or(JalaliError::YearOutOfRange(year))?;

    Ok(farvardin_first + Duration::days(offset))
}

/// Parse a jalali date string.
pub fn parse(input: &str) -> Result<NaiveDateTime, JalaliError> {
    let malformed = || JalaliError::Malformed(input.to_string());
    let input = input.trim();

    let (date, time) = match input.split_once(' ') {
        Some((date, time)) => (date, Some(time.trim())),
        None => (input, None),
    };

    let separator = if date.contains('/') { '/' } else { '-' };
    let mut parts = date.split(separator);
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    if y.len() != 4 || !(1..=2).contains(&m.len()) || !(1..=2).contains(&d.len()) {
        return Err(malformed());
    }
    if ![y, m, d].iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
        return Err(malformed());
    }

    let year: i32 = y.parse().map_err(|_| malformed())?;
    let month: u32 = m.parse().map_err(|_| malformed())?;
    let day: u32 = d.parse().map_err(|_| malformed())?;

    let date = to_gregorian(year, month, day)?;

    let time = match time {
        None => NaiveTime::MIN,
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
            .map_err(|_| JalaliError::InvalidTime(t.to_string()))?,
    };

    Ok(date.and_time(time))
}

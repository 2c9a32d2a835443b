use chrono::{Datelike, NaiveDate};

use crate::process::utils::clean_str;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Date → Arrow `Date32` value (days since the Unix epoch).
pub fn to_date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

/// Parse `"YYYY-MM-DD"`, `"YYYY/MM/DD"` or `"YYYYMMDD"`, optionally followed by
/// a time part (`" hh:mm:ss"` or `"Thh:mm:ss"`), which is ignored.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = clean_str(s);
    let day_part = s.split([' ', 'T']).next()?;
    match day_part.len() {
        10 => match day_part.as_bytes()[4] {
            b'-' => NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok(),
            b'/' => NaiveDate::parse_from_str(day_part, "%Y/%m/%d").ok(),
            _ => None,
        },
        8 if day_part.bytes().all(|b| b.is_ascii_digit()) => {
            NaiveDate::parse_from_str(day_part, "%Y%m%d").ok()
        }
        _ => None,
    }
}

/// Interpret an integer such as `20240131` as a date.
pub fn date_from_yyyymmdd(v: i64) -> Option<NaiveDate> {
    if !(1_000_01_01..=9999_12_31).contains(&v) {
        return None;
    }
    let year = (v / 10_000) as i32;
    let month = ((v / 100) % 100) as u32;
    let day = (v % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_the_usual_layouts() {
        assert_eq!(parse_date("2024-01-31"), Some(d(2024, 1, 31)));
        assert_eq!(parse_date("2024/01/31"), Some(d(2024, 1, 31)));
        assert_eq!(parse_date("20240131"), Some(d(2024, 1, 31)));
        assert_eq!(parse_date("2024-01-31 13:30:00"), Some(d(2024, 1, 31)));
        assert_eq!(parse_date("2024-01-31T13:30:00"), Some(d(2024, 1, 31)));
        assert_eq!(parse_date("\"2024/01/31\""), Some(d(2024, 1, 31)));
    }

    #[test]
    fn bad_values_are_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("2024.01.31"), None);
        assert_eq!(parse_date("中文中x"), None);
    }

    #[test]
    fn integer_dates() {
        assert_eq!(date_from_yyyymmdd(20240229), Some(d(2024, 2, 29)));
        assert_eq!(date_from_yyyymmdd(20230229), None);
        assert_eq!(date_from_yyyymmdd(42), None);
    }

    #[test]
    fn date32_conversion_matches_epoch() {
        assert_eq!(to_date32(d(1970, 1, 1)), 0);
        assert_eq!(to_date32(d(1970, 1, 2)), 1);
        assert_eq!(to_date32(d(1969, 12, 31)), -1);
        assert_eq!(to_date32(d(2024, 1, 1)), 19_723);
    }
}

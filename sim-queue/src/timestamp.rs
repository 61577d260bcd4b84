//! Finish-time encoding used by the `complete` table.

use chrono::{NaiveDateTime, ParseResult};

/// `YYYY-MM-DD_HH:MM:SS`, no timezone, whole seconds.
pub const FINISH_TIME_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Sub-second precision is dropped.
pub fn format_finish_time(time: &NaiveDateTime) -> String {
    time.format(FINISH_TIME_FORMAT).to_string()
}

pub fn parse_finish_time(value: &str) -> ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, FINISH_TIME_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn formats_with_underscore_separator() {
        let time = NaiveDate::from_ymd_opt(2017, 3, 9)
            .unwrap()
            .and_hms_opt(4, 5, 6)
            .unwrap();
        assert_eq!(format_finish_time(&time), "2017-03-09_04:05:06");
    }

    #[test]
    fn parse_truncates_to_the_second() {
        let time = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 58, 750)
            .unwrap();
        let parsed = parse_finish_time(&format_finish_time(&time)).unwrap();
        assert_eq!(parsed, time.with_nanosecond(0).unwrap());
    }

    #[test]
    fn rejects_other_layouts() {
        assert!(parse_finish_time("2024-12-31 23:59:58").is_err());
        assert!(parse_finish_time("2024-12-31T23:59:58").is_err());
    }
}

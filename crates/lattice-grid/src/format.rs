//! Date formatting for date columns.
//!
//! Date columns pass their resolved value through a [`DateFormatter`]
//! together with the grid's configured pattern. The default implementation,
//! [`ChronoDateFormatter`], understands Unicode-style field patterns:
//!
//! | Token  | Meaning                    | Example   |
//! |--------|----------------------------|-----------|
//! | `yyyy` | four-digit year            | `2024`    |
//! | `yy`   | two-digit year             | `24`      |
//! | `y`    | year, unpadded             | `2024`    |
//! | `MMMM` | month name                 | `March`   |
//! | `MMM`  | abbreviated month name     | `Mar`     |
//! | `MM`   | month, padded              | `03`      |
//! | `M`    | month                      | `3`       |
//! | `dd`   | day of month, padded       | `09`      |
//! | `d`    | day of month               | `9`       |
//! | `EEEE` | weekday name               | `Saturday`|
//! | `EEE`  | abbreviated weekday        | `Sat`     |
//! | `HH`   | hour 0-23, padded          | `14`      |
//! | `H`    | hour 0-23                  | `14`      |
//! | `hh`   | hour 1-12, padded          | `02`      |
//! | `h`    | hour 1-12                  | `2`       |
//! | `mm`   | minute, padded             | `05`      |
//! | `m`    | minute                     | `5`       |
//! | `ss`   | second, padded             | `07`      |
//! | `s`    | second                     | `7`       |
//! | `sss`  | milliseconds               | `042`     |
//! | `a`    | AM/PM marker               | `PM`      |
//!
//! Text in single quotes is copied literally (`''` is a quote). The named
//! patterns `short`, `medium`, `shortDate`, `mediumDate`, `longDate`,
//! `fullDate`, `shortTime` and `mediumTime` expand to common layouts.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::model::FieldValue;

/// Default pattern for date columns.
pub const DEFAULT_DATE_FORMAT: &str = "M/d/yyyy, h:mm:ss a";

/// Formats values of date columns.
pub trait DateFormatter: Send + Sync {
    /// Formats `value` according to `pattern`.
    fn format(&self, value: &FieldValue, pattern: &str) -> String;
}

/// [`DateFormatter`] built on `chrono`.
///
/// Accepts `Date` values, integers and floats as milliseconds since the Unix
/// epoch (UTC), and strings in RFC 3339 or ISO 8601 date / date-time form.
/// Values it cannot read as a date are rendered as their display string.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use lattice_grid::{ChronoDateFormatter, DateFormatter};
/// use lattice_grid::model::FieldValue;
///
/// let when = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(14, 5, 7).unwrap();
/// let text = ChronoDateFormatter.format(&FieldValue::from(when), "M/d/yyyy, h:mm:ss a");
/// assert_eq!(text, "3/9/2024, 2:05:07 PM");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoDateFormatter;

impl ChronoDateFormatter {
    /// Reads a field value as a date.
    pub fn to_datetime(value: &FieldValue) -> Option<NaiveDateTime> {
        match value.resolve() {
            FieldValue::Date(d) => Some(d),
            FieldValue::Int(millis) => DateTime::from_timestamp_millis(millis).map(|d| d.naive_utc()),
            FieldValue::Float(millis) if millis.is_finite() => {
                DateTime::from_timestamp_millis(millis as i64).map(|d| d.naive_utc())
            }
            FieldValue::String(s) => parse_date_string(s.trim()),
            _ => None,
        }
    }

    /// Formats a date with a pattern.
    pub fn format_datetime(datetime: &NaiveDateTime, pattern: &str) -> String {
        let pattern = expand_named(pattern);
        let mut out = String::with_capacity(pattern.len() + 8);
        let chars: Vec<char> = pattern.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '\'' {
                i += 1;
                if chars.get(i) == Some(&'\'') {
                    out.push('\'');
                    i += 1;
                    continue;
                }
                while i < chars.len() {
                    if chars[i] == '\'' {
                        if chars.get(i + 1) == Some(&'\'') {
                            out.push('\'');
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    out.push(chars[i]);
                    i += 1;
                }
                i += 1;
                continue;
            }

            let mut run = 1;
            while chars.get(i + run) == Some(&c) {
                run += 1;
            }
            write_field(&mut out, datetime, c, run);
            i += run;
        }
        out
    }
}

impl DateFormatter for ChronoDateFormatter {
    fn format(&self, value: &FieldValue, pattern: &str) -> String {
        match Self::to_datetime(value) {
            Some(datetime) => Self::format_datetime(&datetime, pattern),
            None => value.to_display_string(),
        }
    }
}

fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.naive_local());
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(d);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn expand_named(pattern: &str) -> &str {
    match pattern {
        "short" => "M/d/yy h:mm a",
        "medium" => "MMM d, y h:mm:ss a",
        "shortDate" => "M/d/yy",
        "mediumDate" => "MMM d, y",
        "longDate" => "MMMM d, y",
        "fullDate" => "EEEE, MMMM d, y",
        "shortTime" => "h:mm a",
        "mediumTime" => "h:mm:ss a",
        other => other,
    }
}

fn write_field(out: &mut String, dt: &NaiveDateTime, c: char, run: usize) {
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    let text = match (c, run) {
        ('y', 2) => format!("{:02}", dt.year().rem_euclid(100)),
        ('y', 1) => dt.year().to_string(),
        ('y', n) => format!("{:0width$}", dt.year(), width = n),
        ('M', 1) => dt.month().to_string(),
        ('M', 2) => format!("{:02}", dt.month()),
        ('M', 3) => dt.format("%b").to_string(),
        ('M', _) => dt.format("%B").to_string(),
        ('d', 1) => dt.day().to_string(),
        ('d', _) => format!("{:02}", dt.day()),
        ('E', 1..=3) => dt.format("%a").to_string(),
        ('E', _) => dt.format("%A").to_string(),
        ('H', 1) => dt.hour().to_string(),
        ('H', _) => format!("{:02}", dt.hour()),
        ('h', 1) => hour12.to_string(),
        ('h', _) => format!("{:02}", hour12),
        ('m', 1) => dt.minute().to_string(),
        ('m', _) => format!("{:02}", dt.minute()),
        ('s', 1) => dt.second().to_string(),
        ('s', 2) => format!("{:02}", dt.second()),
        ('s', _) => format!("{:03}", dt.nanosecond() / 1_000_000 % 1000),
        ('a', _) => (if dt.hour() < 12 { "AM" } else { "PM" }).to_string(),
        (other, n) => std::iter::repeat_n(other, n).collect(),
    };
    out.push_str(&text);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_milli_opt(0, 5, 7, 42)
            .unwrap()
    }

    #[test]
    fn test_default_pattern() {
        let text = ChronoDateFormatter::format_datetime(&sample(), DEFAULT_DATE_FORMAT);
        assert_eq!(text, "3/9/2024, 12:05:07 AM");
    }

    #[test]
    fn test_padded_tokens() {
        let text = ChronoDateFormatter::format_datetime(&sample(), "yyyy-MM-dd HH:mm:ss.sss");
        assert_eq!(text, "2024-03-09 00:05:07.042");
    }

    #[test]
    fn test_names_and_literals() {
        let text = ChronoDateFormatter::format_datetime(&sample(), "EEEE, MMMM d 'at' h a");
        assert_eq!(text, "Saturday, March 9 at 12 AM");

        let text = ChronoDateFormatter::format_datetime(&sample(), "EEE MMM yy ''x''");
        assert_eq!(text, "Sat Mar 24 'x'");
    }

    #[test]
    fn test_named_patterns() {
        assert_eq!(
            ChronoDateFormatter::format_datetime(&sample(), "mediumDate"),
            "Mar 9, 2024"
        );
        assert_eq!(
            ChronoDateFormatter::format_datetime(&sample(), "shortTime"),
            "12:05 AM"
        );
    }

    #[test]
    fn test_value_conversions() {
        let formatter = ChronoDateFormatter;
        assert_eq!(
            formatter.format(&FieldValue::Int(0), "yyyy-MM-dd HH:mm"),
            "1970-01-01 00:00"
        );
        assert_eq!(
            formatter.format(&FieldValue::from("2024-03-09"), "M/d/yy"),
            "3/9/24"
        );
        assert_eq!(
            formatter.format(&FieldValue::from("2024-03-09T15:30:00+02:00"), "H:mm"),
            "15:30"
        );
        assert_eq!(formatter.format(&FieldValue::from("soon"), "yyyy"), "soon");
        assert_eq!(formatter.format(&FieldValue::None, "yyyy"), "");
    }
}

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

use super::frame::Cells;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Map a remote-flag cell to 0/1
///
/// `true`/`1` map to 1; everything else, including missing, maps to 0.
pub fn parse_remote(raw: Option<&str>) -> u8 {
    match raw.map(|v| v.trim().to_lowercase()).as_deref() {
        Some("true") | Some("1") => 1,
        _ => 0,
    }
}

/// Build the remote column, defaulting to all zeros when absent
pub fn remote_flags(cells: Option<Cells>, rows: usize) -> Vec<u8> {
    match cells {
        Some(Cells::Text(values)) => values.iter().map(|v| parse_remote(v.as_deref())).collect(),
        Some(Cells::Flag(values)) => values,
        Some(Cells::Decimal(values)) => values
            .iter()
            .map(|v| match v {
                Some(n) if *n == 1.0 => 1,
                _ => 0,
            })
            .collect(),
        Some(Cells::DateTime(_)) | None => vec![0; rows],
    }
}

/// Tolerant date/time parsing; returns `None` rather than failing
///
/// Values with a UTC offset are converted to UTC before the offset is dropped.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn to_datetimes(cells: Cells) -> Vec<Option<NaiveDateTime>> {
    match cells {
        Cells::DateTime(values) => values,
        Cells::Text(values) => values
            .iter()
            .map(|v| v.as_deref().and_then(parse_datetime))
            .collect(),
        Cells::Decimal(values) => vec![None; values.len()],
        Cells::Flag(values) => vec![None; values.len()],
    }
}

/// Output layout for a date column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    DateOnly,
    Seconds,
    Micros,
}

impl DateLayout {
    /// Choose the narrowest layout that loses nothing for any value in the column
    pub fn for_column(values: &[Option<NaiveDateTime>]) -> Self {
        let present = values.iter().flatten();
        let mut layout = DateLayout::DateOnly;
        for v in present {
            if v.nanosecond() != 0 {
                return DateLayout::Micros;
            }
            if v.hour() != 0 || v.minute() != 0 || v.second() != 0 {
                layout = DateLayout::Seconds;
            }
        }
        layout
    }

    pub fn format(self, value: &NaiveDateTime) -> String {
        match self {
            DateLayout::DateOnly => value.format("%Y-%m-%d").to_string(),
            DateLayout::Seconds => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            DateLayout::Micros => value.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn remote_map_is_case_insensitive() {
        assert_eq!(parse_remote(Some("TRUE")), 1);
        assert_eq!(parse_remote(Some("1")), 1);
        assert_eq!(parse_remote(Some("False")), 0);
        assert_eq!(parse_remote(Some("0")), 0);
        assert_eq!(parse_remote(Some("yes")), 0);
        assert_eq!(parse_remote(None), 0);
    }

    #[test]
    fn missing_remote_column_is_all_zero() {
        assert_eq!(remote_flags(None, 3), vec![0, 0, 0]);
    }

    #[test]
    fn common_date_shapes_parse() {
        assert_eq!(parse_datetime("2025-12-20"), Some(at(2025, 12, 20, 0, 0, 0)));
        assert_eq!(parse_datetime("12/20/2025"), Some(at(2025, 12, 20, 0, 0, 0)));
        assert_eq!(parse_datetime("20 Dec 2025"), Some(at(2025, 12, 20, 0, 0, 0)));
        assert_eq!(parse_datetime("December 20, 2025"), Some(at(2025, 12, 20, 0, 0, 0)));
        assert_eq!(
            parse_datetime("2025-12-22 00:09:14"),
            Some(at(2025, 12, 22, 0, 9, 14))
        );
        assert_eq!(
            parse_datetime("2025-12-22T08:09:14+02:00"),
            Some(at(2025, 12, 22, 6, 9, 14))
        );
    }

    #[test]
    fn garbage_dates_are_null() {
        assert_eq!(parse_datetime("yesterday"), None);
        assert_eq!(parse_datetime("2025-13-45"), None);
        assert_eq!(parse_datetime("   "), None);
    }

    #[test]
    fn layout_follows_the_finest_value() {
        let midnight = vec![Some(at(2025, 1, 1, 0, 0, 0)), None];
        assert_eq!(DateLayout::for_column(&midnight), DateLayout::DateOnly);

        let timed = vec![Some(at(2025, 1, 1, 0, 0, 0)), Some(at(2025, 1, 1, 9, 30, 0))];
        assert_eq!(DateLayout::for_column(&timed), DateLayout::Seconds);
        assert_eq!(DateLayout::Seconds.format(&at(2025, 1, 1, 9, 30, 0)), "2025-01-01 09:30:00");
    }
}

//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a front-matter date string in various formats
///
/// The result is zone-free so rendering never depends on the local clock.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    // RFC 3339 / ISO 8601 with offset, kept in its own offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let day = parse_date("2024-01-15").unwrap();
        assert_eq!(day.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 00:00");

        let slash = parse_date("2024/01/15 10:30").unwrap();
        assert_eq!(slash.format("%H:%M").to_string(), "10:30");

        let rfc = parse_date("2024-01-15T10:30:00+08:00").unwrap();
        assert_eq!(rfc.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("last tuesday").is_none());
        assert!(parse_date("").is_none());
    }
}

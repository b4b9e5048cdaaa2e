//! Localized date and time rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::Locale;

/// The three display projections of a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedDateTime {
    /// Date and time, e.g. `15 janv. 2024, 14:30`.
    pub date_time: String,
    /// Weekday and date, e.g. `lun. 15 janv. 2024`.
    pub date_only: String,
    /// 24-hour time, e.g. `14:30`.
    pub time_only: String,
}

/// strftime patterns per locale: (date-time, date-only, time-only).
const fn patterns(locale: Locale) -> (&'static str, &'static str, &'static str) {
    match locale {
        Locale::FrFr => ("%-d %b %Y, %H:%M", "%a %-d %b %Y", "%H:%M"),
        Locale::EnUs => ("%b %-d, %Y, %H:%M", "%a, %b %-d, %Y", "%H:%M"),
    }
}

/// Project a timestamp into date-time, date-only and time-only strings
/// using the locale's calendar names and a 24-hour clock.
#[must_use]
pub fn format_date_time(timestamp: &DateTime<Utc>, locale: Locale) -> FormattedDateTime {
    let (date_time, date_only, time_only) = patterns(locale);
    let calendar = locale.calendar();

    FormattedDateTime {
        date_time: timestamp.format_localized(date_time, calendar).to_string(),
        date_only: timestamp.format_localized(date_only, calendar).to_string(),
        time_only: timestamp.format_localized(time_only, calendar).to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_format_en_us() {
        let formatted = format_date_time(&sample(), Locale::EnUs);
        assert_eq!(formatted.date_time, "Jan 15, 2024, 14:30");
        assert_eq!(formatted.date_only, "Mon, Jan 15, 2024");
        assert_eq!(formatted.time_only, "14:30");
    }

    #[test]
    fn test_format_fr_fr_uses_french_calendar() {
        let formatted = format_date_time(&sample(), Locale::FrFr);
        assert!(formatted.date_time.starts_with("15 janv"));
        assert!(formatted.date_time.ends_with("2024, 14:30"));
        assert!(formatted.date_only.starts_with("lun"));
        assert_eq!(formatted.time_only, "14:30");
    }

    #[test]
    fn test_time_only_is_24_hour() {
        let evening = Utc.with_ymd_and_hms(2024, 6, 1, 21, 5, 0).unwrap();
        assert_eq!(format_date_time(&evening, Locale::EnUs).time_only, "21:05");
    }
}

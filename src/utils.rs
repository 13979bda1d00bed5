use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::store::ShiftError;

pub const CHECK_EMOJI: char = '✅';
pub const CROSS_EMOJI: char = '❌';
pub const WARNING_EMOJI: char = '⚠';
pub const DIZZY_EMOJI: char = '😵';
pub const GREEN_CIRCLE_EMOJI: char = '🟢';
pub const RED_CIRCLE_EMOJI: char = '🔴';
pub const MEMO_EMOJI: char = '📌';
pub const CLOCK_EMOJI: char = '🕒';
pub const CLIPBOARD_EMOJI: char = '📋';
pub const BROOM_EMOJI: char = '🧹';
pub const STOP_EMOJI: char = '🛑';
pub const BUST_EMOJI: char = '👤';

const DATE_TIME_FMT: &str = "%Y-%m-%d %H:%M";
const DATE_FMT_ISO: &str = "%Y-%m-%d";
const DATE_FMT_EU: &str = "%d-%m-%Y";
const TIME_FMT: &str = "%H:%M";

/// Parses the schedule of a shift into unix seconds.
///
/// Accepted forms:
/// - time field holding a full `YYYY-MM-DD HH:MM`
/// - separate date field (`YYYY-MM-DD` or `DD-MM-YYYY`) plus `HH:MM`
/// - bare `HH:MM`, rolled to the next day if already past
///
/// All naive inputs are interpreted in the configured timezone
pub fn parse_shift_time(
    date: Option<&str>,
    time: &str,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<i64, ShiftError> {
    let date = date.map(str::trim);
    let time = time.trim();

    let invalid = || {
        ShiftError::InvalidTime(match date {
            Some(d) => format!("{} {}", d, time),
            None => time.to_owned(),
        })
    };

    if let Some(date) = date {
        let date = NaiveDate::parse_from_str(date, DATE_FMT_ISO)
            .or_else(|_| NaiveDate::parse_from_str(date, DATE_FMT_EU))
            .map_err(|_| invalid())?;
        let time = NaiveTime::parse_from_str(time, TIME_FMT).map_err(|_| invalid())?;
        return local_to_unix(date.and_time(time), tz).ok_or_else(invalid);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(time, DATE_TIME_FMT) {
        return local_to_unix(naive, tz).ok_or_else(invalid);
    }

    // Bare time. Take the next occurrence in the local day cycle
    let time = NaiveTime::parse_from_str(time, TIME_FMT).map_err(|_| invalid())?;
    let local_now = now.with_timezone(&tz);
    let mut naive = local_now.date_naive().and_time(time);
    if naive <= local_now.naive_local() {
        naive += Duration::days(1);
    }
    local_to_unix(naive, tz).ok_or_else(invalid)
}

// None for times that do not exist in the timezone (DST gap)
fn local_to_unix(naive: NaiveDateTime, tz: Tz) -> Option<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::UTC;

    fn utc_now(s: &str) -> DateTime<Utc> {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
        Utc.from_utc_datetime(&naive)
    }

    #[test]
    fn parses_full_date_time_in_time_field() {
        let now = utc_now("2025-01-01 00:00");
        let ts = parse_shift_time(None, "2025-01-10 22:00", now, UTC).unwrap();
        assert_eq!(ts, utc_now("2025-01-10 22:00").timestamp());
    }

    #[test]
    fn parses_iso_date_field_plus_time() {
        let now = utc_now("2025-01-01 00:00");
        let ts = parse_shift_time(Some("2025-01-10"), "22:00", now, UTC).unwrap();
        assert_eq!(ts, utc_now("2025-01-10 22:00").timestamp());
    }

    #[test]
    fn parses_european_date_field() {
        let now = utc_now("2025-01-01 00:00");
        let ts = parse_shift_time(Some("10-01-2025"), "22:00", now, UTC).unwrap();
        assert_eq!(ts, utc_now("2025-01-10 22:00").timestamp());
    }

    #[test]
    fn bare_time_later_today_stays_today() {
        let now = utc_now("2025-01-10 08:00");
        let ts = parse_shift_time(None, "22:00", now, UTC).unwrap();
        assert_eq!(ts, utc_now("2025-01-10 22:00").timestamp());
    }

    #[test]
    fn bare_time_already_past_rolls_to_tomorrow() {
        let now = utc_now("2025-01-10 23:30");
        let ts = parse_shift_time(None, "22:00", now, UTC).unwrap();
        assert_eq!(ts, utc_now("2025-01-11 22:00").timestamp());
    }

    #[test]
    fn timezone_offset_is_applied() {
        let now = utc_now("2025-01-01 00:00");
        let ts = parse_shift_time(
            Some("2025-01-10"),
            "22:00",
            now,
            chrono_tz::Europe::Berlin,
        )
        .unwrap();
        // Berlin is UTC+1 in January
        assert_eq!(ts, utc_now("2025-01-10 21:00").timestamp());
    }

    #[test]
    fn garbage_is_rejected() {
        let now = utc_now("2025-01-01 00:00");
        for (date, time) in vec![
            (None, "soon"),
            (None, "25:61"),
            (Some("2025-13-40"), "10:00"),
            (Some("2025-01-10"), "evening"),
            (None, "2025/01/10 22:00"),
        ] {
            let err = parse_shift_time(date, time, now, UTC)
                .expect_err("Should reject unparsable input");
            assert!(matches!(err, ShiftError::InvalidTime(_)));
        }
    }
}

// time_utils.rs
use chrono::{Datelike, TimeZone, Timelike, Utc};

/// One local wall-clock reading, already offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// Calculates whether a given UTC time falls in the EU daylight saving
/// period: last Sunday of March 2:00 UTC to last Sunday of October 3:00 UTC.
pub fn is_eu_dst(year: i32, month: u32, day: u32, hour: u32) -> bool {
    // Last Sunday in March (start of summer time)
    let march_last_sunday_day = 31 - ((5 * year / 4 + 4) % 7);

    // Last Sunday in October (end of summer time)
    let october_last_sunday_day = 31 - ((5 * year / 4 + 1) % 7);

    match month {
        1 | 2 => false, // January, February: always standard time
        3 => {
            // March: summer time from the last Sunday
            if day < march_last_sunday_day as u32 {
                false
            } else if day > march_last_sunday_day as u32 {
                true
            } else {
                // On the changeover day: from 2:00 UTC
                hour >= 2
            }
        }
        4..=9 => true, // April to September: always summer time
        10 => {
            // October: summer time until the last Sunday
            if day < october_last_sunday_day as u32 {
                true
            } else if day > october_last_sunday_day as u32 {
                false
            } else {
                // On the changeover day: until 3:00 UTC
                hour < 3
            }
        }
        11 | 12 => false, // November, December: always standard time
        _ => false,
    }
}

/// Converts a UTC timestamp to local time using the configured base offset,
/// optionally adding one hour while the EU daylight saving rule is active.
pub fn utc_to_local(utc_timestamp: i64, base_offset_hours: i32, eu_dst: bool) -> LocalTime {
    let utc_time = Utc.timestamp_opt(utc_timestamp, 0).unwrap();

    let year = utc_time.year();
    let month = utc_time.month();
    let day = utc_time.day();
    let hour = utc_time.hour();

    let mut offset_hours = base_offset_hours;
    if eu_dst && is_eu_dst(year, month, day, hour) {
        offset_hours += 1;
    }

    // Add offset
    let local_timestamp = utc_timestamp + (offset_hours as i64 * 3600);
    let local_time = Utc.timestamp_opt(local_timestamp, 0).unwrap();

    LocalTime {
        year: local_time.year(),
        month: local_time.month(),
        day: local_time.day(),
        hour: local_time.hour(),
        minute: local_time.minute(),
        second: local_time.second(),
    }
}

/// Formats the time for the panel: "HH:MM", or "H:MMA"/"H:MMP" in 12-hour mode.
pub fn format_clock(hour: u32, minute: u32, am_pm: bool) -> String {
    if !am_pm {
        return format!("{:02}:{:02}", hour, minute);
    }
    let hour12 = if hour % 12 == 0 { 12 } else { hour % 12 };
    let suffix = if hour >= 12 { 'P' } else { 'A' };
    format!("{}:{:02}{}", hour12, minute, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dst_calculation() {
        // March 15, 2024, 10:00 UTC -> standard time (before changeover)
        assert_eq!(is_eu_dst(2024, 3, 15, 10), false);

        // March 31, 2024, 03:00 UTC -> summer time (after changeover)
        assert_eq!(is_eu_dst(2024, 3, 31, 3), true);

        // July 15, 2024, 12:00 UTC -> summer time
        assert_eq!(is_eu_dst(2024, 7, 15, 12), true);

        // October 27, 2024, 04:00 UTC -> standard time (after changeover)
        assert_eq!(is_eu_dst(2024, 10, 27, 4), false);

        // December 15, 2024, 18:00 UTC -> standard time
        assert_eq!(is_eu_dst(2024, 12, 15, 18), false);
    }

    #[test]
    fn test_utc_to_local_offsets() {
        // 2024-01-10 12:00:00 UTC, UTC+1, winter -> 13:00
        let winter = utc_to_local(1704888000, 1, true);
        assert_eq!((winter.hour, winter.minute), (13, 0));

        // 2024-07-10 12:00:00 UTC, UTC+1 with EU DST -> 14:00
        let summer = utc_to_local(1720612800, 1, true);
        assert_eq!((summer.hour, summer.minute), (14, 0));

        // Same instant with the DST rule disabled stays at UTC+1.
        let no_dst = utc_to_local(1720612800, 1, false);
        assert_eq!(no_dst.hour, 13);

        // Negative offsets cross the date boundary.
        let west = utc_to_local(1704888000, -13, false);
        assert_eq!((west.day, west.hour), (9, 23));
    }

    #[test]
    fn test_clock_formatting() {
        assert_eq!(format_clock(7, 5, false), "07:05");
        assert_eq!(format_clock(13, 5, true), "1:05P");
        assert_eq!(format_clock(0, 30, true), "12:30A");
        assert_eq!(format_clock(12, 0, true), "12:00P");
        assert_eq!(format_clock(23, 59, false), "23:59");
    }
}

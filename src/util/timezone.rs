use chrono::{DateTime, Datelike, NaiveDate, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use time::{Date, Month, OffsetDateTime, UtcOffset};

pub fn localized_datetime(time: OffsetDateTime, tz: Tz) -> DateTime<Tz> {
    let utc = time.to_offset(UtcOffset::UTC);
    let seconds = utc.unix_timestamp();
    let nanos: u32 = utc.nanosecond();
    let datetime_utc = DateTime::<Utc>::from_timestamp(seconds, nanos)
        .or_else(|| DateTime::<Utc>::from_timestamp(seconds, 0))
        .unwrap_or_default();
    tz.from_utc_datetime(&datetime_utc.naive_utc())
}

/// Calendar date of `time` as observed in `tz`.
pub fn localized_date(time: OffsetDateTime, tz: Tz) -> Date {
    let localized = localized_datetime(time, tz);
    u8::try_from(localized.month())
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .zip(u8::try_from(localized.day()).ok())
        .and_then(|(month, day)| Date::from_calendar_date(localized.year(), month, day).ok())
        .unwrap_or_else(|| utc_date(time))
}

/// The instant local midnight begins on `date` in `tz`.
///
/// When midnight falls into a DST gap the first valid local hour is used.
pub fn start_of_local_day(date: Date, tz: Tz) -> OffsetDateTime {
    let midnight = NaiveDate::from_ymd_opt(
        date.year(),
        u32::from(u8::from(date.month())),
        u32::from(date.day()),
    )
    .and_then(|day| day.and_hms_opt(0, 0, 0));

    midnight
        .and_then(|naive| {
            tz.from_local_datetime(&naive)
                .earliest()
                .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
        })
        .and_then(|local| OffsetDateTime::from_unix_timestamp(local.timestamp()).ok())
        .unwrap_or_else(|| date.midnight().assume_utc())
}

/// `(year, month)` of `time` as observed in `tz`.
pub fn local_year_month(time: OffsetDateTime, tz: Tz) -> (i32, Month) {
    let date = localized_date(time, tz);
    (date.year(), date.month())
}

/// UTC offset `tz` observes at `time`.
pub fn local_offset(time: OffsetDateTime, tz: Tz) -> UtcOffset {
    let seconds = localized_datetime(time, tz).offset().fix().local_minus_utc();
    UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC)
}

fn utc_date(time: OffsetDateTime) -> Date {
    time.to_offset(UtcOffset::UTC).date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn localized_date_crosses_midnight() {
        let instant = datetime!(2024-06-10 02:30:00 UTC);
        assert_eq!(localized_date(instant, Tz::UTC), date!(2024 - 06 - 10));
        assert_eq!(
            localized_date(instant, Tz::America__New_York),
            date!(2024 - 06 - 09)
        );
    }

    #[test]
    fn start_of_local_day_honours_offset() {
        let start = start_of_local_day(date!(2024 - 06 - 10), Tz::Asia__Tokyo);
        assert_eq!(start, datetime!(2024-06-09 15:00:00 UTC));
    }

    #[test]
    fn start_of_local_day_in_utc_is_midnight() {
        let start = start_of_local_day(date!(2024 - 01 - 01), Tz::UTC);
        assert_eq!(start, datetime!(2024-01-01 00:00:00 UTC));
    }

    #[test]
    fn local_offset_follows_daylight_saving() {
        let winter = local_offset(datetime!(2024-01-15 12:00:00 UTC), Tz::Europe__Berlin);
        let summer = local_offset(datetime!(2024-07-15 12:00:00 UTC), Tz::Europe__Berlin);
        assert_eq!(winter.whole_hours(), 1);
        assert_eq!(summer.whole_hours(), 2);
    }
}

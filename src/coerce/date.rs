//! Serial date conversion.
//!
//! Excel stores dates as floating-point numbers representing the number of
//! days since a base date:
//! - **1900 system**: days since December 31, 1899 (default). Excel treats
//!   1900 as a leap year, so serials from 61 on are shifted back by one day.
//! - **1904 system**: days since January 1, 1904.
//!
//! The fractional part represents the time of day (0.0 = midnight, 0.5 = noon).
//! Wall-clock values are placed in a reference time zone and reported as
//! UTC instants.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ConvertError, Result};

/// Milliseconds per day
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// First serial after Excel's phantom February 29, 1900
const FIRST_SERIAL_AFTER_LEAP_BUG: i64 = 61;

/// Date system declared by the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSystem {
    /// Serial 1 is January 1, 1900
    #[default]
    Excel1900,
    /// Serial 0 is January 1, 1904
    Excel1904,
}

impl DateSystem {
    /// Calendar date of a whole-day serial number.
    fn date_of(self, whole_days: i64) -> Option<NaiveDate> {
        let (base, offset) = match self {
            DateSystem::Excel1904 => (NaiveDate::from_ymd_opt(1904, 1, 1)?, whole_days),
            DateSystem::Excel1900 if whole_days < FIRST_SERIAL_AFTER_LEAP_BUG => {
                (NaiveDate::from_ymd_opt(1899, 12, 31)?, whole_days)
            },
            DateSystem::Excel1900 => (NaiveDate::from_ymd_opt(1899, 12, 31)?, whole_days - 1),
        };
        base.checked_add_signed(Duration::try_days(offset)?)
    }
}

/// Convert a serial number to the instant it denotes in `zone`.
///
/// The time of day is rounded to whole milliseconds and read as a wall-clock
/// time in `zone`, so noon stays noon on days when the offset changes.
pub fn serial_to_instant(serial: f64, system: DateSystem, zone: Tz) -> Result<DateTime<Utc>> {
    if !serial.is_finite() || serial < 0.0 {
        return Err(ConvertError::InvalidDate(format!(
            "serial {} is outside the date range",
            serial
        )));
    }

    let whole_days = serial.floor() as i64;
    let millis_in_day = ((serial - serial.floor()) * MILLIS_PER_DAY + 0.5) as i64;

    let date = system.date_of(whole_days).ok_or_else(|| {
        ConvertError::InvalidDate(format!("serial {} is outside the date range", serial))
    })?;
    let wall_clock = date.and_time(NaiveTime::MIN) + Duration::milliseconds(millis_in_day);
    resolve_local(wall_clock, zone)
}

/// Parse an ISO local date (`2024-02-29`) as midnight in `zone`.
pub fn parse_local_date(text: &str, zone: Tz) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| ConvertError::InvalidDate(format!("{:?}: {}", text, e)))?;
    resolve_local(date.and_time(NaiveTime::MIN), zone)
}

/// Render an instant in ISO-8601 UTC form.
///
/// Fractional seconds appear only when non-zero, in groups of three digits.
#[inline]
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Instant of a wall-clock time in `zone`.
///
/// An ambiguous time (clocks turned back) is its earlier instant. A time in
/// a gap (clocks turned forward) moves forward by an hour.
fn resolve_local(wall_clock: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>> {
    let local = zone
        .from_local_datetime(&wall_clock)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(wall_clock + Duration::hours(1))).earliest())
        .ok_or_else(|| {
            ConvertError::InvalidDate(format!("{} does not exist in {}", wall_clock, zone))
        })?;
    Ok(local.with_timezone(&Utc))
}

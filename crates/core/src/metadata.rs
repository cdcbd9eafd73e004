use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Capture time embedded in a photo, as recorded by the camera (no zone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaptureTimestamp {
    datetime: NaiveDateTime,
}

impl CaptureTimestamp {
    pub fn from_parts(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        let datetime = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
        Some(Self { datetime })
    }

    pub fn year(&self) -> i32 {
        self.datetime.year()
    }

    pub fn month(&self) -> u32 {
        self.datetime.month()
    }

    pub fn day(&self) -> u32 {
        self.datetime.day()
    }

    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    pub fn minute(&self) -> u32 {
        self.datetime.minute()
    }

    pub fn second(&self) -> u32 {
        self.datetime.second()
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.datetime
    }

    /// `YYYYMMDDHHMMSS`, sortable as plain text.
    pub fn compact(&self) -> String {
        self.datetime.format("%Y%m%d%H%M%S").to_string()
    }

    /// Interprets the wall-clock value in the local zone. `None` inside a DST gap.
    pub fn local_system_time(&self) -> Option<SystemTime> {
        Local
            .from_local_datetime(&self.datetime)
            .earliest()
            .map(SystemTime::from)
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime.format("%Y:%m:%d %H:%M:%S"))
    }
}

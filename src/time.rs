//! Acquisition timestamps stored in trace headers.
//!
//! SEG-Y keeps the recording time of a trace as year, day of year, hour,
//! minute and second in five 2-byte trace header fields. [`AcquisitionTime`]
//! groups them; the time basis (local, GMT, ...) lives in a separate field
//! and is not interpreted.

use std::fmt;

/// Year + day-of-year + time of day, to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcquisitionTime {
    pub year: i16,
    pub day: i16,    // 1-366
    pub hour: i16,   // 0-23
    pub minute: i16, // 0-59
    pub second: i16, // 0-59
}

impl AcquisitionTime {
    pub fn new(year: i16, day: i16, hour: i16, minute: i16, second: i16) -> Self {
        Self {
            year,
            day,
            hour,
            minute,
            second,
        }
    }

    /// All five fields zero, as written by tools that record no time.
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    /// Whether every component lies in its calendar range.
    pub fn is_valid(&self) -> bool {
        let max_day = if is_leap_year(self.year) { 366 } else { 365 };
        (1..=max_day).contains(&self.day)
            && (0..24).contains(&self.hour)
            && (0..60).contains(&self.minute)
            && (0..60).contains(&self.second)
    }

    /// Seconds since midnight of the recording day.
    pub fn seconds_of_day(&self) -> i32 {
        self.hour as i32 * 3600 + self.minute as i32 * 60 + self.second as i32
    }
}

fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl fmt::Display for AcquisitionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:03} {:02}:{:02}:{:02}",
            self.year, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let t = AcquisitionTime::new(2020, 42, 21, 31, 38);
        assert_eq!(t.to_string(), "2020-042 21:31:38");
    }

    #[test]
    fn test_unset() {
        assert!(AcquisitionTime::default().is_unset());
        assert!(!AcquisitionTime::new(2020, 1, 0, 0, 0).is_unset());
    }

    #[test]
    fn test_validity() {
        assert!(AcquisitionTime::new(2020, 366, 23, 59, 59).is_valid());
        assert!(!AcquisitionTime::new(2021, 366, 0, 0, 0).is_valid());
        assert!(!AcquisitionTime::new(2000, 0, 0, 0, 0).is_valid());
        assert!(!AcquisitionTime::new(2000, 10, 24, 0, 0).is_valid());
        assert!(AcquisitionTime::new(2000, 366, 0, 0, 0).is_valid());
        assert!(!AcquisitionTime::new(1900, 366, 0, 0, 0).is_valid());
    }

    #[test]
    fn test_seconds_of_day() {
        assert_eq!(AcquisitionTime::new(2020, 42, 1, 2, 3).seconds_of_day(), 3723);
    }
}

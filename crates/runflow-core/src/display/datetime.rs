//! DateTime display utilities.
//!
//! Timestamps are shown in the system timezone.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// A `Timestamp` rendered as `YYYY-MM-DD HH:MM` in the system timezone.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M")
        )
    }
}

/// A chat message time (milliseconds since the epoch) rendered as `HH:MM`.
pub struct MessageTime(pub i64);

impl fmt::Display for MessageTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Timestamp::from_millisecond(self.0) {
            Ok(ts) => write!(
                f,
                "{}",
                ts.to_zoned(TimeZone::system()).strftime("%H:%M")
            ),
            Err(_) => f.write_str("--:--"),
        }
    }
}

mod content;
mod logic;

use jiff::civil::Date;
use jiff::{Span, Timestamp};

/// `days` before `date`.
pub fn days_before(date: Date, days: i64) -> Date {
    date.checked_sub(Span::new().days(days)).unwrap()
}

/// A fixed instant shifted by `hours`, for deterministic comment order.
pub fn at_hour(hours: i64) -> Timestamp {
    Timestamp::from_second(1_700_000_000 + hours * 3600).unwrap()
}

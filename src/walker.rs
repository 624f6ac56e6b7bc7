use chrono::{Duration, NaiveDate, Utc};

/// First date with published data; the walk never goes past it.
pub const ORIGIN_DATE: &str = "2020-01-23";

pub fn origin_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 23).unwrap()
}

/// Walks calendar dates backward, one day per pull, from a start date down
/// to an inclusive origin bound. Does no work on its own: the driver pulls a
/// date, performs that day's fetch and accumulation, then pulls again.
#[derive(Debug, Clone)]
pub struct Countdown {
    next: Option<NaiveDate>,
    origin: NaiveDate,
}

impl Countdown {
    /// Yields `start`, then each previous day, ending with `origin`. A start
    /// before the origin yields nothing.
    pub fn new(start: NaiveDate, origin: NaiveDate) -> Self {
        let next = if start >= origin { Some(start) } else { None };
        Self { next, origin }
    }

    /// Starts at yesterday relative to now in UTC+8, the publication
    /// timezone, bound by [`origin_date`].
    pub fn starting_yesterday() -> Self {
        let today = (Utc::now() + Duration::hours(8)).date_naive();
        let start = today.pred_opt().unwrap_or(today);
        Self::new(start, origin_date())
    }
}

impl Iterator for Countdown {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = if current > self.origin {
            current.pred_opt()
        } else {
            None
        };
        Some(current)
    }
}

pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

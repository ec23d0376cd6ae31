use chrono::{DateTime, Datelike, Days, Duration, NaiveTime, TimeZone, Weekday};

const MAX_GAP_HOURS: i64 = 3;

/// Weekly instant at which the sales ledger rolls over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub weekday: Weekday,
    pub hour: u32,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self { weekday: Weekday::Sun, hour: 23 }
    }
}

impl WeeklySchedule {
    /// First boundary strictly after `instant`, in the same timezone. A
    /// boundary that falls in a DST gap moves to the first wall-clock hour
    /// that exists.
    pub fn next_boundary_after<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> DateTime<Tz> {
        let local = instant.naive_local();
        let today = local.date();
        let days_ahead = (7 + self.weekday.num_days_from_monday()
            - today.weekday().num_days_from_monday())
            % 7;
        let at = NaiveTime::from_hms_opt(self.hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);

        let mut candidate = today
            .checked_add_days(Days::new(u64::from(days_ahead)))
            .unwrap_or(today)
            .and_time(at);
        if candidate <= local {
            candidate = candidate.checked_add_days(Days::new(7)).unwrap_or(candidate);
        }

        let tz = instant.timezone();
        (0..=MAX_GAP_HOURS)
            .find_map(|hours| {
                tz.from_local_datetime(&(candidate + Duration::hours(hours))).earliest()
            })
            .unwrap_or_else(|| instant.clone() + Duration::weeks(1))
    }

    pub fn is_due<Tz: TimeZone>(&self, last_reset: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
        *now >= self.next_boundary_after(last_reset)
    }
}

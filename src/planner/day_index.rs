use chrono::{Days, NaiveDate};

use super::PlannerError;

/// Where a calendar date falls relative to the trip, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPlacement {
    InRange(u32),
    BeforeStart,
    AfterEnd,
}

/// Maps calendar dates to 1-based trip days.
///
/// Dates are `NaiveDate` throughout: no instants, so no time-zone or DST
/// shift can move a record onto a neighbouring day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripCalendar {
    start: NaiveDate,
    end: NaiveDate,
}

impl TripCalendar {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PlannerError> {
        if start > end {
            return Err(PlannerError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive day count: a trip starting and ending on the same date has one day.
    pub fn total_days(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    pub fn placement(&self, date: NaiveDate) -> DayPlacement {
        let offset = (date - self.start).num_days() + 1;
        if offset < 1 {
            DayPlacement::BeforeStart
        } else if offset > i64::from(self.total_days()) {
            DayPlacement::AfterEnd
        } else {
            DayPlacement::InRange(offset as u32)
        }
    }

    /// Day number of `date`, clamped to `[1, total_days]`.
    pub fn day_number(&self, date: NaiveDate) -> u32 {
        match self.placement(date) {
            DayPlacement::InRange(day) => day,
            DayPlacement::BeforeStart => 1,
            DayPlacement::AfterEnd => self.total_days(),
        }
    }

    pub fn clamp_day(&self, day: u32) -> u32 {
        day.clamp(1, self.total_days())
    }

    pub fn date_of(&self, day: u32) -> NaiveDate {
        let offset = u64::from(self.clamp_day(day) - 1);
        self.start
            .checked_add_days(Days::new(offset))
            .unwrap_or(self.end)
    }

    pub fn days(&self) -> impl Iterator<Item = (u32, NaiveDate)> + '_ {
        (1..=self.total_days()).map(move |day| (day, self.date_of(day)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn calendar() -> TripCalendar {
        TripCalendar::new(date("2025-03-15"), date("2025-03-17")).unwrap()
    }

    #[test]
    fn counts_days_inclusively() {
        assert_eq!(calendar().total_days(), 3);
        let single = TripCalendar::new(date("2025-03-15"), date("2025-03-15")).unwrap();
        assert_eq!(single.total_days(), 1);
    }

    #[test]
    fn start_is_day_one_and_end_is_last_day() {
        let cal = calendar();
        assert_eq!(cal.day_number(date("2025-03-15")), 1);
        assert_eq!(cal.day_number(date("2025-03-16")), 2);
        assert_eq!(cal.day_number(date("2025-03-17")), 3);
    }

    #[test]
    fn out_of_range_dates_clamp_to_boundary_days() {
        let cal = calendar();
        assert_eq!(cal.placement(date("2025-03-01")), DayPlacement::BeforeStart);
        assert_eq!(cal.day_number(date("2025-03-01")), 1);
        assert_eq!(cal.placement(date("2025-04-01")), DayPlacement::AfterEnd);
        assert_eq!(cal.day_number(date("2025-04-01")), 3);
    }

    #[test]
    fn every_date_maps_into_range() {
        let cal = calendar();
        let mut cursor = date("2025-02-01");
        while cursor < date("2025-05-01") {
            let day = cal.day_number(cursor);
            assert!((1..=cal.total_days()).contains(&day));
            cursor = cursor.succ_opt().unwrap();
        }
    }

    #[test]
    fn day_numbers_cross_dst_changes_cleanly() {
        // Europe and the US both shift clocks around these dates.
        let cal = TripCalendar::new(date("2025-03-29"), date("2025-04-01")).unwrap();
        assert_eq!(cal.day_number(date("2025-03-30")), 2);
        assert_eq!(cal.day_number(date("2025-03-31")), 3);
    }

    #[test]
    fn date_of_inverts_day_number() {
        let cal = calendar();
        for (day, d) in cal.days() {
            assert_eq!(cal.day_number(d), day);
        }
        assert_eq!(cal.date_of(0), date("2025-03-15"));
        assert_eq!(cal.date_of(9), date("2025-03-17"));
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(TripCalendar::new(date("2025-03-17"), date("2025-03-15")).is_err());
    }
}

use std::fmt::{self, Write};

use super::timeline::Timeline;
use crate::models::itinerary::Itinerary;

/// Plain-text itinerary meant for pasting into a chat.
pub fn itinerary_text(itinerary: &Itinerary, timeline: &Timeline) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_itinerary(&mut out, itinerary, timeline)?;
    Ok(out)
}

pub fn write_itinerary(
    out: &mut impl Write,
    itinerary: &Itinerary,
    timeline: &Timeline,
) -> fmt::Result {
    writeln!(out, "{}", itinerary.title)?;
    if !itinerary.destination.is_empty() {
        writeln!(out, "Destination: {}", itinerary.destination)?;
    }
    writeln!(
        out,
        "Dates: {} - {}",
        itinerary.start_date.format("%Y-%m-%d"),
        itinerary.end_date.format("%Y-%m-%d")
    )?;

    for plan in &timeline.days {
        writeln!(out)?;
        writeln!(out, "Day {} ({})", plan.day, plan.date.format("%a %Y-%m-%d"))?;
        if plan.activities.is_empty() {
            writeln!(out, "  (nothing planned)")?;
        }
        for activity in &plan.activities {
            writeln!(out, "{} {}", activity.time_label(), activity.name)?;
            if let Some(notes) = activity.notes.as_deref().filter(|n| !n.trim().is_empty()) {
                writeln!(out, "  {}", notes.trim())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::{Activity, ActivityKind};
    use crate::models::itinerary::LocationType;
    use crate::planner::{day_index::TripCalendar, timeline::build_timeline};
    use chrono::{NaiveTime, Utc};

    fn kyoto_weekend() -> Itinerary {
        Itinerary {
            id: 1,
            group_id: "g".into(),
            title: "Kyoto weekend".into(),
            destination: "Kyoto".into(),
            start_date: "2025-03-15".parse().unwrap(),
            end_date: "2025-03-16".parse().unwrap(),
            travel_purpose: String::new(),
            location_type: LocationType::Domestic,
            total_budget: None,
            created_by: None,
            updated_at: Utc::now(),
        }
    }

    fn early_shrine_visit() -> Activity {
        Activity {
            id: 1,
            itinerary_id: 1,
            name: "Fushimi Inari".into(),
            location: "Kyoto".into(),
            notes: Some("go early".into()),
            kind: ActivityKind::Sightseeing,
            date: "2025-03-15".parse().unwrap(),
            time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            photo_url: None,
            lat: None,
            lng: None,
            place_id: None,
        }
    }

    #[test]
    fn renders_each_day_with_times_and_notes() {
        let itinerary = kyoto_weekend();
        let activity = early_shrine_visit();
        let calendar = TripCalendar::new(itinerary.start_date, itinerary.end_date).unwrap();
        let text = itinerary_text(&itinerary, &build_timeline(&calendar, vec![activity])).unwrap();

        assert!(text.starts_with("Kyoto weekend\n"));
        assert!(text.contains("Day 1 (Sat 2025-03-15)\n07:30 Fushimi Inari\n  go early\n"));
        assert!(text.contains("Day 2 (Sun 2025-03-16)\n  (nothing planned)\n"));
    }

    /// Accepts a fixed number of bytes, then fails every write.
    struct Truncated {
        written: String,
        capacity: usize,
    }

    impl Write for Truncated {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.written.len() + s.len() > self.capacity {
                return Err(fmt::Error);
            }
            self.written.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn write_errors_stop_the_export() {
        let itinerary = kyoto_weekend();
        let calendar = TripCalendar::new(itinerary.start_date, itinerary.end_date).unwrap();
        let timeline = build_timeline(&calendar, vec![early_shrine_visit()]);
        let mut sink = Truncated {
            written: String::new(),
            capacity: 40,
        };

        assert_eq!(write_itinerary(&mut sink, &itinerary, &timeline), Err(fmt::Error));
        assert!(sink.written.starts_with("Kyoto weekend\n"));
        assert!(!sink.written.contains("Day 2"));
    }
}

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use super::day_index::{DayPlacement, TripCalendar};
use crate::models::activity::Activity;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPlan {
    pub day: u32,
    pub date: NaiveDate,
    pub activities: Vec<Activity>,
}

/// An activity whose date fell outside the trip and was folded into a boundary day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClampedActivity {
    pub activity_id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub assigned_day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub days: Vec<DayPlan>,
    pub clamped: Vec<ClampedActivity>,
}

impl Timeline {
    pub fn day(&self, day: u32) -> Option<&DayPlan> {
        self.days.iter().find(|plan| plan.day == day)
    }

    pub fn len(&self) -> usize {
        self.days.iter().map(|plan| plan.activities.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Buckets activities into trip days, each day ordered by time of day.
///
/// The sort is stable, so activities at the same minute keep their input order.
pub fn build_timeline(calendar: &TripCalendar, activities: Vec<Activity>) -> Timeline {
    let mut days: Vec<DayPlan> = calendar
        .days()
        .map(|(day, date)| DayPlan {
            day,
            date,
            activities: Vec::new(),
        })
        .collect();
    let mut clamped = Vec::new();

    for activity in activities {
        let day = calendar.day_number(activity.date);
        if !matches!(calendar.placement(activity.date), DayPlacement::InRange(_)) {
            warn!(
                activity_id = activity.id,
                date = %activity.date,
                assigned_day = day,
                "activity date outside trip range, clamped"
            );
            clamped.push(ClampedActivity {
                activity_id: activity.id,
                name: activity.name.clone(),
                date: activity.date,
                assigned_day: day,
            });
        }
        days[(day - 1) as usize].activities.push(activity);
    }

    for plan in &mut days {
        plan.activities.sort_by_key(Activity::time_of_day);
    }

    Timeline { days, clamped }
}

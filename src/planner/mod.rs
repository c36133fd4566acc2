//! Pure shaping of trip data for the views: day numbering, daily timelines,
//! budget rollups, map markers and the shareable text export.

pub mod budget;
pub mod day_index;
pub mod map;
pub mod share;
pub mod timeline;
pub mod view;

use chrono::NaiveDate;
use thiserror::Error;

/// Longest trip that can be created; every day gets its own tab.
pub const MAX_TRIP_DAYS: u32 = 366;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("the trip ends ({end}) before it starts ({start})")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("the trip lasts {days} days, at most {max} are allowed")]
    TripTooLong { days: u32, max: u32 },
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
}

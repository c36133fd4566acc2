use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::planner::{day_index::TripCalendar, PlannerError, MAX_TRIP_DAYS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    #[default]
    Domestic,
    Overseas,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Domestic => "domestic",
            LocationType::Overseas => "overseas",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "domestic" => Ok(LocationType::Domestic),
            "overseas" => Ok(LocationType::Overseas),
            other => Err(PlannerError::UnknownCategory(other.to_string())),
        }
    }
}

/// A trip: the top-level planning unit owned by a group.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub id: i64,
    pub group_id: String,
    pub title: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub travel_purpose: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub location_type: LocationType,
    #[serde(default)]
    pub total_budget: Option<Decimal>,
    #[serde(default)]
    pub created_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Itinerary {
    pub fn calendar(&self) -> Result<TripCalendar, PlannerError> {
        TripCalendar::new(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItinerary {
    pub group_id: String,
    pub title: String,
    pub destinations: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travel_purposes: Vec<String>,
    pub location_type: LocationType,
    pub total_budget: Option<Decimal>,
    pub created_by: Option<String>,
}

impl NewItinerary {
    /// Destinations are stored as one comma-joined string.
    pub fn destination(&self) -> String {
        join_list(&self.destinations)
    }

    pub fn travel_purpose(&self) -> String {
        join_list(&self.travel_purposes)
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        let days = TripCalendar::new(self.start_date, self.end_date)?.total_days();
        if days > MAX_TRIP_DAYS {
            return Err(PlannerError::TripTooLong {
                days,
                max: MAX_TRIP_DAYS,
            });
        }
        Ok(())
    }
}

fn join_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_itinerary(start: &str, end: &str) -> NewItinerary {
        NewItinerary {
            group_id: "g".into(),
            title: "Kyoto".into(),
            destinations: vec!["Kyoto".into(), " ".into(), "Osaka ".into()],
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            travel_purposes: vec![],
            location_type: LocationType::Domestic,
            total_budget: None,
            created_by: None,
        }
    }

    #[test]
    fn destinations_are_joined_without_blanks() {
        assert_eq!(new_itinerary("2025-03-15", "2025-03-17").destination(), "Kyoto, Osaka");
    }

    #[test]
    fn rejects_end_before_start() {
        assert!(new_itinerary("2025-03-17", "2025-03-15").validate().is_err());
        assert!(new_itinerary("2025-03-15", "2025-03-15").validate().is_ok());
    }

    #[test]
    fn caps_trip_length() {
        assert!(new_itinerary("2024-01-01", "2024-12-31").validate().is_ok());
        assert_eq!(
            new_itinerary("2025-01-01", "2026-01-02").validate(),
            Err(PlannerError::TripTooLong {
                days: 367,
                max: MAX_TRIP_DAYS
            })
        );
        assert!(matches!(
            new_itinerary("0001-01-01", "9999-12-31").validate(),
            Err(PlannerError::TripTooLong { .. })
        ));
    }
}

use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};

use crate::planner::PlannerError;

/// Closed set of activity tags shown on the itinerary and the map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Transport,
    Sightseeing,
    Restaurant,
    Hotel,
    Activity,
    Area,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 6] = [
        ActivityKind::Transport,
        ActivityKind::Sightseeing,
        ActivityKind::Restaurant,
        ActivityKind::Hotel,
        ActivityKind::Activity,
        ActivityKind::Area,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Transport => "transport",
            ActivityKind::Sightseeing => "sightseeing",
            ActivityKind::Restaurant => "restaurant",
            ActivityKind::Hotel => "hotel",
            ActivityKind::Activity => "activity",
            ActivityKind::Area => "area",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Transport => "Transport",
            ActivityKind::Sightseeing => "Sightseeing",
            ActivityKind::Restaurant => "Restaurant",
            ActivityKind::Hotel => "Hotel",
            ActivityKind::Activity => "Activity",
            ActivityKind::Area => "Area",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActivityKind::Transport => "navigation",
            ActivityKind::Sightseeing => "map",
            ActivityKind::Restaurant => "utensils",
            ActivityKind::Hotel => "hotel",
            ActivityKind::Activity => "sunrise",
            ActivityKind::Area => "globe",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ActivityKind::Transport => "blue",
            ActivityKind::Sightseeing => "green",
            ActivityKind::Restaurant => "orange",
            ActivityKind::Hotel => "purple",
            ActivityKind::Activity => "yellow",
            ActivityKind::Area => "indigo",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| PlannerError::UnknownCategory(s.to_string()))
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub itinerary_id: i64,
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub lat: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub place_id: Option<String>,
}

impl Activity {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }

    /// Sort key for the daily timeline: hour then minute, seconds ignored.
    pub fn time_of_day(&self) -> (u32, u32) {
        (self.time.hour(), self.time.minute())
    }

    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    pub fn notes_display(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

/// Editable fields of an activity; an update replaces all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityChanges {
    pub name: String,
    pub location: String,
    pub notes: Option<String>,
    pub kind: ActivityKind,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub photo_url: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub itinerary_id: i64,
    pub fields: ActivityChanges,
}

/// Short reference embedded in budget rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRef {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
}

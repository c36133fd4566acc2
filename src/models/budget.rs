use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{models::activity::ActivityRef, planner::PlannerError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BudgetCategory {
    Transport,
    Accommodation,
    Food,
    Sightseeing,
    Shopping,
    Other,
    Expense,
}

impl BudgetCategory {
    pub const ALL: [BudgetCategory; 7] = [
        BudgetCategory::Transport,
        BudgetCategory::Accommodation,
        BudgetCategory::Food,
        BudgetCategory::Sightseeing,
        BudgetCategory::Shopping,
        BudgetCategory::Other,
        BudgetCategory::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetCategory::Transport => "transport",
            BudgetCategory::Accommodation => "accommodation",
            BudgetCategory::Food => "food",
            BudgetCategory::Sightseeing => "sightseeing",
            BudgetCategory::Shopping => "shopping",
            BudgetCategory::Other => "other",
            BudgetCategory::Expense => "expense",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetCategory::Transport => "Transport",
            BudgetCategory::Accommodation => "Accommodation",
            BudgetCategory::Food => "Food",
            BudgetCategory::Sightseeing => "Sightseeing & activities",
            BudgetCategory::Shopping => "Souvenirs",
            BudgetCategory::Other => "Other",
            BudgetCategory::Expense => "Expense",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BudgetCategory::Transport => "blue",
            BudgetCategory::Accommodation => "purple",
            BudgetCategory::Food => "green",
            BudgetCategory::Sightseeing => "yellow",
            BudgetCategory::Shopping => "pink",
            BudgetCategory::Other => "gray",
            BudgetCategory::Expense => "orange",
        }
    }
}

impl fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetCategory {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BudgetCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| PlannerError::UnknownCategory(s.to_string()))
    }
}

/// Largest amount accepted from a form, in whole currency units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub id: i64,
    pub itinerary_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub activity_id: Option<i64>,
    #[serde(default)]
    pub activity: Option<ActivityRef>,
    pub category: BudgetCategory,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub paid_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BudgetEntry {
    pub fn description_display(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn activity_name(&self) -> Option<&str> {
        self.activity.as_ref().map(|activity| activity.name.as_str())
    }
}

/// Editable fields of a budget entry; an update replaces all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetChanges {
    pub date: NaiveDate,
    pub activity_id: Option<i64>,
    pub category: BudgetCategory,
    pub amount: Decimal,
    pub description: Option<String>,
    pub currency: String,
    pub paid_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBudgetEntry {
    pub itinerary_id: i64,
    pub fields: BudgetChanges,
}

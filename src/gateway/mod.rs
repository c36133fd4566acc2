//! Boundary to the data store holding groups, trips, activities and budgets.
//!
//! Mutations are fire-and-refetch: callers list again after a successful
//! write instead of merging the returned row into what they already hold.
//! Concurrent writers are last-write-wins.

pub mod hasura;
pub mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::AppError,
    models::{
        activity::{Activity, ActivityChanges, NewActivity},
        budget::{BudgetChanges, BudgetEntry, NewBudgetEntry},
        group::{Group, NewGroup, Participant},
        itinerary::{Itinerary, NewItinerary},
    },
};

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn create_group(&self, group: NewGroup) -> Result<Group, AppError>;
    async fn group_by_token(&self, token: &str) -> Result<Option<Group>, AppError>;

    async fn list_participants(&self, group_id: &str) -> Result<Vec<Participant>, AppError>;
    async fn add_participant(&self, group_id: &str, name: &str) -> Result<(), AppError>;
    async fn remove_participant(&self, group_id: &str, name: &str) -> Result<(), AppError>;

    async fn list_itineraries(&self, group_id: &str) -> Result<Vec<Itinerary>, AppError>;
    /// `AppError::NotFound` when no trip has this id.
    async fn get_trip(&self, id: i64) -> Result<Itinerary, AppError>;
    async fn create_trip(&self, trip: NewItinerary) -> Result<Itinerary, AppError>;
    async fn set_trip_budget(
        &self,
        id: i64,
        total_budget: Option<Decimal>,
    ) -> Result<Itinerary, AppError>;

    /// Ordered by date, then time.
    async fn list_activities(&self, itinerary_id: i64) -> Result<Vec<Activity>, AppError>;
    async fn list_activities_on(
        &self,
        itinerary_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Activity>, AppError>;
    async fn create_activity(&self, activity: NewActivity) -> Result<Activity, AppError>;
    async fn update_activity(
        &self,
        id: i64,
        changes: ActivityChanges,
    ) -> Result<Activity, AppError>;
    async fn delete_activity(&self, id: i64) -> Result<(), AppError>;

    /// Ordered by date ascending, newest first within a date.
    async fn list_budgets(&self, itinerary_id: i64) -> Result<Vec<BudgetEntry>, AppError>;
    async fn create_budget_entry(&self, entry: NewBudgetEntry) -> Result<BudgetEntry, AppError>;
    async fn update_budget_entry(
        &self,
        id: i64,
        changes: BudgetChanges,
    ) -> Result<BudgetEntry, AppError>;
    async fn delete_budget_entry(&self, id: i64) -> Result<(), AppError>;
}

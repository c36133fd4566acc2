//! Gateway speaking GraphQL to a hosted Hasura instance.

mod queries;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::Gateway;
use crate::{
    error::AppError,
    models::{
        activity::{Activity, ActivityChanges, NewActivity},
        budget::{BudgetChanges, BudgetEntry, NewBudgetEntry},
        group::{Group, NewGroup, Participant},
        itinerary::{Itinerary, NewItinerary},
    },
};

const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Clone)]
pub struct HasuraGateway {
    client: Client,
    endpoint: Url,
    admin_secret: Option<String>,
}

impl HasuraGateway {
    pub fn new(
        endpoint: Url,
        admin_secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            admin_secret,
        })
    }

    async fn execute(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<Value, AppError> {
        debug!(operation, "graphql request");
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&GraphQlRequest { query, variables });
        if let Some(secret) = &self.admin_secret {
            request = request.header(ADMIN_SECRET_HEADER, secret);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(AppError::Gateway(format!(
                "{operation}: endpoint answered {status}: {body}"
            )));
        }
        let payload: Value = response.json().await?;
        decode_payload(operation, payload)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
        field: &str,
    ) -> Result<T, AppError> {
        let mut data = self.execute(operation, query, variables).await?;
        take_field(&mut data, field)
    }
}

/// Unwraps the `{data, errors}` envelope; any GraphQL error fails the call.
fn decode_payload(operation: &str, payload: Value) -> Result<Value, AppError> {
    let response: GraphQlResponse = serde_json::from_value(payload)
        .map_err(|err| AppError::Gateway(format!("{operation}: malformed response: {err}")))?;
    if !response.errors.is_empty() {
        let messages = response
            .errors
            .into_iter()
            .map(|error| error.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::Gateway(format!("{operation}: {messages}")));
    }
    response
        .data
        .ok_or_else(|| AppError::Gateway(format!("{operation}: response carried no data")))
}

fn take_field<T: DeserializeOwned>(data: &mut Value, field: &str) -> Result<T, AppError> {
    let value = data.get_mut(field).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|err| AppError::Gateway(format!("unexpected `{field}` payload: {err}")))
}

fn activity_variables(key: &str, id: i64, fields: &ActivityChanges) -> Value {
    let mut variables = json!({
        "name": fields.name,
        "location": fields.location,
        "notes": fields.notes,
        "type": fields.kind.as_str(),
        "date": fields.date,
        "time": fields.time,
        "photo_url": fields.photo_url,
        "lat": fields.lat,
        "lng": fields.lng,
        "place_id": fields.place_id,
    });
    variables[key] = json!(id);
    variables
}

fn budget_variables(key: &str, id: i64, fields: &BudgetChanges) -> Value {
    let mut variables = json!({
        "date": fields.date,
        "activity_id": fields.activity_id,
        "category": fields.category.as_str(),
        "amount": fields.amount,
        "description": fields.description,
        "currency": fields.currency,
        "paid_by": fields.paid_by,
    });
    variables[key] = json!(id);
    variables
}

#[async_trait]
impl Gateway for HasuraGateway {
    async fn create_group(&self, group: NewGroup) -> Result<Group, AppError> {
        self.fetch(
            "insert_group",
            queries::INSERT_GROUP,
            json!({ "id": group.id, "name": group.name, "token": group.token }),
            "insert_group_one",
        )
        .await
    }

    async fn group_by_token(&self, token: &str) -> Result<Option<Group>, AppError> {
        let groups: Vec<Group> = self
            .fetch(
                "group_by_token",
                queries::GROUP_BY_TOKEN,
                json!({ "token": token }),
                "group",
            )
            .await?;
        Ok(groups.into_iter().next())
    }

    async fn list_participants(&self, group_id: &str) -> Result<Vec<Participant>, AppError> {
        self.fetch(
            "participants",
            queries::GET_PARTICIPANTS,
            json!({ "group_id": group_id }),
            "participants",
        )
        .await
    }

    async fn add_participant(&self, group_id: &str, name: &str) -> Result<(), AppError> {
        self.execute(
            "insert_participant",
            queries::INSERT_PARTICIPANT,
            json!({ "group_id": group_id, "name": name }),
        )
        .await?;
        Ok(())
    }

    async fn remove_participant(&self, group_id: &str, name: &str) -> Result<(), AppError> {
        self.execute(
            "delete_participant",
            queries::DELETE_PARTICIPANT,
            json!({ "group_id": group_id, "name": name }),
        )
        .await?;
        Ok(())
    }

    async fn list_itineraries(&self, group_id: &str) -> Result<Vec<Itinerary>, AppError> {
        self.fetch(
            "itineraries_by_group",
            queries::GET_ITINERARIES_BY_GROUP,
            json!({ "group_id": group_id }),
            "itineraries",
        )
        .await
    }

    async fn get_trip(&self, id: i64) -> Result<Itinerary, AppError> {
        let trip: Option<Itinerary> = self
            .fetch(
                "itinerary_by_pk",
                queries::GET_ITINERARY_BY_ID,
                json!({ "id": id }),
                "itineraries_by_pk",
            )
            .await?;
        trip.ok_or(AppError::NotFound)
    }

    async fn create_trip(&self, trip: NewItinerary) -> Result<Itinerary, AppError> {
        trip.validate()?;
        self.fetch(
            "insert_itinerary",
            queries::INSERT_ITINERARY,
            json!({
                "group_id": trip.group_id,
                "title": trip.title,
                "destination": trip.destination(),
                "start_date": trip.start_date,
                "end_date": trip.end_date,
                "travel_purpose": trip.travel_purpose(),
                "location_type": trip.location_type.as_str(),
                "total_budget": trip.total_budget,
                "created_by": trip.created_by,
            }),
            "insert_itineraries_one",
        )
        .await
    }

    async fn set_trip_budget(
        &self,
        id: i64,
        total_budget: Option<Decimal>,
    ) -> Result<Itinerary, AppError> {
        let trip: Option<Itinerary> = self
            .fetch(
                "update_itinerary_budget",
                queries::UPDATE_ITINERARY_BUDGET,
                json!({ "id": id, "total_budget": total_budget }),
                "update_itineraries_by_pk",
            )
            .await?;
        trip.ok_or(AppError::NotFound)
    }

    async fn list_activities(&self, itinerary_id: i64) -> Result<Vec<Activity>, AppError> {
        self.fetch(
            "activities",
            queries::GET_ACTIVITIES,
            json!({ "itinerary_id": itinerary_id }),
            "activities",
        )
        .await
    }

    async fn list_activities_on(
        &self,
        itinerary_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Activity>, AppError> {
        self.fetch(
            "activities_by_date",
            queries::GET_ACTIVITIES_BY_DATE,
            json!({ "itinerary_id": itinerary_id, "date": date }),
            "activities",
        )
        .await
    }

    async fn create_activity(&self, activity: NewActivity) -> Result<Activity, AppError> {
        self.fetch(
            "insert_activity",
            queries::INSERT_ACTIVITY,
            activity_variables("itinerary_id", activity.itinerary_id, &activity.fields),
            "insert_activities_one",
        )
        .await
    }

    async fn update_activity(
        &self,
        id: i64,
        changes: ActivityChanges,
    ) -> Result<Activity, AppError> {
        let updated: Option<Activity> = self
            .fetch(
                "update_activity",
                queries::UPDATE_ACTIVITY,
                activity_variables("id", id, &changes),
                "update_activities_by_pk",
            )
            .await?;
        updated.ok_or(AppError::NotFound)
    }

    async fn delete_activity(&self, id: i64) -> Result<(), AppError> {
        let deleted: Option<Value> = self
            .fetch(
                "delete_activity",
                queries::DELETE_ACTIVITY,
                json!({ "id": id }),
                "delete_activities_by_pk",
            )
            .await?;
        deleted.map(|_| ()).ok_or(AppError::NotFound)
    }

    async fn list_budgets(&self, itinerary_id: i64) -> Result<Vec<BudgetEntry>, AppError> {
        self.fetch(
            "budgets",
            queries::GET_BUDGETS,
            json!({ "itinerary_id": itinerary_id }),
            "budgets",
        )
        .await
    }

    async fn create_budget_entry(&self, entry: NewBudgetEntry) -> Result<BudgetEntry, AppError> {
        self.fetch(
            "insert_budget",
            queries::INSERT_BUDGET,
            budget_variables("itinerary_id", entry.itinerary_id, &entry.fields),
            "insert_budgets_one",
        )
        .await
    }

    async fn update_budget_entry(
        &self,
        id: i64,
        changes: BudgetChanges,
    ) -> Result<BudgetEntry, AppError> {
        let updated: Option<BudgetEntry> = self
            .fetch(
                "update_budget",
                queries::UPDATE_BUDGET,
                budget_variables("id", id, &changes),
                "update_budgets_by_pk",
            )
            .await?;
        updated.ok_or(AppError::NotFound)
    }

    async fn delete_budget_entry(&self, id: i64) -> Result<(), AppError> {
        let deleted: Option<Value> = self
            .fetch(
                "delete_budget",
                queries::DELETE_BUDGET,
                json!({ "id": id }),
                "delete_budgets_by_pk",
            )
            .await?;
        deleted.map(|_| ()).ok_or(AppError::NotFound)
    }
}

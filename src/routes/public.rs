use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tracing::{error, info};

use super::form::{required, split_list, TripForm};
use crate::{
    error::AppError,
    models::{
        group::NewGroup,
        itinerary::{Itinerary, NewItinerary},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/group/new", get(new_group_form).post(new_group_submit))
}

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate;

async fn landing() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(LandingTemplate)
}

#[derive(Template)]
#[template(path = "group/new.html")]
struct NewGroupTemplate {
    default_currency: String,
}

async fn new_group_form(State(state): State<AppState>) -> impl IntoResponse {
    AskamaTemplateResponse::into_response(NewGroupTemplate {
        default_currency: state.config.default_currency.clone(),
    })
}

#[derive(Deserialize)]
struct NewGroupForm {
    group_name: String,
    #[serde(default)]
    participants: String,
    title: String,
    #[serde(default)]
    destinations: String,
    start_date: String,
    end_date: String,
    #[serde(default)]
    travel_purposes: String,
    #[serde(default)]
    location_type: Option<String>,
    #[serde(default)]
    total_budget: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
}

async fn new_group_submit(
    State(state): State<AppState>,
    Form(form): Form<NewGroupForm>,
) -> Result<Redirect, AppError> {
    let group = NewGroup::new(required(&form.group_name, "Group name")?);
    let participants = split_list(&form.participants);
    let trip = TripForm {
        title: form.title,
        destinations: form.destinations,
        start_date: form.start_date,
        end_date: form.end_date,
        travel_purposes: form.travel_purposes,
        location_type: form.location_type,
        total_budget: form.total_budget,
        created_by: form.created_by,
    }
    .into_new_itinerary(&group.id)?;

    // The gateway has no transactions across calls. Input is fully validated
    // above, so only a storage failure can leave a group without its trip.
    let group = state.gateway.create_group(group).await?;
    let trip = match populate_group(&state, &group.id, trip, &participants).await {
        Ok(trip) => trip,
        Err(err) => {
            error!(group_id = %group.id, "group left incomplete after a failed write: {err}");
            return Err(err);
        }
    };
    info!(
        group_id = %group.id,
        trip_id = trip.id,
        participants = participants.len(),
        "created group"
    );

    Ok(Redirect::to(&format!("/group/{}", group.token)))
}

async fn populate_group(
    state: &AppState,
    group_id: &str,
    trip: NewItinerary,
    participants: &[String],
) -> Result<Itinerary, AppError> {
    let trip = state.gateway.create_trip(trip).await?;
    for name in participants {
        state.gateway.add_participant(group_id, name).await?;
    }
    Ok(trip)
}

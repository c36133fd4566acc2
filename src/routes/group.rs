use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::info;

use super::{form::required, form::TripForm, load_group, trip_path};
use crate::{error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/:token", get(show))
        .route("/group/:token/participants", post(add_participant))
        .route("/group/:token/participants/remove", post(remove_participant))
        .route("/group/:token/trips", post(create_trip))
}

struct TripSummary {
    title: String,
    destination: String,
    dates: String,
    days: u32,
    href: String,
}

#[derive(Template)]
#[template(path = "group/show.html")]
struct GroupTemplate {
    name: String,
    token: String,
    participants: Vec<String>,
    trips: Vec<TripSummary>,
}

async fn show(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let group = load_group(&state, &token).await?;
    let participants = state
        .gateway
        .list_participants(&group.id)
        .await?
        .into_iter()
        .map(|participant| participant.name)
        .collect();
    let trips = state
        .gateway
        .list_itineraries(&group.id)
        .await?
        .into_iter()
        .map(|trip| TripSummary {
            href: trip_path(&group.token, trip.id),
            days: trip
                .calendar()
                .map(|calendar| calendar.total_days())
                .unwrap_or(0),
            dates: format!(
                "{} – {}",
                trip.start_date.format("%Y-%m-%d"),
                trip.end_date.format("%Y-%m-%d")
            ),
            destination: trip.destination,
            title: trip.title,
        })
        .collect();

    Ok(AskamaTemplateResponse::into_response(GroupTemplate {
        name: group.name,
        token: group.token,
        participants,
        trips,
    }))
}

#[derive(Deserialize)]
struct ParticipantForm {
    name: String,
}

async fn add_participant(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<ParticipantForm>,
) -> Result<Redirect, AppError> {
    let name = required(&form.name, "Name")?;
    let group = load_group(&state, &token).await?;
    state.gateway.add_participant(&group.id, &name).await?;
    Ok(Redirect::to(&format!("/group/{token}")))
}

async fn remove_participant(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<ParticipantForm>,
) -> Result<Redirect, AppError> {
    let name = required(&form.name, "Name")?;
    let group = load_group(&state, &token).await?;
    state.gateway.remove_participant(&group.id, &name).await?;
    Ok(Redirect::to(&format!("/group/{token}")))
}

async fn create_trip(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<TripForm>,
) -> Result<Redirect, AppError> {
    let group = load_group(&state, &token).await?;
    let trip = state
        .gateway
        .create_trip(form.into_new_itinerary(&group.id)?)
        .await?;
    info!(group_id = %group.id, trip_id = trip.id, "created trip");
    Ok(Redirect::to(&trip_path(&token, trip.id)))
}

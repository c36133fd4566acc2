use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::{load_trip, trip_path, DayQuery};
use crate::{
    error::AppError,
    models::itinerary::Itinerary,
    planner::{
        map::{day_markers, MapView},
        timeline::build_timeline,
        view::DaySelection,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/:token/trips/:id/map", get(show))
        .route("/group/:token/trips/:id/map.json", get(markers))
}

async fn map_for_day(
    state: &AppState,
    trip: &Itinerary,
    query: &DayQuery,
) -> Result<(DaySelection, MapView), AppError> {
    let calendar = trip.calendar()?;
    let selection = query.selection(&calendar);
    let activities = state.gateway.list_activities(trip.id).await?;
    let timeline = build_timeline(&calendar, activities);
    let view = timeline
        .day(selection.day())
        .map(day_markers)
        .ok_or(AppError::NotFound)?;
    Ok((selection, view))
}

struct MarkerRow {
    order: usize,
    name: String,
    time: String,
    kind_label: &'static str,
    lat: f64,
    lng: f64,
}

struct DayLink {
    day: u32,
    href: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "itinerary/map.html")]
struct MapTemplate {
    title: String,
    trip_href: String,
    day: u32,
    days: Vec<DayLink>,
    markers: Vec<MarkerRow>,
    center_lat: f64,
    center_lng: f64,
    markers_href: String,
    maps_api_key: String,
}

async fn show(
    State(state): State<AppState>,
    Path((token, trip_id)): Path<(String, i64)>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    let (selection, view) = map_for_day(&state, &trip, &query).await?;
    let base = trip_path(&token, trip.id);

    Ok(AskamaTemplateResponse::into_response(MapTemplate {
        title: trip.title,
        trip_href: format!("{base}?day={}", selection.day()),
        day: selection.day(),
        days: (1..=selection.total_days())
            .map(|day| DayLink {
                day,
                href: format!("{base}/map?day={day}"),
                selected: day == selection.day(),
            })
            .collect(),
        markers: view
            .markers
            .into_iter()
            .map(|marker| MarkerRow {
                order: marker.order,
                kind_label: marker.kind.label(),
                lat: marker.position.lat,
                lng: marker.position.lng,
                time: marker.time,
                name: marker.name,
            })
            .collect(),
        center_lat: view.center.lat,
        center_lng: view.center.lng,
        markers_href: format!("{base}/map.json?day={}", selection.day()),
        maps_api_key: state.config.google_maps_api_key.clone().unwrap_or_default(),
    }))
}

async fn markers(
    State(state): State<AppState>,
    Path((token, trip_id)): Path<(String, i64)>,
    Query(query): Query<DayQuery>,
) -> Result<Json<MapView>, AppError> {
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    let (_, view) = map_for_day(&state, &trip, &query).await?;
    Ok(Json(view))
}

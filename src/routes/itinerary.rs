use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{
    form::{
        normalize_optional, parse_date, parse_optional_coordinate, parse_time, required,
    },
    load_trip, trip_path, DayQuery, ReturnDay,
};
use crate::{
    error::AppError,
    models::activity::{Activity, ActivityChanges, ActivityKind, NewActivity},
    planner::{share::itinerary_text, timeline::build_timeline},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/:token/trips/:id", get(show))
        .route("/group/:token/trips/:id/activities", post(create_activity))
        .route(
            "/group/:token/trips/:id/activities/:activity_id",
            post(update_activity),
        )
        .route(
            "/group/:token/trips/:id/activities/:activity_id/delete",
            post(delete_activity),
        )
        .route("/group/:token/trips/:id/share.txt", get(share_text))
}

struct DayTab {
    day: u32,
    date: String,
    count: usize,
    href: String,
    selected: bool,
}

struct ActivityRow {
    name: String,
    location: String,
    notes: String,
    kind: &'static str,
    kind_label: &'static str,
    kind_icon: &'static str,
    kind_color: &'static str,
    date: String,
    time: String,
    photo_url: String,
    lat: String,
    lng: String,
    place_id: String,
    update_href: String,
    delete_href: String,
}

impl ActivityRow {
    fn new(activity: Activity, base: &str) -> Self {
        Self {
            update_href: format!("{base}/activities/{}", activity.id),
            delete_href: format!("{base}/activities/{}/delete", activity.id),
            time: activity.time_label(),
            date: activity.date.format("%Y-%m-%d").to_string(),
            notes: activity.notes_display().to_string(),
            kind: activity.kind.as_str(),
            kind_label: activity.kind.label(),
            kind_icon: activity.kind.icon(),
            kind_color: activity.kind.color(),
            lat: activity.lat.map(|v| v.to_string()).unwrap_or_default(),
            lng: activity.lng.map(|v| v.to_string()).unwrap_or_default(),
            photo_url: activity.photo_url.unwrap_or_default(),
            place_id: activity.place_id.unwrap_or_default(),
            location: activity.location,
            name: activity.name,
        }
    }
}

struct KindOption {
    value: &'static str,
    label: &'static str,
}

fn kind_options() -> Vec<KindOption> {
    ActivityKind::ALL
        .iter()
        .map(|kind| KindOption {
            value: kind.as_str(),
            label: kind.label(),
        })
        .collect()
}

struct ClampedNotice {
    name: String,
    date: String,
    day: u32,
}

#[derive(Template)]
#[template(path = "itinerary/show.html")]
struct ItineraryTemplate {
    group_name: String,
    group_href: String,
    title: String,
    destination: String,
    travel_purpose: String,
    dates: String,
    base_href: String,
    tabs: Vec<DayTab>,
    day: u32,
    day_date: String,
    day_iso: String,
    has_previous: bool,
    has_next: bool,
    previous_href: String,
    next_href: String,
    activities: Vec<ActivityRow>,
    total_activities: usize,
    kinds: Vec<KindOption>,
    clamped: Vec<ClampedNotice>,
    places_enabled: bool,
}

async fn show(
    State(state): State<AppState>,
    Path((token, trip_id)): Path<(String, i64)>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (group, trip) = load_trip(&state, &token, trip_id).await?;
    let calendar = trip.calendar()?;
    let activities = state.gateway.list_activities(trip.id).await?;
    let mut timeline = build_timeline(&calendar, activities);
    let selection = query.selection(&calendar);
    let base = trip_path(&token, trip.id);

    let tabs = timeline
        .days
        .iter()
        .map(|plan| DayTab {
            day: plan.day,
            date: plan.date.format("%m/%d %a").to_string(),
            count: plan.activities.len(),
            href: format!("{base}?day={}", plan.day),
            selected: plan.day == selection.day(),
        })
        .collect();
    let total_activities = timeline.len();
    let clamped = timeline
        .clamped
        .iter()
        .map(|notice| ClampedNotice {
            name: notice.name.clone(),
            date: notice.date.format("%Y-%m-%d").to_string(),
            day: notice.assigned_day,
        })
        .collect();

    let selected_date = calendar.date_of(selection.day());
    let activities = timeline
        .days
        .get_mut(selection.day() as usize - 1)
        .map(|plan| std::mem::take(&mut plan.activities))
        .unwrap_or_default()
        .into_iter()
        .map(|activity| ActivityRow::new(activity, &base))
        .collect();

    Ok(AskamaTemplateResponse::into_response(ItineraryTemplate {
        group_name: group.name,
        group_href: format!("/group/{token}"),
        title: trip.title,
        destination: trip.destination,
        travel_purpose: trip.travel_purpose,
        dates: format!(
            "{} – {} ({} days)",
            calendar.start().format("%Y-%m-%d"),
            calendar.end().format("%Y-%m-%d"),
            calendar.total_days()
        ),
        previous_href: format!("{base}?day={}&nav=previous", selection.day()),
        next_href: format!("{base}?day={}&nav=next", selection.day()),
        base_href: base,
        tabs,
        day: selection.day(),
        day_date: selected_date.format("%Y-%m-%d (%a)").to_string(),
        day_iso: selected_date.format("%Y-%m-%d").to_string(),
        has_previous: selection.has_previous(),
        has_next: selection.has_next(),
        activities,
        total_activities,
        kinds: kind_options(),
        clamped,
        places_enabled: state.places.is_some(),
    }))
}

#[derive(Deserialize)]
struct ActivityForm {
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    notes: Option<String>,
    kind: String,
    date: String,
    time: String,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lng: Option<String>,
    #[serde(default)]
    place_id: Option<String>,
}

impl ActivityForm {
    fn into_changes(self) -> Result<ActivityChanges, AppError> {
        Ok(ActivityChanges {
            name: required(&self.name, "Activity name")?,
            location: self.location.trim().to_string(),
            notes: normalize_optional(self.notes),
            kind: self.kind.parse()?,
            date: parse_date(&self.date, "Date")?,
            time: parse_time(&self.time, "Time")?,
            photo_url: normalize_optional(self.photo_url),
            lat: parse_optional_coordinate(self.lat, "Latitude", 90.0)?,
            lng: parse_optional_coordinate(self.lng, "Longitude", 180.0)?,
            place_id: normalize_optional(self.place_id),
        })
    }
}

/// Fills coordinates, location and photo from the place lookup when the
/// form carried a place id but no coordinates. A failed lookup keeps the
/// submitted values.
async fn fill_from_place(state: &AppState, changes: &mut ActivityChanges) {
    let (Some(places), Some(place_id)) = (&state.places, changes.place_id.clone()) else {
        return;
    };
    if changes.lat.is_some() && changes.lng.is_some() {
        return;
    }
    match places.details(&place_id).await {
        Ok(details) => {
            if changes.location.is_empty() {
                changes.location = details.name;
            }
            changes.lat = Some(details.lat);
            changes.lng = Some(details.lng);
            if changes.photo_url.is_none() {
                changes.photo_url = details.photo_url;
            }
        }
        Err(err) => warn!(%place_id, "place lookup failed: {err}"),
    }
}

async fn ensure_activity_in_trip(
    state: &AppState,
    trip_id: i64,
    activity_id: i64,
) -> Result<(), AppError> {
    let activities = state.gateway.list_activities(trip_id).await?;
    if activities.iter().any(|activity| activity.id == activity_id) {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

async fn create_activity(
    State(state): State<AppState>,
    Path((token, trip_id)): Path<(String, i64)>,
    Form(form): Form<ActivityForm>,
) -> Result<Redirect, AppError> {
    let mut changes = form.into_changes()?;
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    let day = trip.calendar()?.day_number(changes.date);
    fill_from_place(&state, &mut changes).await;

    let activity = state
        .gateway
        .create_activity(NewActivity {
            itinerary_id: trip.id,
            fields: changes,
        })
        .await?;
    info!(trip_id = trip.id, activity_id = activity.id, "created activity");

    Ok(Redirect::to(&format!("{}?day={day}", trip_path(&token, trip.id))))
}

async fn update_activity(
    State(state): State<AppState>,
    Path((token, trip_id, activity_id)): Path<(String, i64, i64)>,
    Form(form): Form<ActivityForm>,
) -> Result<Redirect, AppError> {
    let mut changes = form.into_changes()?;
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    ensure_activity_in_trip(&state, trip.id, activity_id).await?;
    let day = trip.calendar()?.day_number(changes.date);
    fill_from_place(&state, &mut changes).await;

    state.gateway.update_activity(activity_id, changes).await?;
    info!(trip_id = trip.id, activity_id, "updated activity");

    Ok(Redirect::to(&format!("{}?day={day}", trip_path(&token, trip.id))))
}

async fn delete_activity(
    State(state): State<AppState>,
    Path((token, trip_id, activity_id)): Path<(String, i64, i64)>,
    Form(form): Form<ReturnDay>,
) -> Result<Redirect, AppError> {
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    ensure_activity_in_trip(&state, trip.id, activity_id).await?;
    state.gateway.delete_activity(activity_id).await?;
    info!(trip_id = trip.id, activity_id, "deleted activity");

    let target = match form.day {
        Some(day) => format!("{}?day={day}", trip_path(&token, trip.id)),
        None => trip_path(&token, trip.id),
    };
    Ok(Redirect::to(&target))
}

async fn share_text(
    State(state): State<AppState>,
    Path((token, trip_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    let calendar = trip.calendar()?;
    let timeline = build_timeline(&calendar, state.gateway.list_activities(trip.id).await?);
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        itinerary_text(&trip, &timeline).map_err(anyhow::Error::from)?,
    ))
}

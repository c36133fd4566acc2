pub mod budget;
pub mod form;
pub mod group;
pub mod itinerary;
pub mod map;
pub mod public;

use axum::Router;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    error::AppError,
    models::{group::Group, itinerary::Itinerary},
    planner::{
        day_index::TripCalendar,
        view::{DayAction, DaySelection},
    },
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .merge(group::router())
        .merge(itinerary::router())
        .merge(budget::router())
        .merge(map::router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `?day=&nav=` on every per-day view.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DayQuery {
    pub day: Option<u32>,
    pub nav: Option<DayAction>,
}

impl DayQuery {
    pub(crate) fn selection(&self, calendar: &TripCalendar) -> DaySelection {
        DaySelection::from_query(calendar.total_days(), self.day, self.nav)
    }
}

/// Day to land on after a delete.
#[derive(Debug, Deserialize)]
pub(crate) struct ReturnDay {
    #[serde(default)]
    pub day: Option<u32>,
}

/// The token is the only credential: an unknown token is indistinguishable
/// from a missing page.
pub(crate) async fn load_group(state: &AppState, token: &str) -> Result<Group, AppError> {
    state
        .gateway
        .group_by_token(token)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) async fn load_trip(
    state: &AppState,
    token: &str,
    trip_id: i64,
) -> Result<(Group, Itinerary), AppError> {
    let group = load_group(state, token).await?;
    let trip = state.gateway.get_trip(trip_id).await?;
    if trip.group_id != group.id {
        return Err(AppError::NotFound);
    }
    Ok((group, trip))
}

pub(crate) fn trip_path(token: &str, trip_id: i64) -> String {
    format!("/group/{token}/trips/{trip_id}")
}

use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{
    form::{normalize_optional, parse_amount, parse_date, parse_optional_amount, parse_optional_id},
    load_trip, trip_path, DayQuery, ReturnDay,
};
use crate::{
    error::AppError,
    models::budget::{BudgetCategory, BudgetChanges, BudgetEntry, NewBudgetEntry},
    planner::{
        budget::{BudgetLedger, CategoryTotal, DailyTotal},
        day_index::{DayPlacement, TripCalendar},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/group/:token/trips/:id/budget",
            get(show).post(create_entry),
        )
        .route("/group/:token/trips/:id/budget/ceiling", post(set_ceiling))
        .route("/group/:token/trips/:id/budget/:entry_id", post(update_entry))
        .route(
            "/group/:token/trips/:id/budget/:entry_id/delete",
            post(delete_entry),
        )
}

/// Whole amounts print without decimals, anything else with exactly two.
fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = if rounded.fract().is_zero() {
        rounded.abs().normalize().to_string()
    } else {
        format!("{:.2}", rounded.abs())
    };
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

struct EntryRow {
    date: String,
    category: &'static str,
    category_label: &'static str,
    category_color: &'static str,
    amount: String,
    amount_raw: String,
    currency: String,
    description: String,
    paid_by: String,
    activity_id: String,
    activity_name: String,
    update_href: String,
    delete_href: String,
}

impl EntryRow {
    fn new(entry: &BudgetEntry, base: &str) -> Self {
        Self {
            date: entry.date.format("%Y-%m-%d").to_string(),
            category: entry.category.as_str(),
            category_label: entry.category.label(),
            category_color: entry.category.color(),
            amount: money(entry.amount),
            amount_raw: entry.amount.normalize().to_string(),
            currency: entry.currency.clone(),
            description: entry.description_display().to_string(),
            paid_by: entry.paid_by.clone().unwrap_or_default(),
            activity_id: entry.activity_id.map(|id| id.to_string()).unwrap_or_default(),
            activity_name: entry.activity_name().unwrap_or_default().to_string(),
            update_href: format!("{base}/budget/{}", entry.id),
            delete_href: format!("{base}/budget/{}/delete", entry.id),
        }
    }
}

struct CategoryRow {
    label: &'static str,
    color: &'static str,
    total: String,
    percentage: String,
}

impl From<CategoryTotal> for CategoryRow {
    fn from(total: CategoryTotal) -> Self {
        Self {
            label: total.category.label(),
            color: total.category.color(),
            total: money(total.total),
            percentage: total.percentage.to_string(),
        }
    }
}

struct DailyRow {
    date: String,
    total: String,
    count: usize,
}

impl From<DailyTotal> for DailyRow {
    fn from(daily: DailyTotal) -> Self {
        Self {
            date: daily.date.format("%m/%d %a").to_string(),
            total: money(daily.total),
            count: daily.count,
        }
    }
}

struct ExtremeRow {
    label: &'static str,
    day: DailyRow,
}

struct DayLink {
    day: u32,
    href: String,
    selected: bool,
}

struct Choice {
    value: String,
    label: String,
}

struct ClampedNotice {
    label: String,
    date: String,
    day: u32,
}

#[derive(Template)]
#[template(path = "itinerary/budget.html")]
struct BudgetTemplate {
    title: String,
    trip_href: String,
    base_href: String,
    currency: String,
    day: u32,
    day_date: String,
    day_iso: String,
    trip_start: String,
    trip_end: String,
    days: Vec<DayLink>,
    clamped: Vec<ClampedNotice>,
    entries: Vec<EntryRow>,
    day_total: String,
    day_categories: Vec<CategoryRow>,
    budget_set: bool,
    budget: String,
    budget_raw: String,
    spent: String,
    remaining: String,
    over_budget: bool,
    total: String,
    recorded_days: usize,
    average_daily: String,
    extremes: Vec<ExtremeRow>,
    top_categories: Vec<CategoryRow>,
    daily: Vec<DailyRow>,
    categories: Vec<Choice>,
    day_activities: Vec<Choice>,
}

async fn show(
    State(state): State<AppState>,
    Path((token, trip_id)): Path<(String, i64)>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    let calendar = trip.calendar()?;
    let selection = query.selection(&calendar);
    let date = calendar.date_of(selection.day());
    let base = trip_path(&token, trip.id);

    let ledger = BudgetLedger::for_trip(&calendar, state.gateway.list_budgets(trip.id).await?);
    let clamped = ledger
        .clamped()
        .iter()
        .filter_map(|notice| {
            let entry = ledger.entries().find(|entry| entry.id == notice.entry_id)?;
            Some(ClampedNotice {
                label: format!(
                    "{} {}",
                    entry.category.label(),
                    money(entry.amount)
                ),
                date: notice.date.format("%Y-%m-%d").to_string(),
                day: calendar.day_number(notice.date),
            })
        })
        .collect();
    let day_activities = state
        .gateway
        .list_activities_on(trip.id, date)
        .await?
        .into_iter()
        .map(|activity| Choice {
            value: activity.id.to_string(),
            label: format!("{} {}", activity.time_label(), activity.name),
        })
        .collect();

    let balance = ledger.balance(trip.total_budget, date);
    let summary = ledger.summary();

    Ok(AskamaTemplateResponse::into_response(BudgetTemplate {
        title: trip.title,
        trip_href: format!("{base}?day={}", selection.day()),
        currency: state.config.default_currency.clone(),
        day: selection.day(),
        day_date: date.format("%Y-%m-%d (%a)").to_string(),
        day_iso: date.format("%Y-%m-%d").to_string(),
        trip_start: calendar.start().format("%Y-%m-%d").to_string(),
        trip_end: calendar.end().format("%Y-%m-%d").to_string(),
        clamped,
        days: calendar
            .days()
            .map(|(day, _)| DayLink {
                day,
                href: format!("{base}/budget?day={day}"),
                selected: day == selection.day(),
            })
            .collect(),
        entries: ledger
            .entries_on(date)
            .iter()
            .map(|entry| EntryRow::new(entry, &base))
            .collect(),
        day_total: money(ledger.total_on(date)),
        day_categories: ledger
            .category_totals_on(date)
            .into_iter()
            .map(CategoryRow::from)
            .collect(),
        budget_set: balance.budget_set,
        budget: money(balance.budget),
        budget_raw: trip
            .total_budget
            .map(|amount| amount.normalize().to_string())
            .unwrap_or_default(),
        spent: money(balance.spent),
        remaining: money(balance.remaining),
        over_budget: balance.over_budget,
        total: money(summary.total),
        recorded_days: summary.recorded_days,
        average_daily: money(summary.average_daily),
        extremes: [
            ("Most expensive day", summary.highest_day),
            ("Cheapest day", summary.lowest_day),
        ]
        .into_iter()
        .filter_map(|(label, day)| {
            day.map(|day| ExtremeRow {
                label,
                day: DailyRow::from(day),
            })
        })
        .collect(),
        top_categories: summary
            .top_categories
            .into_iter()
            .map(CategoryRow::from)
            .collect(),
        daily: ledger.daily_totals().into_iter().map(DailyRow::from).collect(),
        categories: BudgetCategory::ALL
            .iter()
            .map(|category| Choice {
                value: category.as_str().to_string(),
                label: category.label().to_string(),
            })
            .collect(),
        day_activities,
        base_href: base,
    }))
}

#[derive(Deserialize)]
struct CeilingForm {
    #[serde(default)]
    total_budget: Option<String>,
}

async fn set_ceiling(
    State(state): State<AppState>,
    Path((token, trip_id)): Path<(String, i64)>,
    Form(form): Form<CeilingForm>,
) -> Result<Redirect, AppError> {
    let ceiling = parse_optional_amount(form.total_budget, "Budget")?;
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    state.gateway.set_trip_budget(trip.id, ceiling).await?;
    info!(trip_id = trip.id, budget = ?ceiling, "set trip budget");
    Ok(Redirect::to(&format!("{}/budget", trip_path(&token, trip.id))))
}

#[derive(Deserialize)]
struct EntryForm {
    date: String,
    #[serde(default)]
    activity_id: Option<String>,
    category: String,
    amount: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    paid_by: Option<String>,
}

impl EntryForm {
    fn into_changes(self, default_currency: &str) -> Result<BudgetChanges, AppError> {
        Ok(BudgetChanges {
            date: parse_date(&self.date, "Date")?,
            activity_id: parse_optional_id(self.activity_id, "Activity")?,
            category: self.category.parse()?,
            amount: parse_amount(&self.amount, "Amount")?,
            description: normalize_optional(self.description),
            currency: normalize_optional(self.currency)
                .map(|currency| currency.to_uppercase())
                .unwrap_or_else(|| default_currency.to_string()),
            paid_by: normalize_optional(self.paid_by),
        })
    }
}

/// Expenses are dated within the trip; anything else would sit outside
/// every day tab.
fn check_entry_date(calendar: &TripCalendar, changes: &BudgetChanges) -> Result<u32, AppError> {
    match calendar.placement(changes.date) {
        DayPlacement::InRange(day) => Ok(day),
        DayPlacement::BeforeStart | DayPlacement::AfterEnd => Err(AppError::bad_request(format!(
            "Date must be between {} and {}",
            calendar.start().format("%Y-%m-%d"),
            calendar.end().format("%Y-%m-%d")
        ))),
    }
}

/// A linked activity has to belong to the same trip.
async fn check_linked_activity(
    state: &AppState,
    trip_id: i64,
    changes: &BudgetChanges,
) -> Result<(), AppError> {
    let Some(activity_id) = changes.activity_id else {
        return Ok(());
    };
    let activities = state.gateway.list_activities(trip_id).await?;
    if activities.iter().any(|activity| activity.id == activity_id) {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

async fn ensure_entry_in_trip(
    state: &AppState,
    trip_id: i64,
    entry_id: i64,
) -> Result<(), AppError> {
    let entries = state.gateway.list_budgets(trip_id).await?;
    if entries.iter().any(|entry| entry.id == entry_id) {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

fn budget_day_path(token: &str, trip_id: i64, day: u32) -> String {
    format!("{}/budget?day={day}", trip_path(token, trip_id))
}

async fn create_entry(
    State(state): State<AppState>,
    Path((token, trip_id)): Path<(String, i64)>,
    Form(form): Form<EntryForm>,
) -> Result<Redirect, AppError> {
    let changes = form.into_changes(&state.config.default_currency)?;
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    let day = check_entry_date(&trip.calendar()?, &changes)?;
    check_linked_activity(&state, trip.id, &changes).await?;

    let entry = state
        .gateway
        .create_budget_entry(NewBudgetEntry {
            itinerary_id: trip.id,
            fields: changes,
        })
        .await?;
    info!(trip_id = trip.id, entry_id = entry.id, "created budget entry");

    Ok(Redirect::to(&budget_day_path(&token, trip.id, day)))
}

async fn update_entry(
    State(state): State<AppState>,
    Path((token, trip_id, entry_id)): Path<(String, i64, i64)>,
    Form(form): Form<EntryForm>,
) -> Result<Redirect, AppError> {
    let changes = form.into_changes(&state.config.default_currency)?;
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    ensure_entry_in_trip(&state, trip.id, entry_id).await?;
    let day = check_entry_date(&trip.calendar()?, &changes)?;
    check_linked_activity(&state, trip.id, &changes).await?;

    state.gateway.update_budget_entry(entry_id, changes).await?;
    info!(trip_id = trip.id, entry_id, "updated budget entry");

    Ok(Redirect::to(&budget_day_path(&token, trip.id, day)))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path((token, trip_id, entry_id)): Path<(String, i64, i64)>,
    Form(form): Form<ReturnDay>,
) -> Result<Redirect, AppError> {
    let (_, trip) = load_trip(&state, &token, trip_id).await?;
    ensure_entry_in_trip(&state, trip.id, entry_id).await?;
    state.gateway.delete_budget_entry(entry_id).await?;
    info!(trip_id = trip.id, entry_id, "deleted budget entry");

    Ok(Redirect::to(&budget_day_path(
        &token,
        trip.id,
        form.day.unwrap_or(1),
    )))
}

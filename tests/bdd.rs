use std::{fmt, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use cucumber::{given, then, when, World as _};
use rust_decimal::Decimal;
use tempfile::TempDir;
use travelplanner::{
    config::{AppConfig, GatewayBackend},
    db::{init_pool, run_migrations},
    gateway::sqlite::SqliteGateway,
    models::{
        activity::{ActivityChanges, NewActivity},
        budget::{BudgetChanges, NewBudgetEntry},
        group::{Group, NewGroup},
        itinerary::{Itinerary, LocationType, NewItinerary},
    },
    planner::{
        budget::BudgetLedger,
        share::itinerary_text,
        timeline::{build_timeline, Timeline},
    },
    state::AppState,
};

#[derive(Debug, cucumber::World, Default)]
struct AppWorld {
    state: Option<TestState>,
    group: Option<Group>,
    trip: Option<Itinerary>,
}

impl AppWorld {
    fn app_state(&self) -> &AppState {
        self.state
            .as_ref()
            .expect("state must be initialised first")
            .app()
    }

    fn trip(&self) -> &Itinerary {
        self.trip.as_ref().expect("a trip must exist first")
    }

    async fn refresh_trip(&mut self) {
        let id = self.trip().id;
        let trip = self.app_state().gateway.get_trip(id).await.expect("get trip");
        self.trip = Some(trip);
    }

    async fn timeline(&self) -> Timeline {
        let trip = self.trip();
        let activities = self
            .app_state()
            .gateway
            .list_activities(trip.id)
            .await
            .expect("list activities");
        build_timeline(&trip.calendar().expect("calendar"), activities)
    }

    async fn ledger(&self) -> BudgetLedger {
        let entries = self
            .app_state()
            .gateway
            .list_budgets(self.trip().id)
            .await
            .expect("list budgets");
        let calendar = self.trip().calendar().expect("calendar");
        BudgetLedger::for_trip(&calendar, entries)
    }
}

struct TestState {
    app: AppState,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;
        let db_path = root.path().join("bdd.sqlite");
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let config = AppConfig {
            database_url: database_url.clone(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            backend: GatewayBackend::Sqlite,
            gateway_timeout: Duration::from_secs(5),
            default_currency: "JPY".into(),
            google_maps_api_key: None,
        };

        let db = init_pool(&config.database_url).await?;
        run_migrations(&db).await?;

        let app = AppState::new(config, Arc::new(SqliteGateway::new(db)), None);
        Ok(Self { app, _root: root })
    }

    fn app(&self) -> &AppState {
        &self.app
    }
}

fn date(raw: &str) -> NaiveDate {
    raw.parse().expect("date")
}

fn amount(raw: &str) -> Decimal {
    raw.parse().expect("amount")
}

#[given("a fresh application state")]
async fn given_fresh_state(world: &mut AppWorld) {
    world.state = Some(TestState::new().await.expect("state"));
    world.group = None;
    world.trip = None;
}

#[given(regex = r#"^a group "([^"]+)" with a trip from "([^"]+)" to "([^"]+)"$"#)]
async fn given_group_with_trip(world: &mut AppWorld, name: String, start: String, end: String) {
    let gateway = world.app_state().gateway.clone();
    let group = gateway
        .create_group(NewGroup::new(name))
        .await
        .expect("create group");
    let trip = gateway
        .create_trip(NewItinerary {
            group_id: group.id.clone(),
            title: "Kansai".into(),
            destinations: vec!["Kyoto".into(), "Osaka".into()],
            start_date: date(&start),
            end_date: date(&end),
            travel_purposes: vec!["food".into()],
            location_type: LocationType::Domestic,
            total_budget: None,
            created_by: None,
        })
        .await
        .expect("create trip");
    world.group = Some(group);
    world.trip = Some(trip);
}

#[given(regex = r"^the trip budget is (\d+)$")]
async fn given_trip_budget(world: &mut AppWorld, budget: u64) {
    let id = world.trip().id;
    world
        .app_state()
        .gateway
        .set_trip_budget(id, Some(Decimal::from(budget)))
        .await
        .expect("set budget");
    world.refresh_trip().await;
}

#[when(regex = r#"^I add a "([^"]+)" activity "([^"]+)" on "([^"]+)" at "([^"]+)"$"#)]
async fn when_add_activity(
    world: &mut AppWorld,
    kind: String,
    name: String,
    on: String,
    at: String,
) {
    let itinerary_id = world.trip().id;
    world
        .app_state()
        .gateway
        .create_activity(NewActivity {
            itinerary_id,
            fields: ActivityChanges {
                name,
                location: String::new(),
                notes: None,
                kind: kind.parse().expect("activity kind"),
                date: date(&on),
                time: NaiveTime::parse_from_str(&at, "%H:%M").expect("time"),
                photo_url: None,
                lat: None,
                lng: None,
                place_id: None,
            },
        })
        .await
        .expect("create activity");
}

#[when(regex = r#"^I record a "([^"]+)" expense of "([^"]+)" on "([^"]+)"$"#)]
async fn when_record_expense(world: &mut AppWorld, category: String, value: String, on: String) {
    let itinerary_id = world.trip().id;
    world
        .app_state()
        .gateway
        .create_budget_entry(NewBudgetEntry {
            itinerary_id,
            fields: BudgetChanges {
                date: date(&on),
                activity_id: None,
                category: category.parse().expect("budget category"),
                amount: amount(&value),
                description: None,
                currency: "JPY".into(),
                paid_by: None,
            },
        })
        .await
        .expect("create budget entry");
}

#[then(regex = r"^the trip has (\d+) day buckets$")]
async fn then_day_buckets(world: &mut AppWorld, expected: usize) {
    assert_eq!(world.timeline().await.days.len(), expected);
}

#[then(regex = r#"^day (\d+) lists activities at "([^"]*)"$"#)]
async fn then_day_lists(world: &mut AppWorld, day: u32, times: String) {
    let timeline = world.timeline().await;
    let plan = timeline.day(day).expect("day bucket");
    let actual: Vec<String> = plan.activities.iter().map(|a| a.time_label()).collect();
    let expected: Vec<String> = times
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    assert_eq!(actual, expected);
}

#[then(regex = r"^day (\d+) has no activities$")]
async fn then_day_empty(world: &mut AppWorld, day: u32) {
    let timeline = world.timeline().await;
    assert!(timeline.day(day).expect("day bucket").activities.is_empty());
}

#[then(regex = r#"^"([^"]+)" is reported as moved onto day (\d+)$"#)]
async fn then_clamped(world: &mut AppWorld, name: String, day: u32) {
    let timeline = world.timeline().await;
    let notice = timeline
        .clamped
        .iter()
        .find(|notice| notice.name == name)
        .expect("clamped notice");
    assert_eq!(notice.assigned_day, day);
}

#[then(regex = r#"^the total on "([^"]+)" is "([^"]+)"$"#)]
async fn then_total_on(world: &mut AppWorld, on: String, expected: String) {
    assert_eq!(world.ledger().await.total_on(date(&on)), amount(&expected));
}

#[then(regex = r#"^the spend through "([^"]+)" is "([^"]+)"$"#)]
async fn then_spend_through(world: &mut AppWorld, through: String, expected: String) {
    assert_eq!(
        world.ledger().await.cumulative_through(date(&through)),
        amount(&expected)
    );
}

#[then(regex = r#"^the remaining budget through "([^"]+)" is "([^"]+)"$"#)]
async fn then_remaining(world: &mut AppWorld, through: String, expected: String) {
    let balance = world
        .ledger()
        .await
        .balance(world.trip().total_budget, date(&through));
    assert_eq!(balance.remaining, amount(&expected));
}

#[then("the trip budget is marked as not set")]
async fn then_budget_unset(world: &mut AppWorld) {
    let balance = world
        .ledger()
        .await
        .balance(world.trip().total_budget, world.trip().end_date);
    assert!(!balance.budget_set);
    assert!(balance.over_budget);
}

#[then(regex = r#"^the shared text contains "([^"]+)"$"#)]
async fn then_share_contains(world: &mut AppWorld, needle: String) {
    let text = itinerary_text(world.trip(), &world.timeline().await).unwrap();
    assert!(text.contains(&needle), "missing {needle:?} in:\n{text}");
}

#[then(regex = r#"^the group can be found by its token$"#)]
async fn then_group_by_token(world: &mut AppWorld) {
    let group = world.group.as_ref().expect("group");
    let found = world
        .app_state()
        .gateway
        .group_by_token(&group.token)
        .await
        .expect("lookup")
        .expect("group for token");
    assert_eq!(found.id, group.id);
}

#[then(regex = r#"^no group answers to the token "([^"]+)"$"#)]
async fn then_unknown_token(world: &mut AppWorld, token: String) {
    let found = world
        .app_state()
        .gateway
        .group_by_token(&token)
        .await
        .expect("lookup");
    assert!(found.is_none());
}

#[tokio::main]
async fn main() {
    AppWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}

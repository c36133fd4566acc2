use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use tracing::debug;

use super::Gateway;
use crate::{
    db::DbPool,
    error::AppError,
    models::{
        activity::{Activity, ActivityChanges, ActivityRef, NewActivity},
        budget::{BudgetChanges, BudgetEntry, NewBudgetEntry},
        group::{Group, NewGroup, Participant},
        itinerary::{Itinerary, NewItinerary},
    },
};

const ITINERARY_COLUMNS: &str = "id, group_id, title, destination, start_date, end_date, \
     travel_purpose, location_type, total_budget, created_by, updated_at";

const ACTIVITY_COLUMNS: &str =
    "id, itinerary_id, name, location, notes, type, date, time, photo_url, lat, lng, place_id";

const BUDGET_SELECT: &str = "SELECT b.id, b.itinerary_id, b.date, b.activity_id, b.category, \
     b.amount, b.description, b.currency, b.paid_by, b.created_at, \
     a.name AS activity_name, a.type AS activity_type \
     FROM budgets b LEFT JOIN activities a ON a.id = b.activity_id";

/// Gateway backed by the local SQLite database.
#[derive(Clone)]
pub struct SqliteGateway {
    db: DbPool,
}

impl SqliteGateway {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    async fn get_activity(&self, id: i64) -> Result<Activity, AppError> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        activity_from_row(&row)
    }

    async fn get_budget_entry(&self, id: i64) -> Result<BudgetEntry, AppError> {
        let sql = format!("{BUDGET_SELECT} WHERE b.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        budget_from_row(&row)
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn create_group(&self, group: NewGroup) -> Result<Group, AppError> {
        let created_at = Utc::now();
        sqlx::query("INSERT INTO groups (id, name, token, created_at) VALUES (?, ?, ?, ?)")
            .bind(&group.id)
            .bind(&group.name)
            .bind(&group.token)
            .bind(created_at)
            .execute(&self.db)
            .await?;
        debug!(group_id = %group.id, "group created");
        Ok(Group {
            id: group.id,
            name: group.name,
            token: group.token,
            created_at,
        })
    }

    async fn group_by_token(&self, token: &str) -> Result<Option<Group>, AppError> {
        let row = sqlx::query("SELECT id, name, token, created_at FROM groups WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.db)
            .await?;
        row.map(|row| -> Result<Group, AppError> {
            Ok(Group {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                token: row.try_get("token")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .transpose()
    }

    async fn list_participants(&self, group_id: &str) -> Result<Vec<Participant>, AppError> {
        let rows = sqlx::query(
            "SELECT group_id, name, created_at FROM participants WHERE group_id = ? ORDER BY created_at, name",
        )
        .bind(group_id)
        .fetch_all(&self.db)
        .await?;
        rows.iter()
            .map(|row| -> Result<Participant, AppError> {
                Ok(Participant {
                    group_id: row.try_get("group_id")?,
                    name: row.try_get("name")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn add_participant(&self, group_id: &str, name: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR IGNORE INTO participants (group_id, name, created_at) VALUES (?, ?, ?)",
        )
        .bind(group_id)
        .bind(name)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn remove_participant(&self, group_id: &str, name: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM participants WHERE group_id = ? AND name = ?")
            .bind(group_id)
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn list_itineraries(&self, group_id: &str) -> Result<Vec<Itinerary>, AppError> {
        let sql = format!(
            "SELECT {ITINERARY_COLUMNS} FROM itineraries WHERE group_id = ? ORDER BY start_date, id"
        );
        let rows = sqlx::query(&sql).bind(group_id).fetch_all(&self.db).await?;
        rows.iter().map(itinerary_from_row).collect()
    }

    async fn get_trip(&self, id: i64) -> Result<Itinerary, AppError> {
        let sql = format!("SELECT {ITINERARY_COLUMNS} FROM itineraries WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        itinerary_from_row(&row)
    }

    async fn create_trip(&self, trip: NewItinerary) -> Result<Itinerary, AppError> {
        trip.validate()?;
        let result = sqlx::query(
            r#"INSERT INTO itineraries
                (group_id, title, destination, start_date, end_date, travel_purpose,
                 location_type, total_budget, created_by, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&trip.group_id)
        .bind(&trip.title)
        .bind(trip.destination())
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(trip.travel_purpose())
        .bind(trip.location_type.as_str())
        .bind(trip.total_budget.map(|budget| budget.to_string()))
        .bind(&trip.created_by)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;
        let id = result.last_insert_rowid();
        debug!(itinerary_id = id, group_id = %trip.group_id, "trip created");
        self.get_trip(id).await
    }

    async fn set_trip_budget(
        &self,
        id: i64,
        total_budget: Option<Decimal>,
    ) -> Result<Itinerary, AppError> {
        let result =
            sqlx::query("UPDATE itineraries SET total_budget = ?, updated_at = ? WHERE id = ?")
                .bind(total_budget.map(|budget| budget.to_string()))
                .bind(Utc::now())
                .bind(id)
                .execute(&self.db)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        self.get_trip(id).await
    }

    async fn list_activities(&self, itinerary_id: i64) -> Result<Vec<Activity>, AppError> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE itinerary_id = ? ORDER BY date, time, id"
        );
        let rows = sqlx::query(&sql)
            .bind(itinerary_id)
            .fetch_all(&self.db)
            .await?;
        rows.iter().map(activity_from_row).collect()
    }

    async fn list_activities_on(
        &self,
        itinerary_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Activity>, AppError> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE itinerary_id = ? AND date = ? ORDER BY time, id"
        );
        let rows = sqlx::query(&sql)
            .bind(itinerary_id)
            .bind(date)
            .fetch_all(&self.db)
            .await?;
        rows.iter().map(activity_from_row).collect()
    }

    async fn create_activity(&self, activity: NewActivity) -> Result<Activity, AppError> {
        let f = &activity.fields;
        let result = sqlx::query(
            r#"INSERT INTO activities
                (itinerary_id, name, location, notes, type, date, time, photo_url, lat, lng, place_id)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(activity.itinerary_id)
        .bind(&f.name)
        .bind(&f.location)
        .bind(&f.notes)
        .bind(f.kind.as_str())
        .bind(f.date)
        .bind(f.time)
        .bind(&f.photo_url)
        .bind(f.lat)
        .bind(f.lng)
        .bind(&f.place_id)
        .execute(&self.db)
        .await?;
        let id = result.last_insert_rowid();
        debug!(activity_id = id, itinerary_id = activity.itinerary_id, "activity created");
        self.get_activity(id).await
    }

    async fn update_activity(
        &self,
        id: i64,
        changes: ActivityChanges,
    ) -> Result<Activity, AppError> {
        let result = sqlx::query(
            r#"UPDATE activities
               SET name = ?, location = ?, notes = ?, type = ?, date = ?, time = ?,
                   photo_url = ?, lat = ?, lng = ?, place_id = ?
               WHERE id = ?"#,
        )
        .bind(&changes.name)
        .bind(&changes.location)
        .bind(&changes.notes)
        .bind(changes.kind.as_str())
        .bind(changes.date)
        .bind(changes.time)
        .bind(&changes.photo_url)
        .bind(changes.lat)
        .bind(changes.lng)
        .bind(&changes.place_id)
        .bind(id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        debug!(activity_id = id, "activity updated");
        self.get_activity(id).await
    }

    async fn delete_activity(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        debug!(activity_id = id, "activity deleted");
        Ok(())
    }

    async fn list_budgets(&self, itinerary_id: i64) -> Result<Vec<BudgetEntry>, AppError> {
        let sql = format!(
            "{BUDGET_SELECT} WHERE b.itinerary_id = ? ORDER BY b.date ASC, b.created_at DESC, b.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(itinerary_id)
            .fetch_all(&self.db)
            .await?;
        rows.iter().map(budget_from_row).collect()
    }

    async fn create_budget_entry(&self, entry: NewBudgetEntry) -> Result<BudgetEntry, AppError> {
        let f = &entry.fields;
        let result = sqlx::query(
            r#"INSERT INTO budgets
                (itinerary_id, date, activity_id, category, amount, description, currency, paid_by, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.itinerary_id)
        .bind(f.date)
        .bind(f.activity_id)
        .bind(f.category.as_str())
        .bind(f.amount.to_string())
        .bind(&f.description)
        .bind(&f.currency)
        .bind(&f.paid_by)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;
        let id = result.last_insert_rowid();
        debug!(budget_id = id, itinerary_id = entry.itinerary_id, "budget entry created");
        self.get_budget_entry(id).await
    }

    async fn update_budget_entry(
        &self,
        id: i64,
        changes: BudgetChanges,
    ) -> Result<BudgetEntry, AppError> {
        let result = sqlx::query(
            r#"UPDATE budgets
               SET date = ?, activity_id = ?, category = ?, amount = ?, description = ?,
                   currency = ?, paid_by = ?
               WHERE id = ?"#,
        )
        .bind(changes.date)
        .bind(changes.activity_id)
        .bind(changes.category.as_str())
        .bind(changes.amount.to_string())
        .bind(&changes.description)
        .bind(&changes.currency)
        .bind(&changes.paid_by)
        .bind(id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        debug!(budget_id = id, "budget entry updated");
        self.get_budget_entry(id).await
    }

    async fn delete_budget_entry(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        debug!(budget_id = id, "budget entry deleted");
        Ok(())
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, AppError> {
    raw.parse::<Decimal>()
        .map_err(|err| AppError::Other(anyhow!("stored amount `{raw}` is not a decimal: {err}")))
}

fn itinerary_from_row(row: &SqliteRow) -> Result<Itinerary, AppError> {
    Ok(Itinerary {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        title: row.try_get("title")?,
        destination: row.try_get("destination")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        travel_purpose: row.try_get("travel_purpose")?,
        location_type: row.try_get::<String, _>("location_type")?.parse()?,
        total_budget: row
            .try_get::<Option<String>, _>("total_budget")?
            .as_deref()
            .map(parse_decimal)
            .transpose()?,
        created_by: row.try_get("created_by")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn activity_from_row(row: &SqliteRow) -> Result<Activity, AppError> {
    Ok(Activity {
        id: row.try_get("id")?,
        itinerary_id: row.try_get("itinerary_id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        notes: row.try_get("notes")?,
        kind: row.try_get::<String, _>("type")?.parse()?,
        date: row.try_get("date")?,
        time: row.try_get("time")?,
        photo_url: row.try_get("photo_url")?,
        lat: row.try_get("lat")?,
        lng: row.try_get("lng")?,
        place_id: row.try_get("place_id")?,
    })
}

fn budget_from_row(row: &SqliteRow) -> Result<BudgetEntry, AppError> {
    let activity_id: Option<i64> = row.try_get("activity_id")?;
    let activity_name: Option<String> = row.try_get("activity_name")?;
    let activity_type: Option<String> = row.try_get("activity_type")?;
    let activity = match (activity_id, activity_name, activity_type) {
        (Some(id), Some(name), Some(kind)) => Some(ActivityRef {
            id,
            name,
            kind: kind.parse()?,
        }),
        _ => None,
    };
    Ok(BudgetEntry {
        id: row.try_get("id")?,
        itinerary_id: row.try_get("itinerary_id")?,
        date: row.try_get("date")?,
        activity_id,
        activity,
        category: row.try_get::<String, _>("category")?.parse()?,
        amount: parse_decimal(&row.try_get::<String, _>("amount")?)?,
        description: row.try_get("description")?,
        currency: row.try_get("currency")?,
        paid_by: row.try_get("paid_by")?,
        created_at: row.try_get("created_at")?,
    })
}

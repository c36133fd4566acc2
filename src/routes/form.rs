//! Parsing of submitted form fields. Everything here runs before the
//! gateway is touched, so a bad field never produces a partial write.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{
        budget::MAX_AMOUNT,
        itinerary::{LocationType, NewItinerary},
    },
};

pub(crate) fn normalize_optional(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub(crate) fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(format!("{field} must be a date like 2025-03-15")))
}

/// Accepts `HH:MM` from time inputs and `HH:MM:SS` from stored values.
pub(crate) fn parse_time(raw: &str, field: &str) -> Result<NaiveTime, AppError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::bad_request(format!("{field} must be a time like 09:30")))
}

pub(crate) fn parse_amount(raw: &str, field: &str) -> Result<Decimal, AppError> {
    let cleaned: String = required(raw, field)?
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    let amount: Decimal = cleaned
        .parse()
        .map_err(|_| AppError::bad_request(format!("{field} must be a number")))?;
    if amount.is_sign_negative() {
        return Err(AppError::bad_request(format!("{field} cannot be negative")));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(AppError::bad_request(format!(
            "{field} cannot exceed {MAX_AMOUNT}"
        )));
    }
    Ok(amount)
}

pub(crate) fn parse_optional_amount(
    raw: Option<String>,
    field: &str,
) -> Result<Option<Decimal>, AppError> {
    normalize_optional(raw)
        .map(|value| parse_amount(&value, field))
        .transpose()
}

pub(crate) fn parse_optional_coordinate(
    raw: Option<String>,
    field: &str,
    limit: f64,
) -> Result<Option<f64>, AppError> {
    let Some(value) = normalize_optional(raw) else {
        return Ok(None);
    };
    let parsed: f64 = value
        .parse()
        .map_err(|_| AppError::bad_request(format!("{field} must be a number")))?;
    if !parsed.is_finite() || parsed.abs() > limit {
        return Err(AppError::bad_request(format!(
            "{field} must be between -{limit} and {limit}"
        )));
    }
    Ok(Some(parsed))
}

pub(crate) fn parse_optional_id(raw: Option<String>, field: &str) -> Result<Option<i64>, AppError> {
    normalize_optional(raw)
        .map(|value| {
            value
                .parse::<i64>()
                .map_err(|_| AppError::bad_request(format!("{field} is not a valid id")))
        })
        .transpose()
}

/// Splits comma or newline separated input, dropping blanks.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trip fields shared by the group creation page and the "add trip" form.
#[derive(Debug, Deserialize)]
pub(crate) struct TripForm {
    pub title: String,
    #[serde(default)]
    pub destinations: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub travel_purposes: String,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub total_budget: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl TripForm {
    pub(crate) fn into_new_itinerary(self, group_id: &str) -> Result<NewItinerary, AppError> {
        let location_type = match normalize_optional(self.location_type) {
            Some(raw) => raw.parse::<LocationType>()?,
            None => LocationType::default(),
        };
        let trip = NewItinerary {
            group_id: group_id.to_string(),
            title: required(&self.title, "Trip title")?,
            destinations: split_list(&self.destinations),
            start_date: parse_date(&self.start_date, "Start date")?,
            end_date: parse_date(&self.end_date, "End date")?,
            travel_purposes: split_list(&self.travel_purposes),
            location_type,
            total_budget: parse_optional_amount(self.total_budget, "Budget")?,
            created_by: normalize_optional(self.created_by),
        };
        trip.validate()?;
        Ok(trip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip_form(start: &str, end: &str) -> TripForm {
        TripForm {
            title: " Kansai ".into(),
            destinations: "Kyoto, Osaka,\nNara".into(),
            start_date: start.into(),
            end_date: end.into(),
            travel_purposes: String::new(),
            location_type: Some("overseas".into()),
            total_budget: Some("50,000".into()),
            created_by: Some("  ".into()),
        }
    }

    #[test]
    fn trip_form_parses_lists_and_budget() {
        let trip = trip_form("2025-03-15", "2025-03-17")
            .into_new_itinerary("g1")
            .unwrap();
        assert_eq!(trip.title, "Kansai");
        assert_eq!(trip.destination(), "Kyoto, Osaka, Nara");
        assert_eq!(trip.location_type, LocationType::Overseas);
        assert_eq!(trip.total_budget, Some(Decimal::from(50_000)));
        assert_eq!(trip.created_by, None);
    }

    #[test]
    fn trip_form_rejects_reversed_range() {
        let err = trip_form("2025-03-17", "2025-03-15")
            .into_new_itinerary("g1")
            .unwrap_err();
        assert!(matches!(err, AppError::Planner(_)));
    }

    #[test]
    fn field_parsers_reject_garbage() {
        assert!(parse_date("15/03/2025", "Date").is_err());
        assert_eq!(
            parse_time("9:05", "Time").unwrap(),
            NaiveTime::from_hms_opt(9, 5, 0).unwrap()
        );
        assert!(parse_time("25:00", "Time").is_err());
        assert!(parse_amount("", "Amount").is_err());
        assert!(parse_amount("-5", "Amount").is_err());
        assert!(parse_amount("1000000000000000000000000000", "Amount").is_err());
        assert!(parse_amount("99999999999999999999999999999999", "Amount").is_err());
        assert_eq!(
            parse_amount("1,000,000,000,000", "Amount").unwrap(),
            Decimal::from(MAX_AMOUNT)
        );
        assert!(parse_amount("1000000000000.01", "Amount").is_err());
        assert!(parse_optional_coordinate(Some("95".into()), "Latitude", 90.0).is_err());
        assert_eq!(
            parse_optional_coordinate(Some(" ".into()), "Latitude", 90.0).unwrap(),
            None
        );
    }
}

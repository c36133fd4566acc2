//! Google Places lookups used to fill in coordinates and photos for
//! activities that carry a `place_id`.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::AppError;

const DETAILS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const PHOTO_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place/photo";
const PHOTO_MAX_WIDTH: u32 = 800;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetails {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub photo_url: Option<String>,
}

#[derive(Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<DetailsResult>,
}

#[derive(Deserialize)]
struct DetailsResult {
    #[serde(default)]
    name: String,
    geometry: Geometry,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct Photo {
    photo_reference: String,
}

#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
}

impl PlacesClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key })
    }

    pub async fn details(&self, place_id: &str) -> Result<PlaceDetails, AppError> {
        debug!(place_id, "place details lookup");
        let response: DetailsResponse = self
            .client
            .get(DETAILS_ENDPOINT)
            .query(&[
                ("place_id", place_id),
                ("fields", "name,geometry,photos"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        self.into_details(response)
    }

    fn into_details(&self, response: DetailsResponse) -> Result<PlaceDetails, AppError> {
        if response.status != "OK" {
            let reason = response.error_message.unwrap_or_default();
            return Err(AppError::Gateway(format!(
                "places lookup returned {}: {reason}",
                response.status
            )));
        }
        let result = response
            .result
            .ok_or_else(|| AppError::Gateway("places lookup returned no result".into()))?;
        let photo_url = result
            .photos
            .first()
            .map(|photo| self.photo_url(&photo.photo_reference))
            .transpose()?;

        Ok(PlaceDetails {
            name: result.name,
            lat: result.geometry.location.lat,
            lng: result.geometry.location.lng,
            photo_url,
        })
    }

    fn photo_url(&self, reference: &str) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            PHOTO_ENDPOINT,
            &[
                ("maxwidth", PHOTO_MAX_WIDTH.to_string().as_str()),
                ("photo_reference", reference),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|err| AppError::Config(format!("invalid places photo url: {err}")))?;
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PlacesClient {
        PlacesClient::new("test-key".into(), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn parses_details_with_photo() {
        let response: DetailsResponse = serde_json::from_value(serde_json::json!({
            "status": "OK",
            "result": {
                "name": "Kinkaku-ji",
                "geometry": { "location": { "lat": 35.0394, "lng": 135.7292 } },
                "photos": [{ "photo_reference": "abc123", "height": 600, "width": 800 }]
            }
        }))
        .unwrap();

        let details = client().into_details(response).unwrap();
        assert_eq!(details.name, "Kinkaku-ji");
        assert_eq!((details.lat, details.lng), (35.0394, 135.7292));
        let photo = details.photo_url.unwrap();
        assert!(photo.starts_with(PHOTO_ENDPOINT));
        assert!(photo.contains("photo_reference=abc123"));
    }

    #[test]
    fn non_ok_status_is_an_error() {
        let response: DetailsResponse = serde_json::from_value(serde_json::json!({
            "status": "INVALID_REQUEST",
            "error_message": "missing place_id"
        }))
        .unwrap();
        assert!(matches!(
            client().into_details(response),
            Err(AppError::Gateway(_))
        ));
    }
}

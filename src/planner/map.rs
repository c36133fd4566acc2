use serde::Serialize;

use super::timeline::DayPlan;
use crate::models::activity::ActivityKind;

/// Shown when a day has nothing to pin.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 35.6762,
    lng: 139.6503,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub order: usize,
    pub activity_id: i64,
    pub name: String,
    pub kind: ActivityKind,
    pub time: String,
    pub position: LatLng,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub day: u32,
    pub markers: Vec<Marker>,
    pub bounds: Option<Bounds>,
    pub center: LatLng,
}

/// Pins for one day, numbered in itinerary order. Activities without both
/// coordinates are skipped.
pub fn day_markers(plan: &DayPlan) -> MapView {
    let markers: Vec<Marker> = plan
        .activities
        .iter()
        .filter_map(|activity| {
            activity
                .coordinates()
                .map(|(lat, lng)| (activity, LatLng { lat, lng }))
        })
        .enumerate()
        .map(|(index, (activity, position))| Marker {
            order: index + 1,
            activity_id: activity.id,
            name: activity.name.clone(),
            kind: activity.kind,
            time: activity.time_label(),
            position,
            photo_url: activity.photo_url.clone(),
        })
        .collect();

    let bounds = markers.iter().fold(None::<Bounds>, |acc, marker| {
        let p = marker.position;
        Some(match acc {
            None => Bounds {
                south_west: p,
                north_east: p,
            },
            Some(b) => Bounds {
                south_west: LatLng {
                    lat: b.south_west.lat.min(p.lat),
                    lng: b.south_west.lng.min(p.lng),
                },
                north_east: LatLng {
                    lat: b.north_east.lat.max(p.lat),
                    lng: b.north_east.lng.max(p.lng),
                },
            },
        })
    });

    MapView {
        day: plan.day,
        center: bounds.map(|b| b.center()).unwrap_or(DEFAULT_CENTER),
        markers,
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::Activity;
    use chrono::NaiveTime;

    fn activity(id: i64, time: &str, coords: Option<(f64, f64)>) -> Activity {
        Activity {
            id,
            itinerary_id: 1,
            name: format!("spot {id}"),
            location: String::new(),
            notes: None,
            kind: ActivityKind::Sightseeing,
            date: "2025-03-15".parse().unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            photo_url: None,
            lat: coords.map(|c| c.0),
            lng: coords.map(|c| c.1),
            place_id: None,
        }
    }

    #[test]
    fn markers_skip_unlocated_activities_and_keep_order() {
        let plan = DayPlan {
            day: 1,
            date: "2025-03-15".parse().unwrap(),
            activities: vec![
                activity(1, "08:00", Some((35.0, 135.0))),
                activity(2, "09:00", None),
                activity(3, "10:00", Some((36.0, 137.0))),
            ],
        };
        let view = day_markers(&plan);
        let pins: Vec<(usize, i64)> = view.markers.iter().map(|m| (m.order, m.activity_id)).collect();
        assert_eq!(pins, vec![(1, 1), (2, 3)]);
        let bounds = view.bounds.unwrap();
        assert_eq!(bounds.south_west, LatLng { lat: 35.0, lng: 135.0 });
        assert_eq!(bounds.north_east, LatLng { lat: 36.0, lng: 137.0 });
        assert_eq!(view.center, LatLng { lat: 35.5, lng: 136.0 });
    }

    #[test]
    fn empty_day_centers_on_default() {
        let plan = DayPlan {
            day: 2,
            date: "2025-03-16".parse().unwrap(),
            activities: vec![activity(1, "08:00", None)],
        };
        let view = day_markers(&plan);
        assert!(view.markers.is_empty());
        assert!(view.bounds.is_none());
        assert_eq!(view.center, DEFAULT_CENTER);
    }
}

//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GPS fix as reported by a location provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A visit row as the record store returns it. Immutable once written; the
/// store owns `id` and `created_at`.
#[derive(Debug, Clone, Deserialize)]
pub struct VisitRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub nickname: Option<String>,
    pub message: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub photo_url: String,
}

impl VisitRecord {
    /// Coordinates are written as a pair, but stay defensive when reading:
    /// a lone latitude or longitude counts as no location.
    pub fn location(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Pending visit payload, owned by the client until the insert succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct NewVisit {
    pub tracking_code: String,
    pub nickname: Option<String>,
    pub message: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub photo_url: String,
}

/// Trim free text; empty input becomes absent rather than an empty string.
pub fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_and_drops_blank_input() {
        assert_eq!(non_empty("  CacheChaser42 "), Some("CacheChaser42".into()));
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("   "), None);
    }

    #[test]
    fn location_requires_both_coordinates() {
        let mut visit = VisitRecord {
            id: 1,
            created_at: Utc::now(),
            nickname: None,
            message: None,
            lat: Some(47.62),
            lon: None,
            photo_url: "https://example.com/p.jpg".into(),
        };
        assert_eq!(visit.location(), None);

        visit.lon = Some(-122.35);
        let coords = visit.location().expect("both coordinates set");
        assert_eq!(coords.latitude, 47.62);
        assert_eq!(coords.longitude, -122.35);
    }

    #[test]
    fn absent_fields_serialize_as_nulls() {
        let visit = NewVisit {
            tracking_code: "D98MYP".into(),
            nickname: None,
            message: None,
            lat: None,
            lon: None,
            photo_url: "https://example.com/p.jpg".into(),
        };
        let json = serde_json::to_value(&visit).expect("serialize payload");
        assert_eq!(json["nickname"], serde_json::Value::Null);
        assert_eq!(json["message"], serde_json::Value::Null);
        assert_eq!(json["lat"], serde_json::Value::Null);
        assert_eq!(json["tracking_code"], "D98MYP");
    }

    #[test]
    fn rows_deserialize_from_rest_payloads() {
        let json = r#"{
            "id": 7,
            "created_at": "2026-08-01T18:30:00+00:00",
            "nickname": "CacheChaser42",
            "message": null,
            "lat": null,
            "lon": null,
            "photo_url": "https://example.com/7.jpg"
        }"#;
        let visit: VisitRecord = serde_json::from_str(json).expect("deserialize row");
        assert_eq!(visit.id, 7);
        assert_eq!(visit.nickname.as_deref(), Some("CacheChaser42"));
        assert_eq!(visit.message, None);
        assert_eq!(visit.location(), None);
    }
}

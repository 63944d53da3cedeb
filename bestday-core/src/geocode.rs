//! Place name to coordinates, with a fixed fallback when the lookup fails.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt::Debug;

use crate::{
    error::SourceError,
    model::Coordinates,
    source::{coerce_f64, get_json},
};

pub const FALLBACK_CITY: &str = "Cairo";
pub const FALLBACK_COORDINATES: Coordinates = Coordinates::new(30.0444, 31.2357);

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn locate(&self, place: &str) -> Result<Coordinates, SourceError>;
}

/// Forward search against Nominatim (OpenStreetMap).
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn locate(&self, place: &str) -> Result<Coordinates, SourceError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));

        let body = get_json(
            &self.http,
            &url,
            &[
                ("q", place.to_string()),
                ("format", "json".to_string()),
                ("limit", "1".to_string()),
            ],
        )
        .await?;

        parse_first_hit(&body)
    }
}

fn parse_first_hit(body: &Value) -> Result<Coordinates, SourceError> {
    let hit = body
        .as_array()
        .and_then(|hits| hits.first())
        .ok_or_else(|| SourceError::Malformed("no geocoding result".into()))?;

    match (coerce_f64(hit.get("lat")), coerce_f64(hit.get("lon"))) {
        (Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
        _ => Err(SourceError::Malformed("geocoding result lacks lat/lon".into())),
    }
}

/// Resolves a place, never failing: lookup errors yield the fallback coordinate.
#[derive(Debug)]
pub struct GeoResolver {
    geocoder: Box<dyn Geocoder>,
    fallback: Coordinates,
}

impl GeoResolver {
    pub fn new(geocoder: Box<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            fallback: FALLBACK_COORDINATES,
        }
    }

    pub async fn resolve(&self, place: &str) -> Coordinates {
        match self.geocoder.locate(place).await {
            Ok(coordinates) => {
                tracing::debug!(place, ?coordinates, "geocoded");
                coordinates
            }
            Err(error) => {
                tracing::warn!(
                    place,
                    %error,
                    "geocoding failed, falling back to {FALLBACK_CITY}"
                );
                self.fallback
            }
        }
    }
}

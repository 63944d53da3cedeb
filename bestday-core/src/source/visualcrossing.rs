use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::SourceError,
    model::{Coordinates, DateRange, RawDayReading},
};

use super::{DailySource, ServiceId, coerce_f64, get_json};

/// Visual Crossing timeline API, one entry per requested day.
#[derive(Debug, Clone)]
pub struct VisualCrossingSource {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl VisualCrossingSource {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, http: Client) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http,
        }
    }
}

#[async_trait]
impl DailySource for VisualCrossingSource {
    fn id(&self) -> ServiceId {
        ServiceId::VisualCrossing
    }

    async fn fetch_daily(
        &self,
        coordinates: Coordinates,
        range: DateRange,
    ) -> Result<Vec<RawDayReading>, SourceError> {
        let api_key = self.api_key.as_deref().ok_or(SourceError::MissingApiKey)?;

        let url = format!(
            "{}/VisualCrossingWebServices/rest/services/timeline/{},{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            coordinates.latitude,
            coordinates.longitude,
            range.start().format("%Y-%m-%d"),
            range.end().format("%Y-%m-%d"),
        );

        let body = get_json(
            &self.http,
            &url,
            &[
                ("unitGroup", "metric".to_string()),
                ("include", "days".to_string()),
                ("key", api_key.to_string()),
            ],
        )
        .await?;

        parse_days(&body)
    }
}

fn parse_days(body: &Value) -> Result<Vec<RawDayReading>, SourceError> {
    let days = body
        .get("days")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Malformed("Visual Crossing response has no `days` array".into()))?;

    Ok(days
        .iter()
        .map(|day| RawDayReading {
            temperature: coerce_f64(day.get("temp")),
            precipitation: coerce_f64(day.get("precip")),
            // Metric unit group reports km/h.
            wind_speed: coerce_f64(day.get("windspeed")).map(|kph| kph / 3.6),
            snow: None,
        })
        .collect())
}

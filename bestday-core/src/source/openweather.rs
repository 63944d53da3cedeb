use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::SourceError,
    model::{Coordinates, DateRange, RawDayReading},
};

use super::{DailySource, ServiceId, coerce_f64, get_json};

/// Normals carry no wind; this calm value stands in.
const NORMALS_WIND_SPEED: f64 = 3.0;

/// OpenWeather monthly climate normals.
///
/// The endpoint ignores the date range; entries are consumed by day index
/// like every other source.
#[derive(Debug, Clone)]
pub struct OpenWeatherNormalsSource {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherNormalsSource {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, http: Client) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http,
        }
    }
}

#[async_trait]
impl DailySource for OpenWeatherNormalsSource {
    fn id(&self) -> ServiceId {
        ServiceId::OpenWeather
    }

    async fn fetch_daily(
        &self,
        coordinates: Coordinates,
        _range: DateRange,
    ) -> Result<Vec<RawDayReading>, SourceError> {
        let api_key = self.api_key.as_deref().ok_or(SourceError::MissingApiKey)?;

        let url = format!("{}/data/2.5/climate/month", self.base_url.trim_end_matches('/'));

        let body = get_json(
            &self.http,
            &url,
            &[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ],
        )
        .await?;

        parse_months(&body)
    }
}

fn parse_months(body: &Value) -> Result<Vec<RawDayReading>, SourceError> {
    let months = body
        .get("list")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Malformed("OpenWeather climate response has no `list`".into()))?;

    Ok(months
        .iter()
        .map(|month| RawDayReading {
            temperature: coerce_f64(month.pointer("/temp/average")),
            precipitation: coerce_f64(month.get("rain")),
            wind_speed: Some(NORMALS_WIND_SPEED),
            snow: None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_monthly_normals() {
        let body = json!({
            "list": [
                {"temp": {"average": 14.2}, "rain": 4.5},
                {"temp": {}, "rain": "x"}
            ]
        });

        let months = parse_months(&body).unwrap();
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].temperature, Some(14.2));
        assert_eq!(months[0].precipitation, Some(4.5));
        assert_eq!(months[0].wind_speed, Some(NORMALS_WIND_SPEED));
        assert_eq!(months[1].temperature, None);
        assert_eq!(months[1].precipitation, None);
    }

    #[test]
    fn unauthorized_payload_is_malformed() {
        let err = parse_months(&json!({"cod": 401, "message": "Invalid API key"})).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }
}

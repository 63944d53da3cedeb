use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::SourceError,
    model::{Coordinates, DateRange, RawDayReading},
};

use super::{DailySource, ServiceId, coerce_f64, get_json};

/// POWER marks days it has no value for with this number.
const FILL_VALUE: f64 = -999.0;

/// NASA POWER daily point API. No key required.
#[derive(Debug, Clone)]
pub struct NasaPowerSource {
    base_url: String,
    http: Client,
}

impl NasaPowerSource {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[async_trait]
impl DailySource for NasaPowerSource {
    fn id(&self) -> ServiceId {
        ServiceId::NasaPower
    }

    async fn fetch_daily(
        &self,
        coordinates: Coordinates,
        range: DateRange,
    ) -> Result<Vec<RawDayReading>, SourceError> {
        let url = format!(
            "{}/api/temporal/daily/point",
            self.base_url.trim_end_matches('/')
        );

        let body = get_json(
            &self.http,
            &url,
            &[
                ("parameters", "T2M,PRECTOTCORR,WS10M".to_string()),
                ("community", "AG".to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("latitude", coordinates.latitude.to_string()),
                ("start", range.start().format("%Y%m%d").to_string()),
                ("end", range.end().format("%Y%m%d").to_string()),
                ("format", "JSON".to_string()),
            ],
        )
        .await?;

        parse_parameters(&body)
    }
}

/// Each parameter is an object keyed by `YYYYMMDD`; keys sort chronologically.
fn parse_parameters(body: &Value) -> Result<Vec<RawDayReading>, SourceError> {
    let parameters = body
        .pointer("/properties/parameter")
        .and_then(Value::as_object)
        .ok_or_else(|| SourceError::Malformed("POWER response has no properties.parameter".into()))?;

    let series = |name: &str| -> Vec<Option<f64>> {
        parameters
            .get(name)
            .and_then(Value::as_object)
            .map(|values| {
                let mut entries: Vec<_> = values.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                entries
                    .into_iter()
                    .map(|(_, v)| coerce_f64(Some(v)).filter(|n| *n != FILL_VALUE))
                    .collect()
            })
            .unwrap_or_default()
    };

    let temperatures = series("T2M");
    let precipitation = series("PRECTOTCORR");
    let wind = series("WS10M");

    Ok(temperatures
        .iter()
        .enumerate()
        .map(|(i, temperature)| RawDayReading {
            temperature: *temperature,
            precipitation: precipitation.get(i).copied().flatten(),
            wind_speed: wind.get(i).copied().flatten(),
            snow: None,
        })
        .collect())
}

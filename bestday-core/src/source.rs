use crate::{
    Config,
    error::SourceError,
    model::{BiasAdjustment, Coordinates, DateRange, Probabilities, RawDayReading},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::{fmt::Debug, time::Duration};

pub mod nasa_power;
pub mod openweather;
pub mod seasonal;
pub mod visualcrossing;

pub use nasa_power::NasaPowerSource;
pub use openweather::OpenWeatherNormalsSource;
pub use seasonal::{CfsBiasModel, IriOutlook};
pub use visualcrossing::VisualCrossingSource;

const USER_AGENT: &str = concat!("bestday/", env!("CARGO_PKG_VERSION"));

/// External services the core talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    VisualCrossing,
    NasaPower,
    OpenWeather,
    Nominatim,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::VisualCrossing => "visualcrossing",
            ServiceId::NasaPower => "nasapower",
            ServiceId::OpenWeather => "openweather",
            ServiceId::Nominatim => "nominatim",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[
            ServiceId::VisualCrossing,
            ServiceId::NasaPower,
            ServiceId::OpenWeather,
            ServiceId::Nominatim,
        ]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ServiceId::VisualCrossing => "https://weather.visualcrossing.com",
            ServiceId::NasaPower => "https://power.larc.nasa.gov",
            ServiceId::OpenWeather => "http://api.openweathermap.org",
            ServiceId::Nominatim => "https://nominatim.openstreetmap.org",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ServiceId::VisualCrossing | ServiceId::OpenWeather)
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "visualcrossing" => Ok(ServiceId::VisualCrossing),
            "nasapower" => Ok(ServiceId::NasaPower),
            "openweather" => Ok(ServiceId::OpenWeather),
            "nominatim" => Ok(ServiceId::Nominatim),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: visualcrossing, nasapower, openweather, nominatim."
            )),
        }
    }
}

/// A provider of daily readings aligned to the requested dates.
#[async_trait]
pub trait DailySource: Send + Sync + Debug {
    fn id(&self) -> ServiceId;

    async fn fetch_daily(
        &self,
        coordinates: Coordinates,
        range: DateRange,
    ) -> Result<Vec<RawDayReading>, SourceError>;
}

/// Correction applied uniformly to one fusion run.
#[async_trait]
pub trait BiasModel: Send + Sync + Debug {
    async fn bias(&self, coordinates: Coordinates) -> Result<BiasAdjustment, SourceError>;
}

/// Above-normal probabilities attached to every fused day.
#[async_trait]
pub trait OutlookModel: Send + Sync + Debug {
    async fn probabilities(&self, coordinates: Coordinates) -> Result<Probabilities, SourceError>;
}

/// Shared HTTP client: fixed timeout, no retries.
pub fn http_client(timeout: Duration) -> Result<Client, SourceError> {
    Ok(Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?)
}

/// The three daily adapters in the order `(secondary, primary, normals)`.
pub fn daily_sources_from_config(
    config: &Config,
    http: &Client,
) -> (VisualCrossingSource, NasaPowerSource, OpenWeatherNormalsSource) {
    (
        VisualCrossingSource::new(
            config.provider_api_key(ServiceId::VisualCrossing).map(str::to_owned),
            config.base_url(ServiceId::VisualCrossing),
            http.clone(),
        ),
        NasaPowerSource::new(config.base_url(ServiceId::NasaPower), http.clone()),
        OpenWeatherNormalsSource::new(
            config.provider_api_key(ServiceId::OpenWeather).map(str::to_owned),
            config.base_url(ServiceId::OpenWeather),
            http.clone(),
        ),
    )
}

/// Parse-or-give-up for provider numbers: JSON numbers and numeric strings
/// are accepted, anything else (absent, null, text, NaN) is `None`.
pub fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// GET `url` and decode the body as JSON, mapping non-2xx to `SourceError::Status`.
pub(crate) async fn get_json(
    http: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<Value, SourceError> {
    let res = http.get(url).query(query).send().await?;

    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(SourceError::Status {
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| SourceError::Malformed(e.to_string()))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

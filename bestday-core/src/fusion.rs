//! Merges the daily sources into one reading per calendar day.
//!
//! Priority per day index is secondary, then primary, then normals, then the
//! seasonal heuristic. A failing source contributes nothing; it never aborts
//! the run.

use chrono::NaiveDate;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    Config,
    model::{
        AirQuality, BiasAdjustment, Coordinates, DateRange, FusedDay, Probabilities, RawDayReading,
    },
    source::{
        BiasModel, CfsBiasModel, DailySource, IriOutlook, OutlookModel, ServiceId,
        daily_sources_from_config,
    },
};

const DEFAULT_TEMPERATURE: f64 = 20.0;
const DEFAULT_PRECIPITATION: f64 = 0.0;
const DEFAULT_WIND_SPEED: f64 = 3.0;

/// Result of one fusion run, including which sources were unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionReport {
    pub days: Vec<FusedDay>,
    pub unavailable: Vec<ServiceId>,
}

#[derive(Debug)]
pub struct WeatherFusion {
    secondary: Box<dyn DailySource>,
    primary: Box<dyn DailySource>,
    normals: Box<dyn DailySource>,
    bias: Box<dyn BiasModel>,
    outlook: Box<dyn OutlookModel>,
}

impl WeatherFusion {
    pub fn new(
        secondary: Box<dyn DailySource>,
        primary: Box<dyn DailySource>,
        normals: Box<dyn DailySource>,
        bias: Box<dyn BiasModel>,
        outlook: Box<dyn OutlookModel>,
    ) -> Self {
        Self {
            secondary,
            primary,
            normals,
            bias,
            outlook,
        }
    }

    pub fn from_config(config: &Config, http: &Client) -> Self {
        let (secondary, primary, normals) = daily_sources_from_config(config, http);
        Self::new(
            Box::new(secondary),
            Box::new(primary),
            Box::new(normals),
            Box::new(CfsBiasModel::default()),
            Box::new(IriOutlook::default()),
        )
    }

    pub async fn fuse(&self, coordinates: Coordinates, range: DateRange) -> Vec<FusedDay> {
        self.fuse_with_report(coordinates, range).await.days
    }

    pub async fn fuse_with_report(&self, coordinates: Coordinates, range: DateRange) -> FusionReport {
        let mut unavailable = Vec::new();

        let primary = fetch_or_empty(self.primary.as_ref(), coordinates, range, &mut unavailable).await;
        let secondary =
            fetch_or_empty(self.secondary.as_ref(), coordinates, range, &mut unavailable).await;
        let normals = fetch_or_empty(self.normals.as_ref(), coordinates, range, &mut unavailable).await;

        let bias = self.bias.bias(coordinates).await.unwrap_or_else(|error| {
            warn!(%error, "bias model unavailable, applying no correction");
            BiasAdjustment::default()
        });
        let probabilities = self
            .outlook
            .probabilities(coordinates)
            .await
            .unwrap_or_else(|error| {
                warn!(%error, "seasonal outlook unavailable, using even odds");
                Probabilities::default()
            });

        let days = range
            .days()
            .enumerate()
            .map(|(i, date)| {
                let reading = [&secondary, &primary, &normals]
                    .into_iter()
                    .find_map(|source| source.get(i).copied())
                    .unwrap_or_else(|| {
                        debug!(%date, "no source covers day, using seasonal fallback");
                        RawDayReading::seasonal_fallback(date)
                    });
                fuse_day(date, &reading, bias, probabilities)
            })
            .collect();

        FusionReport { days, unavailable }
    }
}

async fn fetch_or_empty(
    source: &dyn DailySource,
    coordinates: Coordinates,
    range: DateRange,
    unavailable: &mut Vec<ServiceId>,
) -> Vec<RawDayReading> {
    match source.fetch_daily(coordinates, range).await {
        Ok(readings) => {
            debug!(source = %source.id(), days = readings.len(), "weather source responded");
            readings
        }
        Err(error) => {
            warn!(source = %source.id(), %error, "weather source unavailable, continuing without it");
            unavailable.push(source.id());
            Vec::new()
        }
    }
}

/// Bias-correct one reading and derive its snow and air-quality flags.
pub fn fuse_day(
    date: NaiveDate,
    reading: &RawDayReading,
    bias: BiasAdjustment,
    probabilities: Probabilities,
) -> FusedDay {
    let temperature = reading.temperature.unwrap_or(DEFAULT_TEMPERATURE) + bias.temp_bias;
    let precipitation =
        reading.precipitation.unwrap_or(DEFAULT_PRECIPITATION) * (1.0 + bias.precip_bias);
    let wind_speed = reading.wind_speed.unwrap_or(DEFAULT_WIND_SPEED);

    let snow = reading
        .snow
        .unwrap_or(temperature <= 0.0 && precipitation > 0.5);
    let air_quality = AirQuality::from_conditions(temperature, precipitation, wind_speed);

    FusedDay {
        date,
        temperature: round_to(temperature, 1),
        precipitation: round_to(precipitation, 2),
        wind_speed: round_to(wind_speed, 1),
        air_quality,
        snow,
        probabilities,
        recommendations: Vec::new(),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

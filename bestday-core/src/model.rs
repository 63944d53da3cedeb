use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::{activity::ActivityCategory, error::PlanError};

/// Sentinel published in `alternative_days` when every day in the range is suitable.
pub const ALL_DATES_SUITABLE: &str = "all dates are suitable";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Calendar-day range, inclusive of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PlanError> {
        if end < start {
            return Err(PlanError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.day_count())
    }
}

/// One day of data from a single source, before fusion.
///
/// Numeric fields are `None` when the provider omitted them or sent something
/// that does not parse as a number; the fusion engine substitutes defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawDayReading {
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub snow: Option<bool>,
}

impl RawDayReading {
    /// Seasonal heuristic used when no source covers a day.
    pub fn seasonal_fallback(date: NaiveDate) -> Self {
        match date.month() {
            12 | 1 | 2 => Self {
                temperature: Some(0.0),
                precipitation: Some(2.0),
                wind_speed: Some(5.0),
                snow: Some(true),
            },
            _ => Self {
                temperature: Some(20.0),
                precipitation: Some(1.0),
                wind_speed: Some(3.0),
                snow: Some(false),
            },
        }
    }
}

/// Additive temperature / multiplicative precipitation correction for one fusion run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BiasAdjustment {
    pub temp_bias: f64,
    pub precip_bias: f64,
}

/// Seasonal outlook attached verbatim to every fused day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub prob_above_normal_temp: f64,
    pub prob_above_normal_precip: f64,
}

impl Default for Probabilities {
    fn default() -> Self {
        Self {
            prob_above_normal_temp: 0.5,
            prob_above_normal_precip: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirQuality {
    Good,
    Moderate,
    Poor,
}

impl AirQuality {
    /// One point each for extreme temperature, heavy rain and strong wind.
    pub fn from_conditions(temperature: f64, precipitation: f64, wind_speed: f64) -> Self {
        let score = [
            !(0.0..=35.0).contains(&temperature),
            precipitation > 5.0,
            wind_speed > 10.0,
        ]
        .into_iter()
        .filter(|hit| *hit)
        .count();

        match score {
            0 | 1 => AirQuality::Good,
            2 => AirQuality::Moderate,
            _ => AirQuality::Poor,
        }
    }

    /// Numeric code used by chart consumers.
    pub fn code(&self) -> u8 {
        match self {
            AirQuality::Good => 1,
            AirQuality::Moderate => 2,
            AirQuality::Poor => 3,
        }
    }
}

/// The canonical per-day forecast produced by fusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedDay {
    pub date: NaiveDate,
    #[serde(rename = "T2M")]
    pub temperature: f64,
    #[serde(rename = "PRECTOT")]
    pub precipitation: f64,
    #[serde(rename = "WS10M")]
    pub wind_speed: f64,
    pub air_quality: AirQuality,
    pub snow: bool,
    pub probabilities: Probabilities,
    pub recommendations: Vec<String>,
}

/// Suitable days other than the best one, or the "everything works" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlternativeDays {
    AllSuitable,
    Dates(Vec<NaiveDate>),
}

impl Serialize for AlternativeDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AlternativeDays::AllSuitable => serializer.collect_seq([ALL_DATES_SUITABLE]),
            AlternativeDays::Dates(dates) => serializer.collect_seq(dates),
        }
    }
}

/// Parallel arrays for plotting the range.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartData {
    pub labels: Vec<NaiveDate>,
    pub temperature: Vec<f64>,
    pub rain: Vec<f64>,
    pub wind: Vec<f64>,
    pub air_quality: Vec<u8>,
}

impl ChartData {
    pub fn from_days(days: &[FusedDay]) -> Self {
        Self {
            labels: days.iter().map(|d| d.date).collect(),
            temperature: days.iter().map(|d| d.temperature).collect(),
            rain: days.iter().map(|d| d.precipitation).collect(),
            wind: days.iter().map(|d| d.wind_speed).collect(),
            air_quality: days.iter().map(|d| d.air_quality.code()).collect(),
        }
    }
}

/// Everything one planning run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub activity: ActivityCategory,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub best_day: Option<NaiveDate>,
    pub daily_weather: Vec<FusedDay>,
    pub alternative_days: AlternativeDays,
    pub nearest_better_city: Option<String>,
    pub chart_data: ChartData,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn date_range_counts_both_endpoints() {
        let range = DateRange::new(date("2024-02-27"), date("2024-03-01")).unwrap();

        assert_eq!(range.day_count(), 4);
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.first(), Some(&date("2024-02-27")));
        assert_eq!(days[2], date("2024-02-29"));
        assert_eq!(days.last(), Some(&date("2024-03-01")));
    }

    #[test]
    fn date_range_rejects_reversed_bounds() {
        let err = DateRange::new(date("2024-03-02"), date("2024-03-01")).unwrap_err();
        assert!(err.to_string().contains("before start date"));
    }

    #[test]
    fn single_day_range() {
        let range = DateRange::new(date("2024-06-15"), date("2024-06-15")).unwrap();
        assert_eq!(range.day_count(), 1);
    }

    #[test]
    fn seasonal_fallback_by_month() {
        let winter = RawDayReading::seasonal_fallback(date("2024-01-10"));
        assert_eq!(winter.temperature, Some(0.0));
        assert_eq!(winter.precipitation, Some(2.0));
        assert_eq!(winter.wind_speed, Some(5.0));
        assert_eq!(winter.snow, Some(true));

        let summer = RawDayReading::seasonal_fallback(date("2024-06-15"));
        assert_eq!(summer.temperature, Some(20.0));
        assert_eq!(summer.precipitation, Some(1.0));
        assert_eq!(summer.wind_speed, Some(3.0));
        assert_eq!(summer.snow, Some(false));

        assert_eq!(RawDayReading::seasonal_fallback(date("2024-03-01")).snow, Some(false));
        assert_eq!(RawDayReading::seasonal_fallback(date("2024-12-01")).snow, Some(true));
    }

    #[test]
    fn air_quality_points() {
        assert_eq!(AirQuality::from_conditions(20.0, 0.0, 3.0), AirQuality::Good);
        assert_eq!(AirQuality::from_conditions(40.0, 0.0, 3.0), AirQuality::Good);
        assert_eq!(AirQuality::from_conditions(40.0, 6.0, 3.0), AirQuality::Moderate);
        assert_eq!(AirQuality::from_conditions(-1.0, 6.0, 11.0), AirQuality::Poor);
        // Bounds are inclusive.
        assert_eq!(AirQuality::from_conditions(0.0, 5.0, 10.0), AirQuality::Good);
    }

    #[test]
    fn alternative_days_serialize_as_array() {
        let all = serde_json::to_value(AlternativeDays::AllSuitable).unwrap();
        assert_eq!(all, serde_json::json!(["all dates are suitable"]));

        let some = AlternativeDays::Dates(vec![date("2024-01-11"), date("2024-01-12")]);
        assert_eq!(
            serde_json::to_value(some).unwrap(),
            serde_json::json!(["2024-01-11", "2024-01-12"])
        );
    }

    #[test]
    fn fused_day_uses_response_field_names() {
        let day = FusedDay {
            date: date("2024-01-10"),
            temperature: 25.0,
            precipitation: 0.0,
            wind_speed: 5.0,
            air_quality: AirQuality::Good,
            snow: false,
            probabilities: Probabilities::default(),
            recommendations: vec!["Enjoy outdoor activity".into()],
        };

        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["date"], "2024-01-10");
        assert_eq!(json["T2M"], 25.0);
        assert_eq!(json["PRECTOT"], 0.0);
        assert_eq!(json["WS10M"], 5.0);
        assert_eq!(json["air_quality"], "Good");
        assert_eq!(json["probabilities"]["prob_above_normal_temp"], 0.5);
        assert!(json.get("temperature").is_none());
    }
}

//! Orchestration of one planning run: classify, geocode, fuse, score,
//! recommend, compare against nearby cities.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::{
    Config,
    activity::ActivityClassifier,
    error::{PlanError, SourceError},
    fusion::WeatherFusion,
    geocode::{GeoResolver, NominatimGeocoder},
    model::{AirQuality, AlternativeDays, ChartData, Coordinates, DateRange, FusedDay, RunResult},
    recommend::recommend,
    source::{ServiceId, http_client},
    suitability::is_suitable,
};

/// Alternatives listed besides the best day.
pub const MAX_ALTERNATIVE_DAYS: usize = 5;

/// Candidates for "a nearby city has better weather", checked in this order.
pub const NEARBY_CITIES: &[(&str, Coordinates)] = &[
    ("Cairo", Coordinates::new(30.0444, 31.2357)),
    ("Alexandria", Coordinates::new(31.2001, 29.9187)),
    ("Luxor", Coordinates::new(25.6872, 32.6396)),
    ("Aswan", Coordinates::new(24.0889, 32.8998)),
    ("Giza", Coordinates::new(30.0131, 31.2089)),
];

#[derive(Debug)]
pub struct Planner {
    classifier: ActivityClassifier,
    geo: GeoResolver,
    fusion: WeatherFusion,
    nearby: Vec<(String, Coordinates)>,
}

impl Planner {
    pub fn new(geo: GeoResolver, fusion: WeatherFusion) -> Self {
        Self {
            classifier: ActivityClassifier::new(),
            geo,
            fusion,
            nearby: NEARBY_CITIES
                .iter()
                .map(|(name, coordinates)| (name.to_string(), *coordinates))
                .collect(),
        }
    }

    /// Wire the HTTP adapters described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let http = http_client(config.timeout())?;
        let geocoder = NominatimGeocoder::new(config.base_url(ServiceId::Nominatim), http.clone());
        let fusion = WeatherFusion::from_config(config, &http);
        Ok(Self::new(GeoResolver::new(Box::new(geocoder)), fusion))
    }

    pub fn with_nearby(mut self, nearby: Vec<(String, Coordinates)>) -> Self {
        self.nearby = nearby;
        self
    }

    pub async fn run(
        &self,
        city: &str,
        activity_text: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RunResult, PlanError> {
        let range = DateRange::new(start, end)?;

        let matched = self.classifier.classify(activity_text);
        let activity = matched.category.as_str();
        debug!(activity, confidence = matched.confidence, "classified activity");

        let coordinates = self.geo.resolve(city).await;
        let mut days = self.fusion.fuse(coordinates, range).await;

        let best = select_best_day(activity, &days);
        for day in &mut days {
            day.recommendations = recommend(day).actions;
        }
        let alternative_days = alternative_days(activity, &days, best);
        let best_day = best.map(|i| days[i].date);

        let nearest_better_city = self.nearest_better_city(city, &days, range).await;

        info!(
            city,
            activity,
            best_day = ?best_day,
            better_city = ?nearest_better_city,
            "planning run complete"
        );

        Ok(RunResult {
            activity: matched.category,
            start_date: range.start(),
            end_date: range.end(),
            best_day,
            chart_data: ChartData::from_days(&days),
            daily_weather: days,
            alternative_days,
            nearest_better_city,
        })
    }

    /// First nearby city (other than `city`) that is drier on average and
    /// whose mean temperature lies in `[20, 30]`.
    async fn nearest_better_city(
        &self,
        city: &str,
        days: &[FusedDay],
        range: DateRange,
    ) -> Option<String> {
        let (_, current_precip) = means(days)?;

        for (name, coordinates) in &self.nearby {
            if name.eq_ignore_ascii_case(city) {
                continue;
            }
            let candidate = self.fusion.fuse(*coordinates, range).await;
            let Some((temp, precip)) = means(&candidate) else {
                continue;
            };
            debug!(city = %name, mean_temp = temp, mean_precip = precip, "compared nearby city");
            if precip < current_precip && (20.0..=30.0).contains(&temp) {
                return Some(name.clone());
            }
        }
        None
    }
}

/// Ranking score: suitability 3, air quality 2/1, dryness 2/1.
pub fn composite_score(activity: &str, day: &FusedDay) -> u32 {
    let mut score = 0;
    if is_suitable(
        activity,
        day.temperature,
        day.precipitation,
        day.wind_speed,
        day.snow,
    ) {
        score += 3;
    }
    score += match day.air_quality {
        AirQuality::Good => 2,
        AirQuality::Moderate => 1,
        AirQuality::Poor => 0,
    };
    if day.precipitation == 0.0 {
        score += 2;
    } else if day.precipitation < 5.0 {
        score += 1;
    }
    score
}

/// Index of the highest-scoring day; the earliest wins a tie.
pub fn select_best_day(activity: &str, days: &[FusedDay]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, day) in days.iter().enumerate() {
        let score = composite_score(activity, day);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Suitable days other than the best, chronological, capped; or the sentinel
/// when every day is suitable.
pub fn alternative_days(activity: &str, days: &[FusedDay], best: Option<usize>) -> AlternativeDays {
    let suitable: Vec<&FusedDay> = days
        .iter()
        .filter(|d| is_suitable(activity, d.temperature, d.precipitation, d.wind_speed, d.snow))
        .collect();

    if suitable.len() == days.len() {
        return AlternativeDays::AllSuitable;
    }

    let Some(best_date) = best.and_then(|i| days.get(i)).map(|d| d.date) else {
        return AlternativeDays::Dates(Vec::new());
    };

    AlternativeDays::Dates(
        suitable
            .into_iter()
            .map(|d| d.date)
            .filter(|date| *date != best_date)
            .take(MAX_ALTERNATIVE_DAYS)
            .collect(),
    )
}

/// Mean temperature and mean precipitation, `None` for an empty range.
fn means(days: &[FusedDay]) -> Option<(f64, f64)> {
    if days.is_empty() {
        return None;
    }
    let n = days.len() as f64;
    let temp = days.iter().map(|d| d.temperature).sum::<f64>() / n;
    let precip = days.iter().map(|d| d.precipitation).sum::<f64>() / n;
    Some((temp, precip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::SourceError,
        geocode::Geocoder,
        model::{Probabilities, RawDayReading},
        source::{CfsBiasModel, DailySource, IriOutlook},
    };
    use async_trait::async_trait;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn day(d: &str, temperature: f64, precipitation: f64, wind_speed: f64, air_quality: AirQuality) -> FusedDay {
        FusedDay {
            date: date(d),
            temperature,
            precipitation,
            wind_speed,
            air_quality,
            snow: false,
            probabilities: Probabilities::default(),
            recommendations: Vec::new(),
        }
    }

    fn sample_week() -> Vec<FusedDay> {
        vec![
            day("2024-01-10", 25.0, 0.0, 5.0, AirQuality::Good),
            day("2024-01-11", 15.0, 0.0, 5.0, AirQuality::Good),
            day("2024-01-12", 19.0, 6.0, 5.0, AirQuality::Poor),
        ]
    }

    #[test]
    fn composite_scores() {
        let days = sample_week();
        assert_eq!(composite_score("picnic", &days[0]), 7);
        assert_eq!(composite_score("picnic", &days[1]), 4);
        assert_eq!(composite_score("picnic", &days[2]), 0);

        let drizzle = day("2024-01-13", 20.0, 1.5, 5.0, AirQuality::Moderate);
        assert_eq!(composite_score("picnic", &drizzle), 3 + 1 + 1);
    }

    #[test]
    fn best_day_is_the_top_score() {
        assert_eq!(select_best_day("picnic", &sample_week()), Some(0));

        let mut days = sample_week();
        days[0].precipitation = 3.0;
        days[0].air_quality = AirQuality::Moderate;
        // day 0: 0 + 1 + 1, day 1: 0 + 2 + 2
        assert_eq!(select_best_day("picnic", &days), Some(1));
    }

    #[test]
    fn best_day_ties_go_to_the_earliest() {
        let days = vec![
            day("2024-05-01", 22.0, 0.0, 3.0, AirQuality::Good),
            day("2024-05-02", 23.0, 0.0, 3.0, AirQuality::Good),
        ];
        assert_eq!(select_best_day("picnic", &days), Some(0));
        assert_eq!(select_best_day("picnic", &[]), None);
    }

    #[test]
    fn alternatives_exclude_best_and_cap_at_five() {
        let mut days: Vec<FusedDay> = (1..=8)
            .map(|d| day(&format!("2024-05-{d:02}"), 22.0, 0.0, 3.0, AirQuality::Good))
            .collect();
        days.push(day("2024-05-09", 35.0, 0.0, 3.0, AirQuality::Good));

        match alternative_days("picnic", &days, Some(0)) {
            AlternativeDays::Dates(dates) => {
                assert_eq!(dates.len(), MAX_ALTERNATIVE_DAYS);
                assert_eq!(dates[0], date("2024-05-02"));
                assert_eq!(dates[4], date("2024-05-06"));
            }
            other => panic!("expected dates, got {other:?}"),
        }
    }

    #[test]
    fn all_suitable_uses_the_sentinel() {
        let days = vec![
            day("2024-05-01", 22.0, 0.0, 3.0, AirQuality::Good),
            day("2024-05-02", 23.0, 1.0, 3.0, AirQuality::Good),
        ];
        assert_eq!(alternative_days("picnic", &days, Some(0)), AlternativeDays::AllSuitable);
    }

    #[test]
    fn no_suitable_days_gives_empty_alternatives() {
        assert_eq!(
            alternative_days("picnic", &sample_week()[1..], Some(0)),
            AlternativeDays::Dates(Vec::new())
        );
    }

    /// Reports a fixed temperature and precipitation for every day, keyed by latitude.
    #[derive(Debug)]
    struct ByLatitude(Vec<(f64, f64, f64)>);

    #[async_trait]
    impl DailySource for ByLatitude {
        fn id(&self) -> ServiceId {
            ServiceId::VisualCrossing
        }

        async fn fetch_daily(
            &self,
            coordinates: Coordinates,
            range: DateRange,
        ) -> Result<Vec<RawDayReading>, SourceError> {
            let (_, temperature, precipitation) = self
                .0
                .iter()
                .find(|(lat, _, _)| *lat == coordinates.latitude)
                .copied()
                .ok_or_else(|| SourceError::Malformed("unknown location".into()))?;
            Ok(vec![
                RawDayReading {
                    temperature: Some(temperature),
                    precipitation: Some(precipitation),
                    wind_speed: Some(3.0),
                    snow: None,
                };
                range.day_count()
            ])
        }
    }

    #[derive(Debug)]
    struct Down(ServiceId);

    #[async_trait]
    impl DailySource for Down {
        fn id(&self) -> ServiceId {
            self.0
        }

        async fn fetch_daily(
            &self,
            _coordinates: Coordinates,
            _range: DateRange,
        ) -> Result<Vec<RawDayReading>, SourceError> {
            Err(SourceError::MissingApiKey)
        }
    }

    #[derive(Debug)]
    struct Fixed(Coordinates);

    #[async_trait]
    impl Geocoder for Fixed {
        async fn locate(&self, _place: &str) -> Result<Coordinates, SourceError> {
            Ok(self.0)
        }
    }

    fn planner(home: Coordinates, weather: Vec<(f64, f64, f64)>) -> Planner {
        let fusion = WeatherFusion::new(
            Box::new(ByLatitude(weather)),
            Box::new(Down(ServiceId::NasaPower)),
            Box::new(Down(ServiceId::OpenWeather)),
            Box::new(CfsBiasModel::new(Default::default())),
            Box::new(IriOutlook::default()),
        );
        Planner::new(GeoResolver::new(Box::new(Fixed(home))), fusion)
    }

    #[tokio::test]
    async fn run_assembles_the_result() {
        let home = Coordinates::new(1.0, 1.0);
        let planner = planner(home, vec![(1.0, 24.0, 0.0)]).with_nearby(Vec::new());

        let result = planner
            .run("Somewhere", "picnic in the park", date("2024-06-01"), date("2024-06-03"))
            .await
            .unwrap();

        assert_eq!(result.activity.as_str(), "picnic");
        assert_eq!(result.daily_weather.len(), 3);
        assert_eq!(result.best_day, Some(date("2024-06-01")));
        assert_eq!(result.alternative_days, AlternativeDays::AllSuitable);
        assert_eq!(result.nearest_better_city, None);
        assert_eq!(result.chart_data.labels.len(), 3);
        assert_eq!(result.chart_data.air_quality, vec![1, 1, 1]);
        assert_eq!(result.daily_weather[0].recommendations, vec!["Enjoy outdoor activity"]);
    }

    #[tokio::test]
    async fn run_rejects_reversed_range() {
        let planner = planner(Coordinates::new(1.0, 1.0), Vec::new());
        let err = planner
            .run("x", "picnic", date("2024-06-03"), date("2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidRange { .. }));
    }

    #[tokio::test]
    async fn nearest_better_city_is_first_qualifying_candidate() {
        let home = Coordinates::new(1.0, 1.0);
        let planner = planner(
            home,
            vec![(1.0, 24.0, 3.0), (2.0, 35.0, 0.0), (3.0, 25.0, 1.0), (4.0, 22.0, 0.0)],
        )
        .with_nearby(vec![
            ("Home".into(), home),
            ("Hot".into(), Coordinates::new(2.0, 0.0)),
            ("Mild".into(), Coordinates::new(3.0, 0.0)),
            ("Milder".into(), Coordinates::new(4.0, 0.0)),
        ]);

        let result = planner
            .run("home", "picnic", date("2024-06-01"), date("2024-06-02"))
            .await
            .unwrap();

        assert_eq!(result.nearest_better_city.as_deref(), Some("Mild"));
    }

    #[tokio::test]
    async fn unsuitable_candidates_yield_no_city() {
        let home = Coordinates::new(1.0, 1.0);
        let planner = planner(home, vec![(1.0, 24.0, 0.0), (2.0, 25.0, 0.0)])
            .with_nearby(vec![("Same".into(), Coordinates::new(2.0, 0.0))]);

        let result = planner
            .run("home", "picnic", date("2024-06-01"), date("2024-06-01"))
            .await
            .unwrap();

        // Equal precipitation is not "lower".
        assert_eq!(result.nearest_better_city, None);
    }

    #[tokio::test]
    async fn geocoding_fallback_ignores_configured_default_city() {
        let mut config = Config::default();
        config.default_city = Some("Alexandria".into());
        config.set_base_url(ServiceId::Nominatim, "http://127.0.0.1:1");

        let planner = Planner::from_config(&config).unwrap();
        assert_eq!(
            planner.geo.resolve("Alexandria").await,
            crate::geocode::FALLBACK_COORDINATES
        );
    }
}

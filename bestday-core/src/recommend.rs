use crate::model::{AirQuality, FusedDay};

pub const CARRY_UMBRELLA: &str = "Carry umbrella";
pub const ENJOY_OUTDOORS: &str = "Enjoy outdoor activity";
pub const WIND_CAUTION: &str = "Consider indoor if windy";
pub const WEAR_MASK: &str = "Wear mask";
pub const INDOOR_ACTIVITIES: &str = "Indoor activities";
pub const NORMAL_OUTDOOR_ACTIVITIES: &str = "Normal outdoor activities";

/// Advice derived from one day's weather.
///
/// Only `actions` is attached to the day; `alternatives` is informational.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Recommendations {
    pub actions: Vec<String>,
    pub alternatives: Vec<String>,
}

pub fn recommend(day: &FusedDay) -> Recommendations {
    let mut actions = Vec::new();
    let mut indoor = false;

    if day.precipitation > 0.0 {
        actions.push(CARRY_UMBRELLA.to_string());
        indoor = true;
    } else {
        actions.push(ENJOY_OUTDOORS.to_string());
    }
    if day.wind_speed > 10.0 {
        actions.push(WIND_CAUTION.to_string());
        indoor = true;
    }
    if day.air_quality == AirQuality::Poor {
        actions.push(WEAR_MASK.to_string());
        indoor = true;
    }

    let alternative = if indoor { INDOOR_ACTIVITIES } else { NORMAL_OUTDOOR_ACTIVITIES };

    Recommendations {
        actions,
        alternatives: vec![alternative.to_string()],
    }
}

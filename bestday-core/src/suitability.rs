//! Environmental thresholds per activity and the pass/fail check against them.

use crate::activity::{ACTIVITY_KEYWORDS, ActivityCategory};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityRule {
    pub temp_min: f64,
    pub temp_max: f64,
    pub precip_max: f64,
    pub wind_max: f64,
    pub snow_allowed: bool,
    pub snow_required: bool,
}

const fn rule(temp_min: f64, temp_max: f64, precip_max: f64, wind_max: f64, snow_allowed: bool) -> ActivityRule {
    ActivityRule {
        temp_min,
        temp_max,
        precip_max,
        wind_max,
        snow_allowed,
        snow_required: false,
    }
}

impl ActivityRule {
    /// Applied to activities without a rule of their own.
    pub const PERMISSIVE: ActivityRule = rule(10.0, 30.0, 5.0, 15.0, true);

    pub fn for_category(category: ActivityCategory) -> Option<ActivityRule> {
        use ActivityCategory::*;

        let rule = match category {
            Picnic => rule(18.0, 28.0, 2.0, 10.0, false),
            Camping => rule(10.0, 30.0, 5.0, 15.0, false),
            Hiking => rule(12.0, 28.0, 3.0, 12.0, false),
            Marathon => rule(15.0, 26.0, 2.0, 10.0, false),
            Cycling => rule(12.0, 28.0, 2.0, 12.0, false),
            Football => rule(10.0, 28.0, 3.0, 12.0, false),
            Tennis => rule(12.0, 30.0, 2.0, 10.0, false),
            Basketball => rule(12.0, 28.0, 3.0, 12.0, false),
            Swimming => rule(22.0, 35.0, 1.0, 12.0, false),
            Surfing => rule(18.0, 32.0, 2.0, 15.0, false),
            Snorkeling => rule(22.0, 35.0, 1.0, 10.0, false),
            Sailing => rule(15.0, 30.0, 3.0, 20.0, false),
            Kayaking => rule(15.0, 30.0, 3.0, 15.0, false),
            Wedding => rule(18.0, 30.0, 2.0, 10.0, false),
            Concert => rule(15.0, 30.0, 3.0, 12.0, false),
            Market => rule(12.0, 32.0, 3.0, 12.0, false),
            Skiing => ActivityRule {
                snow_required: true,
                ..rule(-10.0, 5.0, 10.0, 20.0, true)
            },
            IceSkating => rule(-5.0, 5.0, 5.0, 15.0, true),
            Fishing => rule(12.0, 30.0, 2.0, 15.0, false),
            Boating => rule(15.0, 30.0, 3.0, 15.0, false),
            Travel => rule(10.0, 32.0, 5.0, 20.0, true),
            Sightseeing => rule(12.0, 30.0, 3.0, 15.0, true),
            RoadTrip => rule(10.0, 32.0, 5.0, 20.0, true),
            TechEvent => rule(-50.0, 50.0, 100.0, 100.0, true),
            GamingEvent => rule(-50.0, 50.0, 100.0, 100.0, true),
            Photography => rule(10.0, 32.0, 2.0, 12.0, true),
            Filming => rule(10.0, 32.0, 2.0, 12.0, true),
            Stargazing => rule(12.0, 25.0, 0.0, 8.0, false),
            Generic => return None,
        };
        Some(rule)
    }

    pub fn permits(&self, temperature: f64, precipitation: f64, wind_speed: f64, snow: bool) -> bool {
        if !(self.temp_min..=self.temp_max).contains(&temperature) {
            return false;
        }
        if precipitation > self.precip_max || wind_speed > self.wind_max {
            return false;
        }
        if self.snow_required && !snow {
            return false;
        }
        if !self.snow_allowed && snow {
            return false;
        }
        true
    }
}

/// Loose lookup: the first table entry with any keyword occurring anywhere in
/// the lowercased activity string.
///
/// This is deliberately not the scoring classifier. Fed a canonical name such
/// as `road_trip` it resolves to `Travel` because "trip" is listed there first.
pub fn lookup_category(activity: &str) -> Option<ActivityCategory> {
    let activity = activity.to_lowercase();
    ACTIVITY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| activity.contains(kw)))
        .map(|(category, _)| *category)
}

pub fn rule_for(activity: &str) -> ActivityRule {
    lookup_category(activity)
        .and_then(ActivityRule::for_category)
        .unwrap_or(ActivityRule::PERMISSIVE)
}

pub fn is_suitable(activity: &str, temperature: f64, precipitation: f64, wind_speed: f64, snow: bool) -> bool {
    rule_for(activity).permits(temperature, precipitation, wind_speed, snow)
}

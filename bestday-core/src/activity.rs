//! Free-text activity classification.
//!
//! Text is scored against a fixed keyword table: a multi-word keyword found
//! verbatim scores 3, a single-word keyword found as a token scores 2, and a
//! keyword that only approximately matches a token scores 1.

use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// Similarity a keyword needs with a token to count as an approximate hit.
pub const KEYWORD_CUTOFF: f64 = 0.78;
/// Similarity the whole text needs with a category name when no keyword hit.
pub const CATEGORY_NAME_CUTOFF: f64 = 0.6;
/// Confidence reported for a whole-text category name match.
pub const CATEGORY_NAME_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Picnic,
    Camping,
    Hiking,
    Marathon,
    Cycling,
    Football,
    Tennis,
    Basketball,
    Swimming,
    Surfing,
    Snorkeling,
    Sailing,
    Kayaking,
    Wedding,
    Concert,
    Market,
    Skiing,
    IceSkating,
    Fishing,
    Boating,
    Travel,
    Sightseeing,
    RoadTrip,
    TechEvent,
    GamingEvent,
    Photography,
    Filming,
    Stargazing,
    Generic,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Picnic => "picnic",
            ActivityCategory::Camping => "camping",
            ActivityCategory::Hiking => "hiking",
            ActivityCategory::Marathon => "marathon",
            ActivityCategory::Cycling => "cycling",
            ActivityCategory::Football => "football",
            ActivityCategory::Tennis => "tennis",
            ActivityCategory::Basketball => "basketball",
            ActivityCategory::Swimming => "swimming",
            ActivityCategory::Surfing => "surfing",
            ActivityCategory::Snorkeling => "snorkeling",
            ActivityCategory::Sailing => "sailing",
            ActivityCategory::Kayaking => "kayaking",
            ActivityCategory::Wedding => "wedding",
            ActivityCategory::Concert => "concert",
            ActivityCategory::Market => "market",
            ActivityCategory::Skiing => "skiing",
            ActivityCategory::IceSkating => "ice_skating",
            ActivityCategory::Fishing => "fishing",
            ActivityCategory::Boating => "boating",
            ActivityCategory::Travel => "travel",
            ActivityCategory::Sightseeing => "sightseeing",
            ActivityCategory::RoadTrip => "road_trip",
            ActivityCategory::TechEvent => "tech_event",
            ActivityCategory::GamingEvent => "gaming_event",
            ActivityCategory::Photography => "photography",
            ActivityCategory::Filming => "filming",
            ActivityCategory::Stargazing => "stargazing",
            ActivityCategory::Generic => "generic",
        }
    }

    /// Keywords for this category, empty for `Generic`.
    pub fn keywords(&self) -> &'static [&'static str] {
        ACTIVITY_KEYWORDS
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, keywords)| *keywords)
            .unwrap_or(&[])
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword table in lookup order. Order matters: ties go to the earlier entry.
pub static ACTIVITY_KEYWORDS: &[(ActivityCategory, &[&str])] = &[
    (
        ActivityCategory::Picnic,
        &["picnic", "bbq", "barbecue", "barbeque", "family outing", "garden party", "outdoor dining"],
    ),
    (ActivityCategory::Camping, &["camping", "camp", "tent trip", "outdoor stay", "bonfire"]),
    (
        ActivityCategory::Hiking,
        &["hike", "hiking", "trek", "trekking", "trail", "nature walk", "walk", "mountain walk"],
    ),
    (
        ActivityCategory::Marathon,
        &["marathon", "race", "half marathon", "10k", "5k", "long run", "running", "jog", "road race"],
    ),
    (
        ActivityCategory::Cycling,
        &["cycling", "bike", "biking", "mountain bike", "road bike", "cycle", "ride"],
    ),
    (ActivityCategory::Football, &["football", "soccer", "match", "game", "tournament"]),
    (ActivityCategory::Tennis, &["tennis", "tennis match", "tennis game"]),
    (ActivityCategory::Basketball, &["basketball", "basketball game"]),
    (ActivityCategory::Swimming, &["swim", "swimming", "beach", "pool", "watersports"]),
    (ActivityCategory::Surfing, &["surf", "surfing", "surfboard", "waves"]),
    (ActivityCategory::Snorkeling, &["snorkel", "snorkeling", "diving", "scuba", "underwater"]),
    (ActivityCategory::Sailing, &["sail", "sailing", "yacht", "boat trip"]),
    (ActivityCategory::Kayaking, &["kayak", "kayaking", "canoe", "canoeing"]),
    (ActivityCategory::Wedding, &["wedding", "ceremony", "outdoor wedding", "reception"]),
    (
        ActivityCategory::Concert,
        &["concert", "festival", "outdoor concert", "gig", "music festival", "fair"],
    ),
    (ActivityCategory::Market, &["market", "street fair", "bazaar", "flea market"]),
    (
        ActivityCategory::Skiing,
        &["ski", "skiing", "snowboard", "snowboarding", "snow", "apres ski"],
    ),
    (ActivityCategory::IceSkating, &["ice skating", "skate", "ice rink"]),
    (ActivityCategory::Fishing, &["fish", "fishing", "angling"]),
    (ActivityCategory::Boating, &["boat", "boating", "rowboat", "canoe", "lake trip"]),
    (ActivityCategory::Travel, &["travel", "trip", "journey", "adventure", "explore"]),
    (ActivityCategory::Sightseeing, &["sightseeing", "tour", "city tour", "museum tour"]),
    (ActivityCategory::RoadTrip, &["road trip", "driving trip", "car trip"]),
    (
        ActivityCategory::TechEvent,
        &["tech fair", "technology expo", "conference", "summit", "seminar", "exhibition"],
    ),
    (ActivityCategory::GamingEvent, &["gaming expo", "game fair", "lan party", "e-sports"]),
    (
        ActivityCategory::Photography,
        &["photo", "photography", "photoshoot", "shoot", "portrait session"],
    ),
    (
        ActivityCategory::Filming,
        &["film", "filming", "movie shoot", "cinema shoot", "production"],
    ),
    (ActivityCategory::Stargazing, &["stargazing", "astronomy", "meteor shower", "observatory"]),
];

/// A normalized similarity ratio in `[0, 1]` between two strings.
pub trait Similarity: Send + Sync + fmt::Debug {
    fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Edit-distance ratio: `1 - levenshtein(a, b) / max(len(a), len(b))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl Similarity for Levenshtein {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

/// Outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityMatch {
    pub category: ActivityCategory,
    pub confidence: f64,
    /// Raw score of every category that scored above zero.
    pub matched: BTreeMap<ActivityCategory, u32>,
}

impl ActivityMatch {
    fn generic() -> Self {
        Self {
            category: ActivityCategory::Generic,
            confidence: 0.0,
            matched: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityClassifier<S = Levenshtein> {
    similarity: S,
}

impl ActivityClassifier<Levenshtein> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Similarity> ActivityClassifier<S> {
    pub fn with_similarity(similarity: S) -> Self {
        Self { similarity }
    }

    pub fn classify(&self, text: &str) -> ActivityMatch {
        if text.trim().is_empty() {
            return ActivityMatch::generic();
        }

        if text.contains(',') {
            // Strict max over the segments: the first best segment wins.
            let mut best: Option<ActivityMatch> = None;
            for candidate in text.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                let result = self.classify(candidate);
                if best.as_ref().is_none_or(|b| result.confidence > b.confidence) {
                    best = Some(result);
                }
            }
            return best.unwrap_or_else(ActivityMatch::generic);
        }

        let (text_clean, tokens) = normalize(text);

        let mut matched = BTreeMap::new();
        let mut best: Option<(ActivityCategory, u32)> = None;
        for (category, keywords) in ACTIVITY_KEYWORDS {
            let score: u32 = keywords
                .iter()
                .map(|kw| self.keyword_score(kw, &text_clean, &tokens))
                .sum();
            if score == 0 {
                continue;
            }
            matched.insert(*category, score);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((*category, score));
            }
        }

        if let Some((category, score)) = best {
            let confidence = (f64::from(score) / f64::from(max_score(category).max(1))).min(1.0);
            return ActivityMatch {
                category,
                confidence: (confidence * 100.0).round() / 100.0,
                matched,
            };
        }

        self.closest_category_name(&text_clean)
            .map(|category| ActivityMatch {
                category,
                confidence: CATEGORY_NAME_CONFIDENCE,
                matched: BTreeMap::new(),
            })
            .unwrap_or_else(ActivityMatch::generic)
    }

    fn keyword_score(&self, keyword: &str, text_clean: &str, tokens: &[String]) -> u32 {
        if keyword.contains(' ') && text_clean.contains(keyword) {
            3
        } else if tokens.iter().any(|t| t == keyword) {
            2
        } else if tokens
            .iter()
            .any(|t| self.similarity.ratio(keyword, t) >= KEYWORD_CUTOFF)
        {
            1
        } else {
            0
        }
    }

    fn closest_category_name(&self, text_clean: &str) -> Option<ActivityCategory> {
        let mut best: Option<(ActivityCategory, f64)> = None;
        for (category, _) in ACTIVITY_KEYWORDS {
            let ratio = self.similarity.ratio(text_clean, category.as_str());
            if ratio >= CATEGORY_NAME_CUTOFF && best.is_none_or(|(_, top)| ratio > top) {
                best = Some((*category, ratio));
            }
        }
        best.map(|(category, _)| category)
    }
}

/// Highest score a category can reach from its own keyword list.
fn max_score(category: ActivityCategory) -> u32 {
    category
        .keywords()
        .iter()
        .map(|kw| if kw.contains(' ') { 3 } else { 2 })
        .sum()
}

/// Lowercase, replace punctuation with spaces, split on whitespace.
fn normalize(text: &str) -> (String, Vec<String>) {
    let clean: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    let clean = clean.trim().to_string();
    let tokens = clean.split_whitespace().map(str::to_string).collect();
    (clean, tokens)
}

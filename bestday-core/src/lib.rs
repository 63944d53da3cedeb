//! Core library for the `bestday` CLI.
//!
//! This crate defines:
//! - Activity classification and per-activity weather rules
//! - Adapters over the weather, bias and geocoding services
//! - Fusion of those sources into one forecast per day
//! - The planner that picks the best day and viable alternatives
//!
//! It is used by `bestday-cli`, but can also be reused by other binaries or services.

pub mod activity;
pub mod config;
pub mod error;
pub mod fusion;
pub mod geocode;
pub mod model;
pub mod planner;
pub mod recommend;
pub mod source;
pub mod suitability;

pub use activity::{ActivityCategory, ActivityClassifier, ActivityMatch, Similarity};
pub use config::{Config, ProviderConfig};
pub use error::{PlanError, SourceError};
pub use fusion::{FusionReport, WeatherFusion};
pub use geocode::{GeoResolver, Geocoder};
pub use model::{
    AirQuality, AlternativeDays, ChartData, Coordinates, DateRange, FusedDay, RunResult,
};
pub use planner::Planner;
pub use source::{DailySource, ServiceId};
pub use suitability::is_suitable;

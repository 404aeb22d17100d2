//! Broadcast content
//!
//! The broadcaster only depends on the [`ReportGenerator`] trait, so the
//! random weather source can be swapped without touching delivery.

pub mod generator;
pub mod report;

pub use generator::{
    RandomWeather, ReportGenerator, WeatherConfig, DEFAULT_CITIES, DEFAULT_CONDITIONS,
};
pub use report::{WeatherReport, TIMESTAMP_FORMAT};

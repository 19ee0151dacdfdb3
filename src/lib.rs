pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::config::{cli::LocalStorage, toml_config::AppConfig};
pub use crate::core::{
    batch::{BatchInput, BatchProcessor, BatchReport, RouteFailure},
    classifier::FlightClassifier,
    distance::{distance, Ellipsoid},
    pipeline::{load_registry, ClassifyPipeline},
    registry::AirportRegistry,
    runner::BatchRunner,
};
pub use crate::domain::model::{
    Airport, ClassifiedFlight, Coordinate, CountryCode, FlightBands, FlightType, IataCode, MatchBy,
    Route,
};
pub use crate::utils::error::{FlightError, Result};

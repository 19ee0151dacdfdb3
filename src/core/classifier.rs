use crate::core::distance::Ellipsoid;
use crate::core::registry::AirportRegistry;
use crate::domain::model::{Airport, ClassifiedFlight, FlightBands, IataCode, Kilometres, Route};
use crate::utils::error::Result;

/// Resolves airports in a registry, measures the geodesic between them and
/// assigns the distance band.
#[derive(Debug, Clone)]
pub struct FlightClassifier<'r> {
    registry: &'r AirportRegistry,
    bands: FlightBands,
    ellipsoid: Ellipsoid,
}

impl<'r> FlightClassifier<'r> {
    pub fn new(registry: &'r AirportRegistry, bands: FlightBands, ellipsoid: Ellipsoid) -> Self {
        Self {
            registry,
            bands,
            ellipsoid,
        }
    }

    /// Classifier with the EU bands on WGS-84.
    pub fn with_defaults(registry: &'r AirportRegistry) -> Self {
        Self::new(registry, FlightBands::default(), Ellipsoid::default())
    }

    /// Classify the flight between two codes.
    ///
    /// Fails on the first airport that cannot be resolved. Identical codes are
    /// the caller's precondition to reject, see [`Route::new`]; passed here
    /// they yield a zero distance, which fails validation.
    pub fn classify(&self, departure: &IataCode, arrival: &IataCode) -> Result<ClassifiedFlight> {
        let departure = self.registry.find_by_code(departure)?;
        let arrival = self.registry.find_by_code(arrival)?;
        let distance = self.flight_distance(departure, arrival)?;
        ClassifiedFlight::new(departure, arrival, distance, &self.bands)
    }

    pub fn classify_route(&self, route: &Route) -> Result<ClassifiedFlight> {
        self.classify(route.departure(), route.arrival())
    }

    /// Distance between two airports in whole kilometres.
    pub fn flight_distance(&self, departure: &Airport, arrival: &Airport) -> Result<Kilometres> {
        self.ellipsoid
            .distance_km(departure.position(), arrival.position())
    }
}

use crate::utils::error::{FieldViolation, FlightError, Result};
use crate::utils::validation::{
    validate_exact_length, validate_pattern, validate_range, validate_required_field, FieldResult,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Upper bound (inclusive) of a short flight in kilometres.
pub const MAX_SHORT_FLIGHT_KM: Kilometres = 1500;
/// Upper bound (inclusive) of a middle flight in kilometres.
pub const MAX_MIDDLE_FLIGHT_KM: Kilometres = 3500;

pub type Kilometres = u32;

static IATA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]{3}$").expect("IATA pattern is a valid regex")
});

static COUNTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2}$").expect("country pattern is a valid regex")
});

/// 機場查詢方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum MatchBy {
    #[default]
    Code,
    Name,
}

impl fmt::Display for MatchBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => f.write_str("code"),
            Self::Name => f.write_str("name"),
        }
    }
}

/// Three-character airport identifier, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IataCode(String);

impl IataCode {
    pub fn new(raw: &str) -> Result<Self> {
        Self::parse_field("iata_code", raw).map_err(FlightError::validation)
    }

    /// Validate `raw`, reporting a failure against `field_name`.
    pub fn parse_field(field_name: &str, raw: &str) -> FieldResult<Self> {
        validate_exact_length(field_name, raw, 3)?;
        validate_pattern(field_name, raw, &IATA_PATTERN, "[A-Za-z0-9]{3}")?;
        Ok(Self(raw.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ISO 3166 alpha-2 style country code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(raw: &str) -> Result<Self> {
        Self::parse_field("country_code", raw).map_err(FlightError::validation)
    }

    pub fn parse_field(field_name: &str, raw: &str) -> FieldResult<Self> {
        validate_exact_length(field_name, raw, 2)?;
        validate_pattern(field_name, raw, &COUNTRY_PATTERN, "[A-Za-z]{2}")?;
        Ok(Self(raw.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_code_conversions {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $ty {
            type Err = FlightError;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = FlightError;

            fn try_from(value: String) -> Result<Self> {
                Self::new(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }
    };
}

impl_code_conversions!(IataCode);
impl_code_conversions!(CountryCode);

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Both bounds are checked so that every bad field is reported.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let violations = Self::check("lat", lat, "lon", lon);
        if !violations.is_empty() {
            return Err(FlightError::ValidationError { violations });
        }
        Ok(Self { lat, lon })
    }

    fn check(lat_field: &str, lat: f64, lon_field: &str, lon: f64) -> Vec<FieldViolation> {
        [
            validate_range(lat_field, lat, -90.0, 90.0),
            validate_range(lon_field, lon, -180.0, 180.0),
        ]
        .into_iter()
        .filter_map(|check| check.err())
        .collect()
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    name: String,
    code: IataCode,
    country: CountryCode,
    position: Coordinate,
}

impl Airport {
    pub fn new(
        name: impl Into<String>,
        code: IataCode,
        country: CountryCode,
        position: Coordinate,
    ) -> Self {
        Self {
            name: name.into(),
            code,
            country,
            position,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &IataCode {
        &self.code
    }

    pub fn country(&self) -> &CountryCode {
        &self.country
    }

    pub fn position(&self) -> &Coordinate {
        &self.position
    }
}

/// Raw registry entry as it appears in the registry file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirportRecord {
    pub name: Option<String>,
    pub code: Option<String>,
    pub country: Option<String>,
    pub position: Option<PositionRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionRecord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl AirportRecord {
    pub fn new(name: &str, code: &str, country: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            code: Some(code.to_string()),
            country: Some(country.to_string()),
            position: Some(PositionRecord {
                lat: Some(lat),
                lon: Some(lon),
            }),
        }
    }

    /// Validate every field, collecting all violations instead of stopping at the first.
    pub fn into_airport(self) -> std::result::Result<Airport, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        // 名稱必填，但可以是空字串
        let name = validate_required_field("name", &self.name)
            .cloned()
            .map_err(|v| violations.push(v))
            .ok();
        let code = validate_required_field("code", &self.code)
            .and_then(|raw| IataCode::parse_field("code", raw))
            .map_err(|v| violations.push(v))
            .ok();
        let country = validate_required_field("country", &self.country)
            .and_then(|raw| CountryCode::parse_field("country", raw))
            .map_err(|v| violations.push(v))
            .ok();

        let position = match &self.position {
            None => {
                violations.push(FieldViolation::missing("position"));
                None
            }
            Some(position) => {
                let lat = validate_required_field("position.lat", &position.lat)
                    .map_err(|v| violations.push(v))
                    .ok();
                let lon = validate_required_field("position.lon", &position.lon)
                    .map_err(|v| violations.push(v))
                    .ok();
                match (lat, lon) {
                    (Some(&lat), Some(&lon)) => {
                        let problems = Coordinate::check("position.lat", lat, "position.lon", lon);
                        if problems.is_empty() {
                            Some(Coordinate { lat, lon })
                        } else {
                            violations.extend(problems);
                            None
                        }
                    }
                    _ => None,
                }
            }
        };

        match (name, code, country, position) {
            (Some(name), Some(code), Some(country), Some(position)) if violations.is_empty() => {
                Ok(Airport::new(name, code, country, position))
            }
            _ => Err(violations),
        }
    }
}

impl TryFrom<AirportRecord> for Airport {
    type Error = FlightError;

    fn try_from(record: AirportRecord) -> Result<Self> {
        record
            .into_airport()
            .map_err(|violations| FlightError::ValidationError { violations })
    }
}

/// EU distance band of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightType {
    Short,
    Middle,
    Long,
}

impl FlightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Middle => "middle",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for FlightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance thresholds mapping kilometres to a [`FlightType`].
///
/// Both bounds are inclusive on the lower band: a distance equal to
/// `short_max_km` is short, one equal to `middle_max_km` is middle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlightBands {
    short_max_km: Kilometres,
    middle_max_km: Kilometres,
}

impl FlightBands {
    pub fn new(short_max_km: Kilometres, middle_max_km: Kilometres) -> Result<Self> {
        if short_max_km == 0 {
            return Err(FlightError::InvalidConfigValueError {
                field: "bands.short_max_km".to_string(),
                value: short_max_km.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if middle_max_km <= short_max_km {
            return Err(FlightError::InvalidConfigValueError {
                field: "bands.middle_max_km".to_string(),
                value: middle_max_km.to_string(),
                reason: format!("must be greater than short_max_km ({})", short_max_km),
            });
        }
        Ok(Self {
            short_max_km,
            middle_max_km,
        })
    }

    pub fn short_max_km(&self) -> Kilometres {
        self.short_max_km
    }

    pub fn middle_max_km(&self) -> Kilometres {
        self.middle_max_km
    }

    pub fn classify(&self, distance: Kilometres) -> FlightType {
        if distance <= self.short_max_km {
            FlightType::Short
        } else if distance <= self.middle_max_km {
            FlightType::Middle
        } else {
            FlightType::Long
        }
    }
}

impl Default for FlightBands {
    fn default() -> Self {
        Self {
            short_max_km: MAX_SHORT_FLIGHT_KM,
            middle_max_km: MAX_MIDDLE_FLIGHT_KM,
        }
    }
}

/// Terminal output of a classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassifiedFlight {
    departure: IataCode,
    departure_country: CountryCode,
    arrival: IataCode,
    arrival_country: CountryCode,
    distance: Kilometres,
    #[serde(rename = "type")]
    flight_type: FlightType,
}

impl ClassifiedFlight {
    /// The flight type is derived from `distance` here and nowhere else.
    pub fn new(
        departure: &Airport,
        arrival: &Airport,
        distance: Kilometres,
        bands: &FlightBands,
    ) -> Result<Self> {
        if distance == 0 {
            return Err(FlightError::validation(FieldViolation::new(
                "distance",
                "0",
                "must be a positive number of kilometres",
            )));
        }

        Ok(Self {
            departure: departure.code().clone(),
            departure_country: departure.country().clone(),
            arrival: arrival.code().clone(),
            arrival_country: arrival.country().clone(),
            distance,
            flight_type: bands.classify(distance),
        })
    }

    pub fn departure(&self) -> &IataCode {
        &self.departure
    }

    pub fn departure_country(&self) -> &CountryCode {
        &self.departure_country
    }

    pub fn arrival(&self) -> &IataCode {
        &self.arrival
    }

    pub fn arrival_country(&self) -> &CountryCode {
        &self.arrival_country
    }

    pub fn distance(&self) -> Kilometres {
        self.distance
    }

    pub fn flight_type(&self) -> FlightType {
        self.flight_type
    }
}

/// A departure/arrival pair with two different airports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Route {
    departure: IataCode,
    arrival: IataCode,
}

impl Route {
    pub fn new(departure: IataCode, arrival: IataCode) -> Result<Self> {
        if departure == arrival {
            return Err(FlightError::SameAirportError {
                code: departure.to_string(),
            });
        }
        Ok(Self { departure, arrival })
    }

    pub fn departure(&self) -> &IataCode {
        &self.departure
    }

    pub fn arrival(&self) -> &IataCode {
        &self.arrival
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.departure, self.arrival)
    }
}

// 批次輸入格式

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub iata: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightRecord {
    pub departure: Option<EndpointRecord>,
    pub arrival: Option<EndpointRecord>,
}

impl FlightRecord {
    pub fn new(departure: &str, arrival: &str) -> Self {
        Self {
            departure: Some(EndpointRecord {
                iata: Some(departure.to_string()),
            }),
            arrival: Some(EndpointRecord {
                iata: Some(arrival.to_string()),
            }),
        }
    }

    /// Validate both endpoints, reporting every bad field.
    pub fn into_codes(self) -> std::result::Result<(IataCode, IataCode), Vec<FieldViolation>> {
        let mut violations = Vec::new();
        let departure = Self::endpoint("departure", self.departure.as_ref())
            .map_err(|v| violations.push(v))
            .ok();
        let arrival = Self::endpoint("arrival", self.arrival.as_ref())
            .map_err(|v| violations.push(v))
            .ok();

        match (departure, arrival) {
            (Some(departure), Some(arrival)) => Ok((departure, arrival)),
            _ => Err(violations),
        }
    }

    fn endpoint(field_name: &str, endpoint: Option<&EndpointRecord>) -> FieldResult<IataCode> {
        let endpoint = endpoint.ok_or_else(|| FieldViolation::missing(field_name))?;
        let path = format!("{}.iata", field_name);
        let raw = validate_required_field(&path, &endpoint.iata)?;
        IataCode::parse_field(&path, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(code: &str, country: &str, lat: f64, lon: f64) -> Airport {
        Airport::new(
            code,
            IataCode::new(code).unwrap(),
            CountryCode::new(country).unwrap(),
            Coordinate::new(lat, lon).unwrap(),
        )
    }

    #[test]
    fn test_iata_code_is_normalized_to_uppercase() {
        let code = IataCode::new("sfO").unwrap();
        assert_eq!(code.as_str(), "SFO");
        assert_eq!(code, "SFO".parse::<IataCode>().unwrap());
        assert!(IataCode::new("A1b").is_ok());
    }

    #[test]
    fn test_iata_code_rejects_bad_input() {
        for raw in ["", "SF", "SFOO", "S-F", "SF ", "ÄÖÜ", "SF\n"] {
            let err = IataCode::new(raw).unwrap_err();
            assert!(
                matches!(err, FlightError::ValidationError { .. }),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_country_code_validation() {
        assert_eq!(CountryCode::new("us").unwrap().as_str(), "US");
        assert!(CountryCode::new("U1").is_err());
        assert!(CountryCode::new("USA").is_err());
        assert!(CountryCode::new("U").is_err());
    }

    #[test]
    fn test_codes_deserialize_through_validation() {
        let code: IataCode = serde_json::from_str("\"syd\"").unwrap();
        assert_eq!(code.as_str(), "SYD");
        assert!(serde_json::from_str::<IataCode>("\"sydney\"").is_err());
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"SYD\"");
    }

    #[test]
    fn test_coordinate_reports_both_fields() {
        let err = Coordinate::new(91.0, -181.0).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["lat", "lon"]);

        let err = Coordinate::new(0.0, 180.5).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "lon");
    }

    #[test]
    fn test_coordinate_bounds_are_inclusive() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_airport_record_collects_every_violation() {
        let record = AirportRecord {
            name: Some("Nowhere".to_string()),
            code: Some("TOOLONG".to_string()),
            country: None,
            position: Some(PositionRecord {
                lat: Some(123.0),
                lon: Some(200.0),
            }),
        };

        let violations = record.into_airport().unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["code", "country", "position.lat", "position.lon"]);
    }

    #[test]
    fn test_airport_record_into_airport() {
        let airport = Airport::try_from(AirportRecord::new(
            "San Francisco International Airport",
            "sfo",
            "us",
            37.6213,
            -122.3790,
        ))
        .unwrap();

        assert_eq!(airport.code().as_str(), "SFO");
        assert_eq!(airport.country().as_str(), "US");
        assert_eq!(airport.position().as_tuple(), (37.6213, -122.3790));
    }

    #[test]
    fn test_airport_name_may_be_empty_but_not_missing() {
        let airport = Airport::try_from(AirportRecord::new("", "XYZ", "FR", 45.0, 3.0)).unwrap();
        assert_eq!(airport.name(), "");

        let record = AirportRecord {
            name: None,
            ..AirportRecord::new("", "XYZ", "FR", 45.0, 3.0)
        };
        let violations = record.into_airport().unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
    }

    #[test]
    fn test_band_boundaries() {
        let bands = FlightBands::new(1500, 3000).unwrap();
        assert_eq!(bands.classify(1), FlightType::Short);
        assert_eq!(bands.classify(1500), FlightType::Short);
        assert_eq!(bands.classify(1501), FlightType::Middle);
        assert_eq!(bands.classify(3000), FlightType::Middle);
        assert_eq!(bands.classify(3001), FlightType::Long);
    }

    #[test]
    fn test_bands_reject_inverted_thresholds() {
        assert!(FlightBands::new(0, 3000).is_err());
        assert!(FlightBands::new(3000, 3000).is_err());
        assert!(FlightBands::new(3000, 1500).is_err());

        let defaults = FlightBands::default();
        assert_eq!(defaults.short_max_km(), MAX_SHORT_FLIGHT_KM);
        assert_eq!(defaults.middle_max_km(), MAX_MIDDLE_FLIGHT_KM);
    }

    #[test]
    fn test_classified_flight_derives_type_and_serializes() {
        let sfo = airport("SFO", "US", 37.6213, -122.3790);
        let syd = airport("SYD", "AU", -33.9461, 151.1772);
        let flight = ClassifiedFlight::new(&sfo, &syd, 11936, &FlightBands::default()).unwrap();

        assert_eq!(flight.flight_type(), FlightType::Long);
        assert_eq!(
            serde_json::to_value(&flight).unwrap(),
            serde_json::json!({
                "departure": "SFO",
                "departure_country": "US",
                "arrival": "SYD",
                "arrival_country": "AU",
                "distance": 11936,
                "type": "long"
            })
        );
    }

    #[test]
    fn test_classified_flight_rejects_zero_distance() {
        let sfo = airport("SFO", "US", 37.6213, -122.3790);
        let err = ClassifiedFlight::new(&sfo, &sfo, 0, &FlightBands::default()).unwrap_err();
        assert_eq!(err.violations()[0].field, "distance");
    }

    #[test]
    fn test_route_rejects_same_airport() {
        let sfo = IataCode::new("SFO").unwrap();
        let err = Route::new(sfo.clone(), IataCode::new("sfo").unwrap()).unwrap_err();
        assert!(matches!(err, FlightError::SameAirportError { .. }));

        let route = Route::new(sfo, IataCode::new("syd").unwrap()).unwrap();
        assert_eq!(route.to_string(), "SFO-SYD");
    }

    #[test]
    fn test_flight_record_reports_both_endpoints() {
        let record = FlightRecord {
            departure: Some(EndpointRecord { iata: None }),
            arrival: Some(EndpointRecord {
                iata: Some("toolong".to_string()),
            }),
        };
        let violations = record.into_codes().unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["departure.iata", "arrival.iata"]);

        let missing = FlightRecord::default().into_codes().unwrap_err();
        assert_eq!(missing.len(), 2);
        assert_eq!(missing[0].field, "departure");
    }
}

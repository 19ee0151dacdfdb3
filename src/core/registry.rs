use crate::domain::model::{Airport, AirportRecord, IataCode, MatchBy};
use crate::utils::error::{FieldViolation, FlightError, Result};

/// Immutable, ordered collection of airports loaded once per run.
///
/// Codes are not required to be unique. Lookups return the first match in
/// registry order, so duplicate codes resolve deterministically to the
/// earliest record.
#[derive(Debug, Clone, Default)]
pub struct AirportRegistry {
    airports: Vec<Airport>,
}

impl AirportRegistry {
    pub fn new(airports: Vec<Airport>) -> Self {
        Self { airports }
    }

    /// Validate every record. Any invalid field fails the whole load, and the
    /// error lists every violation of every record.
    pub fn from_records(records: Vec<AirportRecord>) -> Result<Self> {
        let mut airports = Vec::with_capacity(records.len());
        let mut violations = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            match record.into_airport() {
                Ok(airport) => airports.push(airport),
                Err(problems) => {
                    let prefix = format!("[{}]", index);
                    violations.extend(problems.into_iter().map(|v| v.nested(&prefix)));
                }
            }
        }

        if !violations.is_empty() {
            return Err(FlightError::MalformedRegistryError { violations });
        }

        tracing::debug!("Loaded {} airports", airports.len());
        Ok(Self::new(airports))
    }

    /// Parse a JSON array of airport records.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_str(content)?;
        Self::from_json_values(values)
    }

    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_slice(data)?;
        Self::from_json_values(values)
    }

    fn from_json_values(values: Vec<serde_json::Value>) -> Result<Self> {
        let mut records = Vec::with_capacity(values.len());
        let mut violations = Vec::new();

        // 型別錯誤（例如 lat 是字串）也以欄位違規回報
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<AirportRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => violations.push(FieldViolation::new(
                    format!("[{}]", index),
                    "",
                    format!("not an airport record: {}", e),
                )),
            }
        }

        if !violations.is_empty() {
            return Err(FlightError::MalformedRegistryError { violations });
        }

        Self::from_records(records)
    }

    /// Linear scan returning the first matching airport.
    ///
    /// `MatchBy::Code` compares codes case-insensitively; `MatchBy::Name`
    /// matches a case-insensitive substring of the airport name.
    pub fn find(&self, query: &str, match_by: MatchBy) -> Result<&Airport> {
        let needle = query.to_lowercase();
        self.airports
            .iter()
            .find(|airport| match match_by {
                MatchBy::Code => airport.code().as_str().to_lowercase() == needle,
                MatchBy::Name => airport.name().to_lowercase().contains(&needle),
            })
            .ok_or_else(|| FlightError::AirportNotFoundError {
                query: needle,
                match_by,
            })
    }

    pub fn find_by_code(&self, code: &IataCode) -> Result<&Airport> {
        self.find(code.as_str(), MatchBy::Code)
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

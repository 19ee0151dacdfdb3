use crate::core::classifier::FlightClassifier;
use crate::domain::model::{ClassifiedFlight, FlightRecord, IataCode, Route};
use crate::utils::error::{FieldViolation, FlightError, Result};
use std::collections::BTreeSet;

/// Validated batch input: one code pair per input record, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchInput {
    pairs: Vec<(IataCode, IataCode)>,
}

impl BatchInput {
    pub fn new(pairs: Vec<(IataCode, IataCode)>) -> Self {
        Self { pairs }
    }

    /// Validate every record before anything is classified. A single bad
    /// record fails the whole batch, and every bad field is reported.
    pub fn from_records(records: Vec<FlightRecord>) -> Result<Self> {
        let mut pairs = Vec::with_capacity(records.len());
        let mut violations = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            match record.into_codes() {
                Ok(pair) => pairs.push(pair),
                Err(problems) => {
                    let prefix = format!("[{}]", index);
                    violations.extend(problems.into_iter().map(|v| v.nested(&prefix)));
                }
            }
        }

        if !violations.is_empty() {
            return Err(FlightError::MalformedBatchInputError { violations });
        }
        Ok(Self::new(pairs))
    }

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

        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<FlightRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => violations.push(FieldViolation::new(
                    format!("[{}]", index),
                    "",
                    format!("not a flight record: {}", e),
                )),
            }
        }

        if !violations.is_empty() {
            return Err(FlightError::MalformedBatchInputError { violations });
        }
        Self::from_records(records)
    }

    pub fn pairs(&self) -> &[(IataCode, IataCode)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A pair that could not be classified.
#[derive(Debug)]
pub struct RouteFailure {
    pub route: Route,
    pub error: FlightError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per successfully classified unique route, sorted by route.
    pub flights: Vec<ClassifiedFlight>,
    pub failures: Vec<RouteFailure>,
    pub skipped_same_airport: usize,
    pub duplicates: usize,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Classifies a batch of code pairs, isolating per-route failures.
pub struct BatchProcessor<'c, 'r> {
    classifier: &'c FlightClassifier<'r>,
}

impl<'c, 'r> BatchProcessor<'c, 'r> {
    pub fn new(classifier: &'c FlightClassifier<'r>) -> Self {
        Self { classifier }
    }

    /// Deduplicate the pairs, drop same-airport pairs, then classify each
    /// remaining route on its own. A failing route is recorded in
    /// [`BatchReport::failures`] and does not stop the others.
    pub fn process<I>(&self, pairs: I) -> BatchReport
    where
        I: IntoIterator<Item = (IataCode, IataCode)>,
    {
        let mut report = BatchReport::default();
        let mut routes = BTreeSet::new();

        for (departure, arrival) in pairs {
            match Route::new(departure, arrival) {
                Ok(route) => {
                    if !routes.insert(route) {
                        report.duplicates += 1;
                    }
                }
                Err(e) => {
                    tracing::debug!("Skipping pair: {}", e);
                    report.skipped_same_airport += 1;
                }
            }
        }

        for route in routes {
            tracing::debug!("trying {}", route);
            match self.classifier.classify_route(&route) {
                Ok(flight) => report.flights.push(flight),
                Err(error) => {
                    tracing::warn!("⚠️ Could not classify {}: {}", route, error);
                    report.failures.push(RouteFailure { route, error });
                }
            }
        }

        tracing::info!(
            "Classified {} route(s), {} failed, {} duplicate(s), {} same-airport pair(s) skipped",
            report.flights.len(),
            report.failures.len(),
            report.duplicates,
            report.skipped_same_airport
        );

        report
    }

    pub fn process_input(&self, input: BatchInput) -> BatchReport {
        self.process(input.pairs)
    }
}

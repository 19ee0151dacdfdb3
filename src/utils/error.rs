use crate::domain::model::MatchBy;
use thiserror::Error;

/// 單一欄位違反約束
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason} (got {value:?})")]
pub struct FieldViolation {
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "", "missing required field")
    }

    /// Prefix the field path, e.g. `lat` -> `[3].position.lat`.
    pub fn nested(mut self, prefix: &str) -> Self {
        self.field = if self.field.starts_with('[') {
            format!("{}{}", prefix, self.field)
        } else {
            format!("{}.{}", prefix, self.field)
        };
        self
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum FlightError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {}", join_violations(.violations))]
    ValidationError { violations: Vec<FieldViolation> },

    #[error("Malformed airport registry: {}", join_violations(.violations))]
    MalformedRegistryError { violations: Vec<FieldViolation> },

    #[error("Malformed batch input: {}", join_violations(.violations))]
    MalformedBatchInputError { violations: Vec<FieldViolation> },

    #[error("Airport not found ({query}, {match_by})")]
    AirportNotFoundError { query: String, match_by: MatchBy },

    #[error("Distance computation did not converge after {iterations} iterations")]
    DistanceComputationError { iterations: usize },

    #[error("Can't classify a flight from one airport to itself ({code})")]
    SameAirportError { code: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Registry,
    Lookup,
    Computation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FlightError {
    pub fn validation(violation: FieldViolation) -> Self {
        Self::ValidationError {
            violations: vec![violation],
        }
    }

    /// All field violations carried by this error, empty for non-validation kinds.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::ValidationError { violations }
            | Self::MalformedRegistryError { violations }
            | Self::MalformedBatchInputError { violations } => violations,
            _ => &[],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) => ErrorCategory::System,
            Self::SerializationError(_) => ErrorCategory::Input,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::ValidationError { .. }
            | Self::MalformedBatchInputError { .. }
            | Self::SameAirportError { .. } => ErrorCategory::Input,
            Self::MalformedRegistryError { .. } => ErrorCategory::Registry,
            Self::AirportNotFoundError { .. } => ErrorCategory::Lookup,
            Self::DistanceComputationError { .. } => ErrorCategory::Computation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 同一機場：不是錯誤，只是沒有輸出
            Self::SameAirportError { .. } => ErrorSeverity::Low,
            Self::AirportNotFoundError { .. } | Self::DistanceComputationError { .. } => {
                ErrorSeverity::Medium
            }
            Self::ValidationError { .. }
            | Self::MalformedBatchInputError { .. }
            | Self::SerializationError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::MalformedRegistryError { .. } | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::IoError(_) => {
                "Check that the file exists and that you have permission to read or write it"
            }
            Self::SerializationError(_) => "Make sure the file contains valid JSON",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file or the command line overrides"
            }
            Self::ValidationError { .. } => {
                "IATA codes are 3 letters or digits, country codes 2 letters, |lat| <= 90 and |lon| <= 180"
            }
            Self::MalformedRegistryError { .. } => {
                "Repair the listed airport records in the registry file"
            }
            Self::MalformedBatchInputError { .. } => {
                "Every batch record needs departure.iata and arrival.iata with a valid IATA code"
            }
            Self::AirportNotFoundError { .. } => {
                "Check the airport code, or use `find --by name` to search"
            }
            Self::DistanceComputationError { .. } => {
                "The airports are nearly antipodal; the geodesic cannot be resolved for this pair"
            }
            Self::SameAirportError { .. } => "Use two different airports",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::AirportNotFoundError { .. } => {
                format!("At least one airport not found: {}", self)
            }
            Self::SameAirportError { .. } => {
                "Can't classify a flight from one airport to itself".to_string()
            }
            Self::MalformedRegistryError { violations } => format!(
                "The airport registry is corrupt ({} invalid field(s))",
                violations.len()
            ),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlightError>;

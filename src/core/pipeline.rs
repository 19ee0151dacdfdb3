use crate::core::batch::{BatchInput, BatchProcessor, BatchReport};
use crate::core::classifier::FlightClassifier;
use crate::core::registry::AirportRegistry;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;
use serde::Serialize;

/// Read the registry file through `storage` and validate it.
pub async fn load_registry<S: Storage>(storage: &S, path: &str) -> Result<AirportRegistry> {
    tracing::debug!("Loading airport registry from: {}", path);
    let data = storage.read_file(path).await?;
    let registry = AirportRegistry::from_json_slice(&data)?;
    tracing::info!("📚 Loaded {} airports from {}", registry.len(), path);
    Ok(registry)
}

pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Batch classification: read flight records, classify, write the results.
pub struct ClassifyPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    registry: AirportRegistry,
    read_from: String,
    write_to: Option<String>,
}

impl<S: Storage, C: ConfigProvider> ClassifyPipeline<S, C> {
    /// Without `write_to` the results go to stdout.
    pub fn new(
        storage: S,
        config: C,
        registry: AirportRegistry,
        read_from: String,
        write_to: Option<String>,
    ) -> Self {
        Self {
            storage,
            config,
            registry,
            read_from,
            write_to,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ClassifyPipeline<S, C> {
    async fn extract(&self) -> Result<BatchInput> {
        tracing::debug!("Reading flights from: {}", self.read_from);
        let data = self.storage.read_file(&self.read_from).await?;
        BatchInput::from_json_slice(&data)
    }

    async fn transform(&self, input: BatchInput) -> Result<BatchReport> {
        let classifier =
            FlightClassifier::new(&self.registry, self.config.bands()?, self.config.ellipsoid()?);
        Ok(BatchProcessor::new(&classifier).process_input(input))
    }

    async fn load(&self, report: BatchReport) -> Result<String> {
        for failure in &report.failures {
            eprintln!("❌ {}: {}", failure.route, failure.error.user_friendly_message());
        }

        let json = to_json(&report.flights, self.config.pretty_output())?;

        match &self.write_to {
            Some(path) => {
                self.storage.write_file(path, json.as_bytes()).await?;
                Ok(path.clone())
            }
            None => {
                println!("{}", json);
                Ok("stdout".to_string())
            }
        }
    }
}

use anyhow::Result;
use flight_distance::{
    load_registry, AppConfig, BatchRunner, ClassifyPipeline, FlightError, LocalStorage,
};
use tempfile::TempDir;

const REGISTRY_JSON: &str = r#"[
    {"name": "San Francisco International Airport", "code": "SFO", "country": "US", "position": {"lat": 37.6213, "lon": -122.3790}},
    {"name": "Sydney Kingsford Smith Airport", "code": "SYD", "country": "AU", "position": {"lat": -33.9461, "lon": 151.1772}},
    {"name": "Karlsruhe/Baden-Baden Airport", "code": "FKB", "country": "DE", "position": {"lat": 48.7794, "lon": 8.0805}},
    {"name": "Albacete Airport", "code": "ABC", "country": "ES", "position": {"lat": 38.9485, "lon": -1.8635}},
    {"name": "Lisbon Humberto Delgado Airport", "code": "LIS", "country": "PT", "position": {"lat": 38.7742, "lon": -9.1342}},
    {"name": "Frankfurt Airport", "code": "FRA", "country": "DE", "position": {"lat": 50.0379, "lon": 8.5622}}
]"#;

fn setup(flights_json: &str) -> Result<(TempDir, LocalStorage)> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("airports.json"), REGISTRY_JSON)?;
    std::fs::write(temp_dir.path().join("flights.json"), flights_json)?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    Ok((temp_dir, storage))
}

/// 去重、略過同機場、隔離找不到的機場
#[tokio::test]
async fn test_batch_end_to_end() -> Result<()> {
    let (temp_dir, storage) = setup(
        r#"[
            {"departure": {"iata": "SFO"}, "arrival": {"iata": "SYD"}},
            {"departure": {"iata": "sfo"}, "arrival": {"iata": "syd"}},
            {"departure": {"iata": "SFO"}, "arrival": {"iata": "SFO"}},
            {"departure": {"iata": "FKB"}, "arrival": {"iata": "ABC"}},
            {"departure": {"iata": "LIS"}, "arrival": {"iata": "FRA"}},
            {"departure": {"iata": "XXX"}, "arrival": {"iata": "FRA"}}
        ]"#,
    )?;

    let registry = load_registry(&storage, "airports.json").await?;
    assert_eq!(registry.len(), 6);

    let pipeline = ClassifyPipeline::new(
        storage,
        AppConfig::default(),
        registry,
        "flights.json".to_string(),
        Some("out/classified.json".to_string()),
    );
    let output = BatchRunner::new(pipeline).run().await?;
    assert_eq!(output, "out/classified.json");

    let written = std::fs::read_to_string(temp_dir.path().join("out/classified.json"))?;
    let flights: Vec<serde_json::Value> = serde_json::from_str(&written)?;
    assert_eq!(flights.len(), 3);

    // 依 (departure, arrival) 排序
    assert_eq!(
        flights[0],
        serde_json::json!({
            "departure": "FKB",
            "departure_country": "DE",
            "arrival": "ABC",
            "arrival_country": "ES",
            "distance": 1351,
            "type": "short"
        })
    );
    assert_eq!(flights[1]["departure"], "LIS");
    assert_eq!(flights[1]["type"], "middle");
    assert_eq!(flights[2]["departure"], "SFO");
    assert_eq!(flights[2]["distance"], 11936);
    assert_eq!(flights[2]["type"], "long");

    Ok(())
}

#[tokio::test]
async fn test_malformed_batch_input_aborts_before_classification() -> Result<()> {
    let (temp_dir, storage) = setup(
        r#"[
            {"departure": {"iata": "SFO"}, "arrival": {"iata": "SYD"}},
            {"departure": {"iata": "TOOLONG"}, "arrival": {"iata": "SYD"}}
        ]"#,
    )?;

    let registry = load_registry(&storage, "airports.json").await?;
    let pipeline = ClassifyPipeline::new(
        storage,
        AppConfig::default(),
        registry,
        "flights.json".to_string(),
        Some("classified.json".to_string()),
    );

    let err = BatchRunner::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, FlightError::MalformedBatchInputError { .. }));
    assert_eq!(err.violations()[0].field, "[1].departure.iata");
    assert!(!temp_dir.path().join("classified.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_inverted_bands_fail_the_batch() -> Result<()> {
    let (temp_dir, storage) = setup(
        r#"[{"departure": {"iata": "FKB"}, "arrival": {"iata": "ABC"}}]"#,
    )?;

    let mut config = AppConfig::default();
    config.bands.short_max_km = 3000;
    config.bands.middle_max_km = 1500;

    let registry = load_registry(&storage, "airports.json").await?;
    let pipeline = ClassifyPipeline::new(
        storage,
        config,
        registry,
        "flights.json".to_string(),
        Some("classified.json".to_string()),
    );

    let err = BatchRunner::new(pipeline).run().await.unwrap_err();
    assert!(matches!(
        err,
        FlightError::InvalidConfigValueError { ref field, .. } if field == "bands.middle_max_km"
    ));
    assert!(!temp_dir.path().join("classified.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_corrupt_registry_fails_to_load() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("airports.json"),
        r#"[{"name": "Nowhere", "code": "NWH", "country": "XX", "position": {"lat": -91.0, "lon": 0.0}}]"#,
    )?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

    let err = load_registry(&storage, "airports.json").await.unwrap_err();
    assert!(matches!(err, FlightError::MalformedRegistryError { .. }));
    assert_eq!(err.violations()[0].field, "[0].position.lat");

    let missing = load_registry(&storage, "missing.json").await.unwrap_err();
    assert!(matches!(missing, FlightError::IoError(_)));

    Ok(())
}

use clap::Parser;
use flight_distance::core::pipeline::to_json;
use flight_distance::core::ConfigProvider;
use flight_distance::domain::ports::Storage;
use flight_distance::utils::error::ErrorSeverity;
use flight_distance::utils::{logger, validation::Validate};
use flight_distance::{
    load_registry, AirportRegistry, AppConfig, BatchRunner, ClassifyPipeline, CliConfig, Command,
    FlightClassifier, FlightError, FlightType, IataCode, LocalStorage, Route,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        let exit_code = match e.downcast_ref::<FlightError>() {
            Some(error) => {
                tracing::error!(
                    "❌ {} (Category: {:?}, Severity: {:?})",
                    error,
                    error.category(),
                    error.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());
                eprintln!("❌ {}", error.user_friendly_message());
                eprintln!("💡 {}", error.recovery_suggestion());

                // 根據錯誤嚴重程度決定退出碼
                match error.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                }
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                1
            }
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    let config = cli.app_config()?;

    // 驗證配置
    config.validate()?;

    let storage = LocalStorage::default();

    match cli.command {
        Command::Classify {
            departure,
            arrival,
            write_to,
        } => {
            // 同一機場在載入註冊表之前就拒絕
            let route = Route::new(IataCode::new(&departure)?, IataCode::new(&arrival)?)?;
            let registry = load_registry(&storage, config.registry_path()).await?;
            let classifier =
                FlightClassifier::new(&registry, config.bands()?, config.ellipsoid()?);
            let flight = classifier.classify_route(&route)?;
            let json = to_json(&flight, config.pretty_output())?;

            match write_to {
                Some(path) => {
                    storage.write_file(&path, json.as_bytes()).await?;
                    tracing::info!("📁 Output saved to: {}", path);
                }
                None => println!("{}", json),
            }
        }
        Command::ClassifyBatch {
            read_from,
            write_to,
        } => {
            let registry = load_registry(&storage, config.registry_path()).await?;
            let pipeline = ClassifyPipeline::new(
                storage,
                config,
                registry,
                read_from,
                write_to.filter(|path| !path.is_empty()),
            );
            BatchRunner::new(pipeline).run().await?;
        }
        Command::Find { query, by } => {
            let registry = load_registry(&storage, config.registry_path()).await?;
            let airport = registry.find(&query, by)?;
            println!("{}", to_json(airport, config.pretty_output())?);
        }
        Command::Check => {
            let registry = load_registry(&storage, config.registry_path()).await?;
            self_check(&registry, &config)?;
            println!("Everything seems to work");
        }
    }

    Ok(())
}

/// Known distances that must hold for a WGS-84 registry with the EU bands.
fn self_check(registry: &AirportRegistry, config: &AppConfig) -> anyhow::Result<()> {
    let classifier = FlightClassifier::new(registry, config.bands()?, config.ellipsoid()?);
    let expectations = [
        ("SFO", "SYD", 11936, FlightType::Long),
        ("FKB", "ABC", 1351, FlightType::Short),
    ];

    for (departure, arrival, distance, flight_type) in expectations {
        let flight = classifier.classify(&IataCode::new(departure)?, &IataCode::new(arrival)?)?;
        anyhow::ensure!(
            flight.distance() == distance,
            "{}-{}: expected {} km, got {} km",
            departure,
            arrival,
            distance,
            flight.distance()
        );
        anyhow::ensure!(
            flight.flight_type() == flight_type,
            "{}-{}: expected {}, got {}",
            departure,
            arrival,
            flight_type,
            flight.flight_type()
        );
        tracing::info!("✅ {}-{}: {} km, {}", departure, arrival, distance, flight_type);
    }

    Ok(())
}

pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::{CliConfig, Command};

#[cfg(feature = "cli")]
mod args {
    use super::toml_config::AppConfig;
    use crate::domain::model::{Kilometres, MatchBy};
    use crate::utils::error::Result;
    use clap::{Parser, Subcommand};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "flight-distance")]
    #[command(
        about = "Calculate flight distance (using Vincenty's formulae) and classify flights (EU short/middle/long)"
    )]
    pub struct CliConfig {
        /// Path to a TOML configuration file
        #[arg(long, global = true)]
        pub config: Option<String>,

        /// Override the airport registry path
        #[arg(long, global = true)]
        pub registry: Option<String>,

        /// Override the upper bound of a short flight (km)
        #[arg(long, global = true)]
        pub short_max_km: Option<Kilometres>,

        /// Override the upper bound of a middle flight (km)
        #[arg(long, global = true)]
        pub middle_max_km: Option<Kilometres>,

        #[arg(long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Emit logs as JSON")]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Classify a single flight
        Classify {
            departure: String,
            arrival: String,
            /// Write the result to a file instead of stdout
            #[arg(long)]
            write_to: Option<String>,
        },
        /// Classify every unique flight of a JSON input list
        ClassifyBatch {
            read_from: String,
            write_to: Option<String>,
        },
        /// Look up an airport by code or by a fragment of its name
        Find {
            query: String,
            #[arg(long, value_enum, default_value_t = MatchBy::Code)]
            by: MatchBy,
        },
        /// Check the registry against known distances
        Check,
    }

    impl CliConfig {
        /// Configuration file (or defaults) with command line overrides applied.
        pub fn app_config(&self) -> Result<AppConfig> {
            let mut config = match &self.config {
                Some(path) => {
                    tracing::info!("📁 Loading configuration from: {}", path);
                    AppConfig::from_file(path)?
                }
                None => AppConfig::default(),
            };

            // 套用命令列覆蓋設定
            if let Some(registry) = &self.registry {
                config.registry.path = registry.clone();
            }
            if let Some(short_max_km) = self.short_max_km {
                config.bands.short_max_km = short_max_km;
            }
            if let Some(middle_max_km) = self.middle_max_km {
                config.bands.middle_max_km = middle_max_km;
            }

            Ok(config)
        }
    }

}

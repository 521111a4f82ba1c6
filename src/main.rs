use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

use drone_czml::web::{self, config::ConfigError, Config};

#[derive(Parser)]
#[command(name = "drone-czml")]
#[command(about = "Stream live drone telemetry to Cesium as CZML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the streaming server
    Serve {
        /// YAML config file; defaults are used when omitted
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Validate a config file and print the effective settings
    Validate { config: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()),
        Commands::Validate { config } => validate(&config),
    }
}

fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

fn validate(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_yaml::to_string(&config) {
        Ok(yaml) => {
            println!("Config is valid");
            print!("{}", yaml);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error printing config: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn serve(path: Option<&str>) -> ExitCode {
    let config = match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async move {
        let shutdown = CancellationToken::new();
        tokio::spawn(watch_interrupt(shutdown.clone()));

        match web::run_server(config, shutdown).await {
            Ok(()) => {
                log::info!("Server stopped");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{}", e);
                ExitCode::FAILURE
            }
        }
    })
}

async fn watch_interrupt(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            log::info!("Interrupt received");
            shutdown.cancel();
        }
        Err(e) => log::error!("Unable to listen for interrupt: {}", e),
    }
}

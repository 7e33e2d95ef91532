// src/main.rs

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sheetrows::cli::{self, Cli};
use sheetrows::settings::{io::load_settings_from_file, AppSettings};

fn main() {
    // A missing .env is the normal case
    let _ = dotenvy::dotenv();

    let args = Cli::parse();

    let settings: AppSettings = match load_settings_from_file::<AppSettings>() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Ignoring unreadable settings file: {}", e);
            AppSettings::default()
        }
    }
    .with_env_overrides();

    setup_tracing(&settings, args.verbose);

    if let Err(e) = cli::run(args, &settings) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn setup_tracing(settings: &AppSettings, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

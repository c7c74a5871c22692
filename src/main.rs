use std::process::ExitCode;

use clap::Parser;

use transpalentor::cli::{self, CliArgs};
use transpalentor::config::Config;
use transpalentor::logger;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: could not load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = if args.verbose {
        config.level_filter().max(log::LevelFilter::Debug)
    } else {
        config.level_filter()
    };
    logger::init(level);
    log::info!("storage root: {}", config.storage_root.display());

    cli::run(args, &config)
}

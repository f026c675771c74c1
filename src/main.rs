use clap::Parser;
use env_logger::Env;
use log::info;

use revoice::cli::{commands, Cli, Commands};
use revoice::RevoiceError;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Revoice v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Record { output, duration } => commands::record(&output, duration),
        Commands::Play { file, transform } => commands::play(&file, transform),
        Commands::Info { file } => commands::info(&file),
    };

    if let Err(err) = result {
        match err.downcast_ref::<RevoiceError>() {
            Some(e) => eprintln!("error[{}]: {}", e.error_code(), e.user_message()),
            None => eprintln!("error: {:#}", err),
        }
        std::process::exit(1);
    }
}

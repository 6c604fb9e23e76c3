use clap::Parser;
use log::{error, info};

use ticklist::{App, Cli, Config, FileStore, Result, SystemClock, TimerRepository, TodoRepository};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.data_dir {
        Some(data_dir) => Config::with_data_dir(data_dir),
        None => Config::default(),
    };
    info!("Using data directory: {}", config.data_dir.display());

    let timers = TimerRepository::new(
        FileStore::new(config.data_dir.clone())?,
        SystemClock,
        &config,
    );
    let todos = TodoRepository::new(FileStore::new(config.data_dir.clone())?, &config);

    App::new(timers, todos).run(cli.command)
}

fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

use clap::Parser;
use log::info;

use agenda::{App, Cli, Config, NoteStore};

fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();
}

fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    let config = match cli.data_file {
        Some(path) => Config::with_data_file(path),
        None => Config::default(),
    };
    info!("Using snapshot file {}", config.data_file.display());

    let store = NoteStore::open(config.clone());
    let mut app = App::new(store, config);

    if let Err(e) = app.run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

//! Stable Fluids
//!
//! Usage: `stable_fluids [config.json]`

use std::path::Path;

use stable_fluids::{app, AppConfig, AppError};

fn main() {
    env_logger::init();

    if let Err(error) = run() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            AppConfig::load_json(Path::new(&path))?
        }
        None => AppConfig::default(),
    };
    app::run(config)
}

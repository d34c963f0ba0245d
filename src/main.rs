use log::debug;

use crate::shell::Shell;
use crate::utils::config::Config;
use crate::utils::log::init_logger;

mod shell;
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    if let Err(e) = init_logger(&config) {
        eprintln!(
            "{}: logging disabled, cannot use {}: {}",
            config.name,
            config.logger_dir.display(),
            e
        );
    }
    debug!("config dir {}", config.config_dir.display());

    let mut shell = Shell::new(&config)?;
    shell.run()?;
    Ok(())
}

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;

/// Sets up `env_logger`. `RUST_LOG` overrides the default `warn` level.
///
/// With a log file everything goes there. Without one, the TUI drops log
/// output so it does not draw over the alternate screen, and one-shot
/// commands log to stderr.
pub fn init(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        None if interactive => {
            builder.filter_level(LevelFilter::Off);
        }
        None => {}
    }

    builder.try_init().context("Failed to initialize logger")?;
    Ok(())
}

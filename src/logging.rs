use std::fs::File;
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes the global logger.
///
/// When `verbose` is `true`, debug messages are included; otherwise info and
/// above. `RUST_LOG` still wins when set. The terminal front-end owns stdout
/// and stderr while a run is on screen, so output goes to `log_file` when one
/// is given.
pub fn init(verbose: bool, log_file: Option<&Path>) -> io::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    if let Some(path) = log_file {
        builder.target(Target::Pipe(Box::new(File::create(path)?)));
    }

    // `try_init` only fails if a logger was already set. Ignore that case so
    // tests can call `init` multiple times without panicking.
    let _ = builder.try_init();
    Ok(())
}

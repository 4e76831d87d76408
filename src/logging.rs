// In: src/logging.rs

//! Opt-in diagnostic output for the binding's `log` records.

use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Once;

use crate::error::Result;

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend at `debug` level, printing `[LEVEL] message`
/// lines to stderr, or appending them to `log_file` when given. `RUST_LOG`
/// still overrides the level.
///
/// Only the first call installs a logger; later calls are no-ops apart from
/// opening (and creating) their log file.
pub fn enable_verbose_logging(log_file: Option<PathBuf>) -> Result<()> {
    let file = log_file
        .map(|path| OpenOptions::new().append(true).create(true).open(path))
        .transpose()?;

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Debug);
        builder.parse_default_env();

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });

    Ok(())
}

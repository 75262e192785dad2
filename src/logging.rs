use crate::config::Settings;
use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// `$HOME/.local/share/midibridge/logs`, unless the settings name another
/// directory.
pub fn log_dir(settings: &Settings) -> Result<PathBuf, Error> {
    if let Some(dir) = &settings.log_dir {
        return Ok(dir.clone());
    }
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("midibridge")
        .join("logs"))
}

/// Installs the process-wide logger: a file log at the configured level, plus
/// an info-level stderr log when `verbose` is set. Returns the log file path.
pub fn init_logger(settings: &Settings, verbose: bool) -> Result<PathBuf, Error> {
    let log_dir = log_dir(settings)?;
    fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("app.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let config = Config::default();
    let level = settings.log_level;

    INIT.call_once(|| {
        let mut loggers: Vec<Box<dyn SharedLogger>> =
            vec![WriteLogger::new(level, config.clone(), log_file)];
        if verbose {
            loggers.push(TermLogger::new(
                LevelFilter::Info,
                config,
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ));
        }
        if CombinedLogger::init(loggers).is_ok() {
            LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
        }
    });

    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(log_path)
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}

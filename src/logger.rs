//! `log` backend for the CLI.
//!
//! Records go to `<data dir>/Transpalentor/transpalentor.log`, where the data
//! dir is `%APPDATA%` on Windows, `~/Library/Application Support` on macOS and
//! `$XDG_DATA_HOME` (or `~/.local/share`) elsewhere. The file is truncated on
//! every start. Warnings and errors are also echoed to stderr.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, LevelFilter, Log, Metadata, Record};

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOGGER: SessionLogger = SessionLogger;

struct SessionLogger;

impl Log for SessionLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), &record.args().to_string());
        write_line(&line);
        if record.level() <= Level::Warn {
            eprintln!("{}", line);
        }
    }

    fn flush(&self) {
        if let Some(mutex) = LOG_FILE.get()
            && let Ok(mut file) = mutex.lock()
        {
            let _ = file.flush();
        }
    }
}

/// Returns the path to the current session log file.
pub fn log_path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}

/// Write a raw line to the session log. I/O errors are ignored so that
/// logging never takes the process down.
pub fn write_line(line: &str) {
    if let Some(mutex) = LOG_FILE.get()
        && let Ok(mut file) = mutex.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

fn format_line(level: Level, msg: &str) -> String {
    format!("[{}] [{}] {}", timestamp(), level, msg)
}

/// Initialise the session logger at `level`. Safe to call more than once;
/// only the first call opens the file and installs the logger.
///
/// * Creates (or truncates) the log file.
/// * Installs a panic hook that writes the panic message to the log before
///   propagating to the default handler.
pub fn init(level: LevelFilter) {
    log::set_max_level(level);
    if log::set_logger(&LOGGER).is_err() {
        return;
    }

    let path = log_file_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path);

    match file {
        Ok(f) => {
            let _ = LOG_PATH.set(path.clone());
            let _ = LOG_FILE.set(Mutex::new(f));
        }
        Err(e) => {
            // No file: stderr mirroring of warnings still works
            eprintln!("[logger] Failed to open log file {:?}: {}", path, e);
            return;
        }
    }

    write_line(&format!("=== Transpalentor session started {} UTC ===", timestamp()));
    write_line(&format!("Log file: {}", path.display()));
    write_line("");

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write_line(&format_line(Level::Error, &format!("PANIC: {}", info)));
        prev(info);
    }));
}

fn log_file_path() -> PathBuf {
    data_dir().join("Transpalentor").join("transpalentor.log")
}

/// Per-user data directory for the current platform, `.` if none is known.
fn data_dir() -> PathBuf {
    let var = |name: &str| std::env::var_os(name).map(PathBuf::from);
    let dir = if cfg!(target_os = "windows") {
        var("APPDATA")
    } else if cfg!(target_os = "macos") {
        var("HOME").map(|home| home.join("Library").join("Application Support"))
    } else {
        var("XDG_DATA_HOME").or_else(|| var("HOME").map(|home| home.join(".local").join("share")))
    };
    dir.unwrap_or_else(|| PathBuf::from("."))
}

fn timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    clock(secs)
}

/// `HH:MM:SS` UTC for a unix time.
fn clock(unix_secs: u64) -> String {
    let day = unix_secs % 86_400;
    format!("{:02}:{:02}:{:02}", day / 3600, day % 3600 / 60, day % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_format() {
        let line = format_line(Level::Warn, "disk almost full");
        assert!(line.ends_with("[WARN] disk almost full"), "{line}");
        assert_eq!(line.as_bytes()[0], b'[');
        assert_eq!(&line[9..11], "] ");
    }

    #[test]
    fn clock_wraps_at_midnight() {
        assert_eq!(clock(0), "00:00:00");
        assert_eq!(clock(3_723), "01:02:03");
        assert_eq!(clock(86_399), "23:59:59");
        assert_eq!(clock(86_400 + 61), "00:01:01");
        assert_eq!(timestamp().len(), 8);
    }
}

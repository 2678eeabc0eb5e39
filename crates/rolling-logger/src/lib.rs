//! Rolling Logger
//!
//! File logger that rolls by size and keeps the most recent lines in memory.
//!
//! `init_logger` installs a global `tracing` subscriber (which also captures
//! records emitted through the `log` facade). Output goes to
//! `<dir>/<app_name>.log`; when that file passes the size limit it is shifted
//! to `<app_name>.log.1`, `.1` to `.2`, and so on, keeping `max_files` old files.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Errors raised while setting up or using the logger
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("log directory error: {0}")]
    Io(#[from] io::Error),
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
    #[error("invalid log filter: {0}")]
    Filter(String),
}

/// Tunables for `init_logger_with`
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Roll the active file once it grows past this many bytes
    pub max_file_bytes: u64,
    /// Number of rolled files kept next to the active one
    pub max_files: usize,
    /// Lines kept in the in-memory buffer
    pub buffer_lines: usize,
    /// `EnvFilter` directive, e.g. `"info"` or `"kanban_order=debug"`
    pub filter: String,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_files: 3,
            buffer_lines: 500,
            filter: "info".to_string(),
        }
    }
}

/// Fixed-capacity buffer of the latest log lines
#[derive(Debug)]
pub struct LineBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Size-rolled log file
#[derive(Debug)]
pub struct RollingFile {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(dir: &Path, app_name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = active_path(dir, app_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            max_bytes,
            max_files,
            file,
            written,
        })
    }

    pub fn path(&self) -> PathBuf {
        active_path(&self.dir, &self.app_name)
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_files == 0 {
            self.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(self.path())?;
            self.written = 0;
            return Ok(());
        }

        let oldest = rolled_path(&self.dir, &self.app_name, self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.max_files).rev() {
            let from = rolled_path(&self.dir, &self.app_name, n);
            if from.exists() {
                fs::rename(&from, rolled_path(&self.dir, &self.app_name, n + 1))?;
            }
        }
        fs::rename(self.path(), rolled_path(&self.dir, &self.app_name, 1))?;

        self.file = OpenOptions::new().create(true).append(true).open(self.path())?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.roll()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn active_path(dir: &Path, app_name: &str) -> PathBuf {
    dir.join(format!("{}.log", app_name))
}

fn rolled_path(dir: &Path, app_name: &str, n: usize) -> PathBuf {
    dir.join(format!("{}.log.{}", app_name, n))
}

#[derive(Debug)]
struct Sink {
    file: RollingFile,
    buffer: LineBuffer,
}

/// Cloneable writer handed to the fmt layer
#[derive(Debug, Clone)]
pub struct SinkWriter {
    inner: Arc<Mutex<Sink>>,
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut sink = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink poisoned"))?;
        let n = sink.file.write(buf)?;
        for line in String::from_utf8_lossy(&buf[..n]).lines() {
            if !line.is_empty() {
                sink.buffer.push(line.to_string());
            }
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut sink = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink poisoned"))?;
        sink.file.flush()
    }
}

impl<'a> MakeWriter<'a> for SinkWriter {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static SINK: OnceLock<SinkWriter> = OnceLock::new();

/// Initialize the global logger with default options
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(log_dir, app_name, LoggerOptions::default())
}

/// Initialize the global logger
///
/// Fails with `AlreadyInitialized` if a global subscriber is already set.
pub fn init_logger_with(
    log_dir: PathBuf,
    app_name: &str,
    options: LoggerOptions,
) -> Result<(), LoggerError> {
    if SINK.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let filter = EnvFilter::try_new(&options.filter)
        .map_err(|e| LoggerError::Filter(e.to_string()))?;
    let file = RollingFile::open(&log_dir, app_name, options.max_file_bytes, options.max_files)?;
    let writer = SinkWriter {
        inner: Arc::new(Mutex::new(Sink {
            file,
            buffer: LineBuffer::new(options.buffer_lines),
        })),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer.clone()),
        )
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    SINK.set(writer).map_err(|_| LoggerError::AlreadyInitialized)?;

    tracing::info!(
        "[{}] {} logger started in {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        app_name,
        log_dir.display()
    );
    Ok(())
}

/// Most recent log lines, oldest first. Empty before `init_logger`.
pub fn recent_lines() -> Vec<String> {
    SINK.get()
        .and_then(|w| w.inner.lock().ok().map(|sink| sink.buffer.lines()))
        .unwrap_or_default()
}

pub fn info(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", message);
    Ok(())
}

pub fn warn(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::warn!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::error!("{}", message);
    Ok(())
}

fn ensure_initialized() -> Result<(), LoggerError> {
    if SINK.get().is_some() {
        Ok(())
    } else {
        Err(LoggerError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_drops_oldest() {
        let mut buffer = LineBuffer::new(2);
        buffer.push("a".to_string());
        buffer.push("b".to_string());
        buffer.push("c".to_string());
        assert_eq!(buffer.lines(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_line_buffer_zero_capacity() {
        let mut buffer = LineBuffer::new(0);
        buffer.push("a".to_string());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_rolling_file_rolls_past_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "app", 10, 2).unwrap();

        file.write_all(b"0123456789").unwrap();
        file.write_all(b"abcdef").unwrap();
        file.flush().unwrap();

        let rolled = fs::read_to_string(dir.path().join("app.log.1")).unwrap();
        let active = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert_eq!(rolled, "0123456789");
        assert_eq!(active, "abcdef");
    }

    #[test]
    fn test_rolling_file_keeps_max_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "app", 4, 2).unwrap();

        for chunk in [b"aaaa", b"bbbb", b"cccc", b"dddd"] {
            file.write_all(chunk).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("app.log")).unwrap(), "dddd");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "cccc");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.2")).unwrap(), "bbbb");
        assert!(!dir.path().join("app.log.3").exists());
    }

    #[test]
    fn test_rolling_file_appends_to_existing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.log"), "old\n").unwrap();

        let mut file = RollingFile::open(dir.path(), "app", 1024, 1).unwrap();
        file.write_all(b"new\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(file.path()).unwrap(), "old\nnew\n");
    }

    #[test]
    fn test_helpers_require_init() {
        if SINK.get().is_none() {
            assert!(matches!(info("x"), Err(LoggerError::NotInitialized)));
        }
    }
}

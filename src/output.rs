//! Sinks that receive finished log lines.

use crate::config::OutputConfig;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

/// Target used by [`TracingSink`] events.
pub const LOG_TARGET: &str = "mqtt_message_log::messages";

/// Error type for sink operations.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sink lock poisoned")]
    Poisoned,
}

/// Destination for formatted lines. Implementations must tolerate concurrent
/// callers.
pub trait LogSink: Send + Sync {
    /// Write one line at informational severity.
    fn info(&self, line: &str) -> Result<(), SinkError>;

    /// Flush any buffered data.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Create a sink from configuration.
///
/// Outputs that fail to open are reported and skipped. With nothing left the
/// result is a [`TracingSink`].
pub fn create_sink(configs: &[OutputConfig]) -> Arc<dyn LogSink> {
    let mut sinks: Vec<Arc<dyn LogSink>> = Vec::new();

    for config in configs {
        match open_sink(config) {
            Ok(sink) => sinks.push(sink),
            Err(e) => {
                error!(output = ?config, "Failed to create output: {}", e);
            }
        }
    }

    match sinks.len() {
        0 => Arc::new(TracingSink),
        1 => sinks.remove(0),
        _ => Arc::new(MultiSink::new(sinks)),
    }
}

fn open_sink(config: &OutputConfig) -> Result<Arc<dyn LogSink>, SinkError> {
    match config {
        OutputConfig::Tracing => Ok(Arc::new(TracingSink)),
        OutputConfig::Stdout => Ok(Arc::new(StdoutSink)),
        OutputConfig::Stderr => Ok(Arc::new(StderrSink)),
        OutputConfig::File {
            path,
            max_size,
            max_files,
        } => {
            let sink = FileSink::new(path.clone(), *max_size, *max_files)?;
            Ok(Arc::new(sink))
        }
    }
}

/// Emits each line as a `tracing` INFO event.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, line: &str) -> Result<(), SinkError> {
        info!(target: LOG_TARGET, "{}", line);
        Ok(())
    }
}

/// Stdout sink.
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn info(&self, line: &str) -> Result<(), SinkError> {
        writeln!(std::io::stdout().lock(), "{}", line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        std::io::stdout().flush()?;
        Ok(())
    }
}

/// Stderr sink.
pub struct StderrSink;

impl LogSink for StderrSink {
    fn info(&self, line: &str) -> Result<(), SinkError> {
        writeln!(std::io::stderr().lock(), "{}", line)?;
        Ok(())
    }
}

struct FileState {
    file: File,
    size: u64,
}

/// Appending file sink with optional size-based rotation.
///
/// Rotated files are named `<name>.1` (newest) up to `<name>.<max_files>`.
pub struct FileSink {
    path: PathBuf,
    max_size: Option<u64>,
    max_files: u32,
    state: Mutex<FileState>,
}

impl FileSink {
    pub fn new(
        path: PathBuf,
        max_size: Option<u64>,
        max_files: Option<u32>,
    ) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_append(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path,
            max_size,
            max_files: max_files.unwrap_or(5).max(1),
            state: Mutex::new(FileState { file, size }),
        })
    }

    fn rotate(&self, state: &mut FileState) -> Result<(), SinkError> {
        let oldest = self.rotated_path(self.max_files);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }
        for i in (1..self.max_files).rev() {
            let from = self.rotated_path(i);
            if from.exists() {
                std::fs::rename(&from, self.rotated_path(i + 1))?;
            }
        }
        std::fs::rename(&self.path, self.rotated_path(1))?;

        state.file = open_append(&self.path)?;
        state.size = 0;

        debug!(path = %self.path.display(), "Rotated log file");
        Ok(())
    }

    fn rotated_path(&self, index: u32) -> PathBuf {
        let mut path = self.path.clone();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        if extension.is_empty() {
            path.set_extension(index.to_string());
        } else {
            path.set_extension(format!("{}.{}", extension, index));
        }

        path
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl LogSink for FileSink {
    fn info(&self, line: &str) -> Result<(), SinkError> {
        let record = format!("{}\n", line);
        let bytes = record.as_bytes();

        let mut state = self.state.lock().map_err(|_| SinkError::Poisoned)?;

        if let Some(max_size) = self.max_size {
            if state.size > 0 && state.size + bytes.len() as u64 > max_size {
                self.rotate(&mut state)?;
            }
        }

        state.file.write_all(bytes)?;
        state.size += bytes.len() as u64;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut state = self.state.lock().map_err(|_| SinkError::Poisoned)?;
        state.file.flush()?;
        Ok(())
    }
}

/// Collects lines in memory.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemorySink {
    fn info(&self, line: &str) -> Result<(), SinkError> {
        self.lines
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push(line.to_string());
        Ok(())
    }
}

/// Fan-out to several sinks. Every member sees every line; the last failure,
/// if any, is returned.
pub struct MultiSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }
}

impl LogSink for MultiSink {
    fn info(&self, line: &str) -> Result<(), SinkError> {
        let mut result = Ok(());
        for sink in &self.sinks {
            if let Err(e) = sink.info(line) {
                debug!(error = %e, "Output error");
                result = Err(e);
            }
        }
        result
    }

    fn flush(&self) -> Result<(), SinkError> {
        for sink in &self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingSink;

    impl LogSink for FailingSink {
        fn info(&self, _line: &str) -> Result<(), SinkError> {
            Err(SinkError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_stdout_sink() {
        assert!(StdoutSink.info("test message").is_ok());
        assert!(StdoutSink.flush().is_ok());
    }

    #[test]
    fn test_file_sink() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("mqtt.log");

        let sink = FileSink::new(path.clone(), None, None).unwrap();
        sink.info("line 1").unwrap();
        sink.info("line 2").unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "line 1\nline 2\n");
    }

    #[test]
    fn test_file_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mqtt.log");

        let sink = FileSink::new(path.clone(), Some(50), Some(2)).unwrap();
        for i in 0..10 {
            sink.info(&format!("Line {} with some content", i)).unwrap();
        }
        sink.flush().unwrap();

        assert!(path.exists());
        assert!(temp_dir.path().join("mqtt.log.1").exists());
        assert!(temp_dir.path().join("mqtt.log.2").exists());
        assert!(!temp_dir.path().join("mqtt.log.3").exists());

        let newest = std::fs::read_to_string(&path).unwrap();
        assert!(newest.contains("Line 9"));
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.info("a").unwrap();
        sink.info("b").unwrap();
        assert_eq!(sink.lines(), vec!["a", "b"]);
    }

    #[test]
    fn test_multi_sink_continues_after_failure() {
        let memory = Arc::new(MemorySink::new());
        let sink = MultiSink::new(vec![Arc::new(FailingSink), memory.clone()]);

        assert!(sink.info("still delivered").is_err());
        assert_eq!(memory.lines(), vec!["still delivered"]);
    }

    #[test]
    fn test_create_sink_falls_back_to_tracing() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let sink = create_sink(&[OutputConfig::File {
            path: blocker.join("mqtt.log"),
            max_size: None,
            max_files: None,
        }]);
        assert!(sink.info("goes to tracing").is_ok());
    }

    #[test]
    fn test_create_sink_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mqtt.log");

        let sink = create_sink(&[
            OutputConfig::Tracing,
            OutputConfig::File {
                path: path.clone(),
                max_size: None,
                max_files: None,
            },
        ]);
        sink.info("hello").unwrap();
        sink.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}

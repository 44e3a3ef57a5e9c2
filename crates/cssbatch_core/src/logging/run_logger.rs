//! Per-run logger with tracing, file and callback output.
//!
//! Each run gets its own logger that:
//! - Mirrors every line to `tracing` at the matching level
//! - Optionally writes to a dedicated log file
//! - Sends lines to a host callback (if provided)
//! - Maintains a tail buffer of the most recent lines

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;
use serde::Serialize;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-run logger shared by every component of one run.
pub struct RunLogger {
    /// Run name for identification.
    run_name: String,
    /// Path to log file, when file output is enabled.
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Arc<Mutex<Option<BufWriter<File>>>>,
    /// Host callback for sending lines.
    callback: Arc<Mutex<Option<LogCallback>>>,
    /// Logging configuration.
    config: LogConfig,
    /// Tail buffer for recent lines.
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
}

impl RunLogger {
    /// Create a logger without file output.
    pub fn new(
        run_name: impl Into<String>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> Self {
        Self {
            run_name: run_name.into(),
            log_path: None,
            file_writer: Arc::new(Mutex::new(None)),
            callback: Arc::new(Mutex::new(callback)),
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(config.error_tail))),
            config,
        }
    }

    /// Create a logger that also writes to `log_path`.
    pub fn with_log_file(
        run_name: impl Into<String>,
        log_path: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let log_path = log_path.as_ref();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(log_path)?;

        let mut logger = Self::new(run_name, config, callback);
        logger.log_path = Some(log_path.to_path_buf());
        *logger.file_writer.lock() = Some(BufWriter::new(file));
        Ok(logger)
    }

    /// Get the log file path, if any.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        self.trace_event(level, message);
        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    /// Log a debug message (per-file notes).
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a success line.
    pub fn ok(&self, message: &str) {
        let msg = MessagePrefix::Ok.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a fatal error that ends the run.
    pub fn fatal(&self, message: &str) {
        let msg = MessagePrefix::Fatal.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a value as pretty JSON at debug level.
    pub fn json<T: Serialize>(&self, label: &str, value: &T) {
        if LogLevel::Debug < self.config.level {
            return;
        }
        if let Ok(json) = serde_json::to_string_pretty(value) {
            self.debug(&format!("--- {} ---\n{}", label, json));
        }
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release resources.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Format a message with timestamp (if enabled).
    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    fn trace_event(&self, level: LogLevel, message: &str) {
        let run = self.run_name.as_str();
        match level {
            LogLevel::Trace => tracing::trace!(run, "{}", message),
            LogLevel::Debug => tracing::debug!(run, "{}", message),
            LogLevel::Info => tracing::info!(run, "{}", message),
            LogLevel::Warn => tracing::warn!(run, "{}", message),
            LogLevel::Error => tracing::error!(run, "{}", message),
        }
    }

    /// Output a formatted line to tail buffer, file and callback.
    fn output(&self, formatted: &str) {
        {
            let mut buffer = self.tail_buffer.lock();
            if self.config.error_tail > 0 {
                if buffer.len() >= self.config.error_tail {
                    buffer.pop_front();
                }
                buffer.push_back(formatted.to_string());
            }
        }

        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref callback) = *self.callback.lock() {
            callback(formatted);
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}

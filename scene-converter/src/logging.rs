//! Engine log sinks
//!
//! A session keeps a set of [`LogSink`]s. They are attached to the engine when
//! a conversion starts and detached at the very end of cleanup, so engine log
//! output produced by one conversion reaches every sink of the session.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    engine::SceneEngine,
    error::{Error, Result},
};

/// Consumer of engine log messages.
///
/// Sinks are attached and fed while the owning
/// [`ConverterSession`](crate::ConverterSession) holds its lock. A sink must
/// not call back into that session; doing so deadlocks.
pub trait LogSink: Send + Sync {
    /// Receive one log message
    fn log(&self, message: &str);

    /// Called when the sink is attached to the engine
    fn attach(&self) {}

    /// Called when the sink is detached from the engine
    fn detach(&self) {}
}

/// Forwards engine messages to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, message: &str) {
        let message = message.trim_end();
        // Assimp prefixes messages with their severity.
        if message.starts_with("Error") {
            tracing::error!(target: "scene_converter::engine", "{message}");
        } else if message.starts_with("Warn") {
            tracing::warn!(target: "scene_converter::engine", "{message}");
        } else if message.starts_with("Debug") {
            tracing::debug!(target: "scene_converter::engine", "{message}");
        } else {
            tracing::info!(target: "scene_converter::engine", "{message}");
        }
    }
}

/// A log sink that collects messages in memory
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    messages: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    /// Create a new memory log sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected messages
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear all collected messages
    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// A log sink that appends to a file
#[derive(Debug)]
pub struct FileLogSink {
    file: Mutex<File>,
}

impl FileLogSink {
    /// Open (or create) a log file for appending
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::io_error(e.to_string()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileLogSink {
    fn log(&self, message: &str) {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = file.write_all(message.as_bytes());
        if !message.ends_with('\n') {
            let _ = file.write_all(b"\n");
        }
    }

    fn detach(&self) {
        let _ = self
            .file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();
    }
}

/// Set of sinks compared by identity
#[derive(Clone, Default)]
pub struct LogSinkSet {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl LogSinkSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink; returns false if this exact sink is already present
    pub fn attach(&mut self, sink: Arc<dyn LogSink>) -> bool {
        if self.contains(&sink) {
            return false;
        }
        self.sinks.push(sink);
        true
    }

    /// Remove a sink; returns false if it was not present
    pub fn detach(&mut self, sink: &Arc<dyn LogSink>) -> bool {
        match self.sinks.iter().position(|s| Arc::ptr_eq(s, sink)) {
            Some(pos) => {
                self.sinks.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remove every sink
    pub fn detach_all(&mut self) {
        self.sinks.clear();
    }

    /// Whether this exact sink is present
    pub fn contains(&self, sink: &Arc<dyn LogSink>) -> bool {
        self.sinks.iter().any(|s| Arc::ptr_eq(s, sink))
    }

    /// The sinks, in attach order
    pub fn sinks(&self) -> &[Arc<dyn LogSink>] {
        &self.sinks
    }

    /// Number of sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Attach every sink to `engine` until the returned guard is dropped
    pub(crate) fn attach_to<'e, E: SceneEngine>(&self, engine: &'e E) -> AttachedSinks<'e, E> {
        for sink in &self.sinks {
            sink.attach();
            engine.attach_log_sink(sink);
        }
        AttachedSinks {
            engine,
            sinks: self.sinks.clone(),
        }
    }
}

impl std::fmt::Debug for LogSinkSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSinkSet")
            .field("len", &self.sinks.len())
            .finish()
    }
}

/// Sinks attached to an engine for the duration of one conversion
pub(crate) struct AttachedSinks<'e, E: SceneEngine> {
    engine: &'e E,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl<E: SceneEngine> Drop for AttachedSinks<'_, E> {
    fn drop(&mut self) {
        for sink in self.sinks.drain(..).rev() {
            self.engine.detach_log_sink(&sink);
            sink.detach();
        }
    }
}

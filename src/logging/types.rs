//! Core logging types: task entries, status, and the [`Log`] trait.

/// Installer result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Human-readable installer name.
    pub name: String,
    /// Final status of the installer.
    pub status: TaskStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Installer completed.
    Ok,
    /// Installer chose not to act (tool missing, user declined).
    Skipped,
    /// Installer hit an error and stopped.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation;
/// tests substitute a recording implementation where console output is
/// irrelevant.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record an installer result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}

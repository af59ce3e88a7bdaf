//! Structured logger with dry-run awareness and summary collection.
use std::sync::Mutex;

use super::types::{Log, ResourceEntry, ResourceStatus};

/// Implement the display methods of [`Log`] by delegating to inherent
/// methods of the same name.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger that emits [`tracing`] events and remembers per-resource results.
#[derive(Debug, Default)]
pub struct Logger {
    entries: Mutex<Vec<ResourceEntry>>,
}

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "curator::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: "curator::dry_run", "{msg}");
    }

    /// Record a resource result for the summary.
    pub fn record(&self, name: &str, status: ResourceStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(ResourceEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// All recorded entries, in recording order.
    #[must_use]
    pub fn entries(&self) -> Vec<ResourceEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Count the number of failed resources.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|e| e.status == ResourceStatus::Failed)
                .count()
        })
    }

    /// Log the summary of all recorded resources.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut counts = [0u32; 5];
        for entry in &entries {
            let (slot, icon, color) = match entry.status {
                ResourceStatus::Ok => (0, "✓", "\x1b[32m"),
                ResourceStatus::Changed => (1, "+", "\x1b[36m"),
                ResourceStatus::DryRun => (2, "~", "\x1b[37m"),
                ResourceStatus::Skipped => (3, "○", "\x1b[33m"),
                ResourceStatus::Failed => (4, "✗", "\x1b[31m"),
            };
            if let Some(count) = counts.get_mut(slot) {
                *count += 1;
            }
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.name));
        }

        let [ok, changed, dry_run, skipped, failed] = counts;
        self.info(&format!(
            "{} resources: \x1b[32m{ok} ok\x1b[0m, \x1b[36m{changed} changed\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m",
            entries.len()
        ));
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record(&self, name: &str, status: ResourceStatus, message: Option<&str>) {
        self.record(name, status, message);
    }
}

//! Core logging types: resource entries, status, and the [`Log`] trait.

/// Convergence result for one resource, kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Resource reference, e.g. `yumrepo[curator]`.
    pub name: String,
    /// Final status of the resource.
    pub status: ResourceStatus,
    /// Optional detail (skip reason or error description).
    pub message: Option<String>,
}

/// Status of a converged resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    /// Already in the desired state.
    Ok,
    /// Changed to reach the desired state.
    Changed,
    /// Would have changed, but this is a dry run.
    DryRun,
    /// Not attempted (a prerequisite failed or the resource is invalid).
    Skipped,
    /// Convergence failed.
    Failed,
}

/// Abstraction over logging backends.
///
/// The applier logs through this trait so callers can substitute their own
/// sink.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a resource result for the summary.
    fn record(&self, name: &str, status: ResourceStatus, message: Option<&str>);
}

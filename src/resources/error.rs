//! Typed error variants for resource operations.
//!
//! Resource code returns these variants through [`anyhow::Error`]; the
//! applier downcasts to report package failures distinctly.

use thiserror::Error;

/// Errors that arise from resource checks and apply operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The package manager failed to bring the package to its desired state.
    #[error("package '{package}' could not be brought to '{ensure}' with {manager}")]
    PackageApplyFailure {
        /// Package name.
        package: String,
        /// Requested state.
        ensure: String,
        /// Package manager used.
        manager: String,
        /// Underlying error from the package manager.
        source: anyhow::Error,
    },

    /// A resource exists but is in a state this engine will not overwrite.
    #[error("invalid state for '{resource}': {reason}")]
    InvalidState {
        /// Name or description of the resource.
        resource: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// A helper program needed by a resource is not installed.
    #[error("none of the required programs are available: {programs}")]
    MissingProgram {
        /// Programs that were looked for.
        programs: String,
    },
}

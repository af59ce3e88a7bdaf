//! Idempotent resource primitives (check + apply pattern).
pub mod apt_source;
pub mod error;
pub mod file;
pub mod package;
pub mod yum_repo;

use anyhow::Result;

/// State of a resource on the host.
///
/// # Examples
///
/// ```
/// use curator_repo::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "3.5.1".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_eq!(wrong, ResourceState::Incorrect { current: "3.5.1".into() });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g. a directory sits where a file belongs).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created, updated or removed.
    Applied,
    /// Resource was already correct.
    AlreadyCorrect,
    /// Resource was not touched.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// A resource that can report its state and converge to the desired one.
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be made.
    fn apply(&self) -> Result<ResourceChange>;
}

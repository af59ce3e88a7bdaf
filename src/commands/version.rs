//! Command: print version information.
use std::io::Write;

/// Write the curator version to `out`.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn run(out: &mut dyn Write) -> std::io::Result<()> {
    let version = option_env!("CURATOR_REPO_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    writeln!(out, "curator {version}")
}

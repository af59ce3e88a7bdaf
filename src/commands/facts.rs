//! Command: print the OS facts the resolver would use.
use std::io::Write;

use anyhow::Result;

use crate::cli::GlobalOpts;

/// Write the resolved facts to `out`.
///
/// # Errors
///
/// Returns an error if facts cannot be detected or `out` cannot be written.
pub fn run(global: &GlobalOpts, out: &mut dyn Write) -> Result<()> {
    let facts = super::resolve_facts(global)?;
    writeln!(out, "os_family: {}", facts.family)?;
    writeln!(
        out,
        "os_major_release: {}",
        facts.major_release.as_deref().unwrap_or("unknown")
    )?;
    Ok(())
}

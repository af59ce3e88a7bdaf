//! Command: show the resolved resource plan.
use std::io::Write;

use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, PlanOpts};
use crate::logging::Log;
use crate::resolver;

/// Resolve the plan and write it to `out`, as text or JSON.
///
/// # Errors
///
/// Returns an error if setup or resolution fails, or `out` cannot be written.
pub fn run(global: &GlobalOpts, opts: &PlanOpts, log: &dyn Log, out: &mut dyn Write) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let plan = resolver::plan(&setup.settings, &setup.facts)?;

    if opts.json {
        serde_json::to_writer_pretty(&mut *out, &plan).context("serializing plan")?;
        writeln!(out)?;
    } else {
        write!(out, "{plan}")?;
    }
    Ok(())
}

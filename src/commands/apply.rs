//! Apply command: resolve the plan and converge the host to it.
use anyhow::Result;

use crate::apply::{self, Context};
use crate::cli::{ApplyOpts, GlobalOpts};
use crate::exec::Executor;
use crate::logging::Logger;
use crate::resolver;

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if setup or resolution fails, or any resource fails to
/// converge.
pub fn run(
    global: &GlobalOpts,
    opts: &ApplyOpts,
    log: &Logger,
    executor: &dyn Executor,
) -> Result<()> {
    let version = option_env!("CURATOR_REPO_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("curator {version}"));

    log.stage("Resolving plan");
    let setup = super::CommandSetup::init(global, log)?;
    let plan = resolver::plan(&setup.settings, &setup.facts)?;
    log.info(&format!(
        "{} resource(s) for {}",
        plan.resources().len(),
        setup.facts.family
    ));

    let ctx = Context {
        executor,
        log,
        root: setup.root,
        dry_run: opts.dry_run,
    };
    let result = apply::converge(&plan, &setup.facts, &ctx);

    log.print_summary();
    result
}

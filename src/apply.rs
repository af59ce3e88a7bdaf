//! Convergence: walk a [`Plan`] in dependency order and apply each resource.
//!
//! The first failure ends the run. Resources ordered after it are recorded
//! as skipped and never touched, so a package is never installed against a
//! repository that failed to register.
use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow};

use crate::exec::Executor;
use crate::facts::OsFacts;
use crate::logging::{Log, ResourceStatus};
use crate::plan::{Plan, RepoKind, ResourceRequest};
use crate::resources::apt_source::AptSourceResource;
use crate::resources::package::{PackageManager, PackageResource};
use crate::resources::yum_repo::YumRepoResource;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Shared context for a convergence run.
pub struct Context<'a> {
    /// Command executor.
    pub executor: &'a dyn Executor,
    /// Logger for output and result recording.
    pub log: &'a dyn Log,
    /// Filesystem root that repository files are written under.
    pub root: PathBuf,
    /// Preview changes without applying them.
    pub dry_run: bool,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("executor", &self.executor)
            .field("log", &"<dyn Log>")
            .field("root", &self.root)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Build the resource that converges `request`.
fn build<'a>(
    request: &ResourceRequest,
    facts: &OsFacts,
    ctx: &Context<'a>,
) -> Result<Box<dyn Resource + 'a>> {
    let resource: Box<dyn Resource + 'a> = match request {
        ResourceRequest::Repository(repo) => match repo.kind {
            RepoKind::Yum => Box::new(YumRepoResource::new(repo, &ctx.root)),
            RepoKind::Apt => Box::new(AptSourceResource::new(repo, &ctx.root, ctx.executor)),
        },
        ResourceRequest::Package(pkg) => Box::new(PackageResource::new(
            pkg.name.clone(),
            pkg.ensure.clone(),
            PackageManager::for_family(&facts.family)?,
            ctx.executor,
        )),
    };
    Ok(resource)
}

/// Converge one resource and return the status to record.
fn converge_one(resource: &dyn Resource, ctx: &Context<'_>) -> Result<ResourceStatus> {
    let description = resource.description();
    match resource.current_state()? {
        ResourceState::Correct => {
            ctx.log.debug(&format!("{description}: already correct"));
            Ok(ResourceStatus::Ok)
        }
        ResourceState::Invalid { reason } => Err(anyhow!("{description}: {reason}")),
        state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if let ResourceState::Incorrect { current } = &state {
                ctx.log.debug(&format!("{description}: currently {current}"));
            }
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would converge {description}"));
                return Ok(ResourceStatus::DryRun);
            }
            match resource.apply()? {
                ResourceChange::Applied => {
                    ctx.log.info(&format!("converged {description}"));
                    Ok(ResourceStatus::Changed)
                }
                ResourceChange::AlreadyCorrect => Ok(ResourceStatus::Ok),
                ResourceChange::Skipped { reason } => {
                    ctx.log.info(&format!("skipped {description}: {reason}"));
                    Ok(ResourceStatus::Skipped)
                }
            }
        }
    }
}

/// Converge every resource of `plan` on the host described by `facts`.
///
/// Every resource gets a recorded status. Returns the first error after
/// recording the remaining resources as skipped.
///
/// # Errors
///
/// Returns an error if the plan cannot be ordered or any resource fails to
/// converge.
pub fn converge(plan: &Plan, facts: &OsFacts, ctx: &Context<'_>) -> Result<()> {
    let order = plan.apply_order()?;
    let mut failure: Option<anyhow::Error> = None;

    for request in order {
        let name = request.reference().to_string();

        if failure.is_some() {
            ctx.log.record(
                &name,
                ResourceStatus::Skipped,
                Some("not attempted after an earlier failure"),
            );
            continue;
        }

        ctx.log.stage(&name);
        let result = build(request, facts, ctx)
            .and_then(|resource| converge_one(resource.as_ref(), ctx))
            .with_context(|| format!("converging {name}"));

        match result {
            Ok(status) => ctx.log.record(&name, status, None),
            Err(e) => {
                ctx.log.error(&format!("{e:#}"));
                ctx.log
                    .record(&name, ResourceStatus::Failed, Some(&format!("{e:#}")));
                failure = Some(e);
            }
        }
    }

    failure.map_or(Ok(()), Err)
}

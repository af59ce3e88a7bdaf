//! Repository resolver: OS facts and settings in, resource plan out.
//!
//! Everything here is a pure function of its arguments. Identical inputs
//! always produce identical descriptors and plans; nothing touches the host.
use crate::config::Settings;
use crate::error::{ConfigError, CuratorError, ResolveError};
use crate::facts::{OsFacts, OsFamily};
use crate::plan::{PackageDirective, Plan, RepoKind, RepositoryDescriptor, ResourceRequest};

/// Identifier of the managed repository.
pub const REPOSITORY_ID: &str = "curator";

/// Signing key for packages.elastic.co.
pub const GPG_KEY_URL: &str = "https://packages.elastic.co/GPG-KEY-elasticsearch";

const REDHAT_URL_TEMPLATE: &str =
    "http://packages.elastic.co/curator/{repo_version}/centos/{major_release}";
const DEBIAN_URL_TEMPLATE: &str = "http://packages.elastic.co/curator/{repo_version}/debian";

/// Resolve the repository for `facts` on the `repo_version` release line.
///
/// # Errors
///
/// Returns [`ResolveError::UnsupportedPlatform`] for families other than
/// RedHat and Debian, and [`ResolveError::MissingRequiredFact`] for RedHat
/// facts without a major release.
pub fn resolve_repository(
    facts: &OsFacts,
    repo_version: &str,
) -> Result<RepositoryDescriptor, ResolveError> {
    match &facts.family {
        OsFamily::RedHat => {
            let major_release = facts
                .major_release
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| ResolveError::MissingRequiredFact {
                    fact: "os_major_release",
                    family: facts.family.to_string(),
                })?;
            Ok(RepositoryDescriptor {
                id: REPOSITORY_ID.to_string(),
                kind: RepoKind::Yum,
                url_template: REDHAT_URL_TEMPLATE,
                resolved_url: REDHAT_URL_TEMPLATE
                    .replace("{repo_version}", repo_version)
                    .replace("{major_release}", major_release),
                description: "CentOS/RHEL curator repository",
                gpg_key_url: GPG_KEY_URL,
                release: None,
                component: None,
            })
        }
        OsFamily::Debian => Ok(RepositoryDescriptor {
            id: REPOSITORY_ID.to_string(),
            kind: RepoKind::Apt,
            url_template: DEBIAN_URL_TEMPLATE,
            resolved_url: DEBIAN_URL_TEMPLATE.replace("{repo_version}", repo_version),
            description: "Debian/Ubuntu curator repository",
            gpg_key_url: GPG_KEY_URL,
            release: Some("stable"),
            component: Some("main"),
        }),
        OsFamily::Unsupported(name) => Err(ResolveError::UnsupportedPlatform {
            family: name.clone(),
        }),
    }
}

/// Build the package directive described by `settings`.
#[must_use]
pub fn package_directive(settings: &Settings) -> PackageDirective {
    PackageDirective {
        name: settings.package_name.clone(),
        ensure: settings.ensure.clone(),
        repo_version: settings.repo_version.clone(),
    }
}

/// Build the full plan: an optional repository, the package, and the edge between them.
///
/// # Errors
///
/// Returns a resolution error when repository management is enabled and the
/// facts cannot be resolved, or a configuration error when it is enabled
/// without a `repo_version`.
pub fn plan(settings: &Settings, facts: &OsFacts) -> Result<Plan, CuratorError> {
    let mut plan = Plan::new();

    let repository = if settings.manage_repo {
        let repo_version =
            settings
                .repo_version
                .as_deref()
                .ok_or(ConfigError::MissingSetting {
                    setting: "repo_version",
                    reason: "manage_repo is enabled",
                })?;
        let descriptor = resolve_repository(facts, repo_version)?;
        Some(plan.push(ResourceRequest::Repository(descriptor)))
    } else {
        None
    };

    let package = plan.push(ResourceRequest::Package(package_directive(settings)));
    if let Some(repository) = repository {
        plan.require(package, repository);
    }

    Ok(plan)
}

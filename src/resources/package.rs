//! Package installation resource.
use std::cmp::Ordering;

use anyhow::{Result, bail};

use super::error::ResourceError;
use super::{Resource, ResourceChange, ResourceState};
use crate::config::Ensure;
use crate::error::ResolveError;
use crate::exec::Executor;
use crate::facts::OsFamily;

/// `yum check-update` exit code meaning "updates are available".
const YUM_UPDATES_AVAILABLE: i32 = 100;

/// rpm query format: `epoch:version-release`, epoch `(none)` when unset.
const RPM_QUERY_FORMAT: &str = "%{EPOCH}:%{VERSION}-%{RELEASE}";

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// RedHat family (yum/rpm).
    Yum,
    /// Debian family (apt/dpkg).
    Apt,
}

impl PackageManager {
    /// The package manager native to `family`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnsupportedPlatform`] for unknown families.
    pub fn for_family(family: &OsFamily) -> Result<Self, ResolveError> {
        match family {
            OsFamily::RedHat => Ok(Self::Yum),
            OsFamily::Debian => Ok(Self::Apt),
            OsFamily::Unsupported(name) => Err(ResolveError::UnsupportedPlatform {
                family: name.clone(),
            }),
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yum => write!(f, "yum"),
            Self::Apt => write!(f, "apt"),
        }
    }
}

/// A system package that can be checked and converged.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    /// Desired state.
    pub ensure: Ensure,
    /// Package manager to use.
    pub manager: PackageManager,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(
        name: String,
        ensure: Ensure,
        manager: PackageManager,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            name,
            ensure,
            manager,
            executor,
        }
    }

    /// The installed version, or `None` when the package is not installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query program cannot be run.
    pub fn installed_version(&self) -> Result<Option<String>> {
        match self.manager {
            PackageManager::Yum => {
                let result = self
                    .executor
                    .run_unchecked("rpm", &["-q", "--qf", RPM_QUERY_FORMAT, &self.name])?;
                let raw = result.stdout.trim();
                let version = raw.strip_prefix("(none):").unwrap_or(raw);
                Ok((result.success && !version.is_empty()).then(|| version.to_string()))
            }
            PackageManager::Apt => {
                let result = self.executor.run_unchecked(
                    "dpkg-query",
                    &["-W", "-f=${db:Status-Status} ${Version}", &self.name],
                )?;
                if !result.success {
                    return Ok(None);
                }
                // Removed packages that left config files behind report
                // "config-files"; only "installed" counts.
                Ok(match result.stdout.trim().split_once(' ') {
                    Some(("installed", version)) if !version.is_empty() => {
                        Some(version.to_string())
                    }
                    _ => None,
                })
            }
        }
    }

    /// Whether the configured repositories offer a newer version.
    ///
    /// # Errors
    ///
    /// Returns an error if the query program cannot be run or fails.
    pub fn update_available(&self) -> Result<bool> {
        match self.manager {
            PackageManager::Yum => {
                let result = self
                    .executor
                    .run_unchecked("yum", &["-q", "check-update", &self.name])?;
                match result.code {
                    Some(0) => Ok(false),
                    Some(YUM_UPDATES_AVAILABLE) => Ok(true),
                    code => bail!(
                        "yum check-update {} failed (exit {})",
                        self.name,
                        code.unwrap_or(-1)
                    ),
                }
            }
            PackageManager::Apt => {
                let result = self.executor.run("apt-cache", &["policy", &self.name])?;
                let field = |label: &str| {
                    result.stdout.lines().find_map(|line| {
                        line.trim()
                            .strip_prefix(label)
                            .map(|v| v.trim().to_string())
                    })
                };
                match (field("Installed:"), field("Candidate:")) {
                    (Some(installed), Some(candidate)) => {
                        Ok(candidate != "(none)" && candidate != installed)
                    }
                    _ => Ok(false),
                }
            }
        }
    }

    /// Command lines that converge the package, in execution order.
    fn commands(&self) -> Result<Vec<Vec<String>>> {
        let name = self.name.as_str();
        Ok(match (self.manager, &self.ensure) {
            (PackageManager::Yum, Ensure::Absent) => {
                vec![owned(&["yum", "remove", "-y", name])]
            }
            (PackageManager::Apt, Ensure::Absent) => {
                vec![owned(&["apt-get", "remove", "-y", name])]
            }
            (PackageManager::Yum, Ensure::Present) => {
                vec![owned(&["yum", "install", "-y", name])]
            }
            (PackageManager::Yum, Ensure::Latest) => vec![
                owned(&["yum", "install", "-y", name]),
                owned(&["yum", "update", "-y", name]),
            ],
            (PackageManager::Yum, Ensure::Version(version)) => {
                let verb = match self.installed_version()? {
                    Some(current)
                        if compare_versions(strip_epoch(&current), version) == Ordering::Greater =>
                    {
                        "downgrade"
                    }
                    _ => "install",
                };
                vec![owned(&["yum", verb, "-y", &format!("{name}-{version}")])]
            }
            (PackageManager::Apt, Ensure::Present | Ensure::Latest) => {
                vec![owned(&["apt-get", "install", "-y", name])]
            }
            (PackageManager::Apt, Ensure::Version(version)) => vec![owned(&[
                "apt-get",
                "install",
                "-y",
                "--allow-downgrades",
                &format!("{name}={version}"),
            ])],
        })
    }
}

fn owned(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

fn strip_epoch(version: &str) -> &str {
    version.split_once(':').map_or(version, |(_, rest)| rest)
}

/// Whether an installed version string satisfies a pinned version.
///
/// Accepts an exact match, a match without the package epoch (`1:`), or an
/// upstream-only match that also drops the distribution revision (`-1.el7`).
#[must_use]
pub fn version_matches(installed: &str, wanted: &str) -> bool {
    let without_epoch = strip_epoch(installed);
    let upstream = without_epoch
        .rsplit_once('-')
        .map_or(without_epoch, |(up, _)| up);
    [installed, without_epoch, upstream].contains(&wanted)
}

/// Compare dotted version strings segment by segment.
///
/// Numeric segments compare numerically; anything else compares as text.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let split = |v: &str| -> Vec<String> {
        v.split(['.', '-', ':'])
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };
    let (left, right) = (split(a), split(b));
    for (l, r) in left.iter().zip(&right) {
        let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => l.cmp(r),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len())
}

impl Resource for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} {} ({})", self.name, self.ensure, self.manager)
    }

    fn current_state(&self) -> Result<ResourceState> {
        let Some(current) = self.installed_version()? else {
            return Ok(if self.ensure == Ensure::Absent {
                ResourceState::Correct
            } else {
                ResourceState::Missing
            });
        };
        Ok(match &self.ensure {
            Ensure::Present => ResourceState::Correct,
            Ensure::Version(wanted) if version_matches(&current, wanted) => ResourceState::Correct,
            Ensure::Latest => {
                if self.update_available()? {
                    ResourceState::Incorrect { current }
                } else {
                    ResourceState::Correct
                }
            }
            Ensure::Absent | Ensure::Version(_) => ResourceState::Incorrect { current },
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        let failure = |source: anyhow::Error| ResourceError::PackageApplyFailure {
            package: self.name.clone(),
            ensure: self.ensure.to_string(),
            manager: self.manager.to_string(),
            source,
        };

        for command in self.commands().map_err(failure)? {
            let Some((program, args)) = command.split_first() else {
                continue;
            };
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            self.executor.run(program, &args).map_err(failure)?;
        }
        Ok(ResourceChange::Applied)
    }
}

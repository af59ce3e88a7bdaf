//! Non-fatal checks on merged settings.
use super::{Ensure, Settings};

/// A suspicious but legal combination of settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The setting that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    #[must_use]
    fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Check settings for combinations that are accepted but probably unintended.
#[must_use]
pub fn validate(settings: &Settings) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    match (&settings.ensure, settings.manage_repo, &settings.repo_version) {
        (Ensure::Version(version), true, Some(line)) => {
            let major = version.split('.').next().unwrap_or_default();
            if major != line {
                warnings.push(ValidationWarning::new(
                    "ensure",
                    format!(
                        "pinned version {version} is not in the {line}.x repository line; \
                         the package manager will not find it there"
                    ),
                ));
            }
        }
        (Ensure::Latest | Ensure::Present, false, _) => {
            warnings.push(ValidationWarning::new(
                "ensure",
                format!(
                    "'{}' without a managed repository installs whatever the host's \
                     existing sources provide",
                    settings.ensure
                ),
            ));
        }
        _ => {}
    }

    if !settings.manage_repo && settings.repo_version.is_some() {
        warnings.push(ValidationWarning::new(
            "repo_version",
            "ignored because manage_repo is disabled",
        ));
    }

    warnings
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn settings(ensure: Ensure, manage_repo: bool, repo_version: Option<&str>) -> Settings {
        Settings {
            ensure,
            manage_repo,
            package_name: "python-elasticsearch-curator".to_string(),
            repo_version: repo_version.map(str::to_string),
        }
    }

    #[test]
    fn matching_version_line_is_clean() {
        let s = settings(Ensure::Version("4.1.0".to_string()), true, Some("4"));
        assert!(validate(&s).is_empty());
    }

    #[test]
    fn mismatched_version_line_warns() {
        let s = settings(Ensure::Version("5.0.1".to_string()), true, Some("4"));
        let warnings = validate(&s);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "ensure");
        assert!(warnings[0].message.contains("4.x"));
    }

    #[test]
    fn latest_without_repo_warns() {
        let s = settings(Ensure::Latest, false, None);
        let warnings = validate(&s);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("latest"));
    }

    #[test]
    fn repo_version_without_manage_repo_warns() {
        let s = settings(Ensure::Absent, false, Some("4"));
        let warnings = validate(&s);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "repo_version");
    }

    #[test]
    fn absent_with_managed_repo_is_clean() {
        let s = settings(Ensure::Absent, true, Some("4"));
        assert!(validate(&s).is_empty());
    }
}

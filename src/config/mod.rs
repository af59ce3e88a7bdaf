//! Caller settings: what to install and whether to manage the repository.
pub mod toml_loader;
pub mod validation;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;

/// Package name installed when none is configured.
pub const DEFAULT_PACKAGE_NAME: &str = "python-elasticsearch-curator";

/// Characters that mark a version range rather than an exact version.
const RANGE_CHARS: &[char] = &['<', '>', '=', '~', '^', '*', ',', '|'];

/// Desired state of the package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ensure {
    /// Installed at any version.
    Present,
    /// Installed at the newest version the configured repositories offer.
    Latest,
    /// Not installed.
    Absent,
    /// Installed at exactly this version.
    Version(String),
}

impl Ensure {
    /// The pinned version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Version(v) => Some(v),
            _ => None,
        }
    }
}

impl FromStr for Ensure {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "present" | "installed" => return Ok(Self::Present),
            "latest" => return Ok(Self::Latest),
            "absent" | "purged" => return Ok(Self::Absent),
            _ => {}
        }
        if trimmed.is_empty()
            || trimmed.contains(RANGE_CHARS)
            || trimmed.contains(char::is_whitespace)
        {
            return Err(ConfigError::InvalidEnsure(s.to_string()));
        }
        Ok(Self::Version(trimmed.to_string()))
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Latest => write!(f, "latest"),
            Self::Absent => write!(f, "absent"),
            Self::Version(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Ensure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One layer of partially specified settings (a file, or CLI overrides).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    /// Package version, or `present`/`latest`/`absent`.
    pub ensure: Option<String>,
    /// Whether to register the repository source.
    pub manage_repo: Option<bool>,
    /// Package name override.
    pub package_name: Option<String>,
    /// Major release line used in the repository URL.
    pub repo_version: Option<String>,
}

impl SettingsLayer {
    /// Overlay `other` on top of `self`; values present in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            ensure: other.ensure.or(self.ensure),
            manage_repo: other.manage_repo.or(self.manage_repo),
            package_name: other.package_name.or(self.package_name),
            repo_version: other.repo_version.or(self.repo_version),
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Desired package state.
    pub ensure: Ensure,
    /// Whether to register the repository source.
    pub manage_repo: bool,
    /// Package to install.
    pub package_name: String,
    /// Major release line used in the repository URL.
    pub repo_version: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ensure: Ensure::Latest,
            manage_repo: false,
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            repo_version: None,
        }
    }
}

impl TryFrom<SettingsLayer> for Settings {
    type Error = ConfigError;

    fn try_from(layer: SettingsLayer) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        let ensure = layer
            .ensure
            .as_deref()
            .map(Ensure::from_str)
            .transpose()?
            .unwrap_or(defaults.ensure);

        let package_name = layer
            .package_name
            .map(|n| n.trim().to_string())
            .unwrap_or(defaults.package_name);
        if package_name.is_empty() {
            return Err(ConfigError::MissingSetting {
                setting: "package_name",
                reason: "must not be empty",
            });
        }

        let repo_version = layer
            .repo_version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let manage_repo = layer.manage_repo.unwrap_or(defaults.manage_repo);
        if manage_repo && repo_version.is_none() {
            return Err(ConfigError::MissingSetting {
                setting: "repo_version",
                reason: "manage_repo is enabled",
            });
        }

        Ok(Self {
            ensure,
            manage_repo,
            package_name,
            repo_version,
        })
    }
}

impl Settings {
    /// Load settings from an optional TOML file and apply `overrides` on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// merged settings are inconsistent.
    pub fn load(path: Option<&Path>, overrides: SettingsLayer) -> Result<Self, ConfigError> {
        let file_layer = match path {
            Some(p) => toml_loader::load_config::<SettingsLayer>(p)?,
            None => SettingsLayer::default(),
        };
        Self::try_from(file_layer.merge(overrides))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn layer(ensure: &str, manage_repo: bool, repo_version: Option<&str>) -> SettingsLayer {
        SettingsLayer {
            ensure: Some(ensure.to_string()),
            manage_repo: Some(manage_repo),
            package_name: None,
            repo_version: repo_version.map(str::to_string),
        }
    }

    // ------------------------------------------------------------------
    // Ensure
    // ------------------------------------------------------------------

    #[test]
    fn ensure_keywords() {
        assert_eq!("present".parse::<Ensure>().unwrap(), Ensure::Present);
        assert_eq!("installed".parse::<Ensure>().unwrap(), Ensure::Present);
        assert_eq!("Latest".parse::<Ensure>().unwrap(), Ensure::Latest);
        assert_eq!("absent".parse::<Ensure>().unwrap(), Ensure::Absent);
    }

    #[test]
    fn ensure_exact_version() {
        let e = "4.1.0".parse::<Ensure>().unwrap();
        assert_eq!(e, Ensure::Version("4.1.0".to_string()));
        assert_eq!(e.version(), Some("4.1.0"));
        assert_eq!(e.to_string(), "4.1.0");
    }

    #[test]
    fn ensure_rejects_ranges() {
        for spec in [">=4.0", "~4.1", "4.*", "^4", "4.0, 5.0", "4.1 .0", ""] {
            assert!(
                matches!(spec.parse::<Ensure>(), Err(ConfigError::InvalidEnsure(_))),
                "expected '{spec}' to be rejected"
            );
        }
    }

    #[test]
    fn ensure_serializes_as_string() {
        let json = serde_json::to_string(&Ensure::Version("4.1.0".to_string())).unwrap();
        assert_eq!(json, "\"4.1.0\"");
        assert_eq!(serde_json::to_string(&Ensure::Absent).unwrap(), "\"absent\"");
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    #[test]
    fn defaults_when_nothing_configured() {
        let settings = Settings::try_from(SettingsLayer::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.package_name, "python-elasticsearch-curator");
        assert_eq!(settings.ensure, Ensure::Latest);
        assert!(!settings.manage_repo);
    }

    #[test]
    fn manage_repo_requires_repo_version() {
        let err = Settings::try_from(layer("4.1.0", true, None)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingSetting {
                setting: "repo_version",
                ..
            }
        ));

        let err = Settings::try_from(layer("4.1.0", true, Some("  "))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { .. }));
    }

    #[test]
    fn empty_package_name_rejected() {
        let mut l = layer("latest", false, None);
        l.package_name = Some(String::new());
        assert!(Settings::try_from(l).is_err());
    }

    #[test]
    fn merge_prefers_overrides() {
        let base = layer("latest", false, Some("3"));
        let over = SettingsLayer {
            ensure: Some("4.1.0".to_string()),
            repo_version: Some("4".to_string()),
            ..SettingsLayer::default()
        };
        let merged = base.merge(over);
        assert_eq!(merged.ensure.as_deref(), Some("4.1.0"));
        assert_eq!(merged.repo_version.as_deref(), Some("4"));
        assert_eq!(merged.manage_repo, Some(false));
    }

    #[test]
    fn load_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curator.toml");
        std::fs::write(
            &path,
            "ensure = \"4.1.0\"\nmanage_repo = true\nrepo_version = \"4\"\npackage_name = \"elasticsearch-curator\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path), SettingsLayer::default()).unwrap();
        assert_eq!(settings.ensure, Ensure::Version("4.1.0".to_string()));
        assert!(settings.manage_repo);
        assert_eq!(settings.package_name, "elasticsearch-curator");

        let overrides = SettingsLayer {
            manage_repo: Some(false),
            ..SettingsLayer::default()
        };
        let settings = Settings::load(Some(&path), overrides).unwrap();
        assert!(!settings.manage_repo);
        assert_eq!(settings.repo_version.as_deref(), Some("4"));
    }

    #[test]
    fn load_reports_bad_ensure_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curator.toml");
        std::fs::write(&path, "ensure = \">= 4\"\n").unwrap();
        let err = Settings::load(Some(&path), SettingsLayer::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnsure(_)));
    }
}

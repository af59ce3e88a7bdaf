//! Operating-system facts consumed by the repository resolver.
//!
//! Facts are plain values. Detection from `/etc/os-release` is a separate,
//! optional step so that the resolver never reaches for ambient state.
use std::fmt;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

/// Operating-system family, the unit on which package-manager conventions are shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum OsFamily {
    /// RedHat, CentOS, Rocky, Alma, Fedora and friends (yum/dnf).
    RedHat,
    /// Debian, Ubuntu and derivatives (apt).
    Debian,
    /// Any family this module does not know how to manage.
    Unsupported(String),
}

impl OsFamily {
    /// Parse a family name as reported by a fact source.
    ///
    /// Matching is case-insensitive. Unknown names are preserved in
    /// [`OsFamily::Unsupported`] so they can be reported verbatim.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "redhat" => Self::RedHat,
            "debian" => Self::Debian,
            _ => Self::Unsupported(name.trim().to_string()),
        }
    }

    /// Map an `os-release` distribution id (`ID` or an `ID_LIKE` entry) to a family.
    fn from_distro_id(id: &str) -> Option<Self> {
        match id {
            "rhel" | "centos" | "fedora" | "rocky" | "almalinux" | "ol" | "amzn" | "redhat" => {
                Some(Self::RedHat)
            }
            "debian" | "ubuntu" | "linuxmint" | "raspbian" => Some(Self::Debian),
            _ => None,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedHat => write!(f, "RedHat"),
            Self::Debian => write!(f, "Debian"),
            Self::Unsupported(name) => write!(f, "{name}"),
        }
    }
}

/// The major part of a release string: everything before the first dot.
///
/// Returns `None` for blank input.
#[must_use]
pub fn major_release_of(release: &str) -> Option<String> {
    release
        .trim()
        .split('.')
        .next()
        .filter(|major| !major.is_empty())
        .map(str::to_string)
}

/// Facts about the target host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsFacts {
    /// Operating-system family.
    pub family: OsFamily,
    /// Major release (e.g. `"7"`). Only required for RedHat hosts.
    pub major_release: Option<String>,
}

impl OsFacts {
    /// Create facts with explicit values.
    #[must_use]
    pub fn new(family: OsFamily, major_release: Option<&str>) -> Self {
        Self {
            family,
            major_release: major_release.map(str::to_string),
        }
    }

    /// Detect facts from `<root>/etc/os-release`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn detect(root: &Path) -> Result<Self> {
        let path = root.join("etc/os-release");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Self::from_os_release(&content))
    }

    /// Build facts from the contents of an `os-release` file.
    ///
    /// `ID` is consulted first, then each `ID_LIKE` entry. The major release
    /// is the part of `VERSION_ID` before the first dot.
    #[must_use]
    pub fn from_os_release(content: &str) -> Self {
        let mut id = String::new();
        let mut id_like = String::new();
        let mut version_id = String::new();

        for line in content.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            match key.trim() {
                "ID" => id = value.to_ascii_lowercase(),
                "ID_LIKE" => id_like = value.to_ascii_lowercase(),
                "VERSION_ID" => version_id = value.to_string(),
                _ => {}
            }
        }

        let family = std::iter::once(id.as_str())
            .chain(id_like.split_whitespace())
            .find_map(OsFamily::from_distro_id)
            .unwrap_or_else(|| OsFamily::Unsupported(id.clone()));

        let major_release = major_release_of(&version_id);

        Self {
            family,
            major_release,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_families_case_insensitively() {
        assert_eq!(OsFamily::parse("RedHat"), OsFamily::RedHat);
        assert_eq!(OsFamily::parse("redhat"), OsFamily::RedHat);
        assert_eq!(OsFamily::parse("Debian"), OsFamily::Debian);
        assert_eq!(OsFamily::parse(" debian "), OsFamily::Debian);
    }

    #[test]
    fn parse_unknown_family_keeps_name() {
        assert_eq!(
            OsFamily::parse("Suse"),
            OsFamily::Unsupported("Suse".to_string())
        );
    }

    #[test]
    fn family_display() {
        assert_eq!(OsFamily::RedHat.to_string(), "RedHat");
        assert_eq!(OsFamily::Debian.to_string(), "Debian");
        assert_eq!(
            OsFamily::Unsupported("Archlinux".to_string()).to_string(),
            "Archlinux"
        );
    }

    #[test]
    fn os_release_centos() {
        let facts = OsFacts::from_os_release(
            "NAME=\"CentOS Linux\"\nVERSION=\"7 (Core)\"\nID=\"centos\"\nID_LIKE=\"rhel fedora\"\nVERSION_ID=\"7\"\n",
        );
        assert_eq!(facts.family, OsFamily::RedHat);
        assert_eq!(facts.major_release.as_deref(), Some("7"));
    }

    #[test]
    fn os_release_rocky_takes_major_part() {
        let facts = OsFacts::from_os_release("ID=\"rocky\"\nVERSION_ID=\"8.9\"\n");
        assert_eq!(facts.family, OsFamily::RedHat);
        assert_eq!(facts.major_release.as_deref(), Some("8"));
    }

    #[test]
    fn os_release_ubuntu_via_id_like() {
        let facts =
            OsFacts::from_os_release("ID=pop\nID_LIKE=\"ubuntu debian\"\nVERSION_ID=\"22.04\"\n");
        assert_eq!(facts.family, OsFamily::Debian);
        assert_eq!(facts.major_release.as_deref(), Some("22"));
    }

    #[test]
    fn major_release_rule() {
        assert_eq!(major_release_of("7.9.2009").as_deref(), Some("7"));
        assert_eq!(major_release_of(" 8 ").as_deref(), Some("8"));
        assert_eq!(major_release_of(""), None);
        assert_eq!(major_release_of(".1"), None);
    }

    #[test]
    fn os_release_unknown_distro() {
        let facts = OsFacts::from_os_release("ID=arch\nBUILD_ID=rolling\n");
        assert_eq!(facts.family, OsFamily::Unsupported("arch".to_string()));
        assert_eq!(facts.major_release, None);
    }

    #[test]
    fn detect_reads_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("etc")).unwrap();
        std::fs::write(
            dir.path().join("etc/os-release"),
            "ID=debian\nVERSION_ID=\"12\"\n",
        )
        .unwrap();
        let facts = OsFacts::detect(dir.path()).unwrap();
        assert_eq!(facts, OsFacts::new(OsFamily::Debian, Some("12")));
    }

    #[test]
    fn detect_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = OsFacts::detect(dir.path()).unwrap_err();
        assert!(err.to_string().contains("os-release"));
    }
}

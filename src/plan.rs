//! Resource plan: declared resources plus an explicit dependency edge list.
//!
//! A [`Plan`] is what the resolver hands to the applier. Ordering is never
//! implied by declaration order; it comes from [`Plan::apply_order`], which
//! topologically sorts the edges with Kahn's algorithm.
use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::Serialize;

use crate::config::Ensure;
use crate::error::PlanError;

/// Kind of a declared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A yum repository definition.
    Yumrepo,
    /// An apt source list entry.
    AptSource,
    /// A system package.
    Package,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yumrepo => write!(f, "yumrepo"),
            Self::AptSource => write!(f, "apt_source"),
            Self::Package => write!(f, "package"),
        }
    }
}

/// Reference to a resource by kind and title, e.g. `package[curator]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceRef {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Resource title (repository id or package name).
    pub title: String,
}

impl ResourceRef {
    /// Create a reference.
    #[must_use]
    pub fn new(kind: ResourceKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.title)
    }
}

/// Repository flavour, matching the host package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoKind {
    /// `/etc/yum.repos.d` repository.
    Yum,
    /// `/etc/apt/sources.list.d` source.
    Apt,
}

/// Where packages are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    /// Repository identifier.
    pub id: String,
    /// Repository flavour.
    pub kind: RepoKind,
    /// Template the URL was rendered from.
    pub url_template: &'static str,
    /// Rendered repository URL (yum `baseurl`, apt `location`).
    pub resolved_url: String,
    /// Human-readable repository name.
    pub description: &'static str,
    /// Location of the signing key.
    pub gpg_key_url: &'static str,
    /// Apt distribution; `None` for yum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<&'static str>,
    /// Apt component; `None` for yum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<&'static str>,
}

impl RepositoryDescriptor {
    /// Reference used for dependency edges.
    #[must_use]
    pub fn reference(&self) -> ResourceRef {
        let kind = match self.kind {
            RepoKind::Yum => ResourceKind::Yumrepo,
            RepoKind::Apt => ResourceKind::AptSource,
        };
        ResourceRef::new(kind, &self.id)
    }
}

/// Request to bring a package to a desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDirective {
    /// Package name.
    pub name: String,
    /// Desired state.
    pub ensure: Ensure,
    /// Repository line the package is expected to come from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_version: Option<String>,
}

impl PackageDirective {
    /// Reference used for dependency edges.
    #[must_use]
    pub fn reference(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Package, &self.name)
    }
}

/// A declared resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceRequest {
    /// Repository registration.
    Repository(RepositoryDescriptor),
    /// Package installation.
    Package(PackageDirective),
}

impl ResourceRequest {
    /// Reference used for dependency edges.
    #[must_use]
    pub fn reference(&self) -> ResourceRef {
        match self {
            Self::Repository(r) => r.reference(),
            Self::Package(p) => p.reference(),
        }
    }
}

/// Directed ordering edge: `dependent` must converge after `prerequisite`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Resource that waits.
    pub dependent: ResourceRef,
    /// Resource that must converge first.
    pub prerequisite: ResourceRef,
}

/// Resources to converge and the ordering between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    resources: Vec<ResourceRequest>,
    edges: Vec<Edge>,
}

impl Plan {
    /// Create an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource and return its reference.
    pub fn push(&mut self, resource: ResourceRequest) -> ResourceRef {
        let reference = resource.reference();
        self.resources.push(resource);
        reference
    }

    /// Declare that `dependent` requires `prerequisite`.
    pub fn require(&mut self, dependent: ResourceRef, prerequisite: ResourceRef) {
        self.edges.push(Edge {
            dependent,
            prerequisite,
        });
    }

    /// Declared resources in declaration order.
    #[must_use]
    pub fn resources(&self) -> &[ResourceRequest] {
        &self.resources
    }

    /// Declared dependency edges.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a declared resource.
    #[must_use]
    pub fn get(&self, reference: &ResourceRef) -> Option<&ResourceRequest> {
        self.resources.iter().find(|r| &r.reference() == reference)
    }

    /// Prerequisites declared for `reference`.
    #[must_use]
    pub fn requires(&self, reference: &ResourceRef) -> Vec<&ResourceRef> {
        self.edges
            .iter()
            .filter(|e| &e.dependent == reference)
            .map(|e| &e.prerequisite)
            .collect()
    }

    /// The repository resource, if repository management is enabled.
    #[must_use]
    pub fn repository(&self) -> Option<&RepositoryDescriptor> {
        self.resources.iter().find_map(|r| match r {
            ResourceRequest::Repository(repo) => Some(repo),
            ResourceRequest::Package(_) => None,
        })
    }

    /// The package directive.
    #[must_use]
    pub fn package(&self) -> Option<&PackageDirective> {
        self.resources.iter().find_map(|r| match r {
            ResourceRequest::Package(pkg) => Some(pkg),
            ResourceRequest::Repository(_) => None,
        })
    }

    /// Whether the dependency edges contain a cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        matches!(self.apply_order(), Err(PlanError::DependencyCycle(_)))
    }

    /// Resources sorted so that every prerequisite precedes its dependents.
    ///
    /// Ties keep declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownResource`] if an edge names an undeclared
    /// resource and [`PlanError::DependencyCycle`] if the edges are cyclic.
    pub fn apply_order(&self) -> Result<Vec<&ResourceRequest>, PlanError> {
        let index: HashMap<ResourceRef, usize> = self
            .resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.reference(), i))
            .collect();

        let mut in_degree = vec![0usize; self.resources.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.resources.len()];

        for edge in &self.edges {
            let dep_idx = *index
                .get(&edge.dependent)
                .ok_or_else(|| PlanError::UnknownResource(edge.dependent.to_string()))?;
            let pre_idx = *index
                .get(&edge.prerequisite)
                .ok_or_else(|| PlanError::UnknownResource(edge.prerequisite.to_string()))?;
            if let Some(count) = in_degree.get_mut(dep_idx) {
                *count += 1;
            }
            if let Some(list) = dependents.get_mut(pre_idx) {
                list.push(dep_idx);
            }
        }

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| (d == 0).then_some(i))
            .collect();
        let mut order = Vec::with_capacity(self.resources.len());

        while let Some(idx) = queue.pop_front() {
            if let Some(resource) = self.resources.get(idx) {
                order.push(resource);
            }
            if let Some(list) = dependents.get(idx) {
                for &next in list {
                    if let Some(count) = in_degree.get_mut(next) {
                        *count -= 1;
                        if *count == 0 {
                            queue.push_back(next);
                        }
                    }
                }
            }
        }

        if order.len() != self.resources.len() {
            let stuck: Vec<String> = self
                .resources
                .iter()
                .zip(&in_degree)
                .filter(|(_, d)| **d > 0)
                .map(|(r, _)| r.reference().to_string())
                .collect();
            return Err(PlanError::DependencyCycle(stuck.join(", ")));
        }

        Ok(order)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for resource in &self.resources {
            let reference = resource.reference();
            writeln!(f, "{reference}")?;
            match resource {
                ResourceRequest::Repository(repo) => {
                    let label = match repo.kind {
                        RepoKind::Yum => "baseurl",
                        RepoKind::Apt => "location",
                    };
                    writeln!(f, "  {label}: {}", repo.resolved_url)?;
                }
                ResourceRequest::Package(pkg) => {
                    writeln!(f, "  ensure: {}", pkg.ensure)?;
                }
            }
            for prerequisite in self.requires(&reference) {
                writeln!(f, "  requires: {prerequisite}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn package(name: &str) -> ResourceRequest {
        ResourceRequest::Package(PackageDirective {
            name: name.to_string(),
            ensure: Ensure::Present,
            repo_version: None,
        })
    }

    fn repository(id: &str) -> ResourceRequest {
        ResourceRequest::Repository(RepositoryDescriptor {
            id: id.to_string(),
            kind: RepoKind::Yum,
            url_template: "http://example.invalid/{repo_version}",
            resolved_url: "http://example.invalid/4".to_string(),
            description: "test repository",
            gpg_key_url: "http://example.invalid/key",
            release: None,
            component: None,
        })
    }

    fn names(order: &[&ResourceRequest]) -> Vec<String> {
        order.iter().map(|r| r.reference().to_string()).collect()
    }

    #[test]
    fn reference_display() {
        assert_eq!(
            ResourceRef::new(ResourceKind::AptSource, "curator").to_string(),
            "apt_source[curator]"
        );
    }

    #[test]
    fn independent_resources_keep_declaration_order() {
        let mut plan = Plan::new();
        plan.push(package("a"));
        plan.push(package("b"));
        assert_eq!(
            names(&plan.apply_order().unwrap()),
            vec!["package[a]", "package[b]"]
        );
        assert!(!plan.has_cycle());
    }

    #[test]
    fn prerequisite_sorted_first_even_when_declared_last() {
        let mut plan = Plan::new();
        let pkg = plan.push(package("curator"));
        let repo = plan.push(repository("curator"));
        plan.require(pkg.clone(), repo.clone());

        assert_eq!(
            names(&plan.apply_order().unwrap()),
            vec!["yumrepo[curator]", "package[curator]"]
        );
        assert_eq!(plan.requires(&pkg), vec![&repo]);
        assert!(plan.requires(&repo).is_empty());
    }

    #[test]
    fn diamond_orders_all_prerequisites_first() {
        let mut plan = Plan::new();
        let d = plan.push(package("d"));
        let b = plan.push(package("b"));
        let c = plan.push(package("c"));
        let a = plan.push(package("a"));
        plan.require(d.clone(), b.clone());
        plan.require(d, c.clone());
        plan.require(b, a.clone());
        plan.require(c, a);

        let order = names(&plan.apply_order().unwrap());
        assert_eq!(order[0], "package[a]");
        assert_eq!(order[3], "package[d]");
    }

    #[test]
    fn cycle_detected() {
        let mut plan = Plan::new();
        let a = plan.push(package("a"));
        let b = plan.push(package("b"));
        plan.require(a.clone(), b.clone());
        plan.require(b, a);

        assert!(plan.has_cycle());
        let err = plan.apply_order().unwrap_err();
        assert!(matches!(err, PlanError::DependencyCycle(ref s) if s.contains("package[a]")));
    }

    #[test]
    fn unknown_prerequisite_is_error() {
        let mut plan = Plan::new();
        let pkg = plan.push(package("curator"));
        plan.require(pkg, ResourceRef::new(ResourceKind::Yumrepo, "curator"));

        assert_eq!(
            plan.apply_order().unwrap_err(),
            PlanError::UnknownResource("yumrepo[curator]".to_string())
        );
        assert!(!plan.has_cycle());
    }

    #[test]
    fn lookup_helpers() {
        let mut plan = Plan::new();
        let repo = plan.push(repository("curator"));
        plan.push(package("curator"));

        assert!(plan.get(&repo).is_some());
        assert_eq!(plan.repository().unwrap().id, "curator");
        assert_eq!(plan.package().unwrap().name, "curator");
        assert!(Plan::new().package().is_none());
    }

    #[test]
    fn serializes_with_type_tags() {
        let mut plan = Plan::new();
        plan.push(package("curator"));
        let json: serde_json::Value = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["resources"][0]["type"], "package");
        assert_eq!(json["resources"][0]["ensure"], "present");
        assert!(json["edges"].as_array().unwrap().is_empty());
    }
}

//! The in-memory resource index.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::resource::Resource;
use crate::resource::ResourceKind;

/// Registry occupancy counts. Disabled resources are absent from
/// lookups but still counted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RegistryStats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    pub by_kind: BTreeMap<String, usize>,
}

/// Namespace-keyed resource index with secondary indexes by kind and
/// tag.
///
/// Resources are never partially updated: registration replaces whole
/// records, and a lower-priority duplicate is dropped.
#[derive(Debug, Default)]
pub struct UnifiedRegistry {
    by_namespace: HashMap<String, Resource>,
}

impl UnifiedRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from an already-resolved resource list.
    pub fn hydrate(resources: Vec<Resource>) -> Self {
        let mut registry = Self::new();
        for resource in resources {
            registry.register(resource);
        }
        registry
    }

    /// Priority-aware insertion.
    ///
    /// Returns `true` when the resource was stored; `false` when an
    /// existing record with equal or higher priority kept its place.
    pub fn register(&mut self, resource: Resource) -> bool {
        let namespace = resource.namespace();
        match self.by_namespace.get(&namespace) {
            Some(existing) if existing.priority >= resource.priority => {
                tracing::debug!(
                    namespace = %namespace,
                    kept = existing.priority,
                    dropped = resource.priority,
                    "dropping lower-priority duplicate"
                );
                false
            }
            _ => {
                self.by_namespace.insert(namespace, resource);
                true
            }
        }
    }

    /// Looks up an **enabled** resource by namespace.
    pub fn get(&self, namespace: &str) -> Option<&Resource> {
        self.by_namespace
            .get(namespace)
            .filter(|resource| resource.enabled)
    }

    /// Looks up a resource regardless of its enabled flag.
    pub fn get_any(&self, namespace: &str) -> Option<&Resource> {
        self.by_namespace.get(namespace)
    }

    /// Enabled resources of one kind, sorted by namespace.
    pub fn list_by_kind(&self, kind: ResourceKind) -> Vec<&Resource> {
        let mut found: Vec<&Resource> = self
            .by_namespace
            .values()
            .filter(|resource| resource.kind == kind && resource.enabled)
            .collect();
        found.sort_by_key(|resource| resource.namespace());
        found
    }

    /// Enabled resources carrying one tag, sorted by namespace.
    pub fn list_by_tag(&self, tag: &str) -> Vec<&Resource> {
        let mut found: Vec<&Resource> = self
            .by_namespace
            .values()
            .filter(|resource| resource.enabled && resource.tags.iter().any(|t| t == tag))
            .collect();
        found.sort_by_key(|resource| resource.namespace());
        found
    }

    /// Every registered resource, including disabled ones, sorted by
    /// namespace.
    pub fn all(&self) -> Vec<&Resource> {
        let mut found: Vec<&Resource> = self.by_namespace.values().collect();
        found.sort_by_key(|resource| resource.namespace());
        found
    }

    /// Empties the registry.
    pub fn clear(&mut self) {
        self.by_namespace.clear();
    }

    /// Number of registered resources (including disabled).
    pub fn len(&self) -> usize {
        self.by_namespace.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.by_namespace.is_empty()
    }

    /// Occupancy counts; disabled resources are counted here even
    /// though `get` hides them.
    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats::default();
        for resource in self.by_namespace.values() {
            stats.total += 1;
            if resource.enabled {
                stats.enabled += 1;
            } else {
                stats.disabled += 1;
            }
            *stats
                .by_kind
                .entry(resource.kind.to_string())
                .or_default() += 1;
        }
        stats
    }
}

#[cfg(test)]
#[path = "registry.test.rs"]
mod tests;

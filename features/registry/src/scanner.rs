//! Resource discovery across scan roots.
//!
//! For each root and each resource kind directory (`skills/`,
//! `commands/`, `agents/`, `prompts/`) three layouts are recognised:
//!
//! - **Flat file**: `<root>/<kind>s/<name>.md`
//! - **Categorised file**: `<root>/<kind>s/<category>/<name>.md`; the
//!   category segment becomes a Title Case display label
//! - **Directory-based**: `<root>/<kind>s/<name>/<KIND>.md` with sibling
//!   assets exposed (but not parsed) via the resource's asset list
//!
//! The user-scope root is scanned first, then the project-scope root;
//! project-scope resources shadow user-scope resources of the same
//! namespace regardless of priority. Within one scope, the
//! higher-priority duplicate wins, ties by source ordering.

use sha2::Digest;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::parser::parse_descriptor;
use crate::resource::Resource;
use crate::resource::ResourceKind;
use crate::resource::ResourceScope;

/// Maximum depth when collecting sibling assets of a directory-based
/// resource.
const MAX_ASSET_DEPTH: usize = 4;

/// A skipped descriptor: one warning per file, the scan continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
}

/// The product of one scanner run.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Surviving resources after precedence resolution, in discovery order.
    pub resources: Vec<Resource>,

    /// One entry per skipped descriptor.
    pub warnings: Vec<ScanWarning>,

    /// sha256 content hash of every discovered descriptor file.
    pub fingerprints: BTreeMap<String, String>,
}

/// Scans the user-scope and project-scope roots for resources.
#[derive(Debug, Clone)]
pub struct ResourceScanner {
    user_root: PathBuf,
    project_root: Option<PathBuf>,
}

impl ResourceScanner {
    /// Creates a scanner over a user root and an optional project root.
    pub fn new(user_root: PathBuf, project_root: Option<PathBuf>) -> Self {
        Self {
            user_root,
            project_root,
        }
    }

    /// Runs a full scan.
    pub fn scan(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let mut discovered: Vec<Resource> = Vec::new();

        let mut roots = vec![(self.user_root.clone(), ResourceScope::User)];
        if let Some(project_root) = &self.project_root {
            roots.push((project_root.clone(), ResourceScope::Project));
        }

        for (root, scope) in roots {
            if !root.is_dir() {
                tracing::debug!(root = %root.display(), "scan root does not exist");
                continue;
            }
            for kind in ResourceKind::all() {
                let kind_dir = root.join(kind.dir_name());
                if kind_dir.is_dir() {
                    self.scan_kind_dir(&kind_dir, kind, scope, &mut discovered, &mut outcome);
                }
            }
        }

        outcome.resources = resolve_precedence(discovered);
        tracing::debug!(
            resources = outcome.resources.len(),
            warnings = outcome.warnings.len(),
            "resource scan complete"
        );
        outcome
    }

    /// Scans one `<root>/<kind>s/` directory.
    fn scan_kind_dir(
        &self,
        kind_dir: &Path,
        kind: ResourceKind,
        scope: ResourceScope,
        discovered: &mut Vec<Resource>,
        outcome: &mut ScanOutcome,
    ) {
        for entry in sorted_entries(kind_dir) {
            let path = entry.path();
            if path.is_file() {
                if path.extension().is_some_and(|ext| ext == "md") {
                    // Flat file layout.
                    self.load_descriptor(&path, kind, scope, None, Vec::new(), discovered, outcome);
                }
            } else if path.is_dir() {
                let descriptor = path.join(kind.descriptor_file());
                if descriptor.is_file() {
                    // Directory-based layout: sibling files become assets.
                    let assets = collect_assets(&path, kind.descriptor_file());
                    self.load_descriptor(
                        &descriptor,
                        kind,
                        scope,
                        None,
                        assets,
                        discovered,
                        outcome,
                    );
                } else {
                    // Categorised layout: one level of category directories.
                    let category = path
                        .file_name()
                        .map(|name| title_case(&name.to_string_lossy()));
                    for file in sorted_entries(&path) {
                        let file_path = file.path();
                        if file_path.is_file()
                            && file_path.extension().is_some_and(|ext| ext == "md")
                        {
                            self.load_descriptor(
                                &file_path,
                                kind,
                                scope,
                                category.clone(),
                                Vec::new(),
                                discovered,
                                outcome,
                            );
                        }
                    }
                }
            }
        }
    }

    /// Reads, fingerprints and parses one descriptor file.
    #[allow(clippy::too_many_arguments)]
    fn load_descriptor(
        &self,
        path: &Path,
        kind: ResourceKind,
        scope: ResourceScope,
        category: Option<String>,
        assets: Vec<PathBuf>,
        discovered: &mut Vec<Resource>,
        outcome: &mut ScanOutcome,
    ) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn_skip(outcome, path, format!("failed to read descriptor: {err}"));
                return;
            }
        };

        outcome
            .fingerprints
            .insert(path.display().to_string(), fingerprint(&content));

        let parsed = match parse_descriptor(&path.display().to_string(), &content) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn_skip(outcome, path, err.to_string());
                return;
            }
        };

        let Some(name) = parsed.name.filter(|name| !name.is_empty()) else {
            warn_skip(outcome, path, "descriptor has no recognisable name".to_string());
            return;
        };

        discovered.push(Resource {
            name,
            kind,
            source: path.to_path_buf(),
            scope,
            priority: parsed.priority,
            enabled: parsed.enabled,
            description: parsed.description,
            backend: parsed.backend,
            tags: parsed.tags,
            dependencies: parsed.dependencies,
            version: parsed.version,
            category,
            assets,
            extra: parsed.extra,
            sections: parsed.sections,
        });
    }
}

/// Resolves namespace duplicates: project scope shadows user scope;
/// within one scope higher priority wins, ties keep the earlier source.
fn resolve_precedence(discovered: Vec<Resource>) -> Vec<Resource> {
    let mut order: Vec<String> = Vec::new();
    let mut winners: BTreeMap<String, Resource> = BTreeMap::new();

    for resource in discovered {
        let namespace = resource.namespace();
        match winners.get(&namespace) {
            None => {
                order.push(namespace.clone());
                winners.insert(namespace, resource);
            }
            Some(existing) => {
                let replace = resource.scope > existing.scope
                    || (resource.scope == existing.scope && resource.priority > existing.priority);
                if replace {
                    tracing::debug!(
                        namespace = %namespace,
                        winner = %resource.source.display(),
                        loser = %existing.source.display(),
                        "duplicate namespace resolved"
                    );
                    winners.insert(namespace, resource);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|namespace| winners.remove(&namespace))
        .collect()
}

/// Directory entries sorted by file name for deterministic discovery.
fn sorted_entries(dir: &Path) -> Vec<std::fs::DirEntry> {
    let mut entries: Vec<_> = match std::fs::read_dir(dir) {
        Ok(entries) => entries.flatten().collect(),
        Err(err) => {
            tracing::debug!(dir = %dir.display(), error = %err, "failed to read directory");
            return Vec::new();
        }
    };
    entries.sort_by_key(std::fs::DirEntry::file_name);
    entries
}

/// Collects sibling asset paths of a directory-based resource.
fn collect_assets(resource_dir: &Path, descriptor_file: &str) -> Vec<PathBuf> {
    let mut assets: Vec<PathBuf> = WalkDir::new(resource_dir)
        .max_depth(MAX_ASSET_DEPTH)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| path.file_name().is_none_or(|name| name != descriptor_file))
        .collect();
    assets.sort();
    assets
}

fn warn_skip(outcome: &mut ScanOutcome, path: &Path, message: String) {
    tracing::warn!(path = %path.display(), message = %message, "skipping descriptor");
    outcome.warnings.push(ScanWarning {
        path: path.to_path_buf(),
        message,
    });
}

/// sha256 hex digest of descriptor content.
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `code-review` → `Code Review`.
fn title_case(segment: &str) -> String {
    segment
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "scanner.test.rs"]
mod tests;

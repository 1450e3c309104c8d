//! The resource data model.
//!
//! Resources are immutable after registration: the scanner creates them,
//! the registry owns them, and the next scan supersedes them wholesale.

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use strum::EnumIter;

/// Resource type, the first half of a namespace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Skill,
    Command,
    Agent,
    Prompt,
}

impl ResourceKind {
    /// All kinds, in scan order.
    pub fn all() -> [ResourceKind; 4] {
        [Self::Skill, Self::Command, Self::Agent, Self::Prompt]
    }

    /// The wire/namespace form (`skill`, `command`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Command => "command",
            Self::Agent => "agent",
            Self::Prompt => "prompt",
        }
    }

    /// The directory holding resources of this kind under a scan root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Skill => "skills",
            Self::Command => "commands",
            Self::Agent => "agents",
            Self::Prompt => "prompts",
        }
    }

    /// The descriptor file name for the directory-based layout.
    pub fn descriptor_file(&self) -> &'static str {
        match self {
            Self::Skill => "SKILL.md",
            Self::Command => "COMMAND.md",
            Self::Agent => "AGENT.md",
            Self::Prompt => "PROMPT.md",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which scan root a resource came from. Project-scope resources shadow
/// user-scope resources of the same namespace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceScope {
    #[default]
    User,
    Project,
}

/// A typed metadata value from a descriptor file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    List(Vec<String>),
    Text(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// One `## Heading` section of a descriptor body, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// A discovered unit of behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Kebab-case identifier, unique within `kind`.
    pub name: String,

    /// Resource type.
    #[serde(rename = "type")]
    pub kind: ResourceKind,

    /// Filesystem path of the descriptor this resource came from.
    pub source: PathBuf,

    /// Scan root the resource came from.
    pub scope: ResourceScope,

    /// Higher wins namespace ties (default 50).
    pub priority: i32,

    /// Disabled resources stay out of lookups but are counted in stats.
    pub enabled: bool,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Backend hint for the router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,

    /// Tags for the secondary registry index.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Namespaces this resource depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Declared version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Display label contributed by a categorised layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Sibling asset paths of a directory-based resource (not parsed).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<PathBuf>,

    /// Unrecognised metadata keys, preserved as typed values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, ConfigValue>,

    /// Body sections in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

impl Resource {
    /// The registry key: `<type>:<name>`.
    pub fn namespace(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }

    /// Looks up a body section by heading.
    pub fn section(&self, heading: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|section| section.heading == heading)
            .map(|section| section.body.as_str())
    }
}

#[cfg(test)]
#[path = "resource.test.rs"]
mod tests;

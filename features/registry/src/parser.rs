//! Descriptor file parsing.
//!
//! Two on-disk shapes are recognised:
//!
//! - A YAML front matter block (`---`-delimited) followed by Markdown.
//! - A Markdown file whose first H1 encodes the name and whose top-level
//!   `key: value` lines encode metadata until the first `##` heading.
//!
//! Recognised keys: `name`, `description`, `enabled`, `priority`,
//! `backend`, `tags`, `dependencies`, `version`. Unknown keys are
//! preserved as typed values. `## Heading` sections are captured in
//! document order.

use serde_yml::Value as YamlValue;
use snafu::ResultExt;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::error::registry_error::DescriptorParseSnafu;
use crate::error::registry_error::YamlParseSnafu;
use crate::resource::ConfigValue;
use crate::resource::Section;

/// Default priority when a descriptor does not declare one.
pub const DEFAULT_PRIORITY: i32 = 50;

/// The metadata and sections of one descriptor file, before the scanner
/// attaches kind/scope/source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedDescriptor {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub priority: i32,
    pub backend: Option<String>,
    pub tags: Vec<String>,
    pub dependencies: Vec<String>,
    pub version: Option<String>,
    pub extra: BTreeMap<String, ConfigValue>,
    pub sections: Vec<Section>,
}

impl ParsedDescriptor {
    fn new() -> Self {
        Self {
            enabled: true,
            priority: DEFAULT_PRIORITY,
            ..Default::default()
        }
    }

    /// Applies one metadata key, routing recognised keys to typed fields
    /// and everything else into `extra`.
    fn apply(&mut self, key: &str, value: ConfigValue) {
        match key {
            "name" => self.name = Some(value.to_string()),
            "description" => self.description = Some(value.to_string()),
            "enabled" => {
                if let Some(enabled) = value.as_bool() {
                    self.enabled = enabled;
                }
            }
            "priority" => {
                if let Some(priority) = value.as_int() {
                    self.priority = priority as i32;
                }
            }
            "backend" => self.backend = Some(value.to_string()),
            "tags" => self.tags = to_list(value),
            "dependencies" => self.dependencies = to_list(value),
            "version" => self.version = Some(value.to_string()),
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }

    /// Re-emits the descriptor in the canonical H1 form.
    ///
    /// Parsing the emitted text yields an equal descriptor (comments,
    /// whitespace and front-matter style are not preserved).
    pub fn canonical_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.name.as_deref().unwrap_or("")));

        if let Some(description) = &self.description {
            out.push_str(&format!("description: {description}\n"));
        }
        out.push_str(&format!("enabled: {}\n", self.enabled));
        out.push_str(&format!("priority: {}\n", self.priority));
        if let Some(backend) = &self.backend {
            out.push_str(&format!("backend: {backend}\n"));
        }
        if !self.tags.is_empty() {
            out.push_str(&format!("tags: [{}]\n", self.tags.join(", ")));
        }
        if !self.dependencies.is_empty() {
            out.push_str(&format!("dependencies: [{}]\n", self.dependencies.join(", ")));
        }
        if let Some(version) = &self.version {
            out.push_str(&format!("version: {version}\n"));
        }
        for (key, value) in &self.extra {
            out.push_str(&format!("{key}: {value}\n"));
        }

        for section in &self.sections {
            out.push_str(&format!("\n## {}\n\n{}\n", section.heading, section.body));
        }

        out
    }
}

/// Parses descriptor content into metadata and sections.
///
/// `file` is used for error messages only.
pub fn parse_descriptor(file: &str, content: &str) -> Result<ParsedDescriptor> {
    let content = content.trim_start_matches('\u{feff}');

    if content.starts_with("---") {
        parse_front_matter_form(file, content)
    } else {
        Ok(parse_h1_form(content))
    }
}

/// YAML front matter followed by a Markdown body.
fn parse_front_matter_form(file: &str, content: &str) -> Result<ParsedDescriptor> {
    let (yaml_str, body) = split_front_matter(content).map_err(|message| {
        DescriptorParseSnafu { file, message }.build()
    })?;

    let value: YamlValue = serde_yml::from_str(yaml_str).context(YamlParseSnafu { file })?;

    let mut descriptor = ParsedDescriptor::new();
    if let YamlValue::Mapping(mapping) = value {
        for (key, value) in mapping {
            let Some(key) = key.as_str().map(str::to_string) else {
                continue;
            };
            descriptor.apply(&key, yaml_to_config_value(&value));
        }
    }

    // Front matter without a name falls back to the body's first H1.
    let (h1_name, sections) = parse_body(body);
    if descriptor.name.is_none() {
        descriptor.name = h1_name;
    }
    descriptor.sections = sections;

    Ok(descriptor)
}

/// First-H1 name plus top-level `key: value` metadata.
fn parse_h1_form(content: &str) -> ParsedDescriptor {
    let mut descriptor = ParsedDescriptor::new();

    let mut in_sections = false;
    for line in content.lines() {
        if line.starts_with("## ") {
            in_sections = true;
        }
        if in_sections {
            continue;
        }
        if let Some(heading) = line.strip_prefix("# ") {
            if descriptor.name.is_none() {
                descriptor.name = Some(heading.trim().to_string());
            }
            continue;
        }
        if let Some((key, value)) = split_key_value(line) {
            descriptor.apply(key, parse_value(value));
        }
    }

    let (_, sections) = parse_body(content);
    descriptor.sections = sections;
    descriptor
}

/// Splits front matter on `---` delimiters at line starts.
///
/// Returns `(yaml_str, body)`.
fn split_front_matter(content: &str) -> std::result::Result<(&str, &str), String> {
    let rest = content
        .strip_prefix("---")
        .ok_or_else(|| "missing opening `---` front matter delimiter".to_string())?;

    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => return Err("front matter is empty (no closing `---`)".to_string()),
    };

    let mut pos = 0;
    for line in rest.lines() {
        if line.trim() == "---" {
            let yaml_str = &rest[..pos];
            let after = &rest[pos + line.len()..];
            let body = match after.find('\n') {
                Some(newline) => &after[newline + 1..],
                None => "",
            };
            return Ok((yaml_str, body));
        }
        pos += line.len() + 1;
    }

    Err("missing closing `---` front matter delimiter".to_string())
}

/// Extracts the first H1 and the `##` sections of a Markdown body.
fn parse_body(body: &str) -> (Option<String>, Vec<Section>) {
    let mut h1_name = None;
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in body.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some((heading, lines)) = current.take() {
                sections.push(make_section(heading, &lines));
            }
            current = Some((heading.trim().to_string(), Vec::new()));
            continue;
        }
        match &mut current {
            Some((_, lines)) => lines.push(line),
            None => {
                if h1_name.is_none() {
                    if let Some(heading) = line.strip_prefix("# ") {
                        h1_name = Some(heading.trim().to_string());
                    }
                }
            }
        }
    }
    if let Some((heading, lines)) = current.take() {
        sections.push(make_section(heading, &lines));
    }

    (h1_name, sections)
}

fn make_section(heading: String, lines: &[&str]) -> Section {
    Section {
        heading,
        body: lines.join("\n").trim().to_string(),
    }
}

/// Splits a top-level `key: value` metadata line.
///
/// Keys are single words (no spaces); anything else is treated as prose
/// and ignored.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, value.trim()))
}

/// Types a raw metadata value: bool, int, `[a, b]` list, else string.
fn parse_value(value: &str) -> ConfigValue {
    match value {
        "true" => return ConfigValue::Bool(true),
        "false" => return ConfigValue::Bool(false),
        _ => {}
    }
    if let Ok(int) = value.parse::<i64>() {
        return ConfigValue::Int(int);
    }
    if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        return ConfigValue::List(items);
    }
    ConfigValue::Text(value.to_string())
}

/// Converts a YAML scalar/sequence to a typed config value.
fn yaml_to_config_value(value: &YamlValue) -> ConfigValue {
    match value {
        YamlValue::Bool(b) => ConfigValue::Bool(*b),
        YamlValue::Number(n) => match n.as_i64() {
            Some(int) => ConfigValue::Int(int),
            None => ConfigValue::Text(n.to_string()),
        },
        YamlValue::Sequence(items) => ConfigValue::List(
            items
                .iter()
                .map(|item| match item.as_str() {
                    Some(s) => s.to_string(),
                    None => yaml_to_config_value(item).to_string(),
                })
                .collect(),
        ),
        YamlValue::String(s) => ConfigValue::Text(s.clone()),
        other => ConfigValue::Text(
            serde_yml::to_string(other)
                .unwrap_or_default()
                .trim()
                .to_string(),
        ),
    }
}

/// Converts a metadata value into a list of trimmed strings.
fn to_list(value: ConfigValue) -> Vec<String> {
    match value {
        ConfigValue::List(items) => items,
        ConfigValue::Text(text) if !text.is_empty() => {
            text.split(',').map(|item| item.trim().to_string()).collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "parser.test.rs"]
mod tests;

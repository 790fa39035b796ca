use crate::skills::types::Agent;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
struct YamlFrontmatter {
    name: Option<serde_yaml::Value>,
    description: Option<serde_yaml::Value>,
}

#[derive(Serialize)]
struct RenderedFrontmatter<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    globs: Option<Vec<String>>,
    #[serde(rename = "alwaysApply", skip_serializing_if = "Option::is_none")]
    always_apply: Option<bool>,
}

/// Splits a skill file into its frontmatter and body. Content without a
/// leading `---` block is all body.
pub fn parse(content: &str) -> (Frontmatter, String) {
    let Some((raw, body)) = split(content) else {
        return (Frontmatter::default(), content.to_string());
    };
    let frontmatter = parse_yaml(raw).unwrap_or_else(|| parse_lines(raw));
    (frontmatter, body.trim_start_matches(['\n', '\r']).to_string())
}

fn split(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_yaml(raw: &str) -> Option<Frontmatter> {
    if raw.trim().is_empty() {
        return Some(Frontmatter::default());
    }
    let parsed: YamlFrontmatter = serde_yaml::from_str(raw).ok()?;
    Some(Frontmatter {
        name: parsed.name.and_then(scalar_to_string),
        description: parsed.description.and_then(scalar_to_string),
    })
}

fn scalar_to_string(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.trim().to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Hand-written frontmatter often has unquoted colons that YAML rejects.
fn parse_lines(raw: &str) -> Frontmatter {
    let mut values: BTreeMap<&str, String> = BTreeMap::new();
    for line in raw.lines() {
        if let Some((key, value)) = line.split_once(':') {
            values.insert(key.trim(), value.trim().to_string());
        }
    }
    Frontmatter {
        name: values.remove("name").filter(|v| !v.is_empty()),
        description: values.remove("description"),
    }
}

/// Renders a skill file with the frontmatter shape the agent expects.
pub fn render(agent: Agent, name: &str, description: &str, body: &str) -> Result<String> {
    let cursor = agent == Agent::Cursor;
    let header = serde_yaml::to_string(&RenderedFrontmatter {
        name,
        description,
        globs: cursor.then(Vec::new),
        always_apply: cursor.then_some(false),
    })?;
    let body = body.trim_end_matches(['\n', '\r']);
    Ok(format!("---\n{header}---\n\n{body}\n"))
}

/// Rewrites a Cursor rule into plain catalog frontmatter.
pub fn strip_cursor_keys(content: &str, fallback_name: &str) -> Result<String> {
    let (meta, body) = parse(content);
    let name = meta.name.as_deref().unwrap_or(fallback_name);
    let description = meta.description.as_deref().unwrap_or_default();
    render(Agent::Claude, name, description, &body)
}

use crate::error::AnaSkillsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Agent framework that consumes synced skills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    Claude,
    Cursor,
    Copilot,
}

impl Agent {
    pub const ALL: [Agent; 3] = [Agent::Claude, Agent::Cursor, Agent::Copilot];

    pub fn as_str(self) -> &'static str {
        match self {
            Agent::Claude => "claude",
            Agent::Cursor => "cursor",
            Agent::Copilot => "copilot",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Agent::Claude => "Claude Code",
            Agent::Cursor => "Cursor",
            Agent::Copilot => "GitHub Copilot",
        }
    }

    /// Skills directory relative to the project root.
    pub fn skills_dir(self) -> &'static str {
        match self {
            Agent::Claude => ".claude/skills",
            Agent::Cursor => ".cursor/rules",
            Agent::Copilot => ".github/skills",
        }
    }

    /// Commands/prompts directory relative to the project root.
    pub fn commands_dir(self) -> &'static str {
        match self {
            Agent::Claude => ".claude/commands",
            Agent::Cursor => ".cursor/commands",
            Agent::Copilot => ".github/prompts",
        }
    }

    pub fn layout(self) -> SkillLayout {
        match self {
            Agent::Claude | Agent::Copilot => SkillLayout::Directory,
            Agent::Cursor => SkillLayout::RuleFile,
        }
    }

    pub fn command_file_name(self, stem: &str) -> String {
        match self {
            Agent::Copilot => format!("{stem}.prompt.md"),
            Agent::Claude | Agent::Cursor => format!("{stem}.md"),
        }
    }

    pub fn skills_root(self, project_root: &Path) -> PathBuf {
        project_root.join(self.skills_dir())
    }

    pub fn commands_root(self, project_root: &Path) -> PathBuf {
        project_root.join(self.commands_dir())
    }

    /// Where a skill with the given published name lands for this agent.
    pub fn skill_destination(self, project_root: &Path, name: &str) -> PathBuf {
        let root = self.skills_root(project_root);
        match self.layout() {
            SkillLayout::Directory => root.join(name),
            SkillLayout::RuleFile => root.join(format!("{name}.{CURSOR_RULE_EXTENSION}")),
        }
    }
}

pub const CURSOR_RULE_EXTENSION: &str = "md";

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Agent {
    type Err = AnaSkillsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" => Ok(Agent::Claude),
            "cursor" => Ok(Agent::Cursor),
            "copilot" => Ok(Agent::Copilot),
            _ => Err(AnaSkillsError::UnknownAgent {
                agent: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkillLayout {
    /// `<root>/<name>/SKILL.md` plus auxiliary subdirectories.
    Directory,
    /// `<root>/<name>.md`, a single flat rule file.
    RuleFile,
}

/// Auxiliary skill subdirectories copied verbatim for directory layouts.
pub const AUX_SUBDIRS: [&str; 2] = ["references", "scripts"];
pub const COMMANDS_SUBDIR: &str = "commands";
pub const SKILL_FILE: &str = "SKILL.md";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillDescriptor {
    /// Catalog key: the skill directory name.
    pub name: String,
    pub category: String,
    pub description: String,
    /// Published name from frontmatter, falls back to `name`.
    pub title: String,
    pub dir: PathBuf,
}

impl SkillDescriptor {
    pub fn skill_file(&self) -> PathBuf {
        self.dir.join(SKILL_FILE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    pub fn record(&mut self, name: &str, outcome: SyncOutcome) {
        let bucket = match outcome {
            SyncOutcome::Created => &mut self.created,
            SyncOutcome::Updated => &mut self.updated,
            SyncOutcome::Unchanged => &mut self.unchanged,
        };
        bucket.push(name.to_string());
    }

    pub fn synced(&self) -> usize {
        self.created.len() + self.updated.len() + self.unchanged.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_round_trips_through_str() {
        for agent in Agent::ALL {
            assert_eq!(agent.as_str().parse::<Agent>().unwrap(), agent);
        }
        assert_eq!("  Cursor ".parse::<Agent>().unwrap(), Agent::Cursor);
    }

    #[test]
    fn test_unknown_agent_rejected() {
        let err = "vscode".parse::<Agent>().expect_err("unknown agent");
        assert!(matches!(err, AnaSkillsError::UnknownAgent { agent } if agent == "vscode"));
    }

    #[test]
    fn test_destination_mapping() {
        let root = Path::new("/p");
        assert_eq!(
            Agent::Claude.skill_destination(root, "alpha"),
            PathBuf::from("/p/.claude/skills/alpha")
        );
        assert_eq!(
            Agent::Cursor.skill_destination(root, "alpha"),
            PathBuf::from("/p/.cursor/rules/alpha.md")
        );
        assert_eq!(
            Agent::Copilot.skill_destination(root, "alpha"),
            PathBuf::from("/p/.github/skills/alpha")
        );
        assert_eq!(Agent::Copilot.command_file_name("review"), "review.prompt.md");
        assert_eq!(Agent::Claude.command_file_name("review"), "review.md");
    }
}

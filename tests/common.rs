#![allow(dead_code)]

use ana_skills::skills::catalog::Catalog;
use ana_skills::skills::{Agent, SkillDescriptor, SkillPrompter, SkillsContext};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes `<root>/<category>/<name>/SKILL.md` with frontmatter and body.
pub fn write_skill(root: &Path, category: &str, name: &str, description: &str) -> PathBuf {
    let dir = root.join(category).join(name);
    fs::create_dir_all(&dir).expect("Failed to create skill dir");
    fs::write(
        dir.join("SKILL.md"),
        format!("---\nname: {name}\ndescription: {description}\n---\n\n# {name}\n\nBody.\n"),
    )
    .expect("Failed to write SKILL.md");
    dir
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

pub struct TestEnvironment {
    // TempDir is kept to ensure cleanup happens when TestEnvironment is dropped
    pub(crate) temp_dir: TempDir,
    pub catalog_root: PathBuf,
    pub project_dir: PathBuf,
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let catalog_root = temp_dir.path().join("catalog");
        let project_dir = temp_dir.path().join("project");
        fs::create_dir_all(&catalog_root).expect("Failed to create catalog");
        fs::create_dir_all(&project_dir).expect("Failed to create project");
        Self {
            temp_dir,
            catalog_root,
            project_dir,
        }
    }

    /// Catalog with three skills across two categories.
    pub fn with_sample_catalog() -> Self {
        let env = Self::new();
        env.add_skill("angular", "frontend-store", "NgRx signal stores");
        env.add_skill("angular", "frontend-component", "Standalone components");
        env.add_skill("infra", "mcc-infra", "Infrastructure conventions");
        env
    }

    pub fn add_skill(&self, category: &str, name: &str, description: &str) -> PathBuf {
        write_skill(&self.catalog_root, category, name, description)
    }

    pub fn context(&self) -> SkillsContext {
        SkillsContext {
            project_dir: self.project_dir.clone(),
            catalog_root: self.catalog_root.clone(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(".ana-skills.yml")
    }

    pub fn write_config(&self, content: &str) {
        write_file(&self.config_path(), content);
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("Failed to read config")
    }

    pub fn project_path(&self, rel: &str) -> PathBuf {
        self.project_dir.join(rel)
    }

    /// Every file under the project except the config, with contents.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let mut files = BTreeMap::new();
        for entry in walkdir::WalkDir::new(&self.project_dir) {
            let entry = entry.expect("walk");
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.project_dir)
                .expect("relative")
                .to_string_lossy()
                .replace('\\', "/");
            if rel == ".ana-skills.yml" {
                continue;
            }
            let content = fs::read_to_string(entry.path()).unwrap_or_default();
            files.insert(rel, content);
        }
        files
    }
}

/// Replays canned answers instead of prompting.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub agent: Option<Agent>,
    pub initial: BTreeMap<String, bool>,
    pub new_answers: BTreeMap<String, bool>,
    pub enabled: BTreeSet<String>,
    pub category: Option<String>,
    pub cancel: bool,
    pub reviewed: Vec<String>,
}

impl ScriptedPrompter {
    pub fn cancelling() -> Self {
        Self {
            cancel: true,
            ..Self::default()
        }
    }
}

impl SkillPrompter for ScriptedPrompter {
    fn select_agent(&mut self) -> Result<Option<Agent>> {
        if self.cancel {
            return Ok(None);
        }
        Ok(Some(self.agent.unwrap_or(Agent::Claude)))
    }

    fn select_initial(&mut self, _catalog: &Catalog) -> Result<Option<BTreeMap<String, bool>>> {
        if self.cancel {
            return Ok(None);
        }
        Ok(Some(self.initial.clone()))
    }

    fn review_new(
        &mut self,
        new_skills: &BTreeMap<&str, Vec<&SkillDescriptor>>,
    ) -> Result<Option<BTreeMap<String, bool>>> {
        if self.cancel {
            return Ok(None);
        }
        self.reviewed = new_skills
            .values()
            .flatten()
            .map(|skill| skill.name.clone())
            .collect();
        Ok(Some(self.new_answers.clone()))
    }

    fn select_enabled(
        &mut self,
        _catalog: &Catalog,
        _current: &BTreeSet<String>,
    ) -> Result<Option<BTreeSet<String>>> {
        if self.cancel {
            return Ok(None);
        }
        Ok(Some(self.enabled.clone()))
    }

    fn select_category(&mut self, _skill: &str, _categories: &[String]) -> Result<Option<String>> {
        if self.cancel {
            return Ok(None);
        }
        Ok(self.category.clone())
    }
}

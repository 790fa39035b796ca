use crate::skills::catalog::Catalog;
use crate::skills::frontmatter;
use crate::skills::sync::{mirror_dir, write_if_changed};
use crate::skills::types::{AUX_SUBDIRS, Agent, CURSOR_RULE_EXTENSION, SKILL_FILE, SkillLayout};
use anyhow::{Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Skill names present in the project for `agent`, sorted.
pub fn list_project_skills(project_root: &Path, agent: Agent) -> Result<Vec<String>> {
    let root = agent.skills_root(project_root);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    match agent.layout() {
        SkillLayout::RuleFile => {
            let escaped = glob::Pattern::escape(&root.to_string_lossy());
            let pattern = format!("{escaped}/*.{CURSOR_RULE_EXTENSION}");
            for entry in glob::glob(&pattern)? {
                let path = entry?;
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        SkillLayout::Directory => {
            for entry in fs::read_dir(&root)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_dir()
                    && path.join(SKILL_FILE).is_file()
                    && let Some(name) = path.file_name().and_then(|name| name.to_str())
                {
                    names.push(name.to_string());
                }
            }
        }
    }
    names.sort();
    Ok(names)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UploadPlan {
    /// Present in both project and catalog.
    pub existing: Vec<String>,
    /// Present only in the project.
    pub project_only: Vec<String>,
}

pub fn plan_upload(catalog: &Catalog, project_skills: &[String]) -> UploadPlan {
    let mut plan = UploadPlan::default();
    for name in project_skills {
        if catalog.find_published(name).is_some() {
            plan.existing.push(name.clone());
        } else {
            plan.project_only.push(name.clone());
        }
    }
    plan
}

/// Catalog directory a project skill uploads into: the existing skill's
/// directory, or `<catalog>/<category>/<name>` for a new one.
pub fn upload_destination(catalog: &Catalog, name: &str, category: Option<&str>) -> Option<PathBuf> {
    match catalog.find_published(name) {
        Some(skill) => Some(skill.dir.clone()),
        None => category.map(|category| catalog.skill_dir(category, name)),
    }
}

/// Copies one project skill back into `dest_dir` inside the catalog.
pub fn upload_skill(
    name: &str,
    dest_dir: &Path,
    project_root: &Path,
    agent: Agent,
) -> Result<()> {
    let source = agent.skill_destination(project_root, name);

    match agent.layout() {
        SkillLayout::RuleFile => {
            let content = fs::read_to_string(&source).map_err(|e| {
                anyhow!(t!(
                    "upload.read_failed",
                    path = source.display(),
                    error = e
                ))
            })?;
            let plain = frontmatter::strip_cursor_keys(&content, name)?;
            write_if_changed(&dest_dir.join(SKILL_FILE), plain.as_bytes())?;
        }
        SkillLayout::Directory => {
            let skill_md = source.join(SKILL_FILE);
            let content = fs::read(&skill_md).map_err(|e| {
                anyhow!(t!(
                    "upload.read_failed",
                    path = skill_md.display(),
                    error = e
                ))
            })?;
            write_if_changed(&dest_dir.join(SKILL_FILE), &content)?;
            for subdir in AUX_SUBDIRS {
                mirror_dir(&source.join(subdir), &dest_dir.join(subdir))?;
            }
        }
    }
    debug!(skill = %name, dest = %dest_dir.display(), "skill uploaded");
    Ok(())
}

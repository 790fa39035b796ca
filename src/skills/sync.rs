use crate::error::AnaSkillsError;
use crate::path_utils::safe_parent_for_creation;
use crate::skills::frontmatter;
use crate::skills::types::{
    AUX_SUBDIRS, Agent, COMMANDS_SUBDIR, SKILL_FILE, SkillDescriptor, SkillLayout, SyncOutcome,
    SyncReport,
};
use anyhow::Result;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

/// Copies every skill, isolating failures so one broken skill does not stop
/// the rest.
pub fn sync_skills(skills: &[&SkillDescriptor], project_root: &Path, agent: Agent) -> SyncReport {
    let mut report = SyncReport::default();
    for skill in skills {
        match sync_skill(skill, project_root, agent) {
            Ok(outcome) => {
                debug!(skill = %skill.name, ?outcome, "skill synced");
                report.record(&skill.name, outcome);
            }
            Err(e) => {
                error!(skill = %skill.name, error = %e, "skill sync failed");
                report.failed.push((skill.name.clone(), format!("{e:#}")));
            }
        }
    }
    report
}

pub fn sync_skill(skill: &SkillDescriptor, project_root: &Path, agent: Agent) -> Result<SyncOutcome> {
    copy_skill(skill, project_root, agent).map_err(|e| {
        AnaSkillsError::CopyFailed {
            name: skill.name.clone(),
            message: format!("{e:#}"),
        }
        .into()
    })
}

fn copy_skill(skill: &SkillDescriptor, project_root: &Path, agent: Agent) -> Result<SyncOutcome> {
    let raw = fs::read_to_string(skill.skill_file())?;
    let (_, body) = frontmatter::parse(&raw);
    let rendered = frontmatter::render(agent, &skill.title, &skill.description, &body)?;
    let dest = agent.skill_destination(project_root, &skill.title);
    let existed = dest.exists();

    let mut changed = false;
    match agent.layout() {
        SkillLayout::Directory => {
            changed |= write_if_changed(&dest.join(SKILL_FILE), rendered.as_bytes())?;
            for subdir in AUX_SUBDIRS {
                changed |= mirror_dir(&skill.dir.join(subdir), &dest.join(subdir))?;
            }
        }
        SkillLayout::RuleFile => {
            changed |= write_if_changed(&dest, rendered.as_bytes())?;
        }
    }
    changed |= sync_commands(skill, project_root, agent)?;

    Ok(match (existed, changed) {
        (false, _) => SyncOutcome::Created,
        (true, true) => SyncOutcome::Updated,
        (true, false) => SyncOutcome::Unchanged,
    })
}

fn sync_commands(skill: &SkillDescriptor, project_root: &Path, agent: Agent) -> Result<bool> {
    let dest_root = agent.commands_root(project_root);
    let mut changed = false;
    for (file, stem) in command_sources(skill)? {
        let content = fs::read(&file)?;
        changed |= write_if_changed(&dest_root.join(agent.command_file_name(&stem)), &content)?;
    }
    Ok(changed)
}

/// Top-level `*.md` files in a skill's `commands/` directory, with their stems.
fn command_sources(skill: &SkillDescriptor) -> Result<Vec<(PathBuf, String)>> {
    let source = skill.dir.join(COMMANDS_SUBDIR);
    if !source.is_dir() {
        return Ok(Vec::new());
    }
    let mut commands = Vec::new();
    for file in list_source_files(&source)? {
        if file.parent() != Some(source.as_path()) {
            continue;
        }
        if file.extension().and_then(|ext| ext.to_str()) != Some("md") {
            continue;
        }
        let Some(stem) = file.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let stem = stem.to_string();
        commands.push((file, stem));
    }
    Ok(commands)
}

/// Project paths `sync` writes for a skill: its destination and one file per
/// command.
pub fn owned_paths(
    skill: &SkillDescriptor,
    project_root: &Path,
    agent: Agent,
) -> Result<Vec<PathBuf>> {
    let mut paths = vec![agent.skill_destination(project_root, &skill.title)];
    let dest_root = agent.commands_root(project_root);
    for (_, stem) in command_sources(skill)? {
        paths.push(dest_root.join(agent.command_file_name(&stem)));
    }
    Ok(paths)
}

/// Removes what `sync` created for a skill, except paths listed in `keep`.
/// Returns whether anything was removed.
pub fn remove_skill(
    skill: &SkillDescriptor,
    project_root: &Path,
    agent: Agent,
    keep: &BTreeSet<PathBuf>,
) -> Result<bool> {
    let mut removed = false;
    for path in owned_paths(skill, project_root, agent)? {
        if keep.contains(&path) {
            debug!(
                skill = %skill.name,
                path = %path.display(),
                "path owned by an enabled skill"
            );
            continue;
        }
        let Ok(meta) = fs::symlink_metadata(&path) else {
            continue;
        };
        if meta.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed = true;
    }
    Ok(removed)
}

/// Writes `content` unless the file already holds exactly those bytes.
pub fn write_if_changed(path: &Path, content: &[u8]) -> Result<bool> {
    if let Ok(existing) = fs::read(path)
        && existing == content
    {
        return Ok(false);
    }
    if let Some(parent) = safe_parent_for_creation(path) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(true)
}

/// Makes `dest` hold exactly the files of `source`. An absent or empty
/// source leaves `dest` untouched.
pub fn mirror_dir(source: &Path, dest: &Path) -> Result<bool> {
    if !source.is_dir() {
        return Ok(false);
    }
    let files = list_source_files(source)?;
    if files.is_empty() {
        return Ok(false);
    }

    let mut changed = false;
    let mut wanted: BTreeSet<PathBuf> = BTreeSet::new();
    for file in files {
        let rel = file.strip_prefix(source)?.to_path_buf();
        let content = fs::read(&file)?;
        changed |= write_if_changed(&dest.join(&rel), &content)?;
        wanted.insert(rel);
    }

    let mut stale_dirs = Vec::new();
    for entry in WalkDir::new(dest).min_depth(1).contents_first(true) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(dest)?.to_path_buf();
        if entry.file_type().is_dir() {
            stale_dirs.push(entry.path().to_path_buf());
            continue;
        }
        if !wanted.contains(&rel) {
            debug!(path = %entry.path().display(), "removing stale file");
            fs::remove_file(entry.path())?;
            changed = true;
        }
    }
    for dir in stale_dirs {
        if fs::read_dir(&dir)?.next().is_none() {
            fs::remove_dir(&dir)?;
            changed = true;
        }
    }
    Ok(changed)
}

/// Regular files under `root`, sorted, honouring `.gitignore` rules and
/// skipping symlinks.
fn list_source_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .follow_links(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .require_git(false)
        .build();
    for entry in walker {
        let entry = entry?;
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_file() {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

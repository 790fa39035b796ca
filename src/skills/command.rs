use crate::error::AnaSkillsError;
use crate::path_utils::display_relative;
use crate::skills::catalog::Catalog;
use crate::skills::interactive::SkillPrompter;
use crate::skills::project_config::{ConfigState, ProjectConfig, backup_corrupt, config_path};
use crate::skills::reconcile::{Reconciliation, apply_decisions, apply_pruning, reconcile};
use crate::skills::sync::{owned_paths, remove_skill, sync_skills};
use crate::skills::types::{Agent, SkillDescriptor, SyncReport};
use crate::skills::upload::{list_project_skills, plan_upload, upload_destination, upload_skill};
use anyhow::{Result, anyhow};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Agent framework to set up on first run
    #[arg(long, value_enum)]
    pub agent: Option<AgentArg>,

    /// Enable every catalog skill on first run
    #[arg(long)]
    pub all: bool,

    /// Enable newly discovered skills without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Remove synced copies of skills that are disabled in the config
    #[arg(long)]
    pub prune: bool,
}

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Skills to enable; omit to choose interactively
    pub names: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct UploadArgs {
    /// Skill to upload; omit to upload every skill already in the catalog
    pub name: Option<String>,

    /// Catalog category for a skill that is new to the catalog
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum AgentArg {
    Claude,
    Cursor,
    Copilot,
}

impl From<AgentArg> for Agent {
    fn from(value: AgentArg) -> Self {
        match value {
            AgentArg::Claude => Agent::Claude,
            AgentArg::Cursor => Agent::Cursor,
            AgentArg::Copilot => Agent::Copilot,
        }
    }
}

/// Where a command reads the catalog from and writes the project to.
#[derive(Clone, Debug)]
pub struct SkillsContext {
    pub project_dir: PathBuf,
    pub catalog_root: PathBuf,
}

impl SkillsContext {
    pub fn load_catalog(&self) -> Result<Catalog> {
        Catalog::load(&self.catalog_root)
    }
}

#[derive(Debug)]
pub struct SyncRun {
    pub config: ProjectConfig,
    pub first_run: bool,
    pub reconciliation: Reconciliation,
    pub report: SyncReport,
    pub pruned: Vec<String>,
}

#[derive(Debug)]
pub struct AddRun {
    pub config: ProjectConfig,
    pub newly_enabled: Vec<String>,
    pub disabled: Vec<String>,
    pub report: SyncReport,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub category: String,
    pub description: String,
    pub enabled: Option<bool>,
}

/// Reconciles the project config with the catalog and copies every enabled
/// skill. Returns `None` when the user cancels a prompt.
pub fn run_sync(
    ctx: &SkillsContext,
    args: &SyncArgs,
    prompter: &mut dyn SkillPrompter,
) -> Result<Option<SyncRun>> {
    let catalog = ctx.load_catalog()?;
    let requested_agent = args.agent.map(Agent::from);

    let (config, first_run, reconciliation) = match ProjectConfig::load(&ctx.project_dir)? {
        ConfigState::Loaded(config) => {
            if let Some(requested) = requested_agent
                && requested != config.agent
            {
                return Err(AnaSkillsError::AgentMismatch {
                    configured: config.agent.to_string(),
                    requested: requested.to_string(),
                }
                .into());
            }
            match refresh_config(&ctx.project_dir, &catalog, config, args.yes, prompter)? {
                Some((config, reconciliation)) => (config, false, reconciliation),
                None => return Ok(None),
            }
        }
        ConfigState::Corrupt(error) => {
            let backup = backup_corrupt(&ctx.project_dir)?;
            println!(
                "{}",
                t!(
                    "sync.config_corrupt",
                    error = error,
                    backup = backup.display()
                )
            );
            match first_run_setup(ctx, &catalog, requested_agent, args.all, prompter)? {
                Some(config) => (config, true, Reconciliation::default()),
                None => return Ok(None),
            }
        }
        ConfigState::Missing => {
            match first_run_setup(ctx, &catalog, requested_agent, args.all, prompter)? {
                Some(config) => (config, true, Reconciliation::default()),
                None => return Ok(None),
            }
        }
    };

    let enabled = enabled_descriptors(&catalog, &config);
    let report = if enabled.is_empty() {
        println!("{}", t!("sync.nothing_enabled"));
        SyncReport::default()
    } else {
        println!(
            "{}",
            t!(
                "sync.syncing",
                count = enabled.len(),
                agent = config.agent.label(),
                path = config.agent.skills_dir()
            )
        );
        let report = sync_skills(&enabled, &ctx.project_dir, config.agent);
        print_report(&report);
        report
    };

    let pruned = if args.prune {
        prune_disabled(&catalog, &config, &ctx.project_dir)?
    } else {
        Vec::new()
    };

    fail_on_errors(&report)?;
    Ok(Some(SyncRun {
        config,
        first_run,
        reconciliation,
        report,
        pruned,
    }))
}

fn first_run_setup(
    ctx: &SkillsContext,
    catalog: &Catalog,
    requested_agent: Option<Agent>,
    enable_all: bool,
    prompter: &mut dyn SkillPrompter,
) -> Result<Option<ProjectConfig>> {
    println!("{}", t!("sync.setup_header"));
    let agent = match requested_agent {
        Some(agent) => agent,
        None => match prompter.select_agent()? {
            Some(agent) => agent,
            None => return Ok(None),
        },
    };

    let selections = if enable_all {
        catalog
            .skills()
            .iter()
            .map(|skill| (skill.name.clone(), true))
            .collect()
    } else {
        match prompter.select_initial(catalog)? {
            Some(selections) => selections,
            None => return Ok(None),
        }
    };

    let mut config = ProjectConfig::new(agent);
    for skill in catalog.skills() {
        let on = selections.get(&skill.name).copied().unwrap_or(false);
        config.set(&skill.name, on);
    }
    config.save(&ctx.project_dir)?;
    println!(
        "{}",
        t!(
            "sync.config_saved",
            path = config_path(&ctx.project_dir).display()
        )
    );
    Ok(Some(config))
}

fn refresh_config(
    project_dir: &Path,
    catalog: &Catalog,
    mut config: ProjectConfig,
    accept_new: bool,
    prompter: &mut dyn SkillPrompter,
) -> Result<Option<(ProjectConfig, Reconciliation)>> {
    let reconciliation = reconcile(catalog, &config);
    if reconciliation.is_clean() {
        return Ok(Some((config, reconciliation)));
    }
    debug!(
        added = reconciliation.added.len(),
        removed = reconciliation.removed.len(),
        "catalog drifted from project config"
    );

    if !reconciliation.removed.is_empty() {
        println!(
            "{}",
            t!(
                "sync.removed_skills",
                count = reconciliation.removed.len(),
                skills = reconciliation.removed.join(", ")
            )
        );
        apply_pruning(&mut config, &reconciliation);
    }

    if !reconciliation.added.is_empty() {
        println!(
            "{}",
            t!("sync.new_skills", count = reconciliation.added.len())
        );
        let decisions = if accept_new {
            reconciliation
                .added
                .iter()
                .map(|name| (name.clone(), true))
                .collect()
        } else {
            let grouped = group_by_category(catalog, &reconciliation.added);
            match prompter.review_new(&grouped)? {
                Some(decisions) => decisions,
                None => return Ok(None),
            }
        };
        let enabled = apply_decisions(&mut config, &reconciliation, &decisions);
        if !enabled.is_empty() {
            println!("{}", t!("sync.added_to_config", count = enabled.len()));
        }
    }

    config.save(project_dir)?;
    Ok(Some((config, reconciliation)))
}

/// Enables a set of skills, then copies only the ones that were not enabled
/// before.
pub fn run_add(
    ctx: &SkillsContext,
    args: &AddArgs,
    prompter: &mut dyn SkillPrompter,
) -> Result<Option<AddRun>> {
    let catalog = ctx.load_catalog()?;
    let mut config = ProjectConfig::load_required(&ctx.project_dir)?;

    let reconciliation = reconcile(&catalog, &config);
    apply_pruning(&mut config, &reconciliation);
    apply_decisions(&mut config, &reconciliation, &BTreeMap::new());

    let before: BTreeSet<String> = config.enabled().into_iter().collect();
    let wanted: BTreeSet<String> = if args.names.is_empty() {
        match prompter.select_enabled(&catalog, &before)? {
            Some(selected) => selected,
            None => return Ok(None),
        }
    } else {
        for name in &args.names {
            if catalog.get(name).is_none() {
                return Err(AnaSkillsError::SkillNotFound { name: name.clone() }.into());
            }
        }
        before.iter().chain(args.names.iter()).cloned().collect()
    };

    for skill in catalog.skills() {
        config.set(&skill.name, wanted.contains(&skill.name));
    }
    config.save(&ctx.project_dir)?;

    let newly_enabled: Vec<String> = wanted.difference(&before).cloned().collect();
    let disabled: Vec<String> = before.difference(&wanted).cloned().collect();
    if !disabled.is_empty() {
        println!(
            "{}",
            t!("add.disabled", skills = disabled.join(", "))
        );
    }

    let report = if newly_enabled.is_empty() {
        println!("{}", t!("add.nothing_new"));
        SyncReport::default()
    } else {
        let skills: Vec<&SkillDescriptor> = newly_enabled
            .iter()
            .filter_map(|name| catalog.get(name))
            .collect();
        println!(
            "{}",
            t!(
                "sync.syncing",
                count = skills.len(),
                agent = config.agent.label(),
                path = config.agent.skills_dir()
            )
        );
        let report = sync_skills(&skills, &ctx.project_dir, config.agent);
        print_report(&report);
        report
    };

    fail_on_errors(&report)?;
    Ok(Some(AddRun {
        config,
        newly_enabled,
        disabled,
        report,
    }))
}

pub fn run_list(ctx: &SkillsContext, args: &ListArgs) -> Result<Vec<ListEntry>> {
    let catalog = ctx.load_catalog()?;
    let config = match ProjectConfig::load(&ctx.project_dir)? {
        ConfigState::Loaded(config) => Some(config),
        ConfigState::Missing | ConfigState::Corrupt(_) => None,
    };

    let entries: Vec<ListEntry> = catalog
        .skills()
        .iter()
        .map(|skill| ListEntry {
            name: skill.name.clone(),
            category: skill.category.clone(),
            description: skill.description.clone(),
            enabled: config.as_ref().map(|config| config.is_enabled(&skill.name)),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(entries);
    }

    if catalog.is_empty() {
        println!("{}", t!("list.empty", path = catalog.root().display()));
        return Ok(entries);
    }
    if let Some(config) = &config {
        println!("{}", t!("list.agent", agent = config.agent.label()));
    }
    let mut current_category = "";
    for entry in &entries {
        if entry.category != current_category {
            println!("{}", t!("list.category", category = entry.category));
            current_category = entry.category.as_str();
        }
        let marker = match entry.enabled {
            Some(true) => "[x] ",
            Some(false) => "[ ] ",
            None => "",
        };
        if entry.description.is_empty() {
            println!("  {marker}{}", entry.name);
        } else {
            println!("  {marker}{} - {}", entry.name, entry.description);
        }
    }
    Ok(entries)
}

/// Copies project skills back into the catalog. Returns the uploaded names.
pub fn run_upload(
    ctx: &SkillsContext,
    args: &UploadArgs,
    prompter: &mut dyn SkillPrompter,
) -> Result<Vec<String>> {
    let catalog = ctx.load_catalog()?;
    let config = ProjectConfig::load_required(&ctx.project_dir)?;
    let agent = config.agent;
    let project_skills = list_project_skills(&ctx.project_dir, agent)?;

    if let Some(name) = &args.name {
        if !project_skills.contains(name) {
            return Err(anyhow!(t!(
                "upload.not_in_project",
                skill = name,
                path = agent.skills_root(&ctx.project_dir).display()
            )));
        }
        let dest = match upload_destination(&catalog, name, args.category.as_deref()) {
            Some(dest) => dest,
            None => {
                println!("{}", t!("upload.new_skill", skill = name));
                let categories = catalog.category_dirs()?;
                match prompter.select_category(name, &categories)? {
                    Some(category) => catalog.skill_dir(&category, name),
                    None => return Ok(Vec::new()),
                }
            }
        };
        upload_skill(name, &dest, &ctx.project_dir, agent)?;
        print_uploaded(name, &dest, catalog.root());
        println!("{}", t!("upload.complete"));
        return Ok(vec![name.clone()]);
    }

    let plan = plan_upload(&catalog, &project_skills);
    let mut uploaded = Vec::new();
    if plan.existing.is_empty() {
        println!("{}", t!("upload.nothing_to_upload"));
    } else {
        println!("{}", t!("upload.uploading", count = plan.existing.len()));
        for name in &plan.existing {
            let Some(dest) = upload_destination(&catalog, name, None) else {
                continue;
            };
            upload_skill(name, &dest, &ctx.project_dir, agent)?;
            print_uploaded(name, &dest, catalog.root());
            uploaded.push(name.clone());
        }
        println!("{}", t!("upload.complete"));
    }

    if !plan.project_only.is_empty() {
        println!(
            "{}",
            t!("upload.project_only", count = plan.project_only.len())
        );
        for name in &plan.project_only {
            println!("  - {name}");
        }
        println!("{}", t!("upload.project_only_hint"));
    }
    Ok(uploaded)
}

fn print_uploaded(name: &str, dest: &Path, catalog_root: &Path) {
    println!(
        "{}",
        t!(
            "upload.uploaded",
            skill = name,
            dest = display_relative(dest, catalog_root).display()
        )
    );
}

fn enabled_descriptors<'a>(
    catalog: &'a Catalog,
    config: &ProjectConfig,
) -> Vec<&'a SkillDescriptor> {
    config
        .enabled()
        .iter()
        .filter_map(|name| catalog.get(name))
        .collect()
}

fn group_by_category<'a>(
    catalog: &'a Catalog,
    names: &[String],
) -> BTreeMap<&'a str, Vec<&'a SkillDescriptor>> {
    let mut grouped: BTreeMap<&str, Vec<&SkillDescriptor>> = BTreeMap::new();
    for name in names {
        if let Some(skill) = catalog.get(name) {
            grouped.entry(skill.category.as_str()).or_default().push(skill);
        }
    }
    grouped
}

fn prune_disabled(
    catalog: &Catalog,
    config: &ProjectConfig,
    project_dir: &Path,
) -> Result<Vec<String>> {
    let mut keep: BTreeSet<PathBuf> = BTreeSet::new();
    for skill in catalog.skills() {
        if config.is_enabled(&skill.name) {
            keep.extend(owned_paths(skill, project_dir, config.agent)?);
        }
    }

    let mut pruned = Vec::new();
    for skill in catalog.skills() {
        if config.is_enabled(&skill.name) {
            continue;
        }
        if remove_skill(skill, project_dir, config.agent, &keep)? {
            info!(skill = %skill.name, "removed disabled skill");
            println!("{}", t!("sync.pruned", skill = skill.name));
            pruned.push(skill.name.clone());
        }
    }
    Ok(pruned)
}

fn print_report(report: &SyncReport) {
    for name in &report.created {
        println!("{}", t!("sync.created", skill = name));
    }
    for name in &report.updated {
        println!("{}", t!("sync.updated", skill = name));
    }
    for name in &report.unchanged {
        println!("{}", t!("sync.unchanged", skill = name));
    }
    for (name, error) in &report.failed {
        eprintln!("{}", t!("sync.failed", skill = name, error = error));
    }
    if !report.has_failures() {
        println!("{}", t!("sync.complete", count = report.synced()));
    }
}

fn fail_on_errors(report: &SyncReport) -> Result<()> {
    if report.has_failures() {
        return Err(anyhow!(t!(
            "sync.failures",
            count = report.failed.len()
        )));
    }
    Ok(())
}

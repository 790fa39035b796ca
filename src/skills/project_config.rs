use crate::error::AnaSkillsError;
use crate::skills::types::Agent;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = ".ana-skills.yml";
const BACKUP_SUFFIX: &str = ".bak";
const TMP_SUFFIX: &str = ".tmp";

/// Per-project selection persisted in `.ana-skills.yml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectConfig {
    pub agent: Agent,
    pub skills: BTreeMap<String, bool>,
}

#[derive(Deserialize)]
struct RawProjectConfig {
    agent: Option<String>,
    #[serde(default)]
    skills: Option<BTreeMap<String, bool>>,
}

#[derive(Debug)]
pub enum ConfigState {
    Missing,
    /// The file exists but is not valid YAML; carries the parse error.
    Corrupt(String),
    Loaded(ProjectConfig),
}

pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE)
}

impl ProjectConfig {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            skills: BTreeMap::new(),
        }
    }

    pub fn load(project_dir: &Path) -> Result<ConfigState> {
        let path = config_path(project_dir);
        if !path.exists() {
            return Ok(ConfigState::Missing);
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| anyhow!(t!("project_config.read_failed", error = e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<ConfigState> {
        if content.trim().is_empty() {
            return Ok(ConfigState::Corrupt(t!("project_config.empty").to_string()));
        }
        let raw: RawProjectConfig = match serde_yaml::from_str(content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "project config is not valid YAML");
                return Ok(ConfigState::Corrupt(e.to_string()));
            }
        };
        let agent = raw.agent.ok_or_else(|| AnaSkillsError::Config {
            message: t!("project_config.agent_missing").to_string(),
        })?;
        let agent: Agent = agent.parse()?;
        Ok(ConfigState::Loaded(Self {
            agent,
            skills: raw.skills.unwrap_or_default(),
        }))
    }

    /// Loads an existing, valid config or fails with a message pointing at `sync`.
    pub fn load_required(project_dir: &Path) -> Result<Self> {
        match Self::load(project_dir)? {
            ConfigState::Loaded(config) => Ok(config),
            ConfigState::Missing => Err(AnaSkillsError::ConfigMissing {
                path: config_path(project_dir).display().to_string(),
            }
            .into()),
            ConfigState::Corrupt(error) => Err(AnaSkillsError::Config { message: error }.into()),
        }
    }

    /// Writes through a sibling temp file and a rename so readers never see
    /// a half-written config.
    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let path = config_path(project_dir);
        let content = serde_yaml::to_string(self)?;
        fs::create_dir_all(project_dir)?;
        let tmp = tmp_path(&path);
        fs::write(&tmp, content)
            .map_err(|e| anyhow!(t!("project_config.write_failed", error = e)))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(anyhow!(t!("project_config.write_failed", error = e)));
        }
        debug!(path = %path.display(), "project config saved");
        Ok(())
    }

    pub fn enabled(&self) -> Vec<String> {
        self.skills
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.skills.get(name).copied().unwrap_or(false)
    }

    pub fn set(&mut self, name: &str, enabled: bool) {
        self.skills.insert(name.to_string(), enabled);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.skills.remove(name).is_some()
    }
}

/// Moves an unreadable config aside so first-run setup can replace it.
pub fn backup_corrupt(project_dir: &Path) -> Result<PathBuf> {
    let path = config_path(project_dir);
    let backup = PathBuf::from(format!("{}{BACKUP_SUFFIX}", path.display()));
    fs::rename(&path, &backup)?;
    Ok(backup)
}

fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}{TMP_SUFFIX}", path.display()))
}

use crate::path_utils::validate_path_str;
use anyhow::{Result, anyhow};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_DIR: &str = "ANA_SKILLS_CONFIG_DIR";
pub const ENV_SKILLS_DIR: &str = "ANA_SKILLS_DIR";
pub const APP_NAME: &str = "ana-skills";
pub const GLOBAL_CONFIG_FILE: &str = "config.yaml";
pub const SKILLS_DIR: &str = "skills";

/// Tool-wide settings stored in `<config dir>/config.yaml`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_dir: Option<String>,
}

impl GlobalConfig {
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(GLOBAL_CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| anyhow!(t!("config.global_read_failed", error = e)))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| {
            anyhow!(t!(
                "config.global_parse_failed",
                path = path.display(),
                error = e
            ))
        })
    }
}

pub fn resolve_config_dir(cli_override: Option<&Path>) -> Result<PathBuf> {
    let env_override = env::var(ENV_CONFIG_DIR).ok();
    resolve_config_dir_with(cli_override, env_override.as_deref())
}

pub fn resolve_config_dir_with(
    cli_override: Option<&Path>,
    env_override: Option<&str>,
) -> Result<PathBuf> {
    if let Some(path) = cli_override {
        validate_path_str(&path.to_string_lossy())
            .map_err(|e| anyhow!(t!("errors.invalid_config_dir", error = e)))?;
        return Ok(path.to_path_buf());
    }

    if let Some(env_config_dir) = env_override {
        validate_path_str(env_config_dir)
            .map_err(|e| anyhow!(t!("errors.invalid_config_dir_env", error = e)))?;
        return Ok(PathBuf::from(env_config_dir));
    }

    let project_dirs = ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| anyhow!(t!("errors.not_find_config_dir")))?;
    Ok(project_dirs.config_dir().to_path_buf())
}

/// Resolves the catalog root: CLI flag, then `ANA_SKILLS_DIR`, then the
/// global config's `skills_dir`, then `<config dir>/skills`.
pub fn resolve_skills_root(cli_override: Option<&Path>, config_dir: &Path) -> Result<PathBuf> {
    if let Some(path) = cli_override {
        let raw = path.to_string_lossy();
        validate_path_str(&raw)
            .map_err(|e| anyhow!(t!("config.skills_dir_invalid_cli", error = e)))?;
        return expand_path(&raw);
    }

    if let Ok(raw) = env::var(ENV_SKILLS_DIR) {
        validate_path_str(&raw)
            .map_err(|e| anyhow!(t!("config.skills_dir_invalid_env", error = e)))?;
        return expand_path(&raw);
    }

    if let Some(raw) = GlobalConfig::load(config_dir)?.skills_dir {
        validate_path_str(&raw)
            .map_err(|e| anyhow!(t!("config.skills_dir_invalid_config", error = e)))?;
        return expand_path(&raw);
    }

    Ok(config_dir.join(SKILLS_DIR))
}

pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = expand_env_vars(raw)?;
    let path = expand_tilde(&expanded)?;
    Ok(PathBuf::from(path))
}

fn expand_tilde(path: &str) -> Result<String> {
    if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| anyhow!(t!("config.home_missing")))?;
        if path == "~" {
            return Ok(home.to_string_lossy().to_string());
        }
        let trimmed = path.trim_start_matches("~/");
        return Ok(home.join(trimmed).to_string_lossy().to_string());
    }
    Ok(path.to_string())
}

fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$([A-Za-z0-9_]+)|\$\{([^}]+)\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        match caps.get(1).or_else(|| caps.get(2)) {
            Some(key) => env::var(key.as_str()).unwrap_or_else(|_| whole.to_string()),
            None => whole.to_string(),
        }
    });
    Ok(expanded.to_string())
}

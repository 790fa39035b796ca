use anyhow::Result as _Result;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnaSkillsError {
    #[error("Config Error: {message}")]
    Config { message: String },

    #[error("Unknown agent: {agent}")]
    UnknownAgent { agent: String },

    #[error("Agent mismatch: configured {configured}, requested {requested}")]
    AgentMismatch {
        configured: String,
        requested: String,
    },

    #[error("Project config not found: {path}")]
    ConfigMissing { path: String },

    #[error("Skill not found: {name}")]
    SkillNotFound { name: String },

    #[error("Catalog not found: {path}")]
    CatalogMissing { path: String },

    #[error("Failed to sync skill {name}: {message}")]
    CopyFailed { name: String, message: String },

    #[error("Interactive input required: {what}")]
    NonInteractive { what: String },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Inquire Error: {0}")]
    Inquire(#[from] inquire::InquireError),

    #[error("YAML Error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnaSkillsError {
    pub fn display_localized(&self) -> String {
        match self {
            AnaSkillsError::Config { message } => {
                t!("errors.config_error", message = message).to_string()
            }
            AnaSkillsError::UnknownAgent { agent } => {
                t!("errors.unknown_agent", agent = agent).to_string()
            }
            AnaSkillsError::AgentMismatch {
                configured,
                requested,
            } => t!(
                "errors.agent_mismatch",
                configured = configured,
                requested = requested
            )
            .to_string(),
            AnaSkillsError::ConfigMissing { path } => {
                t!("errors.config_missing", path = path).to_string()
            }
            AnaSkillsError::SkillNotFound { name } => {
                t!("errors.skill_not_found", name = name).to_string()
            }
            AnaSkillsError::CatalogMissing { path } => {
                t!("errors.catalog_missing", path = path).to_string()
            }
            AnaSkillsError::CopyFailed { name, message } => {
                t!("errors.copy_failed", name = name, error = message).to_string()
            }
            AnaSkillsError::NonInteractive { what } => {
                t!("errors.non_interactive", what = what).to_string()
            }
            AnaSkillsError::Inquire(e) => t!("prompts.failed", error = e).to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = _Result<T, AnaSkillsError>;

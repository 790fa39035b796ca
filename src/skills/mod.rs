pub mod catalog;
pub mod command;
pub mod frontmatter;
pub mod interactive;
pub mod project_config;
pub mod reconcile;
pub mod sync;
pub mod types;
pub mod upload;

pub use catalog::Catalog;
pub use command::{SkillsContext, run_add, run_list, run_sync, run_upload};
pub use interactive::{DefaultPrompter, InteractivePrompter, SkillPrompter, is_interactive};
pub use project_config::{CONFIG_FILE, ConfigState, ProjectConfig};
pub use reconcile::{Reconciliation, reconcile};
pub use sync::{sync_skill, sync_skills};
pub use types::{Agent, SkillDescriptor, SyncOutcome, SyncReport};

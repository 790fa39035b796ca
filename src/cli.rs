use crate::config::{resolve_config_dir, resolve_skills_root};
use crate::logging;
use crate::skills::command::{AddArgs, ListArgs, SyncArgs, UploadArgs};
use crate::skills::{
    DefaultPrompter, InteractivePrompter, SkillPrompter, SkillsContext, is_interactive, run_add,
    run_list, run_sync, run_upload,
};
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short = 'd', long = "project-dir", global = true)]
    pub project_dir: Option<PathBuf>,

    /// Skills catalog directory (env: ANA_SKILLS_DIR)
    #[arg(long = "skills-dir", global = true)]
    pub skills_dir: Option<PathBuf>,

    /// Configuration directory for ana-skills (env: ANA_SKILLS_CONFIG_DIR)
    #[arg(short = 'C', long = "config-dir", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the resolved configuration directory path and exit
    #[arg(long)]
    pub print_config_dir_path: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync enabled skills into the project, setting it up on first run
    #[command(alias = "download")]
    Sync(SyncArgs),
    /// Enable more skills and sync the newly enabled ones
    Add(AddArgs),
    /// List catalog skills and their state in this project
    #[command(alias = "ls")]
    List(ListArgs),
    /// Copy skills edited in the project back into the catalog
    Upload(UploadArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.print_config_dir_path {
        let config_dir = resolve_config_dir(cli.config_dir.as_deref())?;
        println!("{}", config_dir.display());
        return Ok(());
    }

    let Some(command) = cli.command.as_ref() else {
        let mut command = Cli::command();
        command.print_help()?;
        println!();
        return Ok(());
    };

    let ctx = build_context(&cli)?;
    debug!(
        project = %ctx.project_dir.display(),
        catalog = %ctx.catalog_root.display(),
        "resolved paths"
    );

    let interactive = is_interactive();
    match command {
        Commands::Sync(args) => {
            let mut prompter = prompter_for(interactive, args.yes);
            if run_sync(&ctx, args, prompter.as_mut())?.is_none() {
                println!("{}", t!("messages.cancelled"));
            }
        }
        Commands::Add(args) => {
            let mut prompter = prompter_for(interactive, false);
            if run_add(&ctx, args, prompter.as_mut())?.is_none() {
                println!("{}", t!("messages.cancelled"));
            }
        }
        Commands::List(args) => {
            run_list(&ctx, args)?;
        }
        Commands::Upload(args) => {
            let mut prompter = prompter_for(interactive, false);
            run_upload(&ctx, args, prompter.as_mut())?;
        }
    }
    Ok(())
}

fn build_context(cli: &Cli) -> Result<SkillsContext> {
    let config_dir = resolve_config_dir(cli.config_dir.as_deref())?;
    let catalog_root = resolve_skills_root(cli.skills_dir.as_deref(), &config_dir)?;
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir()?,
    };
    Ok(SkillsContext {
        project_dir,
        catalog_root,
    })
}

fn prompter_for(interactive: bool, accept_new: bool) -> Box<dyn SkillPrompter> {
    if interactive {
        Box::new(InteractivePrompter)
    } else {
        Box::new(DefaultPrompter { accept_new })
    }
}

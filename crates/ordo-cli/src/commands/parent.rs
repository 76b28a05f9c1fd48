//! Parent registry
//!
//! Usage: ordo parent add <ID> | ordo parent remove <ID>

use clap::{Args, Subcommand};

use super::{CliResult, Context};

#[derive(Debug, Args)]
pub struct ParentArgs {
    #[command(subcommand)]
    pub command: ParentCommand,
}

#[derive(Debug, Subcommand)]
pub enum ParentCommand {
    /// Register a parent
    Add { parent_id: String },
    /// Remove a parent and every record under it (all families)
    Remove { parent_id: String },
}

pub fn execute(ctx: &Context, args: ParentArgs) -> CliResult {
    match args.command {
        ParentCommand::Add { parent_id } => {
            ctx.engine.register_parent(&parent_id)?;
            println!("added {}", parent_id);
        }
        ParentCommand::Remove { parent_id } => {
            ctx.engine.remove_parent(&parent_id)?;
            println!("removed {}", parent_id);
        }
    }
    Ok(())
}

//! Parent-wide commands: reindex, list, check

use clap::Args;

use super::{CliResult, Context};

#[derive(Debug, Args)]
pub struct ParentRef {
    pub parent_id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub parent_id: String,

    /// Print a JSON array instead of `<position>\t<id>` lines
    #[arg(long)]
    pub json: bool,
}

pub fn execute_reindex(ctx: &Context, args: ParentRef) -> CliResult {
    let rewritten = ctx.engine.reindex(&args.parent_id)?;
    println!("reindexed {} ({} rewritten)", args.parent_id, rewritten);
    Ok(())
}

pub fn execute_list(ctx: &Context, args: ListArgs) -> CliResult {
    let records = ctx.engine.list(&args.parent_id)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in records {
            println!("{}\t{}", record.position, record.id);
        }
    }
    Ok(())
}

pub fn execute_check(ctx: &Context, args: ParentRef) -> CliResult {
    ctx.engine.check_invariants(&args.parent_id)?;
    println!("ok");
    Ok(())
}

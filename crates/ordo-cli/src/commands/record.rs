//! Position-mutating commands on single records

use clap::Args;

use super::{CliResult, Context};

#[derive(Debug, Args)]
pub struct CreateArgs {
    pub parent_id: String,

    /// 1-based position; omitted appends at the end
    #[arg(long, allow_negative_numbers = true)]
    pub position: Option<i64>,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    pub record_id: String,

    #[arg(allow_negative_numbers = true)]
    pub position: i64,
}

#[derive(Debug, Args)]
pub struct ReleaseArgs {
    pub record_id: String,
}

/// Prints `<record id>\t<position>`
pub fn execute_create(ctx: &Context, args: CreateArgs) -> CliResult {
    let entry = ctx.engine.create(&args.parent_id, args.position, ())?;
    println!("{}\t{}", entry.record.id, entry.record.position);
    Ok(())
}

pub fn execute_move(ctx: &Context, args: MoveArgs) -> CliResult {
    let record = ctx.engine.move_to(&args.record_id, args.position)?;
    println!("{}\t{}", record.id, record.position);
    Ok(())
}

pub fn execute_release(ctx: &Context, args: ReleaseArgs) -> CliResult {
    ctx.engine.release(&args.record_id)?;
    println!("released {}", args.record_id);
    Ok(())
}

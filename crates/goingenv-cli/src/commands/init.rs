//! Init command implementation

use crate::cli::InitArgs;
use crate::output::OutputFormatter;
use crate::project;
use anyhow::Result;
use std::path::Path;

pub fn execute(args: &InitArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let created = project::init_project(Path::new("."), args.force)?;

    if created {
        formatter.format_success("Initialized goingenv in .goingenv/");
        formatter.format_note("Archives created here are safe to commit; run 'goingenv pack' to create one.");
    } else {
        formatter.format_note("goingenv is already initialized (use --force to recreate bookkeeping)");
    }

    Ok(())
}

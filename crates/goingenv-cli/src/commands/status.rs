//! Status command implementation

use crate::cli::StatusArgs;
use crate::error::convert_archive_error;
use crate::error::convert_scan_error;
use crate::output::OutputFormatter;
use crate::output::ProjectStatus;
use crate::project;
use anyhow::Result;
use goingenv_core::scan;
use goingenv_core::store;
use goingenv_core::FileStats;
use goingenv_core::ScanOptions;

pub fn execute(args: &StatusArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = project::load_config()?;

    let mut opts = ScanOptions::new(&args.directory);
    opts.max_depth = args.depth;
    let records = scan::scan_files(&config, &opts).map_err(convert_scan_error)?;
    let stats = FileStats::collect(&records);

    let store_dir = project::store_dir(&args.directory);
    let archives = store::available_archives(&store_dir)
        .map_err(|err| convert_archive_error(err, &store_dir))?;

    let status = ProjectStatus {
        initialized: project::is_initialized(&args.directory),
        root: args.directory.clone(),
        records,
        stats,
        archives,
    };

    formatter.format_status(&status)
}

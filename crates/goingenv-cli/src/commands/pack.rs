//! Pack command implementation

use crate::cli::PackArgs;
use crate::error::convert_archive_error;
use crate::error::convert_scan_error;
use crate::output::OutputFormatter;
use crate::password;
use crate::project;
use anyhow::Result;
use goingenv_core::archive;
use goingenv_core::scan;
use goingenv_core::store;
use goingenv_core::FileStats;
use goingenv_core::ScanOptions;
use std::path::PathBuf;

pub fn execute(args: &PackArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    project::require_initialized(&args.directory)?;
    let config = project::load_config()?;

    let mut opts = ScanOptions::new(&args.directory);
    opts.max_depth = args.depth;
    if !args.include.is_empty() {
        opts.patterns = Some(args.include.clone());
    }
    if !args.exclude.is_empty() {
        // User-supplied excludes extend the configured ones rather than
        // replacing them.
        let mut patterns = args.exclude.clone();
        patterns.extend(config.exclude_patterns.iter().cloned());
        opts.exclude_patterns = Some(patterns);
    }

    let records = scan::scan_files(&config, &opts).map_err(convert_scan_error)?;
    if records.is_empty() {
        formatter.format_warning("No environment files found matching the specified criteria");
        formatter.format_note("Tip: 'goingenv status' shows what is detected with current settings");
        return Ok(());
    }

    let stats = FileStats::collect(&records);
    formatter.format_scan_result(&records, &stats)?;

    let store_dir = project::store_dir(&args.directory);
    let output = resolve_output(args.output.as_deref(), &store_dir);

    if args.dry_run {
        formatter.format_note(&format!(
            "Dry run completed; archive would be created at {}",
            output.display()
        ));
        return Ok(());
    }

    let key = password::acquire(args.key.as_deref(), "Enter encryption password: ", true)?;

    let description = args.description.clone().unwrap_or_else(|| {
        format!(
            "Environment files archive created on {} from {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            args.directory.display()
        )
    });

    archive::pack(&records, &output, &key, &description)
        .map_err(|err| convert_archive_error(err, &output))?;

    formatter.format_pack_result(&output, records.len(), stats.total_size)?;
    Ok(())
}

/// Output paths are interpreted relative to the store directory so that
/// archives land next to each other by default.
fn resolve_output(output: Option<&std::path::Path>, store_dir: &std::path::Path) -> PathBuf {
    match output {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => store_dir.join(path),
        None => store::default_archive_path(store_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_resolve_output() {
        let store = Path::new("/project/.goingenv");
        assert_eq!(
            resolve_output(Some(Path::new("/abs/x.enc")), store),
            Path::new("/abs/x.enc")
        );
        assert_eq!(
            resolve_output(Some(Path::new("backup.enc")), store),
            Path::new("/project/.goingenv/backup.enc")
        );
        let generated = resolve_output(None, store);
        assert!(generated.starts_with(store));
        assert!(generated.to_string_lossy().ends_with(".enc"));
    }
}

//! Unpack command implementation

use crate::cli::UnpackArgs;
use crate::error::convert_archive_error;
use crate::output::OutputFormatter;
use crate::password;
use crate::project;
use anyhow::bail;
use anyhow::Result;
use goingenv_core::archive;
use goingenv_core::scan::compile_patterns;
use goingenv_core::store;
use goingenv_core::UnpackOptions;
use std::path::Path;
use std::path::PathBuf;

pub fn execute(args: &UnpackArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let root = Path::new(".");
    project::require_initialized(root)?;
    let store_dir = project::store_dir(root);

    let archive_path = match &args.file {
        Some(file) => resolve_archive(file, &store_dir),
        None => {
            let latest = store::latest_archive(&store_dir)
                .map_err(|err| convert_archive_error(err, &store_dir))?;
            match latest {
                Some(path) => {
                    formatter.format_note(&format!(
                        "Using most recent archive: {}",
                        path.display()
                    ));
                    path
                }
                None => bail!(
                    "no archives found in {}; use --file to name one",
                    store_dir.display()
                ),
            }
        }
    };

    if !archive_path.is_file() {
        bail!("archive file not found: {}", archive_path.display());
    }

    let key = password::acquire(args.key.as_deref(), "Enter decryption password: ", false)?;

    if args.dry_run {
        return dry_run(&archive_path, &key, args, formatter);
    }

    let opts = UnpackOptions {
        target_dir: args.target.clone(),
        overwrite: args.overwrite,
        backup: args.backup,
        include_patterns: args.include.clone(),
        exclude_patterns: args.exclude.clone(),
    };

    let report = archive::unpack(&archive_path, &key, &opts)
        .map_err(|err| convert_archive_error(err, &archive_path))?;

    let mismatches = if args.no_verify {
        None
    } else {
        // Verify only what was actually written; skipped files still hold
        // their previous content.
        let mut written = report.manifest.clone();
        written
            .files
            .retain(|file| report.extracted.contains(&file.relative_path));
        Some(
            archive::verify_extracted(&written, &args.target)
                .map_err(|err| convert_archive_error(err, &archive_path))?,
        )
    };

    formatter.format_unpack_result(&report, mismatches.as_deref())?;
    Ok(())
}

fn dry_run(
    archive_path: &Path,
    key: &secrecy::SecretString,
    args: &UnpackArgs,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let manifest = archive::list(archive_path, key)
        .map_err(|err| convert_archive_error(err, archive_path))?;

    let include = compile_patterns(&args.include)?;
    let exclude = compile_patterns(&args.exclude)?;

    for file in &manifest.files {
        let base = file.relative_path.rsplit('/').next().unwrap_or_default();
        let included = include.is_empty() || include.iter().any(|re| re.is_match(base));
        if included && !exclude.iter().any(|re| re.is_match(base)) {
            formatter.format_note(&format!(
                "Would extract {} to {}",
                file.relative_path,
                args.target.join(&file.relative_path).display()
            ));
        }
    }

    Ok(())
}

/// Accepts a path as given, falling back to the store directory for bare
/// relative names.
pub(crate) fn resolve_archive(file: &Path, store_dir: &Path) -> PathBuf {
    if file.is_file() || file.is_absolute() {
        return file.to_path_buf();
    }
    let in_store = store_dir.join(file);
    if in_store.is_file() {
        in_store
    } else {
        file.to_path_buf()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_archive_prefers_existing_path() {
        let temp = TempDir::new().unwrap();
        let store = temp.path().join(".goingenv");
        std::fs::create_dir(&store).unwrap();
        std::fs::write(store.join("a.enc"), b"x").unwrap();

        let resolved = resolve_archive(Path::new("a.enc"), &store);
        assert_eq!(resolved, store.join("a.enc"));

        let absolute = temp.path().join("b.enc");
        let resolved = resolve_archive(&absolute, &store);
        assert_eq!(resolved, absolute);
    }
}

//! List command implementation

use crate::cli::ListArgs;
use crate::error::convert_archive_error;
use crate::output::OutputFormatter;
use crate::password;
use crate::project;
use anyhow::bail;
use anyhow::Result;
use goingenv_core::archive;
use goingenv_core::store;
use std::path::Path;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let root = Path::new(".");
    project::require_initialized(root)?;
    let store_dir = project::store_dir(root);

    let archive_path = match &args.file {
        Some(file) => super::unpack::resolve_archive(file, &store_dir),
        None => {
            let latest = store::latest_archive(&store_dir)
                .map_err(|err| convert_archive_error(err, &store_dir))?;
            match latest {
                Some(path) => path,
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

    let manifest = archive::list(&archive_path, &key)
        .map_err(|err| convert_archive_error(err, &archive_path))?;

    formatter.format_manifest(&archive_path, &manifest, args.long)
}

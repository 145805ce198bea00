//! Workspace preparation
//!
//! Ensures the target directory tree exists and is cleared of artifacts from
//! the previous run. Result files, logs and markers survive between runs on
//! purpose; the purge happens at the start of the *next* run, so operators
//! can inspect everything in the meantime.
//!
//! Two concurrent runs sharing a target path would purge each other's
//! artifacts; single-writer usage is an operational constraint here, not
//! something this code guards against.

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Validate the workspace root and (re)create a clean directory tree.
pub fn prepare(config: &ExportConfig) -> Result<()> {
    let root = &config.target_path;

    if root.as_os_str().is_empty() || root == Path::new("/") {
        return Err(ExportError::config(
            "target_path has not been set in the configuration file. \
             Please set it to the export working directory and re-run.",
        ));
    }

    if !root.is_dir() {
        return Err(ExportError::config(format!(
            "target_path '{}' does not exist. Please create it or change \
             the configuration file, and then re-run.",
            root.display()
        )));
    }

    // The root itself is operator-managed; only subdirectories are created.
    for dir in [
        config.status_path(),
        config.log_path(),
        config.script_path(),
        config.final_result_path(),
    ] {
        std::fs::create_dir_all(&dir)?;
    }

    // Clean slate: stale markers, scripts and logs from the previous run
    // must not satisfy this run's completion checks.
    for dir in [config.status_path(), config.script_path(), config.log_path()] {
        purge_files(&dir)?;
    }

    if let Some(ref apollo) = config.apollo {
        let apollo_dir = config.apollo_result_path();
        std::fs::create_dir_all(&apollo_dir)?;
        purge_files(&apollo_dir)?;

        if apollo.copy_to_ftp {
            if let Some(staging) = apollo.ftp_staging_path() {
                std::fs::create_dir_all(&staging)?;
                debug!(staging = %staging.display(), "Created dated FTP staging directory");
            }
        }
    }

    info!(root = %root.display(), "Workspace prepared");

    Ok(())
}

/// Delete all regular files directly under `dir`. Subdirectories and their
/// contents are left alone.
fn purge_files(dir: &Path) -> Result<()> {
    let mut removed = 0usize;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    if removed > 0 {
        debug!(dir = %dir.display(), removed, "Purged stale files");
    }

    Ok(())
}

//! Chado Export CLI Library
//!
//! Exports Chado organism annotation data to GFF3, batched across many
//! organisms and submitted as parallel jobs to an LSF cluster.
//!
//! # Overview
//!
//! A run works through these stages:
//!
//! - **Workspace**: validate the target root and reset the scripts/logs/status
//!   tree (`workspace`)
//! - **Organism list**: from the Chado database or a flat file (`organisms`)
//! - **Chunking**: fixed-size, order-preserving groups (`chunk`)
//! - **Script generation**: one bash pipeline per chunk (`script`)
//! - **Submission**: fire-and-forget `bsub` per chunk (`submit`)
//! - **Completion tracking**: one dependent checker job that mails a
//!   pass/fail report (`checker`)

pub mod checker;
pub mod chunk;
pub mod commands;
pub mod config;
pub mod error;
pub mod organisms;
pub mod script;
pub mod submit;
pub mod workspace;

// Re-export commonly used types
pub use config::ExportConfig;
pub use error::{ExportError, Result};

use clap::Parser;
use std::path::PathBuf;

/// Default organism list file used when `-f` is given without a value.
pub const DEFAULT_ORG_LIST_FILE: &str = "chado-export.orglist";

/// chado-export - Chado to GFF3 batch export
#[derive(Parser, Debug)]
#[command(name = "chado-export")]
#[command(author, version, about = "Export Chado organism annotation data to GFF3 files")]
pub struct Cli {
    /// Path of the export configuration file
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,

    /// Export all publicly exportable Chado organisms
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// File containing a custom list of organisms to export
    #[arg(
        short = 'f',
        long = "org-list",
        conflicts_with = "all",
        num_args = 0..=1,
        default_missing_value = DEFAULT_ORG_LIST_FILE
    )]
    pub org_list: Option<PathBuf>,

    /// Build scripts and submission commands without dispatching any job
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Organism list file for file-sourced runs.
    pub fn org_list_file(&self) -> PathBuf {
        self.org_list
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ORG_LIST_FILE))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["chado-export", "-c", "export.ini"]);
        assert_eq!(cli.config, PathBuf::from("export.ini"));
        assert!(!cli.all);
        assert!(!cli.dry_run);
        assert_eq!(cli.org_list_file(), PathBuf::from(DEFAULT_ORG_LIST_FILE));
    }

    #[test]
    fn test_org_list_flag_without_value_uses_default() {
        let cli = Cli::parse_from(["chado-export", "-c", "export.ini", "-f"]);
        assert_eq!(cli.org_list_file(), PathBuf::from(DEFAULT_ORG_LIST_FILE));
    }

    #[test]
    fn test_org_list_flag_with_value() {
        let cli = Cli::parse_from(["chado-export", "-c", "export.ini", "-f", "custom.orglist"]);
        assert_eq!(cli.org_list_file(), PathBuf::from("custom.orglist"));
    }

    #[test]
    fn test_all_mode() {
        let cli = Cli::parse_from(["chado-export", "-c", "export.ini", "-a"]);
        assert!(cli.all);
    }

    #[test]
    fn test_all_conflicts_with_org_list() {
        let result = Cli::try_parse_from(["chado-export", "-c", "export.ini", "-a", "-f", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_is_required() {
        let result = Cli::try_parse_from(["chado-export", "-a"]);
        assert!(result.is_err());
    }
}

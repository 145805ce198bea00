//! End-to-end tests for the chado-export binary
//!
//! Everything runs in dry-run mode against a temporary workspace: scripts
//! and the checker are generated and written, but nothing is handed to the
//! scheduler and no database connection is made.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway workspace with a valid configuration file and fake tool
/// binaries.
struct Workspace {
    dir: TempDir,
    ini: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        Self::with_apollo(false)
    }

    fn with_apollo(apollo: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let gt = fake_binary(dir.path(), "gt");
        let writedb = fake_binary(dir.path(), "writedb_entry");

        let mut body = format!(
            "[general]\n\
             genome_tools_bin = {}\n\
             write_db_entry_path = {}\n\
             target_path = {}\n\
             \n\
             [job]\n\
             slice_size = 10\n\
             queue = basement\n\
             report_email = curator@example.org\n\
             \n\
             [connection]\n\
             database = chado\n\
             user = pathdb\n\
             host = localhost\n\
             password = secret\n\
             port = 5432\n",
            gt.display(),
            writedb.display(),
            dir.path().display()
        );

        if apollo {
            let converter = fake_binary(dir.path(), "apollo_convert");
            body.push_str(&format!(
                "\n[apollo]\nconverter_app = {}\nconverter_args = --pretty\n",
                converter.display()
            ));
        }

        let ini = dir.path().join("chado-export.ini");
        fs::write(&ini, body).unwrap();

        Self { dir, ini }
    }

    fn write_orglist(&self, count: usize) -> PathBuf {
        let names: Vec<String> = (1..=count).map(|i| format!("Organism{:02}", i)).collect();
        let path = self.dir.path().join("test.orglist");
        fs::write(&path, names.join("\n")).unwrap();
        path
    }

    fn scripts_dir(&self) -> PathBuf {
        self.dir.path().join("scripts")
    }

    fn script_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.scripts_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn fake_binary(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "#!/bin/bash\n").unwrap();
    path
}

fn chado_export() -> Command {
    Command::cargo_bin("chado-export").unwrap()
}

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn test_config_flag_is_required() {
    chado_export().arg("-a").assert().failure();
}

#[test]
fn test_all_and_org_list_are_mutually_exclusive() {
    chado_export()
        .args(["-c", "export.ini", "-a", "-f", "some.orglist"])
        .assert()
        .failure();
}

#[test]
fn test_missing_config_file_is_fatal() {
    chado_export()
        .args(["-c", "/nonexistent/export.ini", "--dry-run", "-f", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_missing_org_list_file_is_fatal() {
    let workspace = Workspace::new();

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f", "/nonexistent/orglist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_invalid_report_email_is_fatal() {
    let workspace = Workspace::new();
    let body = fs::read_to_string(&workspace.ini).unwrap();
    fs::write(
        &workspace.ini,
        body.replace("curator@example.org", "not-an-address"),
    )
    .unwrap();
    let orglist = workspace.write_orglist(5);

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&orglist)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_missing_target_root_is_fatal() {
    let workspace = Workspace::new();
    let body = fs::read_to_string(&workspace.ini).unwrap();
    let patched = body
        .lines()
        .map(|line| {
            if line.starts_with("target_path") {
                "target_path = /nonexistent/chado-gff".to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&workspace.ini, patched).unwrap();
    let orglist = workspace.write_orglist(5);

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&orglist)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

// ============================================================================
// Dry-run script generation
// ============================================================================

#[test]
fn test_forty_organisms_produce_four_chunk_scripts() {
    let workspace = Workspace::new();
    let orglist = workspace.write_orglist(40);

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&orglist)
        .assert()
        .success();

    let names = workspace.script_names();
    // Four chunk scripts plus the completion checker.
    assert_eq!(names.len(), 5);
    assert_eq!(names.iter().filter(|n| n.contains("__")).count(), 4);
    assert!(names.iter().any(|n| n == "check_chadoexp"));
    assert!(names.iter().any(|n| n.starts_with("1__Organism01")));
    assert!(names.iter().any(|n| n.starts_with("4__Organism31")));
}

#[test]
fn test_slice_size_three_produces_fourteen_chunks() {
    let workspace = Workspace::new();
    let body = fs::read_to_string(&workspace.ini).unwrap();
    fs::write(&workspace.ini, body.replace("slice_size = 10", "slice_size = 3")).unwrap();
    let orglist = workspace.write_orglist(40);

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&orglist)
        .assert()
        .success();

    let names = workspace.script_names();
    assert_eq!(names.iter().filter(|n| n.contains("__")).count(), 14);
    // The last chunk holds the single trailing organism.
    assert!(names.iter().any(|n| n == &"14__Organism40".to_string()));
}

#[test]
fn test_chunk_script_content() {
    let workspace = Workspace::new();
    let orglist = workspace.write_orglist(12);

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&orglist)
        .assert()
        .success();

    let first = workspace
        .script_names()
        .into_iter()
        .find(|n| n.starts_with("1__"))
        .unwrap();
    let text = fs::read_to_string(workspace.scripts_dir().join(&first)).unwrap();

    assert!(text.starts_with("#!/bin/bash\n"));
    assert!(text.contains("writedb_entries.py -v -w"));
    assert!(text.contains("-o Organism01"));
    assert!(text.contains("-o Organism10"));
    assert!(!text.contains("-o Organism11"));
    assert!(text.contains("gff3 -sort -tidy -force -retainids"));
    assert!(text.contains("inlineseq_split"));
    assert!(text.trim_end().ends_with(&format!("touch {}", {
        let done = workspace.dir.path().join("status").join(format!("{}.done", first));
        done.display().to_string()
    })));
}

#[test]
fn test_apollo_config_switches_script_branches() {
    let workspace = Workspace::with_apollo(true);
    let orglist = workspace.write_orglist(3);

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&orglist)
        .assert()
        .success();

    let first = workspace
        .script_names()
        .into_iter()
        .find(|n| n.starts_with("1__"))
        .unwrap();
    let text = fs::read_to_string(workspace.scripts_dir().join(&first)).unwrap();

    assert!(text.contains("apollo_convert --pretty"));
    assert!(text.contains("PIPESTATUS"));
    assert!(!text.contains("inlineseq_split"));
    assert!(!text.contains("extractfeat"));
}

#[test]
fn test_checker_script_covers_all_chunks() {
    let workspace = Workspace::new();
    let orglist = workspace.write_orglist(25);

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&orglist)
        .assert()
        .success();

    let text = fs::read_to_string(workspace.scripts_dir().join("check_chadoexp")).unwrap();

    assert_eq!(text.matches("if [ ! -f ").count(), 3);
    assert_eq!(text.matches("if [ -s ").count(), 3);
    assert!(text.contains("mail -s \"chadoexp export succeeded\" curator@example.org"));
    assert!(text.contains("mail -s \"chadoexp export FAILED\" curator@example.org"));
}

#[test]
fn test_empty_org_list_submits_nothing() {
    let workspace = Workspace::new();
    let orglist = workspace.dir.path().join("empty.orglist");
    fs::write(&orglist, "# nothing to see\n").unwrap();

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&orglist)
        .assert()
        .success();

    assert!(workspace.script_names().is_empty());
}

#[test]
fn test_rerun_purges_previous_scripts() {
    let workspace = Workspace::new();
    let big = workspace.write_orglist(40);
    let small = {
        let path = workspace.dir.path().join("small.orglist");
        fs::write(&path, "Smansoni\n").unwrap();
        path
    };

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&big)
        .assert()
        .success();
    assert_eq!(workspace.script_names().len(), 5);

    chado_export()
        .args(["-c"])
        .arg(&workspace.ini)
        .args(["--dry-run", "-f"])
        .arg(&small)
        .assert()
        .success();

    // Clean slate: only the new run's script and checker remain.
    let names = workspace.script_names();
    assert_eq!(names, vec!["1__Smansoni".to_string(), "check_chadoexp".to_string()]);
}

//! Scheduler job submission
//!
//! Turns a generated pipeline script into an LSF `bsub` command line and,
//! unless the run is a dry run, spawns it fire-and-forget through a shell.
//! The submitted job's exit is never observed here; completion is tracked
//! later through the marker file and error log recorded on the handle.

use crate::config::ExportConfig;
use crate::script::PipelineScript;
use std::path::PathBuf;
use tracing::{info, warn};

/// Correlation record for one dispatched chunk job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    /// Scheduler job name (`<prefix><sequence>`)
    pub job_name: String,

    /// Completion marker touched by the script's final stage
    pub done_file: PathBuf,

    /// Scheduler stderr log; non-empty means the chunk had errors
    pub stderr_log: PathBuf,
}

/// Build the scheduler submission command for a pipeline script.
pub fn submission_command(script: &PipelineScript, config: &ExportConfig) -> String {
    format!(
        "source /etc/bashrc; bsub -J {job} -q {queue} -n{workers} \
         -R 'select[mem>{mem}] rusage[mem={mem}] span[hosts=1]' -M {mem} \
         -o {out} -e {err} {script}",
        job = script.job_name,
        queue = config.queue,
        workers = config.workers,
        mem = config.memory_mb,
        out = script.stdout_log.display(),
        err = script.stderr_log.display(),
        script = script.script_file.display(),
    )
}

/// Submit a pipeline script to the scheduler.
///
/// With `dispatch` false the command is constructed but not executed (dry
/// run). A failed spawn is logged and otherwise ignored; submission is
/// fire-and-forget and has no supported recovery path.
pub fn submit(script: &PipelineScript, config: &ExportConfig, dispatch: bool) -> JobHandle {
    let command = submission_command(script, config);

    if dispatch {
        info!(job = %script.job_name, script = %script.name, "Submitting chunk job");
        run_bash(&command);
    } else {
        info!(job = %script.job_name, command = %command, "Dry run, submission skipped");
    }

    JobHandle {
        job_name: script.job_name.clone(),
        done_file: script.done_file.clone(),
        stderr_log: script.stderr_log.clone(),
    }
}

/// Spawn a shell command without waiting for it.
pub(crate) fn run_bash(command: &str) {
    match tokio::process::Command::new("bash")
        .arg("-c")
        .arg(command)
        .spawn()
    {
        // The child is dropped deliberately; the scheduler owns the job from
        // here and completion is observed via marker files.
        Ok(_child) => {},
        Err(error) => {
            warn!(%error, command, "Failed to spawn submission command");
        },
    }
}

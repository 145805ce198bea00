//! Completion-checker job
//!
//! After all chunk jobs are dispatched, a single dependent job is submitted
//! that waits for every job matching the configured title prefix to end,
//! inspects each chunk's completion marker and error log, and mails exactly
//! one pass/fail report to the operator.
//!
//! The wait condition is keyed on the job-name prefix plus a wildcard, so a
//! concurrent unrelated run sharing the prefix can satisfy it early. That
//! race is accepted; the configured start delay (>= 1 s) is the only
//! mitigation.

use crate::config::ExportConfig;
use crate::error::Result;
use crate::submit::{run_bash, JobHandle};
use std::path::PathBuf;
use tracing::{debug, info};

/// The checker script and its submission command.
#[derive(Debug, Clone)]
pub struct CheckerScript {
    /// Stable base name (`check_<prefix>`)
    pub name: String,

    /// Rendered script text
    pub text: String,

    /// Where the script file is written
    pub script_file: PathBuf,

    /// Scheduler stdout log
    pub stdout_log: PathBuf,

    /// Scheduler stderr log
    pub stderr_log: PathBuf,

    /// Full scheduler submission command
    pub submission: String,
}

/// Builds and dispatches the completion-checker job for one run.
pub struct CompletionChecker<'a> {
    config: &'a ExportConfig,
}

impl<'a> CompletionChecker<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Render the checker script and its submission command.
    ///
    /// Returns `None` when no jobs were dispatched: nothing to wait for,
    /// nothing to report.
    pub fn build(&self, handles: &[JobHandle]) -> Option<CheckerScript> {
        if handles.is_empty() {
            return None;
        }

        let config = self.config;
        let name = format!("check_{}", config.job_name_prefix);
        let script_file = config.script_path().join(&name);
        let stdout_log = config.log_path().join(format!("{}.o", name));
        let stderr_log = config.log_path().join(format!("{}.e", name));

        let text = self.render_script(handles);

        // The checker job name must NOT match the prefix wildcard below, or
        // the wait condition could key on the checker itself.
        let submission = format!(
            "source /etc/bashrc; bsub -J {name} -w 'ended(\"{prefix}*\")' -q {queue} \
             -o {out} -e {err} {script}",
            prefix = config.job_name_prefix,
            queue = config.queue,
            out = stdout_log.display(),
            err = stderr_log.display(),
            script = script_file.display(),
        );

        debug!(jobs = handles.len(), script = %name, "Rendered completion-checker script");

        Some(CheckerScript {
            name,
            text,
            script_file,
            stdout_log,
            stderr_log,
            submission,
        })
    }

    /// Script body: accumulate a line per missing marker and per non-empty
    /// error log, then send exactly one success or failure mail.
    fn render_script(&self, handles: &[JobHandle]) -> String {
        let config = self.config;
        let recipient = config
            .report_email
            .as_deref()
            .unwrap_or("$USER")
            .to_string();

        let mut script = String::new();
        script.push_str("#!/bin/bash\n");
        script.push_str("report=\"\"\n");

        for handle in handles {
            script.push_str(&format!(
                "if [ ! -f {marker} ]; then report=\"${{report}}missing completion marker: {marker}\\n\"; fi\n",
                marker = handle.done_file.display(),
            ));
        }

        for handle in handles {
            script.push_str(&format!(
                "if [ -s {log} ]; then report=\"${{report}}errors logged in: {log}\\n\"; fi\n",
                log = handle.stderr_log.display(),
            ));
        }

        script.push_str(&format!(
            "if [ -z \"$report\" ]; then\n\
             \techo \"All {count} {prefix} export jobs completed successfully.\" | mail -s \"{prefix} export succeeded\" {recipient}\n\
             else\n\
             \techo -e \"$report\" | mail -s \"{prefix} export FAILED\" {recipient}\n\
             fi\n",
            count = handles.len(),
            prefix = config.job_name_prefix,
        ));

        script
    }

    /// Write the checker script and mark it executable.
    pub fn write(&self, checker: &CheckerScript) -> Result<()> {
        std::fs::write(&checker.script_file, &checker.text)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(
                &checker.script_file,
                std::fs::Permissions::from_mode(0o775),
            )?;
        }

        Ok(())
    }

    /// Dispatch the checker job after the configured start delay.
    ///
    /// The delay gives the scheduler time to register the chunk jobs before
    /// the prefix-wildcard wait condition is evaluated. With `dispatch`
    /// false nothing is executed.
    pub async fn submit(&self, checker: &CheckerScript, dispatch: bool) {
        if !dispatch {
            info!(command = %checker.submission, "Dry run, checker submission skipped");
            return;
        }

        let delay = std::time::Duration::from_secs(self.config.checker_start_delay_secs);
        info!(delay_secs = self.config.checker_start_delay_secs, "Waiting before checker submission");
        tokio::time::sleep(delay).await;

        info!(script = %checker.name, "Submitting completion-checker job");
        run_bash(&checker.submission);
    }
}

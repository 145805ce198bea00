//! Per-chunk pipeline script generation
//!
//! Each chunk of organisms becomes one self-contained bash script that runs
//! the full extraction pipeline on a cluster node: a defensive cleanup of
//! stale working directories, one combined extraction-driver invocation for
//! the whole chunk, then per-organism tidy/merge/publish steps, and finally
//! the completion-marker touch. When Apollo export is configured the
//! per-organism splitting and sequence-extraction steps are replaced by a
//! guarded conversion block (and an optional FTP staging copy).

use crate::config::{ExportConfig, EXTRACTION_FEATURE_HINT};
use crate::error::Result;
use std::path::PathBuf;
use tracing::debug;

/// Shell variable tracking tool failures inside a generated script.
const ERROR_STATUS_VAR: &str = "EXPORT_ERROR";

/// Derived artifacts for one chunk: the rendered script and the paths the
/// submitter and completion checker need to correlate with it.
#[derive(Debug, Clone)]
pub struct PipelineScript {
    /// Run-local sequence number (1-based)
    pub sequence: usize,

    /// Stable base name: `<sequence>__<concatenated organism names>`
    pub name: String,

    /// Scheduler job name: `<job_name_prefix><sequence>`
    pub job_name: String,

    /// Rendered script text
    pub text: String,

    /// Where the script file is written
    pub script_file: PathBuf,

    /// Completion marker touched by the script's final stage
    pub done_file: PathBuf,

    /// Scheduler stdout log
    pub stdout_log: PathBuf,

    /// Scheduler stderr log
    pub stderr_log: PathBuf,
}

/// Renders pipeline scripts for one run.
pub struct ScriptBuilder<'a> {
    config: &'a ExportConfig,
}

impl<'a> ScriptBuilder<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Render the pipeline script for one chunk.
    pub fn build(&self, sequence: usize, chunk: &[String]) -> PipelineScript {
        let config = self.config;
        let name = format!("{}__{}", sequence, chunk.concat());
        let result_base = config.result_base_path();

        let mut script = String::new();
        script.push_str("#!/bin/bash\n");
        script.push_str(&format!("{}=0\n", ERROR_STATUS_VAR));

        // Stale working directories from a partial earlier run would pollute
        // the flatten step below.
        for org in chunk {
            let orgpath = result_base.join(org);
            script.push_str(&format!("rm -rf {}\n", orgpath.display()));
        }

        // One extraction-driver call covers the whole chunk.
        let mut runstr = format!(
            "writedb_entries.py -v -w {} ",
            config.write_db_entry_path.display()
        );
        for org in chunk {
            runstr.push_str(&format!(" -o {} ", org));
        }
        runstr.push_str(&format!(
            " -x {} -d {} -f {}",
            config.target_path.display(),
            config.config_file.display(),
            EXTRACTION_FEATURE_HINT
        ));
        script.push_str(&runstr);
        script.push('\n');

        for org in chunk {
            script.push_str(&self.render_organism_steps(org));
        }

        let done_file = config.status_path().join(format!("{}.done", name));
        script.push_str(&format!("touch {}\n", done_file.display()));

        debug!(sequence, organisms = chunk.len(), script = %name, "Rendered pipeline script");

        PipelineScript {
            sequence,
            job_name: format!("{}{}", config.job_name_prefix, sequence),
            script_file: config.script_path().join(&name),
            stdout_log: config.log_path().join(format!("{}.o", name)),
            stderr_log: config.log_path().join(format!("{}.e", name)),
            done_file,
            text: script,
            name,
        }
    }

    /// Per-organism post-extraction steps.
    fn render_organism_steps(&self, org: &str) -> String {
        let config = self.config;
        let orgpath = config.result_base_path().join(org);
        let orgpath = orgpath.display();
        let results = config.final_result_path();
        let results = results.display();
        let gt = config.genome_tools_bin.display();

        let mut fragment = String::new();

        // Flatten the working directory, drop the transient tidy log and the
        // now-empty single-character subdirectories the driver leaves behind.
        fragment.push_str(&format!(
            "find {orgpath} -type f -exec mv {{}} {orgpath} \\;\n"
        ));
        fragment.push_str(&format!("rm -f {orgpath}/tidylog.log\n"));
        fragment.push_str(&format!("rmdir --ignore-fail-on-non-empty {orgpath}/?\n"));

        // Merge the per-feature GFFs into one compressed file per organism.
        let merge_glob = format!("{orgpath}/*.gff.gz");
        let merge_glob = if config.gt_filepath_wildcard_escaping {
            escape_wildcards(&merge_glob)
        } else {
            merge_glob
        };
        fragment.push_str(&format!(
            "GT_RETAINIDS=yes {gt} gff3 -sort -tidy -force -retainids -o {orgpath}/{org}.gff3.gz -gzip {merge_glob} 2> {orgpath}/{org}.tidylog\n"
        ));

        fragment.push_str(&format!("chmod -R 775 {orgpath}\n"));
        fragment.push_str(&format!("cp {orgpath}/{org}.gff3.gz {results}\n"));
        fragment.push_str(&format!("cp {orgpath}/{org}.tidylog {results}\n"));

        if let Some(ref apollo) = config.apollo {
            // Apollo takes the merged file as-is; splitting and sequence
            // extraction are skipped entirely.
            fragment.push_str(&format!("rm -rf {orgpath}\n"));

            let input = format!("{results}/{org}.gff3.gz");
            let output = config.apollo_result_path().join(format!("{org}.gff3.gz"));
            let output = output.display().to_string();
            fragment.push_str(&render_conversion_block(
                &input,
                &output,
                &apollo.converter_app.display().to_string(),
                &apollo.converter_args,
            ));

            if apollo.copy_to_ftp {
                if let Some(staging) = apollo.ftp_staging_path() {
                    fragment.push_str(&format!(
                        "if [ -s {output} ]; then cp {output} {} ; fi\n",
                        staging.display()
                    ));
                }
            }
        } else {
            // Split sequences from annotations, compress, and derive protein
            // and cDNA FASTA files.
            fragment.push_str(&format!(
                "GT_RETAINIDS=yes {gt} inlineseq_split -seqfile {results}/{org}.genome.fasta -gff3file {results}/{org}.noseq.gff3 {results}/{org}.gff3.gz\n"
            ));
            fragment.push_str(&format!("gzip -f {results}/{org}.genome.fasta\n"));
            fragment.push_str(&format!("gzip -f {results}/{org}.noseq.gff3\n"));
            fragment.push_str(&format!(
                "GT_RETAINIDS=yes {gt} extractfeat -type CDS -join -translate -retainids -seqfile {results}/{org}.genome.fasta.gz -matchdescstart -force -o {results}/{org}.prot.fasta.gz -gzip {results}/{org}.noseq.gff3.gz\n"
            ));
            fragment.push_str(&format!(
                "GT_RETAINIDS=yes {gt} extractfeat -type mRNA -retainids -seqfile {results}/{org}.genome.fasta.gz -matchdescstart -force -o {results}/{org}.cdna.fasta.gz -gzip {results}/{org}.noseq.gff3.gz\n"
            ));
            fragment.push_str(&format!("rm -f {results}/{org}.genome.fasta.gz.*\n"));
            fragment.push_str(&format!("chmod -R 777 {results}\n"));
            fragment.push_str(&format!(
                "get_GO_association.pl -type transcript -o {org} > {results}/{org}.gaf\n"
            ));

            // Working directory is no longer needed; reclaim the space.
            fragment.push_str(&format!("rm -rf {orgpath}\n"));
        }

        fragment.push('\n');
        fragment
    }

    /// Write the script to the scripts directory and mark it executable.
    pub fn write(&self, script: &PipelineScript) -> Result<()> {
        std::fs::write(&script.script_file, &script.text)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(
                &script.script_file,
                std::fs::Permissions::from_mode(0o775),
            )?;
        }

        Ok(())
    }
}

/// Escape literal `*` characters for embedding in a genome-tools file
/// argument. Pure transform: every `*` becomes `\*`, nothing else changes.
pub fn escape_wildcards(glob: &str) -> String {
    glob.replace('*', "\\*")
}

/// Render the guarded Apollo conversion block.
///
/// Decompresses the input through the converter and recompresses to the
/// output file. The converter's own exit status (not gzip's) decides
/// failure: on non-zero exit the partial output is removed, the shared
/// error-status variable is set and a diagnostic naming the converter goes
/// to stderr. A missing or empty input is a warning, not an error.
fn render_conversion_block(input: &str, output: &str, command: &str, args: &str) -> String {
    let invocation = if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args)
    };

    format!(
        "if [ -s {input} ]; then\n\
         \tzcat {input} | {invocation} | gzip -c > {output}\n\
         \tif [ \"${{PIPESTATUS[1]}}\" -ne 0 ]; then\n\
         \t\trm -f {output}\n\
         \t\t{var}=1\n\
         \t\techo \"ERROR: {command} failed for {input}\" >&2\n\
         \tfi\n\
         else\n\
         \techo \"WARNING: {command} skipped, input file {input} missing or empty\"\n\
         fi\n",
        var = ERROR_STATUS_VAR,
    )
}

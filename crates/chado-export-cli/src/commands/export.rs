//! The export run: the top-level orchestration of one batch export.

use crate::checker::CompletionChecker;
use crate::config::ExportConfig;
use crate::error::Result;
use crate::script::ScriptBuilder;
use crate::submit::{submit, JobHandle};
use crate::{chunk, organisms, workspace, Cli};
use tracing::{debug, info, warn};

/// Run one export: prepare the workspace, resolve the organism list, then
/// generate and dispatch one job per chunk plus the completion checker.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = ExportConfig::load(&cli.config)?;
    log_configuration(&config);

    workspace::prepare(&config)?;

    let organism_list = if cli.all {
        organisms::fetch_public_organisms(&config.connection).await?
    } else {
        organisms::read_organism_list_from_file(cli.org_list_file())?
    };

    if organism_list.is_empty() {
        warn!("No organisms to export; nothing submitted");
        return Ok(());
    }

    let chunks = chunk::chunk(&organism_list, config.slice_size)?;
    info!(
        organisms = organism_list.len(),
        chunks = chunks.len(),
        slice_size = config.slice_size,
        dry_run = cli.dry_run,
        "Starting export"
    );

    let dispatch = !cli.dry_run;
    let builder = ScriptBuilder::new(&config);
    let mut handles: Vec<JobHandle> = Vec::with_capacity(chunks.len());

    for (index, group) in chunks.iter().enumerate() {
        let script = builder.build(index + 1, group);
        builder.write(&script)?;
        handles.push(submit(&script, &config, dispatch));
    }

    let completion = CompletionChecker::new(&config);
    if let Some(checker_script) = completion.build(&handles) {
        completion.write(&checker_script)?;
        completion.submit(&checker_script, dispatch).await;
    }

    info!(jobs = handles.len(), "Export dispatched");

    Ok(())
}

/// Log the resolved configuration at debug level (credentials excluded).
fn log_configuration(config: &ExportConfig) {
    debug!(
        genome_tools_bin = %config.genome_tools_bin.display(),
        write_db_entry_path = %config.write_db_entry_path.display(),
        target_path = %config.target_path.display(),
        slice_size = config.slice_size,
        queue = %config.queue,
        job_name_prefix = %config.job_name_prefix,
        wildcard_escaping = config.gt_filepath_wildcard_escaping,
        checker_start_delay_secs = config.checker_start_delay_secs,
        apollo = config.apollo_enabled(),
        database = %config.connection.database,
        host = %config.connection.host,
        "Resolved configuration"
    );
}

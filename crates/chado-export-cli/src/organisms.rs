//! Organism list sources
//!
//! The export takes its organism names either from a flat list file or from
//! the Chado database's set of publicly exportable organisms. Both sources
//! produce a plain ordered `Vec<String>` for the chunker.

use crate::config::ConnectionConfig;
use crate::error::{ExportError, Result};
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Query for organisms flagged as publicly exportable.
const PUBLIC_ORGANISMS_QUERY: &str = "\
    select o.common_name as commonName \
    from organismprop op \
    left join cvterm cv on op.type_id = cv.cvterm_id \
    left join organism o on o.organism_id = op.organism_id \
    where cv.name = 'genedb_public' and op.value = 'yes'";

/// Read an organism list from a flat file.
///
/// Lines are trimmed; blank lines and `#` comments are skipped. Duplicates
/// pass through unchanged.
pub fn read_organism_list_from_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ExportError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let organisms: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    debug!(count = organisms.len(), path = %path.display(), "Read organism list from file");

    Ok(organisms)
}

/// Fetch all publicly exportable organisms from the Chado database.
///
/// The connection is scoped to this call: the pool is opened, the query is
/// run, and the pool is closed again before returning, whether or not the
/// query succeeded.
pub async fn fetch_public_organisms(connection: &ConnectionConfig) -> Result<Vec<String>> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&connection.url())
        .await?;

    info!(host = %connection.host, database = %connection.database, "Connected to Chado database");

    let result = sqlx::query_scalar::<_, String>(PUBLIC_ORGANISMS_QUERY)
        .fetch_all(&pool)
        .await;

    pool.close().await;

    let organisms = result?;
    info!(count = organisms.len(), "Fetched publicly exportable organisms");

    Ok(organisms)
}

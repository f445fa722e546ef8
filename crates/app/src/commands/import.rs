//! Snapshot import from a JSON document

use std::path::{Path, PathBuf};

use fyxed_core::ImportSummary;
use fyxed_domain::{FyxedError, Result as DomainResult, Sale, User};
use serde::Deserialize;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Users and sales as fetched from the upstream store
///
/// Either list may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotDocument {
    pub users: Vec<User>,
    pub sales: Vec<Sale>,
}

impl SnapshotDocument {
    /// Read and parse a snapshot file
    pub async fn read(path: &Path) -> DomainResult<Self> {
        let owned: PathBuf = path.to_path_buf();
        let contents = tokio::task::spawn_blocking(move || std::fs::read_to_string(owned))
            .await
            .map_err(|e| FyxedError::Internal(format!("Task join error: {e}")))?
            .map_err(|e| {
                FyxedError::InvalidInput(format!("cannot read snapshot {}: {e}", path.display()))
            })?;

        Ok(serde_json::from_str(&contents)?)
    }
}

/// Upsert the snapshot's users and insert its sales.
pub async fn import_snapshot(ctx: &AppContext, path: &Path) -> DomainResult<ImportSummary> {
    execute_command("snapshot::import", || async {
        let document = SnapshotDocument::read(path).await?;
        ctx.snapshots.import(document.users, document.sales).await
    })
    .await
}

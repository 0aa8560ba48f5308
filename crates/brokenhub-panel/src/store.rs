//! Durable storage of the impairment configuration.
//!
//! The file is the only source of truth: nothing is cached between calls, so
//! every [`ConfigStore::load`] observes the last completed [`ConfigStore::save`].
//! Saves go through a sibling temp file and a rename, so a reader sees either
//! the old or the new document, never a torn one. A symlinked config path is
//! resolved first so the link itself survives the rename.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::PanelError;
use crate::record::{Field, Record};

/// Handle to the config file at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the config file.
    ///
    /// A missing file is an error, not an empty record.
    pub async fn load(&self) -> Result<Record, PanelError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.unreadable(e.to_string()))?;

        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(other) => Err(self.unreadable(format!(
                "expected a JSON object at the top level, found {}",
                json_kind(&other)
            ))),
            Err(e) => Err(self.unreadable(e.to_string())),
        }
    }

    /// Overlay submitted form fields onto `existing`.
    ///
    /// All keys are checked against the whitelist before anything is merged.
    /// Submitted values are stored as JSON strings, exactly as received.
    /// `existing` is left untouched; the merged copy is returned.
    pub fn apply_updates(
        existing: &Record,
        submitted: &[(String, String)],
    ) -> Result<Record, PanelError> {
        if let Some((name, _)) = submitted
            .iter()
            .find(|(name, _)| Field::from_name(name).is_none())
        {
            return Err(PanelError::UnknownField(name.clone()));
        }

        let mut merged = existing.clone();
        for (name, value) in submitted {
            merged.insert(name.clone(), Value::String(value.clone()));
        }
        Ok(merged)
    }

    /// Replace the config file with `record`.
    pub async fn save(&self, record: &Record) -> Result<(), PanelError> {
        let mut body =
            serde_json::to_vec_pretty(record).map_err(|e| self.write_failed(e.to_string()))?;
        body.push(b'\n');

        let target = self.resolved_path().await;
        let tmp = temp_path(&target);
        if let Err(e) = write_and_replace(&target, &tmp, &body).await {
            // Best effort: the temp file may never have been created.
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.write_failed(e.to_string()));
        }

        tracing::debug!(path = %self.path.display(), bytes = body.len(), "config saved");
        Ok(())
    }

    /// The file a save should replace: the symlink target when the configured
    /// path is a link, the configured path otherwise (including when it does
    /// not exist yet).
    async fn resolved_path(&self) -> PathBuf {
        tokio::fs::canonicalize(&self.path)
            .await
            .unwrap_or_else(|_| self.path.clone())
    }

    fn unreadable(&self, reason: String) -> PanelError {
        PanelError::ConfigUnreadable {
            path: self.path.clone(),
            reason,
        }
    }

    fn write_failed(&self, reason: String) -> PanelError {
        PanelError::ConfigWriteFailed {
            path: self.path.clone(),
            reason,
        }
    }
}

async fn write_and_replace(target: &Path, tmp: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(body).await?;
    file.sync_all().await?;
    drop(file);

    // Keep mode and ownership of the file being replaced (the daemon may run
    // as another user).
    if let Ok(meta) = tokio::fs::metadata(target).await {
        tokio::fs::set_permissions(tmp, meta.permissions()).await?;
        copy_owner(&meta, tmp);
    }

    tokio::fs::rename(tmp, target).await
}

/// Give `tmp` the owner and group in `meta`. Only root may hand a file to
/// another user, so failure is logged rather than returned.
fn copy_owner(meta: &std::fs::Metadata, tmp: &Path) {
    use std::os::unix::fs::MetadataExt;

    let current = match std::fs::metadata(tmp) {
        Ok(current) => current,
        Err(_) => return,
    };
    if current.uid() == meta.uid() && current.gid() == meta.gid() {
        return;
    }
    if let Err(e) = std::os::unix::fs::chown(tmp, Some(meta.uid()), Some(meta.gid())) {
        tracing::warn!(
            error = %e,
            uid = meta.uid(),
            gid = meta.gid(),
            "could not keep config file ownership"
        );
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".into());
    target.with_file_name(format!(".{name}.tmp-{}", std::process::id()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! On-disk tool catalog for boxedin — spec.md §4.1.
//!
//! Disk layout:
//!
//! ```text
//! <sandboxDir>/tools/<id>/
//!     manifest.json
//!     <source files...>
//!     requirements.txt | package.json   (optional, language-dependent)
//!     .site/                            (optional, installed python packages)
//! ```
//!
//! `ToolStore` owns nothing in memory beyond its root path — every
//! operation reads or writes the catalog directly, matching the
//! teacher's `FsStore` (filesystem-backed, true persistence across
//! restarts).

use boxedin_core::tool::{ManifestError, ToolManifest};
use boxedin_core::util::safe_join;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from catalog operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ToolStoreError {
    /// The manifest failed validation.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    /// A write targeted a path outside the tool's own directory.
    #[error("unsafe path: {0}")]
    UnsafePath(String),
    /// An underlying I/O operation failed.
    #[error("tool store I/O error: {0}")]
    Io(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for ToolStoreError {
    fn from(e: std::io::Error) -> Self {
        ToolStoreError::Io(e.to_string())
    }
}

/// A validated manifest plus the absolute directory it lives in.
#[derive(Debug, Clone)]
pub struct ToolRecord {
    /// The manifest.
    pub manifest: ToolManifest,
    /// Absolute path to `<sandboxDir>/tools/<id>/`.
    pub dir: PathBuf,
}

/// The on-disk tool catalog rooted at `<sandboxDir>/tools/`.
pub struct ToolStore {
    tools_dir: PathBuf,
}

impl ToolStore {
    /// Create a store rooted at `<sandbox_dir>/tools`. The directory is
    /// created lazily on first write.
    pub fn new(sandbox_dir: impl AsRef<Path>) -> Self {
        Self {
            tools_dir: sandbox_dir.as_ref().join("tools"),
        }
    }

    /// Absolute directory for a given tool id, whether or not it
    /// exists yet.
    pub fn tool_dir(&self, id: &str) -> PathBuf {
        self.tools_dir.join(id)
    }

    /// Validate and persist `manifest.json` for a tool, creating the
    /// tool's directory if needed. Returns the resulting [`ToolRecord`].
    pub async fn save(&self, manifest: ToolManifest) -> Result<ToolRecord, ToolStoreError> {
        manifest.validate()?;
        let dir = self.tool_dir(&manifest.id);
        tokio::fs::create_dir_all(&dir).await?;
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| ToolStoreError::Io(e.to_string()))?;
        tokio::fs::write(dir.join("manifest.json"), json).await?;
        tracing::info!(tool_id = %manifest.id, "tool manifest saved");
        Ok(ToolRecord { manifest, dir })
    }

    /// Write source files into a tool's directory. Paths are confined
    /// to the tool directory — any `..` segment or absolute path is
    /// rejected (spec.md §4.1, `WriteCode`). Existing files are
    /// overwritten, which is how the AutoFix model-patch step applies
    /// its changes.
    pub async fn write_code(
        &self,
        tool_id: &str,
        files: &BTreeMap<String, String>,
    ) -> Result<(), ToolStoreError> {
        let dir = self.tool_dir(tool_id);
        tokio::fs::create_dir_all(&dir).await?;
        for (rel_path, content) in files {
            let path = safe_join(&dir, rel_path).map_err(ToolStoreError::UnsafePath)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, content).await?;
        }
        Ok(())
    }

    /// Enumerate every valid tool on disk. Entries beginning with `.`
    /// are skipped; a manifest that fails to parse or validate is
    /// silently omitted rather than failing the whole load (spec.md
    /// §4.1, Failure modes).
    pub async fn load(&self) -> Result<BTreeMap<String, ToolRecord>, ToolStoreError> {
        let mut out = BTreeMap::new();
        let mut entries = match tokio::fs::read_dir(&self.tools_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let manifest_path = dir.join("manifest.json");
            let raw = match tokio::fs::read_to_string(&manifest_path).await {
                Ok(raw) => raw,
                Err(_) => {
                    tracing::warn!(tool = %name, "skipping tool with no manifest.json");
                    continue;
                }
            };
            let manifest: ToolManifest = match serde_json::from_str(&raw) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(tool = %name, error = %e, "skipping tool with malformed manifest");
                    continue;
                }
            };
            if let Err(e) = manifest.validate() {
                tracing::warn!(tool = %name, error = %e, "skipping tool that fails validation");
                continue;
            }
            out.insert(manifest.id.clone(), ToolRecord { manifest, dir });
        }
        Ok(out)
    }

    /// Deterministic human-readable listing used in prompts — sorted
    /// by id (spec.md §4.1, `ToPrompt`).
    pub fn to_prompt(tools: &BTreeMap<String, ToolRecord>) -> String {
        if tools.is_empty() {
            return "(no tools available)".to_string();
        }
        let mut out = String::new();
        for record in tools.values() {
            let m = &record.manifest;
            out.push_str(&format!(
                "- {} ({:?}): {} [entry: {}]\n",
                m.id, m.language, m.purpose, m.entry
            ));
        }
        out
    }
}

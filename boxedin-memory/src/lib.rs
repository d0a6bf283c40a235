//! Durable JSON memory for boxedin — spec.md §4.2.
//!
//! Grounded on the teacher's `FsStore` (filesystem-backed state,
//! true persistence across process restarts), narrowed to the single
//! `<dataDir>/memory/memory.json` file spec.md §3/§6 describe, and
//! hardened with write-new-then-rename persistence and a coarse
//! in-process lock (spec.md §9, Cross-goal concurrency).

use boxedin_core::memory::MemoryState;
use boxedin_core::{HistoryEntry, PersistenceError, Role, RunRecord};
use boxedin_tools::ToolStore;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Durable, process-wide agent state, backed by one JSON file.
///
/// `tools` is always refreshed from the on-disk catalog on
/// [`Memory::load`] — the catalog, not the memory file, is the
/// authoritative source for tool manifests (spec.md §3, "Memory").
pub struct Memory {
    path: PathBuf,
    tool_store: ToolStore,
    state: Mutex<MemoryState>,
    tmp_counter: AtomicU64,
}

impl Memory {
    /// Load memory from `<dataDir>/memory/memory.json`, merging with
    /// defaults if the file is absent, then override `tools` from the
    /// on-disk catalog rooted at `sandboxDir`.
    pub async fn load(
        data_dir: impl AsRef<Path>,
        sandbox_dir: impl AsRef<Path>,
    ) -> Result<Self, PersistenceError> {
        let memory_dir = data_dir.as_ref().join("memory");
        tokio::fs::create_dir_all(&memory_dir).await?;
        let path = memory_dir.join("memory.json");

        let mut state = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str::<MemoryState>(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryState::default(),
            Err(e) => return Err(e.into()),
        };

        let tool_store = ToolStore::new(sandbox_dir.as_ref());
        let records = tool_store
            .load()
            .await
            .map_err(|e| PersistenceError::Io(e.to_string()))?;
        state.tools = records
            .into_iter()
            .map(|(id, record)| (id, record.manifest))
            .collect();

        let memory = Self {
            path,
            tool_store,
            state: Mutex::new(state),
            tmp_counter: AtomicU64::new(0),
        };
        if !memory.path.exists() {
            memory.save().await?;
        }
        Ok(memory)
    }

    /// The tool catalog this memory's tools were loaded from.
    pub fn tool_store(&self) -> &ToolStore {
        &self.tool_store
    }

    /// Append a history entry.
    pub async fn add_history(&self, role: Role, content: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.add_history(role, content);
    }

    /// Append a completed run record.
    pub async fn add_run(&self, record: RunRecord) {
        let mut state = self.state.lock().await;
        state.runs.push(record);
    }

    /// Re-read the tool catalog from disk and replace `tools` in the
    /// in-memory state, without touching history/runs.
    pub async fn refresh_tools(&self) -> Result<(), PersistenceError> {
        let records = self
            .tool_store
            .load()
            .await
            .map_err(|e| PersistenceError::Io(e.to_string()))?;
        let mut state = self.state.lock().await;
        state.tools = records
            .into_iter()
            .map(|(id, record)| (id, record.manifest))
            .collect();
        Ok(())
    }

    /// Non-mutating summary of the last `max` history entries (see
    /// [`MemoryState::summarize_history`]).
    pub async fn summarize_history(&self, max: usize) -> Vec<HistoryEntry> {
        let state = self.state.lock().await;
        state.summarize_history(max)
    }

    /// A read-only snapshot of the current state, for status queries
    /// and prompt assembly.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    /// Persist manifest-level tool summaries, history, and runs to
    /// disk. Writes to a uniquely-named temp file in the same
    /// directory, then renames over the target — rename is atomic on
    /// POSIX filesystems, so a reader never observes a partial write
    /// (spec.md §9, "write-new-then-rename semantics are REQUIRED").
    pub async fn save(&self) -> Result<(), PersistenceError> {
        let state = self.state.lock().await;
        let json = serde_json::to_string_pretty(&*state)?;
        drop(state);

        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp_path = self
            .path
            .with_extension(format!("json.tmp-{}-{counter}", std::process::id()));
        let mut tmp_file = tokio::fs::File::create(&tmp_path).await?;
        tmp_file.write_all(json.as_bytes()).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);
        tokio::fs::rename(&tmp_path, &self.path).await?;
        tracing::debug!(path = %self.path.display(), "memory saved");
        Ok(())
    }
}

//! MaterializeTools.
//!
//! Writes every planner-proposed [`ToolSpec`] to disk and folds it into
//! the in-process catalog used by the rest of this goal's run chain. A
//! per-spec failure is recorded as an assistant history line and never
//! aborts the remaining specs.

use boxedin_core::plan::ToolSpec;
use boxedin_core::tool::ToolManifest;
use boxedin_core::{util, Role};
use boxedin_memory::Memory;
use boxedin_tools::{ToolRecord, ToolStore};
use std::collections::BTreeMap;

/// Materialize every `spec` in order, writing files and a manifest for
/// each, inserting the resulting [`ToolRecord`] into `catalog`. Returns
/// the ids of tools that were successfully created.
pub async fn materialize_tools(
    tool_store: &ToolStore,
    memory: &Memory,
    catalog: &mut BTreeMap<String, ToolRecord>,
    specs: &[ToolSpec],
) -> Vec<String> {
    let mut created = Vec::with_capacity(specs.len());

    for spec in specs {
        let id = spec
            .id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", util::slug(&spec.name), util::now_ms()));
        let entry = spec
            .entry
            .clone()
            .unwrap_or_else(|| spec.language.default_entry().to_string());

        if let Err(e) = tool_store.write_code(&id, &spec.files).await {
            memory
                .add_history(
                    Role::Assistant,
                    format!("failed to write source for tool `{id}`: {e}"),
                )
                .await;
            continue;
        }

        let now = util::now_ms();
        let manifest = ToolManifest {
            id: id.clone(),
            name: spec.name.clone(),
            purpose: spec.purpose.clone(),
            language: spec.language,
            entry,
            inputs: spec.inputs.clone(),
            outputs: spec.outputs.clone(),
            usage: spec.usage.clone(),
            created_at: now,
            updated_at: now,
        };

        match tool_store.save(manifest).await {
            Ok(record) => {
                catalog.insert(id.clone(), record);
                created.push(id);
            }
            Err(e) => {
                memory
                    .add_history(
                        Role::Assistant,
                        format!("failed to create tool `{id}`: {e}"),
                    )
                    .await;
            }
        }
    }

    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxedin_core::tool::Language;
    use std::collections::BTreeMap as Map;

    fn spec(name: &str) -> ToolSpec {
        let mut files = Map::new();
        files.insert("main.py".to_string(), "print('hi')".to_string());
        ToolSpec {
            id: None,
            name: name.to_string(),
            language: Language::Python,
            entry: None,
            purpose: "test".to_string(),
            files,
            inputs: vec![],
            outputs: vec![],
            usage: String::new(),
        }
    }

    #[tokio::test]
    async fn materializes_a_tool_with_derived_id_and_default_entry() {
        let data = tempfile::tempdir().unwrap();
        let sandbox = tempfile::tempdir().unwrap();
        let memory = Memory::load(data.path(), sandbox.path()).await.unwrap();
        let tool_store = ToolStore::new(sandbox.path());
        let mut catalog = BTreeMap::new();

        let created = materialize_tools(&tool_store, &memory, &mut catalog, &[spec("Word Counter")]).await;
        assert_eq!(created.len(), 1);
        let id = &created[0];
        assert!(id.starts_with("word-counter-"));
        let record = catalog.get(id).unwrap();
        assert_eq!(record.manifest.entry, "main.py");
    }

    #[tokio::test]
    async fn explicit_id_and_entry_are_honored() {
        let data = tempfile::tempdir().unwrap();
        let sandbox = tempfile::tempdir().unwrap();
        let memory = Memory::load(data.path(), sandbox.path()).await.unwrap();
        let tool_store = ToolStore::new(sandbox.path());
        let mut catalog = BTreeMap::new();

        let mut s = spec("echo");
        s.id = Some("echo".to_string());
        s.entry = Some("run.py".to_string());
        s.files = {
            let mut files = Map::new();
            files.insert("run.py".to_string(), "print('hi')".to_string());
            files
        };

        let created = materialize_tools(&tool_store, &memory, &mut catalog, &[s]).await;
        assert_eq!(created, vec!["echo".to_string()]);
        assert_eq!(catalog["echo"].manifest.entry, "run.py");
    }

    #[tokio::test]
    async fn a_failing_spec_does_not_stop_the_remaining_ones() {
        let data = tempfile::tempdir().unwrap();
        let sandbox = tempfile::tempdir().unwrap();
        let memory = Memory::load(data.path(), sandbox.path()).await.unwrap();
        let tool_store = ToolStore::new(sandbox.path());
        let mut catalog = BTreeMap::new();

        let mut bad = spec("bad");
        bad.id = Some("bad".to_string());
        bad.files = {
            let mut files = Map::new();
            files.insert("../escape.py".to_string(), "evil".to_string());
            files
        };
        let good = spec("good");

        let created = materialize_tools(&tool_store, &memory, &mut catalog, &[bad, good]).await;
        assert_eq!(created.len(), 1);
        assert!(!catalog.contains_key("bad"));

        let snapshot = memory.snapshot().await;
        assert!(snapshot
            .history
            .iter()
            .any(|h| h.content.contains("failed to write source for tool `bad`")));
    }
}

//! The Tool manifest — a named, sandboxed executable unit.

use serde::{Deserialize, Serialize};

/// Languages a tool's entry file may be written in.
///
/// The language determines the default interpreter the sandbox invokes
/// (`python` for `python3 <entry>`, `node` for `node <entry>`) and the
/// dependency manifest the sandbox looks for (`requirements.txt` vs
/// `package.json`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python 3.
    Python,
    /// Node.js.
    Node,
}

impl Language {
    /// The interpreter binary name for the local sandbox backend.
    pub fn interpreter(&self) -> &'static str {
        match self {
            Language::Python => "python3",
            Language::Node => "node",
        }
    }

    /// The interpreter binary name inside the container backend.
    pub fn container_interpreter(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Node => "node",
        }
    }

    /// The base container image for this language.
    pub fn image(&self) -> &'static str {
        match self {
            Language::Python => "python:3.11-alpine",
            Language::Node => "node:20-alpine",
        }
    }

    /// The default entry filename for a newly created tool of this
    /// language. See `SPEC_FULL.md` §9 — the source's single
    /// `index.mjs` default for every language is not reproduced here.
    pub fn default_entry(&self) -> &'static str {
        match self {
            Language::Python => "main.py",
            Language::Node => "index.js",
        }
    }

    /// Filename of this language's dependency manifest, if any.
    pub fn dependency_manifest(&self) -> &'static str {
        match self {
            Language::Python => "requirements.txt",
            Language::Node => "package.json",
        }
    }
}

/// One named input or output a tool declares in its manifest.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// The parameter's name.
    pub name: String,
    /// A free-form type label (e.g. "string", "number", "file").
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether this input is required. Only meaningful for `inputs`;
    /// always `None` on `outputs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl Param {
    /// Create a parameter description.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            required: None,
        }
    }
}

/// The manifest persisted at `<sandboxDir>/tools/<id>/manifest.json`.
///
/// `ToolManifest` is the on-disk, validated shape. `ToolStore::Load`
/// refuses to build one from malformed JSON — construction always goes
/// through [`ToolManifest::validate`].
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolManifest {
    /// Stable identifier, unique within the catalog.
    pub id: String,
    /// Human-facing name.
    pub name: String,
    /// What the tool is for.
    pub purpose: String,
    /// Implementation language.
    pub language: Language,
    /// Path to the entry file, relative to the tool directory.
    pub entry: String,
    /// Declared inputs.
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Declared outputs.
    #[serde(default)]
    pub outputs: Vec<Param>,
    /// Free-form usage notes.
    #[serde(default)]
    pub usage: String,
    /// Creation time, epoch milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Last-updated time, epoch milliseconds.
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

/// Errors raised while validating a manifest before it is persisted or
/// accepted from disk.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// A required field was empty.
    #[error("manifest field `{0}` must not be empty")]
    Empty(&'static str),
    /// `entry` contained a path-traversal or absolute-path segment.
    #[error("entry path `{0}` escapes the tool directory")]
    UnsafeEntry(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ToolManifest {
    /// Validate a manifest's required fields. Called before every
    /// `ToolStore::Save` and after every `ToolStore::Load` read.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.id.trim().is_empty() {
            return Err(ManifestError::Empty("id"));
        }
        if self.name.trim().is_empty() {
            return Err(ManifestError::Empty("name"));
        }
        if self.entry.trim().is_empty() {
            return Err(ManifestError::Empty("entry"));
        }
        if crate::util::has_unsafe_path_segment(&self.entry) {
            return Err(ManifestError::UnsafeEntry(self.entry.clone()));
        }
        Ok(())
    }
}

/// The subset of [`ToolManifest`] kept in [`crate::memory::Memory`] —
/// manifest fields only, never absolute filesystem paths.
pub type ToolSummary = ToolManifest;

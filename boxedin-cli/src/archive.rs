//! `boxedin export`/`import`, spec.md §6: a tar.gz of `<dataDir>` and
//! `<sandboxDir>`, archived under their own basenames so re-importing
//! doesn't care what the target paths were named at export time.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};
use std::path::Path;

fn dir_name(path: &Path) -> io::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))
}

/// Write a tar.gz of `data_dir` and `sandbox_dir` to `writer`, each
/// archived under its own basename.
pub fn export(data_dir: &Path, sandbox_dir: &Path, writer: impl Write) -> io::Result<()> {
    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    if data_dir.is_dir() {
        builder.append_dir_all(dir_name(data_dir)?, data_dir)?;
    }
    if sandbox_dir.is_dir() {
        builder.append_dir_all(dir_name(sandbox_dir)?, sandbox_dir)?;
    }
    builder.into_inner()?.finish()?;
    Ok(())
}

/// Extract an archive written by [`export`] into a scratch directory,
/// then replace `data_dir`/`sandbox_dir` with the matching top-level
/// entries (`<dataDir basename>`, `<sandboxDir basename>`).
pub fn import(archive_path: &Path, data_dir: &Path, sandbox_dir: &Path) -> io::Result<()> {
    let file = std::fs::File::open(archive_path)?;
    let decoder = GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);

    let scratch = tempfile::tempdir()?;
    archive.unpack(scratch.path())?;

    for (basename_of, target) in [(data_dir, data_dir), (sandbox_dir, sandbox_dir)] {
        let extracted = scratch.path().join(dir_name(basename_of)?);
        if !extracted.is_dir() {
            continue;
        }
        if target.exists() {
            std::fs::remove_dir_all(target)?;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        copy_dir_recursive(&extracted, target)?;
    }
    Ok(())
}

fn copy_dir_recursive(from: &Path, to: &Path) -> io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

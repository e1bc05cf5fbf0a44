//! The favorites document: a pretty-printed JSON array of movie records.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use moviedeck_common::{Movie, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

const INDENT: &[u8] = b"    ";

// Distinct temp files, so a blocking write never shares one with a writer
// task still running on the blocking pool.
const ASYNC_SUFFIX: &str = ".tmp";
const BLOCKING_SUFFIX: &str = ".sync.tmp";

/// Read and decode the document at `path`.
///
/// `Ok(None)` when the file does not exist yet.
pub async fn read_document(path: &Path) -> Result<Option<Vec<Movie>>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let movies: Vec<Movie> = serde_json::from_slice(&bytes)?;
    Ok(Some(movies))
}

/// Encode `movies` and replace the document at `path` with them.
///
/// The bytes go to a sibling temp file that is then renamed over `path`, so a
/// reader never sees a partially written document.
pub async fn write_document(path: &Path, movies: &[Movie]) -> Result<()> {
    let bytes = encode(movies)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path, ASYNC_SUFFIX);
    tokio::fs::write(&tmp, &bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Blocking counterpart of [`write_document`], for callers that cannot
/// await (a store dropped on a current-thread runtime).
pub fn write_document_blocking(path: &Path, movies: &[Movie]) -> Result<()> {
    let bytes = encode(movies)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path, BLOCKING_SUFFIX);
    std::fs::write(&tmp, &bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn encode(movies: &[Movie]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(INDENT));
    movies.serialize(&mut serializer)?;
    Ok(bytes)
}

fn temp_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "favorites.json".into());
    name.push(suffix);
    path.with_file_name(name)
}

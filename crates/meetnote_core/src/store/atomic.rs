//! Crash-safe file commit primitives.
//!
//! Every write goes to `<file>.tmp` in the same directory, is flushed and
//! fsynced, then renamed over the destination. Same-directory renames are
//! atomic on POSIX filesystems, so readers see either the old or the new
//! content.

use super::{StoreError, StoreResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = ".tmp";

/// Sibling path with `suffix` appended to the full file name.
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Temp path used while committing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, TEMP_SUFFIX)
}

/// Writes `bytes` to the temp sibling of `path` and fsyncs it.
///
/// The canonical path is not touched. On failure the temp file is removed.
pub fn write_temp(path: &Path, bytes: &[u8]) -> StoreResult<PathBuf> {
    let tmp = temp_path(path);
    let result = (|| -> StoreResult<()> {
        let mut file = File::create(&tmp).map_err(StoreError::io("create", &tmp))?;
        file.write_all(bytes).map_err(StoreError::io("write", &tmp))?;
        file.flush().map_err(StoreError::io("flush", &tmp))?;
        file.sync_all().map_err(StoreError::io("fsync", &tmp))?;
        Ok(())
    })();

    if let Err(err) = result {
        discard_temp(&tmp);
        return Err(err);
    }
    Ok(tmp)
}

/// Renames a fully written temp file over `path`.
pub fn commit_temp(tmp: &Path, path: &Path) -> StoreResult<()> {
    if let Err(source) = fs::rename(tmp, path) {
        discard_temp(tmp);
        return Err(StoreError::Io {
            op: "rename",
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Full commit: temp write, fsync, atomic rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let tmp = write_temp(path, bytes)?;
    commit_temp(&tmp, path)
}

/// Serializes `value` as pretty JSON and commits it atomically.
pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &bytes)
}

/// Reads and parses a JSON document.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.to_path_buf()))
        }
        Err(err) => return Err(StoreError::io("read", path)(err)),
    };
    serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively copies a directory tree.
pub fn copy_dir_all(from: &Path, to: &Path) -> StoreResult<()> {
    fs::create_dir_all(to).map_err(StoreError::io("create directory", to))?;
    let entries = fs::read_dir(from).map_err(StoreError::io("read directory", from))?;
    for entry in entries {
        let entry = entry.map_err(StoreError::io("read directory", from))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(StoreError::io("stat", &source))?;
        if file_type.is_dir() {
            copy_dir_all(&source, &target)?;
        } else {
            fs::copy(&source, &target).map_err(StoreError::io("copy", &source))?;
        }
    }
    Ok(())
}

/// Removes a directory tree; a missing directory is not an error.
pub fn remove_dir_if_exists(path: &Path) -> StoreResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(StoreError::io("remove directory", path)(err)),
    }
}

/// Removes a file; a missing file is not an error.
pub fn remove_file_if_exists(path: &Path) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(StoreError::io("remove", path)(err)),
    }
}

fn discard_temp(tmp: &Path) {
    // The temp path may be occupied by something we did not create (e.g. a
    // directory); only regular files are removed.
    if tmp.is_file() {
        if let Err(err) = fs::remove_file(tmp) {
            log::warn!(
                "event=temp_cleanup module=store status=error path={} error={}",
                tmp.display(),
                err
            );
        }
    }
}

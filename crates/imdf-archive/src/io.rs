// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Filesystem helpers

use imdf_model::{ImdfError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Write `contents` next to `path`, flush it to disk, then rename over it
///
/// A failed write leaves the previous file untouched.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    if let Err(e) = write_synced(&tmp, contents) {
        log::error!("Failed to write {}: {}", tmp.display(), e);
        let _ = fs::remove_file(&tmp);
        return Err(ImdfError::io(tmp, e));
    }
    fs::rename(&tmp, path).map_err(|e| {
        log::error!("Failed to replace {}: {}", path.display(), e);
        let _ = fs::remove_file(&tmp);
        ImdfError::io(path, e)
    })
}

/// Read a file to a string, tagging errors with the path
pub(crate) fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ImdfError::io(path, e))
}

// src/pipeline/archive.rs

//! Rotation of superseded files into dated archive folders.

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{AppError, Result};

/// Name of the archive folder for a calendar day.
pub fn archive_folder_name(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

/// Move `file_path` into `archive_root/<YYYYMMDD>/<file name>`.
///
/// Returns the archived path, or `None` when there was nothing to archive.
/// Either the file ends up in the archive and is gone from `file_path`, or
/// it is left untouched and an error is returned. A file archived under the
/// same name earlier the same day is overwritten.
pub async fn archive_if_present(
    file_path: &Path,
    archive_root: &Path,
    today: NaiveDate,
) -> Result<Option<PathBuf>> {
    if !tokio::fs::try_exists(file_path)
        .await
        .map_err(|e| AppError::archive(file_path, e))?
    {
        return Ok(None);
    }

    let file_name = file_path.file_name().ok_or_else(|| {
        AppError::archive(
            file_path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    let folder = archive_root.join(archive_folder_name(today));
    // create_dir_all tolerates a folder that already exists or appears concurrently.
    tokio::fs::create_dir_all(&folder)
        .await
        .map_err(|e| AppError::archive(&folder, e))?;

    let dest = folder.join(file_name);
    move_file(file_path, &dest)
        .await
        .map_err(|e| AppError::archive(file_path, e))?;

    log::info!(
        "Archived {} to {}",
        file_path.display(),
        folder.display()
    );
    Ok(Some(dest))
}

/// Rename, falling back to [`copy_into_place`] when the rename is refused
/// (for example across filesystems).
async fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    let rename_err = match tokio::fs::rename(src, dest).await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    log::debug!(
        "Rename {} -> {} failed ({}), copying instead",
        src.display(),
        dest.display(),
        rename_err
    );
    copy_into_place(src, dest).await
}

/// Copy `src` to `<dest>.tmp`, rename that over `dest`, then remove `src`.
///
/// On any failure `src` is left in place and no copy remains next to `dest`.
async fn copy_into_place(src: &Path, dest: &Path) -> io::Result<()> {
    let mut tmp_name = dest.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    if let Err(e) = tokio::fs::copy(src, &tmp).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    // rename replaces an earlier same-day archive in one step.
    if let Err(e) = tokio::fs::rename(&tmp, dest).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::remove_file(src).await {
        // Source must stay authoritative: undo the archived copy.
        let _ = tokio::fs::remove_file(dest).await;
        return Err(e);
    }
    Ok(())
}

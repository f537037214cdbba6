//! Database file transfer and installation.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::{DATABASE_EDITION, MAX_DATABASE_DOWNLOAD_SIZE};
use crate::error_handling::DownloadError;

use super::extract::{extract_mmdb_from_tar_gz, is_gzip};

/// Downloads the database from `url` and installs it at `dest`.
///
/// The body is streamed into a temporary file next to `dest`, unpacked if it
/// is the gzip archive, then renamed over the old file. The temporary file is
/// removed on every failure path.
pub(crate) async fn download_database(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), DownloadError> {
    let dest_dir = destination_dir(dest);
    let mut tmp = NamedTempFile::new_in(&dest_dir)
        .map_err(|_| DownloadError::DirectoryNotWritable(dest_dir.clone()))?;

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(DownloadError::Transfer)?;
    if !response.status().is_success() {
        return Err(DownloadError::TransferStatus(response.status().as_u16()));
    }

    if let Some(content_length) = response.content_length() {
        if content_length > MAX_DATABASE_DOWNLOAD_SIZE {
            return Err(DownloadError::TooLarge {
                size: content_length,
                max: MAX_DATABASE_DOWNLOAD_SIZE,
            });
        }
    }

    // Content-Length may be missing or wrong, so count what actually arrives
    let mut received: u64 = 0;
    while let Some(chunk) = response.chunk().await.map_err(DownloadError::Transfer)? {
        received += chunk.len() as u64;
        if received > MAX_DATABASE_DOWNLOAD_SIZE {
            return Err(DownloadError::TooLarge {
                size: received,
                max: MAX_DATABASE_DOWNLOAD_SIZE,
            });
        }
        tmp.write_all(&chunk)?;
    }
    tmp.flush()?;
    log::info!("Downloaded location database ({} bytes)", received);

    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || install(tmp, &dest_dir, &dest))
        .await
        .map_err(|e| DownloadError::Save(std::io::Error::other(e)))?
}

fn destination_dir(dest: &Path) -> PathBuf {
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Unpacks the download if needed and moves it into place.
fn install(mut downloaded: NamedTempFile, dest_dir: &Path, dest: &Path) -> Result<(), DownloadError> {
    let mut magic = [0u8; 2];
    downloaded.seek(SeekFrom::Start(0))?;
    let read = read_prefix(downloaded.as_file_mut(), &mut magic)?;

    let database = if is_gzip(&magic[..read]) {
        let mut extracted = NamedTempFile::new_in(dest_dir)
            .map_err(|_| DownloadError::DirectoryNotWritable(dest_dir.to_path_buf()))?;
        let archive = downloaded.reopen()?;
        extract_mmdb_from_tar_gz(archive, DATABASE_EDITION, &mut extracted)
            .map_err(|e| DownloadError::Extract(format!("{:#}", e)))?;
        extracted.flush()?;
        extracted
    } else {
        downloaded
    };

    if dest.exists() {
        std::fs::remove_file(dest)?;
    }
    database.persist(dest).map_err(|e| DownloadError::Save(e.error))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(
            dest,
            std::fs::Permissions::from_mode(crate::config::DATABASE_FILE_MODE),
        )?;
    }

    // Readable check
    File::open(dest)?;
    log::info!("Installed location database at {}", dest.display());
    Ok(())
}

fn read_prefix(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

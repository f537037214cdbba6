//! Archive extraction utilities.
//!
//! MaxMind serves editions as tar.gz archives with the `.mmdb` file nested in
//! a dated directory. Downloads that arrive gzip-compressed are unpacked here.

use std::io::{Read, Write};

use anyhow::{Context, Result};

/// Gzip magic number
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns whether the leading bytes look like a gzip stream.
pub(crate) fn is_gzip(header: &[u8]) -> bool {
    header.len() >= 2 && header[..2] == GZIP_MAGIC
}

/// Copies the `<edition>.mmdb` member of a tar.gz archive into `out`.
///
/// Matches on the file name only, so nested and dated directories are
/// accepted and path components never leave the archive.
///
/// Returns the number of bytes written.
pub(crate) fn extract_mmdb_from_tar_gz<R: Read, W: Write>(
    archive: R,
    edition: &str,
    out: &mut W,
) -> Result<u64> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    log::debug!("Extracting {}.mmdb from tar.gz archive", edition);

    let mut tar_archive = Archive::new(GzDecoder::new(archive));
    let expected_name = format!("{}.mmdb", edition);

    let entries = tar_archive
        .entries()
        .with_context(|| "Failed to read tar archive entries")?;

    for entry_result in entries {
        let mut entry = entry_result.with_context(|| "Failed to read tar entry")?;
        let path = entry.path().with_context(|| "Failed to get entry path")?;

        let is_database = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == expected_name);
        if !is_database {
            continue;
        }

        let written = std::io::copy(&mut entry, out)
            .with_context(|| format!("Failed to read {} from archive", expected_name))?;
        log::info!("Extracted {} from tar.gz ({} bytes)", expected_name, written);
        return Ok(written);
    }

    Err(anyhow::anyhow!("{} not found in tar.gz archive", expected_name))
}

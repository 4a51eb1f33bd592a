//! Distribution extraction for zip and tar.gz archives

use std::fs;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;
use zip::ZipArchive;

use crate::error::BoxError;

/// Extract a zip archive into `dest`, keeping the archive's own layout.
///
/// Entries whose names escape `dest` are rejected.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<(), BoxError> {
    let file = fs::File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    fs::create_dir_all(dest)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| format!("unsafe entry name in zip archive: {}", entry.name()))?;
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = fs::File::create(&outpath)?;
        std::io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

/// Extract a gzip-compressed tarball into `dest`
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<(), BoxError> {
    let file = fs::File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);

    fs::create_dir_all(dest)?;
    archive.unpack(dest)?;
    Ok(())
}

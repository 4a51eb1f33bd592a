//! Bundle creation from an ordered list of paths
//!
//! Entries are given relative to a `root` directory and are stored under
//! exactly that relative name, so the output never depends on the process's
//! working directory.

use std::fs;
use std::io::{Seek, Write};
use std::path::{Component, Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::BoxError;

/// Write a zip archive at `output` containing `entries` (relative to `root`).
/// Directories are added recursively; symlinks are stored as links and never
/// followed, matching [`create_tar_gz`].
pub fn create_zip(root: &Path, entries: &[PathBuf], output: &Path) -> Result<(), BoxError> {
    let file = fs::File::create(output)?;
    let mut zip = ZipWriter::new(file);

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        add_path_to_zip(&mut zip, &root.join(entry), root, options)?;
    }

    zip.finish()?;
    Ok(())
}

fn add_path_to_zip<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &Path,
    root: &Path,
    options: SimpleFileOptions,
) -> Result<(), BoxError> {
    let file_type = fs::symlink_metadata(path)?.file_type();
    if file_type.is_symlink() {
        let target = fs::read_link(path)?;
        zip.add_symlink(
            entry_name(path.strip_prefix(root)?),
            target.to_string_lossy().into_owned(),
            options,
        )?;
        Ok(())
    } else if file_type.is_dir() {
        add_directory_to_zip(zip, path, root, options)
    } else {
        add_file_to_zip(zip, path, root, options)
    }
}

fn add_directory_to_zip<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    dir: &Path,
    root: &Path,
    options: SimpleFileOptions,
) -> Result<(), BoxError> {
    zip.add_directory(format!("{}/", entry_name(dir.strip_prefix(root)?)), options)?;

    // read_dir order is unspecified; sort for reproducible archives
    let mut children = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    children.sort();

    for child in children {
        add_path_to_zip(zip, &child, root, options)?;
    }
    Ok(())
}

fn add_file_to_zip<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &Path,
    root: &Path,
    options: SimpleFileOptions,
) -> Result<(), BoxError> {
    let mut file = fs::File::open(path)?;

    #[cfg(unix)]
    let options = {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(file.metadata()?.permissions().mode())
    };

    zip.start_file(entry_name(path.strip_prefix(root)?), options)?;
    std::io::copy(&mut file, zip)?;
    Ok(())
}

/// Write a gzip-compressed tarball of `entries` (relative to `root`) into
/// `writer`, returning the writer once the gzip stream is finished.
pub fn create_tar_gz<W: Write>(
    root: &Path,
    entries: &[PathBuf],
    writer: W,
) -> Result<W, BoxError> {
    let mut builder = tar::Builder::new(GzEncoder::new(writer, Compression::default()));
    builder.follow_symlinks(false);

    for entry in entries {
        let path = root.join(entry);
        let name = entry_name(entry);
        if fs::symlink_metadata(&path)?.is_dir() {
            builder.append_dir_all(&name, &path)?;
        } else {
            builder.append_path_with_name(&path, &name)?;
        }
    }

    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}

/// Archive entry name: relative path joined with `/` on every platform
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

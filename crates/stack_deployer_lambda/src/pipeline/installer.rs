use std::fs::{self, File, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tracing::{info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::errors::PipelineError;

pub const DIRECTORY_MODE: u32 = 0o700;
pub const FILE_MODE: u32 = 0o600;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSummary {
    pub directories: usize,
    pub files: usize,
}

/// Extracts every entry of a zip archive under `destination`. Modes stored in
/// the archive are ignored. Entries that would land outside `destination`
/// fail the whole install.
pub fn install(archive_path: &Path, destination: &Path) -> Result<usize, PipelineError> {
    info!(
        archive = %archive_path.display(),
        destination = %destination.display(),
        "unzipping build archive"
    );

    let file = File::open(archive_path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|error| extraction_error(archive_path, error))?;
    fs::create_dir_all(destination)?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|error| extraction_error(archive_path, error))?;
        let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
            PipelineError::Extraction(format!(
                "entry '{}' of {} escapes {}",
                entry.name(),
                archive_path.display(),
                destination.display()
            ))
        })?;
        let target = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut output = File::create(&target)?;
        io::copy(&mut entry, &mut output)?;
    }

    Ok(archive.len())
}

/// Recursively gives every directory under `target` owner rwx and every
/// regular file owner rw. Symlinks are left alone. A missing target is
/// skipped.
pub fn normalize_permissions(target: &Path) -> Result<PermissionSummary, PipelineError> {
    let mut summary = PermissionSummary::default();
    let metadata = match fs::symlink_metadata(target) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            warn!(target = %target.display(), "permission target missing, skipping");
            return Ok(summary);
        }
        Err(error) => return Err(error.into()),
    };

    if metadata.is_dir() {
        normalize_directory(target, &mut summary)?;
    } else if metadata.is_file() {
        set_mode(target, FILE_MODE)?;
        summary.files += 1;
    }

    info!(
        target = %target.display(),
        directories = summary.directories,
        files = summary.files,
        "normalized permissions"
    );
    Ok(summary)
}

fn normalize_directory(dir: &Path, summary: &mut PermissionSummary) -> Result<(), PipelineError> {
    // Set first so the directory stays traversable.
    set_mode(dir, DIRECTORY_MODE)?;
    summary.directories += 1;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            normalize_directory(&path, summary)?;
        } else if file_type.is_file() {
            set_mode(&path, FILE_MODE)?;
            summary.files += 1;
        }
    }

    Ok(())
}

fn set_mode(path: &Path, mode: u32) -> Result<(), PipelineError> {
    fs::set_permissions(path, Permissions::from_mode(mode)).map_err(|source| {
        PipelineError::Permission {
            path: path.display().to_string(),
            source,
        }
    })
}

fn extraction_error(archive_path: &Path, error: ZipError) -> PipelineError {
    PipelineError::Extraction(format!("{}: {error}", archive_path.display()))
}

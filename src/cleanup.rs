//! Removal of generated artifacts. Missing paths are not errors, so running it twice is fine.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

fn record(report: &mut CleanupReport, path: &Path, res: io::Result<()>) {
    match res {
        Ok(()) => report.removed.push(path.to_path_buf()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), "cleanup failed: {e}");
            report.failed.push((path.to_path_buf(), e.to_string()));
        }
    }
}

/// Delete the manifest, the credentials file and every profile directory.
pub fn remove_artifacts(manifest: &Path, env_file: &Path, profile_dirs: &[PathBuf]) -> CleanupReport {
    let mut report = CleanupReport::default();
    for file in [manifest, env_file] {
        record(&mut report, file, std::fs::remove_file(file));
    }
    for dir in profile_dirs {
        record(&mut report, dir, std::fs::remove_dir_all(dir));
    }
    report
}

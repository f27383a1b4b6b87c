use crate::skip::{ScanSkip, SkipReason};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const IGNORED_DIRS: &[&str] = &["node_modules", "target"];

/// Every `.rs` file under `root`, in a stable (file-name sorted) order.
/// Hidden and build-output directories are not entered.
pub fn source_files(root: &Path, skips: &mut Vec<ScanSkip>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(e));

    for entry in walker {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "rs") {
                    files.push(path.to_path_buf());
                }
            }
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                skips.push(ScanSkip::new(path, None, SkipReason::Unreadable(err.to_string())));
            }
        }
    }

    files
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();

    name.starts_with('.') || (entry.file_type().is_dir() && IGNORED_DIRS.contains(&name.as_ref()))
}

use std::path::{Path, PathBuf};

/// Resolve a directory-like path against the current working directory.
///
/// Relative paths stay relative to the cwd; they are just made absolute once
/// so later components never re-resolve them.
pub fn normalize_dir_path(path: &str) -> String {
    let p = Path::new(path);
    if p.is_absolute() {
        return path.to_string();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(p).to_string_lossy().into_owned(),
        Err(_) => path.to_string(),
    }
}

/// Join a file name onto a directory path.
pub fn join_path(base: impl AsRef<Path>, child: &str) -> PathBuf {
    base.as_ref().join(child)
}

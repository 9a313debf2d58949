use std::path::{Path, PathBuf};

fn find_upwards(start: &Path, filename: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.exists())
}

/// Directory holding the workspace `Cargo.lock`, searched from the current
/// directory and then from this crate's manifest directory.
pub fn workspace_root() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let start = std::env::current_dir()?;
    let lock = find_upwards(&start, "Cargo.lock")
        .or_else(|| find_upwards(Path::new(env!("CARGO_MANIFEST_DIR")), "Cargo.lock"))
        .ok_or("Cargo.lock not found (run from within the repo or pass --config)")?;

    Ok(lock.parent().unwrap_or(lock.as_path()).to_path_buf())
}

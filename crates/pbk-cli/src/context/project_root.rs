use std::path::{Path, PathBuf};

use pbk_config::PROJECT_CONFIG_FILE;

/// Walk upwards from `start` until a directory holding `pbk.toml` is found.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PROJECT_CONFIG_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::find_project_root;

    #[test]
    fn finds_project_root_in_parent_directory() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::write(temp.path().join("pbk.toml"), "").expect("pbk.toml should write");
        std::fs::create_dir_all(temp.path().join("model/archive")).expect("dirs should create");

        let found = find_project_root(&temp.path().join("model/archive"));
        assert_eq!(found.as_deref(), Some(temp.path()));
    }

    #[test]
    fn directory_named_like_the_config_does_not_count() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir_all(temp.path().join("pbk.toml")).expect("dir should create");

        let found = find_project_root(temp.path());
        assert_ne!(found.as_deref(), Some(temp.path()));
    }
}

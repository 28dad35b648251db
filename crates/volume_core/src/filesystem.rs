use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use crate::error::{GcError, GcResult};

/// Names of the directories directly below `path`.
///
/// Plain files and symlinks are skipped, including symlinks to directories,
/// as are names that are not valid UTF-8. A missing `path` yields an empty list.
pub async fn list_subdirectories(path: &Path) -> GcResult<Vec<String>> {
    let mut entries = match fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Directory {} does not exist, treating it as empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(GcError::io("read_dir", path, e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| GcError::io("read_dir", path, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| GcError::io("file_type", entry.path(), e))?;
        if !file_type.is_dir() {
            let kind = if file_type.is_symlink() { "symlink" } else { "non-directory" };
            tracing::debug!("Skipping {} entry {}", kind, entry.path().display());
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::warn!("Skipping non UTF-8 entry {:?} in {}", raw, path.display()),
        }
    }

    Ok(names)
}

/// True if `path` exists and is a regular file (symlinks are followed).
pub async fn is_file(path: &Path) -> GcResult<bool> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(GcError::io("metadata", path, e)),
    }
}

/// Reads `path` as UTF-8, or `None` if it does not exist.
pub async fn read_optional(path: &Path) -> GcResult<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(GcError::io("read", path, e)),
    }
}

/// Removes `path` recursively if it exists. Returns whether anything was removed.
///
/// Symlinks are unlinked, never followed, so a `_data` link into the legacy
/// tree leaves its target in place.
pub async fn remove_tree_if_present(path: &Path) -> GcResult<bool> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Path {} does not exist, skipping removal", path.display());
            return Ok(false);
        }
        Err(e) => return Err(GcError::io("symlink_metadata", path, e)),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .await
            .map_err(|e| GcError::io("remove_dir_all", path, e))?;
    } else {
        fs::remove_file(path)
            .await
            .map_err(|e| GcError::io("remove_file", path, e))?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_subdirectories_skips_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("vol-a")).await.unwrap();
        fs::create_dir(temp_dir.path().join("vol-b")).await.unwrap();
        fs::write(temp_dir.path().join("metadata.db"), b"").await.unwrap();

        let mut names = list_subdirectories(temp_dir.path()).await.unwrap();
        names.sort();
        assert_eq!(names, vec!["vol-a".to_string(), "vol-b".to_string()]);
    }

    #[tokio::test]
    async fn test_list_subdirectories_skips_symlinked_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let outside = temp_dir.path().join("elsewhere");
        let volumes = temp_dir.path().join("volumes");
        fs::create_dir_all(&outside).await.unwrap();
        fs::create_dir_all(volumes.join("real")).await.unwrap();
        std::os::unix::fs::symlink(&outside, volumes.join("linked")).unwrap();

        let names = list_subdirectories(&volumes).await.unwrap();
        assert_eq!(names, vec!["real".to_string()]);
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let names = list_subdirectories(&temp_dir.path().join("volumes")).await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_read_optional() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.json");

        assert_eq!(read_optional(&file).await.unwrap(), None);
        fs::write(&file, "{}").await.unwrap();
        assert_eq!(read_optional(&file).await.unwrap(), Some("{}".to_string()));
        assert!(is_file(&file).await.unwrap());
        assert!(!is_file(temp_dir.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_tree_if_present() {
        let temp_dir = TempDir::new().unwrap();
        let tree = temp_dir.path().join("vol");
        fs::create_dir_all(tree.join("_data/nested")).await.unwrap();
        fs::write(tree.join("_data/nested/file.txt"), "content").await.unwrap();

        assert!(remove_tree_if_present(&tree).await.unwrap());
        assert!(!tree.exists());
        assert!(!remove_tree_if_present(&tree).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_tree_does_not_follow_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("vfs/dir/vol");
        let volume_dir = temp_dir.path().join("volumes/vol");
        fs::create_dir_all(&target).await.unwrap();
        fs::write(target.join("file.txt"), "content").await.unwrap();
        fs::create_dir_all(&volume_dir).await.unwrap();
        std::os::unix::fs::symlink(&target, volume_dir.join("_data")).unwrap();

        assert!(remove_tree_if_present(&volume_dir).await.unwrap());
        assert!(!volume_dir.exists());
        assert!(target.join("file.txt").exists());
    }
}

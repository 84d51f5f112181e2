//! Path normalization utilities.
//!
//! - `normalize_lexically` - collapse `.`/`..` without touching the filesystem
//! - `absolutize` - join a relative path onto the current directory

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` segments and redundant separators.
///
/// Purely lexical: symlinks are not resolved and the path need not exist.
/// `..` above the root is dropped, matching how URL paths behave.
///
/// # Example
/// ```ignore
/// let p = normalize_lexically(Path::new("/site/a/../css/./main.css"));
/// assert_eq!(p, PathBuf::from("/site/css/main.css"));
/// ```
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Normalize a file system path to absolute form.
///
/// Relative paths are joined onto the current directory; the result is
/// normalized lexically so it can be used as a stable cache key.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_lexically(path);
    }
    let joined =
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path));
    normalize_lexically(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_segments() {
        assert_eq!(
            normalize_lexically(Path::new("/site/a/../css/./main.css")),
            PathBuf::from("/site/css/main.css")
        );
        assert_eq!(
            normalize_lexically(Path::new("/site//css/main.css")),
            PathBuf::from("/site/css/main.css")
        );
    }

    #[test]
    fn test_normalize_parent_above_root() {
        assert_eq!(
            normalize_lexically(Path::new("/../../a.css")),
            PathBuf::from("/a.css")
        );
    }

    #[test]
    fn test_normalize_relative_keeps_leading_parent() {
        assert_eq!(
            normalize_lexically(Path::new("../a/./b.js")),
            PathBuf::from("../a/b.js")
        );
    }

    #[test]
    fn test_absolutize_relative() {
        let abs = absolutize(Path::new("relative/path/file.txt"));
        assert!(abs.is_absolute());
        assert!(abs.ends_with("relative/path/file.txt"));
    }
}

//! Path utilities for Quest Runner
//!
//! Executable identity is decided on a separator-free form of the path. The
//! normalized string is only ever compared, never turned back into a path.

use std::env;
use std::path::{Path, PathBuf};

const SEPARATORS: [char; 2] = ['/', '\\'];

/// Strip every `/` and `\` from a path so paths can be compared regardless of
/// separator style.
///
/// Case, drive letters and `.`/`..` segments are left untouched, so
/// `C:\Games\a.exe` and `c:/games/a.exe` are still different executables.
pub fn normalize_path_id(path: &str) -> String {
    path.chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

/// Whether two paths name the same executable.
pub fn same_executable(a: &str, b: &str) -> bool {
    normalize_path_id(a) == normalize_path_id(b)
}

/// A catalog executable name split for the process runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableParts {
    /// Folder part joined with `/`, if the name has one
    pub dir: Option<String>,
    /// Final segment, e.g. `Game.exe`
    pub file: String,
    /// Number of non-empty segments in the name
    pub segments: usize,
}

/// Split a catalog executable name such as `folder/Game.exe` into its folder
/// and file parts. Both separator styles are accepted.
pub fn split_executable_path(name: &str) -> ExecutableParts {
    let segments: Vec<&str> = name
        .split(|c: char| SEPARATORS.contains(&c))
        .filter(|s| !s.is_empty())
        .collect();

    match segments.split_last() {
        Some((file, dirs)) => ExecutableParts {
            dir: (!dirs.is_empty()).then(|| dirs.join("/")),
            file: file.to_string(),
            segments: segments.len(),
        },
        None => ExecutableParts {
            dir: None,
            file: String::new(),
            segments: 0,
        },
    }
}

/// Join a relative catalog path onto `base`, segment by segment, so `/` and
/// `\` in the catalog name both become native separators.
pub fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split(|c: char| SEPARATORS.contains(&c))
        .filter(|s| !s.is_empty())
        .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Directory next to the running binary; the default home of the games folder.
pub fn executable_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_both_separators() {
        assert_eq!(normalize_path_id(r"folder\sub/Game.exe"), "foldersubGame.exe");
        assert_eq!(normalize_path_id("Game.exe"), "Game.exe");
        assert_eq!(normalize_path_id(""), "");
    }

    #[test]
    fn test_separator_style_is_irrelevant() {
        let variants = [
            "folder/Game.exe",
            r"folder\Game.exe",
            "folder//Game.exe",
            r"/folder\Game.exe/",
            "folderGame.exe",
        ];
        for a in variants {
            for b in variants {
                assert!(same_executable(a, b), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_case_and_content_still_matter() {
        assert!(!same_executable("folder/Game.exe", "folder/game.exe"));
        assert!(!same_executable(r"folder\Game.exe", "Game.exe"));
    }

    #[test]
    fn test_split_executable_path() {
        let parts = split_executable_path(r"left 4 dead 2\bin/left4dead2.exe");
        assert_eq!(parts.dir.as_deref(), Some("left 4 dead 2/bin"));
        assert_eq!(parts.file, "left4dead2.exe");
        assert_eq!(parts.segments, 3);

        let parts = split_executable_path("game.exe");
        assert_eq!(parts.dir, None);
        assert_eq!(parts.file, "game.exe");
        assert_eq!(parts.segments, 1);

        assert_eq!(split_executable_path("").segments, 0);
    }

    #[test]
    fn test_join_relative() {
        let joined = join_relative(Path::new("games"), r"folder\sub/Game.exe");
        assert_eq!(
            joined,
            Path::new("games").join("folder").join("sub").join("Game.exe")
        );
    }
}

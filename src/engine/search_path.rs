// Executable search directories for portable StaxRip installs

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
#[error("cannot build PATH: {0}")]
pub struct SearchPathError(#[from] env::JoinPathsError);

/// Directories (relative to the StaxRip startup dir) holding the tools av1an shells out to
const TOOL_DIRS: &[&[&str]] = &[
    &["Apps", "Encoders", "av1an"],
    &["Apps", "Encoders", "ffmpeg"],
    &["Apps", "Encoders", "rav1e"],
    &["Apps", "FrameServer", "VapourSynth"],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn from_install_root(root: &Path) -> Self {
        let dirs = TOOL_DIRS
            .iter()
            .map(|parts| parts.iter().fold(root.to_path_buf(), |acc, p| acc.join(p)))
            .collect();

        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Prepend our directories to an existing `PATH` value
    pub fn joined_with(&self, existing: Option<&OsStr>) -> Result<OsString, SearchPathError> {
        let mut all = self.dirs.clone();
        if let Some(existing) = existing {
            all.extend(env::split_paths(existing));
        }

        Ok(env::join_paths(all)?)
    }

    /// `PATH` override for a child process, built from this process's own `PATH`
    pub fn env_override(&self) -> Result<(OsString, OsString), SearchPathError> {
        let current = env::var_os("PATH");
        let value = self.joined_with(current.as_deref())?;
        tracing::debug!(path = ?value, "prepending install-root tool directories");
        Ok((OsString::from("PATH"), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_dir_order() {
        let root = Path::new("staxrip");
        let sp = SearchPath::from_install_root(root);
        assert_eq!(
            sp.dirs(),
            &[
                root.join("Apps").join("Encoders").join("av1an"),
                root.join("Apps").join("Encoders").join("ffmpeg"),
                root.join("Apps").join("Encoders").join("rav1e"),
                root.join("Apps").join("FrameServer").join("VapourSynth"),
            ]
        );
    }

    #[test]
    fn test_joined_with_keeps_existing_entries_last() {
        let sp = SearchPath::from_install_root(Path::new("root"));
        let existing = env::join_paths([PathBuf::from("sys1"), PathBuf::from("sys2")]).unwrap();
        let joined = sp.joined_with(Some(existing.as_os_str())).unwrap();

        let parts: Vec<PathBuf> = env::split_paths(&joined).collect();
        assert_eq!(parts.len(), 6);
        assert_eq!(parts[0], Path::new("root").join("Apps").join("Encoders").join("av1an"));
        assert_eq!(parts[4], PathBuf::from("sys1"));
        assert_eq!(parts[5], PathBuf::from("sys2"));
    }

    #[test]
    fn test_joined_without_existing_path() {
        let sp = SearchPath::from_install_root(Path::new("root"));
        let joined = sp.joined_with(None).unwrap();
        assert_eq!(env::split_paths(&joined).count(), 4);
    }
}

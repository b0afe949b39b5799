use anyhow::{Context, Result};
use std::{ffi::OsStr, fs::read_dir, path::Path};
use tracing::{debug, warn};

/// A directory entry whose extension matched, i.e. one future test executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    file_name: String,
    stem_len: usize,
}

impl Entry {
    /// Returns `None` unless the extension of `file_name` is exactly `extension`.
    ///
    /// Leading dots don't start an extension, so `.cpp` on its own doesn't qualify.
    pub fn new(file_name: String, extension: &str) -> Option<Self> {
        if Path::new(&file_name).extension() != Some(OsStr::new(extension)) {
            return None;
        }
        // a matching extension means the name ends in `.{extension}`
        let stem_len = file_name.len() - extension.len() - 1;
        Some(Self { file_name, stem_len })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The file name without its extension, used as the target name.
    pub fn stem(&self) -> &str {
        &self.file_name[..self.stem_len]
    }
}

/// Lists the direct children of `dir` whose extension is `extension`, sorted byte-wise by file
/// name.
///
/// Subdirectories are not told apart from files: `dir.cpp/` qualifies like `dir.cpp` would.
pub fn discover(dir: &Path, extension: &str) -> Result<Vec<Entry>> {
    let mut names = vec![];
    for entry in read_dir(dir).with_context(|| format!("failed to read directory {dir:?}"))? {
        let entry = entry.with_context(|| format!("failed to read an entry of {dir:?}"))?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => {
                if Path::new(&name).extension() == Some(OsStr::new(extension)) {
                    warn!(?name, "skipping a file name that isn't valid UTF-8");
                }
            }
        }
    }
    names.sort_unstable();

    Ok(names
        .into_iter()
        .filter_map(|name| Entry::new(name, extension))
        .inspect(|entry| debug!(file = entry.file_name(), "found a test source"))
        .collect())
}

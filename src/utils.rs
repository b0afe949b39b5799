use anyhow::{anyhow, Context, Result};
use std::{
    fs::{canonicalize, metadata, read_link, symlink_metadata},
    io::Write,
    ops::Deref,
    path::{Path, PathBuf},
    str::FromStr,
};
use tempfile::Builder;

#[cfg(unix)]
use std::{fs::Permissions, os::unix::fs::PermissionsExt};

#[derive(Clone, Default)]
#[repr(transparent)]
pub struct KVPairs(Box<[(Box<str>, Box<str>)]>);

impl Deref for KVPairs {
    type Target = [(Box<str>, Box<str>)];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for KVPairs {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        s.split(',')
            .map(|p| {
                p.split_once('=')
                    .map(|(k, v)| (k.trim().into(), v.into()))
                    .ok_or(p)
            })
            .collect::<Result<_, _>>()
            .map_err(|p| anyhow!("invalid key=val pair: `{p}`"))
            .map(Self)
    }
}

/// Follows a symlinked `path` so the rename replaces the file it points to, not the link.
fn resolve_link(path: &Path) -> Result<PathBuf> {
    match symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {}
        _ => return Ok(path.to_owned()),
    }
    if let Ok(target) = canonicalize(path) {
        return Ok(target);
    }
    // dangling: the link's target doesn't exist yet, create it
    let link = read_link(path).with_context(|| format!("failed to read the link {path:?}"))?;
    Ok(path.parent().map_or_else(|| link.clone(), |parent| parent.join(&link)))
}

/// like `std::fs::write`, but the new content goes to a temporary file next to `path` first and is
/// then renamed over it, so `path` is never left half-written
pub fn write_atomic(path: &Path, new_text: impl AsRef<[u8]>) -> Result<()> {
    let target = resolve_link(path)?;
    let path = target.as_path();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    // a fresh file gets the usual 0666 minus the umask, like `File::create` would
    #[cfg(unix)]
    builder.permissions(Permissions::from_mode(0o666));
    let mut file = builder
        .tempfile_in(dir)
        .with_context(|| format!("failed to create a temporary file in {dir:?}"))?;
    file.write_all(new_text.as_ref())
        .context("failed to write to the temporary file")?;
    if let Ok(meta) = metadata(path) {
        file.as_file()
            .set_permissions(meta.permissions())
            .context("failed to set the temporary file's permissions")?;
    }
    file.as_file()
        .sync_all()
        .context("failed to flush the temporary file")?;
    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to move the temporary file to {path:?}"))?;
    Ok(())
}

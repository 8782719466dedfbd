use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

/// Writes through a temp file in the destination directory, then renames,
/// so readers never observe a half-written report.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".realitycheck-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .context("Failed to write temp file")?;
    tmp.as_file().sync_all().context("Failed to flush temp file")?;
    set_report_permissions(tmp.path())?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to move report into {}", path.display()))?;
    Ok(())
}

#[cfg(unix)]
fn set_report_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
        .context("Failed to chmod temp file")
}

#[cfg(not(unix))]
fn set_report_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// A closed pipe on stdout is not an error.
pub fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

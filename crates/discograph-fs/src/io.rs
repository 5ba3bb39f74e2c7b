use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// `<path>.<suffix>`, keeping the full original file name (`graph.bin` ->
/// `graph.bin.tmp`) so sibling files with the same stem never collide.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
  let mut name = path.file_name().map(OsString::from).unwrap_or_default();
  name.push(".");
  name.push(suffix);
  path.with_file_name(name)
}

/// Writes `contents` to a temporary sibling, syncs it, then renames it over
/// `path`. Readers see either the old file or the new one, never a torn write.
///
/// Missing parent directories are created.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  let tmp_path = with_suffix(path, "tmp");

  {
    let mut tmp_file = fs::File::create(&tmp_path)?;
    tmp_file.write_all(contents)?;
    tmp_file.sync_all()?;
  }

  if let Err(e) = fs::rename(&tmp_path, path) {
    let _ = fs::remove_file(&tmp_path);
    return Err(e);
  }
  Ok(())
}

pub fn atomic_write_str(path: &Path, contents: &str) -> io::Result<()> {
  atomic_write(path, contents.as_bytes())
}

/// Renames `path` to `<path>.<suffix>`, replacing any previous file with that
/// name. Returns the new location.
pub fn move_aside(path: &Path, suffix: &str) -> io::Result<PathBuf> {
  let target = with_suffix(path, suffix);
  fs::rename(path, &target)?;
  Ok(target)
}

use crate::codec::{decode_descriptor, encode_descriptor};
use crate::errors::ContainerError;
use matcherfix_canonical::ConfigDescriptor;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options for writing descriptor files.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Whether to fsync the file before it is renamed into place (default: false).
    pub sync: bool,
}

/// Reads one descriptor from a file.
pub fn read_descriptor<P: AsRef<Path>>(path: P) -> Result<ConfigDescriptor, ContainerError> {
    let bytes = fs::read(path)?;
    decode_descriptor(&bytes)
}

/// Writes one descriptor to a file, replacing any previous content.
///
/// The bytes go to `<path>.tmp` first and are then renamed over `path`, so a
/// reader never observes a partially written file.
pub fn write_descriptor<P: AsRef<Path>>(
    path: P,
    desc: &ConfigDescriptor,
    options: &WriteOptions,
) -> Result<(), ContainerError> {
    let path = path.as_ref();
    let tmp = tmp_path(path);
    match fs::remove_file(&tmp) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }

    let bytes = encode_descriptor(desc);
    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&tmp)?;
    file.write_all(&bytes)?;
    if options.sync {
        file.sync_all()?;
    }
    drop(file);
    fs::rename(&tmp, path)?;

    debug!(user = %desc.user, bytes = bytes.len(), path = %path.display(), "wrote descriptor");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tenant");
        let desc = ConfigDescriptor::new("tenant", "route:\n  receiver: r\n");

        write_descriptor(&path, &desc, &WriteOptions { sync: true }).unwrap();
        assert_eq!(read_descriptor(&path).unwrap(), desc);
        assert!(!dir.path().join("tenant.tmp").exists());
    }

    #[test]
    fn write_replaces_content_and_stale_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tenant");
        fs::write(dir.path().join("tenant.tmp"), b"left over").unwrap();
        write_descriptor(&path, &ConfigDescriptor::new("1", "a: 1\n"), &WriteOptions::default()).unwrap();
        write_descriptor(&path, &ConfigDescriptor::new("1", "a: 2\n"), &WriteOptions::default()).unwrap();

        assert_eq!(read_descriptor(&path).unwrap().raw_config, "a: 2\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_descriptor(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ContainerError::Io(e) if e.kind() == io::ErrorKind::NotFound));
    }
}

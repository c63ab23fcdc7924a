//! Path helpers shared by the commands.

use crate::errors::CliError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `<dir>/<file>.out` for an input `<dir>/<file>`.
pub fn default_output(input: &Path) -> Result<PathBuf, CliError> {
    let file_name = input.file_name().ok_or_else(|| CliError::InvalidPath {
        path: input.to_path_buf(),
        reason: "input has no file name",
    })?;
    let mut name = OsString::from(file_name);
    name.push(".out");
    Ok(input.with_file_name(name))
}

/// Reads a UTF-8 text file, attributing failures to `path`.
pub fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(CliError::io(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_appends_suffix() {
        assert_eq!(
            default_output(Path::new("data/tenant.bin")).unwrap(),
            PathBuf::from("data/tenant.bin.out")
        );
        assert_eq!(
            default_output(Path::new("tenant")).unwrap(),
            PathBuf::from("tenant.out")
        );
    }

    #[test]
    fn default_output_needs_a_file_name() {
        assert!(default_output(Path::new("..")).is_err());
        assert!(default_output(Path::new("/")).is_err());
    }
}

//! Canonicalize command implementation.

use crate::errors::CliError;
use crate::path;
use matcherfix_canonical::canonicalize_text;
use std::io::{self, Read};
use std::path::PathBuf;

pub fn run(input: Option<PathBuf>) -> Result<(), CliError> {
    let raw = match input {
        Some(path) => path::read_text(&path)?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Stdin)?;
            buffer
        }
    };

    print!("{}", canonicalize_text(&raw)?);
    Ok(())
}

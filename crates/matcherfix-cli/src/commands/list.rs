//! List command implementation.

use crate::errors::CliError;
use crate::output;
use matcherfix_container::{DescriptorStore, DirectoryStore};
use serde_json::json;
use std::path::PathBuf;

pub fn run(directory: PathBuf, json_output: bool) -> Result<(), CliError> {
    if !directory.is_dir() {
        return Err(CliError::InvalidPath {
            path: directory,
            reason: "not a directory",
        });
    }
    let store = DirectoryStore::open(&directory).map_err(CliError::container(&directory))?;
    let users = store.users().map_err(CliError::container(&directory))?;

    if !json_output {
        output::print_table_header(&[("USER", 24), ("TEMPLATES", 10), ("SIZE", 10), ("DIGEST", 0)]);
    }

    for user in &users {
        let desc = store.load(user).map_err(CliError::container(&directory))?;
        let digest = desc.digest();
        if json_output {
            let row = json!({
                "user": desc.user,
                "templates": desc.templates.len(),
                "size": desc.raw_config.len(),
                "digest": digest,
            });
            println!("{}", serde_json::to_string(&row)?);
        } else {
            println!(
                "{:<24} {:<10} {:<10} {}",
                output::truncate(&desc.user, 24),
                desc.templates.len(),
                desc.raw_config.len(),
                digest
            );
        }
    }

    Ok(())
}

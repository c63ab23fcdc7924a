//! Fix command implementation.

use crate::errors::CliError;
use crate::output;
use crate::path;
use matcherfix_canonical::canonicalize;
use matcherfix_container::{read_descriptor, write_descriptor, WriteOptions};
use matcherfix_core::equivalent;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

pub fn run(
    input: PathBuf,
    output_path: Option<PathBuf>,
    strict: bool,
    json_output: bool,
) -> Result<(), CliError> {
    let destination = match output_path {
        Some(explicit) => explicit,
        None => path::default_output(&input)?,
    };

    let desc = read_descriptor(&input).map_err(CliError::container(&input))?;
    let fixed = canonicalize(&desc).map_err(|source| CliError::Fix {
        user: desc.user.clone(),
        source,
    })?;
    let differences = equivalent(&desc, &fixed)
        .map_err(|source| CliError::Compare {
            user: desc.user.clone(),
            source,
        })?
        .differences;
    let changed = fixed.raw_config != desc.raw_config;

    if !differences.is_empty() {
        warn!(
            user = %desc.user,
            differences = differences.len(),
            "before and after are not equal"
        );
        eprintln!(
            "before and after are not equal for user {:?}:\n{}",
            desc.user,
            output::format_differences(&differences)
        );
        if strict {
            return Err(CliError::Mismatch { user: desc.user });
        }
    }

    write_descriptor(&destination, &fixed, &WriteOptions::default())
        .map_err(CliError::container(&destination))?;
    info!(
        user = %fixed.user,
        changed,
        output = %destination.display(),
        "wrote fixed configuration"
    );

    if json_output {
        let summary = json!({
            "user": fixed.user,
            "changed": changed,
            "equivalent": differences.is_empty(),
            "digest": fixed.digest(),
            "output": destination.display().to_string(),
            "differences": differences
                .iter()
                .map(output::difference_json)
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let status = match (changed, differences.is_empty()) {
            (_, false) => "mismatch",
            (true, true) => "changed",
            (false, true) => "unchanged",
        };
        output::print_table_header(&[("USER", 24), ("STATUS", 10), ("DIGEST", 0)]);
        println!(
            "{:<24} {:<10} {}",
            output::truncate(&fixed.user, 24),
            status,
            fixed.digest()
        );
    }

    Ok(())
}

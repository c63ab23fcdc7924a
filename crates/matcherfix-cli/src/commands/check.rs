//! Check command implementation.

use crate::errors::CliError;
use crate::output;
use crate::path;
use matcherfix_core::equivalent_text;
use serde_json::json;
use std::path::PathBuf;

pub fn run(first: PathBuf, second: PathBuf, json_output: bool) -> Result<(), CliError> {
    let left = path::read_text(&first)?;
    let right = path::read_text(&second)?;
    let result = equivalent_text(&left, &right)?;

    if json_output {
        let differences: Vec<_> = result
            .differences
            .iter()
            .map(output::difference_json)
            .collect();
        let report = json!({
            "equivalent": result.is_equal(),
            "differences": differences,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if result.is_equal() {
        println!("equivalent");
    } else {
        println!("not equivalent:");
        println!("{}", output::format_differences(&result.differences));
    }

    if result.is_equal() {
        Ok(())
    } else {
        Err(CliError::NotEquivalent {
            count: result.differences.len(),
        })
    }
}

use matcherfix_canonical::ConfigDescriptor;
use tracing::debug;

use crate::config::Config;
use crate::diff::{Diff, Difference, Path};
use crate::errors::{Document, EquivalenceError};

/// Outcome of comparing two configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Equivalence {
    /// Every differing field, in document order.
    pub differences: Vec<Difference>,
}

impl Equivalence {
    /// Returns true when the configurations mean the same thing.
    pub fn is_equal(&self) -> bool {
        self.differences.is_empty()
    }
}

/// Compares the raw configurations of two descriptors.
///
/// `user` and `templates` are not part of the comparison.
pub fn equivalent(
    first: &ConfigDescriptor,
    second: &ConfigDescriptor,
) -> Result<Equivalence, EquivalenceError> {
    equivalent_text(&first.raw_config, &second.raw_config)
}

/// Loads both documents into typed configurations and compares them field by
/// field. Nothing is compared unless both documents load.
pub fn equivalent_text(first: &str, second: &str) -> Result<Equivalence, EquivalenceError> {
    let left = Config::load(first).map_err(|source| EquivalenceError::SchemaDecode {
        document: Document::First,
        source,
    })?;
    let right = Config::load(second).map_err(|source| EquivalenceError::SchemaDecode {
        document: Document::Second,
        source,
    })?;

    let mut differences = Vec::new();
    left.diff(&right, &Path::root(), &mut differences);
    debug!(differences = differences.len(), "compared configurations");
    Ok(Equivalence { differences })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_is_equal() {
        let raw = "route:\n  receiver: a\n";
        assert!(equivalent_text(raw, raw).unwrap().is_equal());
    }

    #[test]
    fn descriptors_ignore_metadata() {
        let first = ConfigDescriptor::new("1", "templates: [a]\n");
        let second = ConfigDescriptor::new("2", "templates:\n- a\n");
        assert!(equivalent(&first, &second).unwrap().is_equal());
    }

    #[test]
    fn differences_are_reported_with_paths() {
        let result = equivalent_text(
            "route:\n  receiver: a\n",
            "route:\n  receiver: b\n",
        )
        .unwrap();
        assert!(!result.is_equal());
        assert_eq!(result.differences[0].to_string(), "route.receiver: \"a\" != \"b\"");
    }
}

use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Regex::new($pattern).expect("invalid regex").is_match(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }

            /// Returns the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype!(
    UserId,
    "Tenant identifier that is safe to use as a file name (pattern: `[A-Za-z0-9][A-Za-z0-9_.-]{0,127}`).",
    r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,127}$"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_tenant_names() {
        for id in ["1", "tenant-a", "team_b.prod", "A0"] {
            assert_eq!(UserId::parse(id).unwrap().as_str(), id);
        }
    }

    #[test]
    fn rejects_path_like_names() {
        for id in ["", ".", "..", "../etc", "a/b", "-x", "with space"] {
            assert!(UserId::parse(id).is_err(), "{id:?} should be rejected");
        }
    }
}

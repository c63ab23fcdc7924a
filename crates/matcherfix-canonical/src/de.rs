use serde::{Deserialize, Deserializer};

/// Deserializes a field where an explicit YAML `null` means the same as
/// leaving the field out.
///
/// Pair with `#[serde(default)]` so a missing key also yields `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<String>,
    }

    #[test]
    fn null_and_missing_are_empty() {
        let missing: Holder = serde_yaml::from_str("{}").unwrap();
        let null: Holder = serde_yaml::from_str("items: null").unwrap();
        let tilde: Holder = serde_yaml::from_str("items: ~").unwrap();
        assert!(missing.items.is_empty());
        assert!(null.items.is_empty());
        assert!(tilde.items.is_empty());
    }

    #[test]
    fn present_values_pass_through() {
        let holder: Holder = serde_yaml::from_str("items: [a, b]").unwrap();
        assert_eq!(holder.items, vec!["a", "b"]);
    }
}

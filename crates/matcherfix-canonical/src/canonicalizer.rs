use tracing::debug;

use crate::descriptor::ConfigDescriptor;
use crate::document::Document;
use crate::emitter::EncodeError;

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// The raw configuration is not valid YAML, or a section has the wrong
    /// shape, an invalid matcher, duration or regex, or an unknown field.
    #[error("failed to decode {field}: {source}")]
    Decode {
        /// Top-level section being decoded, or `root`.
        field: String,
        /// Underlying decoder error.
        source: serde_yaml::Error,
    },
    /// The decoded document could not be rendered back to text.
    #[error("failed to encode configuration: {0}")]
    Encode(#[from] EncodeError),
}

impl CanonicalizationError {
    /// Returns true for errors caused by the input text.
    pub fn is_decode(&self) -> bool {
        matches!(self, CanonicalizationError::Decode { .. })
    }
}

/// Rewrites raw YAML so that every matcher is double-quoted.
///
/// The document is decoded once and rendered again; the result is not
/// checked for equivalence with the input.
pub fn canonicalize_text(raw: &str) -> Result<String, CanonicalizationError> {
    let document = Document::parse(raw)?;
    let rendered = document.render()?;
    debug!(
        input_bytes = raw.len(),
        output_bytes = rendered.len(),
        "canonicalized configuration"
    );
    Ok(rendered)
}

/// Canonicalizes the raw configuration of a descriptor, keeping its user and
/// templates.
pub fn canonicalize(desc: &ConfigDescriptor) -> Result<ConfigDescriptor, CanonicalizationError> {
    debug!(user = %desc.user, "canonicalizing descriptor");
    let raw = canonicalize_text(&desc.raw_config)?;
    Ok(desc.with_raw_config(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TemplateDesc;

    #[test]
    fn quotes_bare_matchers() {
        let out = canonicalize_text("route:\n  matchers:\n  - foo=\n  - baz=[\\w+]\n  - bar=!baz\n").unwrap();
        assert_eq!(
            out,
            "route:\n  matchers:\n  - bar=\"!baz\"\n  - baz=\"[\\\\w+]\"\n  - foo=\"\"\n  continue: false\ntemplates: []\n"
        );
    }

    #[test]
    fn is_idempotent() {
        let once = canonicalize_text("route:\n  receiver: a\n  matchers: ['x=~1|2', 'y!=z']\n").unwrap();
        let twice = canonicalize_text(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn descriptor_metadata_is_copied() {
        let desc = ConfigDescriptor {
            user: "tenant-a".into(),
            raw_config: "route:\n  matchers: [a=b]\n".into(),
            templates: vec![TemplateDesc {
                filename: "t.tmpl".into(),
                body: "{{ define \"x\" }}{{ end }}".into(),
            }],
        };
        let out = canonicalize(&desc).unwrap();
        assert_eq!(out.user, desc.user);
        assert_eq!(out.templates, desc.templates);
        assert_eq!(out.raw_config, "route:\n  matchers:\n  - a=\"b\"\n  continue: false\ntemplates: []\n");
    }

    #[test]
    fn decode_errors_are_classified() {
        let err = canonicalize_text("route: [unclosed").unwrap_err();
        assert!(err.is_decode());
        let err = canonicalize_text("route:\n  matchers: ['a=\"b']\n").unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().starts_with("failed to decode route"));
    }

    #[test]
    fn encode_errors_are_classified() {
        let err = canonicalize_text("extra:\n  ? [a, b]\n  : v\n").unwrap_err();
        assert!(matches!(err, CanonicalizationError::Encode(EncodeError::ComplexKey(_))));
        assert!(!err.is_decode());
    }
}

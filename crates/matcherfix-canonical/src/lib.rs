//! Canonical rendering primitives for Alertmanager configuration documents.
//!
//! The crate owns the grammar shared by both decode paths (matcher
//! expressions, durations, anchored regexes), the persisted
//! [`ConfigDescriptor`], the order-preserving [`Document`] used for rewriting,
//! and the YAML [`emitter`] that renders it back to text.
//!
//! Canonicalization is not a separate pass over the text: the [`Matchers`]
//! type always serializes its entries as `name<op>"value"`, so decoding a
//! document and encoding it again is the whole rewrite.
//!
#![deny(missing_docs)]

/// Canonicalization entry points.
pub mod canonicalizer;
/// Serde helpers shared by the typed structures.
pub mod de;
/// Persisted configuration descriptors.
pub mod descriptor;
/// Content digests of raw configurations.
pub mod digest;
/// Order-preserving configuration document with typed routing structures.
pub mod document;
/// Prometheus-style durations.
pub mod duration;
/// Block-style YAML emitter.
pub mod emitter;
/// Validated identifiers.
pub mod identifiers;
/// YAML loading with Alertmanager's scalar resolution.
pub mod loader;
/// Label matcher grammar.
pub mod matchers;
/// Anchored regular expressions.
pub mod pattern;
/// Validation errors for identifiers.
pub mod validation;

pub use canonicalizer::{canonicalize, canonicalize_text, CanonicalizationError};
pub use descriptor::{ConfigDescriptor, TemplateDesc};
pub use digest::{Digest, DigestAlg};
pub use document::{Document, InhibitRule, Route};
pub use duration::{Duration, DurationError};
pub use emitter::EncodeError;
pub use identifiers::UserId;
pub use matchers::{parse_matchers, MatchType, Matcher, MatcherError, Matchers};
pub use pattern::AnchoredRegex;
pub use validation::ValidationError;

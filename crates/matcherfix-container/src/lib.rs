//! Storage format for persisted configuration descriptors.
//!
//! A descriptor is stored as one protobuf `AlertConfigDesc` message, the
//! same bytes Alertmanager-compatible stores keep per tenant:
//!
//! ```text
//! message AlertConfigDesc {
//!   string user = 1;
//!   string raw_config = 2;
//!   repeated TemplateDesc templates = 3;
//! }
//! message TemplateDesc {
//!   string filename = 1;
//!   string body = 2;
//! }
//! ```
//!
//! ```rust
//! use matcherfix_canonical::ConfigDescriptor;
//! use matcherfix_container::{decode_descriptor, encode_descriptor};
//!
//! let desc = ConfigDescriptor::new("1", "route:\n  receiver: default\n");
//! let bytes = encode_descriptor(&desc);
//! assert_eq!(decode_descriptor(&bytes)?, desc);
//! # Ok::<(), matcherfix_container::ContainerError>(())
//! ```
//!
//! [`DirectoryStore`] keeps one such file per tenant in a directory.

#![deny(missing_docs)]

/// In-memory encoding of descriptors.
pub mod codec;
/// Error types for storage operations.
pub mod errors;
/// Reading and writing descriptor files.
pub mod file;
/// Protobuf messages.
pub mod proto;
/// Per-tenant descriptor storage.
pub mod store;

pub use codec::{decode_descriptor, encode_descriptor};
pub use errors::ContainerError;
pub use file::{read_descriptor, write_descriptor, WriteOptions};
pub use proto::{AlertConfigDesc, TemplateDesc};
pub use store::{DescriptorStore, DirectoryStore};

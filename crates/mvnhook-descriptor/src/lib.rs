//! mvnhook Descriptor
//!
//! Structural model of Maven build descriptors (POM files).
//!
//! # Core Concepts
//!
//! - [`Document`]: a parsed POM with plugin queries and profile-aware mutations
//! - [`Element`] / [`Node`]: the lossless XML tree underneath
//! - [`PluginIdentity`]: `groupId`/`artifactId` coordinates
//! - [`ContentHash`]: Blake3 hash of serialized text
//!
//! An unmodified document serializes back to exactly the text it was
//! parsed from, byte-order mark included. Inserted elements follow the
//! indentation and line endings of the file.
//!
//! # Example
//!
//! ```rust
//! use mvnhook_descriptor::{Document, Element, PluginIdentity};
//!
//! let mut doc = Document::parse("<project><profiles><profile/></profiles></project>").unwrap();
//! let plugin = Element::new("plugin")
//!     .with_child(Element::with_text("groupId", "org.example"))
//!     .with_child(Element::with_text("artifactId", "example-plugin"));
//!
//! assert_eq!(doc.add_plugin_to_all_profiles(&plugin).unwrap(), 2);
//! assert!(doc.is_plugin_present_anywhere("org.example", "example-plugin"));
//! assert!(!doc.is_plugin_present_anywhere(
//!     PluginIdentity::TEST_RUNNER.group_id,
//!     PluginIdentity::TEST_RUNNER.artifact_id,
//! ));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod error;
mod hash;
mod identity;
mod xml;

pub use document::{Document, DocumentState, LISTENER_PROPERTY};
pub use error::{ApplyError, ParseError, SerializeError};
pub use hash::ContentHash;
pub use identity::{PluginIdentity, DEFAULT_PLUGIN_GROUP};
pub use xml::{Element, Layout, Node};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Glossa Core - Terms, relation types and configuration
//!
//! This crate holds the vocabulary the rest of Glossa speaks: references
//! to glossary terms, the relation types that may connect them, and the
//! registry that decides which relation types exist.
//!
//! Nothing here touches storage. The graph crate builds on these types
//! to validate and persist typed edges.
//!
//! # Example
//!
//! ```
//! use glossa_core::RelationTypeRegistry;
//!
//! let registry = RelationTypeRegistry::builtin();
//!
//! assert!(registry.is_valid("broader"));
//! assert_eq!(registry.inverse_name("broader"), Some("narrower"));
//! assert_eq!(registry.default_type().name, "relatedTo");
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod relation_type;
pub mod term;

pub use config::GlossaConfig;
pub use error::{ConfigError, RegistryError};
pub use registry::{global, install, is_valid_type_name, RelationTypeRegistry};
pub use relation_type::{builtin_types, RelationCategory, RelationType};
pub use term::{GlossaryId, GlossaryRecord, TermId, TermRecord, TermRef};

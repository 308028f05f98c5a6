//! Domain model for FMEA tree editing.
//!
//! This module contains the typed node hierarchy, the flat node store that
//! owns it, the editing model that enforces the nesting schema and keeps
//! risk priority numbers consistent, and the read-only views handed to
//! rendering collaborators.

/// Node identity, kinds, ratings, and the node record itself.
pub mod node;
pub use node::{Attributes, Node, NodeId, NodeKind, Rating, RatingOutOfRange, UnknownKindError};

/// Flat node storage with parent/child links and identity allocation.
pub mod store;
pub use store::{Ancestors, Descendants, NodeStore, StoreError};

/// The FMEA editing model.
pub mod tree;
pub use tree::{EditError, FmeaTree, RatingField};

/// Read-only views for rendering collaborators.
pub mod view;
pub use view::{NodeDetails, NodeView};

//! Core types and logic for interactive FMEA tree editing.
//!
//! An FMEA (Failure Mode and Effects Analysis) tree is a hierarchy of
//! systems, subsystems, functions, failures, effects, and causes. Effects
//! carry a severity rating, causes carry occurrence and detection ratings,
//! and every failure exposes a derived risk priority number: the worst
//! `severity × occurrence × detection` product below it.
//!
//! [`FmeaTree`] owns one editing session. A presentation layer applies edits
//! through its operations and renders the read-only label tree it serialises;
//! it never mutates nodes directly.
//!
//! ```
//! use fmea_core::{FmeaTree, NodeKind, RatingField};
//!
//! let mut tree = FmeaTree::new();
//! let brakes = tree.add_node(tree.root(), "Brakes", NodeKind::SubSystem)?;
//! let stop = tree.add_node(brakes, "Stop Vehicle", NodeKind::Function)?;
//! let failure = tree.add_node(stop, "Fails to Stop", NodeKind::Failure)?;
//! let effect = tree.add_node(failure, "No Braking", NodeKind::Effect)?;
//! tree.update_rating(effect, RatingField::Severity, 8)?;
//! let cause = tree.add_node(effect, "Worn Pads", NodeKind::Cause)?;
//! tree.update_rating(cause, RatingField::Occurrence, 6)?;
//!
//! assert_eq!(tree.get(failure)?.rpn(), Some(48));
//! assert_eq!(
//!     tree.view(failure)?.label,
//!     "Fails to Stop (RPN: 48)",
//! );
//! # Ok::<(), fmea_core::EditError>(())
//! ```

/// Domain types and business logic.
pub mod domain;
pub use domain::{
    EditError, FmeaTree, Node, NodeDetails, NodeId, NodeKind, NodeStore, NodeView, Rating,
    RatingField, StoreError,
};

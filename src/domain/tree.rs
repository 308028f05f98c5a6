//! The FMEA domain model built on top of [`NodeStore`].
//!
//! [`FmeaTree`] enforces the kind-nesting schema, creates and edits typed
//! nodes, and keeps every failure's risk priority number consistent while the
//! tree is edited. One instance backs one editing session; the presentation
//! layer holds a handle to it and renders the read-only views it produces.

use std::fmt;

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
    node::{Attributes, Node, NodeId, NodeKind, Rating, RatingOutOfRange},
    store::{NodeStore, StoreError},
    view::{NodeDetails, NodeView},
};

/// The name given to the root node of a fresh or reset tree.
const DEFAULT_ROOT_NAME: &str = "System 1";

/// The rating fields a caller can address through
/// [`FmeaTree::update_rating`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingField {
    /// Severity of an effect.
    Severity,
    /// Occurrence of a cause.
    Occurrence,
    /// Detection of a cause.
    Detection,
}

impl RatingField {
    /// Whether this field exists on nodes of the given kind.
    #[must_use]
    pub const fn applies_to(self, kind: NodeKind) -> bool {
        matches!(
            (self, kind),
            (Self::Severity, NodeKind::Effect)
                | (Self::Occurrence | Self::Detection, NodeKind::Cause)
        )
    }
}

impl fmt::Display for RatingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Severity => "Severity",
            Self::Occurrence => "Occurrence",
            Self::Detection => "Detection",
        })
    }
}

/// Error type for editing operations on an [`FmeaTree`].
///
/// Every variant carries enough context to render a precise message. A failed
/// operation leaves the tree and the selection exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// A structural rule was violated; see [`StoreError`].
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The child kind is not permitted under the parent kind.
    #[error("a {child} node cannot be nested under a {parent} node")]
    SchemaViolation {
        /// Kind of the would-be parent.
        parent: NodeKind,
        /// Kind that was rejected.
        child: NodeKind,
    },

    /// The addressed rating field does not exist on the node's kind.
    #[error("{field} is not a rating carried by {kind} nodes")]
    RatingMismatch {
        /// Kind of the addressed node.
        kind: NodeKind,
        /// The mismatched field.
        field: RatingField,
    },

    /// A rating value fell outside `1..=10`.
    #[error(transparent)]
    OutOfRange(#[from] RatingOutOfRange),

    /// An empty (or whitespace-only) node name was rejected.
    #[error("node names must not be empty")]
    InvalidName,
}

/// An editable FMEA tree: one `System` root with subsystems, functions,
/// failures, effects, and causes nested per the fixed schema.
///
/// All operations are synchronous and atomic: validation strictly precedes
/// mutation, so a returned error means nothing changed. The type assumes a
/// single logical writer; wrap it in a lock before sharing across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FmeaTree {
    store: NodeStore,
    root: NodeId,
    selected: Option<NodeId>,
}

impl Default for FmeaTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FmeaTree {
    /// Creates a tree holding a single root `System` node named "System 1".
    ///
    /// # Panics
    ///
    /// Never panics in practice; the default root name is statically
    /// non-empty.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT_NAME).expect("the default root name is valid")
    }

    /// Creates a tree holding a single root `System` node with the given
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidName`] if `name` is empty or
    /// whitespace-only.
    ///
    /// # Panics
    ///
    /// Never panics in practice; an empty store always accepts a root.
    pub fn with_root(name: &str) -> Result<Self, EditError> {
        let name = validate_name(name)?;
        let mut store = NodeStore::new();
        let root = store
            .create_node(name, Attributes::new(NodeKind::System), None)
            .expect("an empty store accepts a root");
        Ok(Self {
            store,
            root,
            selected: None,
        })
    }

    /// The root node's identifier.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Read-only access to the underlying store, for structural queries such
    /// as [`NodeStore::ancestors`] and [`NodeStore::descendants`].
    #[must_use]
    pub const fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Retrieves a node by identifier.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is unknown or stale.
    pub fn get(&self, id: NodeId) -> Result<&Node, EditError> {
        Ok(self.store.get(id)?)
    }

    /// The kinds that may be added under the given node, for driving
    /// selection controls.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is unknown.
    pub fn allowed_children(&self, id: NodeId) -> Result<&'static [NodeKind], EditError> {
        Ok(self.store.get(id)?.kind().allowed_children())
    }

    /// The currently selected node, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Selects the given node.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is unknown; the previous selection is kept.
    pub fn select(&mut self, id: NodeId) -> Result<(), EditError> {
        self.store.get(id)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Creates a node of the given kind under `parent` and selects it.
    ///
    /// Ratings start at 1; a new failure's RPN starts undefined. Adding an
    /// effect or cause refreshes the RPN of the nearest failure above it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `parent` is unknown,
    /// [`EditError::SchemaViolation`] if `kind` may not nest under the
    /// parent's kind, and [`EditError::InvalidName`] for an empty name.
    #[instrument(skip(self))]
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId, EditError> {
        let parent_kind = self.store.get(parent)?.kind();
        if !parent_kind.can_contain(kind) {
            return Err(EditError::SchemaViolation {
                parent: parent_kind,
                child: kind,
            });
        }
        let name = validate_name(name)?;

        let id = self
            .store
            .create_node(name, Attributes::new(kind), Some(parent))?;

        if matches!(kind, NodeKind::Effect | NodeKind::Cause) {
            if let Some(failure) = self.nearest_failure(parent) {
                self.refresh_rpn(failure);
            }
        }
        self.selected = Some(id);
        Ok(id)
    }

    /// Renames a node.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is unknown and [`EditError::InvalidName`]
    /// for an empty or whitespace-only name.
    pub fn update_name(&mut self, id: NodeId, name: &str) -> Result<(), EditError> {
        self.store.get(id)?;
        let name = validate_name(name)?;
        self.store.get_mut(id)?.name = name;
        Ok(())
    }

    /// Sets a rating on a node and refreshes the RPN of the nearest failure
    /// above it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is unknown, [`EditError::RatingMismatch`]
    /// if `field` does not exist on the node's kind, and
    /// [`EditError::OutOfRange`] if `value` is not in `1..=10`.
    pub fn update_rating(
        &mut self,
        id: NodeId,
        field: RatingField,
        value: u8,
    ) -> Result<(), EditError> {
        let kind = self.store.get(id)?.kind();
        if !field.applies_to(kind) {
            return Err(EditError::RatingMismatch { kind, field });
        }
        let rating = Rating::new(value)?;

        let node = self.store.get_mut(id)?;
        match (field, &mut node.attributes) {
            (RatingField::Severity, Attributes::Effect { severity }) => *severity = rating,
            (RatingField::Occurrence, Attributes::Cause { occurrence, .. }) => {
                *occurrence = rating;
            }
            (RatingField::Detection, Attributes::Cause { detection, .. }) => *detection = rating,
            // applies_to() vetted the combination above.
            _ => return Err(EditError::RatingMismatch { kind, field }),
        }

        if let Some(failure) = self.nearest_failure(id) {
            self.refresh_rpn(failure);
        }
        Ok(())
    }

    /// Relinks a node under a new parent at `index` among its new siblings.
    /// An index past the end appends; moving within the same parent reorders
    /// siblings.
    ///
    /// The RPNs of the failures nearest to the old and new locations are both
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is unknown, `ParentNotFound` if
    /// `new_parent` is unknown, [`EditError::SchemaViolation`] if the node's
    /// kind may not nest under the new parent's kind, and `CycleDetected` if
    /// `new_parent` is the node itself or one of its descendants.
    #[instrument(skip(self))]
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        index: usize,
    ) -> Result<(), EditError> {
        let node = self.store.get(id)?;
        let child_kind = node.kind();
        let old_parent = node.parent();

        let parent_kind = match self.store.get(new_parent) {
            Ok(parent_node) => parent_node.kind(),
            Err(StoreError::NotFound(missing)) => {
                return Err(StoreError::ParentNotFound(missing).into());
            }
            Err(other) => return Err(other.into()),
        };
        if !parent_kind.can_contain(child_kind) {
            return Err(EditError::SchemaViolation {
                parent: parent_kind,
                child: child_kind,
            });
        }

        self.store.move_node(id, new_parent, index)?;

        let old_failure = old_parent.and_then(|parent_id| self.nearest_failure(parent_id));
        let new_failure = self.nearest_failure(new_parent);
        if let Some(failure) = old_failure.filter(|old| Some(*old) != new_failure) {
            self.refresh_rpn(failure);
        }
        if let Some(failure) = new_failure {
            self.refresh_rpn(failure);
        }
        Ok(())
    }

    /// Removes a node and its whole subtree, returning the removed
    /// identifiers in pre-order.
    ///
    /// Clears the selection if it pointed into the removed subtree, and
    /// refreshes the RPN of the failure nearest to the former parent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is unknown and `CannotRemoveRoot` if `id`
    /// is the root.
    #[instrument(skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, EditError> {
        let parent = self.store.get(id)?.parent();
        let removed = self.store.remove_node(id)?;

        if self
            .selected
            .is_some_and(|selected| removed.contains(&selected))
        {
            self.selected = None;
        }
        if let Some(failure) = parent.and_then(|parent_id| self.nearest_failure(parent_id)) {
            self.refresh_rpn(failure);
        }
        Ok(removed)
    }

    /// Discards the entire tree and reinitialises it with a single root
    /// `System` node named "System 1". Clears the selection. Never fails.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Serialises the subtree rooted at `id` into a read-only label tree for
    /// rendering.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is unknown.
    pub fn view(&self, id: NodeId) -> Result<NodeView, EditError> {
        Ok(NodeView::from_store(&self.store, id)?)
    }

    /// Serialises the whole tree into a read-only label tree for rendering.
    ///
    /// # Panics
    ///
    /// Never panics in practice; the root always exists.
    #[must_use]
    pub fn label_tree(&self) -> NodeView {
        NodeView::from_store(&self.store, self.root).expect("the root always exists")
    }

    /// The editable fields of a single node, for a property panel: its name
    /// and the ratings valid for its kind.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is unknown.
    pub fn details(&self, id: NodeId) -> Result<NodeDetails, EditError> {
        Ok(NodeDetails::from_node(id, self.store.get(id)?))
    }

    /// Walks from `start` towards the root and returns the first failure
    /// node, if any.
    fn nearest_failure(&self, start: NodeId) -> Option<NodeId> {
        std::iter::once(start)
            .chain(self.store.ancestors(start))
            .find(|&id| {
                self.store
                    .get(id)
                    .is_ok_and(|node| node.kind() == NodeKind::Failure)
            })
    }

    /// Recomputes and stores the RPN of the given failure node.
    fn refresh_rpn(&mut self, failure_id: NodeId) {
        let rpn = self.compute_rpn(failure_id);
        if let Ok(node) = self.store.get_mut(failure_id) {
            if let Attributes::Failure { rpn: slot } = &mut node.attributes {
                *slot = rpn;
            }
        }
        tracing::debug!(%failure_id, ?rpn, "refreshed failure RPN");
    }

    /// The worst credible risk below a failure: the maximum of
    /// `severity × occurrence × detection` over every effect child and cause
    /// grandchild pair, or `None` while no such pair exists.
    fn compute_rpn(&self, failure_id: NodeId) -> Option<u16> {
        let mut worst: Option<u16> = None;

        let Ok(failure) = self.store.get(failure_id) else {
            return None;
        };
        for &effect_id in failure.children() {
            let Ok(effect) = self.store.get(effect_id) else {
                continue;
            };
            let Some(severity) = effect.severity() else {
                continue;
            };
            for &cause_id in effect.children() {
                let Ok(cause) = self.store.get(cause_id) else {
                    continue;
                };
                let (Some(occurrence), Some(detection)) = (cause.occurrence(), cause.detection())
                else {
                    continue;
                };
                let product = u16::from(severity.get())
                    * u16::from(occurrence.get())
                    * u16::from(detection.get());
                worst = Some(worst.map_or(product, |current| current.max(product)));
            }
        }
        worst
    }
}

fn validate_name(name: &str) -> Result<NonEmptyString, EditError> {
    if name.trim().is_empty() {
        return Err(EditError::InvalidName);
    }
    NonEmptyString::new(name.to_string()).map_err(|_| EditError::InvalidName)
}

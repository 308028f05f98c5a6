//! Read-only views handed to rendering collaborators.
//!
//! The presentation layer never touches [`Node`](super::node::Node) records
//! directly; it renders the label tree produced here and requests edits
//! through [`FmeaTree`](super::FmeaTree) operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    node::{Attributes, Node, NodeId, NodeKind},
    store::{NodeStore, StoreError},
};

/// One node of the serialised label tree.
///
/// Labels embed the kind-specific derived text: an effect shows its severity,
/// a cause its occurrence and detection, a failure its RPN ("undefined" while
/// no effect/cause pair exists below it). Child order matches the live tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    /// Identifier of the underlying node.
    pub id: NodeId,
    /// The node's bare name.
    pub name: String,
    /// The node's kind.
    pub kind: NodeKind,
    /// Display label with the kind-specific derived text appended.
    pub label: String,
    /// Views of the node's children, in order.
    pub children: Vec<Self>,
}

impl NodeView {
    /// Builds the view of the subtree rooted at `id`.
    pub(crate) fn from_store(store: &NodeStore, id: NodeId) -> Result<Self, StoreError> {
        let node = store.get(id)?;
        let children = node
            .children()
            .iter()
            .map(|&child| Self::from_store(store, child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            name: node.name().to_string(),
            kind: node.kind(),
            label: label(node),
            children,
        })
    }

    /// The view as a JSON value, for handing to widget layers or exporting.
    ///
    /// # Panics
    ///
    /// Never panics in practice; the view contains nothing that can fail to
    /// serialise.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("a label tree always serialises")
    }
}

/// The editable fields of a single node, for a property panel.
///
/// Only the ratings valid for the node's kind are present; `rpn` is the
/// derived value and is read-only for callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDetails {
    /// Identifier of the underlying node.
    pub id: NodeId,
    /// The node's name.
    pub name: String,
    /// The node's kind.
    pub kind: NodeKind,
    /// When the node was created.
    pub created: DateTime<Utc>,
    /// Severity, for effect nodes.
    pub severity: Option<u8>,
    /// Occurrence, for cause nodes.
    pub occurrence: Option<u8>,
    /// Detection, for cause nodes.
    pub detection: Option<u8>,
    /// Derived risk priority number, for failure nodes.
    pub rpn: Option<u16>,
}

impl NodeDetails {
    pub(crate) fn from_node(id: NodeId, node: &Node) -> Self {
        Self {
            id,
            name: node.name().to_string(),
            kind: node.kind(),
            created: node.created(),
            severity: node.severity().map(super::node::Rating::get),
            occurrence: node.occurrence().map(super::node::Rating::get),
            detection: node.detection().map(super::node::Rating::get),
            rpn: node.rpn(),
        }
    }
}

/// Formats the display label for a node.
fn label(node: &Node) -> String {
    let name = node.name();
    match node.attributes() {
        Attributes::Failure { rpn } => {
            let rpn = rpn.map_or_else(|| "undefined".to_string(), |value| value.to_string());
            format!("{name} (RPN: {rpn})")
        }
        Attributes::Effect { severity } => format!("{name} (Severity: {severity})"),
        Attributes::Cause {
            occurrence,
            detection,
        } => format!("{name} (Occurrence: {occurrence}, Detection: {detection})"),
        Attributes::System | Attributes::SubSystem | Attributes::Function => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{FmeaTree, NodeKind, RatingField};

    #[test]
    fn labels_embed_the_derived_ratings() {
        let mut tree = FmeaTree::new();
        let brakes = tree
            .add_node(tree.root(), "Brakes", NodeKind::SubSystem)
            .unwrap();
        let function = tree
            .add_node(brakes, "Stop Vehicle", NodeKind::Function)
            .unwrap();
        let failure = tree
            .add_node(function, "Fails to Stop", NodeKind::Failure)
            .unwrap();
        let effect = tree
            .add_node(failure, "No Braking", NodeKind::Effect)
            .unwrap();
        tree.update_rating(effect, RatingField::Severity, 8).unwrap();
        let cause = tree.add_node(effect, "Worn Pads", NodeKind::Cause).unwrap();
        tree.update_rating(cause, RatingField::Occurrence, 6)
            .unwrap();

        let view = tree.label_tree();
        assert_eq!(view.label, "System 1");

        let brakes_view = &view.children[0];
        assert_eq!(brakes_view.label, "Brakes");

        let failure_view = &brakes_view.children[0].children[0];
        assert_eq!(failure_view.label, "Fails to Stop (RPN: 48)");

        let effect_view = &failure_view.children[0];
        assert_eq!(effect_view.label, "No Braking (Severity: 8)");

        let cause_view = &effect_view.children[0];
        assert_eq!(cause_view.label, "Worn Pads (Occurrence: 6, Detection: 1)");
    }

    #[test]
    fn an_unrated_failure_renders_an_undefined_rpn() {
        let mut tree = FmeaTree::new();
        let brakes = tree
            .add_node(tree.root(), "Brakes", NodeKind::SubSystem)
            .unwrap();
        let function = tree
            .add_node(brakes, "Stop Vehicle", NodeKind::Function)
            .unwrap();
        let failure = tree
            .add_node(function, "Fails to Stop", NodeKind::Failure)
            .unwrap();

        let view = tree.view(failure).unwrap();
        assert_eq!(view.label, "Fails to Stop (RPN: undefined)");
    }

    #[test]
    fn serialisation_reflects_the_live_tree() {
        let mut tree = FmeaTree::new();
        let brakes = tree
            .add_node(tree.root(), "Brakes", NodeKind::SubSystem)
            .unwrap();
        assert_eq!(tree.label_tree().children[0].label, "Brakes");

        tree.update_name(brakes, "Disc Brakes").unwrap();
        assert_eq!(tree.label_tree().children[0].label, "Disc Brakes");

        tree.remove_node(brakes).unwrap();
        assert!(tree.label_tree().children.is_empty());
    }

    #[test]
    fn views_preserve_child_order() {
        let mut tree = FmeaTree::new();
        let root = tree.root();
        tree.add_node(root, "Brakes", NodeKind::SubSystem).unwrap();
        tree.add_node(root, "Steering", NodeKind::SubSystem).unwrap();
        tree.add_node(root, "Stop Vehicle", NodeKind::Function)
            .unwrap();

        let label_tree = tree.label_tree();
        let names: Vec<&str> = label_tree
            .children
            .iter()
            .map(|child| child.name.as_str())
            .collect();
        assert_eq!(names, vec!["Brakes", "Steering", "Stop Vehicle"]);
    }

    #[test]
    fn json_export_carries_ids_labels_and_children() {
        let mut tree = FmeaTree::new();
        let brakes = tree
            .add_node(tree.root(), "Brakes", NodeKind::SubSystem)
            .unwrap();

        let json = tree.label_tree().to_json();
        assert_eq!(json["kind"], "System");
        assert_eq!(json["label"], "System 1");
        assert_eq!(json["children"][0]["id"], brakes.to_string());
        assert_eq!(json["children"][0]["kind"], "SubSystem");
    }

    #[test]
    fn details_expose_only_the_fields_valid_for_the_kind() {
        let mut tree = FmeaTree::new();
        let brakes = tree
            .add_node(tree.root(), "Brakes", NodeKind::SubSystem)
            .unwrap();
        let function = tree
            .add_node(brakes, "Stop Vehicle", NodeKind::Function)
            .unwrap();
        let failure = tree
            .add_node(function, "Fails to Stop", NodeKind::Failure)
            .unwrap();
        let effect = tree
            .add_node(failure, "No Braking", NodeKind::Effect)
            .unwrap();
        let cause = tree.add_node(effect, "Worn Pads", NodeKind::Cause).unwrap();
        tree.update_rating(cause, RatingField::Detection, 3).unwrap();

        let subsystem = tree.details(brakes).unwrap();
        assert_eq!(subsystem.name, "Brakes");
        assert_eq!(subsystem.severity, None);
        assert_eq!(subsystem.rpn, None);

        let effect_details = tree.details(effect).unwrap();
        assert_eq!(effect_details.severity, Some(1));
        assert_eq!(effect_details.occurrence, None);

        let cause_details = tree.details(cause).unwrap();
        assert_eq!(cause_details.occurrence, Some(1));
        assert_eq!(cause_details.detection, Some(3));
        assert_eq!(cause_details.severity, None);

        let failure_details = tree.details(failure).unwrap();
        assert_eq!(failure_details.rpn, Some(3));
    }
}

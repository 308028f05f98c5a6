//! Node identity, kinds, ratings, and the node record itself.
//!
//! A node is one of six fixed shapes. The shape fixes both the semantics of
//! the node and the set of rating fields it carries, so invalid field access
//! is unrepresentable rather than checked at runtime.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable, process-unique identifier of a node.
///
/// Assigned when the node is created and never reused, even after the node
/// has been removed. Looking a stale identifier up fails explicitly instead
/// of resolving to an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Allocates a fresh identifier.
    pub(crate) fn allocate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed set of node kinds.
///
/// A node's kind is immutable after creation and constrains which kinds may
/// nest beneath it (see [`NodeKind::allowed_children`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// The root of the hierarchy. Exactly one exists per tree.
    System,
    /// A physical or logical subdivision of the system.
    SubSystem,
    /// Something a system or subsystem is meant to do.
    Function,
    /// A way a function can fail. Carries the derived risk priority number.
    Failure,
    /// A consequence of a failure. Rated by severity.
    Effect,
    /// A root cause of an effect. Rated by occurrence and detection.
    Cause,
}

impl NodeKind {
    /// The kinds that may be nested directly under a node of this kind.
    ///
    /// Empty for [`NodeKind::Cause`], which is always a leaf.
    #[must_use]
    pub const fn allowed_children(self) -> &'static [Self] {
        match self {
            Self::System | Self::SubSystem => &[Self::SubSystem, Self::Function],
            Self::Function => &[Self::Failure],
            Self::Failure => &[Self::Effect],
            Self::Effect => &[Self::Cause],
            Self::Cause => &[],
        }
    }

    /// Whether a child of kind `child` may be nested under this kind.
    #[must_use]
    pub fn can_contain(self, child: Self) -> bool {
        self.allowed_children().contains(&child)
    }

    /// The display name of the kind, e.g. `"SubSystem"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::SubSystem => "SubSystem",
            Self::Function => "Function",
            Self::Failure => "Failure",
            Self::Effect => "Effect",
            Self::Cause => "Cause",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised node kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node kind: {0:?}")]
pub struct UnknownKindError(String);

impl FromStr for NodeKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "System" => Ok(Self::System),
            "SubSystem" => Ok(Self::SubSystem),
            "Function" => Ok(Self::Function),
            "Failure" => Ok(Self::Failure),
            "Effect" => Ok(Self::Effect),
            "Cause" => Ok(Self::Cause),
            other => Err(UnknownKindError(other.to_string())),
        }
    }
}

/// Error returned when a rating value falls outside `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating {value} is outside the valid range 1..=10")]
pub struct RatingOutOfRange {
    /// The rejected value.
    pub value: u8,
}

/// A severity, occurrence, or detection rating, validated to `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    /// The lowest rating. Newly created nodes start here.
    pub const MIN: Self = Self(1);

    /// The highest rating.
    pub const MAX: Self = Self(10);

    /// Creates a rating from a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`RatingOutOfRange`] if `value` is not in `1..=10`.
    pub const fn new(value: u8) -> Result<Self, RatingOutOfRange> {
        if value >= Self::MIN.0 && value <= Self::MAX.0 {
            Ok(Self(value))
        } else {
            Err(RatingOutOfRange { value })
        }
    }

    /// The raw value, in `1..=10`.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind-specific payload of a node.
///
/// One shape per [`NodeKind`], carrying only the fields valid for that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attributes {
    /// No payload.
    System,
    /// No payload.
    SubSystem,
    /// No payload.
    Function,
    /// The derived risk priority number.
    Failure {
        /// `max(severity × occurrence × detection)` over all effect/cause
        /// pairs below the failure, or `None` while no such pair exists.
        /// Derived; never set by callers.
        rpn: Option<u16>,
    },
    /// Severity of the effect.
    Effect {
        /// How bad the effect is when it happens.
        severity: Rating,
    },
    /// Occurrence and detection of the cause.
    Cause {
        /// How likely the cause is to arise.
        occurrence: Rating,
        /// How likely the cause is to evade detection before failure.
        detection: Rating,
    },
}

impl Attributes {
    /// The default payload for a node of the given kind.
    ///
    /// Ratings start at [`Rating::MIN`]; a failure's RPN starts undefined.
    #[must_use]
    pub const fn new(kind: NodeKind) -> Self {
        match kind {
            NodeKind::System => Self::System,
            NodeKind::SubSystem => Self::SubSystem,
            NodeKind::Function => Self::Function,
            NodeKind::Failure => Self::Failure { rpn: None },
            NodeKind::Effect => Self::Effect {
                severity: Rating::MIN,
            },
            NodeKind::Cause => Self::Cause {
                occurrence: Rating::MIN,
                detection: Rating::MIN,
            },
        }
    }

    /// The kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::System => NodeKind::System,
            Self::SubSystem => NodeKind::SubSystem,
            Self::Function => NodeKind::Function,
            Self::Failure { .. } => NodeKind::Failure,
            Self::Effect { .. } => NodeKind::Effect,
            Self::Cause { .. } => NodeKind::Cause,
        }
    }
}

/// A single node in the hierarchy.
///
/// Nodes are created, mutated, and destroyed only through
/// [`FmeaTree`](crate::domain::FmeaTree) operations; this type exposes
/// read-only accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// User-editable label. Never empty.
    pub(crate) name: NonEmptyString,
    /// Kind-specific payload.
    pub(crate) attributes: Attributes,
    /// When the node was created.
    pub(crate) created: DateTime<Utc>,
    /// The owning node, or `None` for the root.
    pub(crate) parent: Option<NodeId>,
    /// Child identifiers in insertion order.
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(name: NonEmptyString, attributes: Attributes, parent: Option<NodeId>) -> Self {
        Self {
            name,
            attributes,
            created: Utc::now(),
            parent,
            children: Vec::new(),
        }
    }

    /// The node's label.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The node's kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.attributes.kind()
    }

    /// The kind-specific payload.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// When the node was created.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// The owning node's identifier, or `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child identifiers in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The severity rating, if this is an effect node.
    #[must_use]
    pub const fn severity(&self) -> Option<Rating> {
        match self.attributes {
            Attributes::Effect { severity } => Some(severity),
            _ => None,
        }
    }

    /// The occurrence rating, if this is a cause node.
    #[must_use]
    pub const fn occurrence(&self) -> Option<Rating> {
        match self.attributes {
            Attributes::Cause { occurrence, .. } => Some(occurrence),
            _ => None,
        }
    }

    /// The detection rating, if this is a cause node.
    #[must_use]
    pub const fn detection(&self) -> Option<Rating> {
        match self.attributes {
            Attributes::Cause { detection, .. } => Some(detection),
            _ => None,
        }
    }

    /// The derived risk priority number, if this is a failure node with at
    /// least one rated effect/cause pair below it.
    #[must_use]
    pub const fn rpn(&self) -> Option<u16> {
        match self.attributes {
            Attributes::Failure { rpn } => rpn,
            _ => None,
        }
    }
}

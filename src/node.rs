//! The editable display tree data model.
//!
//! The tree is a plain hierarchy of owned nodes,
//! independent of any widget toolkit,
//! so that building and reduction can be exercised headlessly.

use dicom_core::PrimitiveValue;

/// A single node of the editable display tree.
///
/// Leaf nodes represent plain data elements.
/// A node with VR text `"SQ"` and an empty value text
/// is a sequence container;
/// its children are sequence item containers
/// (value text holding the 1-based item ordinal),
/// whose own children are the item's elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayNode {
    /// Canonical tag text, in the `(GGGG,EEEE)` form.
    pub tag_text: String,
    /// Display name of the attribute.
    pub name: String,
    /// The editable value text.
    /// Empty for sequence containers
    /// and for values which cannot be edited as text.
    pub value_text: String,
    /// The two-letter value representation code,
    /// or empty when the node has no determinable type.
    pub vr_text: String,
    /// Dictionary keyword of the attribute, or empty when unknown.
    pub keyword: String,
    /// Child nodes, in display order.
    pub children: Vec<DisplayNode>,
    /// Opaque payload carried through the edit session untouched.
    /// Never exposed for text editing.
    pub(crate) binary: Option<PrimitiveValue>,
}

impl DisplayNode {
    /// Create a node with the given header texts,
    /// no value and no children.
    pub fn new(
        tag_text: impl Into<String>,
        name: impl Into<String>,
        vr_text: impl Into<String>,
        keyword: impl Into<String>,
    ) -> Self {
        DisplayNode {
            tag_text: tag_text.into(),
            name: name.into(),
            vr_text: vr_text.into(),
            keyword: keyword.into(),
            ..DisplayNode::default()
        }
    }

    /// Set the value text of this node.
    pub fn with_value(mut self, value_text: impl Into<String>) -> Self {
        self.value_text = value_text.into();
        self
    }

    /// Stash an opaque payload to be written back as-is on reduction.
    pub(crate) fn with_binary(mut self, payload: PrimitiveValue) -> Self {
        self.binary = Some(payload);
        self
    }

    /// The opaque payload carried by this node, if any.
    pub fn binary_value(&self) -> Option<&PrimitiveValue> {
        self.binary.as_ref()
    }

    /// Whether this node is a sequence container.
    pub fn is_sequence(&self) -> bool {
        self.vr_text == "SQ" && self.value_text.is_empty()
    }

    /// Whether this node is a sequence item container.
    pub fn is_sequence_item(&self) -> bool {
        self.vr_text == "SQ" && !self.value_text.is_empty()
    }
}

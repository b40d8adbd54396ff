//! Building an editable display tree from a DICOM data set.
//!
//! This is a pure structural transform:
//! every element becomes one leaf node,
//! every sequence becomes a container
//! with one ordinal item container per nested data set,
//! and the source data set is never mutated.

use dicom_core::dictionary::{DataDictionary, DataDictionaryEntry};
use dicom_core::header::Header;
use dicom_core::DicomValue;
use dicom_object::mem::{InMemDicomObject, InMemElement};
use dicom_object::StandardDataDictionary;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::node::DisplayNode;
use crate::value::{format_value, VrClass};

/// Fallback display name for attributes unknown to the dictionary.
pub(crate) const UNKNOWN_ATTRIBUTE: &str = "«Unknown Attribute»";

/// Build the display tree of the given data set.
///
/// Returns the top-level sibling nodes in data set order,
/// together with the diagnostics gathered along the way.
/// Building twice from the same data set yields identical trees.
pub fn dataset_to_tree<D>(obj: &InMemDicomObject<D>) -> (Vec<DisplayNode>, Diagnostics)
where
    D: DataDictionary + Clone,
{
    let mut diagnostics = Diagnostics::new();
    let nodes = build_nodes(obj, &mut diagnostics);
    (nodes, diagnostics)
}

fn build_nodes<D>(obj: &InMemDicomObject<D>, diagnostics: &mut Diagnostics) -> Vec<DisplayNode>
where
    D: DataDictionary + Clone,
{
    obj.into_iter()
        .map(|e| node_from_element(e, diagnostics))
        .collect()
}

/// Build the display node of a single data element,
/// recursing into sequence items.
pub fn node_from_element<D>(elem: &InMemElement<D>, diagnostics: &mut Diagnostics) -> DisplayNode
where
    D: DataDictionary + Clone,
{
    let tag = elem.tag();
    let vr = elem.vr();
    let alias = StandardDataDictionary
        .by_tag(tag)
        .map(DataDictionaryEntry::alias);
    let mut node = DisplayNode::new(
        tag.to_string(),
        alias.unwrap_or(UNKNOWN_ATTRIBUTE),
        vr.to_string(),
        alias.unwrap_or_default(),
    );

    match elem.value() {
        DicomValue::Sequence(seq) => {
            for (index, item) in seq.items().iter().enumerate() {
                let mut item_node = DisplayNode::new(
                    node.tag_text.clone(),
                    node.name.clone(),
                    node.vr_text.clone(),
                    node.keyword.clone(),
                )
                .with_value((index + 1).to_string());
                item_node.children = build_nodes(item, diagnostics);
                node.children.push(item_node);
            }
        }
        DicomValue::PixelSequence(_) => {
            diagnostics.push(Diagnostic::MalformedNode {
                tag,
                reason: "encapsulated pixel data cannot be edited as text",
            });
        }
        DicomValue::Primitive(value) => {
            if VrClass::of(vr) == VrClass::Binary {
                // opaque payloads are stashed for write-back, not inlined
                diagnostics.push(Diagnostic::BinaryValueNotEditable { tag, vr });
                node = node.with_binary(value.clone());
            } else {
                node = node.with_value(format_value(value));
            }
        }
    }
    node
}

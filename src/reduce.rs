//! Rebuilding a DICOM data set from an edited display tree.
//!
//! Reduction walks one sibling list at a time,
//! threading an explicit private block accumulator through it:
//! a creator declaration at offset `0x10` establishes the block
//! that subsequent private data elements of the group are placed into,
//! a public tag closes it,
//! and every sequence item starts from a clean scope.
//! A block must be declared before its elements;
//! the reducer enforces this rather than trusting tree edit order.

use std::str::FromStr;

use dicom_core::dictionary::DataDictionary;
use dicom_core::value::Value;
use dicom_core::{PrimitiveValue, Tag, VR};
use dicom_object::mem::{InMemDicomObject, InMemElement};
use dicom_object::StandardDataDictionary;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::node::DisplayNode;
use crate::private::{find_or_create_block, private_creators, PrivateBlock};
use crate::tag::parse_tag;
use crate::value::{cast_value, VrClass};

/// The element number slot declaring a private creator within its block.
const CREATOR_SLOT: u8 = 0x10;

/// Rebuild a data set from the given sibling display nodes,
/// using the standard dictionary.
pub fn tree_to_dataset(
    nodes: &[DisplayNode],
) -> (InMemDicomObject<StandardDataDictionary>, Diagnostics) {
    tree_to_dataset_with_dict(nodes, StandardDataDictionary)
}

/// Rebuild a data set from the given sibling display nodes,
/// with the given dictionary.
pub fn tree_to_dataset_with_dict<D>(
    nodes: &[DisplayNode],
    dict: D,
) -> (InMemDicomObject<D>, Diagnostics)
where
    D: DataDictionary + Clone,
{
    let mut diagnostics = Diagnostics::new();
    let mut obj = InMemDicomObject::new_empty_with_dict(dict.clone());
    reduce_into(&mut obj, nodes, &dict, &mut diagnostics);
    (obj, diagnostics)
}

fn reduce_into<D>(
    obj: &mut InMemDicomObject<D>,
    nodes: &[DisplayNode],
    dict: &D,
    diagnostics: &mut Diagnostics,
) where
    D: DataDictionary + Clone,
{
    let mut current_block: Option<PrivateBlock> = None;

    for node in nodes {
        let tag = match parse_tag(&node.tag_text) {
            Ok(tag) => tag,
            Err(e) => {
                tracing::warn!("skipping node: {}", e);
                diagnostics.push(Diagnostic::MalformedTag {
                    text: node.tag_text.clone(),
                });
                continue;
            }
        };

        if tag.group() % 2 == 0 {
            // a private block's scope never crosses a public tag
            current_block = None;
        } else if tag.element() & 0xFF == u16::from(CREATOR_SLOT) {
            // a creator declaration is consumed by the resolver;
            // it emits no data element of its own
            current_block = match find_or_create_block(obj, tag.group(), &node.value_text) {
                Ok(block) => Some(block),
                Err(e) => {
                    tracing::warn!("cannot establish private block for {}: {}", tag, e);
                    diagnostics.push(Diagnostic::PrivateBlockExhausted {
                        group: tag.group(),
                        creator: node.value_text.trim().to_string(),
                    });
                    None
                }
            };
            continue;
        }

        if node.vr_text.is_empty() {
            // without a VR there is no point in encoding
            tracing::debug!("node {} has no VR, skipping", node.tag_text);
            continue;
        }
        let vr = match VR::from_str(&node.vr_text) {
            Ok(vr) => vr,
            Err(_) => {
                diagnostics.push(Diagnostic::UnknownVr {
                    tag,
                    text: node.vr_text.clone(),
                });
                continue;
            }
        };

        if vr == VR::SQ {
            let mut items: Vec<InMemDicomObject<D>> = Vec::with_capacity(node.children.len());
            for child in &node.children {
                if !child.is_sequence_item() {
                    diagnostics.push(Diagnostic::MalformedNode {
                        tag,
                        reason: "sequence child is not an item container",
                    });
                    continue;
                }
                // fresh private scope per nested data set
                let mut item = InMemDicomObject::new_empty_with_dict(dict.clone());
                reduce_into(&mut item, &child.children, dict, diagnostics);
                items.push(item);
            }
            obj.put(InMemElement::new(tag, VR::SQ, Value::Sequence(items.into())));
            continue;
        }

        let Some(value) = leaf_value(node, tag, vr, diagnostics) else {
            continue;
        };

        if tag.group() % 2 == 1 {
            place_private(obj, tag, vr, value, &mut current_block, diagnostics);
        } else {
            obj.put(InMemElement::new(tag, vr, value));
        }
    }
}

/// Produce the primitive value of a leaf node,
/// or `None` when the element must be omitted.
fn leaf_value(
    node: &DisplayNode,
    tag: Tag,
    vr: VR,
    diagnostics: &mut Diagnostics,
) -> Option<PrimitiveValue> {
    if VrClass::of(vr) == VrClass::Binary {
        // opaque payloads travel by reference, never through text
        return Some(node.binary_value().cloned().unwrap_or(PrimitiveValue::Empty));
    }
    match cast_value(&node.value_text, vr) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("cannot cast value of {}: {}", tag, e);
            diagnostics.push(Diagnostic::ValueCast {
                tag,
                text: node.value_text.clone(),
                vr,
            });
            if node.value_text.starts_with('[') {
                // all-or-nothing for multi-valued text
                None
            } else {
                // a failed scalar cast degrades to an empty value
                Some(PrimitiveValue::Empty)
            }
        }
    }
}

/// Place a private data element through the current block,
/// or through the group's only known creator when the declaration
/// was not seen in pass order.
fn place_private<D>(
    obj: &mut InMemDicomObject<D>,
    tag: Tag,
    vr: VR,
    value: PrimitiveValue,
    current_block: &mut Option<PrivateBlock>,
    diagnostics: &mut Diagnostics,
) where
    D: DataDictionary + Clone,
{
    let group = tag.group();
    let offset = (tag.element() & 0xFF) as u8;

    if let Some(block) = current_block {
        block.put(obj, offset, vr, value);
        return;
    }

    tracing::warn!(
        "private element ({:04X},xx{:02X}) found with no private block parent",
        group,
        offset
    );
    let creators = private_creators(obj, group);
    let [(_, creator)] = creators.as_slice() else {
        diagnostics.push(Diagnostic::UnresolvedPrivateElement { group, offset });
        return;
    };
    let creator = creator.clone();
    match find_or_create_block(obj, group, &creator) {
        Ok(block) => {
            diagnostics.push(Diagnostic::RecoveredPrivateElement {
                group,
                offset,
                creator,
            });
            block.put(obj, offset, vr, value);
            *current_block = Some(block);
        }
        Err(e) => {
            tracing::warn!("cannot bind private element {}: {}", tag, e);
            diagnostics.push(Diagnostic::UnresolvedPrivateElement { group, offset });
        }
    }
}

#[cfg(test)]
mod tests {
    use dicom_core::{dicom_value, PrimitiveValue, Tag};
    use dicom_dictionary_std::tags;
    use pretty_assertions::assert_eq;

    use crate::node::DisplayNode;

    use super::*;

    fn leaf(tag: &str, vr: &str, value: &str) -> DisplayNode {
        DisplayNode::new(tag, "", vr, "").with_value(value)
    }

    #[test]
    fn reduces_plain_leaves() {
        let nodes = vec![
            leaf("(0008,0060)", "CS", "OT"),
            leaf("(0028,0002)", "US", "3"),
        ];
        let (obj, diagnostics) = tree_to_dataset(&nodes);
        assert!(diagnostics.is_empty());
        assert_eq!(
            obj.element(tags::MODALITY)
                .unwrap()
                .value()
                .to_str()
                .unwrap(),
            "OT"
        );
        assert_eq!(
            obj.element(tags::SAMPLES_PER_PIXEL).unwrap().value().primitive(),
            Some(&dicom_value!(U16, [3]))
        );
    }

    #[test]
    fn creator_declaration_establishes_a_block() {
        let nodes = vec![
            leaf("(0009,0010)", "LO", "ACME"),
            leaf("(0009,1001)", "CS", "X"),
        ];
        let (obj, diagnostics) = tree_to_dataset(&nodes);
        assert!(diagnostics.is_empty());
        // the declaration node produced only the creator element
        assert_eq!(
            obj.element(Tag(0x0009, 0x0010))
                .unwrap()
                .value()
                .to_str()
                .unwrap(),
            "ACME"
        );
        assert_eq!(
            obj.element(Tag(0x0009, 0x1001)).unwrap().value().primitive(),
            Some(&dicom_value!(Strs, ["X"]))
        );
        assert_eq!(obj.into_iter().count(), 2);
    }

    #[test]
    fn private_elements_without_any_creator_are_dropped() {
        let nodes = vec![
            leaf("(0009,1001)", "CS", "X"),
            leaf("(0010,0010)", "PN", "Doe^John"),
        ];
        let (obj, diagnostics) = tree_to_dataset(&nodes);
        // the reduction continues normally for the sibling
        assert!(obj.element(tags::PATIENT_NAME).is_ok());
        assert!(obj.element(Tag(0x0009, 0x1001)).is_err());
        assert_eq!(
            diagnostics.iter().collect::<Vec<_>>(),
            vec![&Diagnostic::UnresolvedPrivateElement {
                group: 0x0009,
                offset: 0x01
            }]
        );
    }

    #[test]
    fn the_only_known_creator_recovers_out_of_order_elements() {
        let nodes = vec![
            leaf("(0009,0010)", "LO", "ACME"),
            // the public tag closes the private scope
            leaf("(0010,0010)", "PN", "Doe^John"),
            leaf("(0009,1002)", "SH", "LOT42"),
        ];
        let (obj, diagnostics) = tree_to_dataset(&nodes);
        assert_eq!(
            obj.element(Tag(0x0009, 0x1002))
                .unwrap()
                .value()
                .to_str()
                .unwrap(),
            "LOT42"
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::RecoveredPrivateElement { .. })
        ));
    }

    #[test]
    fn ambiguous_creators_drop_the_element() {
        let nodes = vec![
            leaf("(0009,0010)", "LO", "VENDOR A"),
            // low byte 0x10 also reads as a declaration slot
            leaf("(0009,1110)", "LO", "VENDOR B"),
            leaf("(0010,0010)", "PN", "Doe^John"),
            leaf("(0009,1001)", "CS", "X"),
        ];
        let (obj, diagnostics) = tree_to_dataset(&nodes);
        assert!(obj.element(Tag(0x0009, 0x1001)).is_err());
        assert_eq!(
            diagnostics.iter().collect::<Vec<_>>(),
            vec![&Diagnostic::UnresolvedPrivateElement {
                group: 0x0009,
                offset: 0x01
            }]
        );
        // both creators were established
        assert!(obj.element(Tag(0x0009, 0x0010)).is_ok());
        assert!(obj.element(Tag(0x0009, 0x0011)).is_ok());
    }

    #[test]
    fn malformed_tags_skip_only_the_offending_node() {
        let nodes = vec![
            leaf("garbage", "CS", "X"),
            leaf("(0008,0060)", "CS", "OT"),
        ];
        let (obj, diagnostics) = tree_to_dataset(&nodes);
        assert_eq!(obj.into_iter().count(), 1);
        assert_eq!(
            diagnostics.iter().collect::<Vec<_>>(),
            vec![&Diagnostic::MalformedTag {
                text: "garbage".to_string()
            }]
        );
    }

    #[test]
    fn failed_list_casts_omit_the_element() {
        let nodes = vec![leaf("(0020,0032)", "DS", "[a,b]")];
        let (obj, diagnostics) = tree_to_dataset(&nodes);
        assert_eq!(obj.into_iter().count(), 0);
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::ValueCast { .. })
        ));
    }

    #[test]
    fn failed_scalar_casts_degrade_to_an_empty_value() {
        let nodes = vec![leaf("(0028,0002)", "US", "abc")];
        let (obj, diagnostics) = tree_to_dataset(&nodes);
        let elem = obj.element(tags::SAMPLES_PER_PIXEL).unwrap();
        assert_eq!(elem.value().primitive(), Some(&PrimitiveValue::Empty));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn nodes_without_a_vr_are_skipped() {
        let nodes = vec![
            leaf("(0008,0060)", "", "OT"),
            leaf("(0008,0061)", "XY", "OT"),
        ];
        let (obj, diagnostics) = tree_to_dataset(&nodes);
        assert_eq!(obj.into_iter().count(), 0);
        // only the unknown VR is reported
        assert_eq!(
            diagnostics.iter().collect::<Vec<_>>(),
            vec![&Diagnostic::UnknownVr {
                tag: Tag(0x0008, 0x0061),
                text: "XY".to_string()
            }]
        );
    }

    #[test]
    fn sequence_items_reduce_in_order_with_fresh_private_scope() {
        let mut seq = DisplayNode::new("(0040,0260)", "", "SQ", "");
        let mut item = DisplayNode::new("(0040,0260)", "", "SQ", "").with_value("1");
        // no declaration inside the item: the outer block must not leak in
        item.children.push(leaf("(0009,1001)", "CS", "X"));
        seq.children.push(item);

        let nodes = vec![leaf("(0009,0010)", "LO", "ACME"), seq];
        let (obj, diagnostics) = tree_to_dataset(&nodes);

        let seq_elem = obj.element(Tag(0x0040, 0x0260)).unwrap();
        let items = seq_elem.value().items().unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].element(Tag(0x0009, 0x1001)).is_err());
        assert_eq!(
            diagnostics.iter().collect::<Vec<_>>(),
            vec![&Diagnostic::UnresolvedPrivateElement {
                group: 0x0009,
                offset: 0x01
            }]
        );
    }
}

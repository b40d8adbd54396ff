//! Headless edit operations over sibling node lists.
//!
//! These mirror the add and delete flows of an interactive editor
//! while staying independent of any widget toolkit:
//! new elements are inserted as display nodes
//! with the sibling list kept in tag order,
//! private data elements pull in their creator declaration when missing,
//! and a creator declaration cannot be removed
//! while its block still has elements.

use dicom_core::dictionary::DataDictionary;
use dicom_core::header::GroupNumber;
use dicom_core::{Tag, VR};
use dicom_object::mem::InMemElement;
use snafu::{ensure, Snafu};

use crate::build::{node_from_element, UNKNOWN_ATTRIBUTE};
use crate::diagnostics::Diagnostics;
use crate::node::DisplayNode;
use crate::private::PrivateBlockError;
use crate::tag::{format_tag, parse_tag};

/// An error removing a node from a sibling list.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum RemoveError {
    /// The index is past the end of the sibling list.
    #[snafu(display("No node at index {} (the list has {})", index, len))]
    OutOfBounds { index: usize, len: usize },
    /// The node is a creator declaration whose block still has elements.
    #[snafu(display(
        "Private block {:02X} of group {:#06X} still has elements",
        block,
        group
    ))]
    BlockInUse { group: GroupNumber, block: u8 },
}

/// Insert a new element among the siblings, in tag order.
pub fn insert_element<D>(
    siblings: &mut Vec<DisplayNode>,
    elem: &InMemElement<D>,
    diagnostics: &mut Diagnostics,
) where
    D: DataDictionary + Clone,
{
    let node = node_from_element(elem, diagnostics);
    insert_node(siblings, node);
}

/// Insert a private data element node,
/// declaring its creator first
/// when no declaration node for it exists among the siblings.
///
/// The block number is resolved against the declaration nodes
/// already present,
/// the same way the reducer resolves blocks against a data set.
pub fn insert_private_element(
    siblings: &mut Vec<DisplayNode>,
    group: GroupNumber,
    creator: &str,
    offset: u8,
    vr: VR,
    value_text: &str,
) -> Result<(), PrivateBlockError> {
    if group % 2 == 0 {
        return Err(PrivateBlockError::InvalidGroup { group });
    }
    let creator = creator.trim();
    if creator.is_empty() {
        return Err(PrivateBlockError::EmptyCreator);
    }

    let declarations = declaration_slots(siblings, group);
    let block = declarations
        .iter()
        .find(|(_, name)| name == creator)
        .map(|(slot, _)| *slot);
    let block = match block {
        Some(block) => block,
        None => {
            let Some(free) =
                (0x10..=0xFF_u8).find(|slot| !declarations.iter().any(|(s, _)| s == slot))
            else {
                return Err(PrivateBlockError::NoSpace { group });
            };
            insert_node(
                siblings,
                DisplayNode::new(
                    format_tag(Tag(group, u16::from(free))),
                    UNKNOWN_ATTRIBUTE,
                    "LO",
                    "",
                )
                .with_value(creator),
            );
            free
        }
    };

    let tag = Tag(group, (u16::from(block) << 8) | u16::from(offset));
    insert_node(
        siblings,
        DisplayNode::new(format_tag(tag), UNKNOWN_ATTRIBUTE, vr.to_string(), "")
            .with_value(value_text),
    );
    Ok(())
}

/// Remove and return the node at `index`,
/// refusing to remove a creator declaration
/// while a sibling still carries a data element of its block.
pub fn remove_element(
    siblings: &mut Vec<DisplayNode>,
    index: usize,
) -> Result<DisplayNode, RemoveError> {
    ensure!(
        index < siblings.len(),
        OutOfBoundsSnafu {
            index,
            len: siblings.len()
        }
    );
    if let Ok(tag) = parse_tag(&siblings[index].tag_text) {
        let elem = tag.element();
        if tag.group() % 2 == 1 && (0x0010..=0x00FF).contains(&elem) {
            let block = elem as u8;
            let in_use = siblings.iter().enumerate().any(|(i, n)| {
                i != index
                    && parse_tag(&n.tag_text)
                        .map(|t| t.group() == tag.group() && (t.element() >> 8) as u8 == block)
                        .unwrap_or(false)
            });
            ensure!(
                !in_use,
                BlockInUseSnafu {
                    group: tag.group(),
                    block
                }
            );
        }
    }
    Ok(siblings.remove(index))
}

fn insert_node(siblings: &mut Vec<DisplayNode>, node: DisplayNode) {
    // canonical tag text sorts like the tag itself
    let at = siblings.partition_point(|n| n.tag_text <= node.tag_text);
    siblings.insert(at, node);
}

fn declaration_slots(siblings: &[DisplayNode], group: GroupNumber) -> Vec<(u8, String)> {
    let mut slots = Vec::new();
    for node in siblings {
        if let Ok(tag) = parse_tag(&node.tag_text) {
            if tag.group() == group && (0x0010..=0x00FF).contains(&tag.element()) {
                let name = node.value_text.trim();
                if !name.is_empty() {
                    slots.push((tag.element() as u8, name.to_string()));
                }
            }
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use dicom_core::{PrimitiveValue, VR};
    use dicom_dictionary_std::tags;
    use dicom_object::mem::InMemElement;
    use pretty_assertions::assert_eq;

    use super::*;

    fn leaf(tag: &str, vr: &str, value: &str) -> DisplayNode {
        DisplayNode::new(tag, "", vr, "").with_value(value)
    }

    #[test]
    fn inserted_elements_keep_the_siblings_in_tag_order() {
        let mut siblings = vec![
            leaf("(0008,0060)", "CS", "OT"),
            leaf("(0020,0013)", "IS", "5"),
        ];
        let elem: InMemElement =
            InMemElement::new(tags::PATIENT_NAME, VR::PN, PrimitiveValue::from("Doe^John"));
        let mut diagnostics = Diagnostics::new();
        insert_element(&mut siblings, &elem, &mut diagnostics);
        assert!(diagnostics.is_empty());
        let tags: Vec<_> = siblings.iter().map(|n| n.tag_text.as_str()).collect();
        assert_eq!(tags, ["(0008,0060)", "(0010,0010)", "(0020,0013)"]);
    }

    #[test]
    fn private_insert_declares_the_creator_once() {
        let mut siblings = vec![leaf("(0008,0060)", "CS", "OT")];
        insert_private_element(&mut siblings, 0x0009, "ACME", 0x01, VR::CS, "X").unwrap();
        insert_private_element(&mut siblings, 0x0009, "ACME", 0x02, VR::SH, "LOT42").unwrap();

        let tags: Vec<_> = siblings.iter().map(|n| n.tag_text.as_str()).collect();
        assert_eq!(
            tags,
            ["(0008,0060)", "(0009,0010)", "(0009,1001)", "(0009,1002)"]
        );
        assert_eq!(siblings[1].value_text, "ACME");
        assert_eq!(siblings[2].value_text, "X");
    }

    #[test]
    fn a_second_creator_claims_the_next_slot() {
        let mut siblings = Vec::new();
        insert_private_element(&mut siblings, 0x0009, "VENDOR A", 0x01, VR::CS, "X").unwrap();
        insert_private_element(&mut siblings, 0x0009, "VENDOR B", 0x01, VR::CS, "Y").unwrap();

        let tags: Vec<_> = siblings.iter().map(|n| n.tag_text.as_str()).collect();
        assert_eq!(
            tags,
            ["(0009,0010)", "(0009,0011)", "(0009,1001)", "(0009,1101)"]
        );
    }

    #[test]
    fn rejects_even_groups() {
        let mut siblings = Vec::new();
        assert_eq!(
            insert_private_element(&mut siblings, 0x0008, "ACME", 0x01, VR::CS, "X"),
            Err(PrivateBlockError::InvalidGroup { group: 0x0008 })
        );
    }

    #[test]
    fn creator_declarations_in_use_cannot_be_removed() {
        let mut siblings = Vec::new();
        insert_private_element(&mut siblings, 0x0009, "ACME", 0x01, VR::CS, "X").unwrap();

        // index 0 is the declaration, index 1 the data element
        assert_eq!(
            remove_element(&mut siblings, 0),
            Err(RemoveError::BlockInUse {
                group: 0x0009,
                block: 0x10
            })
        );

        let removed = remove_element(&mut siblings, 1).unwrap();
        assert_eq!(removed.tag_text, "(0009,1001)");
        // with the block empty, the declaration can go as well
        assert!(remove_element(&mut siblings, 0).is_ok());
        assert!(siblings.is_empty());
    }

    #[test]
    fn out_of_bounds_removals_are_reported() {
        let mut siblings = vec![leaf("(0008,0060)", "CS", "OT")];
        assert_eq!(
            remove_element(&mut siblings, 3),
            Err(RemoveError::OutOfBounds { index: 3, len: 1 })
        );
    }
}

//! Private block bookkeeping against a destination data set.
//!
//! A private element is only meaningful relative to a creator
//! declared in the reserved slots `(gggg,0010)` to `(gggg,00FF)`
//! of its odd-numbered group.
//! The slot number becomes the block number:
//! the upper byte of every element number owned by that creator.
//! A block must be declared before its elements are placed,
//! and it is only valid against the data set it was established in.

use dicom_core::dictionary::DataDictionary;
use dicom_core::header::{GroupNumber, Header};
use dicom_core::{DicomValue, PrimitiveValue, Tag, VR};
use dicom_object::mem::{InMemDicomObject, InMemElement};
use snafu::{ensure, Snafu};

use crate::value::whitespace_or_null;

/// An error establishing a private block in a data set.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum PrivateBlockError {
    /// The group number is not odd.
    #[snafu(display("Group number must be odd, found {:#06X}", group))]
    InvalidGroup { group: GroupNumber },
    /// The creator name is empty.
    #[snafu(display("Private creator must not be empty"))]
    EmptyCreator,
    /// All creator slots of the group are taken.
    #[snafu(display("No space available in group {:#06X}", group))]
    NoSpace { group: GroupNumber },
}

/// A resolved private block:
/// the association between an odd group, a creator name,
/// and the block number reserved by the creator's slot.
///
/// Blocks are transient.
/// They are established against one destination data set
/// and are not meaningful beyond it.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivateBlock {
    group: GroupNumber,
    creator: String,
    block: u8,
}

impl PrivateBlock {
    /// The odd group number owning this block.
    pub fn group(&self) -> GroupNumber {
        self.group
    }

    /// The creator this block was reserved for.
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// The block number, in `0x10..=0xFF`.
    pub fn block(&self) -> u8 {
        self.block
    }

    /// The full tag of the element
    /// at the given byte offset of this block.
    pub fn tag_of(&self, offset: u8) -> Tag {
        Tag(self.group, (u16::from(self.block) << 8) | u16::from(offset))
    }

    /// Place a data element at the given byte offset of this block.
    pub fn put<D>(
        &self,
        obj: &mut InMemDicomObject<D>,
        offset: u8,
        vr: VR,
        value: PrimitiveValue,
    ) where
        D: DataDictionary + Clone,
    {
        obj.put(InMemElement::new(self.tag_of(offset), vr, value));
    }
}

/// Enumerate the creators declared in the given group,
/// as `(block number, creator name)` pairs in slot order.
pub fn private_creators<D>(obj: &InMemDicomObject<D>, group: GroupNumber) -> Vec<(u8, String)>
where
    D: DataDictionary + Clone,
{
    let mut creators = Vec::new();
    for e in obj {
        let tag = e.tag();
        if tag.group() != group || !(0x0010..=0x00FF).contains(&tag.element()) {
            continue;
        }
        if let DicomValue::Primitive(value) = e.value() {
            let name = value.to_str();
            let name = name.trim_end_matches(whitespace_or_null);
            if !name.is_empty() {
                creators.push((tag.element() as u8, name.to_string()));
            }
        }
    }
    creators
}

/// Find the block reserved for `creator` in `group`,
/// or reserve the lowest free slot
/// and write the creator declaration element.
pub fn find_or_create_block<D>(
    obj: &mut InMemDicomObject<D>,
    group: GroupNumber,
    creator: &str,
) -> Result<PrivateBlock, PrivateBlockError>
where
    D: DataDictionary + Clone,
{
    ensure!(group % 2 == 1, InvalidGroupSnafu { group });
    let creator = creator.trim();
    ensure!(!creator.is_empty(), EmptyCreatorSnafu);

    for (block, name) in private_creators(obj, group) {
        if name == creator {
            return Ok(PrivateBlock {
                group,
                creator: name,
                block,
            });
        }
    }

    for slot in 0x10..=0xFF_u16 {
        let tag = Tag(group, slot);
        if obj.element(tag).is_ok() {
            continue;
        }
        obj.put(InMemElement::new(
            tag,
            VR::LO,
            PrimitiveValue::Strs(vec![creator.to_string()].into()),
        ));
        return Ok(PrivateBlock {
            group,
            creator: creator.to_string(),
            block: slot as u8,
        });
    }
    NoSpaceSnafu { group }.fail()
}

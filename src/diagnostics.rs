//! Diagnostics reported by tree building and reduction.
//!
//! Node-level faults never abort a whole build or reduce pass:
//! they are isolated to the offending subtree
//! and recorded in a [`Diagnostics`] collector
//! returned alongside the result,
//! so a caller may surface them as warnings
//! or choose to treat them as fatal.

use dicom_core::header::GroupNumber;
use dicom_core::{Tag, VR};
use snafu::Snafu;

/// A recoverable fault found while converting
/// between a data set and its display tree.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum Diagnostic {
    /// The node's tag text does not parse; the node was skipped.
    #[snafu(display("Tag text `{}` could not be parsed, node skipped", text))]
    MalformedTag { text: String },
    /// The node's value text cannot be cast to its declared VR.
    #[snafu(display("Value `{}` of {} cannot be cast to {}", text, tag, vr))]
    ValueCast { tag: Tag, text: String, vr: VR },
    /// The node's VR text names no known value representation.
    #[snafu(display("VR `{}` of {} is not known, node skipped", text, tag))]
    UnknownVr { tag: Tag, text: String },
    /// A private element with no resolvable creator block was dropped.
    /// This is a data loss event.
    #[snafu(display(
        "Private element ({:04X},xx{:02X}) has no resolvable creator block and was dropped",
        group,
        offset
    ))]
    UnresolvedPrivateElement { group: GroupNumber, offset: u8 },
    /// A private element whose creator declaration was not seen in pass
    /// order was bound to the group's only known creator.
    #[snafu(display(
        "Private element ({:04X},xx{:02X}) bound to creator `{}` declared out of pass order",
        group,
        offset,
        creator
    ))]
    RecoveredPrivateElement {
        group: GroupNumber,
        offset: u8,
        creator: String,
    },
    /// No private block could be established for the creator.
    #[snafu(display(
        "No private block in group {:#06X} could hold creator `{}`",
        group,
        creator
    ))]
    PrivateBlockExhausted { group: GroupNumber, creator: String },
    /// The value is opaque binary data and is carried by reference
    /// instead of being rendered as editable text. Informational.
    #[snafu(display("Value of {} ({}) is binary and cannot be edited as text", tag, vr))]
    BinaryValueNotEditable { tag: Tag, vr: VR },
    /// The node cannot be represented in the destination form.
    #[snafu(display("Node for {} cannot be represented: {}", tag, reason))]
    MalformedNode { tag: Tag, reason: &'static str },
}

/// An ordered collection of [`Diagnostic`] records
/// gathered over one build or reduce pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Record one diagnostic, mirroring it to the log.
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.records.push(diagnostic);
    }

    /// Whether no diagnostics were recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The number of diagnostics recorded.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate over the records in order of occurrence.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.records.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

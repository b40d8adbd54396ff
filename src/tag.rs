//! Conversion between data element tags and their canonical display text.
//!
//! The display form is exactly `"(GGGG,EEEE)"`:
//! group and element in uppercase hexadecimal,
//! zero-padded to 4 digits each.
//! This is the contract between the display layer,
//! which stores and edits the string directly,
//! and the reducer, which parses it back.

use std::num::ParseIntError;

use dicom_core::Tag;
use snafu::{OptionExt, ResultExt, Snafu};

/// An error parsing display tag text into a [`Tag`].
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum ParseTagError {
    /// The text is not shaped like `(GGGG,EEEE)`.
    #[snafu(display("Tag text `{}` is not in the `(GGGG,EEEE)` form", text))]
    Format { text: String },
    /// One of the two halves is not valid hexadecimal.
    #[snafu(display("Tag text `{}` contains invalid hexadecimal", text))]
    Hex {
        text: String,
        source: ParseIntError,
    },
}

/// Render a tag in its canonical display form.
pub fn format_tag(tag: Tag) -> String {
    tag.to_string()
}

/// Parse a tag from its canonical display form.
///
/// Surrounding whitespace is tolerated.
/// The parenthesized body must hold exactly two hexadecimal numbers
/// separated by a single comma.
pub fn parse_tag(text: &str) -> Result<Tag, ParseTagError> {
    let body = text
        .trim()
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .context(FormatSnafu { text })?;

    let mut halves = body.splitn(3, ',');
    let (group, element) = match (halves.next(), halves.next(), halves.next()) {
        (Some(group), Some(element), None) => (group, element),
        _ => return FormatSnafu { text }.fail(),
    };

    let group = u16::from_str_radix(group.trim(), 16).context(HexSnafu { text })?;
    let element = u16::from_str_radix(element.trim(), 16).context(HexSnafu { text })?;
    Ok(Tag(group, element))
}

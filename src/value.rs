//! Casting between typed element values and their editable text form.
//!
//! The forward direction ([`format_value`]) renders a primitive value
//! as the text shown on a display node.
//! The inverse direction ([`cast_value`]) parses edited text
//! back into a typed value,
//! applying the casting rule of the element's value representation.
//!
//! Multi-valued text is delimited by `[` and `]`
//! with elements separated by commas;
//! surrounding quotes and spaces are tolerated around each element.
//! A cast failure on any element aborts the whole conversion.

use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;

use dicom_core::value::C;
use dicom_core::{PrimitiveValue, Tag, VR};
use snafu::{ResultExt, Snafu};

use crate::tag::{parse_tag, ParseTagError};

/// The casting family of a value representation.
///
/// Downstream logic dispatches on this sum type
/// instead of sniffing VR strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VrClass {
    /// Integer VRs, cast from decimal integer text.
    Integer,
    /// Binary floating point VRs.
    Float,
    /// Decimal string: validated as a number,
    /// kept in its exact textual form.
    Decimal,
    /// Attribute tags, in `(GGGG,EEEE)` text form.
    AttributeTag,
    /// Free-form or coded text, passed through verbatim.
    Text,
    /// Opaque binary payloads, never edited as text.
    Binary,
    /// Sequences of nested data sets.
    Sequence,
}

impl VrClass {
    /// The casting family of the given VR.
    pub fn of(vr: VR) -> Self {
        use VR::*;
        match vr {
            SS | US | IS | SL | UL | SV | UV => VrClass::Integer,
            FL | FD => VrClass::Float,
            DS => VrClass::Decimal,
            AT => VrClass::AttributeTag,
            OB | OD | OF | OL | OV | OW | UN => VrClass::Binary,
            SQ => VrClass::Sequence,
            _ => VrClass::Text,
        }
    }
}

/// An error casting value text to a target value representation.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum CastError {
    /// The piece is not a valid integer for the VR.
    #[snafu(display("`{}` is not a valid {} integer", piece, vr))]
    Integer {
        piece: String,
        vr: VR,
        source: ParseIntError,
    },
    /// The piece is not a valid floating point number for the VR.
    #[snafu(display("`{}` is not a valid {} number", piece, vr))]
    Float {
        piece: String,
        vr: VR,
        source: ParseFloatError,
    },
    /// The piece is not a valid decimal string.
    #[snafu(display("`{}` is not a valid decimal string", piece))]
    Decimal {
        piece: String,
        source: ParseFloatError,
    },
    /// The piece is not a valid attribute tag.
    #[snafu(display("`{}` is not a valid attribute tag", piece))]
    Attribute {
        piece: String,
        source: ParseTagError,
    },
    /// The VR carries no textual form to cast from.
    #[snafu(display("Values of VR {} are not cast from text", vr))]
    NotText { vr: VR },
}

#[inline]
pub(crate) fn whitespace_or_null(c: char) -> bool {
    c.is_whitespace() || c == '\0'
}

/// Render a primitive value as display text.
///
/// A single value is rendered bare;
/// multiple values are enclosed in brackets and comma-separated,
/// with string elements double-quoted.
/// An empty value renders as the empty string.
pub fn format_value(value: &PrimitiveValue) -> String {
    use PrimitiveValue::*;
    match value {
        Empty => String::new(),
        Str(s) => s.trim_end_matches(whitespace_or_null).to_string(),
        Strs(values) => format_pieces(
            values
                .iter()
                .map(|s| s.trim_end_matches(whitespace_or_null).to_string()),
            true,
        ),
        Tags(values) => format_pieces(values.iter().map(|t| t.to_string()), false),
        U8(values) => format_numbers(values),
        I16(values) => format_numbers(values),
        U16(values) => format_numbers(values),
        I32(values) => format_numbers(values),
        U32(values) => format_numbers(values),
        I64(values) => format_numbers(values),
        U64(values) => format_numbers(values),
        F32(values) => format_numbers(values),
        F64(values) => format_numbers(values),
        // dates and times keep the library's textual rendition
        other => other.to_str().into_owned(),
    }
}

fn format_numbers<T>(values: &C<T>) -> String
where
    T: std::fmt::Display,
{
    format_pieces(values.iter().map(|v| v.to_string()), false)
}

fn format_pieces<I>(pieces: I, quoted: bool) -> String
where
    I: IntoIterator<Item = String>,
{
    let pieces: Vec<String> = pieces.into_iter().collect();
    match pieces.as_slice() {
        [] => String::new(),
        [single] => single.clone(),
        _ => {
            let mut out = String::from("[");
            for (i, piece) in pieces.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if quoted {
                    out.push('"');
                    out.push_str(piece);
                    out.push('"');
                } else {
                    out.push_str(piece);
                }
            }
            out.push(']');
            out
        }
    }
}

/// Cast display text to a primitive value of the given VR.
///
/// Empty text becomes an empty value.
/// Text delimited by `[` and `]` is cast element-wise,
/// all-or-nothing.
/// Scalar text of a textual VR is preserved verbatim.
pub fn cast_value(text: &str, vr: VR) -> Result<PrimitiveValue, CastError> {
    if text.is_empty() {
        return Ok(PrimitiveValue::Empty);
    }
    if let Some(body) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        let pieces: Vec<&str> = body.split(',').map(unquote).collect();
        cast_pieces(&pieces, vr)
    } else {
        cast_pieces(std::slice::from_ref(&text), vr)
    }
}

/// Cast line-separated display text, one value per line.
///
/// This is the form used when entering a fresh element value
/// as free text. The same all-or-nothing policy applies.
pub fn cast_lines(text: &str, vr: VR) -> Result<PrimitiveValue, CastError> {
    let pieces: Vec<&str> = text.lines().collect();
    if pieces.is_empty() {
        return Ok(PrimitiveValue::Empty);
    }
    cast_pieces(&pieces, vr)
}

fn unquote(piece: &str) -> &str {
    piece
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
}

fn cast_pieces(pieces: &[&str], vr: VR) -> Result<PrimitiveValue, CastError> {
    use VR::*;
    match vr {
        SS => Ok(PrimitiveValue::I16(parse_ints(pieces, vr)?)),
        US => Ok(PrimitiveValue::U16(parse_ints(pieces, vr)?)),
        IS | SL => Ok(PrimitiveValue::I32(parse_ints(pieces, vr)?)),
        UL => Ok(PrimitiveValue::U32(parse_ints(pieces, vr)?)),
        SV => Ok(PrimitiveValue::I64(parse_ints(pieces, vr)?)),
        UV => Ok(PrimitiveValue::U64(parse_ints(pieces, vr)?)),
        FL => Ok(PrimitiveValue::F32(parse_floats(pieces, vr)?)),
        FD => Ok(PrimitiveValue::F64(parse_floats(pieces, vr)?)),
        DS => {
            let values = pieces
                .iter()
                .map(|piece| {
                    let piece = piece.trim();
                    // validate as a number, keep the exact textual form
                    piece
                        .parse::<f64>()
                        .map(|_| piece.to_string())
                        .context(DecimalSnafu { piece })
                })
                .collect::<Result<C<String>, CastError>>()?;
            Ok(PrimitiveValue::Strs(values))
        }
        AT => {
            let values = pieces
                .iter()
                .map(|piece| parse_tag(piece.trim()).context(AttributeSnafu { piece: *piece }))
                .collect::<Result<C<Tag>, CastError>>()?;
            Ok(PrimitiveValue::Tags(values))
        }
        OB | OD | OF | OL | OV | OW | UN | SQ => NotTextSnafu { vr }.fail(),
        // single-valued text VRs
        ST | LT | UT | UR if pieces.len() == 1 => Ok(PrimitiveValue::Str(pieces[0].to_string())),
        _ => Ok(PrimitiveValue::Strs(
            pieces.iter().map(|p| p.to_string()).collect(),
        )),
    }
}

fn parse_ints<T>(pieces: &[&str], vr: VR) -> Result<C<T>, CastError>
where
    T: FromStr<Err = ParseIntError>,
{
    pieces
        .iter()
        .map(|piece| {
            piece
                .trim()
                .parse::<T>()
                .context(IntegerSnafu { piece: *piece, vr })
        })
        .collect()
}

fn parse_floats<T>(pieces: &[&str], vr: VR) -> Result<C<T>, CastError>
where
    T: FromStr<Err = ParseFloatError>,
{
    pieces
        .iter()
        .map(|piece| {
            piece
                .trim()
                .parse::<T>()
                .context(FloatSnafu { piece: *piece, vr })
        })
        .collect()
}

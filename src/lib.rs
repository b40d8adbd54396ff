//! DICOM display tree module
//!
//! This library provides conversion of a DICOM data set
//! into an editable display tree,
//! and reduction of the edited tree back into a data set.
//!
//! The display tree is a plain hierarchy of [`DisplayNode`] values
//! carrying textual tag, name, VR, keyword, and value fields,
//! suitable for a tree widget with free-text editing of the value column
//! but independent of any particular toolkit.
//! Sequences expand into one item container node per nested data set.
//! Private elements round-trip through the creator declaration protocol
//! of their odd-numbered group:
//! a declaration at the reserved offset `0x10` establishes the block
//! that subsequent private data elements are placed into.
//!
//! Conversion never fails as a whole.
//! Node-level faults are isolated to the offending subtree
//! and reported through a [`Diagnostics`] collector
//! returned alongside each result,
//! so that the rest of a large data set remains usable.
//!
//! # Example
//!
//! ```rust
//! use dicom_core::{PrimitiveValue, VR};
//! use dicom_dictionary_std::tags;
//! use dicom_object::mem::{InMemDicomObject, InMemElement};
//! use dicom_tree::{dataset_to_tree, tree_to_dataset};
//!
//! let obj = InMemDicomObject::from_element_iter([
//!     InMemElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("OT")),
//!     InMemElement::new(tags::INSTANCE_NUMBER, VR::IS, PrimitiveValue::from(5_i32)),
//! ]);
//!
//! // build the editable tree
//! let (mut nodes, warnings) = dataset_to_tree(&obj);
//! assert!(warnings.is_empty());
//! assert_eq!(nodes[0].tag_text, "(0008,0060)");
//! assert_eq!(nodes[0].value_text, "OT");
//!
//! // edit a value, then reduce back into a data set
//! nodes[0].value_text = "CT".to_string();
//! let (rebuilt, warnings) = tree_to_dataset(&nodes);
//! assert!(warnings.is_empty());
//! assert_eq!(rebuilt.element(tags::MODALITY)?.value().to_str()?, "CT");
//! # Result::<(), Box<dyn std::error::Error>>::Ok(())
//! ```

pub mod build;
pub mod diagnostics;
pub mod edit;
pub mod node;
pub mod private;
pub mod reduce;
pub mod tag;
pub mod value;

pub use crate::build::dataset_to_tree;
pub use crate::diagnostics::{Diagnostic, Diagnostics};
pub use crate::node::DisplayNode;
pub use crate::reduce::{tree_to_dataset, tree_to_dataset_with_dict};
pub use crate::tag::{format_tag, parse_tag, ParseTagError};
pub use crate::value::{cast_lines, cast_value, format_value, CastError, VrClass};

//! Ground-truth segmentation: where paragraphs begin and end in a text,
//! independent of any previous state.

pub mod segmenter;
pub mod separator;
pub mod validate;

pub use segmenter::{paragraph_spans, segment};
pub use separator::{contains_separator, separator_spans};
pub use validate::{check_against_text, check_structure, validate};

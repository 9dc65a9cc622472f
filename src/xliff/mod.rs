/*!
 * XLIFF document model, reader, writer and segment walker.
 *
 * - `dom`: mutable element tree with text/tail content
 * - `parser`: quick-xml event reader building the tree
 * - `writer`: UTF-8 serializer with selective pretty printing
 * - `walker`: version detection, segment enumeration and target creation
 */

pub mod dom;
pub mod parser;
pub mod walker;
pub mod writer;

pub use dom::{Attribute, Document, Element, Misc, Node};
pub use parser::parse_document;
pub use walker::{SegmentRef, TextSite};
pub use writer::{DocumentWriter, WriterConfig};

use std::fmt;

/// Schema generation of an XLIFF document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XliffVersion {
    /// XLIFF 1.x: `trans-unit` holds `source`/`target`
    V1_2,
    /// XLIFF 2.x: `unit` holds `segment`s holding `source`/`target`
    V2_0,
}

impl fmt::Display for XliffVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1_2 => write!(f, "1.2"),
            Self::V2_0 => write!(f, "2.0"),
        }
    }
}
